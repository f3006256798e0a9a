//! End-to-end programs evaluated against a shared top-level environment.

use minischeme::ast::{Value, sym, val};
use minischeme::evaluator::{Environment, create_global_env, seval_with_config};
use minischeme::substitute::substitute;
use minischeme::{BindingStrategy, Error, EvalConfig, sexpr};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn configs() -> Vec<EvalConfig> {
    vec![
        EvalConfig::default(),
        EvalConfig::default().with_binding(BindingStrategy::Substitution),
        EvalConfig::substitution(),
    ]
}

fn run(expr: &Value, env: &Environment, config: &EvalConfig) -> Value {
    match seval_with_config(expr, env, config) {
        Ok(value) => value,
        Err(err) => panic!("{config:?}: {expr} failed: {err}"),
    }
}

#[test]
fn literals_and_lookup() {
    init_tracing();
    for config in configs() {
        assert_eq!(run(&val(23), &Environment::new(), &config), val(23));

        let env = Environment::new();
        env.define("x", val(23));
        assert_eq!(run(&sym("x"), &env, &config), val(23));

        assert_eq!(
            seval_with_config(&sym("x"), &Environment::new(), &config),
            Err(Error::UnboundSymbol("x".to_owned()))
        );
    }
}

#[test]
fn arithmetic_define_and_if() {
    init_tracing();
    for config in configs() {
        let env = create_global_env();

        assert_eq!(run(&sexpr!((+ 1 2)), &env, &config), val(3));
        assert_eq!(run(&sexpr!((+ 1 (* 2 3))), &env, &config), val(7));

        run(&sexpr!((define x 13)), &env, &config);
        assert_eq!(run(&sexpr!(x), &env, &config), val(13));

        assert_eq!(run(&sexpr!((if (< 2 3) 4 5)), &env, &config), val(4));
        assert_eq!(run(&sexpr!((if (> 2 3) 4 5)), &env, &config), val(5));
    }
}

#[test]
fn substitution_example() {
    let expr = sexpr!((* (+ x y) (x)));
    assert_eq!(substitute(&expr, "x", &val(2)), sexpr!((* (+ 2 y) (2))));
    assert_eq!(substitute(&expr, "w", &val(2)), expr);
}

#[test]
fn recursive_factorial() {
    init_tracing();
    for config in configs() {
        let env = create_global_env();
        let fact = sexpr!((define fact
            (lambda (n) (if (= n 1) 1 (* n (fact (- n 1)))))));

        run(&fact, &env, &config);
        run(&sexpr!((define n 5)), &env, &config);
        assert_eq!(run(&sexpr!((fact n)), &env, &config), val(120));
    }
}

#[test]
fn procedures_are_values() {
    init_tracing();
    for config in configs() {
        let env = create_global_env();
        run(&sexpr!((define compose (lambda (f g) (lambda (x) (f (g x)))))), &env, &config);
        run(&sexpr!((define inc (lambda (x) (+ x 1)))), &env, &config);
        run(&sexpr!((define dbl (lambda (x) (* x 2)))), &env, &config);

        assert_eq!(run(&sexpr!(((compose inc dbl) 5)), &env, &config), val(11));
        assert_eq!(run(&sexpr!(((compose dbl inc) 5)), &env, &config), val(12));

        // A procedure value placed directly into a tree evaluates to itself
        let inc = run(&sym("inc"), &env, &config);
        let tree = val(vec![inc.clone(), val(41)]);
        assert_eq!(run(&tree, &env, &config), val(42));
        assert_eq!(run(&inc, &env, &config), inc);
    }
}

#[test]
fn failures_abort_the_whole_evaluation() {
    init_tracing();
    for config in configs() {
        let env = create_global_env();
        run(&sexpr!((define boom (lambda (x) (/ x 0)))), &env, &config);

        assert_eq!(
            seval_with_config(&sexpr!((+ 1 (boom 5))), &env, &config),
            Err(Error::DivisionByZero)
        );
        // Nothing was bound by the failed evaluation
        assert_eq!(
            seval_with_config(&sexpr!((define result (boom 1))), &env, &config),
            Err(Error::DivisionByZero)
        );
        assert!(!env.contains("result"));
    }
}

proptest! {
    #[test]
    fn numbers_self_evaluate(n in any::<i64>(), x in -1.0e12f64..1.0e12) {
        let env = Environment::new();
        for config in configs() {
            prop_assert_eq!(seval_with_config(&val(n), &env, &config), Ok(val(n)));
            prop_assert_eq!(seval_with_config(&val(x), &env, &config), Ok(val(x)));
        }
    }

    #[test]
    fn comparison_agrees_with_host(a in -1000i32..1000, b in -1000i32..1000) {
        let env = create_global_env();
        let cases = [
            (sexpr!((< {a} {b})), a < b),
            (sexpr!((<= {a} {b})), a <= b),
            (sexpr!((= {a} {b})), a == b),
            (sexpr!((!= {a} {b})), a != b),
            (sexpr!((> {a} {b})), a > b),
            (sexpr!((>= {a} {b})), a >= b),
        ];
        for (expr, expected) in cases {
            prop_assert_eq!(seval_with_config(&expr, &env, &EvalConfig::default()), Ok(val(expected)));
        }
    }
}
