//! Structural name-for-value replacement over expression trees.
//!
//! Substitution is purely syntactic. It has no notion of scope: a nested
//! `lambda` whose parameter list reuses the substituted name is rewritten like
//! any other sub-tree, parameter list included. The frame-based binding
//! strategy exists because of this.

use crate::ast::Value;

/// Replace every occurrence of the symbol `name` in `expr` by `value`.
///
/// Lists are rebuilt element-wise with order and arity preserved. Any other
/// atom (numbers, booleans, other symbols, procedures, builtins) is returned
/// unchanged. A tree that does not mention `name` comes back structurally
/// equal to the input.
pub fn substitute(expr: &Value, name: &str, value: &Value) -> Value {
    match expr {
        Value::Symbol(symbol) if symbol == name => value.clone(),
        Value::List(elements) => Value::List(
            elements
                .iter()
                .map(|element| substitute(element, name, value))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Substitute each (name, value) pair into `expr` in order.
///
/// The n-th substitution is applied to the result of the first n-1. Pairs are
/// formed positionally; when the slices differ in length the surplus of the
/// longer one is ignored.
pub fn substitute_all(expr: &Value, names: &[String], values: &[Value]) -> Value {
    names
        .iter()
        .zip(values)
        .fold(expr.clone(), |acc, (name, value)| substitute(&acc, name, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{nil, sym, val};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_substitute_nested_forms() {
        // (* (+ x y) (x)) with x := 2
        let expr = val(vec![
            sym("*"),
            val(vec![sym("+"), sym("x"), sym("y")]),
            val(vec![sym("x")]),
        ]);
        let expected = val(vec![
            sym("*"),
            val(vec![sym("+"), val(2), sym("y")]),
            val(vec![val(2)]),
        ]);

        assert_eq!(substitute(&expr, "x", &val(2)), expected);
    }

    #[test]
    fn test_substitute_atoms() {
        let cases = vec![
            (sym("x"), val(7)),
            (sym("y"), sym("y")),
            (val(3), val(3)),
            (val(true), val(true)),
            (nil(), nil()),
        ];

        for (expr, expected) in cases {
            assert_eq!(substitute(&expr, "x", &val(7)), expected);
        }
    }

    #[test]
    fn test_substitute_is_not_scope_aware() {
        // (lambda (x) x) is rewritten wholesale, parameter list included
        let expr = val(vec![sym("lambda"), val(vec![sym("x")]), sym("x")]);
        let expected = val(vec![sym("lambda"), val(vec![val(1)]), val(1)]);

        assert_eq!(substitute(&expr, "x", &val(1)), expected);
    }

    #[test]
    fn test_substitute_all_threads_in_order() {
        // (+ a b) with a := b, then b := 5 rewrites both positions
        let expr = val(vec![sym("+"), sym("a"), sym("b")]);
        let names = vec!["a".to_owned(), "b".to_owned()];
        let values = vec![sym("b"), val(5)];

        assert_eq!(
            substitute_all(&expr, &names, &values),
            val(vec![sym("+"), val(5), val(5)])
        );
    }

    #[test]
    fn test_substitute_all_ignores_unpaired() {
        let expr = val(vec![sym("f"), sym("a"), sym("b")]);
        let names = vec!["a".to_owned(), "b".to_owned()];

        assert_eq!(
            substitute_all(&expr, &names, &[val(1)]),
            val(vec![sym("f"), val(1), sym("b")])
        );
        assert_eq!(
            substitute_all(&expr, &names[..1], &[val(1), val(2)]),
            val(vec![sym("f"), val(1), sym("b")])
        );
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn arb_expr() -> impl Strategy<Value = Value> {
            let leaf = prop_oneof![
                any::<i32>().prop_map(val),
                any::<bool>().prop_map(val),
                prop::sample::select(vec!["x", "y", "z", "+", "if"]).prop_map(sym),
            ];
            leaf.prop_recursive(4, 64, 6, |inner| {
                prop::collection::vec(inner, 0..6).prop_map(Value::List)
            })
        }

        fn mentions(expr: &Value, name: &str) -> bool {
            match expr {
                Value::Symbol(symbol) => symbol == name,
                Value::List(elements) => elements.iter().any(|e| mentions(e, name)),
                _ => false,
            }
        }

        fn shape(expr: &Value) -> Vec<usize> {
            match expr {
                Value::List(elements) => {
                    let mut sizes = vec![elements.len()];
                    sizes.extend(elements.iter().flat_map(shape));
                    sizes
                }
                _ => vec![],
            }
        }

        proptest! {
            #[test]
            fn absent_name_is_identity(expr in arb_expr()) {
                prop_assert_eq!(substitute(&expr, "absent", &val(1)), expr);
            }

            #[test]
            fn name_is_fully_replaced(expr in arb_expr(), n in any::<i32>()) {
                let result = substitute(&expr, "x", &val(n));
                prop_assert!(!mentions(&result, "x"));
            }

            #[test]
            fn list_shape_is_preserved(expr in arb_expr()) {
                let result = substitute(&expr, "y", &val(0));
                prop_assert_eq!(shape(&result), shape(&expr));
            }
        }
    }
}
