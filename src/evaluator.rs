//! Environments and the evaluator.
//!
//! [`seval`] walks an expression tree: literals evaluate to themselves, symbols
//! are looked up, `define`/`if`/`lambda` are handled here, and every other
//! compound form is applied through [`sapply`].

use crate::ast::{SpecialForm, Value};
use crate::builtinops::{Arity, OperationFn, get_builtin_ops};
use crate::procedure::Procedure;
use crate::{Error, EvalConfig};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Environment for variable bindings
///
/// An environment is a handle to a frame of bindings with an optional parent
/// frame. Cloning the handle shares the frame: a `define` through any clone is
/// visible through all of them. Lookups walk the parent chain.
///
/// Equality is identity of the underlying frame.
#[derive(Clone, Default)]
pub struct Environment(Rc<RefCell<Frame>>);

#[derive(Default)]
struct Frame {
    bindings: HashMap<String, Value>,
    parent: Option<Environment>,
}

impl PartialEq for Environment {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl std::fmt::Debug for Environment {
    // Values are left out: procedures point back at their environment
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let frame = self.0.borrow();
        let mut names: Vec<&String> = frame.bindings.keys().collect();
        names.sort();
        f.debug_struct("Environment")
            .field("bindings", &names)
            .field("parent", &frame.parent)
            .finish()
    }
}

impl Environment {
    /// Create an empty top-level environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty frame whose lookups fall back to `parent`
    pub fn with_parent(parent: &Environment) -> Self {
        Environment(Rc::new(RefCell::new(Frame {
            bindings: HashMap::new(),
            parent: Some(parent.clone()),
        })))
    }

    /// Bind `name` in this frame, replacing any previous binding in it
    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.0.borrow_mut().bindings.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        let frame = self.0.borrow();
        match frame.bindings.get(name) {
            Some(value) => Some(value.clone()),
            None => frame.parent.as_ref().and_then(|parent| parent.get(name)),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        let frame = self.0.borrow();
        frame.bindings.contains_key(name)
            || frame.parent.as_ref().is_some_and(|parent| parent.contains(name))
    }

    /// Independent copy of every binding visible from this environment.
    ///
    /// The copy is a single top-level frame; later defines in either the copy
    /// or the original are not seen by the other.
    pub fn snapshot(&self) -> Environment {
        let copy = Environment::new();
        copy.0.borrow_mut().bindings = self.visible_bindings();
        copy
    }

    /// Get all bindings in this environment and its parents
    /// Returns a Vec of (name, value) pairs sorted by name
    pub fn bindings(&self) -> Vec<(String, Value)> {
        let mut result: Vec<_> = self.visible_bindings().into_iter().collect();
        result.sort_by(|a, b| a.0.cmp(&b.0));
        result
    }

    fn visible_bindings(&self) -> HashMap<String, Value> {
        let frame = self.0.borrow();

        // Start with parent bindings so they can be overridden by local ones
        let mut bindings = frame
            .parent
            .as_ref()
            .map(Environment::visible_bindings)
            .unwrap_or_default();
        for (name, value) in &frame.bindings {
            bindings.insert(name.clone(), value.clone());
        }
        bindings
    }

    /// Register a native function callable from evaluated expressions.
    ///
    /// The argument count is validated against `arity` before `func` runs.
    /// Failures specific to the function should be reported as
    /// [`Error::Native`] or one of the other [`Error`] variants.
    ///
    /// # Example
    /// ```
    /// use minischeme::Error;
    /// use minischeme::ast::Value;
    /// use minischeme::builtinops::Arity;
    /// use minischeme::evaluator::{create_global_env, seval};
    /// use minischeme::sexpr;
    ///
    /// let env = create_global_env();
    /// env.register_builtin_function("negate", Arity::Exact(1), |args: &[Value]| {
    ///     match args[0].as_number() {
    ///         Some(n) => Ok(Value::from(-n.as_f64())),
    ///         None => Err(Error::Native("negate requires a number".into())),
    ///     }
    /// });
    ///
    /// assert_eq!(seval(&sexpr!((negate 4)), &env).unwrap(), Value::from(-4.0));
    /// ```
    pub fn register_builtin_function<F>(&self, name: &str, arity: Arity, func: F)
    where
        F: Fn(&[Value]) -> Result<Value, Error> + 'static,
    {
        let wrapped: Rc<OperationFn> = Rc::new(move |args: &[Value]| {
            arity.validate(args.len())?;
            func(args)
        });

        self.define(
            name,
            Value::BuiltinFunction {
                id: name.to_owned(),
                func: wrapped,
            },
        );
    }
}

/// Create a top-level environment holding the primitive operators
pub fn create_global_env() -> Environment {
    let env = Environment::new();

    for builtin_op in get_builtin_ops() {
        env.define(
            builtin_op.id,
            Value::BuiltinFunction {
                id: builtin_op.id.to_owned(),
                func: Rc::new(move |args: &[Value]| builtin_op.call(args)),
            },
        );
    }

    env
}

/// Evaluate an expression with the default configuration
pub fn seval(expr: &Value, env: &Environment) -> Result<Value, Error> {
    seval_with_config(expr, env, &EvalConfig::default())
}

/// Evaluate an expression
pub fn seval_with_config(
    expr: &Value,
    env: &Environment,
    config: &EvalConfig,
) -> Result<Value, Error> {
    eval_with_depth_tracking(expr, env, config, 0)
}

/// Apply an operator expression to argument expressions with the default configuration
pub fn sapply(
    operator_expr: &Value,
    arg_exprs: &[Value],
    env: &Environment,
) -> Result<Value, Error> {
    sapply_with_config(operator_expr, arg_exprs, env, &EvalConfig::default())
}

/// Apply an operator expression to argument expressions.
///
/// The operator is evaluated first, then each argument from left to right,
/// all in `env`. The callable's result is returned as is.
pub fn sapply_with_config(
    operator_expr: &Value,
    arg_exprs: &[Value],
    env: &Environment,
    config: &EvalConfig,
) -> Result<Value, Error> {
    apply(operator_expr, arg_exprs, env, config, 0)
}

/// Evaluate an expression with depth tracking to prevent stack overflow
pub(crate) fn eval_with_depth_tracking(
    expr: &Value,
    env: &Environment,
    config: &EvalConfig,
    depth: usize,
) -> Result<Value, Error> {
    if depth >= config.max_depth {
        return Err(Error::DepthLimitExceeded {
            max: config.max_depth,
        });
    }
    match expr {
        // Self-evaluating forms
        Value::Number(_)
        | Value::Bool(_)
        | Value::BuiltinFunction { .. }
        | Value::Procedure(_)
        | Value::Unspecified => Ok(expr.clone()),

        // Variable lookup
        Value::Symbol(name) => env
            .get(name)
            .ok_or_else(|| Error::UnboundSymbol(name.clone())),

        Value::List(elements) => match elements.as_slice() {
            [] => Err(Error::malformed(expr, "cannot evaluate an empty form")),
            [head, operands @ ..] => match head.as_symbol().and_then(SpecialForm::from_keyword) {
                Some(SpecialForm::Define) => eval_define(expr, operands, env, config, depth),
                Some(SpecialForm::If) => eval_if(expr, operands, env, config, depth),
                Some(SpecialForm::Lambda) => eval_lambda(expr, operands, env),
                None => apply(head, operands, env, config, depth),
            },
        },
    }
}

#[tracing::instrument(level = "trace", skip_all, fields(operator = %operator_expr))]
fn apply(
    operator_expr: &Value,
    arg_exprs: &[Value],
    env: &Environment,
    config: &EvalConfig,
    depth: usize,
) -> Result<Value, Error> {
    let operator = eval_with_depth_tracking(operator_expr, env, config, depth + 1)?;
    let args = arg_exprs
        .iter()
        .map(|arg| eval_with_depth_tracking(arg, env, config, depth + 1))
        .collect::<Result<Vec<_>, _>>()?;

    match &operator {
        Value::BuiltinFunction { func, .. } => func(&args),
        Value::Procedure(procedure) => procedure.call(args, config, depth + 1),
        other => Err(Error::TypeMismatch(format!(
            "cannot apply {} {other}",
            other.type_name()
        ))),
    }
}

/// Evaluate define special form
fn eval_define(
    expr: &Value,
    operands: &[Value],
    env: &Environment,
    config: &EvalConfig,
    depth: usize,
) -> Result<Value, Error> {
    match operands {
        [Value::Symbol(name), value_expr] => {
            let value = eval_with_depth_tracking(value_expr, env, config, depth + 1)?;
            tracing::debug!(%name, %value, "define");
            env.define(name.clone(), value);
            Ok(Value::Unspecified)
        }
        [name, _] => Err(Error::malformed(
            expr,
            format!("define requires a symbol name, got {}", name.type_name()),
        )),
        _ => Err(Error::malformed(
            expr,
            format!("define requires 2 operands, got {}", operands.len()),
        )),
    }
}

/// Evaluate if special form
///
/// Only the selected branch is evaluated.
fn eval_if(
    expr: &Value,
    operands: &[Value],
    env: &Environment,
    config: &EvalConfig,
    depth: usize,
) -> Result<Value, Error> {
    match operands {
        [condition_expr, then_expr, else_expr] => {
            let condition = eval_with_depth_tracking(condition_expr, env, config, depth + 1)?;
            if condition.is_truthy() {
                eval_with_depth_tracking(then_expr, env, config, depth + 1)
            } else {
                eval_with_depth_tracking(else_expr, env, config, depth + 1)
            }
        }
        _ => Err(Error::malformed(
            expr,
            format!("if requires 3 operands, got {}", operands.len()),
        )),
    }
}

/// Evaluate lambda special form
///
/// The new procedure holds `env` itself, not a copy.
fn eval_lambda(expr: &Value, operands: &[Value], env: &Environment) -> Result<Value, Error> {
    let (param_list, body) = match operands {
        [Value::List(param_list), body @ ..] if !body.is_empty() => (param_list, body),
        [Value::List(_)] => {
            return Err(Error::malformed(expr, "lambda requires at least one body expression"));
        }
        [_, ..] => return Err(Error::malformed(expr, "lambda parameters must be a list")),
        [] => return Err(Error::malformed(expr, "lambda requires a parameter list")),
    };

    let mut params: Vec<String> = Vec::with_capacity(param_list.len());
    for param in param_list {
        match param {
            Value::Symbol(name) if params.contains(name) => {
                return Err(Error::malformed(
                    expr,
                    format!("duplicate parameter name {name}"),
                ));
            }
            Value::Symbol(name) => params.push(name.clone()),
            other => {
                return Err(Error::malformed(
                    expr,
                    format!("lambda parameters must be symbols, got {}", other.type_name()),
                ));
            }
        }
    }

    tracing::debug!(?params, body_len = body.len(), "lambda");
    Ok(Value::from(Procedure::new(params, body.to_vec(), env.clone())))
}
