//! User-defined procedures.
//!
//! A [`Procedure`] is created by evaluating a `lambda` form and is immutable
//! afterwards. It holds its defining environment by reference, so bindings
//! added to that environment after the `lambda` was evaluated (such as the
//! procedure's own name, for recursion) are visible when it is called.

use crate::ast::Value;
use crate::evaluator::{Environment, eval_with_depth_tracking};
use crate::substitute::substitute_all;
use crate::{BindingStrategy, Error, EvalConfig};

#[derive(Clone)]
pub struct Procedure {
    params: Vec<String>,
    body: Vec<Value>,
    env: Environment,
}

impl std::fmt::Debug for Procedure {
    // The environment is left out: it usually contains this procedure
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Procedure(params={:?}, body={:?})", self.params, self.body)
    }
}

impl PartialEq for Procedure {
    fn eq(&self, other: &Self) -> bool {
        self.params == other.params && self.body == other.body && self.env == other.env
    }
}

impl Procedure {
    pub fn new(params: Vec<String>, body: Vec<Value>, env: Environment) -> Self {
        Procedure { params, body, env }
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn body(&self) -> &[Value] {
        &self.body
    }

    /// The environment the procedure was defined in
    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Invoke the procedure with already evaluated arguments.
    ///
    /// Body expressions are evaluated in order and the value of the last one
    /// is returned. All body expressions of one call share a single call
    /// environment, so a `define` in an earlier expression is visible to later
    /// ones; it is never visible to the defining environment or to other calls.
    #[tracing::instrument(level = "trace", skip_all, fields(params = ?self.params))]
    pub(crate) fn call(
        &self,
        args: Vec<Value>,
        config: &EvalConfig,
        depth: usize,
    ) -> Result<Value, Error> {
        if config.strict_arity && self.params.len() != args.len() {
            return Err(Error::arity_error(self.params.len(), args.len()));
        }

        let mut result = Value::Unspecified;
        match config.binding {
            BindingStrategy::Frames => {
                let frame = Environment::with_parent(&self.env);
                for (param, arg) in self.params.iter().zip(args) {
                    frame.define(param.clone(), arg);
                }
                for expr in &self.body {
                    result = eval_with_depth_tracking(expr, &frame, config, depth + 1)?;
                }
            }
            BindingStrategy::Substitution => {
                let frame = self.env.snapshot();
                for expr in &self.body {
                    let expr = substitute_all(expr, &self.params, &args);
                    tracing::trace!(%expr, "substituted");
                    result = eval_with_depth_tracking(&expr, &frame, config, depth + 1)?;
                }
            }
        }
        Ok(result)
    }
}
