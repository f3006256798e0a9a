//! minischeme - Minimal S-expression evaluator
//!
//! This crate evaluates pre-built symbolic expression trees of a small Lisp
//! dialect. There is no reader: callers construct expressions directly with the
//! helpers in [`ast`] (or from their own parser) and hand them to the evaluator
//! together with an [`evaluator::Environment`].
//!
//! ```
//! use minischeme::ast::{Value, sym, val};
//! use minischeme::evaluator::{create_global_env, seval};
//!
//! let env = create_global_env();
//! // (+ 1 (* 2 3))
//! let expr = val(vec![sym("+"), val(1), val(vec![sym("*"), val(2), val(3)])]);
//! assert_eq!(seval(&expr, &env).unwrap(), Value::from(7));
//! ```
//!
//! ## Language
//!
//! - numbers (integer and floating point), booleans and symbols
//! - three special forms: `define`, `if` and `lambda`
//! - ten binary primitives: `+ - * / != = > < <= >=`
//! - application of primitives, registered native functions and procedures
//!
//! ## Procedure binding
//!
//! Procedures can bind their arguments in two ways, chosen per evaluation
//! through [`EvalConfig`]:
//!
//! - [`BindingStrategy::Frames`] (default): each call allocates a frame whose
//!   parent is the procedure's defining environment.
//! - [`BindingStrategy::Substitution`]: parameter names are replaced textually
//!   in the body by the argument values (see [`substitute`]) and the result is
//!   evaluated in a fresh copy of the defining environment. Nested lambdas that
//!   reuse a parameter name are not protected from the rewrite.
//!
//! ## Modules
//!
//! - `ast`: the [`ast::Value`] tree and construction helpers
//! - `builtinops`: the primitive operator table
//! - `substitute`: structural name-for-value replacement
//! - `procedure`: user-defined procedures and argument binding
//! - `evaluator`: environments, `seval` and `sapply`

use thiserror::Error;

/// Default maximum evaluation depth.
///
/// Every nested evaluation (operands, branches, procedure bodies) counts one
/// level. Exceeding the limit fails the evaluation instead of overflowing the
/// host stack.
pub const DEFAULT_MAX_EVAL_DEPTH: usize = 512;

/// How a procedure call binds its parameters to its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BindingStrategy {
    /// Allocate a child frame of the defining environment and bind parameters in it.
    #[default]
    Frames,
    /// Rewrite the body by substituting argument values for parameter names,
    /// then evaluate it in a fresh copy of the defining environment.
    Substitution,
}

/// Evaluation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalConfig {
    /// Maximum nesting depth before evaluation fails with [`Error::DepthLimitExceeded`]
    pub max_depth: usize,
    /// Parameter binding strategy for procedure calls
    pub binding: BindingStrategy,
    /// Reject procedure calls whose argument count differs from the parameter count.
    ///
    /// When disabled, parameters and arguments are paired positionally: surplus
    /// arguments are ignored and surplus parameters stay unbound.
    pub strict_arity: bool,
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            max_depth: DEFAULT_MAX_EVAL_DEPTH,
            binding: BindingStrategy::default(),
            strict_arity: true,
        }
    }
}

impl EvalConfig {
    /// Configuration reproducing the textual-substitution model with lenient arity.
    pub fn substitution() -> Self {
        EvalConfig {
            binding: BindingStrategy::Substitution,
            strict_arity: false,
            ..Self::default()
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_binding(mut self, binding: BindingStrategy) -> Self {
        self.binding = binding;
        self
    }

    pub fn with_strict_arity(mut self, strict_arity: bool) -> Self {
        self.strict_arity = strict_arity;
        self
    }
}

/// Error types for the evaluator
///
/// Every error aborts the enclosing evaluation; nothing in the crate recovers
/// from one locally.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("Unbound symbol: {0}")]
    UnboundSymbol(String),

    #[error("Malformed expression {form}: {reason}")]
    MalformedExpression { form: String, reason: String },

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Arity mismatch: expected {expected} arguments, got {got}")]
    ArityMismatch { expected: usize, got: usize },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Integer overflow in {0}")]
    ArithmeticOverflow(&'static str),

    #[error("Evaluation depth limit exceeded (max: {max})")]
    DepthLimitExceeded { max: usize },

    /// Failure reported by a caller-registered builtin function
    #[error("{0}")]
    Native(String),
}

impl Error {
    /// Create a MalformedExpression error for the given form
    pub fn malformed(form: &ast::Value, reason: impl Into<String>) -> Self {
        Error::MalformedExpression {
            form: form.to_string(),
            reason: reason.into(),
        }
    }

    /// Create an ArityMismatch error
    pub fn arity_error(expected: usize, got: usize) -> Self {
        Error::ArityMismatch { expected, got }
    }
}

/// Build an expression tree from Rust tokens.
///
/// Parenthesised groups become lists, identifiers and operator tokens become
/// symbols, literals become numbers or booleans, and a `{ ... }` block splices
/// any Rust expression convertible into a [`ast::Value`] (negative numbers,
/// prebuilt trees).
///
/// ```
/// use minischeme::ast::{sym, val};
/// use minischeme::sexpr;
///
/// let expr = sexpr!((if (<= n 1) 1 (* n {-1})));
/// assert_eq!(
///     expr,
///     val(vec![
///         sym("if"),
///         val(vec![sym("<="), sym("n"), val(1)]),
///         val(1),
///         val(vec![sym("*"), sym("n"), val(-1)]),
///     ])
/// );
/// ```
///
/// Symbols are limited to what Rust tokenizes as a single identifier or
/// operator, so `my_var` works but `my-var` does not. A negative number must be
/// spliced as `{-1}`, since a bare `-` is always the subtraction symbol.
#[macro_export]
macro_rules! sexpr {
    (( $($inner:tt)* )) => {
        $crate::ast::Value::List(vec![$($crate::sexpr!($inner)),*])
    };
    ({ $splice:expr }) => {
        $crate::ast::val($splice)
    };
    // A lone `-` would otherwise be taken as the start of a negative literal
    (-) => {
        $crate::ast::sym("-")
    };
    ($lit:literal) => {
        $crate::ast::val($lit)
    };
    ($name:ident) => {
        $crate::ast::sym(stringify!($name))
    };
    ($op:tt) => {
        $crate::ast::sym(stringify!($op))
    };
}

pub mod ast;
pub mod builtinops;
pub mod evaluator;
pub mod procedure;
pub mod substitute;
