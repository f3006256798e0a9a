//! Primitive operator table.
//!
//! The evaluator ships ten binary operators over numbers:
//!
//! - arithmetic: `+ - * /`
//! - comparison: `= != < > <= >=`
//!
//! Every primitive takes exactly two numeric operands. Integer arithmetic is
//! checked and reports overflow; mixing an integer with a float yields a float.
//! Division is true division and always yields a float. Comparisons yield
//! booleans and compare integers and floats by numeric value.
//!
//! The table is static. [`crate::evaluator::create_global_env`] binds each
//! entry under its id as a [`Value::BuiltinFunction`], which is how
//! applications reach them: there is no special casing of operator symbols in
//! the evaluator.

use crate::Error;
use crate::ast::{Number, Value};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Canonical erased builtin function type used by the evaluator.
///
/// Builtins receive their already evaluated arguments.
pub type OperationFn = dyn Fn(&[Value]) -> Result<Value, Error>;

/// Expected number of arguments for a builtin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
    /// Inclusive bounds
    Range(usize, usize),
    Any,
}

impl Arity {
    pub fn validate(self, got: usize) -> Result<(), Error> {
        match self {
            Arity::Exact(expected) if got != expected => Err(Error::arity_error(expected, got)),
            Arity::AtLeast(min) if got < min => Err(Error::arity_error(min, got)),
            Arity::Range(min, _) if got < min => Err(Error::arity_error(min, got)),
            Arity::Range(_, max) if got > max => Err(Error::arity_error(max, got)),
            _ => Ok(()),
        }
    }
}

/// Definition of a primitive operation
#[derive(Debug, Clone)]
pub struct BuiltinOp {
    /// The symbol this operation is bound to
    pub id: &'static str,
    /// Expected number of arguments
    pub arity: Arity,
    func: fn(&[Value]) -> Result<Value, Error>,
}

impl PartialEq for BuiltinOp {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl BuiltinOp {
    /// Validate the argument count, then apply the operation
    pub fn call(&self, args: &[Value]) -> Result<Value, Error> {
        self.arity.validate(args.len())?;
        let result = (self.func)(args);
        tracing::trace!(op = self.id, ?args, ?result, "primitive");
        result
    }
}

//
// Primitive implementations
//

fn expect_number(id: &str, value: &Value) -> Result<Number, Error> {
    value.as_number().ok_or_else(|| {
        Error::TypeMismatch(format!(
            "{id} requires numbers, got {}: {value}",
            value.type_name()
        ))
    })
}

fn numeric_operands(id: &str, args: &[Value]) -> Result<(Number, Number), Error> {
    match args {
        [a, b] => Ok((expect_number(id, a)?, expect_number(id, b)?)),
        _ => Err(Error::arity_error(2, args.len())),
    }
}

// Integer operands use checked arithmetic, anything else goes through f64
macro_rules! numeric_arithmetic {
    ($name:ident, $id:literal, $checked:ident, $op:tt, $what:literal) => {
        fn $name(args: &[Value]) -> Result<Value, Error> {
            let (a, b) = numeric_operands($id, args)?;
            let result = match (a, b) {
                (Number::Int(x), Number::Int(y)) => {
                    Number::Int(x.$checked(y).ok_or(Error::ArithmeticOverflow($what))?)
                }
                _ => Number::Float(a.as_f64() $op b.as_f64()),
            };
            Ok(Value::Number(result))
        }
    };
}

numeric_arithmetic!(builtin_add, "+", checked_add, +, "addition");
numeric_arithmetic!(builtin_sub, "-", checked_sub, -, "subtraction");
numeric_arithmetic!(builtin_mul, "*", checked_mul, *, "multiplication");

fn builtin_div(args: &[Value]) -> Result<Value, Error> {
    let (a, b) = numeric_operands("/", args)?;
    if b.is_zero() {
        return Err(Error::DivisionByZero);
    }
    Ok(Value::Number(Number::Float(a.as_f64() / b.as_f64())))
}

macro_rules! numeric_comparison {
    ($name:ident, $id:literal, $op:tt) => {
        fn $name(args: &[Value]) -> Result<Value, Error> {
            let (a, b) = numeric_operands($id, args)?;
            Ok(Value::Bool(a $op b))
        }
    };
}

numeric_comparison!(builtin_eq, "=", ==);
numeric_comparison!(builtin_ne, "!=", !=);
numeric_comparison!(builtin_gt, ">", >);
numeric_comparison!(builtin_lt, "<", <);
numeric_comparison!(builtin_le, "<=", <=);
numeric_comparison!(builtin_ge, ">=", >=);

/// Global registry of all primitive operations.
static BUILTIN_OPS: LazyLock<Vec<BuiltinOp>> = LazyLock::new(|| {
    fn binary(id: &'static str, func: fn(&[Value]) -> Result<Value, Error>) -> BuiltinOp {
        BuiltinOp {
            id,
            arity: Arity::Exact(2),
            func,
        }
    }

    vec![
        // Arithmetic operations
        binary("+", builtin_add),
        binary("-", builtin_sub),
        binary("*", builtin_mul),
        binary("/", builtin_div),
        // Comparison operations
        binary("!=", builtin_ne),
        binary("=", builtin_eq),
        binary(">", builtin_gt),
        binary("<", builtin_lt),
        binary("<=", builtin_le),
        binary(">=", builtin_ge),
    ]
});

/// Lazy static map from id to BuiltinOp (private - use find_builtin_op)
static BUILTIN_BY_ID: LazyLock<HashMap<&'static str, &'static BuiltinOp>> = LazyLock::new(|| {
    let ops: &'static [BuiltinOp] = BUILTIN_OPS.as_slice();
    ops.iter().map(|op| (op.id, op)).collect()
});

/// Get all primitive operations, in table order
pub fn get_builtin_ops() -> &'static [BuiltinOp] {
    BUILTIN_OPS.as_slice()
}

/// Find a primitive operation by its symbol
pub fn find_builtin_op(id: &str) -> Option<&'static BuiltinOp> {
    BUILTIN_BY_ID.get(id).copied()
}
