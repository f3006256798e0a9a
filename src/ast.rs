//! This module defines the expression tree shared by the evaluator's input and
//! output. The main enum, [`Value`], covers every shape an expression or a
//! result can take: numbers, booleans, symbols, compound forms, native
//! builtins, user-defined procedures and the unspecified result of `define`.
//! Since there is no reader, helper functions such as [`val`], [`sym`] and
//! [`nil`] together with the `From` conversions are the way to build trees in
//! code and in tests.

use crate::builtinops::OperationFn;
use crate::procedure::Procedure;
use std::cmp::Ordering;
use std::rc::Rc;

/// Type alias for integer values in the interpreter
pub type NumberType = i64;

/// Numeric literal: an integer or a floating point number.
///
/// Integers and floats compare by numeric value, so `Int(2) == Float(2.0)`.
#[derive(Debug, Clone, Copy)]
pub enum Number {
    Int(NumberType),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(n) => n as f64,
            Number::Float(x) => x,
        }
    }

    pub fn is_zero(self) -> bool {
        match self {
            Number::Int(n) => n == 0,
            Number::Float(x) => x == 0.0,
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a == b,
            _ => self.as_f64() == other.as_f64(),
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a.partial_cmp(b),
            _ => self.as_f64().partial_cmp(&other.as_f64()),
        }
    }
}

impl std::fmt::Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Number::Int(n) => write!(f, "{n}"),
            // Debug formatting keeps the trailing ".0" on whole floats
            Number::Float(x) => write!(f, "{x:?}"),
        }
    }
}

/// The special forms recognised by the evaluator.
///
/// A compound form whose head is one of these keywords is interpreted
/// structurally instead of being applied. The keywords cannot be shadowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialForm {
    Define,
    If,
    Lambda,
}

impl SpecialForm {
    pub fn from_keyword(name: &str) -> Option<Self> {
        match name {
            "define" => Some(SpecialForm::Define),
            "if" => Some(SpecialForm::If),
            "lambda" => Some(SpecialForm::Lambda),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            SpecialForm::Define => "define",
            SpecialForm::If => "if",
            SpecialForm::Lambda => "lambda",
        }
    }
}

/// Core expression type of the interpreter
///
/// Expressions and evaluation results share this type: a procedure or a
/// boolean produced by evaluation can be placed back into a tree (the
/// substitution strategy does exactly that) and evaluates to itself.
///
/// To build a tree, use the helper functions:
/// - `val(42)` for numbers, `sym("name")` for symbols, `nil()` for empty lists
/// - `val([1, 2, 3])` for homogeneous lists
/// - `val(vec![sym("op"), val(42)])` for mixed lists
#[derive(Clone)]
pub enum Value {
    /// Numbers (integer or floating point)
    Number(Number),
    /// Booleans, produced by the comparison primitives
    Bool(bool),
    /// Symbols (identifiers)
    Symbol(String),
    /// Compound forms
    List(Vec<Value>),
    /// Native functions: the primitive table and caller-registered builtins.
    /// Uses the id string for equality comparison instead of the function pointer.
    BuiltinFunction { id: String, func: Rc<OperationFn> },
    /// User-defined procedures created by `lambda`
    Procedure(Rc<Procedure>),
    /// Unspecified values (the result of define).
    /// These values never equal themselves or any other value
    Unspecified,
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Number(Number::Int(n)) => write!(f, "Int({n})"),
            Value::Number(Number::Float(x)) => write!(f, "Float({x:?})"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Symbol(s) => write!(f, "Symbol({s})"),
            Value::List(list) => {
                write!(f, "List(")?;
                for (i, v) in list.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v:?}")?;
                }
                write!(f, ")")
            }
            Value::BuiltinFunction { id, .. } => write!(f, "BuiltinFunction({id})"),
            Value::Procedure(proc) => write!(f, "{proc:?}"),
            Value::Unspecified => write!(f, "Unspecified"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Number(Number::Float(x))
    }
}

impl From<Procedure> for Value {
    fn from(proc: Procedure) -> Self {
        Value::Procedure(Rc::new(proc))
    }
}

macro_rules! impl_from_integer {
    ($int_type:ty) => {
        impl From<$int_type> for Value {
            fn from(n: $int_type) -> Self {
                Value::Number(Number::Int(NumberType::from(n)))
            }
        }
    };
}

impl_from_integer!(i8);
impl_from_integer!(i16);
impl_from_integer!(i32);
impl_from_integer!(NumberType);
impl_from_integer!(u8);
impl_from_integer!(u16);
impl_from_integer!(u32);

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(|x| x.into()).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(arr: [T; N]) -> Self {
        Value::List(arr.into_iter().map(|x| x.into()).collect())
    }
}

impl<T: Into<Value> + Clone> From<&[T]> for Value {
    fn from(slice: &[T]) -> Self {
        Value::List(slice.iter().cloned().map(|x| x.into()).collect())
    }
}

/// Helper function for creating symbols - works great in mixed lists!
pub fn sym<S: AsRef<str>>(name: S) -> Value {
    Value::Symbol(name.as_ref().to_owned())
}

/// Helper function for creating Values from anything convertible
pub fn val<T: Into<Value>>(value: T) -> Value {
    value.into()
}

/// Helper function for creating the empty list
pub fn nil() -> Value {
    Value::List(vec![])
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{}", if *b { "#t" } else { "#f" }),
            Value::Symbol(s) => write!(f, "{s}"),
            Value::List(elements) => {
                write!(f, "(")?;
                for (i, elem) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{elem}")?;
                }
                write!(f, ")")
            }
            Value::BuiltinFunction { id, .. } => write!(f, "#<builtin-function:{id}>"),
            Value::Procedure(proc) => write!(f, "#<procedure ({})>", proc.params().join(" ")),
            Value::Unspecified => write!(f, "#<unspecified>"),
        }
    }
}

impl Value {
    /// Truthiness used by `if`: false, numeric zero, the empty list and the
    /// unspecified value are false, everything else is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Number(n) => !n.is_zero(),
            Value::List(_) => !self.is_nil(),
            Value::Unspecified => false,
            Value::Symbol(_) | Value::BuiltinFunction { .. } | Value::Procedure(_) => true,
        }
    }

    /// Check if a value represents nil (empty list)
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::List(list) if list.is_empty())
    }

    /// Check if a value can be invoked by application
    pub fn is_callable(&self) -> bool {
        matches!(self, Value::BuiltinFunction { .. } | Value::Procedure(_))
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Value::Symbol(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Short name of the variant, used in type mismatch messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Bool(_) => "boolean",
            Value::Symbol(_) => "symbol",
            Value::List(_) => "list",
            Value::BuiltinFunction { .. } => "builtin function",
            Value::Procedure(_) => "procedure",
            Value::Unspecified => "unspecified",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::BuiltinFunction { id: id1, .. }, Value::BuiltinFunction { id: id2, .. }) => {
                id1 == id2
            }
            (Value::Procedure(p1), Value::Procedure(p2)) => Rc::ptr_eq(p1, p2) || p1 == p2,
            (Value::Unspecified, _) | (_, Value::Unspecified) => false, // Unspecified never equals anything
            _ => false,
        }
    }
}
