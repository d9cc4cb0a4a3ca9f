use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single argument as carried by the generic transport.
///
/// Typed bindings marshal every in- and out-argument through this enum; the
/// positional order of a `Vec<Value>` frame is the order the interface
/// descriptor declares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Str(String),
    Bytes(Vec<u8>),
}

impl Value {
    /// Variant name, for decode diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Str(_) => "string",
            Value::Bytes(_) => "bytes",
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Value {
        Value::Str(s.to_owned())
    }
}

/// Converts a typed Rust value into its wire [`Value`].
pub trait Encode {
    fn encode(self) -> Value;
}

/// Recovers a typed Rust value from a wire [`Value`].
pub trait Decode: Sized {
    fn decode(val: Value) -> Result<Self, DecodeError>;
}

/// A peer handed back a value of unexpected shape.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum DecodeError {
    #[error("expected {expected}, got {got}")]
    Shape { expected: String, got: String },

    #[error("expected {expected} values, got {got}")]
    Arity { expected: usize, got: usize },

    #[error("malformed wire frame: {0}")]
    Wire(String),
}

impl DecodeError {
    pub fn shape(expected: &str, got: &Value) -> Self {
        DecodeError::Shape {
            expected: expected.to_owned(),
            got: got.kind().to_owned(),
        }
    }

    pub fn arity(expected: usize, got: usize) -> Self {
        DecodeError::Arity { expected, got }
    }
}

macro_rules! impl_value {
    ($rust_type:ty, $kind:literal, $encode_name:pat => $encode_expr:expr, $($decode_arm:tt)*) => {
        impl Encode for $rust_type {
            fn encode(self) -> Value {
                let $encode_name = self;
                $encode_expr
            }
        }

        impl Decode for $rust_type {
            fn decode(val: Value) -> Result<Self, DecodeError> {
                Ok(match val {
                    $($decode_arm)*,
                    other => return Err(DecodeError::shape($kind, &other)),
                })
            }
        }

        impl From<$rust_type> for Value {
            fn from(val: $rust_type) -> Value {
                Encode::encode(val)
            }
        }
    };
}

impl_value!((), "nil", () => Value::Nil, Value::Nil => ());
impl_value!(bool, "bool", b => Value::Bool(b), Value::Bool(b) => b);
impl_value!(i64, "int", n => Value::Int(n), Value::Int(n) => n);
impl_value!(String, "string", s => Value::Str(s), Value::Str(s) => s);
impl_value!(Vec<u8>, "bytes", b => Value::Bytes(b), Value::Bytes(b) => b);
