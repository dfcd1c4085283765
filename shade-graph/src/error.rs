//! Errors raised while building expression graphs.

use std::fmt;

use crate::shader::edsl::{
  promote::{BinOp, UnOp},
  runtime::Handle,
  types::{OperandType, ValueType},
};

/// Result type using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Graph construction errors.
///
/// Every error is raised synchronously by the call that introduced it, before anything is requested from the runtime.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum Error {
  /// An operator was applied to operands absent from its promotion table.
  #[error("type mismatch: `{}` is not defined for ({})", .op, join(.operands))]
  TypeMismatch { op: Operator, operands: Vec<OperandType> },

  /// A component accessor is not defined on the source type.
  #[error("invalid swizzle: `.{name}` is not defined on {ty}")]
  InvalidSwizzle { ty: ValueType, name: String },

  /// The arguments of a constructor or conversion do not rebuild the target type.
  #[error("invalid constructor shape: {} cannot be built from ({})", .target, join(.args))]
  InvalidConstructorShape { target: ValueType, args: Vec<OperandType> },

  /// An assignment was attempted on a node that is not a variable.
  #[error("cannot assign to a {ty} expression that is not a variable")]
  UnboundVariableAssign { ty: ValueType },

  /// A node built for another graph was handed to this one.
  #[error("{handle} belongs to another graph")]
  ForeignNode { handle: Handle },

  /// A handle does not refer to the expected kind of vertex.
  #[error("{handle} is not a {expected}")]
  InvalidHandle { handle: Handle, expected: &'static str },

  /// A type name does not belong to the lattice.
  #[error("unknown type `{0}`")]
  UnknownType(String),

  /// The reference evaluator cannot compute a value for a vertex.
  #[error("cannot evaluate: {0}")]
  Unevaluable(String),
}

impl Error {
  pub(crate) fn type_mismatch(op: Operator, operands: impl IntoIterator<Item = OperandType>) -> Self {
    let err = Error::TypeMismatch {
      op,
      operands: operands.into_iter().collect(),
    };

    log::debug!("{err}");
    err
  }
}

/// Operation named by a [`Error::TypeMismatch`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Operator {
  Binary(BinOp),
  Unary(UnOp),
  Assign,
  Sample,
}

impl fmt::Display for Operator {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Operator::Binary(op) => fmt::Display::fmt(op, f),
      Operator::Unary(op) => fmt::Display::fmt(op, f),
      Operator::Assign => f.write_str("assign"),
      Operator::Sample => f.write_str("sample"),
    }
  }
}

fn join(operands: &[OperandType]) -> String {
  operands.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn messages_name_operator_and_operands() {
    let err = Error::type_mismatch(
      Operator::Binary(BinOp::Mul),
      [OperandType::Typed(ValueType::Float), OperandType::Typed(ValueType::Vec3)],
    );
    assert_eq!(err.to_string(), "type mismatch: `mul` is not defined for (float, vec3)");

    let err = Error::InvalidConstructorShape {
      target: ValueType::Vec3,
      args: vec![OperandType::Typed(ValueType::Vec2), OperandType::Literal, OperandType::Literal],
    };
    assert_eq!(
      err.to_string(),
      "invalid constructor shape: vec3 cannot be built from (vec2, literal, literal)"
    );
  }
}
