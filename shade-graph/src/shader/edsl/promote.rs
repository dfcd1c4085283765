//! Operator promotion tables.
//!
//! Each operator owns a finite table of `(receiver, operand) -> result` entries. The receiver is always the node the
//! operator method is called on; the operand is either another node or a literal. A combination that is not listed is
//! rejected; there is no implicit widening or truncation.
//!
//! Tables are keyed on the call direction: `vec3 * float` is listed, `float * vec3` is not.

use std::{collections::HashMap, fmt};

use once_cell::sync::Lazy;

use crate::{
  error::{Error, Operator, Result},
  shader::edsl::types::{OperandType, ValueType},
};

/// Binary operators.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum BinOp {
  Mul,
  Add,
  Sub,
  Div,
  LessThan,
}

impl BinOp {
  pub const ALL: [BinOp; 5] = [BinOp::Mul, BinOp::Add, BinOp::Sub, BinOp::Div, BinOp::LessThan];
}

impl fmt::Display for BinOp {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      BinOp::Mul => "mul",
      BinOp::Add => "add",
      BinOp::Sub => "sub",
      BinOp::Div => "div",
      BinOp::LessThan => "lessThan",
    };

    f.write_str(name)
  }
}

/// Unary operators.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum UnOp {
  /// `1 - x`.
  OneMinus,
}

impl fmt::Display for UnOp {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      UnOp::OneMinus => f.write_str("oneMinus"),
    }
  }
}

/// A single `(receiver, operand) -> result` rule of a binary operator.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct PromotionEntry {
  pub lhs: ValueType,
  pub rhs: OperandType,
  pub result: ValueType,
}

macro_rules! operand {
  (Lit) => {
    OperandType::Literal
  };

  ($t:ident) => {
    OperandType::Typed(ValueType::$t)
  };
}

macro_rules! rules {
  ($($lhs:ident, $rhs:ident => $res:ident;)*) => {
    &[$(
      PromotionEntry {
        lhs: ValueType::$lhs,
        rhs: operand!($rhs),
        result: ValueType::$res,
      },
    )*]
  };
}

const MUL_RULES: &[PromotionEntry] = rules! {
  Float, Float => Float;
  Float, Lit => Float;
  Int, Int => Int;
  Int, Lit => Int;
  UInt, UInt => UInt;
  UInt, Lit => UInt;

  Vec2, Vec2 => Vec2;
  Vec2, Float => Vec2;
  Vec2, Lit => Vec2;
  Vec3, Vec3 => Vec3;
  Vec3, Float => Vec3;
  Vec3, Lit => Vec3;
  Vec4, Vec4 => Vec4;
  Vec4, Float => Vec4;
  Vec4, Lit => Vec4;

  IVec2, IVec2 => IVec2;
  IVec2, Int => IVec2;
  IVec2, Lit => IVec2;
  IVec3, IVec3 => IVec3;
  IVec3, Int => IVec3;
  IVec3, Lit => IVec3;
  IVec4, IVec4 => IVec4;
  IVec4, Int => IVec4;
  IVec4, Lit => IVec4;

  UVec2, UVec2 => UVec2;
  UVec2, UInt => UVec2;
  UVec2, Lit => UVec2;
  UVec3, UVec3 => UVec3;
  UVec3, UInt => UVec3;
  UVec3, Lit => UVec3;
  UVec4, UVec4 => UVec4;
  UVec4, UInt => UVec4;
  UVec4, Lit => UVec4;

  Mat2, Mat2 => Mat2;
  Mat2, Vec2 => Vec2;
  Mat2, Float => Mat2;
  Mat2, Lit => Mat2;
  Mat3, Mat3 => Mat3;
  Mat3, Vec3 => Vec3;
  Mat3, Float => Mat3;
  Mat3, Lit => Mat3;
  Mat4, Mat4 => Mat4;
  Mat4, Vec4 => Vec4;
  Mat4, Float => Mat4;
  Mat4, Lit => Mat4;
};

// shared by add and sub
const ADD_RULES: &[PromotionEntry] = rules! {
  Float, Float => Float;
  Float, Lit => Float;
  Int, Int => Int;
  Int, Lit => Int;
  UInt, UInt => UInt;
  UInt, Lit => UInt;

  Vec2, Vec2 => Vec2;
  Vec2, Float => Vec2;
  Vec2, Lit => Vec2;
  Vec3, Vec3 => Vec3;
  Vec3, Float => Vec3;
  Vec3, Lit => Vec3;
  Vec4, Vec4 => Vec4;
  Vec4, Float => Vec4;
  Vec4, Lit => Vec4;

  IVec2, IVec2 => IVec2;
  IVec2, Int => IVec2;
  IVec2, Lit => IVec2;
  IVec3, IVec3 => IVec3;
  IVec3, Int => IVec3;
  IVec3, Lit => IVec3;
  IVec4, IVec4 => IVec4;
  IVec4, Int => IVec4;
  IVec4, Lit => IVec4;

  UVec2, UVec2 => UVec2;
  UVec2, UInt => UVec2;
  UVec2, Lit => UVec2;
  UVec3, UVec3 => UVec3;
  UVec3, UInt => UVec3;
  UVec3, Lit => UVec3;
  UVec4, UVec4 => UVec4;
  UVec4, UInt => UVec4;
  UVec4, Lit => UVec4;

  Mat2, Mat2 => Mat2;
  Mat2, Float => Mat2;
  Mat2, Lit => Mat2;
  Mat3, Mat3 => Mat3;
  Mat3, Float => Mat3;
  Mat3, Lit => Mat3;
  Mat4, Mat4 => Mat4;
  Mat4, Float => Mat4;
  Mat4, Lit => Mat4;
};

const DIV_RULES: &[PromotionEntry] = rules! {
  Float, Float => Float;
  Float, Lit => Float;
  Int, Int => Int;
  Int, Lit => Int;
  UInt, UInt => UInt;
  UInt, Lit => UInt;

  Vec2, Float => Vec2;
  Vec2, Lit => Vec2;
  Vec3, Float => Vec3;
  Vec3, Lit => Vec3;
  Vec4, Float => Vec4;
  Vec4, Lit => Vec4;

  IVec2, Int => IVec2;
  IVec2, Lit => IVec2;
  IVec3, Int => IVec3;
  IVec3, Lit => IVec3;
  IVec4, Int => IVec4;
  IVec4, Lit => IVec4;

  UVec2, UInt => UVec2;
  UVec2, Lit => UVec2;
  UVec3, UInt => UVec3;
  UVec3, Lit => UVec3;
  UVec4, UInt => UVec4;
  UVec4, Lit => UVec4;

  Mat2, Float => Mat2;
  Mat2, Lit => Mat2;
  Mat3, Float => Mat3;
  Mat3, Lit => Mat3;
  Mat4, Float => Mat4;
  Mat4, Lit => Mat4;
};

const LESS_THAN_RULES: &[PromotionEntry] = rules! {
  Float, Float => Bool;
  Float, Lit => Bool;
  Int, Int => Bool;
  Int, Lit => Bool;
  UInt, UInt => Bool;
  UInt, Lit => Bool;
};

const ONE_MINUS_RULES: &[(ValueType, ValueType)] = &[
  (ValueType::Float, ValueType::Float),
  (ValueType::Int, ValueType::Int),
  (ValueType::UInt, ValueType::UInt),
];

/// Rule table of a binary operator.
pub fn rules(op: BinOp) -> &'static [PromotionEntry] {
  match op {
    BinOp::Mul => MUL_RULES,
    BinOp::Add | BinOp::Sub => ADD_RULES,
    BinOp::Div => DIV_RULES,
    BinOp::LessThan => LESS_THAN_RULES,
  }
}

/// Rule table of a unary operator, as `(operand, result)` pairs.
pub fn unary_rules(op: UnOp) -> &'static [(ValueType, ValueType)] {
  match op {
    UnOp::OneMinus => ONE_MINUS_RULES,
  }
}

static BINARY_INDEX: Lazy<HashMap<(BinOp, ValueType, OperandType), ValueType>> = Lazy::new(|| {
  let mut index = HashMap::new();

  for op in BinOp::ALL {
    for entry in rules(op) {
      let previous = index.insert((op, entry.lhs, entry.rhs), entry.result);
      debug_assert!(
        previous.is_none() || previous == Some(entry.result),
        "{op} has conflicting results for ({}, {})",
        entry.lhs,
        entry.rhs
      );
    }
  }

  index
});

/// Result type of `lhs op rhs`.
///
/// Fails with [`Error::TypeMismatch`] if the operator table has no entry for the pair.
pub fn lookup(op: BinOp, lhs: ValueType, rhs: OperandType) -> Result<ValueType> {
  BINARY_INDEX
    .get(&(op, lhs, rhs))
    .copied()
    .ok_or_else(|| Error::type_mismatch(Operator::Binary(op), [OperandType::Typed(lhs), rhs]))
}

/// Result type of `op operand`.
pub fn lookup_unary(op: UnOp, operand: ValueType) -> Result<ValueType> {
  unary_rules(op)
    .iter()
    .find(|(ty, _)| *ty == operand)
    .map(|(_, result)| *result)
    .ok_or_else(|| Error::type_mismatch(Operator::Unary(op), [OperandType::Typed(operand)]))
}
