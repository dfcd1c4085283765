//! Shader EDSL type information.

use std::{fmt, str::FromStr};

use crate::error::Error;

/// Closed set of types a node can carry.
///
/// The lattice is made of scalars, float / signed / unsigned vectors and square floating matrices. Every node in a
/// graph is tagged with exactly one [`ValueType`], decided when the node is built and never changed afterwards.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ValueType {
  Bool,
  Int,
  UInt,
  Float,
  Vec2,
  Vec3,
  Vec4,
  IVec2,
  IVec3,
  IVec4,
  UVec2,
  UVec3,
  UVec4,
  Mat2,
  Mat3,
  Mat4,
}

/// Numeric kind of a type.
///
/// Two types of the same kind share the same component representation, e.g. [`ValueType::IVec3`] and
/// [`ValueType::Int`] are both [`Kind::Int`]. Matrices are always [`Kind::Float`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Kind {
  Bool,
  Int,
  UInt,
  Float,
}

/// Dimension of a primitive type.
///
/// Primitive types currently can have one of four dimension:
///
/// - [`Dim::Scalar`]: designates a scalar value.
/// - [`Dim::D2`]: designates a 2D vector.
/// - [`Dim::D3`]: designates a 3D vector.
/// - [`Dim::D4`]: designates a 4D vector.
///
/// Square matrices reuse the same dimensions for their column count.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Dim {
  /// Scalar value.
  Scalar,

  /// 2D vector.
  D2,

  /// 3D vector.
  D3,

  /// 4D vector.
  D4,
}

impl Dim {
  /// Number of components.
  pub const fn width(self) -> usize {
    match self {
      Dim::Scalar => 1,
      Dim::D2 => 2,
      Dim::D3 => 3,
      Dim::D4 => 4,
    }
  }

  /// Dimension holding `width` components, if any.
  pub const fn from_width(width: usize) -> Option<Self> {
    match width {
      1 => Some(Dim::Scalar),
      2 => Some(Dim::D2),
      3 => Some(Dim::D3),
      4 => Some(Dim::D4),
      _ => None,
    }
  }
}

impl ValueType {
  /// Every type of the lattice.
  pub const ALL: [ValueType; 16] = [
    ValueType::Bool,
    ValueType::Int,
    ValueType::UInt,
    ValueType::Float,
    ValueType::Vec2,
    ValueType::Vec3,
    ValueType::Vec4,
    ValueType::IVec2,
    ValueType::IVec3,
    ValueType::IVec4,
    ValueType::UVec2,
    ValueType::UVec3,
    ValueType::UVec4,
    ValueType::Mat2,
    ValueType::Mat3,
    ValueType::Mat4,
  ];

  /// Numeric kind of the components of this type.
  pub const fn kind(self) -> Kind {
    match self {
      ValueType::Bool => Kind::Bool,
      ValueType::Int | ValueType::IVec2 | ValueType::IVec3 | ValueType::IVec4 => Kind::Int,
      ValueType::UInt | ValueType::UVec2 | ValueType::UVec3 | ValueType::UVec4 => Kind::UInt,
      ValueType::Float
      | ValueType::Vec2
      | ValueType::Vec3
      | ValueType::Vec4
      | ValueType::Mat2
      | ValueType::Mat3
      | ValueType::Mat4 => Kind::Float,
    }
  }

  /// Dimension of this type.
  ///
  /// For matrices, this is the number of columns (and rows).
  pub const fn dim(self) -> Dim {
    match self {
      ValueType::Bool | ValueType::Int | ValueType::UInt | ValueType::Float => Dim::Scalar,
      ValueType::Vec2 | ValueType::IVec2 | ValueType::UVec2 | ValueType::Mat2 => Dim::D2,
      ValueType::Vec3 | ValueType::IVec3 | ValueType::UVec3 | ValueType::Mat3 => Dim::D3,
      ValueType::Vec4 | ValueType::IVec4 | ValueType::UVec4 | ValueType::Mat4 => Dim::D4,
    }
  }

  /// Number of scalar components stored by a value of this type.
  pub const fn component_count(self) -> usize {
    let n = self.dim().width();

    if self.is_matrix() {
      n * n
    } else {
      n
    }
  }

  pub const fn is_scalar(self) -> bool {
    matches!(self.dim(), Dim::Scalar)
  }

  pub const fn is_vector(self) -> bool {
    !self.is_scalar() && !self.is_matrix()
  }

  pub const fn is_matrix(self) -> bool {
    matches!(self, ValueType::Mat2 | ValueType::Mat3 | ValueType::Mat4)
  }

  /// Whether values of this type are made of numbers (i.e. not booleans).
  pub const fn is_numeric(self) -> bool {
    !matches!(self, ValueType::Bool)
  }

  /// Build the scalar or vector type of the given kind and dimension.
  ///
  /// Boolean vectors are not part of the lattice, so asking for one yields [`None`].
  pub const fn vector(kind: Kind, dim: Dim) -> Option<Self> {
    let ty = match (kind, dim) {
      (Kind::Bool, Dim::Scalar) => ValueType::Bool,
      (Kind::Int, Dim::Scalar) => ValueType::Int,
      (Kind::UInt, Dim::Scalar) => ValueType::UInt,
      (Kind::Float, Dim::Scalar) => ValueType::Float,
      (Kind::Int, Dim::D2) => ValueType::IVec2,
      (Kind::Int, Dim::D3) => ValueType::IVec3,
      (Kind::Int, Dim::D4) => ValueType::IVec4,
      (Kind::UInt, Dim::D2) => ValueType::UVec2,
      (Kind::UInt, Dim::D3) => ValueType::UVec3,
      (Kind::UInt, Dim::D4) => ValueType::UVec4,
      (Kind::Float, Dim::D2) => ValueType::Vec2,
      (Kind::Float, Dim::D3) => ValueType::Vec3,
      (Kind::Float, Dim::D4) => ValueType::Vec4,
      (Kind::Bool, _) => return None,
    };

    Some(ty)
  }

  /// Scalar type of the components of this type.
  pub const fn scalar(self) -> Self {
    match self.kind() {
      Kind::Bool => ValueType::Bool,
      Kind::Int => ValueType::Int,
      Kind::UInt => ValueType::UInt,
      Kind::Float => ValueType::Float,
    }
  }

  /// Shading-language name of the type, as in `vec3` or `uint`.
  pub const fn name(self) -> &'static str {
    match self {
      ValueType::Bool => "bool",
      ValueType::Int => "int",
      ValueType::UInt => "uint",
      ValueType::Float => "float",
      ValueType::Vec2 => "vec2",
      ValueType::Vec3 => "vec3",
      ValueType::Vec4 => "vec4",
      ValueType::IVec2 => "ivec2",
      ValueType::IVec3 => "ivec3",
      ValueType::IVec4 => "ivec4",
      ValueType::UVec2 => "uvec2",
      ValueType::UVec3 => "uvec3",
      ValueType::UVec4 => "uvec4",
      ValueType::Mat2 => "mat2",
      ValueType::Mat3 => "mat3",
      ValueType::Mat4 => "mat4",
    }
  }
}

impl fmt::Display for ValueType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

impl FromStr for ValueType {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    ValueType::ALL
      .into_iter()
      .find(|ty| ty.name() == s)
      .ok_or_else(|| Error::UnknownType(s.to_owned()))
  }
}

/// Type of an operand in operator position.
///
/// An operand is either a typed node or an untyped numeric literal. Literals are not part of the [`ValueType`] lattice:
/// they unify with a scalar of matching kind, but only where a rule table explicitly accepts them.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum OperandType {
  Typed(ValueType),
  Literal,
}

impl From<ValueType> for OperandType {
  fn from(ty: ValueType) -> Self {
    OperandType::Typed(ty)
  }
}

impl fmt::Display for OperandType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      OperandType::Typed(ty) => fmt::Display::fmt(ty, f),
      OperandType::Literal => f.write_str("literal"),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn names_round_trip_through_from_str() {
    for ty in ValueType::ALL {
      assert_eq!(ty.name().parse::<ValueType>().unwrap(), ty);
    }

    assert_eq!(
      "vec5".parse::<ValueType>(),
      Err(Error::UnknownType("vec5".to_owned()))
    );
  }

  #[test]
  fn vector_rebuilds_scalar_and_vector_types() {
    for ty in ValueType::ALL.into_iter().filter(|ty| !ty.is_matrix()) {
      assert_eq!(ValueType::vector(ty.kind(), ty.dim()), Some(ty));
    }

    assert_eq!(ValueType::vector(Kind::Bool, Dim::D3), None);
  }

  #[test]
  fn matrices_are_float_and_square() {
    assert_eq!(ValueType::Mat3.kind(), Kind::Float);
    assert_eq!(ValueType::Mat3.component_count(), 9);
    assert_eq!(ValueType::Mat3.scalar(), ValueType::Float);
    assert!(!ValueType::Mat3.is_vector());
  }
}
