//! Concrete values carried by uniforms, constants and the reference evaluator.
//!
//! Vectors and matrices are represented with [`glam`] types. Matrices are column-major, as in GLSL.

use glam::{IVec2, IVec3, IVec4, Mat2, Mat3, Mat4, UVec2, UVec3, UVec4, Vec2, Vec3, Vec4};

use crate::shader::edsl::types::{Kind, ValueType};

/// A value of one of the [`ValueType`]s.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value {
  Bool(bool),
  Int(i32),
  UInt(u32),
  Float(f32),
  Vec2(Vec2),
  Vec3(Vec3),
  Vec4(Vec4),
  IVec2(IVec2),
  IVec3(IVec3),
  IVec4(IVec4),
  UVec2(UVec2),
  UVec3(UVec3),
  UVec4(UVec4),
  Mat2(Mat2),
  Mat3(Mat3),
  Mat4(Mat4),
}

/// A single component of a [`Value`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Scalar {
  Bool(bool),
  Int(i32),
  UInt(u32),
  Float(f32),
}

impl Scalar {
  /// Convert the component to another numeric kind, as a shading-language conversion constructor would.
  pub fn convert(self, kind: Kind) -> Scalar {
    match (self, kind) {
      (Scalar::Bool(b), Kind::Bool) => Scalar::Bool(b),
      (Scalar::Bool(b), Kind::Int) => Scalar::Int(b as i32),
      (Scalar::Bool(b), Kind::UInt) => Scalar::UInt(b as u32),
      (Scalar::Bool(b), Kind::Float) => Scalar::Float(if b { 1. } else { 0. }),
      (Scalar::Int(i), Kind::Bool) => Scalar::Bool(i != 0),
      (Scalar::Int(i), Kind::Int) => Scalar::Int(i),
      (Scalar::Int(i), Kind::UInt) => Scalar::UInt(i as u32),
      (Scalar::Int(i), Kind::Float) => Scalar::Float(i as f32),
      (Scalar::UInt(u), Kind::Bool) => Scalar::Bool(u != 0),
      (Scalar::UInt(u), Kind::Int) => Scalar::Int(u as i32),
      (Scalar::UInt(u), Kind::UInt) => Scalar::UInt(u),
      (Scalar::UInt(u), Kind::Float) => Scalar::Float(u as f32),
      (Scalar::Float(f), Kind::Bool) => Scalar::Bool(f != 0.),
      (Scalar::Float(f), Kind::Int) => Scalar::Int(f as i32),
      (Scalar::Float(f), Kind::UInt) => Scalar::UInt(f as u32),
      (Scalar::Float(f), Kind::Float) => Scalar::Float(f),
    }
  }
}

impl Value {
  /// Type of the value.
  pub fn ty(&self) -> ValueType {
    match self {
      Value::Bool(_) => ValueType::Bool,
      Value::Int(_) => ValueType::Int,
      Value::UInt(_) => ValueType::UInt,
      Value::Float(_) => ValueType::Float,
      Value::Vec2(_) => ValueType::Vec2,
      Value::Vec3(_) => ValueType::Vec3,
      Value::Vec4(_) => ValueType::Vec4,
      Value::IVec2(_) => ValueType::IVec2,
      Value::IVec3(_) => ValueType::IVec3,
      Value::IVec4(_) => ValueType::IVec4,
      Value::UVec2(_) => ValueType::UVec2,
      Value::UVec3(_) => ValueType::UVec3,
      Value::UVec4(_) => ValueType::UVec4,
      Value::Mat2(_) => ValueType::Mat2,
      Value::Mat3(_) => ValueType::Mat3,
      Value::Mat4(_) => ValueType::Mat4,
    }
  }

  /// Canonical default of a type.
  ///
  /// Scalars and vectors default to zero, booleans to `false` and matrices to the identity.
  pub fn default_for(ty: ValueType) -> Self {
    match ty {
      ValueType::Bool => Value::Bool(false),
      ValueType::Int => Value::Int(0),
      ValueType::UInt => Value::UInt(0),
      ValueType::Float => Value::Float(0.),
      ValueType::Vec2 => Value::Vec2(Vec2::ZERO),
      ValueType::Vec3 => Value::Vec3(Vec3::ZERO),
      ValueType::Vec4 => Value::Vec4(Vec4::ZERO),
      ValueType::IVec2 => Value::IVec2(IVec2::ZERO),
      ValueType::IVec3 => Value::IVec3(IVec3::ZERO),
      ValueType::IVec4 => Value::IVec4(IVec4::ZERO),
      ValueType::UVec2 => Value::UVec2(UVec2::ZERO),
      ValueType::UVec3 => Value::UVec3(UVec3::ZERO),
      ValueType::UVec4 => Value::UVec4(UVec4::ZERO),
      ValueType::Mat2 => Value::Mat2(Mat2::IDENTITY),
      ValueType::Mat3 => Value::Mat3(Mat3::IDENTITY),
      ValueType::Mat4 => Value::Mat4(Mat4::IDENTITY),
    }
  }

  /// Components of the value, column-major for matrices.
  pub fn scalars(&self) -> Vec<Scalar> {
    fn floats(fs: &[f32]) -> Vec<Scalar> {
      fs.iter().copied().map(Scalar::Float).collect()
    }

    fn ints(is: &[i32]) -> Vec<Scalar> {
      is.iter().copied().map(Scalar::Int).collect()
    }

    fn uints(us: &[u32]) -> Vec<Scalar> {
      us.iter().copied().map(Scalar::UInt).collect()
    }

    match self {
      Value::Bool(b) => vec![Scalar::Bool(*b)],
      Value::Int(i) => vec![Scalar::Int(*i)],
      Value::UInt(u) => vec![Scalar::UInt(*u)],
      Value::Float(f) => vec![Scalar::Float(*f)],
      Value::Vec2(v) => floats(&v.to_array()),
      Value::Vec3(v) => floats(&v.to_array()),
      Value::Vec4(v) => floats(&v.to_array()),
      Value::IVec2(v) => ints(&v.to_array()),
      Value::IVec3(v) => ints(&v.to_array()),
      Value::IVec4(v) => ints(&v.to_array()),
      Value::UVec2(v) => uints(&v.to_array()),
      Value::UVec3(v) => uints(&v.to_array()),
      Value::UVec4(v) => uints(&v.to_array()),
      Value::Mat2(m) => floats(&m.to_cols_array()),
      Value::Mat3(m) => floats(&m.to_cols_array()),
      Value::Mat4(m) => floats(&m.to_cols_array()),
    }
  }

  /// Rebuild a value of type `ty` from its components.
  ///
  /// Components are converted to the kind of `ty`. Returns [`None`] if the number of components does not match.
  pub fn from_scalars(ty: ValueType, scalars: &[Scalar]) -> Option<Self> {
    if scalars.len() != ty.component_count() {
      return None;
    }

    let kind = ty.kind();
    let converted: Vec<Scalar> = scalars.iter().map(|s| s.convert(kind)).collect();

    let fs: Vec<f32> = converted
      .iter()
      .filter_map(|s| if let Scalar::Float(f) = s { Some(*f) } else { None })
      .collect();
    let is: Vec<i32> = converted
      .iter()
      .filter_map(|s| if let Scalar::Int(i) = s { Some(*i) } else { None })
      .collect();
    let us: Vec<u32> = converted
      .iter()
      .filter_map(|s| if let Scalar::UInt(u) = s { Some(*u) } else { None })
      .collect();

    let value = match ty {
      ValueType::Bool => match converted[0] {
        Scalar::Bool(b) => Value::Bool(b),
        _ => return None,
      },
      ValueType::Int => Value::Int(is[0]),
      ValueType::UInt => Value::UInt(us[0]),
      ValueType::Float => Value::Float(fs[0]),
      ValueType::Vec2 => Value::Vec2(Vec2::from_slice(&fs)),
      ValueType::Vec3 => Value::Vec3(Vec3::from_slice(&fs)),
      ValueType::Vec4 => Value::Vec4(Vec4::from_slice(&fs)),
      ValueType::IVec2 => Value::IVec2(IVec2::from_slice(&is)),
      ValueType::IVec3 => Value::IVec3(IVec3::from_slice(&is)),
      ValueType::IVec4 => Value::IVec4(IVec4::from_slice(&is)),
      ValueType::UVec2 => Value::UVec2(UVec2::from_slice(&us)),
      ValueType::UVec3 => Value::UVec3(UVec3::from_slice(&us)),
      ValueType::UVec4 => Value::UVec4(UVec4::from_slice(&us)),
      ValueType::Mat2 => Value::Mat2(Mat2::from_cols_slice(&fs)),
      ValueType::Mat3 => Value::Mat3(Mat3::from_cols_slice(&fs)),
      ValueType::Mat4 => Value::Mat4(Mat4::from_cols_slice(&fs)),
    };

    Some(value)
  }
}

macro_rules! impl_From_Value {
  ($t:ty, $q:ident) => {
    impl From<$t> for Value {
      fn from(a: $t) -> Self {
        Value::$q(a)
      }
    }
  };
}

impl_From_Value!(bool, Bool);
impl_From_Value!(i32, Int);
impl_From_Value!(u32, UInt);
impl_From_Value!(f32, Float);
impl_From_Value!(Vec2, Vec2);
impl_From_Value!(Vec3, Vec3);
impl_From_Value!(Vec4, Vec4);
impl_From_Value!(IVec2, IVec2);
impl_From_Value!(IVec3, IVec3);
impl_From_Value!(IVec4, IVec4);
impl_From_Value!(UVec2, UVec2);
impl_From_Value!(UVec3, UVec3);
impl_From_Value!(UVec4, UVec4);
impl_From_Value!(Mat2, Mat2);
impl_From_Value!(Mat3, Mat3);
impl_From_Value!(Mat4, Mat4);

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_are_zero_vectors_and_identity_matrices() {
    assert_eq!(Value::default_for(ValueType::Float), Value::Float(0.));
    assert_eq!(Value::default_for(ValueType::Vec2), Value::Vec2(Vec2::ZERO));
    assert_eq!(Value::default_for(ValueType::Vec3), Value::Vec3(Vec3::ZERO));
    assert_eq!(Value::default_for(ValueType::Mat4), Value::Mat4(Mat4::IDENTITY));

    for ty in ValueType::ALL {
      assert_eq!(Value::default_for(ty).ty(), ty);
    }
  }

  #[test]
  fn scalars_rebuild_the_value() {
    let values = [
      Value::Vec3(Vec3::new(1., 2., 3.)),
      Value::IVec4(IVec4::new(-1, 2, -3, 4)),
      Value::UVec2(UVec2::new(7, 9)),
      Value::Mat2(Mat2::from_cols_array(&[1., 2., 3., 4.])),
      Value::Bool(true),
    ];

    for value in values {
      assert_eq!(Value::from_scalars(value.ty(), &value.scalars()), Some(value));
    }

    assert_eq!(Value::from_scalars(ValueType::Vec3, &[Scalar::Float(1.)]), None);
  }

  #[test]
  fn conversion_truncates_floats_toward_zero() {
    assert_eq!(Scalar::Float(-2.7).convert(Kind::Int), Scalar::Int(-2));
    assert_eq!(Scalar::Int(3).convert(Kind::Float), Scalar::Float(3.));
    assert_eq!(Scalar::UInt(0).convert(Kind::Bool), Scalar::Bool(false));
  }
}
