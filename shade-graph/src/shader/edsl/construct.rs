//! Vector constructors and numeric conversions.
//!
//! A vector constructor accepts a sequence of scalars, literals and smaller vectors whose widths add up to the width of
//! the target. The accepted width sequences are listed per target width below; they are shared by the float, signed
//! and unsigned vector families. Every non-literal argument must have the numeric kind of the target.

use crate::{
  error::{Error, Result},
  shader::edsl::types::{Kind, OperandType, ValueType},
};

/// Argument widths accepted by 2D constructors.
const SHAPES_2: &[&[usize]] = &[&[1, 1], &[2]];

/// Argument widths accepted by 3D constructors.
const SHAPES_3: &[&[usize]] = &[&[1, 1, 1], &[2, 1], &[1, 2], &[3]];

/// Argument widths accepted by 4D constructors.
const SHAPES_4: &[&[usize]] = &[
  &[1, 1, 1, 1],
  &[2, 1, 1],
  &[1, 2, 1],
  &[1, 1, 2],
  &[2, 2],
  &[3, 1],
  &[1, 3],
  &[4],
];

/// Vector types that own a constructor.
pub const CONSTRUCTIBLE: [ValueType; 9] = [
  ValueType::Vec2,
  ValueType::Vec3,
  ValueType::Vec4,
  ValueType::IVec2,
  ValueType::IVec3,
  ValueType::IVec4,
  ValueType::UVec2,
  ValueType::UVec3,
  ValueType::UVec4,
];

/// Argument width sequences accepted by the constructor of `target`.
///
/// Types without a constructor (scalars, booleans and matrices) accept nothing.
pub fn shapes(target: ValueType) -> &'static [&'static [usize]] {
  if !target.is_vector() {
    return &[];
  }

  match target.dim().width() {
    2 => SHAPES_2,
    3 => SHAPES_3,
    4 => SHAPES_4,
    _ => &[],
  }
}

/// Check that `args` build a `target` vector.
///
/// Literals count as one component of the target kind. Fails with [`Error::InvalidConstructorShape`] if an argument
/// has another kind, is a matrix, or if the argument widths do not form one of the accepted sequences.
pub fn resolve(target: ValueType, args: &[OperandType]) -> Result<()> {
  let reject = || {
    log::debug!("rejected {target} constructor with {} argument(s)", args.len());
    Error::InvalidConstructorShape {
      target,
      args: args.to_vec(),
    }
  };

  let widths = args
    .iter()
    .map(|arg| match arg {
      OperandType::Literal => Some(1),
      OperandType::Typed(ty) if ty.is_matrix() || ty.kind() != target.kind() => None,
      OperandType::Typed(ty) => Some(ty.dim().width()),
    })
    .collect::<Option<Vec<_>>>()
    .ok_or_else(reject)?;

  if shapes(target).iter().any(|shape| *shape == widths.as_slice()) {
    Ok(())
  } else {
    Err(reject())
  }
}

/// Check that `from` can be explicitly converted to `to`.
///
/// Conversions change the numeric kind (float, int, uint) of a scalar or vector but never its width. Booleans and
/// matrices are not convertible.
pub fn resolve_cast(from: ValueType, to: ValueType) -> Result<()> {
  let numeric = |ty: ValueType| !ty.is_matrix() && ty.kind() != Kind::Bool;

  if numeric(from) && numeric(to) && from.dim() == to.dim() {
    Ok(())
  } else {
    log::debug!("rejected conversion from {from} to {to}");
    Err(Error::InvalidConstructorShape {
      target: to,
      args: vec![OperandType::Typed(from)],
    })
  }
}
