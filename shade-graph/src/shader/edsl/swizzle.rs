//! Swizzle interface.
//!
//! Component accessors are resolved against a finite table of `(source type, accessor name) -> result type` entries.
//! Scalars and matrices expose no accessor; vectors expose single-letter accessors up to their arity and the
//! contiguous multi-letter accessors listed in the table.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::{
  error::{Error, Result},
  shader::edsl::types::ValueType,
};

/// Select a channel to extract from into a swizzled expression.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SwizzleSelector {
  /// Select the `.x` (or `.r`) channel.
  X,

  /// Select the `.y` (or `.g`) channel.
  Y,

  /// Select the `.z` (or `.b`) channel.
  Z,

  /// Select the `.w` (or `.a`) channel.
  W,
}

impl SwizzleSelector {
  /// Parse a single accessor letter, either positional (`xyzw`) or color (`rgba`).
  pub fn from_char(c: char) -> Option<Self> {
    match c {
      'x' | 'r' => Some(SwizzleSelector::X),
      'y' | 'g' => Some(SwizzleSelector::Y),
      'z' | 'b' => Some(SwizzleSelector::Z),
      'w' | 'a' => Some(SwizzleSelector::W),
      _ => None,
    }
  }

  /// Component index selected by this channel.
  pub fn index(self) -> usize {
    match self {
      SwizzleSelector::X => 0,
      SwizzleSelector::Y => 1,
      SwizzleSelector::Z => 2,
      SwizzleSelector::W => 3,
    }
  }

  /// Parse every letter of an accessor name.
  pub fn parse(name: &str) -> Option<Vec<Self>> {
    name.chars().map(Self::from_char).collect()
  }
}

/// A `(source, name) -> result` accessor rule.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SwizzleEntry {
  pub source: ValueType,
  pub name: &'static str,
  pub result: ValueType,
}

const fn entry(source: ValueType, name: &'static str, result: ValueType) -> SwizzleEntry {
  SwizzleEntry { source, name, result }
}

macro_rules! swizzle_family {
  ($table:ident, $s:ident, $v2:ident, $v3:ident, $v4:ident) => {
    const $table: [SwizzleEntry; 32] = [
      // 2D
      entry(ValueType::$v2, "x", ValueType::$s),
      entry(ValueType::$v2, "y", ValueType::$s),
      entry(ValueType::$v2, "r", ValueType::$s),
      entry(ValueType::$v2, "g", ValueType::$s),
      entry(ValueType::$v2, "xy", ValueType::$v2),
      entry(ValueType::$v2, "rg", ValueType::$v2),
      // 3D
      entry(ValueType::$v3, "x", ValueType::$s),
      entry(ValueType::$v3, "y", ValueType::$s),
      entry(ValueType::$v3, "z", ValueType::$s),
      entry(ValueType::$v3, "r", ValueType::$s),
      entry(ValueType::$v3, "g", ValueType::$s),
      entry(ValueType::$v3, "b", ValueType::$s),
      entry(ValueType::$v3, "xy", ValueType::$v2),
      entry(ValueType::$v3, "yz", ValueType::$v2),
      entry(ValueType::$v3, "rg", ValueType::$v2),
      entry(ValueType::$v3, "gb", ValueType::$v2),
      entry(ValueType::$v3, "xyz", ValueType::$v3),
      entry(ValueType::$v3, "rgb", ValueType::$v3),
      // 4D
      entry(ValueType::$v4, "x", ValueType::$s),
      entry(ValueType::$v4, "y", ValueType::$s),
      entry(ValueType::$v4, "z", ValueType::$s),
      entry(ValueType::$v4, "w", ValueType::$s),
      entry(ValueType::$v4, "r", ValueType::$s),
      entry(ValueType::$v4, "g", ValueType::$s),
      entry(ValueType::$v4, "b", ValueType::$s),
      entry(ValueType::$v4, "a", ValueType::$s),
      entry(ValueType::$v4, "xy", ValueType::$v2),
      entry(ValueType::$v4, "yz", ValueType::$v2),
      entry(ValueType::$v4, "rg", ValueType::$v2),
      entry(ValueType::$v4, "gb", ValueType::$v2),
      entry(ValueType::$v4, "xyz", ValueType::$v3),
      entry(ValueType::$v4, "rgb", ValueType::$v3),
    ];
  };
}

swizzle_family!(FLOAT_SWIZZLES, Float, Vec2, Vec3, Vec4);
swizzle_family!(INT_SWIZZLES, Int, IVec2, IVec3, IVec4);
swizzle_family!(UINT_SWIZZLES, UInt, UVec2, UVec3, UVec4);

/// Every accessor rule.
pub fn entries() -> impl Iterator<Item = &'static SwizzleEntry> {
  FLOAT_SWIZZLES
    .iter()
    .chain(INT_SWIZZLES.iter())
    .chain(UINT_SWIZZLES.iter())
}

static INDEX: Lazy<HashMap<ValueType, HashMap<&'static str, ValueType>>> = Lazy::new(|| {
  let mut index: HashMap<ValueType, HashMap<&'static str, ValueType>> = HashMap::new();

  for entry in entries() {
    index.entry(entry.source).or_default().insert(entry.name, entry.result);
  }

  index
});

/// Result type of accessing `name` on a `source`-typed value.
///
/// Fails with [`Error::InvalidSwizzle`] if the accessor is not defined for the source type.
pub fn swizzle(source: ValueType, name: &str) -> Result<ValueType> {
  INDEX
    .get(&source)
    .and_then(|accessors| accessors.get(name))
    .copied()
    .ok_or_else(|| {
      log::debug!("rejected swizzle .{name} on {source}");
      Error::InvalidSwizzle {
        ty: source,
        name: name.to_owned(),
      }
    })
}

/// Whether `name` is an accessor of `source`.
pub fn has_component(source: ValueType, name: &str) -> bool {
  INDEX
    .get(&source)
    .is_some_and(|accessors| accessors.contains_key(name))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn accessors_stop_at_the_source_arity() {
    assert_eq!(swizzle(ValueType::Vec2, "y"), Ok(ValueType::Float));
    assert_eq!(swizzle(ValueType::Vec3, "z"), Ok(ValueType::Float));
    assert_eq!(swizzle(ValueType::UVec4, "a"), Ok(ValueType::UInt));

    assert_eq!(
      swizzle(ValueType::Vec2, "z"),
      Err(Error::InvalidSwizzle {
        ty: ValueType::Vec2,
        name: "z".to_owned()
      })
    );
    assert!(swizzle(ValueType::Vec3, "w").is_err());
    assert!(swizzle(ValueType::IVec2, "b").is_err());
  }

  #[test]
  fn multi_letter_accessors_keep_the_source_kind() {
    assert_eq!(swizzle(ValueType::Vec4, "xyz"), Ok(ValueType::Vec3));
    assert_eq!(swizzle(ValueType::IVec3, "yz"), Ok(ValueType::IVec2));
    assert_eq!(swizzle(ValueType::UVec4, "rgb"), Ok(ValueType::UVec3));
    assert_eq!(swizzle(ValueType::Vec3, "gb"), Ok(ValueType::Vec2));

    assert!(swizzle(ValueType::Vec2, "yz").is_err());
    assert!(swizzle(ValueType::Vec2, "xyz").is_err());
    assert!(swizzle(ValueType::Vec4, "zyx").is_err());
  }

  #[test]
  fn scalars_and_matrices_expose_nothing() {
    for ty in [ValueType::Float, ValueType::Int, ValueType::Bool, ValueType::Mat3] {
      assert!(!has_component(ty, "x"));
      assert!(swizzle(ty, "x").is_err());
    }
  }

  #[test]
  fn entries_respect_arity_and_width() {
    for entry in entries() {
      let selectors = SwizzleSelector::parse(entry.name).unwrap();
      let arity = entry.source.dim().width();

      assert!(selectors.iter().all(|s| s.index() < arity), "{}.{}", entry.source, entry.name);
      assert_eq!(selectors.len(), entry.result.dim().width());
      assert_eq!(entry.result.kind(), entry.source.kind());
    }
  }

  #[test]
  fn selectors_accept_both_alphabets() {
    assert_eq!(
      SwizzleSelector::parse("rgb"),
      SwizzleSelector::parse("xyz")
    );
    assert_eq!(SwizzleSelector::parse("xq"), None);
  }
}
