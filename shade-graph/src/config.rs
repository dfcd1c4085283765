//! Per-graph configuration.
//!
//! Every field has a default matching the conventions of the well-known inputs, so `GraphConfig::default()` is what
//! most hosts want. Configurations can be (de)serialized with [`serde`]; missing fields take their default value.

use serde::{Deserialize, Serialize};

/// Configuration of a [`ShaderGraph`](crate::ShaderGraph).
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct GraphConfig {
  pub depth_bias: DepthBiasConfig,
  pub names: InputNames,
}

/// Shape of the depth bias vector.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct DepthBiasConfig {
  /// The normalized z-index is divided by this value before being used as a bias.
  pub divisor: f32,

  /// Component of the bias vector carrying the bias; the other ones are zero.
  pub component: Axis,
}

impl Default for DepthBiasConfig {
  fn default() -> Self {
    DepthBiasConfig {
      divisor: 1_000_000.,
      component: Axis::Z,
    }
  }
}

/// A component of a 3D vector.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
  X,
  Y,
  #[default]
  Z,
}

impl Axis {
  pub const fn index(self) -> usize {
    match self {
      Axis::X => 0,
      Axis::Y => 1,
      Axis::Z => 2,
    }
  }
}

/// Names of the well-known inputs.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct InputNames {
  /// Texture coordinates attribute.
  pub uv: String,

  /// Float uniform ordering overlapping geometry.
  pub z_index: String,

  pub view_matrix: String,
  pub world_matrix: String,
}

impl Default for InputNames {
  fn default() -> Self {
    InputNames {
      uv: "uv".to_owned(),
      z_index: "z_index".to_owned(),
      view_matrix: "view_matrix".to_owned(),
      world_matrix: "world_matrix".to_owned(),
    }
  }
}
