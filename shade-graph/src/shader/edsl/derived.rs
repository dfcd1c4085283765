//! Derived composites.
//!
//! Well-known inputs and the composites computed from them. Each of them is built at most once per graph: the first
//! call creates the vertices and later calls return the same node.

use once_cell::unsync::OnceCell;

use crate::{
  error::Result,
  shader::edsl::{
    expr::{Node, Operand},
    graph::ShaderGraph,
    runtime::{Handle, Runtime},
    types::ValueType,
  },
};

/// Handles of the composites already built for a graph.
#[derive(Debug, Default)]
pub(crate) struct Cache {
  uv: OnceCell<Handle>,
  z_index: OnceCell<Handle>,
  view_matrix: OnceCell<Handle>,
  world_matrix: OnceCell<Handle>,
  model_view_matrix: OnceCell<Handle>,
  legacy_uv: OnceCell<Handle>,
  norm_z: OnceCell<Handle>,
  depth_bias: OnceCell<Handle>,
}

impl<R> ShaderGraph<R>
where
  R: Runtime,
{
  /// Texture coordinates attribute (`vec2`).
  pub fn uv(&self) -> Node<'_, R> {
    let handle = *self
      .cache()
      .uv
      .get_or_init(|| self.attribute(ValueType::Vec2, &self.config().names.uv).handle());

    self.node(handle, ValueType::Vec2)
  }

  /// Z-index uniform (`float`), ordering overlapping geometry.
  pub fn z_index(&self) -> Node<'_, R> {
    let handle = *self.cache().z_index.get_or_init(|| {
      self
        .uniform(ValueType::Float)
        .label(&self.config().names.z_index)
        .handle()
    });

    self.node(handle, ValueType::Float)
  }

  /// View matrix uniform (`mat4`).
  pub fn view_matrix(&self) -> Node<'_, R> {
    let handle = *self.cache().view_matrix.get_or_init(|| {
      self
        .uniform(ValueType::Mat4)
        .label(&self.config().names.view_matrix)
        .handle()
    });

    self.node(handle, ValueType::Mat4)
  }

  /// World matrix uniform (`mat4`).
  pub fn world_matrix(&self) -> Node<'_, R> {
    let handle = *self.cache().world_matrix.get_or_init(|| {
      self
        .uniform(ValueType::Mat4)
        .label(&self.config().names.world_matrix)
        .handle()
    });

    self.node(handle, ValueType::Mat4)
  }

  /// `view_matrix * world_matrix`.
  pub fn model_view_matrix(&self) -> Result<Node<'_, R>> {
    let handle = *self
      .cache()
      .model_view_matrix
      .get_or_try_init(|| self.view_matrix().mul(self.world_matrix()).map(|n| n.handle()))?;

    Ok(self.node(handle, ValueType::Mat4))
  }

  /// Texture coordinates with a flipped vertical axis: `vec2(uv.x, 1 - uv.y)`.
  pub fn legacy_uv(&self) -> Result<Node<'_, R>> {
    let handle = *self.cache().legacy_uv.get_or_try_init(|| -> Result<Handle> {
      let uv = self.uv();
      let flipped = self.vec2([Operand::from(uv.x()?), Operand::from(uv.y()?.one_minus()?)])?;
      Ok(flipped.handle())
    })?;

    Ok(self.node(handle, ValueType::Vec2))
  }

  /// Z-index squashed into `[0, 1)`: `z / (z + 1)`.
  pub fn norm_z(&self) -> Result<Node<'_, R>> {
    let handle = *self.cache().norm_z.get_or_try_init(|| {
      let z = self.z_index();
      z.div(z.add(1.)?).map(|n| n.handle())
    })?;

    Ok(self.node(handle, ValueType::Float))
  }

  /// Depth bias vector (`vec3`).
  ///
  /// The component picked by the depth bias configuration is `norm_z / divisor`; the other components are zero.
  pub fn depth_bias(&self) -> Result<Node<'_, R>> {
    let handle = *self.cache().depth_bias.get_or_try_init(|| {
      let config = self.config().depth_bias;
      let bias = self.norm_z()?.div(config.divisor)?;

      let mut args = [Operand::from(0.); 3];
      args[config.component.index()] = bias.into();

      self.vec3(args).map(|n| n.handle())
    })?;

    Ok(self.node(handle, ValueType::Vec3))
  }
}
