//! Shader inputs.
//!
//! Uniforms, per-vertex attributes and textures: the leaves every expression graph starts from.

use std::{
  fmt, ops,
  sync::atomic::{AtomicU64, Ordering},
};

use crate::{
  error::{Error, Operator, Result},
  shader::{
    edsl::{
      expr::{Node, Operand},
      graph::ShaderGraph,
      recording::ExprGraph,
      runtime::{Handle, OpKind, ResourceId, Runtime, TextureDesc, TextureKind},
      types::{OperandType, ValueType},
    },
    types::Value,
  },
};

static NEXT_RESOURCE_ID: AtomicU64 = AtomicU64::new(1);

/// Allocate a process-unique resource identifier.
pub fn next_resource_id() -> ResourceId {
  ResourceId(NEXT_RESOURCE_ID.fetch_add(1, Ordering::Relaxed))
}

/// Texel type of a data texture format.
///
/// Format names are matched case-insensitively on their suffix: `uint` formats (such as `rgba8uint`) hold unsigned
/// texels, other `int` formats (such as `r16sint`) signed texels, and anything else floating texels.
pub fn texel_type(format: &str) -> ValueType {
  let format = format.to_ascii_lowercase();

  if format.ends_with("uint") {
    ValueType::UVec4
  } else if format.ends_with("int") {
    ValueType::IVec4
  } else {
    ValueType::Vec4
  }
}

impl<R> ShaderGraph<R>
where
  R: Runtime,
{
  /// Uniform seeded with the default value of `ty`.
  ///
  /// Scalars and vectors default to zero, booleans to `false` and matrices to the identity.
  pub fn uniform(&self, ty: ValueType) -> Node<'_, R> {
    self.uniform_with(Value::default_for(ty))
  }

  /// Uniform seeded with `value`; the node has the type of the value.
  pub fn uniform_with(&self, value: impl Into<Value>) -> Node<'_, R> {
    let value = value.into();
    let ty = value.ty();
    let handle = self.emit(|runtime| runtime.declare_uniform(ty, value));
    log::debug!("{handle} is a {ty} uniform");

    self.node(handle, ty)
  }

  /// Named per-vertex input.
  pub fn attribute(&self, ty: ValueType, name: &str) -> Node<'_, R> {
    let handle = self.emit(|runtime| runtime.declare_attribute(ty, name));
    log::debug!("{handle} is the {ty} attribute `{name}`");

    self.node(handle, ty)
  }

  /// Color texture, sampled with filtering at [`ShaderGraph::uv`].
  pub fn texture(&self, label: &str) -> TextureNode<'_, R> {
    let desc = TextureDesc {
      id: next_resource_id(),
      label: label.to_owned(),
      format: None,
      filtered: true,
      texel: ValueType::Vec4,
    };

    self.declare_texture(TextureKind::Sampled, desc)
  }

  /// Data texture, read texel by texel at [`ShaderGraph::uv`].
  ///
  /// The texel type follows from `format`; see [`texel_type`].
  pub fn data_texture(&self, format: &str, label: &str) -> TextureNode<'_, R> {
    let desc = TextureDesc {
      id: next_resource_id(),
      label: label.to_owned(),
      format: Some(format.to_owned()),
      filtered: false,
      texel: texel_type(format),
    };

    self.declare_texture(TextureKind::Data, desc)
  }

  fn declare_texture(&self, kind: TextureKind, desc: TextureDesc) -> TextureNode<'_, R> {
    let resource = self.emit(|runtime| runtime.declare_texture(kind, &desc));
    log::debug!(
      "{resource} is the {kind:?} texture `{}` (resource {})",
      desc.label,
      desc.id.raw()
    );

    TextureNode::read(self, resource, self.uv(), desc)
  }
}

/// Texture read.
///
/// Dereferences to the [`Node`] holding the texel read at the current texture coordinates.
pub struct TextureNode<'g, R = ExprGraph>
where
  R: Runtime,
{
  texel: Node<'g, R>,
  resource: Handle,
  uv: Node<'g, R>,
  desc: TextureDesc,
}

impl<R> Clone for TextureNode<'_, R>
where
  R: Runtime,
{
  fn clone(&self) -> Self {
    Self {
      texel: self.texel,
      resource: self.resource,
      uv: self.uv,
      desc: self.desc.clone(),
    }
  }
}

impl<R> fmt::Debug for TextureNode<'_, R>
where
  R: Runtime,
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TextureNode")
      .field("texel", &self.texel)
      .field("resource", &self.resource)
      .field("uv", &self.uv)
      .field("desc", &self.desc)
      .finish()
  }
}

impl<'g, R> TextureNode<'g, R>
where
  R: Runtime,
{
  fn read(graph: &'g ShaderGraph<R>, resource: Handle, uv: Node<'g, R>, desc: TextureDesc) -> Self {
    let op = if desc.filtered { OpKind::Sample } else { OpKind::Fetch };
    let handle = graph.emit(|runtime| runtime.construct(op, desc.texel, &[resource, uv.handle()]));

    Self {
      texel: graph.node(handle, desc.texel),
      resource,
      uv,
      desc,
    }
  }

  /// Read the same texture at other coordinates.
  ///
  /// `uv` must be a `vec2` of the texture's graph; anything else fails with [`Error::ForeignNode`] or
  /// [`Error::TypeMismatch`].
  pub fn with_uv(&self, uv: Node<'g, R>) -> Result<Self> {
    let graph = self.texel.graph();
    graph.ensure_owned(&Operand::from(uv))?;

    if uv.ty() != ValueType::Vec2 {
      return Err(Error::type_mismatch(
        Operator::Sample,
        [OperandType::Typed(self.desc.texel), uv.ty().into()],
      ));
    }

    Ok(Self::read(graph, self.resource, uv, self.desc.clone()))
  }

  /// Process-unique identifier of the texture resource.
  pub fn id(&self) -> ResourceId {
    self.desc.id
  }

  pub fn label(&self) -> &str {
    &self.desc.label
  }

  /// Whether the texture is read with filtered sampling.
  pub fn is_filtered(&self) -> bool {
    self.desc.filtered
  }

  pub fn format(&self) -> Option<&str> {
    self.desc.format.as_deref()
  }

  /// Coordinates the texture is read at.
  pub fn uv(&self) -> Node<'g, R> {
    self.uv
  }

  /// Runtime vertex of the texture resource itself.
  pub fn resource(&self) -> Handle {
    self.resource
  }

  pub fn desc(&self) -> &TextureDesc {
    &self.desc
  }

  /// Texel read.
  pub fn to_node(&self) -> Node<'g, R> {
    self.texel
  }
}

impl<'g, R> ops::Deref for TextureNode<'g, R>
where
  R: Runtime,
{
  type Target = Node<'g, R>;

  fn deref(&self) -> &Self::Target {
    &self.texel
  }
}

impl<'g, R> From<TextureNode<'g, R>> for Node<'g, R>
where
  R: Runtime,
{
  fn from(t: TextureNode<'g, R>) -> Self {
    t.texel
  }
}

impl<'g, R> From<&TextureNode<'g, R>> for Operand<'g, R>
where
  R: Runtime,
{
  fn from(t: &TextureNode<'g, R>) -> Self {
    t.texel.into()
  }
}

#[cfg(test)]
mod tests {
  use glam::{Mat3, Vec2, Vec3};

  use super::*;
  use crate::shader::edsl::recording::{Bindings, Vertex};

  #[test]
  fn uniforms_default_to_zero_or_identity() {
    let graph: ShaderGraph = ShaderGraph::default();
    let bindings = Bindings::new();

    let cases = [
      (ValueType::Float, Value::Float(0.)),
      (ValueType::Vec2, Value::Vec2(Vec2::ZERO)),
      (ValueType::Vec3, Value::Vec3(Vec3::ZERO)),
      (ValueType::Bool, Value::Bool(false)),
      (ValueType::Mat3, Value::Mat3(Mat3::IDENTITY)),
    ];

    for (ty, expected) in cases {
      let u = graph.uniform(ty);
      assert_eq!(u.ty(), ty);
      assert_eq!(graph.evaluate(&u, &bindings), Ok(expected));
    }
  }

  #[test]
  fn uniform_with_takes_the_value_type() {
    let graph: ShaderGraph = ShaderGraph::default();
    let u = graph.uniform_with(Vec3::new(1., 2., 3.));

    assert_eq!(u.ty(), ValueType::Vec3);
    assert_eq!(
      graph.evaluate(&u, &Bindings::new()),
      Ok(Value::Vec3(Vec3::new(1., 2., 3.)))
    );
  }

  #[test]
  fn texel_types_follow_the_format_suffix() {
    assert_eq!(texel_type("rgba8uint"), ValueType::UVec4);
    assert_eq!(texel_type("R32UINT"), ValueType::UVec4);
    assert_eq!(texel_type("rgba16sint"), ValueType::IVec4);
    assert_eq!(texel_type("r32int"), ValueType::IVec4);
    assert_eq!(texel_type("rgba8unorm"), ValueType::Vec4);
    assert_eq!(texel_type("rgba32float"), ValueType::Vec4);
    assert_eq!(texel_type(""), ValueType::Vec4);
  }

  #[test]
  fn textures_read_at_the_shared_uv() {
    let graph: ShaderGraph = ShaderGraph::default();
    let albedo = graph.texture("albedo");
    let ids = graph.data_texture("rgba8uint", "ids");

    assert_eq!(albedo.ty(), ValueType::Vec4);
    assert!(albedo.is_filtered());
    assert_eq!(albedo.format(), None);
    assert_eq!(ids.ty(), ValueType::UVec4);
    assert!(!ids.is_filtered());
    assert_eq!(ids.format(), Some("rgba8uint"));

    assert_eq!(albedo.uv().handle(), graph.uv().handle());
    assert_eq!(ids.uv().handle(), graph.uv().handle());
    assert_ne!(albedo.id(), ids.id());

    let runtime = graph.runtime();
    assert!(matches!(
      runtime.vertex(albedo.handle()),
      Some(Vertex::Op { op: OpKind::Sample, .. })
    ));
    assert!(matches!(
      runtime.vertex(ids.handle()),
      Some(Vertex::Op { op: OpKind::Fetch, .. })
    ));
    assert!(matches!(
      runtime.vertex(ids.resource()),
      Some(Vertex::Texture {
        kind: TextureKind::Data,
        ..
      })
    ));
  }

  #[test]
  fn uv_can_be_replaced_by_a_vec2() {
    let graph: ShaderGraph = ShaderGraph::default();
    let albedo = graph.texture("albedo");
    let shifted = albedo.with_uv(graph.uv().add(0.5).unwrap()).unwrap();

    assert_eq!(shifted.id(), albedo.id());
    assert_eq!(shifted.resource(), albedo.resource());
    assert_ne!(shifted.handle(), albedo.handle());
    assert_ne!(shifted.uv().handle(), graph.uv().handle());

    assert!(matches!(
      albedo.with_uv(graph.uniform(ValueType::Vec3)),
      Err(Error::TypeMismatch {
        op: Operator::Sample,
        ..
      })
    ));
  }

  #[test]
  fn uv_must_come_from_the_texture_graph() {
    let graph: ShaderGraph = ShaderGraph::default();
    let other: ShaderGraph = ShaderGraph::default();
    let albedo = graph.texture("albedo");
    let foreign = other.uv();
    let (here, there) = (graph.runtime().len(), other.runtime().len());

    assert!(matches!(
      albedo.with_uv(foreign),
      Err(Error::ForeignNode { handle }) if handle == foreign.handle()
    ));
    assert_eq!(graph.runtime().len(), here);
    assert_eq!(other.runtime().len(), there);
  }

  #[test]
  fn texture_reads_have_no_reference_value() {
    let graph: ShaderGraph = ShaderGraph::default();
    let albedo = graph.texture("albedo");
    let bindings = Bindings::new().with("uv", Vec2::ZERO);

    assert!(matches!(graph.evaluate(&albedo, &bindings), Err(Error::Unevaluable(_))));
  }
}
