//! Boundary with the expression-graph runtime.
//!
//! The EDSL never materializes code itself. Every node it builds is a request made to a [`Runtime`], which owns the
//! actual graph vertices and turns them into shader code later on. The EDSL only hands out [`Handle`]s the runtime gave
//! back, after the type tables accepted the request.

use std::fmt;

use crate::shader::{
  edsl::{
    promote::{BinOp, UnOp},
    types::ValueType,
  },
  types::Value,
};

/// Opaque reference to a vertex owned by a [`Runtime`].
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Handle(u64);

impl Handle {
  pub const fn new(raw: u64) -> Self {
    Handle(raw)
  }

  pub const fn raw(self) -> u64 {
    self.0
  }
}

impl fmt::Display for Handle {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "%{}", self.0)
  }
}

/// Kind of vertex requested through [`Runtime::construct`].
#[derive(Clone, Debug, PartialEq)]
pub enum OpKind {
  /// A constant value; takes no operand.
  Constant(Value),

  /// A binary operator; operands are `[lhs, rhs]`.
  Binary(BinOp),

  /// A unary operator; takes a single operand.
  Unary(UnOp),

  /// A vector constructor call; operands are the constructor arguments.
  Construct(ValueType),

  /// A numeric conversion; takes a single operand.
  Cast(ValueType),

  /// Filtered texture sampling; operands are `[texture, uv]`.
  Sample,

  /// Raw texel fetch, without filtering; operands are `[texture, uv]`.
  Fetch,
}

/// Kind of texture resource.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TextureKind {
  /// Color texture read with filtered sampling.
  Sampled,

  /// Data texture read texel by texel.
  Data,
}

/// Process-unique identifier of an externally bound resource.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ResourceId(pub(crate) u64);

impl ResourceId {
  pub const fn raw(self) -> u64 {
    self.0
  }
}

/// Texture metadata passed to [`Runtime::declare_texture`].
#[derive(Clone, Debug, PartialEq)]
pub struct TextureDesc {
  pub id: ResourceId,
  pub label: String,

  /// Texel format name, for data textures.
  pub format: Option<String>,

  /// Whether the texture is read with filtered sampling.
  pub filtered: bool,

  /// Type of a sampled texel.
  pub texel: ValueType,
}

/// Expression-graph runtime.
///
/// Implementors own the vertices of one graph. Requests are only made once the EDSL checked them against its type
/// tables, so a runtime never has to reject a construction.
pub trait Runtime {
  /// Create an operation vertex of type `ty` over `operands`.
  fn construct(&mut self, op: OpKind, ty: ValueType, operands: &[Handle]) -> Handle;

  /// Create a vertex reading the `name` accessor of `source`.
  fn access_component(&mut self, source: Handle, name: &str, ty: ValueType) -> Handle;

  /// Declare a uniform of type `ty` seeded with `init`.
  fn declare_uniform(&mut self, ty: ValueType, init: Value) -> Handle;

  /// Declare a named per-vertex input.
  fn declare_attribute(&mut self, ty: ValueType, name: &str) -> Handle;

  /// Declare a texture resource.
  fn declare_texture(&mut self, kind: TextureKind, desc: &TextureDesc) -> Handle;

  /// Materialize `expr` as a mutable register initialized with it.
  fn to_variable(&mut self, expr: Handle, ty: ValueType) -> Handle;

  /// Bind a new expression to a register created by [`Runtime::to_variable`].
  fn rebind(&mut self, var: Handle, expr: Handle);

  /// Attach a debug name to a vertex.
  fn label(&mut self, handle: Handle, name: &str);
}
