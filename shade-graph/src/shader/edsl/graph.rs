//! Graph builder.
//!
//! A [`ShaderGraph`] owns a [`Runtime`] and hands out the [`Node`]s built on top of it. Nodes only hold a shared
//! reference to their graph; the runtime sits behind a [`RefCell`] so that building a node never requires a mutable
//! borrow of the graph. A graph is therefore bound to the thread building it.

use std::{
  cell::{Ref, RefCell, RefMut},
  ptr,
};

use crate::{
  config::GraphConfig,
  error::{Error, Result},
  shader::{
    edsl::{
      construct,
      derived::Cache,
      expr::{Node, Operand},
      recording::ExprGraph,
      runtime::{Handle, OpKind, Runtime},
      types::{OperandType, ValueType},
    },
    types::Value,
  },
};

/// Expression graph under construction.
#[derive(Debug)]
pub struct ShaderGraph<R = ExprGraph>
where
  R: Runtime,
{
  runtime: RefCell<R>,
  config: GraphConfig,
  cache: Cache,
}

impl Default for ShaderGraph<ExprGraph> {
  fn default() -> Self {
    Self::new(ExprGraph::new())
  }
}

macro_rules! constructors {
  ($($name:ident => $ty:ident),*) => {
    $(
      #[doc = concat!("`", stringify!($name), "` constructor; see [`ShaderGraph::construct`].")]
      pub fn $name<'g>(&'g self, args: impl IntoIterator<Item = Operand<'g, R>>) -> Result<Node<'g, R>> {
        self.construct(ValueType::$ty, args)
      }
    )*
  };
}

impl<R> ShaderGraph<R>
where
  R: Runtime,
{
  /// Build on top of `runtime` with the default configuration.
  pub fn new(runtime: R) -> Self {
    Self::with_config(runtime, GraphConfig::default())
  }

  pub fn with_config(runtime: R, config: GraphConfig) -> Self {
    Self {
      runtime: RefCell::new(runtime),
      config,
      cache: Cache::default(),
    }
  }

  pub fn config(&self) -> &GraphConfig {
    &self.config
  }

  /// Borrow the runtime.
  ///
  /// # Panics
  ///
  /// Building nodes while the borrow is alive panics.
  pub fn runtime(&self) -> Ref<'_, R> {
    self.runtime.borrow()
  }

  /// Mutably borrow the runtime.
  ///
  /// # Panics
  ///
  /// Building nodes while the borrow is alive panics.
  pub fn runtime_mut(&self) -> RefMut<'_, R> {
    self.runtime.borrow_mut()
  }

  /// Give the runtime back, along with every vertex built so far.
  pub fn into_runtime(self) -> R {
    self.runtime.into_inner()
  }

  pub(crate) fn emit<T>(&self, f: impl FnOnce(&mut R) -> T) -> T {
    f(&mut self.runtime.borrow_mut())
  }

  pub(crate) fn cache(&self) -> &Cache {
    &self.cache
  }

  pub(crate) fn node(&self, handle: Handle, ty: ValueType) -> Node<'_, R> {
    Node::new(self, handle, ty)
  }

  /// Reject nodes built for another graph.
  pub(crate) fn ensure_owned(&self, operand: &Operand<'_, R>) -> Result<()> {
    match operand {
      Operand::Node(node) if !ptr::eq(node.graph(), self) => {
        log::debug!("rejected {}, which belongs to another graph", node.handle());
        Err(Error::ForeignNode { handle: node.handle() })
      }

      _ => Ok(()),
    }
  }

  /// Constant expression.
  pub fn constant(&self, value: impl Into<Value>) -> Node<'_, R> {
    let value = value.into();
    let ty = value.ty();
    let handle = self.emit(|runtime| runtime.construct(OpKind::Constant(value), ty, &[]));

    self.node(handle, ty)
  }

  /// Vector constructor.
  ///
  /// The widths of the arguments (1 for scalars and literals, N for N-dimensional vectors) must add up to the width of
  /// `target`, and every node argument must have the numeric kind of `target`. Otherwise, this fails with
  /// [`Error::InvalidConstructorShape`] and nothing is built. Nodes of another graph fail with [`Error::ForeignNode`].
  ///
  /// # Examples
  ///
  /// ```
  /// use shade_graph::{Operand, ShaderGraph, ValueType};
  ///
  /// let graph: ShaderGraph = ShaderGraph::default();
  /// let xy = graph.uniform(ValueType::IVec2);
  ///
  /// let v = graph.construct(ValueType::IVec3, [Operand::from(xy), Operand::from(7)])?;
  /// assert_eq!(v.ty(), ValueType::IVec3);
  ///
  /// assert!(graph.construct(ValueType::Vec3, [Operand::from(xy), Operand::from(7)]).is_err());
  /// # Ok::<_, shade_graph::Error>(())
  /// ```
  pub fn construct<'g>(
    &'g self,
    target: ValueType,
    args: impl IntoIterator<Item = Operand<'g, R>>,
  ) -> Result<Node<'g, R>> {
    let args: Vec<_> = args.into_iter().collect();
    args.iter().try_for_each(|arg| self.ensure_owned(arg))?;

    let types: Vec<OperandType> = args.iter().map(Operand::ty).collect();

    construct::resolve(target, &types)?;

    let kind = target.kind();
    let pending = args
      .into_iter()
      .map(|arg| arg.prepare(kind))
      .collect::<Option<Vec<_>>>()
      .ok_or_else(|| {
        log::debug!("rejected {target} constructor: literal does not fit");
        Error::InvalidConstructorShape { target, args: types }
      })?;

    let handle = self.emit(|runtime| {
      let operands: Vec<Handle> = pending.into_iter().map(|p| p.materialize(runtime)).collect();
      runtime.construct(OpKind::Construct(target), target, &operands)
    });

    Ok(self.node(handle, target))
  }

  constructors!(
    vec2 => Vec2,
    vec3 => Vec3,
    vec4 => Vec4,
    ivec2 => IVec2,
    ivec3 => IVec3,
    ivec4 => IVec4,
    uvec2 => UVec2,
    uvec3 => UVec3,
    uvec4 => UVec4
  );
}

#[cfg(test)]
mod tests {
  use glam::{UVec3, Vec2, Vec4};

  use super::*;
  use crate::{
    shader::edsl::{recording::Bindings, types::Kind},
    vec3, vec4,
  };

  fn graph() -> ShaderGraph {
    let _ = env_logger::builder().is_test(true).try_init();
    ShaderGraph::default()
  }

  #[test]
  fn constructors_accept_every_width_split() {
    let graph = graph();
    let s = graph.uniform(ValueType::Float);
    let v2 = graph.uniform(ValueType::Vec2);
    let v3 = graph.uniform(ValueType::Vec3);

    for v in [
      vec4!(graph, s, s, s, s),
      vec4!(graph, v2, s, 1.),
      vec4!(graph, 0., v2, s),
      vec4!(graph, s, 0., v2),
      vec4!(graph, v2, v2),
      vec4!(graph, v3, 1.),
      vec4!(graph, s, v3),
    ] {
      assert_eq!(v.map(|v| v.ty()), Ok(ValueType::Vec4));
    }

    assert_eq!(graph.vec4([Operand::from(graph.uniform(ValueType::Vec4))]).map(|v| v.ty()), Ok(ValueType::Vec4));
  }

  #[test]
  fn rejected_constructors_do_not_touch_the_runtime() {
    let graph = graph();
    let v2 = graph.uniform(ValueType::Vec2);
    let i = graph.uniform(ValueType::Int);
    let before = graph.runtime().len();

    assert!(matches!(vec3!(graph, v2), Err(Error::InvalidConstructorShape { .. })));
    assert!(matches!(vec3!(graph, v2, i), Err(Error::InvalidConstructorShape { .. })));
    assert!(matches!(vec3!(graph, v2, 1., 1.), Err(Error::InvalidConstructorShape { .. })));
    assert!(matches!(graph.ivec2([Operand::from(i), Operand::from(0.5)]), Err(Error::InvalidConstructorShape { .. })));
    assert!(graph.construct(ValueType::Mat2, [Operand::from(v2), Operand::from(v2)]).is_err());
    assert!(graph.construct(ValueType::Float, [Operand::from(1.)]).is_err());
    assert_eq!(graph.runtime().len(), before);
  }

  #[test]
  fn literals_are_materialized_with_the_target_kind() {
    let graph = graph();
    let v = graph.uvec3([Operand::from(1), Operand::from(2u32), Operand::from(3.)]).unwrap();

    assert_eq!(
      graph.runtime().evaluate(v.handle(), &Bindings::new()),
      Ok(Value::UVec3(UVec3::new(1, 2, 3)))
    );
  }

  #[test]
  fn swizzles_rebuild_the_source() {
    let graph = graph();
    let v = graph.constant(Vec4::new(1., 2., 3., 4.));
    let v2 = graph.constant(Vec2::new(5., 6.));

    let rebuilt = [
      vec4!(graph, v.x().unwrap(), v.y().unwrap(), v.z().unwrap(), v.w().unwrap()).unwrap(),
      vec4!(graph, v.xyz().unwrap(), v.w().unwrap()).unwrap(),
      vec4!(graph, v.rg().unwrap(), v.b().unwrap(), v.a().unwrap()).unwrap(),
    ];

    for node in rebuilt {
      assert_eq!(
        graph.runtime().evaluate(node.handle(), &Bindings::new()),
        Ok(Value::Vec4(Vec4::new(1., 2., 3., 4.)))
      );
    }

    let rebuilt = graph.vec2([Operand::from(v2.r().unwrap()), Operand::from(v2.g().unwrap())]).unwrap();
    assert_eq!(
      graph.runtime().evaluate(rebuilt.handle(), &Bindings::new()),
      Ok(Value::Vec2(Vec2::new(5., 6.)))
    );
  }

  #[test]
  fn integer_families_share_the_shapes() {
    let graph = graph();

    for (ctor, kind) in [(ValueType::IVec4, Kind::Int), (ValueType::UVec4, Kind::UInt)] {
      let pair = graph.uniform(ValueType::vector(kind, crate::shader::edsl::types::Dim::D2).unwrap());
      let built = graph.construct(ctor, [Operand::from(pair), Operand::from(pair)]);
      assert_eq!(built.map(|n| n.ty()), Ok(ctor));
    }
  }

  #[test]
  fn constructors_reject_nodes_of_other_graphs() {
    let other = graph();
    let graph = graph();
    let foreign = other.uniform(ValueType::Float);
    let before = graph.runtime().len();

    assert_eq!(
      graph.vec2([Operand::from(foreign), Operand::from(1.)]).map(|n| n.ty()),
      Err(Error::ForeignNode {
        handle: foreign.handle()
      })
    );
    assert_eq!(graph.runtime().len(), before);
  }

  #[test]
  fn runtime_can_be_taken_back() {
    let graph = graph();
    graph.constant(1f32);
    graph.constant(true);

    assert_eq!(graph.into_runtime().len(), 2);
  }
}
