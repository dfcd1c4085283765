//! Shader EDSL expressions.

use std::{fmt, ops};

use crate::{
  error::{Error, Operator, Result},
  shader::{
    edsl::{
      construct,
      graph::ShaderGraph,
      promote::{self, BinOp, UnOp},
      recording::ExprGraph,
      runtime::{Handle, OpKind, Runtime},
      swizzle,
      types::{Kind, OperandType, ValueType},
    },
    types::Value,
  },
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Role {
  Expr,
  Var,
}

/// Expression node.
///
/// A node is a handle to a vertex owned by the runtime of a [`ShaderGraph`], tagged with the [`ValueType`] of the value
/// it carries. Nodes are cheap to copy and borrow the graph they were built for, so they cannot outlive it.
///
/// Every operator method looks its operands up in the matching rule table first. If the combination is not listed, the
/// method returns an error and nothing is requested from the runtime; otherwise it returns a new node backed by a fresh
/// vertex. Nothing is cached: calling the same method twice creates two vertices.
///
/// Operators are directional. The receiver is the left operand, so `v.mul(s)` with `v: vec3` and `s: float` is legal
/// while `s.mul(v)` is not.
///
/// # Literals
///
/// Most methods accept raw Rust numbers as operands. A number is a _literal_: it has no type on its own and takes the
/// numeric kind of the receiver. A literal given to an integer receiver must be integral and fit the receiver's range.
///
/// # Examples
///
/// ```
/// use shade_graph::{ShaderGraph, ValueType};
///
/// let graph: ShaderGraph = ShaderGraph::default();
/// let color = graph.uniform(ValueType::Vec3);
/// let dimmed = color.mul(0.5)?;
///
/// assert_eq!(dimmed.ty(), ValueType::Vec3);
/// assert!(graph.uniform(ValueType::Float).mul(color).is_err());
/// # Ok::<_, shade_graph::Error>(())
/// ```
pub struct Node<'g, R = ExprGraph>
where
  R: Runtime,
{
  graph: &'g ShaderGraph<R>,
  handle: Handle,
  ty: ValueType,
  role: Role,
}

impl<R> Clone for Node<'_, R>
where
  R: Runtime,
{
  fn clone(&self) -> Self {
    *self
  }
}

impl<R> Copy for Node<'_, R> where R: Runtime {}

impl<R> fmt::Debug for Node<'_, R>
where
  R: Runtime,
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Node")
      .field("handle", &self.handle)
      .field("ty", &self.ty)
      .field("var", &self.is_var())
      .finish()
  }
}

macro_rules! accessors {
  ($($name:ident),*) => {
    $(
      #[doc = concat!("The `.", stringify!($name), "` accessor.")]
      pub fn $name(&self) -> Result<Self> {
        self.swizzle(stringify!($name))
      }
    )*
  };
}

impl<'g, R> Node<'g, R>
where
  R: Runtime,
{
  pub(crate) fn new(graph: &'g ShaderGraph<R>, handle: Handle, ty: ValueType) -> Self {
    Self {
      graph,
      handle,
      ty,
      role: Role::Expr,
    }
  }

  /// Type of the value carried by the node.
  pub fn ty(&self) -> ValueType {
    self.ty
  }

  /// Runtime vertex backing the node.
  pub fn handle(&self) -> Handle {
    self.handle
  }

  /// Graph the node was built for.
  pub fn graph(&self) -> &'g ShaderGraph<R> {
    self.graph
  }

  /// Whether the node is a mutable register created by [`Node::to_var`].
  pub fn is_var(&self) -> bool {
    self.role == Role::Var
  }

  /// Multiplication.
  ///
  /// Besides the component-wise products, a matrix multiplied by a vector of the same dimension yields the transformed
  /// vector, and a matrix multiplied by a matrix yields their product.
  pub fn mul(&self, rhs: impl Into<Operand<'g, R>>) -> Result<Self> {
    self.binary(BinOp::Mul, rhs.into())
  }

  /// Addition.
  pub fn add(&self, rhs: impl Into<Operand<'g, R>>) -> Result<Self> {
    self.binary(BinOp::Add, rhs.into())
  }

  /// Subtraction.
  pub fn sub(&self, rhs: impl Into<Operand<'g, R>>) -> Result<Self> {
    self.binary(BinOp::Sub, rhs.into())
  }

  /// Division.
  ///
  /// The right operand is always a scalar or a literal.
  pub fn div(&self, rhs: impl Into<Operand<'g, R>>) -> Result<Self> {
    self.binary(BinOp::Div, rhs.into())
  }

  /// Less-than comparison between two scalars.
  ///
  /// # Return
  ///
  /// A `bool` node.
  pub fn lt(&self, rhs: impl Into<Operand<'g, R>>) -> Result<Self> {
    self.binary(BinOp::LessThan, rhs.into())
  }

  /// `1 - self`, for scalars.
  pub fn one_minus(&self) -> Result<Self> {
    let ty = promote::lookup_unary(UnOp::OneMinus, self.ty)?;
    let handle = self
      .graph
      .emit(|runtime| runtime.construct(OpKind::Unary(UnOp::OneMinus), ty, &[self.handle]));

    Ok(Self::new(self.graph, handle, ty))
  }

  /// Access components by name, such as `"x"` or `"rgb"`.
  ///
  /// The typed accessors ([`Node::x`], [`Node::xyz`], etc.) are shortcuts for this method.
  pub fn swizzle(&self, name: &str) -> Result<Self> {
    let ty = swizzle::swizzle(self.ty, name)?;
    let handle = self
      .graph
      .emit(|runtime| runtime.access_component(self.handle, name, ty));

    Ok(Self::new(self.graph, handle, ty))
  }

  accessors!(x, y, z, w, r, g, b, a, xy, yz, rg, gb, xyz, rgb);

  /// Convert to another numeric kind of the same width, such as `vec3` to `ivec3`.
  pub fn cast(&self, target: ValueType) -> Result<Self> {
    construct::resolve_cast(self.ty, target)?;
    let handle = self
      .graph
      .emit(|runtime| runtime.construct(OpKind::Cast(target), target, &[self.handle]));

    Ok(Self::new(self.graph, handle, target))
  }

  /// Materialize the expression as a mutable register initialized with it.
  pub fn to_var(&self) -> Var<'g, R> {
    let handle = self.graph.emit(|runtime| runtime.to_variable(self.handle, self.ty));
    log::debug!("{handle} is a {} variable initialized with {}", self.ty, self.handle);

    Var(Self {
      role: Role::Var,
      ..Self::new(self.graph, handle, self.ty)
    })
  }

  /// Bind a new expression to the register.
  ///
  /// Only variables can be assigned; any other node fails with [`Error::UnboundVariableAssign`]. The expression must
  /// have the type of the variable, a literal being accepted by scalar variables.
  pub fn assign(&self, expr: impl Into<Operand<'g, R>>) -> Result<()> {
    if !self.is_var() {
      log::debug!("rejected assignment to {}, which is not a variable", self.handle);
      return Err(Error::UnboundVariableAssign { ty: self.ty });
    }

    let expr = expr.into();
    self.graph.ensure_owned(&expr)?;

    let pending = match expr {
      Operand::Node(ref node) if node.ty != self.ty => None,
      Operand::Literal(_) if !self.ty.is_scalar() => None,
      _ => expr.prepare(self.ty.kind()),
    }
    .ok_or_else(|| Error::type_mismatch(Operator::Assign, [self.ty.into(), expr.ty()]))?;

    self.graph.emit(|runtime| {
      let expr = pending.materialize(runtime);
      log::debug!("{} <- {expr}", self.handle);
      runtime.rebind(self.handle, expr);
    });

    Ok(())
  }

  /// Attach a debug name to the node.
  ///
  /// The result is a read-only expression, even when called on the node behind a [`Var`]; see [`Var::label`].
  pub fn label(self, name: &str) -> Self {
    self.graph.emit(|runtime| runtime.label(self.handle, name));

    Self {
      role: Role::Expr,
      ..self
    }
  }

  fn binary(&self, op: BinOp, rhs: Operand<'g, R>) -> Result<Self> {
    self.graph.ensure_owned(&rhs)?;
    let ty = promote::lookup(op, self.ty, rhs.ty())?;

    // literals take the numeric kind of the receiver
    let rhs_ty = rhs.ty();
    let pending = rhs
      .prepare(self.ty.kind())
      .ok_or_else(|| Error::type_mismatch(Operator::Binary(op), [self.ty.into(), rhs_ty]))?;

    let handle = self.graph.emit(|runtime| {
      let rhs = pending.materialize(runtime);
      runtime.construct(OpKind::Binary(op), ty, &[self.handle, rhs])
    });

    Ok(Self::new(self.graph, handle, ty))
  }
}

/// Mutable variable.
///
/// A [`Var`] is a [`Node`] that can be assigned. A read sees the binding in force when the reading node is built. You
/// can go from a [`Var`] to a plain [`Node`] with [`Var::to_expr`] or [`From`], but never the other way around.
pub struct Var<'g, R = ExprGraph>(Node<'g, R>)
where
  R: Runtime;

impl<R> Clone for Var<'_, R>
where
  R: Runtime,
{
  fn clone(&self) -> Self {
    *self
  }
}

impl<R> Copy for Var<'_, R> where R: Runtime {}

impl<R> fmt::Debug for Var<'_, R>
where
  R: Runtime,
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("Var").field(&self.0).finish()
  }
}

impl<'g, R> Var<'g, R>
where
  R: Runtime,
{
  /// Coerce the variable into a read-only expression.
  ///
  /// > Note: use this function only when necessary. Operator methods accept variables directly.
  pub fn to_expr(&self) -> Node<'g, R> {
    Node {
      role: Role::Expr,
      ..self.0
    }
  }

  /// Attach a debug name to the variable.
  pub fn label(self, name: &str) -> Self {
    self.0.graph.emit(|runtime| runtime.label(self.0.handle, name));
    self
  }
}

impl<'g, R> ops::Deref for Var<'g, R>
where
  R: Runtime,
{
  type Target = Node<'g, R>;

  fn deref(&self) -> &Self::Target {
    &self.0
  }
}

impl<'g, R> From<Var<'g, R>> for Node<'g, R>
where
  R: Runtime,
{
  fn from(v: Var<'g, R>) -> Self {
    v.to_expr()
  }
}

impl<'g, R> From<&Var<'g, R>> for Node<'g, R>
where
  R: Runtime,
{
  fn from(v: &Var<'g, R>) -> Self {
    v.to_expr()
  }
}

/// Untyped numeric constant.
///
/// A literal unifies with the scalar type of the numeric kind it is used with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Literal(pub f64);

impl Literal {
  /// Value of the literal as a scalar of `kind`.
  ///
  /// Integer kinds only accept integral values within their range, and floats reject finite values an `f32` cannot
  /// hold. Booleans accept nothing.
  pub fn unify(self, kind: Kind) -> Option<Value> {
    let Literal(n) = self;
    let integral = n.fract() == 0.;

    match kind {
      Kind::Float if !n.is_finite() || (n as f32).is_finite() => Some(Value::Float(n as f32)),
      Kind::Int if integral && n >= i32::MIN as f64 && n <= i32::MAX as f64 => Some(Value::Int(n as i32)),
      Kind::UInt if integral && n >= 0. && n <= u32::MAX as f64 => Some(Value::UInt(n as u32)),
      _ => None,
    }
  }
}

macro_rules! impl_From_Literal {
  ($($t:ty),*) => {
    $(
      impl From<$t> for Literal {
        fn from(a: $t) -> Self {
          Literal(a.into())
        }
      }

      impl<R> From<$t> for Operand<'_, R>
      where
        R: Runtime,
      {
        fn from(a: $t) -> Self {
          Operand::Literal(a.into())
        }
      }
    )*
  };
}

impl_From_Literal!(f32, f64, i32, u32);

/// Right operand of an operator, or argument of a constructor.
pub enum Operand<'g, R = ExprGraph>
where
  R: Runtime,
{
  Node(Node<'g, R>),
  Literal(Literal),
}

impl<R> Clone for Operand<'_, R>
where
  R: Runtime,
{
  fn clone(&self) -> Self {
    *self
  }
}

impl<R> Copy for Operand<'_, R> where R: Runtime {}

impl<R> fmt::Debug for Operand<'_, R>
where
  R: Runtime,
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Operand::Node(node) => fmt::Debug::fmt(node, f),
      Operand::Literal(lit) => fmt::Debug::fmt(lit, f),
    }
  }
}

impl<R> Operand<'_, R>
where
  R: Runtime,
{
  /// Type used to look the operand up in the rule tables.
  pub fn ty(&self) -> OperandType {
    match self {
      Operand::Node(node) => OperandType::Typed(node.ty),
      Operand::Literal(_) => OperandType::Literal,
    }
  }

  /// Resolve the operand without touching the runtime, unifying a literal with `kind`.
  pub(crate) fn prepare(self, kind: Kind) -> Option<Pending> {
    match self {
      Operand::Node(node) => Some(Pending::Handle(node.handle)),
      Operand::Literal(lit) => lit.unify(kind).map(Pending::Constant),
    }
  }
}

impl<'g, R> From<Node<'g, R>> for Operand<'g, R>
where
  R: Runtime,
{
  fn from(node: Node<'g, R>) -> Self {
    Operand::Node(node)
  }
}

impl<'g, R> From<&Node<'g, R>> for Operand<'g, R>
where
  R: Runtime,
{
  fn from(node: &Node<'g, R>) -> Self {
    Operand::Node(*node)
  }
}

impl<'g, R> From<Var<'g, R>> for Operand<'g, R>
where
  R: Runtime,
{
  fn from(var: Var<'g, R>) -> Self {
    Operand::Node(var.to_expr())
  }
}

impl<'g, R> From<&Var<'g, R>> for Operand<'g, R>
where
  R: Runtime,
{
  fn from(var: &Var<'g, R>) -> Self {
    Operand::Node(var.to_expr())
  }
}

/// An operand accepted by the rule tables, not yet handed to the runtime.
pub(crate) enum Pending {
  Handle(Handle),
  Constant(Value),
}

impl Pending {
  pub(crate) fn materialize<R>(self, runtime: &mut R) -> Handle
  where
    R: Runtime,
  {
    match self {
      Pending::Handle(handle) => handle,
      Pending::Constant(value) => runtime.construct(OpKind::Constant(value), value.ty(), &[]),
    }
  }
}

/// Create 2D vectors.
///
/// `vec2!(graph, x, y)` calls the 2D float constructor of `graph` with the given arguments, which can be nodes,
/// variables or literals. The integer families are available as [`ShaderGraph::ivec2`] and [`ShaderGraph::uvec2`].
///
/// # Examples
///
/// ```
/// use shade_graph::{vec2, ShaderGraph, ValueType};
///
/// let graph: ShaderGraph = ShaderGraph::default();
/// let uv = graph.attribute(ValueType::Vec2, "uv");
/// let flipped = vec2!(graph, uv.y()?, uv.x()?)?;
///
/// assert_eq!(flipped.ty(), ValueType::Vec2);
/// # Ok::<_, shade_graph::Error>(())
/// ```
#[macro_export]
macro_rules! vec2 {
  ($graph:expr, $($arg:expr),+ $(,)?) => {
    $graph.vec2([$($crate::Operand::from($arg)),+])
  };
}

/// Create 3D vectors.
///
/// Accepts every argument sequence whose widths add up to three: `vec3!(g, x, y, z)`, `vec3!(g, xy, z)`,
/// `vec3!(g, x, yz)` or `vec3!(g, xyz)`.
#[macro_export]
macro_rules! vec3 {
  ($graph:expr, $($arg:expr),+ $(,)?) => {
    $graph.vec3([$($crate::Operand::from($arg)),+])
  };
}

/// Create 4D vectors.
///
/// # Examples
///
/// ```
/// use shade_graph::{vec4, ShaderGraph, ValueType};
///
/// let graph: ShaderGraph = ShaderGraph::default();
/// let color = graph.uniform(ValueType::Vec3);
/// let opaque = vec4!(graph, color, 1.)?;
///
/// assert_eq!(opaque.ty(), ValueType::Vec4);
/// # Ok::<_, shade_graph::Error>(())
/// ```
#[macro_export]
macro_rules! vec4 {
  ($graph:expr, $($arg:expr),+ $(,)?) => {
    $graph.vec4([$($crate::Operand::from($arg)),+])
  };
}
