//! In-memory recording runtime.
//!
//! [`ExprGraph`] implements [`Runtime`] by appending every request to a flat list of [`Vertex`]es. It is the runtime
//! used when no external one is plugged in, and it comes with a reference evaluator that computes the value of any
//! vertex that does not depend on a texture.

use std::collections::HashMap;

use crate::{
  error::{Error, Result},
  shader::{
    edsl::{
      expr::{Node, Operand},
      graph::ShaderGraph,
      promote::{BinOp, UnOp},
      runtime::{Handle, OpKind, Runtime, TextureDesc, TextureKind},
      swizzle::SwizzleSelector,
      types::ValueType,
    },
    types::{Scalar, Value},
  },
};

/// A recorded vertex.
#[derive(Clone, Debug, PartialEq)]
pub enum Vertex {
  Op {
    op: OpKind,
    ty: ValueType,
    operands: Vec<Handle>,
  },

  Component {
    source: Handle,
    name: String,
    ty: ValueType,
  },

  Uniform {
    ty: ValueType,
    value: Value,
  },

  Attribute {
    ty: ValueType,
    name: String,
  },

  Texture {
    kind: TextureKind,
    desc: TextureDesc,
  },

  Variable {
    ty: ValueType,
    init: Handle,
  },
}

impl Vertex {
  /// Type of the value produced by the vertex; texel type for textures.
  pub fn ty(&self) -> ValueType {
    match self {
      Vertex::Op { ty, .. }
      | Vertex::Component { ty, .. }
      | Vertex::Uniform { ty, .. }
      | Vertex::Attribute { ty, .. }
      | Vertex::Variable { ty, .. } => *ty,
      Vertex::Texture { desc, .. } => desc.texel,
    }
  }
}

/// A recorded register rebind.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Rebind {
  pub var: Handle,
  pub expr: Handle,

  /// Number of vertices recorded before the rebind.
  pub point: usize,
}

/// Recording [`Runtime`].
#[derive(Debug, Default)]
pub struct ExprGraph {
  vertices: Vec<Vertex>,
  rebinds: Vec<Rebind>,
  labels: HashMap<Handle, String>,
}

impl ExprGraph {
  pub fn new() -> Self {
    Self::default()
  }

  /// Number of recorded vertices.
  pub fn len(&self) -> usize {
    self.vertices.len()
  }

  pub fn is_empty(&self) -> bool {
    self.vertices.is_empty()
  }

  pub fn vertex(&self, handle: Handle) -> Option<&Vertex> {
    usize::try_from(handle.raw()).ok().and_then(|index| self.vertices.get(index))
  }

  /// Every recorded vertex, along with its handle.
  pub fn vertices(&self) -> impl Iterator<Item = (Handle, &Vertex)> {
    self
      .vertices
      .iter()
      .enumerate()
      .map(|(index, vertex)| (Handle::new(index as u64), vertex))
  }

  /// Register rebinds, in the order they were requested.
  pub fn rebinds(&self) -> &[Rebind] {
    &self.rebinds
  }

  pub fn label_of(&self, handle: Handle) -> Option<&str> {
    self.labels.get(&handle).map(String::as_str)
  }

  /// Find the first vertex labelled `name`.
  pub fn find_label(&self, name: &str) -> Option<Handle> {
    self
      .labels
      .iter()
      .filter(|(_, label)| label.as_str() == name)
      .map(|(handle, _)| *handle)
      .min()
  }

  /// Change the current value of a uniform.
  ///
  /// The new value must have the type the uniform was declared with.
  pub fn set_uniform(&mut self, handle: Handle, value: impl Into<Value>) -> Result<()> {
    let value = value.into();
    let index = usize::try_from(handle.raw()).ok();

    match index.and_then(|index| self.vertices.get_mut(index)) {
      Some(Vertex::Uniform { ty, value: current }) if *ty == value.ty() => {
        log::debug!("uniform {handle} set to {value:?}");
        *current = value;
        Ok(())
      }

      Some(Vertex::Uniform { ty, .. }) => Err(Error::type_mismatch(
        crate::error::Operator::Assign,
        [(*ty).into(), value.ty().into()],
      )),

      _ => Err(Error::InvalidHandle {
        handle,
        expected: "uniform",
      }),
    }
  }

  /// Compute the value of a vertex.
  ///
  /// Attributes take their values from `bindings` and uniforms their current value. Variables are read in program
  /// order: a vertex reading a variable sees the binding in force when the vertex was recorded, so `v = v + 1`
  /// increments the previous value and an expression built before an assignment ignores it. A variable evaluated
  /// directly reads its latest binding.
  pub fn evaluate(&self, handle: Handle, bindings: &Bindings) -> Result<Value> {
    Evaluator { graph: self, bindings }.eval(handle, self.rebinds.len())
  }

  fn push(&mut self, vertex: Vertex) -> Handle {
    let handle = Handle::new(self.vertices.len() as u64);
    log::trace!("{handle} = {vertex:?}");
    self.vertices.push(vertex);
    handle
  }
}

impl Runtime for ExprGraph {
  fn construct(&mut self, op: OpKind, ty: ValueType, operands: &[Handle]) -> Handle {
    self.push(Vertex::Op {
      op,
      ty,
      operands: operands.to_vec(),
    })
  }

  fn access_component(&mut self, source: Handle, name: &str, ty: ValueType) -> Handle {
    self.push(Vertex::Component {
      source,
      name: name.to_owned(),
      ty,
    })
  }

  fn declare_uniform(&mut self, ty: ValueType, init: Value) -> Handle {
    self.push(Vertex::Uniform { ty, value: init })
  }

  fn declare_attribute(&mut self, ty: ValueType, name: &str) -> Handle {
    self.push(Vertex::Attribute {
      ty,
      name: name.to_owned(),
    })
  }

  fn declare_texture(&mut self, kind: TextureKind, desc: &TextureDesc) -> Handle {
    self.push(Vertex::Texture {
      kind,
      desc: desc.clone(),
    })
  }

  fn to_variable(&mut self, expr: Handle, ty: ValueType) -> Handle {
    self.push(Vertex::Variable { ty, init: expr })
  }

  fn rebind(&mut self, var: Handle, expr: Handle) {
    log::trace!("{var} <- {expr}");
    self.rebinds.push(Rebind {
      var,
      expr,
      point: self.vertices.len(),
    });
  }

  fn label(&mut self, handle: Handle, name: &str) {
    self.labels.insert(handle, name.to_owned());
  }
}

impl ShaderGraph<ExprGraph> {
  /// Change the current value of a uniform node; see [`ExprGraph::set_uniform`].
  pub fn set_uniform(&self, uniform: &Node<'_>, value: impl Into<Value>) -> Result<()> {
    self.ensure_owned(&Operand::from(uniform))?;
    self.runtime_mut().set_uniform(uniform.handle(), value)
  }

  /// Compute the value of a node; see [`ExprGraph::evaluate`].
  pub fn evaluate(&self, node: &Node<'_>, bindings: &Bindings) -> Result<Value> {
    self.ensure_owned(&Operand::from(node))?;
    self.runtime().evaluate(node.handle(), bindings)
  }
}

/// Values of the per-vertex inputs used by [`ExprGraph::evaluate`].
#[derive(Clone, Debug, Default)]
pub struct Bindings {
  attributes: HashMap<String, Value>,
}

impl Bindings {
  pub fn new() -> Self {
    Self::default()
  }

  /// Bind an attribute, builder-style.
  pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
    self.set(name, value);
    self
  }

  pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
    self.attributes.insert(name.into(), value.into());
  }

  pub fn get(&self, name: &str) -> Option<Value> {
    self.attributes.get(name).copied()
  }
}

struct Evaluator<'a> {
  graph: &'a ExprGraph,
  bindings: &'a Bindings,
}

impl Evaluator<'_> {
  /// Value of `handle` when only the first `visible` rebinds have happened.
  fn eval(&self, handle: Handle, visible: usize) -> Result<Value> {
    let graph = self.graph;
    let vertex = graph.vertex(handle).ok_or(Error::InvalidHandle {
      handle,
      expected: "vertex",
    })?;

    match vertex {
      Vertex::Op { op, ty, operands } => {
        let visible = self.visible_from(handle);
        let args = operands
          .iter()
          .map(|operand| self.read(handle, *operand, visible))
          .collect::<Result<Vec<_>>>()?;
        apply(op, *ty, &args)
      }

      Vertex::Component { source, name, ty } => {
        let scalars = self.read(handle, *source, self.visible_from(handle))?.scalars();
        let picked = SwizzleSelector::parse(name)
          .and_then(|selectors| {
            selectors
              .iter()
              .map(|selector| scalars.get(selector.index()).copied())
              .collect::<Option<Vec<_>>>()
          })
          .ok_or_else(|| Error::Unevaluable(format!("accessor .{name} on {source}")))?;

        rebuild(*ty, &picked)
      }

      Vertex::Uniform { value, .. } => Ok(*value),

      Vertex::Attribute { ty, name } => match self.bindings.get(name) {
        Some(value) if value.ty() == *ty => Ok(value),
        Some(value) => Err(Error::Unevaluable(format!(
          "attribute `{name}` is bound to a {} value, expected {ty}",
          value.ty()
        ))),
        None => Err(Error::Unevaluable(format!("attribute `{name}` is not bound"))),
      },

      Vertex::Texture { desc, .. } => Err(Error::Unevaluable(format!("texture `{}` has no value", desc.label))),

      Vertex::Variable { init, .. } => {
        let latest = graph.rebinds[..visible.min(graph.rebinds.len())]
          .iter()
          .enumerate()
          .rev()
          .find(|(_, rebind)| rebind.var == handle);

        match latest {
          Some((index, rebind)) if (rebind.expr.raw() as usize) < rebind.point => self.eval(rebind.expr, index),
          Some((_, rebind)) => Err(Error::Unevaluable(format!(
            "{handle} is bound to {}, recorded after the binding",
            rebind.expr
          ))),
          None => self.read(handle, *init, self.visible_from(handle)),
        }
      }
    }
  }

  /// Evaluate `operand` as read by `reader`, which must have been recorded after it.
  fn read(&self, reader: Handle, operand: Handle, visible: usize) -> Result<Value> {
    if operand >= reader {
      return Err(Error::Unevaluable(format!("{reader} reads {operand}, recorded after it")));
    }

    self.eval(operand, visible)
  }

  /// Number of rebinds recorded before `handle`.
  fn visible_from(&self, handle: Handle) -> usize {
    self
      .graph
      .rebinds
      .partition_point(|rebind| (rebind.point as u64) <= handle.raw())
  }
}

fn rebuild(ty: ValueType, scalars: &[Scalar]) -> Result<Value> {
  Value::from_scalars(ty, scalars)
    .ok_or_else(|| Error::Unevaluable(format!("{} component(s) do not form a {ty}", scalars.len())))
}

fn apply(op: &OpKind, ty: ValueType, args: &[Value]) -> Result<Value> {
  match (op, args) {
    (OpKind::Constant(value), []) => Ok(*value),

    (OpKind::Binary(op), [lhs, rhs]) => binary(*op, ty, lhs, rhs),

    (OpKind::Unary(UnOp::OneMinus), [operand]) => {
      let one = rebuild(ty, &[Scalar::Int(1)])?;
      componentwise(BinOp::Sub, ty, &one, operand)
    }

    (OpKind::Construct(target), args) => {
      let scalars: Vec<Scalar> = args.iter().flat_map(Value::scalars).collect();
      rebuild(*target, &scalars)
    }

    (OpKind::Cast(target), [operand]) => rebuild(*target, &operand.scalars()),

    (OpKind::Sample | OpKind::Fetch, _) => Err(Error::Unevaluable("texture reads have no reference value".to_owned())),

    _ => Err(Error::Unevaluable(format!("{op:?} applied to {} operand(s)", args.len()))),
  }
}

fn binary(op: BinOp, ty: ValueType, lhs: &Value, rhs: &Value) -> Result<Value> {
  let product = match (op, lhs, rhs) {
    (BinOp::Mul, Value::Mat2(a), Value::Mat2(b)) => Value::Mat2(*a * *b),
    (BinOp::Mul, Value::Mat3(a), Value::Mat3(b)) => Value::Mat3(*a * *b),
    (BinOp::Mul, Value::Mat4(a), Value::Mat4(b)) => Value::Mat4(*a * *b),
    (BinOp::Mul, Value::Mat2(m), Value::Vec2(v)) => Value::Vec2(*m * *v),
    (BinOp::Mul, Value::Mat3(m), Value::Vec3(v)) => Value::Vec3(*m * *v),
    (BinOp::Mul, Value::Mat4(m), Value::Vec4(v)) => Value::Vec4(*m * *v),
    _ => return componentwise(op, ty, lhs, rhs),
  };

  Ok(product)
}

/// Apply `op` component by component, broadcasting a scalar right operand.
fn componentwise(op: BinOp, ty: ValueType, lhs: &Value, rhs: &Value) -> Result<Value> {
  let a = lhs.scalars();
  let mut b = rhs.scalars();

  if b.len() == 1 {
    b = vec![b[0]; a.len()];
  }

  if a.len() != b.len() {
    return Err(Error::Unevaluable(format!("{op} of {} and {}", lhs.ty(), rhs.ty())));
  }

  let out = a
    .iter()
    .zip(&b)
    .map(|(x, y)| scalar_op(op, *x, *y))
    .collect::<Result<Vec<_>>>()?;

  rebuild(ty, &out)
}

fn scalar_op(op: BinOp, x: Scalar, y: Scalar) -> Result<Scalar> {
  let division_by_zero = || Error::Unevaluable("integer division by zero".to_owned());

  let r = match (x, y) {
    (Scalar::Float(a), Scalar::Float(b)) => match op {
      BinOp::Mul => Scalar::Float(a * b),
      BinOp::Add => Scalar::Float(a + b),
      BinOp::Sub => Scalar::Float(a - b),
      BinOp::Div => Scalar::Float(a / b),
      BinOp::LessThan => Scalar::Bool(a < b),
    },

    (Scalar::Int(a), Scalar::Int(b)) => match op {
      BinOp::Mul => Scalar::Int(a.wrapping_mul(b)),
      BinOp::Add => Scalar::Int(a.wrapping_add(b)),
      BinOp::Sub => Scalar::Int(a.wrapping_sub(b)),
      BinOp::Div => Scalar::Int(a.checked_div(b).ok_or_else(division_by_zero)?),
      BinOp::LessThan => Scalar::Bool(a < b),
    },

    (Scalar::UInt(a), Scalar::UInt(b)) => match op {
      BinOp::Mul => Scalar::UInt(a.wrapping_mul(b)),
      BinOp::Add => Scalar::UInt(a.wrapping_add(b)),
      BinOp::Sub => Scalar::UInt(a.wrapping_sub(b)),
      BinOp::Div => Scalar::UInt(a.checked_div(b).ok_or_else(division_by_zero)?),
      BinOp::LessThan => Scalar::Bool(a < b),
    },

    _ => return Err(Error::Unevaluable(format!("{op} of {x:?} and {y:?}"))),
  };

  Ok(r)
}
