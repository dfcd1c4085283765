//! Typed shader expression graphs.
//!
//! This crate builds small arithmetic graphs over the scalar, vector and matrix types of a shading language, and
//! rejects every expression the language would reject, at the moment it is built. Graphs are recorded by a
//! [`Runtime`], which is the part turning them into actual shader code; the crate ships with [`ExprGraph`], a recording
//! runtime that can also evaluate the graphs it holds.
//!
//! # Examples
//!
//! ```
//! use glam::Vec2;
//! use shade_graph::{Bindings, ShaderGraph, Value, ValueType};
//!
//! let graph: ShaderGraph = ShaderGraph::default();
//! let tint = graph.uniform_with(Vec2::new(0.5, 2.));
//! let uv = graph.uv().mul(tint)?;
//!
//! let value = graph.evaluate(&uv, &Bindings::new().with("uv", Vec2::new(1., 1.)))?;
//! assert_eq!(value, Value::Vec2(Vec2::new(0.5, 2.)));
//!
//! // scalars never take vectors on the right
//! assert!(graph.uniform(ValueType::Float).mul(uv).is_err());
//! # Ok::<_, shade_graph::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod shader;

pub use crate::{
  config::{Axis, DepthBiasConfig, GraphConfig, InputNames},
  error::{Error, Operator, Result},
  shader::{
    edsl::{
      expr::{Literal, Node, Operand, Var},
      graph::ShaderGraph,
      inputs::TextureNode,
      promote::{BinOp, UnOp},
      recording::{Bindings, ExprGraph, Rebind, Vertex},
      runtime::{Handle, OpKind, ResourceId, Runtime, TextureDesc, TextureKind},
      types::{Kind, OperandType, ValueType},
    },
    types::{Scalar, Value},
  },
};
