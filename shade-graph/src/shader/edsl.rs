//! Shader EDSL.
//!
//! This module exposes an EDSL used to build typed shader expression graphs. Every node is checked against the rule
//! tables of [`promote`], [`swizzle`] and [`construct`] when it is built, then recorded by a [`runtime::Runtime`].

pub mod construct;
pub mod derived;
pub mod expr;
pub mod graph;
pub mod inputs;
pub mod promote;
pub mod recording;
pub mod runtime;
pub mod swizzle;
pub mod types;
