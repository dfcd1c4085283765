//! Shader expressions and the values they carry.

pub mod edsl;
pub mod types;
