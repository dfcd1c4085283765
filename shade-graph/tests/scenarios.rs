use std::{collections::HashSet, thread};

use glam::{IVec3, Vec2, Vec3, Vec4};
use shade_graph::{
  vec2, vec3, vec4, Bindings, Error, ExprGraph, Operand, Operator, ShaderGraph, Value, ValueType, Vertex,
};

fn graph() -> ShaderGraph {
  let _ = env_logger::builder().is_test(true).try_init();
  ShaderGraph::default()
}

fn eval(graph: &ShaderGraph, node: &shade_graph::Node, bindings: &Bindings) -> Value {
  match graph.evaluate(node, bindings) {
    Ok(value) => value,
    Err(err) => panic!("cannot evaluate {node:?}: {err}"),
  }
}

#[test]
fn depth_bias_from_z_index() {
  let graph = graph();
  let bias = graph.depth_bias().unwrap();
  graph.set_uniform(&graph.z_index(), 5f32).unwrap();

  let norm_z = eval(&graph, &graph.norm_z().unwrap(), &Bindings::new());
  assert_eq!(norm_z, Value::Float(5. / 6.));

  let Value::Vec3(bias) = eval(&graph, &bias, &Bindings::new()) else {
    panic!("depth bias is not a vec3");
  };
  assert!(bias.abs_diff_eq(Vec3::new(0., 0., (5. / 6.) / 1_000_000.), 1e-12));
}

#[test]
fn legacy_uv_flips_the_vertical_axis() {
  let graph = graph();
  let legacy = graph.legacy_uv().unwrap();
  let bindings = Bindings::new().with("uv", Vec2::new(0.3, 0.8));

  assert_eq!(legacy.ty(), ValueType::Vec2);

  let Value::Vec2(uv) = eval(&graph, &legacy, &bindings) else {
    panic!("legacy uv is not a vec2");
  };
  assert!(uv.abs_diff_eq(Vec2::new(0.3, 0.2), 1e-6));
}

#[test]
fn textures_and_data_textures() {
  let graph = graph();
  let albedo = graph.texture("albedo");
  let ids = graph.data_texture("rgba8uint", "ids");
  let heights = graph.data_texture("r16sint", "heights");

  assert_eq!(albedo.ty(), ValueType::Vec4);
  assert!(albedo.is_filtered());
  assert_eq!(albedo.label(), "albedo");

  assert_eq!(ids.ty(), ValueType::UVec4);
  assert!(!ids.is_filtered());
  assert_eq!(heights.ty(), ValueType::IVec4);

  // texture reads combine like any other vec4
  let shaded = albedo.mul(graph.uniform(ValueType::Float)).unwrap();
  assert_eq!(shaded.ty(), ValueType::Vec4);
  assert!(ids.add(1).is_ok());
  assert!(ids.add(graph.uniform(ValueType::Float)).is_err());
}

#[test]
fn uniform_defaults() {
  let graph = graph();
  let bindings = Bindings::new();

  assert_eq!(eval(&graph, &graph.uniform(ValueType::Vec2), &bindings), Value::Vec2(Vec2::ZERO));
  assert_eq!(eval(&graph, &graph.uniform(ValueType::Vec3), &bindings), Value::Vec3(Vec3::ZERO));
  assert_eq!(eval(&graph, &graph.uniform(ValueType::Float), &bindings), Value::Float(0.));
}

#[test]
fn swizzle_identity() {
  let graph = graph();
  let bindings = Bindings::new();

  let v2 = graph.uniform_with(Vec2::new(1., 2.));
  let v3 = graph.uniform_with(IVec3::new(-1, 0, 7));
  let v4 = graph.uniform_with(Vec4::new(1., 2., 3., 4.));

  let r2 = vec2!(graph, v2.x().unwrap(), v2.y().unwrap()).unwrap();
  let r3 = graph
    .ivec3([
      Operand::from(v3.x().unwrap()),
      Operand::from(v3.y().unwrap()),
      Operand::from(v3.z().unwrap()),
    ])
    .unwrap();
  let r4 = vec4!(graph, v4.x().unwrap(), v4.y().unwrap(), v4.z().unwrap(), v4.w().unwrap()).unwrap();

  assert_eq!(eval(&graph, &r2, &bindings), eval(&graph, &v2, &bindings));
  assert_eq!(eval(&graph, &r3, &bindings), eval(&graph, &v3, &bindings));
  assert_eq!(eval(&graph, &r4, &bindings), eval(&graph, &v4, &bindings));
}

#[test]
fn scalar_receivers_reject_vectors() {
  let graph = graph();
  let s = graph.uniform(ValueType::Float);
  let v = graph.uniform(ValueType::Vec3);

  assert_eq!(v.mul(s).map(|n| n.ty()), Ok(ValueType::Vec3));

  let err = s.mul(v).unwrap_err();
  assert!(matches!(err, Error::TypeMismatch { .. }));
  assert_eq!(err.to_string(), "type mismatch: `mul` is not defined for (float, vec3)");
}

#[test]
fn assignment_needs_a_variable() {
  let graph = graph();
  let e = graph.uniform(ValueType::Vec3);

  assert_eq!(
    e.assign(graph.uniform(ValueType::Vec3)),
    Err(Error::UnboundVariableAssign { ty: ValueType::Vec3 })
  );

  let v = e.to_var();
  let doubled = v.mul(2.).unwrap();
  v.assign(doubled).unwrap();
  assert!(matches!(
    v.assign(graph.uniform(ValueType::Vec2)),
    Err(Error::TypeMismatch {
      op: Operator::Assign,
      ..
    })
  ));

  graph.set_uniform(&e, Vec3::new(1., 2., 3.)).unwrap();
  assert_eq!(eval(&graph, &v, &Bindings::new()), Value::Vec3(Vec3::new(2., 4., 6.)));
}

#[test]
fn depth_bias_builds_a_vec3_of_literals_and_the_bias() {
  let graph = graph();
  let bias = graph.depth_bias().unwrap();
  let runtime = graph.runtime();

  let Some(Vertex::Op { operands, .. }) = runtime.vertex(bias.handle()) else {
    panic!("depth bias is not an operation");
  };
  assert_eq!(operands.len(), 3);
  assert_eq!(runtime.vertex(operands[0]).map(Vertex::ty), Some(ValueType::Float));
}

#[test]
fn resource_ids_are_unique_across_threads() {
  let handles: Vec<_> = (0..8)
    .map(|_| {
      thread::spawn(|| {
        let graph = ShaderGraph::new(ExprGraph::new());
        (0..64)
          .map(|i| {
            if i % 2 == 0 {
              graph.texture("color").id()
            } else {
              graph.data_texture("r32uint", "data").id()
            }
          })
          .collect::<Vec<_>>()
      })
    })
    .collect();

  let mut seen = HashSet::new();
  for handle in handles {
    for id in handle.join().unwrap() {
      assert!(seen.insert(id), "{id:?} allocated twice");
    }
  }

  assert_eq!(seen.len(), 8 * 64);
}

#[test]
fn vec3_macro_accepts_mixed_widths() {
  let graph = graph();
  let xy = graph.uniform_with(Vec2::new(1., 2.));
  let v = vec3!(graph, xy, 3.).unwrap();

  assert_eq!(eval(&graph, &v, &Bindings::new()), Value::Vec3(Vec3::new(1., 2., 3.)));
}
