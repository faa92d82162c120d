//! End-to-end tests that execute generated JSW code.

mod jsl_test;
use jsl_test::JslTest;
use jsl_syntax::parse_translation_unit;
use jslc::{build_program, Backend, Hlsl, Jsw, ShaderModel, Sse, TargetKind};

fn jsw(src: &str) -> JslTest {
    JslTest::new(src, TargetKind::Jsw).unwrap()
}

fn assert_close(actual: [f64; 4], expected: [f64; 4]) {
    for (a, e) in actual.iter().zip(expected.iter()) {
        assert!((a - e).abs() < 1e-4, "expected {:?}, got {:?}", expected, actual);
    }
}

#[test]
fn test_cross_product() {
    let test = jsw(r#"
        void main() {
            float3 a = float3(0.0, 0.0, 1.0);
            float3 b = float3(0.5, 0.5, 0.5);
            float3 c = cross(a, b);
            color = float4(c.x, c.y, c.z, 1.0);
        }
    "#);
    test.assert_contains("float c_x = (a_y * b_z - a_z * b_y);");
    assert_close(test.run(&[], &[]), [-0.5, 0.5, 0.0, 1.0]);
}

#[test]
fn test_degrees_radians_round_trip() {
    let test = jsw(r#"
        param float x;
        void main() {
            float y = radians(degrees(x));
            color = float4(y);
        }
    "#);
    for x in [0.0, 1.0, std::f64::consts::PI] {
        assert_close(test.run(&[], &[x, 0.0, 0.0, 0.0]), [x, x, x, x]);
    }
}

#[test]
fn test_any_all() {
    let test = jsw(r#"
        param float4 v;
        void main() {
            bool4 b = bool4(v.x > 0.5, v.y > 0.5, v.z > 0.5, v.w > 0.5);
            color = float4(0.0);
            if (any(b)) {
                color.x = 1.0;
            }
            if (all(b)) {
                color.y = 1.0;
            }
        }
    "#);
    test.assert_contains("if ((b_x || b_y || b_z || b_w)) {");
    assert_close(test.run(&[], &[0.7, 0.2, 0.9, 0.1]), [1.0, 0.0, 0.0, 0.0]);
    assert_close(test.run(&[], &[1.0, 1.0, 1.0, 1.0]), [1.0, 1.0, 0.0, 0.0]);
    assert_close(test.run(&[], &[0.0, 0.0, 0.0, 0.0]), [0.0, 0.0, 0.0, 0.0]);
}

#[test]
fn test_finiteness() {
    let test = jsw(r#"
        param float f;
        void main() {
            color = float4(0.0);
            if (isFinite(f)) color.x = 1.0;
            if (isNaN(f)) color.y = 1.0;
            if (isInfinite(f)) color.z = 1.0;
        }
    "#);
    assert_close(test.run(&[], &[1.5]), [1.0, 0.0, 0.0, 0.0]);
    assert_close(test.run(&[], &[f64::NAN]), [0.0, 1.0, 0.0, 0.0]);
    assert_close(test.run(&[], &[f64::INFINITY]), [0.0, 0.0, 1.0, 0.0]);
}

#[test]
fn test_interpolation_builtins() {
    let test = jsw(r#"
        param float t;
        void main() {
            color = float4(clamp(t, 0.0, 1.0), mix(0.0, 2.0, t), step(0.5, t), smoothstep(0.0, 1.0, t));
        }
    "#);
    assert_close(test.run(&[], &[0.25]), [0.25, 0.5, 0.0, 0.15625]);
    assert_close(test.run(&[], &[2.0]), [1.0, 4.0, 1.0, 1.0]);
}

#[test]
fn test_geometric_builtins() {
    let test = jsw(r#"
        param float3 n;
        void main() {
            float l = length(n);
            float d = dot(n, n);
            float3 u = normalize(n);
            color = float4(l, d, u.x, u.z);
        }
    "#);
    assert_close(test.run(&[], &[3.0, 0.0, 4.0, 0.0]), [5.0, 25.0, 0.6, 0.8]);
}

#[test]
fn test_swizzle_assignment_through_temps() {
    let test = jsw(r#"
        void main() {
            float2 p = pos0;
            p = p.yx;
            color = float4(p.x, p.y, 0.0, 1.0);
        }
    "#);
    test.assert_contains(
        r#"
        {
            float jsl_tmp0_x = p_y;
            float jsl_tmp0_y = p_x;
            p_x = jsl_tmp0_x;
            p_y = jsl_tmp0_y;
        }
    "#,
    );
    let color = test.run(&[("pos0_x", 0.25), ("pos0_y", 0.75)], &[]);
    assert_close(color, [0.75, 0.25, 0.0, 1.0]);
}

#[test]
fn test_discard_clears_output() {
    let test = jsw(r#"
        void main() {
            if (pos0.x < 0.5) discard;
            color = float4(1.0);
        }
    "#);
    assert_close(test.run(&[("pos0_x", 0.25)], &[]), [0.0; 4]);
    assert_close(test.run(&[("pos0_x", 0.75)], &[]), [1.0; 4]);
}

#[test]
fn test_vertex_color_passthrough() {
    let test = jsw("void main() { color = jsl_vertexColor * 0.5; }");
    let inputs = [
        ("jsl_vertexColor_x", 1.0),
        ("jsl_vertexColor_y", 0.5),
        ("jsl_vertexColor_z", 0.0),
        ("jsl_vertexColor_w", 1.0),
    ];
    assert_close(test.run(&inputs, &[]), [0.5, 0.25, 0.0, 0.5]);
}

#[test]
fn test_emission_is_idempotent() {
    let src = r#"
        param sampler tex;
        param float4 tint;
        void main() {
            float4 c = sample(tex, pos0) * tint;
            if (c.w < 0.01) discard;
            color = c;
        }
    "#;
    let program = build_program(&parse_translation_unit(src).unwrap()).unwrap();

    let hlsl = Backend::<Hlsl>::new(ShaderModel::Sm3);
    assert_eq!(hlsl.emit(&program).unwrap(), hlsl.emit(&program).unwrap());
    let sse = Backend::<Sse>::new(ShaderModel::Sm4_0);
    assert_eq!(sse.emit(&program).unwrap(), sse.emit(&program).unwrap());
    let jsw = Backend::<Jsw>::new(ShaderModel::Sm5_1);
    assert_eq!(jsw.emit(&program).unwrap(), jsw.emit(&program).unwrap());
}
