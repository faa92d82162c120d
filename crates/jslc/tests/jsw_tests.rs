//! Tests for scalarized Java output.

mod jsl_test;
use jsl_test::JslTest;
use jslc::TargetKind;

fn jsw(src: &str) -> JslTest {
    JslTest::new(src, TargetKind::Jsw).unwrap()
}

#[test]
fn test_global_constants_and_zeroed_locals() {
    let test = jsw(r#"
        const float2 K = float2(0.5, 0.25);
        void main() {
            float2 v;
            v = K;
            color = float4(v.x, v.y, 0.0, 1.0);
        }
    "#);
    test.assert_code(
        r#"
        final float K_x = (0.5f);
        final float K_y = (0.25f);
        void main(float pos0_x, float pos0_y, float pos1_x, float pos1_y, float pixcoord_x, float pixcoord_y, float jsl_vertexColor_x, float jsl_vertexColor_y, float jsl_vertexColor_z, float jsl_vertexColor_w, float[] color) {
            float v_x = 0.0f;
            float v_y = 0.0f;
            v_x = K_x;
            v_y = K_y;
            color[0] = v_x;
            color[1] = v_y;
            color[2] = 0.0f;
            color[3] = 1.0f;
        }
    "#,
    );
    let color = test.run(&[], &[]);
    assert_eq!(color, [0.5, 0.25, 0.0, 1.0]);
}

#[test]
fn test_indexed_param_array() {
    let test = jsw(r#"
        param float4 w[2];
        void main() {
            int i = 1;
            color = w[i];
        }
    "#);
    test.assert_contains("color[2] = jsl_constants[4 * (0 + (i)) + 2];");
    let constants = [0.0, 0.1, 0.2, 0.3, 1.0, 1.1, 1.2, 1.3];
    assert_eq!(test.run(&[], &constants), [1.0, 1.1, 1.2, 1.3]);
}

#[test]
fn test_int_and_bool_params() {
    let test = jsw(r#"
        param int n;
        param bool flip;
        void main() {
            float s = 0.0;
            if (flip) {
                if (intcast(pos0.x) == n) s = 1.0; else s = 0.5;
            }
            color = float4(s);
        }
    "#);
    test.assert_contains("if ((jsl_constants[4] != 0.0f)) {");
    let on = test.run(&[("pos0_x", 2.5)], &[2.0, 0.0, 0.0, 0.0, 1.0]);
    assert_eq!(on, [1.0; 4]);
    let off = test.run(&[("pos0_x", 2.5)], &[2.0, 0.0, 0.0, 0.0, 0.0]);
    assert_eq!(off, [0.0; 4]);
}

#[test]
fn test_sample_preamble() {
    let test = jsw("param sampler tex; void main() { color = sample(tex, pixcoord); }");
    test.assert_contains(
        r#"
        float[] jsl_t0 = jsl_sample(tex, pixcoord_x, pixcoord_y);
        color[0] = jsl_t0[0];
        color[1] = jsl_t0[1];
    "#,
    );
}

#[test]
fn test_math_casts() {
    let test = jsw(r#"
        param float x;
        void main() {
            color = float4(sqrt(x), pow(x, 2.0), floor(x), exp2(x));
        }
    "#);
    test.assert_contains("color[0] = ((float) Math.sqrt(jsl_constants[0]));");
    test.assert_contains("color[3] = ((float) Math.pow(2.0, jsl_constants[0]));");
    let color = test.run(&[], &[2.25]);
    let expected = [1.5, 5.0625, 2.0, 2f64.powf(2.25)];
    for (a, e) in color.iter().zip(expected) {
        assert!((a - e).abs() < 1e-6, "{:?}", color);
    }
}

#[test]
fn test_renamed_shadowing_local() {
    let test = jsw(r#"
        float k = 1.0;
        void main() {
            float k = 2.0;
            {
                float k = k + 1.0;
                color = float4(k);
            }
        }
    "#);
    test.assert_contains("float k = 1.0f;");
    test.assert_contains("float k_1 = 2.0f;");
    test.assert_contains("float k_2 = k_1 + 1.0f;");
    assert_eq!(test.run(&[], &[]), [3.0; 4]);
}

#[test]
fn test_broadcast_effect_evaluated_once() {
    let test = jsw(r#"
        void main() {
            int i = 0;
            int3 v = int3(i++);
        }
    "#);
    test.assert_contains(
        r#"
        int jsl_tmp0 = i++;
        int v_x = jsl_tmp0;
        int v_y = jsl_tmp0;
        int v_z = jsl_tmp0;
    "#,
    );
}

#[test]
fn test_broadcast_user_call_evaluated_once() {
    let test = jsw(r#"
        float g;
        float bump() {
            g += 1.0;
            return g;
        }
        void main() {
            float4 c = float4(bump());
            color = c;
        }
    "#);
    test.assert_contains("float jsl_tmp0 = bump();");
    test.assert_contains("float c_w = jsl_tmp0;");
    assert_eq!(test.code().matches("bump()").count(), 2);
}

#[test]
fn test_broadcast_assignment_runs_once() {
    let test = jsw(r#"
        void main() {
            float s = 0.0;
            color = float4(s += 1.0);
        }
    "#);
    test.assert_contains("float jsl_tmp0 = s += 1.0f;");
    assert_eq!(test.run(&[], &[]), [1.0; 4]);
}

#[test]
fn test_partly_read_vector_assignment_writes_every_lane() {
    let test = jsw(r#"
        void main() {
            float2 v;
            float x = (v = pos0).y;
            color = float4(v.x, v.y, x, 0.0);
        }
    "#);
    test.assert_contains(
        r#"
        float jsl_tmp0_x = v_x = pos0_x;
        float jsl_tmp0_y = v_y = pos0_y;
        float x = (jsl_tmp0_y);
    "#,
    );
    assert_eq!(test.run(&[("pos0_x", 0.25), ("pos0_y", 0.75)], &[]), [0.25, 0.75, 0.75, 0.0]);
}

#[test]
fn test_discarded_value_keeps_only_writes() {
    let test = jsw(r#"
        void main() {
            float s = 0.0;
            pos0 * (s += 1.0);
            color = float4(s);
        }
    "#);
    test.assert_contains(
        r#"
        float s = 0.0f;
        s += 1.0f;
        color[0] = s;
    "#,
    );
    assert_eq!(test.run(&[], &[]), [1.0; 4]);
}

#[test]
fn test_java_keywords_renamed() {
    let test = jsw(r#"
        float static(float x) {
            return x * 2.0;
        }
        void main() {
            float new = 1.0;
            float final = static(new);
            color = float4(new, final, 0.0, 1.0);
        }
    "#);
    test.assert_contains("float static_1(float x) {");
    test.assert_contains(
        r#"
        float new_1 = 1.0f;
        float final_1 = static_1(new_1);
        color[0] = new_1;
        color[1] = final_1;
    "#,
    );
    test.assert_not_contains("float new =");
}

#[test]
fn test_math_class_not_shadowed() {
    let test = jsw(r#"
        void main() {
            float Math = 0.25;
            color = float4(sqrt(Math));
        }
    "#);
    test.assert_contains("float Math_1 = 0.25f;");
    assert_eq!(test.run(&[], &[]), [0.5; 4]);
}
