//! Java flavoured software fallback target.
//!
//! Same lane model as the SSE target. Java has no preprocessor and no
//! implicit narrowing, so constants are `final` locals and `Math` results
//! are cast back to `float`.

use alloc::{format, string::String};

use super::{
    scalar::{self, ConstStyle, ScalarTarget},
    tables::{BackendTables, TableBuilder},
    template::FuncTemplate,
    Lane, LaneModel, SlBackend, Target,
};
use crate::{
    ast::{FuncDef, VarDecl},
    builtins::Builtin,
    error::JslResult,
    shader_model::ShaderModel,
    symbols::{Qualifier, VarId},
    types::Type,
};

/// Scalarized Java target.
#[derive(Debug, Clone, Copy)]
pub struct Jsw;

const CROSS: [&str; 4] = [
    "($1.y * $2.z - $1.z * $2.y)",
    "($1.z * $2.x - $1.x * $2.z)",
    "($1.x * $2.y - $1.y * $2.x)",
    "0.0f",
];

const SMOOTHSTEP: &str = "(Math.min(Math.max(($3 - $1) / ($2 - $1), 0.0f), 1.0f) \
     * Math.min(Math.max(($3 - $1) / ($2 - $1), 0.0f), 1.0f) \
     * (3.0f - 2.0f * Math.min(Math.max(($3 - $1) / ($2 - $1), 0.0f), 1.0f)))";

/// Names a Java declaration may not take or shadow.
const JAVA_RESERVED: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "false", "final", "finally",
    "float", "for", "goto", "if", "implements", "import", "instanceof", "int", "interface", "long",
    "native", "new", "null", "package", "private", "protected", "public", "return", "short",
    "static", "strictfp", "super", "switch", "synchronized", "this", "throw", "throws",
    "transient", "true", "try", "var", "void", "volatile", "while", "Math", "Float", "Integer",
    "Object", "String", "System", "JSLSampler", "jsl_sample", "jsl_samplers", "jsl_buffers",
    "jsl_constants",
];

impl Target for Jsw {
    const NAME: &'static str = "jsw";
    const LANES: LaneModel = LaneModel::Scalarized;
    const FLOAT_SUFFIX: &'static str = "f";
    const RESERVED: &'static [&'static str] = JAVA_RESERVED;

    fn tables(model: ShaderModel) -> BackendTables {
        use Builtin::*;

        TableBuilder::new(Self::NAME, model)
            .at(ShaderModel::Sm3)
            .ty(Type::Void, "void")
            .ty(Type::Float, "float")
            .ty(Type::Int, "int")
            .ty(Type::Bool, "boolean")
            .ty(Type::Sampler, "JSLSampler")
            .ty(Type::LSampler, "JSLSampler")
            .ty(Type::FSampler, "JSLSampler")
            .qualifier(Qualifier::Local, "")
            .qualifier(Qualifier::Const, "final")
            .qualifier(Qualifier::Param, "")
            .template(
                Sample,
                FuncTemplate::lanewise("$t[$c]")
                    .with_preamble("float[] $t = jsl_sample($1, $2.x, $2.y);"),
            )
            .template(Intcast, FuncTemplate::lanewise("((int) $1)"))
            .template(Any, FuncTemplate::lanewise("($r)").with_reduce("$1", " || "))
            .template(All, FuncTemplate::lanewise("($r)").with_reduce("$1", " && "))
            .template(
                Length,
                FuncTemplate::lanewise("((float) Math.sqrt($r))").with_reduce("$1 * $1", " + "),
            )
            .template(
                Distance,
                FuncTemplate::lanewise("((float) Math.sqrt($r))")
                    .with_reduce("($1 - $2) * ($1 - $2)", " + "),
            )
            .template(Dot, FuncTemplate::lanewise("($r)").with_reduce("$1 * $2", " + "))
            .template(Cross, FuncTemplate::per_lane(CROSS))
            .template(
                Normalize,
                FuncTemplate::lanewise("($1 / ((float) Math.sqrt($r)))")
                    .with_reduce("$1 * $1", " + "),
            )
            .name(Abs, "Math.abs")
            .template(Ceil, FuncTemplate::lanewise("((float) Math.ceil($1))"))
            .template(Floor, FuncTemplate::lanewise("((float) Math.floor($1))"))
            .template(Fract, FuncTemplate::lanewise("($1 - (float) Math.floor($1))"))
            .name(Sign, "Math.signum")
            .template(Sqrt, FuncTemplate::lanewise("((float) Math.sqrt($1))"))
            .template(Sin, FuncTemplate::lanewise("((float) Math.sin($1))"))
            .template(Cos, FuncTemplate::lanewise("((float) Math.cos($1))"))
            .template(Tan, FuncTemplate::lanewise("((float) Math.tan($1))"))
            .template(Asin, FuncTemplate::lanewise("((float) Math.asin($1))"))
            .template(Acos, FuncTemplate::lanewise("((float) Math.acos($1))"))
            .template(Atan, FuncTemplate::lanewise("((float) Math.atan($1))"))
            .template(Exp, FuncTemplate::lanewise("((float) Math.exp($1))"))
            .template(Log, FuncTemplate::lanewise("((float) Math.log($1))"))
            .template(Exp2, FuncTemplate::lanewise("((float) Math.pow(2.0, $1))"))
            .template(
                Log2,
                FuncTemplate::lanewise("((float) (Math.log($1) / Math.log(2.0)))"),
            )
            .template(Degrees, FuncTemplate::lanewise("($1 * 57.29577951308232f)"))
            .template(Radians, FuncTemplate::lanewise("($1 * 0.017453292519943295f)"))
            .template(Pow, FuncTemplate::lanewise("((float) Math.pow($1, $2))"))
            .template(Mod, FuncTemplate::lanewise("($1 % $2)"))
            .name(Min, "Math.min")
            .name(Max, "Math.max")
            .template(Clamp, FuncTemplate::lanewise("Math.min(Math.max($1, $2), $3)"))
            .template(Mix, FuncTemplate::lanewise("($1 + ($2 - $1) * $3)"))
            .template(Step, FuncTemplate::lanewise("(($2 < $1) ? 0.0f : 1.0f)"))
            .template(Smoothstep, FuncTemplate::lanewise(SMOOTHSTEP))
            .template(
                IsFinite,
                FuncTemplate::lanewise("(!Float.isInfinite($1) && !Float.isNaN($1))"),
            )
            .name(IsInfinite, "Float.isInfinite")
            .name(IsNaN, "Float.isNaN")
            .at(ShaderModel::Sm4_0)
            .ty(Type::CBuffer, "JSLBuffer")
            .ty(Type::TBuffer, "JSLBuffer")
            .at(ShaderModel::Sm5_0)
            .name(Fma, "Math.fma")
            .build()
    }

    fn entry_point(b: &mut SlBackend<'_, Self>, def: &FuncDef) -> JslResult<()> {
        scalar::entry_point(b, def)
    }

    fn var_decl(b: &mut SlBackend<'_, Self>, decl: &VarDecl, global: bool) -> JslResult<()> {
        scalar::var_decl(b, decl, global)
    }

    fn variable_ref(
        b: &SlBackend<'_, Self>,
        var: VarId,
        index: Option<&str>,
        lane: Lane,
    ) -> JslResult<String> {
        scalar::variable_ref(b, var, index, lane)
    }

    fn discard(b: &mut SlBackend<'_, Self>) -> JslResult<()> {
        scalar::discard(b)
    }
}

impl ScalarTarget for Jsw {
    const CONST_STYLE: ConstStyle = ConstStyle::Final;
    const COLOR_PARAM: &'static str = "float[] color";
    const ZERO_INIT: bool = true;

    fn array_decl(ty: &str, name: &str, len: u32) -> String {
        format!("{}[] {} = new {}[{}]", ty, name, ty, len)
    }
}
