//! C++ flavoured CPU target.
//!
//! Every vector is split into scalar lanes so the host compiler can
//! auto-vectorize across pixels. Builtins map onto `<cmath>`; sampling goes
//! through the runtime's `jsl_sample`.

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

/// Scalarized C++ target.
#[derive(Debug, Clone, Copy)]
pub struct Sse;

const CROSS: [&str; 4] = [
    "($1.y * $2.z - $1.z * $2.y)",
    "($1.z * $2.x - $1.x * $2.z)",
    "($1.x * $2.y - $1.y * $2.x)",
    "0.0f",
];

const SMOOTHSTEP: &str = "(fminf(fmaxf(($3 - $1) / ($2 - $1), 0.0f), 1.0f) \
     * fminf(fmaxf(($3 - $1) / ($2 - $1), 0.0f), 1.0f) \
     * (3.0f - 2.0f * fminf(fmaxf(($3 - $1) / ($2 - $1), 0.0f), 1.0f)))";

/// C++ keywords and the runtime's names.
const CPP_RESERVED: &[&str] = &[
    "alignas", "alignof", "and", "and_eq", "asm", "auto", "bitand", "bitor", "bool", "break",
    "case", "catch", "char", "char16_t", "char32_t", "class", "compl", "const", "const_cast",
    "constexpr", "continue", "decltype", "default", "delete", "do", "double", "dynamic_cast",
    "else", "enum", "explicit", "export", "extern", "false", "float", "for", "friend", "goto",
    "if", "inline", "int", "long", "mutable", "namespace", "new", "noexcept", "not", "not_eq",
    "nullptr", "operator", "or", "or_eq", "private", "protected", "public", "register",
    "reinterpret_cast", "return", "short", "signed", "sizeof", "static", "static_assert",
    "static_cast", "struct", "switch", "template", "this", "thread_local", "throw", "true", "try",
    "typedef", "typeid", "typename", "union", "unsigned", "using", "virtual", "void", "volatile",
    "wchar_t", "while", "xor", "xor_eq", "JSLSampler", "jsl_sample", "jsl_samplers", "jsl_buffers",
    "jsl_constants",
];

impl Target for Sse {
    const NAME: &'static str = "sse";
    const LANES: LaneModel = LaneModel::Scalarized;
    const FLOAT_SUFFIX: &'static str = "f";
    const RESERVED: &'static [&'static str] = CPP_RESERVED;

    fn tables(model: ShaderModel) -> BackendTables {
        use Builtin::*;

        TableBuilder::new(Self::NAME, model)
            .at(ShaderModel::Sm3)
            .ty(Type::Void, "void")
            .ty(Type::Float, "float")
            .ty(Type::Int, "int")
            .ty(Type::Bool, "bool")
            .ty(Type::Sampler, "JSLSampler")
            .ty(Type::LSampler, "JSLSampler")
            .ty(Type::FSampler, "JSLSampler")
            .qualifier(Qualifier::Local, "")
            .qualifier(Qualifier::Const, "#define")
            .qualifier(Qualifier::Param, "")
            .template(
                Sample,
                FuncTemplate::lanewise("$t[$c]")
                    .with_preamble("float $t[4]; jsl_sample($1, $2.x, $2.y, $t);"),
            )
            .template(Intcast, FuncTemplate::lanewise("((int) $1)"))
            .template(Any, FuncTemplate::lanewise("($r)").with_reduce("$1", " || "))
            .template(All, FuncTemplate::lanewise("($r)").with_reduce("$1", " && "))
            .template(
                Length,
                FuncTemplate::lanewise("sqrtf($r)").with_reduce("$1 * $1", " + "),
            )
            .template(
                Distance,
                FuncTemplate::lanewise("sqrtf($r)").with_reduce("($1 - $2) * ($1 - $2)", " + "),
            )
            .template(Dot, FuncTemplate::lanewise("($r)").with_reduce("$1 * $2", " + "))
            .template(Cross, FuncTemplate::per_lane(CROSS))
            .template(
                Normalize,
                FuncTemplate::lanewise("($1 / sqrtf($r))").with_reduce("$1 * $1", " + "),
            )
            .name(Abs, "fabsf")
            .name(Ceil, "ceilf")
            .name(Floor, "floorf")
            .template(Fract, FuncTemplate::lanewise("($1 - floorf($1))"))
            .template(
                Sign,
                FuncTemplate::lanewise("(($1 > 0.0f) ? 1.0f : (($1 < 0.0f) ? -1.0f : 0.0f))"),
            )
            .name(Sqrt, "sqrtf")
            .name(Sin, "sinf")
            .name(Cos, "cosf")
            .name(Tan, "tanf")
            .name(Asin, "asinf")
            .name(Acos, "acosf")
            .name(Atan, "atanf")
            .name(Exp, "expf")
            .name(Log, "logf")
            .name(Exp2, "exp2f")
            .name(Log2, "log2f")
            .template(Degrees, FuncTemplate::lanewise("($1 * 57.29577951308232f)"))
            .template(Radians, FuncTemplate::lanewise("($1 * 0.017453292519943295f)"))
            .name(Pow, "powf")
            .name(Mod, "fmodf")
            .name(Min, "fminf")
            .name(Max, "fmaxf")
            .template(Clamp, FuncTemplate::lanewise("fminf(fmaxf($1, $2), $3)"))
            .template(Mix, FuncTemplate::lanewise("($1 + ($2 - $1) * $3)"))
            .template(Step, FuncTemplate::lanewise("(($2 < $1) ? 0.0f : 1.0f)"))
            .template(Smoothstep, FuncTemplate::lanewise(SMOOTHSTEP))
            .name(IsFinite, "isfinite")
            .name(IsInfinite, "isinf")
            .name(IsNaN, "isnan")
            .at(ShaderModel::Sm4_0)
            .ty(Type::CBuffer, "JSLBuffer")
            .ty(Type::TBuffer, "JSLBuffer")
            .at(ShaderModel::Sm5_0)
            .name(Fma, "fmaf")
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

impl ScalarTarget for Sse {
    const CONST_STYLE: ConstStyle = ConstStyle::Define;
    const COLOR_PARAM: &'static str = "float *color";
    const ZERO_INIT: bool = false;

    fn array_decl(ty: &str, name: &str, len: u32) -> String {
        format!("{} {}[{}]", ty, name, len)
    }
}
