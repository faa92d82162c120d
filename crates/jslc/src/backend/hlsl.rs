//! Direct3D HLSL target.
//!
//! HLSL has native vectors and most JSL builtins under the same or a close
//! name, so expressions are emitted as written and only names go through
//! the tables.

use alloc::{format, string::String};

use super::{
    tables::{BackendTables, TableBuilder},
    Lane, LaneModel, SlBackend, Target,
};
use crate::{
    ast::{FuncDef, VarDecl},
    builtins::Builtin,
    error::{JslError, JslResult},
    shader_model::ShaderModel,
    symbols::{Qualifier, Register, VarId},
    types::{BaseKind, Type},
};

/// Vector-native HLSL target.
#[derive(Debug, Clone, Copy)]
pub struct Hlsl;

/// Fixed pixel shader signature.
const ENTRY_POINT: &str = "void main(in float2 pos0 : TEXCOORD0, in float2 pos1 : TEXCOORD1, \
     in float2 pixcoord : VPOS, in float4 jsl_vertexColor : COLOR0, \
     out float4 color : COLOR0) {";

/// Declared type of a `param` variable.
///
/// Integer constant registers misbehave on SM3 hardware, so integer params
/// are declared as floats of the same arity and bound to `c` registers. The
/// runtime uploads them with the float constant API.
fn param_type(ty: Type) -> Type {
    match ty.base() {
        BaseKind::Int => ty.with_base(BaseKind::Float).unwrap_or(ty),
        _ => ty,
    }
}

/// HLSL keywords and predeclared type names.
const HLSL_RESERVED: &[&str] = &[
    "asm", "bool", "break", "case", "cbuffer", "centroid", "class", "column_major", "compile",
    "const", "continue", "default", "discard", "do", "double", "else", "export", "extern", "false",
    "for", "groupshared", "half", "if", "in", "inline", "inout", "int", "interface", "linear",
    "line", "matrix", "namespace", "nointerpolation", "noperspective", "out", "packoffset", "pass",
    "point", "precise", "register", "return", "row_major", "sample", "sampler", "sampler1D",
    "sampler2D", "sampler3D", "samplerCUBE", "SamplerState", "shared", "snorm", "static", "string",
    "struct", "switch", "tbuffer", "technique", "texture", "Texture2D", "true", "typedef", "uint",
    "uniform", "unorm", "unsigned", "vector", "vertexshader", "void", "volatile", "while",
];

impl Target for Hlsl {
    const NAME: &'static str = "hlsl";
    const LANES: LaneModel = LaneModel::Vector;
    const FLOAT_SUFFIX: &'static str = "";
    const RESERVED: &'static [&'static str] = HLSL_RESERVED;

    fn tables(model: ShaderModel) -> BackendTables {
        use Builtin::*;

        let mut builder = TableBuilder::new(Self::NAME, model);
        builder
            .at(ShaderModel::Sm3)
            .ty(Type::Void, "void")
            .ty(Type::Float, "float")
            .ty(Type::Float2, "float2")
            .ty(Type::Float3, "float3")
            .ty(Type::Float4, "float4")
            .ty(Type::Int, "int")
            .ty(Type::Int2, "int2")
            .ty(Type::Int3, "int3")
            .ty(Type::Int4, "int4")
            .ty(Type::Bool, "bool")
            .ty(Type::Bool2, "bool2")
            .ty(Type::Bool3, "bool3")
            .ty(Type::Bool4, "bool4")
            .ty(Type::Sampler, "sampler2D")
            .ty(Type::LSampler, "sampler2D")
            .ty(Type::FSampler, "sampler2D")
            .qualifier(Qualifier::Local, "")
            .qualifier(Qualifier::Const, "#define")
            .qualifier(Qualifier::Param, "")
            .name(Sample, "tex2D")
            .name(Intcast, "int")
            .name(Fract, "frac")
            .name(Mix, "lerp")
            .name(Mod, "fmod")
            .name(IsFinite, "isfinite")
            .name(IsInfinite, "isinf")
            .name(IsNaN, "isnan");

        // Everything else has the JSL name.
        for builtin in Builtin::ALL {
            if builtin_keeps_name(builtin) {
                builder.name(builtin, builtin.name());
            }
        }

        builder
            .at(ShaderModel::Sm4_0)
            .ty(Type::CBuffer, "cbuffer")
            .ty(Type::TBuffer, "tbuffer")
            .at(ShaderModel::Sm5_0)
            .name(Fma, "mad")
            .build()
    }

    fn entry_point(b: &mut SlBackend<'_, Self>, def: &FuncDef) -> JslResult<()> {
        b.write_line(ENTRY_POINT);
        b.function_body(def)
    }

    fn var_decl(b: &mut SlBackend<'_, Self>, decl: &VarDecl, global: bool) -> JslResult<()> {
        let var = b.symbols().variable(decl.var);
        let init = match &decl.init {
            Some(init) => Some(b.once_text(init, Lane::Whole)?),
            None => None,
        };
        b.flush_preambles_at(global)?;

        let qualifier = b.qualifier_name(var.qualifier)?;
        let line = match var.qualifier {
            Qualifier::Const => {
                // Macros outlive the function that defines them.
                let name = b.declare_name(decl.var, true);
                let value = init.ok_or_else(|| {
                    JslError::unresolved(Self::NAME, format!("value of const '{}'", var.name))
                })?;
                format!("{} {} ({})", qualifier, name, value)
            }
            Qualifier::Param => {
                let ty = b.type_name(param_type(var.ty))?;
                let name = b.declare_name(decl.var, global);
                let register = var.register.ok_or_else(|| {
                    JslError::unresolved(Self::NAME, format!("register of '{}'", var.name))
                })?;
                let class = match register {
                    Register::Sampler(_) => 's',
                    Register::Constant(_) => 'c',
                };
                format!(
                    "{}{} {}{} : register({}{});",
                    qualifier_prefix(qualifier),
                    ty,
                    name,
                    array_suffix(var.array_len),
                    class,
                    register.index()
                )
            }
            Qualifier::Local => {
                let ty = b.type_name(var.ty)?;
                let name = b.declare_name(decl.var, global);
                let storage = if global { "static " } else { "" };
                let value = init.map(|v| format!(" = {}", v)).unwrap_or_default();
                format!(
                    "{}{}{} {}{}{};",
                    storage,
                    qualifier_prefix(qualifier),
                    ty,
                    name,
                    array_suffix(var.array_len),
                    value
                )
            }
        };
        b.write_line(&line);
        Ok(())
    }

    fn variable_ref(
        b: &SlBackend<'_, Self>,
        var: VarId,
        index: Option<&str>,
        _lane: Lane,
    ) -> JslResult<String> {
        let name = b.var_name(var);
        Ok(match index {
            Some(i) => format!("{}[{}]", name, i),
            None => String::from(name),
        })
    }

    fn discard(b: &mut SlBackend<'_, Self>) -> JslResult<()> {
        b.write_line("discard;");
        Ok(())
    }
}

fn qualifier_prefix(qualifier: &str) -> String {
    if qualifier.is_empty() {
        String::new()
    } else {
        format!("{} ", qualifier)
    }
}

fn array_suffix(len: Option<u32>) -> String {
    len.map(|n| format!("[{}]", n)).unwrap_or_default()
}

/// Builtins HLSL provides under their JSL name.
fn builtin_keeps_name(builtin: Builtin) -> bool {
    !matches!(
        builtin,
        Builtin::Sample
            | Builtin::Intcast
            | Builtin::Fract
            | Builtin::Mix
            | Builtin::Mod
            | Builtin::IsFinite
            | Builtin::IsInfinite
            | Builtin::IsNaN
            | Builtin::Fma
    )
}
