//! One-call compilation driver: parse, build, emit.

use alloc::{format, string::String};
use core::{fmt, str::FromStr};

use jsl_syntax::parse_translation_unit;

use crate::{
    ast::Program,
    backend::{Backend, CompiledShader, Hlsl, Jsw, Sse},
    build::AstBuilder,
    error::JslResult,
    shader_model::ShaderModel,
};

/// Output language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TargetKind {
    #[default]
    Hlsl,
    Sse,
    Jsw,
}

impl TargetKind {
    pub const ALL: [TargetKind; 3] = [TargetKind::Hlsl, TargetKind::Sse, TargetKind::Jsw];

    pub fn name(self) -> &'static str {
        match self {
            TargetKind::Hlsl => "hlsl",
            TargetKind::Sse => "sse",
            TargetKind::Jsw => "jsw",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TargetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown target '{}'", s))
    }
}

/// Options for [`compile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    pub target: TargetKind,
    pub shader_model: ShaderModel,
    /// Fail with `UndefinedSymbol` when the unit has no `main`
    pub require_entry_point: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            target: TargetKind::Hlsl,
            shader_model: ShaderModel::Sm3,
            require_entry_point: true,
        }
    }
}

impl CompileOptions {
    pub fn new(target: TargetKind) -> Self {
        Self {
            target,
            ..Self::default()
        }
    }

    pub fn with_shader_model(mut self, shader_model: ShaderModel) -> Self {
        self.shader_model = shader_model;
        self
    }

    pub fn with_entry_point_required(mut self, require: bool) -> Self {
        self.require_entry_point = require;
        self
    }
}

/// Compile JSL source text to target source text.
pub fn compile(source: &str, options: &CompileOptions) -> JslResult<CompiledShader> {
    let unit = parse_translation_unit(source)?;
    let program = AstBuilder::new()
        .require_entry_point(options.require_entry_point)
        .build(&unit)?;
    compile_program(&program, options)
}

/// Emit an already built program.
pub fn compile_program(program: &Program, options: &CompileOptions) -> JslResult<CompiledShader> {
    let model = options.shader_model;
    match options.target {
        TargetKind::Hlsl => Backend::<Hlsl>::new(model).emit(program),
        TargetKind::Sse => Backend::<Sse>::new(model).emit(program),
        TargetKind::Jsw => Backend::<Jsw>::new(model).emit(program),
    }
}
