//! JSL shader compiler.
//!
//! This crate turns a JSL parse tree into target source code:
//! - Name resolution and type checking into a typed AST
//! - Shader model gating of types and builtins
//! - HLSL, SSE (C++) and JSW (Java) emitters
//!
//! [`compile`] runs the whole pipeline on source text.

#![no_std]

extern crate alloc;

#[macro_use]
mod debug;

pub mod ast;
pub mod backend;
pub mod build;
pub mod builtins;
pub mod compile;
pub mod error;
pub mod shader_model;
pub mod symbols;
pub mod types;
pub mod util;

pub use backend::{Backend, CompiledShader, Hlsl, Jsw, Sse, Target};
pub use build::{build_program, AstBuilder};
pub use builtins::Builtin;
pub use compile::{compile, compile_program, CompileOptions, TargetKind};
pub use error::{JslError, JslResult};
pub use shader_model::ShaderModel;
pub use symbols::{ParamBinding, Qualifier, Register, SymbolTable};
pub use types::Type;
