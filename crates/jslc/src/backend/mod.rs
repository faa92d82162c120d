//! Target code emission.
//!
//! [`SlBackend`] is the shared emitter: it visits a [`Program`] once and
//! writes target text for every node kind. A [`Target`] supplies the name
//! tables and the three target-specific pieces: the entry point, variable
//! declarations and variable references.
//!
//! Vector-native targets emit each expression once. Scalarized targets emit
//! every vector value one lane at a time: `v` becomes `v_x`, `v_y`, ... and
//! a vector statement becomes one statement per lane.

mod emit;
pub mod hlsl;
pub mod jsw;
mod scalar;
pub mod sse;
pub mod tables;
pub mod template;

use alloc::{
    collections::{BTreeMap, BTreeSet},
    format,
    string::{String, ToString},
    vec::Vec,
};
use core::marker::PhantomData;

use crate::{
    ast::{visitor::Visitor, Expr, FuncDef, Program, VarDecl},
    error::{JslError, JslResult},
    shader_model::ShaderModel,
    symbols::{CoreVar, FuncId, ParamBinding, SymbolTable, VarId},
    types::{BaseKind, Type},
};
use tables::BackendTables;

pub use hlsl::Hlsl;
pub use jsw::Jsw;
pub use sse::Sse;

/// Lane suffixes of scalarized vector variables.
pub const LANE_SUFFIX: [&str; 4] = ["x", "y", "z", "w"];

/// How a target represents vector values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneModel {
    /// Vectors are native values
    Vector,
    /// Vectors are split into one scalar per lane
    Scalarized,
}

/// The part of a value being emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lane {
    Whole,
    Component(u8),
}

impl Lane {
    /// Lane index; the whole value counts as lane 0.
    pub fn index(self) -> u8 {
        match self {
            Lane::Whole => 0,
            Lane::Component(c) => c,
        }
    }

    /// Scalars only have lane 0.
    pub fn for_type(self, ty: Type) -> Lane {
        match self {
            Lane::Component(_) if ty.arity() <= 1 => Lane::Component(0),
            other => other,
        }
    }
}

/// Emitted program and its runtime parameter bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledShader {
    pub code: String,
    pub params: Vec<ParamBinding>,
}

/// A concrete output language.
pub trait Target: Sized {
    const NAME: &'static str;
    const LANES: LaneModel;
    /// Suffix of float literals
    const FLOAT_SUFFIX: &'static str;
    /// Words emitted identifiers must avoid
    const RESERVED: &'static [&'static str];

    /// Build the name tables for `model`.
    fn tables(model: ShaderModel) -> BackendTables;

    /// Emit `void main()` with the target's fixed input/output signature.
    fn entry_point(b: &mut SlBackend<'_, Self>, def: &FuncDef) -> JslResult<()>;

    /// Emit one declared variable.
    fn var_decl(b: &mut SlBackend<'_, Self>, decl: &VarDecl, global: bool) -> JslResult<()>;

    /// Text that reads (or writes) `var` at `lane`, optionally indexed.
    fn variable_ref(
        b: &SlBackend<'_, Self>,
        var: VarId,
        index: Option<&str>,
        lane: Lane,
    ) -> JslResult<String>;

    fn discard(b: &mut SlBackend<'_, Self>) -> JslResult<()>;
}

/// A target bound to a shader model. Tables are built once, here.
pub struct Backend<T: Target> {
    tables: BackendTables,
    _target: PhantomData<T>,
}

impl<T: Target> Backend<T> {
    pub fn new(model: ShaderModel) -> Self {
        Self {
            tables: T::tables(model),
            _target: PhantomData,
        }
    }

    pub fn model(&self) -> ShaderModel {
        self.tables.model()
    }

    pub fn tables(&self) -> &BackendTables {
        &self.tables
    }

    /// Emit `program`. Emission state lives only for this call, so the same
    /// program always produces the same text.
    pub fn emit(&self, program: &Program) -> JslResult<CompiledShader> {
        let mut b = SlBackend::<T>::new(&self.tables, &program.symbols);
        program.unit.accept(&mut b)?;
        Ok(CompiledShader {
            code: b.out,
            params: program.symbols.param_bindings(),
        })
    }
}

/// Binding strength of emitted operators, C rules.
pub(crate) mod prec {
    pub const ASSIGN: u8 = 1;
    pub const OR: u8 = 3;
    pub const AND: u8 = 4;
    pub const EQUALITY: u8 = 5;
    pub const RELATIONAL: u8 = 6;
    pub const ADDITIVE: u8 = 7;
    pub const MULTIPLICATIVE: u8 = 8;
    pub const UNARY: u8 = 9;
    pub const POSTFIX: u8 = 10;
    pub const PRIMARY: u8 = 11;
}

/// Shared emitter state for one program.
pub struct SlBackend<'a, T: Target> {
    tables: &'a BackendTables,
    symbols: &'a SymbolTable,
    out: String,
    indent: usize,
    lane: Lane,
    /// Preamble lines waiting for the current statement
    pending: Vec<String>,
    /// Call sites whose preamble the current statement already has
    emitted_sites: BTreeSet<u32>,
    /// Effects of the current statement already evaluated into temporaries
    hoisted: BTreeMap<*const Expr, String>,
    /// Evaluations per effect and lane, while a statement is being measured
    effect_counts: Option<BTreeMap<(*const Expr, u8), u32>>,
    next_temp: u32,
    names: BTreeMap<VarId, String>,
    func_names: BTreeMap<FuncId, String>,
    global_names: BTreeSet<String>,
    local_names: BTreeSet<String>,
    in_entry_point: bool,
    _target: PhantomData<T>,
}

impl<'a, T: Target> SlBackend<'a, T> {
    fn new(tables: &'a BackendTables, symbols: &'a SymbolTable) -> Self {
        let mut b = Self {
            tables,
            symbols,
            out: String::new(),
            indent: 0,
            lane: match T::LANES {
                LaneModel::Vector => Lane::Whole,
                LaneModel::Scalarized => Lane::Component(0),
            },
            pending: Vec::new(),
            emitted_sites: BTreeSet::new(),
            hoisted: BTreeMap::new(),
            effect_counts: None,
            next_temp: 0,
            names: BTreeMap::new(),
            func_names: BTreeMap::new(),
            global_names: CoreVar::ALL.iter().map(|c| c.name().to_string()).collect(),
            local_names: BTreeSet::new(),
            in_entry_point: false,
            _target: PhantomData,
        };
        b.global_names.extend(T::RESERVED.iter().map(|w| w.to_string()));
        // `Math.abs` reserves `Math`.
        b.global_names
            .extend(tables.function_names().filter_map(|n| n.split('.').next()).map(String::from));
        for (id, func) in symbols.functions() {
            let name = if func.is_entry_point() {
                func.name.clone()
            } else {
                b.unique_name(&func.name)
            };
            b.global_names.insert(name.clone());
            b.func_names.insert(id, name);
        }
        b
    }

    pub fn symbols(&self) -> &'a SymbolTable {
        self.symbols
    }

    pub fn tables(&self) -> &'a BackendTables {
        self.tables
    }

    pub fn in_entry_point(&self) -> bool {
        self.in_entry_point
    }

    /// Lane used for values that are always scalar (conditions, indices).
    pub fn scalar_lane(&self) -> Lane {
        match T::LANES {
            LaneModel::Vector => Lane::Whole,
            LaneModel::Scalarized => Lane::Component(0),
        }
    }

    /// Number of lanes a scalarized value of `ty` occupies.
    pub fn lanes(ty: Type) -> u8 {
        ty.arity().max(1)
    }

    pub fn write_line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.out.push_str("    ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    /// Run `f` with a fresh output buffer at indent 0 and return what it wrote.
    fn capture(&mut self, f: impl FnOnce(&mut Self) -> JslResult<()>) -> JslResult<String> {
        let saved_out = core::mem::take(&mut self.out);
        let saved_indent = core::mem::replace(&mut self.indent, 0);
        let result = f(self);
        self.indent = saved_indent;
        let text = core::mem::replace(&mut self.out, saved_out);
        result.map(|()| text)
    }

    /// Emit `e` at `lane` and return the text.
    pub fn expr_text(&mut self, e: &Expr, lane: Lane) -> JslResult<String> {
        let lane = lane.for_type(e.ty());
        let key = e as *const Expr;
        if let Some(temp) = self.hoisted.get(&key) {
            return Ok(Self::temp_lane(temp, e.ty(), lane));
        }
        if let Some(counts) = &mut self.effect_counts {
            if e.is_effect() {
                *counts.entry((key, lane.index())).or_insert(0) += 1;
            }
        }
        let saved_lane = core::mem::replace(&mut self.lane, lane);
        let saved_out = core::mem::take(&mut self.out);
        let result = e.accept(self);
        self.lane = saved_lane;
        let text = core::mem::replace(&mut self.out, saved_out);
        result.map(|()| text)
    }

    /// Like [`Self::expr_text`], parenthesized when `e` binds looser than
    /// `min_prec`.
    pub fn operand(&mut self, e: &Expr, lane: Lane, min_prec: u8) -> JslResult<String> {
        let text = self.expr_text(e, lane)?;
        if self.precedence(e, lane.for_type(e.ty())) < min_prec {
            Ok(format!("({})", text))
        } else {
            Ok(text)
        }
    }

    /// Like [`Self::expr_text`], with every effect in `e` evaluated once.
    pub fn once_text(&mut self, e: &Expr, lane: Lane) -> JslResult<String> {
        self.with_effects_once(&[e], |b| b.expr_text(e, lane))
    }

    /// Start a statement: call-site preambles and hoisted effects are
    /// tracked per statement.
    pub fn begin_statement(&mut self) {
        self.emitted_sites.clear();
        self.hoisted.clear();
    }

    /// Write pending preambles before the statement about to be written.
    pub fn flush_preambles(&mut self) {
        for line in core::mem::take(&mut self.pending) {
            self.write_line(&line);
        }
    }

    /// Like [`Self::flush_preambles`] but preambles have nowhere to go in
    /// global initializers.
    pub fn flush_preambles_at(&mut self, global: bool) -> JslResult<()> {
        if global && !self.pending.is_empty() {
            self.pending.clear();
            return Err(JslError::unsupported(
                T::NAME,
                "expression needing a temporary in a global initializer",
            ));
        }
        self.flush_preambles();
        Ok(())
    }

    /// Loop headers are re-evaluated each iteration; a preamble before the
    /// loop would only run once.
    fn check_loop_header(&mut self, what: &str) -> JslResult<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        self.pending.clear();
        Err(JslError::unsupported(
            T::NAME,
            format!("expression needing a temporary in a {} header", what),
        ))
    }

    /// `base`, with a numeric suffix if a reserved word, a global or an
    /// earlier local of the same function already has it.
    fn unique_name(&self, base: &str) -> String {
        let mut name = base.to_string();
        let mut n = 1;
        while self.global_names.contains(&name) || self.local_names.contains(&name) {
            name = format!("{}_{}", base, n);
            n += 1;
        }
        name
    }

    /// Pick the emitted name of a newly declared variable.
    pub fn declare_name(&mut self, var: VarId, global: bool) -> String {
        let symbols = self.symbols;
        let name = self.unique_name(&symbols.variable(var).name);
        if global {
            self.global_names.insert(name.clone());
        } else {
            self.local_names.insert(name.clone());
        }
        self.names.insert(var, name.clone());
        name
    }

    /// Emitted name of `var`.
    pub fn var_name(&self, var: VarId) -> &str {
        match self.names.get(&var) {
            Some(name) => name,
            None => &self.symbols.variable(var).name,
        }
    }

    /// Emitted name of user function `func`.
    pub fn func_name(&self, func: FuncId) -> &str {
        match self.func_names.get(&func) {
            Some(name) => name,
            None => &self.symbols.function(func).name,
        }
    }

    /// Scalarized name of `var` at `lane`: `v_x` for vectors, `s` for scalars.
    pub fn lane_name(&self, var: VarId, lane: u8) -> String {
        let name = self.var_name(var);
        if self.symbols.variable(var).ty.is_vector() {
            format!("{}_{}", name, LANE_SUFFIX[(lane & 3) as usize])
        } else {
            name.to_string()
        }
    }

    pub fn type_name(&self, ty: Type) -> JslResult<&'static str> {
        self.tables.type_name(ty)
    }

    /// Lane type of `ty` on scalarized targets.
    pub fn scalar_type_name(&self, ty: Type) -> JslResult<&'static str> {
        match ty.base() {
            BaseKind::Float | BaseKind::Int | BaseKind::Bool => {
                self.tables.type_name(ty.component())
            }
            _ => self.tables.type_name(ty),
        }
    }

    pub fn qualifier_name(&self, q: crate::symbols::Qualifier) -> JslResult<&'static str> {
        self.tables.qualifier_name(q)
    }

    /// Text reading `lane` of a temporary of type `ty`.
    fn temp_lane(temp: &str, ty: Type, lane: Lane) -> String {
        match lane {
            Lane::Component(c) if Self::lanes(ty) > 1 => {
                format!("{}_{}", temp, LANE_SUFFIX[(c & 3) as usize])
            }
            _ => temp.to_string(),
        }
    }

    fn fresh_temp(&mut self) -> String {
        let name = format!("jsl_tmp{}", self.next_temp);
        self.next_temp += 1;
        name
    }

    /// Emit the body statements of `def` and its closing brace.
    pub fn function_body(&mut self, def: &FuncDef) -> JslResult<()> {
        self.indent += 1;
        for stmt in &def.body.stmts {
            stmt.accept(self)?;
        }
        self.indent -= 1;
        self.write_line("}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::Builtin;

    fn covers_catalog<T: Target>() {
        for model in ShaderModel::ALL {
            let tables = T::tables(model);
            for builtin in Builtin::ALL {
                let entry = tables.function(builtin);
                assert!(entry.is_some(), "{} has no entry for {}", T::NAME, builtin);
                if let Some(tables::FuncEntry {
                    imp: tables::FuncImpl::Template(t),
                    ..
                }) = entry
                {
                    template::arg_count(T::NAME, t).unwrap();
                }
            }
        }
    }

    #[test]
    fn test_every_backend_covers_catalog() {
        covers_catalog::<Hlsl>();
        covers_catalog::<Sse>();
        covers_catalog::<Jsw>();
    }

    #[test]
    fn test_template_arg_counts_fit_signatures() {
        // A template may not read an argument its builtin never receives.
        for builtin in Builtin::ALL {
            let max_args = match builtin {
                Builtin::Clamp | Builtin::Mix | Builtin::Smoothstep | Builtin::Fma => 3,
                Builtin::Sample
                | Builtin::Distance
                | Builtin::Dot
                | Builtin::Cross
                | Builtin::Pow
                | Builtin::Mod
                | Builtin::Min
                | Builtin::Max
                | Builtin::Step => 2,
                _ => 1,
            };
            for tables in [
                Sse::tables(ShaderModel::Sm5_1),
                Jsw::tables(ShaderModel::Sm5_1),
            ] {
                if let Some(tables::FuncImpl::Template(t)) =
                    tables.function(builtin).map(|e| e.imp)
                {
                    assert!(template::arg_count("test", &t).unwrap() <= max_args, "{}", builtin);
                }
            }
        }
    }

    #[test]
    fn test_lane_for_type() {
        assert_eq!(Lane::Component(2).for_type(Type::Float), Lane::Component(0));
        assert_eq!(Lane::Component(2).for_type(Type::Float3), Lane::Component(2));
        assert_eq!(Lane::Whole.for_type(Type::Float), Lane::Whole);
    }
}
