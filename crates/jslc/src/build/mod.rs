//! AST construction.
//!
//! [`AstBuilder`] resolves a parse tree against a [`SymbolTable`] and produces
//! a typed [`Program`]. Construction fails fast: the first error aborts the
//! unit and no partial AST is returned.

mod decl;
mod expr;
mod function;
mod stmt;

use jsl_syntax::syntax::{ExternalDeclaration, TranslationUnit};

use crate::{
    ast::{ExtDecl, GlueBlock, Program, ProgramUnit},
    error::{JslError, JslResult},
    symbols::{FrameGuard, SymbolTable, ENTRY_POINT},
    types::Type,
};

/// State of the function whose body is being built.
#[derive(Debug, Clone, Copy)]
struct FunctionContext {
    return_type: Type,
    entry_point: bool,
}

/// Builds a typed [`Program`] from a parse tree.
pub struct AstBuilder {
    symbols: SymbolTable,
    require_entry_point: bool,
    next_site: u32,
    loop_depth: u32,
    function: Option<FunctionContext>,
}

impl Default for AstBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AstBuilder {
    /// Create a builder with a fresh symbol table.
    pub fn new() -> Self {
        Self {
            symbols: SymbolTable::new(),
            require_entry_point: true,
            next_site: 0,
            loop_depth: 0,
            function: None,
        }
    }

    /// Whether a missing `main` is an error (the default).
    pub fn require_entry_point(mut self, require: bool) -> Self {
        self.require_entry_point = require;
        self
    }

    /// Build the whole unit.
    pub fn build(mut self, unit: &TranslationUnit) -> JslResult<Program> {
        let mut decls = alloc::vec::Vec::with_capacity(unit.decls.len());
        for decl in &unit.decls {
            let built = match decl {
                ExternalDeclaration::Function(f) => ExtDecl::Func(self.build_function(f)?),
                ExternalDeclaration::Declaration(d) => {
                    ExtDecl::Var(self.build_declaration(d)?)
                }
                ExternalDeclaration::Glue(text) => ExtDecl::Glue(GlueBlock { text: text.clone() }),
            };
            decls.push(built);
        }

        let program = Program {
            unit: ProgramUnit { decls },
            symbols: self.symbols,
        };
        if self.require_entry_point && program.entry_point().is_none() {
            return Err(JslError::undefined(ENTRY_POINT));
        }
        Ok(program)
    }

    /// Run `f` in a fresh frame, popping it on every exit path.
    fn in_frame<R>(&mut self, f: impl FnOnce(&mut Self) -> JslResult<R>) -> JslResult<R> {
        let mut guard = FrameGuard::new(self);
        f(&mut *guard)
    }

    /// Run `f` as a loop body.
    fn in_loop<R>(&mut self, f: impl FnOnce(&mut Self) -> JslResult<R>) -> JslResult<R> {
        self.loop_depth += 1;
        let result = f(self);
        self.loop_depth -= 1;
        result
    }

    fn in_entry_point(&self) -> bool {
        self.function.map(|f| f.entry_point).unwrap_or(false)
    }

    fn next_call_site(&mut self) -> u32 {
        let site = self.next_site;
        self.next_site += 1;
        site
    }
}

impl AsMut<SymbolTable> for AstBuilder {
    fn as_mut(&mut self) -> &mut SymbolTable {
        &mut self.symbols
    }
}

/// Build a program from a parse tree with default options.
pub fn build_program(unit: &TranslationUnit) -> JslResult<Program> {
    AstBuilder::new().build(unit)
}
