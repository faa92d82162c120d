//! Utilities for finding variable references in expressions.

use alloc::collections::BTreeSet;
use core::convert::Infallible;

use crate::{
    ast::{
        visitor::{walk, Visitor},
        ArrayAccessExpr, BinaryExpr, CallExpr, CompoundStmt, DeclStmt, DoWhileStmt, Expr,
        ExprStmt, FieldSelectExpr, ForStmt, FuncDef, GlueBlock, LiteralExpr, ParenExpr,
        ReturnStmt, SelectStmt, UnaryExpr, VariableExpr, VectorCtorExpr, WhileStmt,
    },
    symbols::VarId,
};

/// Collects every variable referenced by the visited nodes.
#[derive(Debug, Default)]
struct VariableRefs {
    vars: BTreeSet<VarId>,
}

impl Visitor for VariableRefs {
    type Error = Infallible;

    fn visit_literal(&mut self, _: &LiteralExpr) -> Result<(), Infallible> {
        Ok(())
    }

    fn visit_variable(&mut self, e: &VariableExpr) -> Result<(), Infallible> {
        self.vars.insert(e.var);
        Ok(())
    }

    fn visit_unary(&mut self, e: &UnaryExpr) -> Result<(), Infallible> {
        e.operand.accept(self)
    }

    fn visit_binary(&mut self, e: &BinaryExpr) -> Result<(), Infallible> {
        e.lhs.accept(self)?;
        e.rhs.accept(self)
    }

    fn visit_vector_ctor(&mut self, e: &VectorCtorExpr) -> Result<(), Infallible> {
        e.args.iter().try_for_each(|a| a.accept(self))
    }

    fn visit_paren(&mut self, e: &ParenExpr) -> Result<(), Infallible> {
        e.inner.accept(self)
    }

    fn visit_field_select(&mut self, e: &FieldSelectExpr) -> Result<(), Infallible> {
        e.base.accept(self)
    }

    fn visit_array_access(&mut self, e: &ArrayAccessExpr) -> Result<(), Infallible> {
        self.vars.insert(e.array);
        e.index.accept(self)
    }

    fn visit_call(&mut self, e: &CallExpr) -> Result<(), Infallible> {
        e.args.iter().try_for_each(|a| a.accept(self))
    }

    fn visit_expr_stmt(&mut self, s: &ExprStmt) -> Result<(), Infallible> {
        s.expr.accept(self)
    }

    fn visit_decl_stmt(&mut self, s: &DeclStmt) -> Result<(), Infallible> {
        // Declared names are not references; only initializers are.
        walk::walk_decl(self, s)
    }

    fn visit_compound(&mut self, s: &CompoundStmt) -> Result<(), Infallible> {
        walk::walk_compound(self, s)
    }

    fn visit_select(&mut self, s: &SelectStmt) -> Result<(), Infallible> {
        s.cond.accept(self)?;
        s.then_branch.accept(self)?;
        match &s.else_branch {
            Some(e) => e.accept(self),
            None => Ok(()),
        }
    }

    fn visit_while(&mut self, s: &WhileStmt) -> Result<(), Infallible> {
        s.cond.accept(self)?;
        s.body.accept(self)
    }

    fn visit_do_while(&mut self, s: &DoWhileStmt) -> Result<(), Infallible> {
        s.body.accept(self)?;
        s.cond.accept(self)
    }

    fn visit_for(&mut self, s: &ForStmt) -> Result<(), Infallible> {
        if let Some(init) = &s.init {
            init.accept(self)?;
        }
        if let Some(cond) = &s.cond {
            cond.accept(self)?;
        }
        if let Some(update) = &s.update {
            update.accept(self)?;
        }
        s.body.accept(self)
    }

    fn visit_return(&mut self, s: &ReturnStmt) -> Result<(), Infallible> {
        match &s.value {
            Some(e) => e.accept(self),
            None => Ok(()),
        }
    }

    fn visit_break(&mut self) -> Result<(), Infallible> {
        Ok(())
    }

    fn visit_continue(&mut self) -> Result<(), Infallible> {
        Ok(())
    }

    fn visit_discard(&mut self) -> Result<(), Infallible> {
        Ok(())
    }

    fn visit_func_def(&mut self, f: &FuncDef) -> Result<(), Infallible> {
        walk::walk_func_def(self, f)
    }

    fn visit_glue(&mut self, _: &GlueBlock) -> Result<(), Infallible> {
        Ok(())
    }
}

/// Find all variables referenced in an expression.
pub fn find_variable_references(expr: &Expr) -> BTreeSet<VarId> {
    let mut refs = VariableRefs::default();
    let _ = expr.accept(&mut refs);
    refs.vars
}
