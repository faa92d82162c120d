//! Double-dispatch traversal of the typed AST.
//!
//! [`Visitor`] has one required method per node kind and no default bodies:
//! adding a node kind breaks every visitor until it handles the new kind.
//! Each node's `accept` dispatches with an exhaustive `match`.

use super::{
    ArrayAccessExpr, BinaryExpr, CallExpr, CompoundStmt, DeclStmt, DoWhileStmt, Expr, ExprStmt,
    ExtDecl, FieldSelectExpr, ForStmt, FuncDef, GlueBlock, LiteralExpr, ParenExpr, ProgramUnit,
    ReturnStmt, SelectStmt, Stmt, UnaryExpr, VariableExpr, VectorCtorExpr, WhileStmt,
};

/// AST visitor.
pub trait Visitor {
    type Error;

    fn visit_literal(&mut self, e: &LiteralExpr) -> Result<(), Self::Error>;
    fn visit_variable(&mut self, e: &VariableExpr) -> Result<(), Self::Error>;
    fn visit_unary(&mut self, e: &UnaryExpr) -> Result<(), Self::Error>;
    fn visit_binary(&mut self, e: &BinaryExpr) -> Result<(), Self::Error>;
    fn visit_vector_ctor(&mut self, e: &VectorCtorExpr) -> Result<(), Self::Error>;
    fn visit_paren(&mut self, e: &ParenExpr) -> Result<(), Self::Error>;
    fn visit_field_select(&mut self, e: &FieldSelectExpr) -> Result<(), Self::Error>;
    fn visit_array_access(&mut self, e: &ArrayAccessExpr) -> Result<(), Self::Error>;
    fn visit_call(&mut self, e: &CallExpr) -> Result<(), Self::Error>;

    fn visit_expr_stmt(&mut self, s: &ExprStmt) -> Result<(), Self::Error>;
    fn visit_decl_stmt(&mut self, s: &DeclStmt) -> Result<(), Self::Error>;
    fn visit_compound(&mut self, s: &CompoundStmt) -> Result<(), Self::Error>;
    fn visit_select(&mut self, s: &SelectStmt) -> Result<(), Self::Error>;
    fn visit_while(&mut self, s: &WhileStmt) -> Result<(), Self::Error>;
    fn visit_do_while(&mut self, s: &DoWhileStmt) -> Result<(), Self::Error>;
    fn visit_for(&mut self, s: &ForStmt) -> Result<(), Self::Error>;
    fn visit_return(&mut self, s: &ReturnStmt) -> Result<(), Self::Error>;
    fn visit_break(&mut self) -> Result<(), Self::Error>;
    fn visit_continue(&mut self) -> Result<(), Self::Error>;
    fn visit_discard(&mut self) -> Result<(), Self::Error>;

    fn visit_func_def(&mut self, f: &FuncDef) -> Result<(), Self::Error>;
    fn visit_glue(&mut self, g: &GlueBlock) -> Result<(), Self::Error>;
}

impl Expr {
    pub fn accept<V: Visitor + ?Sized>(&self, v: &mut V) -> Result<(), V::Error> {
        match self {
            Expr::Literal(e) => v.visit_literal(e),
            Expr::Variable(e) => v.visit_variable(e),
            Expr::Unary(e) => v.visit_unary(e),
            Expr::Binary(e) => v.visit_binary(e),
            Expr::VectorCtor(e) => v.visit_vector_ctor(e),
            Expr::Paren(e) => v.visit_paren(e),
            Expr::FieldSelect(e) => v.visit_field_select(e),
            Expr::ArrayAccess(e) => v.visit_array_access(e),
            Expr::Call(e) => v.visit_call(e),
        }
    }
}

impl Stmt {
    pub fn accept<V: Visitor + ?Sized>(&self, v: &mut V) -> Result<(), V::Error> {
        match self {
            Stmt::Expr(s) => v.visit_expr_stmt(s),
            Stmt::Decl(s) => v.visit_decl_stmt(s),
            Stmt::Compound(s) => v.visit_compound(s),
            Stmt::Select(s) => v.visit_select(s),
            Stmt::While(s) => v.visit_while(s),
            Stmt::DoWhile(s) => v.visit_do_while(s),
            Stmt::For(s) => v.visit_for(s),
            Stmt::Return(s) => v.visit_return(s),
            Stmt::Break => v.visit_break(),
            Stmt::Continue => v.visit_continue(),
            Stmt::Discard => v.visit_discard(),
        }
    }
}

impl ExtDecl {
    pub fn accept<V: Visitor + ?Sized>(&self, v: &mut V) -> Result<(), V::Error> {
        match self {
            ExtDecl::Func(f) => v.visit_func_def(f),
            ExtDecl::Var(d) => v.visit_decl_stmt(d),
            ExtDecl::Glue(g) => v.visit_glue(g),
        }
    }
}

impl ProgramUnit {
    /// Visit every top-level item in source order.
    pub fn accept<V: Visitor + ?Sized>(&self, v: &mut V) -> Result<(), V::Error> {
        for decl in &self.decls {
            decl.accept(v)?;
        }
        Ok(())
    }
}

/// Canonical pre-order child traversal.
///
/// A visitor that only collects information calls `walk_*` from its own
/// `visit_*` methods to reach the children of a node left to right.
pub mod walk {
    use super::*;

    pub fn walk_expr<V: Visitor + ?Sized>(v: &mut V, e: &Expr) -> Result<(), V::Error> {
        match e {
            Expr::Literal(_) | Expr::Variable(_) => Ok(()),
            Expr::Unary(e) => e.operand.accept(v),
            Expr::Binary(e) => {
                e.lhs.accept(v)?;
                e.rhs.accept(v)
            }
            Expr::VectorCtor(e) => e.args.iter().try_for_each(|a| a.accept(v)),
            Expr::Paren(e) => e.inner.accept(v),
            Expr::FieldSelect(e) => e.base.accept(v),
            Expr::ArrayAccess(e) => e.index.accept(v),
            Expr::Call(e) => e.args.iter().try_for_each(|a| a.accept(v)),
        }
    }

    pub fn walk_stmt<V: Visitor + ?Sized>(v: &mut V, s: &Stmt) -> Result<(), V::Error> {
        match s {
            Stmt::Expr(s) => s.expr.accept(v),
            Stmt::Decl(s) => walk_decl(v, s),
            Stmt::Compound(s) => walk_compound(v, s),
            Stmt::Select(s) => {
                s.cond.accept(v)?;
                s.then_branch.accept(v)?;
                match &s.else_branch {
                    Some(e) => e.accept(v),
                    None => Ok(()),
                }
            }
            Stmt::While(s) => {
                s.cond.accept(v)?;
                s.body.accept(v)
            }
            Stmt::DoWhile(s) => {
                s.body.accept(v)?;
                s.cond.accept(v)
            }
            Stmt::For(s) => {
                if let Some(init) = &s.init {
                    init.accept(v)?;
                }
                if let Some(cond) = &s.cond {
                    cond.accept(v)?;
                }
                if let Some(update) = &s.update {
                    update.accept(v)?;
                }
                s.body.accept(v)
            }
            Stmt::Return(s) => match &s.value {
                Some(e) => e.accept(v),
                None => Ok(()),
            },
            Stmt::Break | Stmt::Continue | Stmt::Discard => Ok(()),
        }
    }

    pub fn walk_decl<V: Visitor + ?Sized>(v: &mut V, d: &DeclStmt) -> Result<(), V::Error> {
        d.vars
            .iter()
            .filter_map(|var| var.init.as_ref())
            .try_for_each(|init| init.accept(v))
    }

    pub fn walk_compound<V: Visitor + ?Sized>(
        v: &mut V,
        s: &CompoundStmt,
    ) -> Result<(), V::Error> {
        s.stmts.iter().try_for_each(|stmt| stmt.accept(v))
    }

    pub fn walk_func_def<V: Visitor + ?Sized>(v: &mut V, f: &FuncDef) -> Result<(), V::Error> {
        walk_compound(v, &f.body)
    }
}
