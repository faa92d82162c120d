//! Statement construction.

use alloc::{boxed::Box, format, vec::Vec};

use jsl_syntax::syntax::{self, Statement};

use super::AstBuilder;
use crate::{
    ast::{
        CompoundStmt, DoWhileStmt, Expr, ExprStmt, ForStmt, ReturnStmt, SelectStmt, Stmt,
        WhileStmt,
    },
    error::{JslError, JslResult},
    types::Type,
};

impl AstBuilder {
    /// Build the statements of a block in the current frame. Empty
    /// statements are dropped.
    pub(super) fn build_block(&mut self, block: &syntax::CompoundStatement) -> JslResult<CompoundStmt> {
        let mut stmts = Vec::with_capacity(block.statements.len());
        for stmt in &block.statements {
            if matches!(stmt, Statement::Expression(None)) {
                continue;
            }
            stmts.push(self.build_stmt(stmt)?);
        }
        Ok(CompoundStmt { stmts })
    }

    /// Build a statement that forms its own scope (branch or loop body).
    fn build_scoped(&mut self, stmt: &Statement) -> JslResult<Box<Stmt>> {
        self.in_frame(|b| b.build_stmt(stmt)).map(Box::new)
    }

    fn build_condition(&mut self, what: &str, cond: &syntax::Expr) -> JslResult<Expr> {
        let cond = self.build_expr(cond)?;
        if cond.ty() != Type::Bool {
            return Err(JslError::mismatch(
                format!("{} condition", what),
                "bool",
                cond.ty().name(),
            ));
        }
        Ok(cond)
    }

    pub(super) fn build_stmt(&mut self, stmt: &Statement) -> JslResult<Stmt> {
        match stmt {
            Statement::Compound(block) => {
                self.in_frame(|b| b.build_block(block)).map(Stmt::Compound)
            }
            Statement::Declaration(decl) => self.build_declaration(decl).map(Stmt::Decl),
            Statement::Expression(None) => Ok(Stmt::Compound(CompoundStmt::default())),
            Statement::Expression(Some(expr)) => {
                let expr = self.build_expr(expr)?;
                Ok(Stmt::Expr(ExprStmt { expr }))
            }
            Statement::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let cond = self.build_condition("if", cond)?;
                let then_branch = self.build_scoped(then_branch)?;
                let else_branch = match else_branch {
                    Some(e) => Some(self.build_scoped(e)?),
                    None => None,
                };
                Ok(Stmt::Select(SelectStmt {
                    cond,
                    then_branch,
                    else_branch,
                }))
            }
            Statement::While { cond, body } => {
                let cond = self.build_condition("while", cond)?;
                let body = self.in_loop(|b| b.build_scoped(body))?;
                Ok(Stmt::While(WhileStmt { cond, body }))
            }
            Statement::DoWhile { body, cond } => {
                let body = self.in_loop(|b| b.build_scoped(body))?;
                let cond = self.build_condition("do-while", cond)?;
                Ok(Stmt::DoWhile(DoWhileStmt { body, cond }))
            }
            Statement::For {
                init,
                cond,
                update,
                body,
            } => self.in_frame(|b| {
                let init = match init.as_ref() {
                    Statement::Expression(None) => None,
                    other => Some(Box::new(b.build_stmt(other)?)),
                };
                let cond = match cond {
                    Some(c) => Some(b.build_condition("for", c)?),
                    None => None,
                };
                let update = match update {
                    Some(u) => Some(b.build_expr(u)?),
                    None => None,
                };
                let body = b.in_loop(|b| b.build_scoped(body))?;
                Ok(Stmt::For(ForStmt {
                    init,
                    cond,
                    update,
                    body,
                }))
            }),
            Statement::Return(value) => self.build_return(value.as_ref()),
            Statement::Break => {
                if self.loop_depth == 0 {
                    return Err(JslError::misplaced("break"));
                }
                Ok(Stmt::Break)
            }
            Statement::Continue => {
                if self.loop_depth == 0 {
                    return Err(JslError::misplaced("continue"));
                }
                Ok(Stmt::Continue)
            }
            Statement::Discard => {
                if !self.in_entry_point() {
                    return Err(JslError::misplaced("discard"));
                }
                Ok(Stmt::Discard)
            }
        }
    }

    fn build_return(&mut self, value: Option<&syntax::Expr>) -> JslResult<Stmt> {
        let expected = self.function.map(|f| f.return_type).unwrap_or(Type::Void);
        let value = value.map(|v| self.build_expr(v)).transpose()?;
        let found = value.as_ref().map(Expr::ty).unwrap_or(Type::Void);
        if found != expected {
            return Err(JslError::mismatch("return", expected.name(), found.name()));
        }
        Ok(Stmt::Return(ReturnStmt { value }))
    }
}
