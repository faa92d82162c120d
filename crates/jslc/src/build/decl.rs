//! Variable declarations.

use alloc::{format, vec::Vec};

use jsl_syntax::syntax::{self, StorageQualifier};

use super::AstBuilder;
use crate::{
    ast::{BinaryOp, DeclStmt, VarDecl},
    error::{JslError, JslResult},
    symbols::Qualifier,
    types::{self, BaseKind, Type},
};

fn qualifier(q: Option<StorageQualifier>) -> Qualifier {
    match q {
        None => Qualifier::Local,
        Some(StorageQualifier::Const) => Qualifier::Const,
        Some(StorageQualifier::Param) => Qualifier::Param,
    }
}

/// Array lengths must be positive int literals.
fn array_len(name: &str, len: &syntax::Expr) -> JslResult<u32> {
    match len {
        syntax::Expr::IntConst(n) if *n > 0 => Ok(*n as u32),
        other => Err(JslError::mismatch(
            format!("array length of '{}'", name),
            "positive int literal",
            format!("{:?}", other),
        )),
    }
}

impl AstBuilder {
    /// Build a declaration in the current frame.
    pub(super) fn build_declaration(&mut self, decl: &syntax::Declaration) -> JslResult<DeclStmt> {
        let ty = Type::from_type_name(decl.ty);
        let qualifier = qualifier(decl.qualifier);
        let global = self.symbols.at_global_scope();
        let mut vars = Vec::with_capacity(decl.declarators.len());

        for d in &decl.declarators {
            let name = d.name.as_str();
            if ty == Type::Void {
                return Err(JslError::mismatch(
                    format!("declaration of '{}'", name),
                    "non-void type",
                    "void",
                ));
            }
            match qualifier {
                Qualifier::Param if !global => {
                    return Err(JslError::illegal_qualifier(
                        name,
                        "param variables must be declared at global scope",
                    ))
                }
                Qualifier::Param if d.initializer.is_some() => {
                    return Err(JslError::illegal_qualifier(
                        name,
                        "param variables cannot have an initializer",
                    ))
                }
                Qualifier::Const if d.initializer.is_none() => {
                    return Err(JslError::illegal_qualifier(
                        name,
                        "const variables require an initializer",
                    ))
                }
                _ => {}
            }
            if matches!(ty.base(), BaseKind::Sampler | BaseKind::Buffer)
                && qualifier != Qualifier::Param
            {
                return Err(JslError::illegal_qualifier(
                    name,
                    format!("{} variables must be param", ty),
                ));
            }

            let len = d
                .array_len
                .as_ref()
                .map(|len| array_len(name, len))
                .transpose()?;
            if len.is_some() && d.initializer.is_some() {
                return Err(JslError::illegal_qualifier(
                    name,
                    "array variables cannot have an initializer",
                ));
            }

            // The initializer is resolved before the name is bound, so
            // `float x = x;` reads an outer `x`.
            let init = match &d.initializer {
                Some(init) => {
                    let init = self.build_expr(init)?;
                    types::assignment_result(BinaryOp::Assign, ty, init.ty()).map_err(|_| {
                        JslError::mismatch(
                            format!("initializer of '{}'", name),
                            ty.name(),
                            init.ty().name(),
                        )
                    })?;
                    Some(init)
                }
                None => None,
            };

            let var = self.symbols.declare_variable(name, ty, qualifier, len)?;
            vars.push(VarDecl { var, init });
        }

        Ok(DeclStmt { vars, global })
    }
}
