//! Expression construction and typing.

use alloc::{
    boxed::Box,
    format,
    string::{String, ToString},
    vec::Vec,
};

use jsl_syntax::syntax::{self, AssignmentOp};

use super::AstBuilder;
use crate::{
    ast::{
        ArrayAccessExpr, BinaryExpr, BinaryOp, CallExpr, Callee, Expr, FieldSelectExpr, Literal,
        LiteralExpr, ParenExpr, UnaryExpr, UnaryOp, VariableExpr, VectorCtorExpr,
    },
    builtins::Builtin,
    error::{JslError, JslResult},
    symbols::Symbol,
    types::{self, BaseKind, Type},
};

fn binary_op(op: syntax::BinaryOp) -> BinaryOp {
    match op {
        syntax::BinaryOp::Or => BinaryOp::Or,
        syntax::BinaryOp::Xor => BinaryOp::Xor,
        syntax::BinaryOp::And => BinaryOp::And,
        syntax::BinaryOp::Equal => BinaryOp::Eq,
        syntax::BinaryOp::NonEqual => BinaryOp::Ne,
        syntax::BinaryOp::Lt => BinaryOp::Lt,
        syntax::BinaryOp::Gt => BinaryOp::Gt,
        syntax::BinaryOp::Lte => BinaryOp::Le,
        syntax::BinaryOp::Gte => BinaryOp::Ge,
        syntax::BinaryOp::Add => BinaryOp::Add,
        syntax::BinaryOp::Sub => BinaryOp::Sub,
        syntax::BinaryOp::Mult => BinaryOp::Mul,
        syntax::BinaryOp::Div => BinaryOp::Div,
    }
}

fn assignment_op(op: AssignmentOp) -> BinaryOp {
    match op {
        AssignmentOp::Equal => BinaryOp::Assign,
        AssignmentOp::Add => BinaryOp::AddAssign,
        AssignmentOp::Sub => BinaryOp::SubAssign,
        AssignmentOp::Mult => BinaryOp::MulAssign,
        AssignmentOp::Div => BinaryOp::DivAssign,
    }
}

fn unary_op(op: syntax::UnaryOp) -> UnaryOp {
    match op {
        syntax::UnaryOp::Plus => UnaryOp::Plus,
        syntax::UnaryOp::Minus => UnaryOp::Minus,
        syntax::UnaryOp::Not => UnaryOp::Not,
        syntax::UnaryOp::Inc => UnaryOp::PreInc,
        syntax::UnaryOp::Dec => UnaryOp::PreDec,
    }
}

/// `(float3, int)` for error messages.
fn type_list(types: &[Type]) -> String {
    let names: Vec<&str> = types.iter().map(|t| t.name()).collect();
    format!("({})", names.join(", "))
}

impl AstBuilder {
    /// Build and type an expression.
    pub(super) fn build_expr(&mut self, expr: &syntax::Expr) -> JslResult<Expr> {
        match expr {
            syntax::Expr::IntConst(v) => Ok(literal(Literal::Int(*v), Type::Int)),
            syntax::Expr::FloatConst(v) => Ok(literal(Literal::Float(*v), Type::Float)),
            syntax::Expr::BoolConst(v) => Ok(literal(Literal::Bool(*v), Type::Bool)),
            syntax::Expr::Variable(name) => {
                let var = self.symbols.lookup_variable(name)?;
                let info = self.symbols.variable(var);
                if info.is_array() {
                    return Err(JslError::mismatch(
                        format!("reference to '{}'", name),
                        "indexed array element",
                        format!("{}[{}]", info.ty, info.array_len.unwrap_or(0)),
                    ));
                }
                Ok(Expr::Variable(VariableExpr { var, ty: info.ty }))
            }
            syntax::Expr::Unary(op, operand) => self.build_unary(unary_op(*op), operand),
            syntax::Expr::PostInc(operand) => self.build_unary(UnaryOp::PostInc, operand),
            syntax::Expr::PostDec(operand) => self.build_unary(UnaryOp::PostDec, operand),
            syntax::Expr::Binary(op, lhs, rhs) => {
                let op = binary_op(*op);
                let lhs = self.build_expr(lhs)?;
                let rhs = self.build_expr(rhs)?;
                let ty = types::binary_result(op, lhs.ty(), rhs.ty())?;
                Ok(binary(op, lhs, rhs, ty))
            }
            syntax::Expr::Assignment(op, lhs, rhs) => {
                let op = assignment_op(*op);
                let lhs = self.build_expr(lhs)?;
                self.check_lvalue(&lhs)?;
                let rhs = self.build_expr(rhs)?;
                let ty = types::assignment_result(op, lhs.ty(), rhs.ty())?;
                Ok(binary(op, lhs, rhs, ty))
            }
            syntax::Expr::Paren(inner) => {
                let inner = self.build_expr(inner)?;
                let ty = inner.ty();
                Ok(Expr::Paren(ParenExpr {
                    inner: Box::new(inner),
                    ty,
                }))
            }
            syntax::Expr::Dot(base, fields) => {
                let base = self.build_expr(base)?;
                let (components, ty) = types::swizzle(base.ty(), fields)?;
                Ok(Expr::FieldSelect(FieldSelectExpr {
                    base: Box::new(base),
                    fields: fields.clone(),
                    components,
                    ty,
                }))
            }
            syntax::Expr::Bracket(base, index) => self.build_array_access(base, index),
            syntax::Expr::FunCall(name, args) => self.build_call(name, args),
            syntax::Expr::Constructor(name, args) => {
                self.build_vector_ctor(Type::from_type_name(*name), args)
            }
        }
    }

    fn build_unary(&mut self, op: UnaryOp, operand: &syntax::Expr) -> JslResult<Expr> {
        let operand = self.build_expr(operand)?;
        if op.writes_operand() {
            self.check_lvalue(&operand)?;
        }
        let ty = types::unary_result(op, operand.ty())?;
        Ok(Expr::Unary(UnaryExpr {
            op,
            operand: Box::new(operand),
            ty,
        }))
    }

    /// Fail unless `expr` names something that may be written here.
    fn check_lvalue(&self, expr: &Expr) -> JslResult<()> {
        match expr {
            Expr::Variable(e) => self.symbols.check_assignable(e.var, self.in_entry_point()),
            Expr::ArrayAccess(e) => self.symbols.check_assignable(e.array, self.in_entry_point()),
            Expr::Paren(e) => self.check_lvalue(&e.inner),
            Expr::FieldSelect(e) => {
                if !e.is_distinct() {
                    return Err(JslError::mismatch(
                        "assignment target",
                        "swizzle without repeated components",
                        format!(".{}", e.fields),
                    ));
                }
                self.check_lvalue(&e.base)
            }
            _ => Err(JslError::mismatch(
                "assignment target",
                "variable, array element or swizzle",
                "expression",
            )),
        }
    }

    fn build_array_access(
        &mut self,
        base: &syntax::Expr,
        index: &syntax::Expr,
    ) -> JslResult<Expr> {
        let name = match base {
            syntax::Expr::Variable(name) => name,
            _ => {
                return Err(JslError::mismatch(
                    "array access",
                    "array variable",
                    "expression",
                ))
            }
        };
        let array = self.symbols.lookup_variable(name)?;
        let info = self.symbols.variable(array);
        if !info.is_array() {
            return Err(JslError::mismatch(
                format!("indexing '{}'", name),
                "array variable",
                info.ty.name(),
            ));
        }
        let ty = info.ty;
        let index = self.build_expr(index)?;
        if index.ty() != Type::Int {
            return Err(JslError::mismatch(
                format!("index into '{}'", name),
                "int",
                index.ty().name(),
            ));
        }
        Ok(Expr::ArrayAccess(ArrayAccessExpr {
            array,
            index: Box::new(index),
            ty,
        }))
    }

    fn build_vector_ctor(&mut self, ty: Type, args: &[syntax::Expr]) -> JslResult<Expr> {
        let context = || format!("constructor {}", ty);
        if !matches!(ty.base(), BaseKind::Float | BaseKind::Int | BaseKind::Bool) {
            return Err(JslError::mismatch(context(), "scalar or vector type", ty.name()));
        }
        let args = args
            .iter()
            .map(|a| self.build_expr(a))
            .collect::<JslResult<Vec<_>>>()?;
        let arg_types: Vec<Type> = args.iter().map(Expr::ty).collect();
        let arity = ty.arity() as usize;

        let ok = if args.len() == 1 {
            let a = arg_types[0];
            a.base() == ty.base() && (a.is_scalar() || a.arity() == ty.arity())
        } else if args.len() == arity {
            arg_types.iter().all(|a| a.base() == ty.base() && a.is_scalar())
        } else {
            return Err(JslError::mismatch(
                context(),
                format!("1 or {} arguments", arity),
                format!("{} arguments", args.len()),
            ));
        };
        if !ok {
            return Err(JslError::mismatch(
                context(),
                format!("{} components", ty.base()),
                type_list(&arg_types),
            ));
        }
        Ok(Expr::VectorCtor(VectorCtorExpr { ty, args }))
    }

    fn build_call(&mut self, name: &str, args: &[syntax::Expr]) -> JslResult<Expr> {
        let args = args
            .iter()
            .map(|a| self.build_expr(a))
            .collect::<JslResult<Vec<_>>>()?;
        let arg_types: Vec<Type> = args.iter().map(Expr::ty).collect();
        let context = || format!("call to '{}'", name);

        let (callee, ty) = if let Some(Symbol::Function(id)) = self.symbols.lookup(name) {
            let func = self.symbols.function(id);
            let params: Vec<Type> = func.params.iter().map(|p| p.ty).collect();
            if params != arg_types {
                return Err(JslError::mismatch(
                    context(),
                    type_list(&params),
                    type_list(&arg_types),
                ));
            }
            (Callee::User(id), func.return_type)
        } else if let Some(builtin) = Builtin::from_name(name) {
            let ty = builtin.resolve(&arg_types).ok_or_else(|| {
                JslError::mismatch(context(), "a matching overload", type_list(&arg_types))
            })?;
            (Callee::Builtin(builtin), ty)
        } else {
            return Err(JslError::undefined(name.to_string()));
        };

        Ok(Expr::Call(CallExpr {
            callee,
            args,
            ty,
            site: self.next_call_site(),
        }))
    }
}

fn literal(value: Literal, ty: Type) -> Expr {
    Expr::Literal(LiteralExpr { value, ty })
}

fn binary(op: BinaryOp, lhs: Expr, rhs: Expr, ty: Type) -> Expr {
    Expr::Binary(BinaryExpr {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
        ty,
    })
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;
    use crate::build::tests::build;

    fn main_with(body: &str) -> JslResult<crate::ast::Program> {
        build(&format!("void main() {{ {} }}", body))
    }

    fn kind(result: JslResult<crate::ast::Program>) -> &'static str {
        match result {
            Ok(_) => "Ok",
            Err(e) => e.kind(),
        }
    }

    #[test]
    fn test_vector_constructor_arity() {
        assert_eq!(kind(main_with("float3 v = float3(1.0, 2.0, 3.0);")), "Ok");
        assert_eq!(kind(main_with("float3 v = float3(1.0);")), "Ok");
        assert_eq!(kind(main_with("float3 a = float3(1.0); float3 v = float3(a);")), "Ok");
        assert_eq!(
            kind(main_with("float3 v = float3(1.0, 2.0);")),
            "TypeMismatch"
        );
        assert_eq!(
            kind(main_with("float2 a = float2(1.0); float3 v = float3(a);")),
            "TypeMismatch"
        );
        assert_eq!(kind(main_with("float2 v = float2(1, 2);")), "TypeMismatch");
    }

    #[test]
    fn test_mixed_base_rejected() {
        assert_eq!(kind(main_with("float x = 1.0 + 2;")), "TypeMismatch");
        assert_eq!(kind(main_with("int i = 1.0;")), "TypeMismatch");
    }

    #[test]
    fn test_scalar_broadcast() {
        assert_eq!(
            kind(main_with("float4 c = jsl_vertexColor * 0.5; color = c;")),
            "Ok"
        );
    }

    #[test]
    fn test_swizzle_rules() {
        assert_eq!(kind(main_with("float2 p = pos0.yx;")), "Ok");
        assert_eq!(kind(main_with("float p = pos0.z;")), "TypeMismatch");
        assert_eq!(kind(main_with("color.rr = pos0;")), "TypeMismatch");
        assert_eq!(kind(main_with("color.ba = pos0;")), "Ok");
    }

    #[test]
    fn test_const_assignment_rejected() {
        let err = main_with("const float k = 1.0; k = 2.0;").unwrap_err();
        assert_eq!(err, JslError::read_only("k"));

        let err = main_with("const float3 k = float3(1.0); k.x = 2.0;").unwrap_err();
        assert_eq!(err, JslError::read_only("k"));

        let err = main_with("const float k = 1.0; k++;").unwrap_err();
        assert_eq!(err, JslError::read_only("k"));
    }

    #[test]
    fn test_core_variable_assignment() {
        assert_eq!(kind(main_with("color = jsl_vertexColor;")), "Ok");
        assert_eq!(
            main_with("pos0 = float2(0.0);").unwrap_err(),
            JslError::read_only("pos0")
        );
        assert_eq!(
            build("void paint() { color = float4(1.0); } void main() { }").unwrap_err(),
            JslError::read_only("color")
        );
    }

    #[test]
    fn test_array_access() {
        let src = "param float4 w[3]; void main() { color = w[1]; }";
        assert!(build(src).is_ok());
        let src = "param float4 w[3]; void main() { color = w[1.0]; }";
        assert_eq!(kind(build(src)), "TypeMismatch");
        let src = "param float4 w[3]; void main() { color = w; }";
        assert_eq!(kind(build(src)), "TypeMismatch");
        assert_eq!(kind(main_with("float x = pos0[0];")), "TypeMismatch");
    }

    #[test]
    fn test_builtin_resolution() {
        assert_eq!(kind(main_with("float d = dot(pos0, pos1);")), "Ok");
        assert_eq!(kind(main_with("float d = dot(pos0, 1.0);")), "TypeMismatch");
        assert_eq!(
            main_with("float d = frobnicate(1.0);").unwrap_err(),
            JslError::undefined("frobnicate")
        );
    }

    #[test]
    fn test_user_function_shadows_builtin() {
        let src = "float dot(float a) { return a; } void main() { float d = dot(1.0); }";
        assert!(build(src).is_ok());
    }

    #[test]
    fn test_call_sites_are_unique() {
        let program = main_with("float a = abs(1.0); float b = abs(abs(2.0));").unwrap();
        let mut sites = alloc::vec::Vec::new();
        collect_sites(&program, &mut sites);
        sites.sort();
        sites.dedup();
        assert_eq!(sites.len(), 3);
    }

    fn collect_sites(program: &crate::ast::Program, out: &mut Vec<u32>) {
        fn expr(e: &Expr, out: &mut Vec<u32>) {
            match e {
                Expr::Call(c) => {
                    out.push(c.site);
                    c.args.iter().for_each(|a| expr(a, out));
                }
                _ => {}
            }
        }
        let main = program.entry_point().unwrap();
        for s in &main.body.stmts {
            if let crate::ast::Stmt::Decl(d) = s {
                for v in &d.vars {
                    if let Some(init) = &v.init {
                        expr(init, out);
                    }
                }
            }
        }
    }

    #[test]
    fn test_error_message_lists_argument_types() {
        let err = main_with("float3 c = cross(pos0, pos1);").unwrap_err();
        assert!(err.to_string().contains("(float2, float2)"), "{}", err);
    }
}
