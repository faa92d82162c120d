//! Function definitions.

use alloc::{format, string::String, vec::Vec};

use jsl_syntax::syntax::FunctionDefinition;

use super::{AstBuilder, FunctionContext};
use crate::{
    ast::FuncDef,
    error::{JslError, JslResult},
    symbols::{Parameter, Qualifier, ENTRY_POINT},
    types::Type,
};

fn signature(name: &str, return_type: Type, params: &[Parameter]) -> String {
    let params: Vec<&str> = params.iter().map(|p| p.ty.name()).collect();
    format!("{} {}({})", return_type, name, params.join(", "))
}

impl AstBuilder {
    pub(super) fn build_function(&mut self, def: &FunctionDefinition) -> JslResult<FuncDef> {
        let return_type = Type::from_type_name(def.return_type);
        let mut params = Vec::with_capacity(def.params.len());
        for p in &def.params {
            let ty = Type::from_type_name(p.ty);
            if ty == Type::Void {
                return Err(JslError::mismatch(
                    format!("parameter '{}' of '{}'", p.name, def.name),
                    "non-void type",
                    "void",
                ));
            }
            params.push(Parameter {
                name: p.name.clone(),
                ty,
            });
        }

        let entry_point = def.name == ENTRY_POINT;
        if entry_point && (return_type != Type::Void || !params.is_empty()) {
            return Err(JslError::mismatch(
                "entry point",
                "void main()",
                signature(&def.name, return_type, &params),
            ));
        }

        let func = self
            .symbols
            .declare_function(&def.name, return_type, params.clone())?;

        self.function = Some(FunctionContext {
            return_type,
            entry_point,
        });
        self.loop_depth = 0;
        // Parameters and the top-level body share one frame.
        let result = self.in_frame(|b| {
            let param_vars = params
                .iter()
                .map(|p| b.symbols.declare_variable(&p.name, p.ty, Qualifier::Local, None))
                .collect::<JslResult<Vec<_>>>()?;
            let body = b.build_block(&def.body)?;
            Ok(FuncDef {
                func,
                params: param_vars,
                body,
            })
        });
        self.function = None;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::tests::build;

    #[test]
    fn test_entry_point_signature() {
        assert!(build("void main() { }").is_ok());
        assert!(build("void main(void) { }").is_ok());
        assert!(matches!(
            build("float main() { return 1.0; }"),
            Err(JslError::TypeMismatch { .. })
        ));
        assert!(matches!(
            build("void main(float x) { }"),
            Err(JslError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_duplicate_function() {
        assert_eq!(
            build("void f() { } void f() { } void main() { }").unwrap_err(),
            JslError::duplicate("f")
        );
    }

    #[test]
    fn test_params_share_body_frame() {
        assert_eq!(
            build("float f(float x) { float x = 1.0; return x; } void main() { }").unwrap_err(),
            JslError::duplicate("x")
        );
        assert!(build("float f(float x) { { float x = 1.0; } return x; } void main() { }").is_ok());
    }

    #[test]
    fn test_user_call_checks_argument_types() {
        let src = "float twice(float x) { return x * 2.0; }
                   void main() { float y = twice(1.0); }";
        assert!(build(src).is_ok());
        let src = "float twice(float x) { return x * 2.0; }
                   void main() { float y = twice(1); }";
        assert!(matches!(build(src), Err(JslError::TypeMismatch { .. })));
    }

    #[test]
    fn test_parameters_are_writable() {
        assert!(build("float f(float x) { x += 1.0; return x; } void main() { }").is_ok());
    }
}
