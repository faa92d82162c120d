//! Error types for JSL compilation.

use alloc::string::String;
use core::fmt;

use jsl_syntax::ParseError;

use crate::shader_model::ShaderModel;

/// Result type for JSL compilation operations.
pub type JslResult<T> = Result<T, JslError>;

/// Error that can occur while compiling a JSL unit.
///
/// Every error aborts the unit. `UnresolvedEmissionMapping` is the only
/// internal error; everything else is caused by the source program.
#[derive(Debug, Clone, PartialEq)]
pub enum JslError {
    /// Syntax error reported by the parser
    Syntax(ParseError),
    /// Name declared twice in the same frame
    DuplicateDeclaration { name: String },
    /// Name not found in any frame (or builtin catalog)
    UndefinedSymbol { name: String },
    /// Assignment to a const or read-only core variable
    ReadOnlyAssignment { name: String },
    /// Operator, operand, arity or swizzle violation
    TypeMismatch {
        context: String,
        expected: String,
        found: String,
    },
    /// Qualifier used where it is not allowed
    IllegalQualifier { name: String, reason: String },
    /// `break`, `continue` or `discard` outside its allowed context
    MisplacedStatement { statement: &'static str },
    /// Builtin used below its minimum shader model
    UnsupportedBuiltin {
        name: String,
        required: ShaderModel,
        available: ShaderModel,
    },
    /// Valid program that the active target cannot express
    UnsupportedConstruct { target: &'static str, reason: String },
    /// Type or qualifier missing from a backend table (backend defect)
    UnresolvedEmissionMapping { target: &'static str, item: String },
}

impl JslError {
    pub fn duplicate(name: impl Into<String>) -> Self {
        JslError::DuplicateDeclaration { name: name.into() }
    }

    pub fn undefined(name: impl Into<String>) -> Self {
        JslError::UndefinedSymbol { name: name.into() }
    }

    pub fn read_only(name: impl Into<String>) -> Self {
        JslError::ReadOnlyAssignment { name: name.into() }
    }

    /// Create a type mismatch error.
    pub fn mismatch(
        context: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        JslError::TypeMismatch {
            context: context.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn illegal_qualifier(name: impl Into<String>, reason: impl Into<String>) -> Self {
        JslError::IllegalQualifier {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn misplaced(statement: &'static str) -> Self {
        JslError::MisplacedStatement { statement }
    }

    pub fn unsupported_builtin(
        name: impl Into<String>,
        required: ShaderModel,
        available: ShaderModel,
    ) -> Self {
        JslError::UnsupportedBuiltin {
            name: name.into(),
            required,
            available,
        }
    }

    pub fn unsupported(target: &'static str, reason: impl Into<String>) -> Self {
        JslError::UnsupportedConstruct {
            target,
            reason: reason.into(),
        }
    }

    pub fn unresolved(target: &'static str, item: impl Into<String>) -> Self {
        JslError::UnresolvedEmissionMapping {
            target,
            item: item.into(),
        }
    }

    /// Backend configuration defects, never caused by user input.
    pub fn is_internal(&self) -> bool {
        matches!(self, JslError::UnresolvedEmissionMapping { .. })
    }

    /// Errors caused by the program being compiled.
    pub fn is_user_error(&self) -> bool {
        !self.is_internal()
    }

    /// Short stable name of the error kind, used by test tooling.
    pub fn kind(&self) -> &'static str {
        match self {
            JslError::Syntax(_) => "Syntax",
            JslError::DuplicateDeclaration { .. } => "DuplicateDeclaration",
            JslError::UndefinedSymbol { .. } => "UndefinedSymbol",
            JslError::ReadOnlyAssignment { .. } => "ReadOnlyAssignment",
            JslError::TypeMismatch { .. } => "TypeMismatch",
            JslError::IllegalQualifier { .. } => "IllegalQualifier",
            JslError::MisplacedStatement { .. } => "MisplacedStatement",
            JslError::UnsupportedBuiltin { .. } => "UnsupportedBuiltin",
            JslError::UnsupportedConstruct { .. } => "UnsupportedConstruct",
            JslError::UnresolvedEmissionMapping { .. } => "UnresolvedEmissionMapping",
        }
    }
}

impl From<ParseError> for JslError {
    fn from(e: ParseError) -> Self {
        JslError::Syntax(e)
    }
}

impl fmt::Display for JslError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JslError::Syntax(e) => write!(f, "{}", e),
            JslError::DuplicateDeclaration { name } => {
                write!(f, "'{}' is already declared in this scope", name)
            }
            JslError::UndefinedSymbol { name } => write!(f, "undefined symbol '{}'", name),
            JslError::ReadOnlyAssignment { name } => {
                write!(f, "cannot assign to read-only variable '{}'", name)
            }
            JslError::TypeMismatch {
                context,
                expected,
                found,
            } => write!(
                f,
                "type mismatch in {}: expected {}, found {}",
                context, expected, found
            ),
            JslError::IllegalQualifier { name, reason } => {
                write!(f, "illegal qualifier on '{}': {}", name, reason)
            }
            JslError::MisplacedStatement { statement } => {
                write!(f, "'{}' is not allowed here", statement)
            }
            JslError::UnsupportedBuiltin {
                name,
                required,
                available,
            } => write!(
                f,
                "builtin '{}' requires shader model {} (target is {})",
                name, required, available
            ),
            JslError::UnsupportedConstruct { target, reason } => {
                write!(f, "{} backend: {}", target, reason)
            }
            JslError::UnresolvedEmissionMapping { target, item } => write!(
                f,
                "internal error: {} backend has no mapping for {}",
                target, item
            ),
        }
    }
}

impl core::error::Error for JslError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            JslError::Syntax(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::{format, string::ToString};

    use super::*;

    #[test]
    fn test_classification() {
        assert!(JslError::unresolved("hlsl", "type float5").is_internal());
        assert!(JslError::undefined("x").is_user_error());
        assert!(
            JslError::unsupported_builtin("fma", ShaderModel::Sm5_0, ShaderModel::Sm3)
                .is_user_error()
        );
    }

    #[test]
    fn test_display_carries_context() {
        let e = JslError::unsupported_builtin("fma", ShaderModel::Sm5_0, ShaderModel::Sm3);
        let msg = format!("{}", e);
        assert!(msg.contains("fma"));
        assert!(msg.contains("sm5_0"));
        assert!(msg.contains("sm3"));

        let e = JslError::mismatch("binary '+'", "float", "int");
        assert_eq!(
            e.to_string(),
            "type mismatch in binary '+': expected float, found int"
        );
    }

    #[test]
    fn test_syntax_error_is_distinguishable() {
        let e: JslError = ParseError {
            message: "boom".to_string(),
            position: 3,
        }
        .into();
        assert_eq!(e.kind(), "Syntax");
        assert!(matches!(e, JslError::Syntax(_)));
    }
}
