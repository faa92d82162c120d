//! Untyped parse tree for JSL programs.
//!
//! Nothing here is resolved: identifiers are plain strings and no node
//! carries a type. The `jslc` crate consumes this tree.

use alloc::{boxed::Box, string::String, vec::Vec};
use core::fmt;

/// A type keyword as written in source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeName {
    Void,
    Float,
    Float2,
    Float3,
    Float4,
    Int,
    Int2,
    Int3,
    Int4,
    Bool,
    Bool2,
    Bool3,
    Bool4,
    Sampler,
    LSampler,
    FSampler,
    CBuffer,
    TBuffer,
}

impl TypeName {
    /// All type keywords, longest spellings first within each family so that
    /// prefix matching never stops early.
    pub const ALL: [TypeName; 18] = [
        TypeName::Void,
        TypeName::Float2,
        TypeName::Float3,
        TypeName::Float4,
        TypeName::Float,
        TypeName::Int2,
        TypeName::Int3,
        TypeName::Int4,
        TypeName::Int,
        TypeName::Bool2,
        TypeName::Bool3,
        TypeName::Bool4,
        TypeName::Bool,
        TypeName::Sampler,
        TypeName::LSampler,
        TypeName::FSampler,
        TypeName::CBuffer,
        TypeName::TBuffer,
    ];

    /// The keyword spelling.
    pub fn keyword(self) -> &'static str {
        match self {
            TypeName::Void => "void",
            TypeName::Float => "float",
            TypeName::Float2 => "float2",
            TypeName::Float3 => "float3",
            TypeName::Float4 => "float4",
            TypeName::Int => "int",
            TypeName::Int2 => "int2",
            TypeName::Int3 => "int3",
            TypeName::Int4 => "int4",
            TypeName::Bool => "bool",
            TypeName::Bool2 => "bool2",
            TypeName::Bool3 => "bool3",
            TypeName::Bool4 => "bool4",
            TypeName::Sampler => "sampler",
            TypeName::LSampler => "lsampler",
            TypeName::FSampler => "fsampler",
            TypeName::CBuffer => "cbuffer",
            TypeName::TBuffer => "tbuffer",
        }
    }

    /// Look up a type keyword.
    pub fn from_keyword(word: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.keyword() == word)
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Storage qualifier on a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageQualifier {
    Const,
    Param,
}

/// Prefix unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
    Inc,
    Dec,
}

/// Binary (non-assignment) operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Or,
    Xor,
    And,
    Equal,
    NonEqual,
    Lt,
    Gt,
    Lte,
    Gte,
    Add,
    Sub,
    Mult,
    Div,
}

/// Assignment operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignmentOp {
    Equal,
    Add,
    Sub,
    Mult,
    Div,
}

/// Expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    IntConst(i32),
    FloatConst(f32),
    BoolConst(bool),
    Variable(String),
    Unary(UnaryOp, Box<Expr>),
    PostInc(Box<Expr>),
    PostDec(Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Assignment(AssignmentOp, Box<Expr>, Box<Expr>),
    Paren(Box<Expr>),
    /// Field selection (`v.xyz`)
    Dot(Box<Expr>, String),
    /// Array indexing (`a[i]`)
    Bracket(Box<Expr>, Box<Expr>),
    FunCall(String, Vec<Expr>),
    /// Type constructor call (`float3(...)`)
    Constructor(TypeName, Vec<Expr>),
}

/// One declared name in a declaration list.
#[derive(Debug, Clone, PartialEq)]
pub struct Declarator {
    pub name: String,
    /// Array length expression, if the name was declared with `[...]`
    pub array_len: Option<Expr>,
    pub initializer: Option<Expr>,
}

/// Variable declaration (`const float3 a = ..., b = ...;`).
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub qualifier: Option<StorageQualifier>,
    pub ty: TypeName,
    pub declarators: Vec<Declarator>,
}

/// Block of statements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompoundStatement {
    pub statements: Vec<Statement>,
}

/// Statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Compound(CompoundStatement),
    Declaration(Declaration),
    /// Expression statement; `None` for an empty `;`
    Expression(Option<Expr>),
    If {
        cond: Expr,
        then_branch: Box<Statement>,
        else_branch: Option<Box<Statement>>,
    },
    While {
        cond: Expr,
        body: Box<Statement>,
    },
    DoWhile {
        body: Box<Statement>,
        cond: Expr,
    },
    For {
        /// Either a declaration or an expression statement
        init: Box<Statement>,
        cond: Option<Expr>,
        update: Option<Expr>,
        body: Box<Statement>,
    },
    Return(Option<Expr>),
    Break,
    Continue,
    Discard,
}

/// Function parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDeclaration {
    pub ty: TypeName,
    pub name: String,
}

/// Function definition.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDefinition {
    pub return_type: TypeName,
    pub name: String,
    pub params: Vec<ParamDeclaration>,
    pub body: CompoundStatement,
}

/// Top-level item.
#[derive(Debug, Clone, PartialEq)]
pub enum ExternalDeclaration {
    Function(FunctionDefinition),
    Declaration(Declaration),
    /// Raw text between `{%` and `%}`, passed through to software targets
    Glue(String),
}

/// A whole source file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TranslationUnit {
    pub decls: Vec<ExternalDeclaration>,
}

impl TranslationUnit {
    /// Iterate over the function definitions in source order.
    pub fn functions(&self) -> impl Iterator<Item = &FunctionDefinition> {
        self.decls.iter().filter_map(|d| match d {
            ExternalDeclaration::Function(f) => Some(f),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_keyword_roundtrip() {
        for ty in TypeName::ALL {
            assert_eq!(TypeName::from_keyword(ty.keyword()), Some(ty));
        }
        assert_eq!(TypeName::from_keyword("float5"), None);
    }
}
