//! Typed AST.
//!
//! Every expression node carries its resolved [`Type`]. Variables and
//! functions are referenced by handle into the [`SymbolTable`] owned by the
//! [`Program`]. Nodes are built once by the AST builder and never mutated.

pub mod visitor;

use alloc::{boxed::Box, string::String, vec::Vec};
use core::fmt;

use crate::{
    builtins::Builtin,
    symbols::{FuncId, SymbolTable, VarId},
    types::Type,
};

/// Unary operators. Prefix and postfix increments are distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::Not => "!",
            UnaryOp::PreInc | UnaryOp::PostInc => "++",
            UnaryOp::PreDec | UnaryOp::PostDec => "--",
        }
    }

    pub fn is_postfix(self) -> bool {
        matches!(self, UnaryOp::PostInc | UnaryOp::PostDec)
    }

    /// Increments and decrements write their operand.
    pub fn writes_operand(self) -> bool {
        matches!(
            self,
            UnaryOp::PreInc | UnaryOp::PreDec | UnaryOp::PostInc | UnaryOp::PostDec
        )
    }
}

/// Operator family, used for typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpClass {
    Arithmetic,
    Relational,
    Equality,
    Logical,
    Assignment,
}

/// Binary operators, including the assignment forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Or,
    Xor,
    And,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
}

impl BinaryOp {
    /// Source spelling.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Or => "||",
            BinaryOp::Xor => "^^",
            BinaryOp::And => "&&",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Assign => "=",
            BinaryOp::AddAssign => "+=",
            BinaryOp::SubAssign => "-=",
            BinaryOp::MulAssign => "*=",
            BinaryOp::DivAssign => "/=",
        }
    }

    pub fn class(self) -> OpClass {
        match self {
            BinaryOp::Or | BinaryOp::Xor | BinaryOp::And => OpClass::Logical,
            BinaryOp::Eq | BinaryOp::Ne => OpClass::Equality,
            BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge => OpClass::Relational,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => OpClass::Arithmetic,
            _ => OpClass::Assignment,
        }
    }

    pub fn is_assignment(self) -> bool {
        self.class() == OpClass::Assignment
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Literal value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Literal {
    Int(i32),
    Float(f32),
    Bool(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralExpr {
    pub value: Literal,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableExpr {
    pub var: VarId,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub operand: Box<Expr>,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub op: BinaryOp,
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
    pub ty: Type,
}

/// `float3(a, b, c)` or `float3(x)`.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorCtorExpr {
    pub ty: Type,
    pub args: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParenExpr {
    pub inner: Box<Expr>,
    pub ty: Type,
}

/// Swizzle: selects components of `base` by letter.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSelectExpr {
    pub base: Box<Expr>,
    /// Letters as written (`"xy"`, `"bgr"`)
    pub fields: String,
    /// Component index per result lane
    pub components: [u8; 4],
    pub ty: Type,
}

impl FieldSelectExpr {
    /// Source component read by result lane `lane`.
    pub fn component(&self, lane: u8) -> u8 {
        self.components[lane as usize]
    }

    /// True when no component is selected twice.
    pub fn is_distinct(&self) -> bool {
        let used = &self.components[..self.fields.len()];
        used.iter()
            .enumerate()
            .all(|(i, c)| !used[..i].contains(c))
    }
}

/// `array[index]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayAccessExpr {
    pub array: VarId,
    pub index: Box<Expr>,
    pub ty: Type,
}

/// Resolved callee of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Callee {
    User(FuncId),
    Builtin(Builtin),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub callee: Callee,
    pub args: Vec<Expr>,
    pub ty: Type,
    /// Unique per call in the unit
    pub site: u32,
}

/// Expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(LiteralExpr),
    Variable(VariableExpr),
    Unary(UnaryExpr),
    Binary(BinaryExpr),
    VectorCtor(VectorCtorExpr),
    Paren(ParenExpr),
    FieldSelect(FieldSelectExpr),
    ArrayAccess(ArrayAccessExpr),
    Call(CallExpr),
}

impl Expr {
    /// Resolved type of this expression.
    pub fn ty(&self) -> Type {
        match self {
            Expr::Literal(e) => e.ty,
            Expr::Variable(e) => e.ty,
            Expr::Unary(e) => e.ty,
            Expr::Binary(e) => e.ty,
            Expr::VectorCtor(e) => e.ty,
            Expr::Paren(e) => e.ty,
            Expr::FieldSelect(e) => e.ty,
            Expr::ArrayAccess(e) => e.ty,
            Expr::Call(e) => e.ty,
        }
    }

    /// The variable an lvalue expression writes, if any.
    pub fn root_variable(&self) -> Option<VarId> {
        match self {
            Expr::Variable(e) => Some(e.var),
            Expr::ArrayAccess(e) => Some(e.array),
            Expr::FieldSelect(e) => e.base.root_variable(),
            Expr::Paren(e) => e.inner.root_variable(),
            _ => None,
        }
    }

    /// Whether this node itself writes state, ignoring its operands.
    pub fn is_effect(&self) -> bool {
        match self {
            Expr::Unary(e) => e.op.writes_operand(),
            Expr::Binary(e) => e.op.is_assignment(),
            Expr::Call(e) => matches!(e.callee, Callee::User(_)),
            _ => false,
        }
    }

    /// Direct operands, in evaluation order.
    pub fn operands(&self) -> Vec<&Expr> {
        match self {
            Expr::Literal(_) | Expr::Variable(_) => Vec::new(),
            Expr::Unary(e) => alloc::vec![&*e.operand],
            Expr::Binary(e) => alloc::vec![&*e.lhs, &*e.rhs],
            Expr::VectorCtor(e) => e.args.iter().collect(),
            Expr::Paren(e) => alloc::vec![&*e.inner],
            Expr::FieldSelect(e) => alloc::vec![&*e.base],
            Expr::ArrayAccess(e) => alloc::vec![&*e.index],
            Expr::Call(e) => e.args.iter().collect(),
        }
    }

    /// Effect nodes not nested inside another effect, in evaluation order.
    pub fn outer_effects(&self) -> Vec<&Expr> {
        if self.is_effect() {
            return alloc::vec![self];
        }
        self.operands()
            .into_iter()
            .flat_map(Expr::outer_effects)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprStmt {
    pub expr: Expr,
}

/// One declared variable and its initializer.
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub var: VarId,
    pub init: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeclStmt {
    pub vars: Vec<VarDecl>,
    /// Declared in the root frame
    pub global: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompoundStmt {
    pub stmts: Vec<Stmt>,
}

/// `if` / `else`.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStmt {
    pub cond: Expr,
    pub then_branch: Box<Stmt>,
    pub else_branch: Option<Box<Stmt>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub cond: Expr,
    pub body: Box<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DoWhileStmt {
    pub body: Box<Stmt>,
    pub cond: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    /// Declaration or expression statement
    pub init: Option<Box<Stmt>>,
    pub cond: Option<Expr>,
    pub update: Option<Expr>,
    pub body: Box<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
}

/// Statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expr(ExprStmt),
    Decl(DeclStmt),
    Compound(CompoundStmt),
    Select(SelectStmt),
    While(WhileStmt),
    DoWhile(DoWhileStmt),
    For(ForStmt),
    Return(ReturnStmt),
    Break,
    Continue,
    Discard,
}

/// Function definition; parameters and top-level body share one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncDef {
    pub func: FuncId,
    pub params: Vec<VarId>,
    pub body: CompoundStmt,
}

/// Raw target text passed through by software backends.
#[derive(Debug, Clone, PartialEq)]
pub struct GlueBlock {
    pub text: String,
}

/// Top-level item.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtDecl {
    Func(FuncDef),
    Var(DeclStmt),
    Glue(GlueBlock),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProgramUnit {
    pub decls: Vec<ExtDecl>,
}

/// A fully resolved compilation unit.
#[derive(Debug, Clone)]
pub struct Program {
    pub unit: ProgramUnit,
    pub symbols: SymbolTable,
}

impl Program {
    /// The entry point definition, if the unit has one.
    pub fn entry_point(&self) -> Option<&FuncDef> {
        self.unit.decls.iter().find_map(|d| match d {
            ExtDecl::Func(def) if self.symbols.function(def.func).is_entry_point() => Some(def),
            _ => None,
        })
    }
}
