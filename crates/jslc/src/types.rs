//! JSL type system.
//!
//! Types form a closed set: a base kind crossed with an arity. Operator
//! typing lives here so the AST builder and tests share one set of rules.

use alloc::format;
use core::fmt;

use jsl_syntax::syntax::TypeName;

use crate::{
    ast::{BinaryOp, OpClass, UnaryOp},
    error::{JslError, JslResult},
};

/// Base kind of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BaseKind {
    Void,
    Float,
    Int,
    Bool,
    Sampler,
    Buffer,
}

impl BaseKind {
    pub fn is_numeric(self) -> bool {
        matches!(self, BaseKind::Float | BaseKind::Int)
    }
}

impl fmt::Display for BaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BaseKind::Void => "void",
            BaseKind::Float => "float",
            BaseKind::Int => "int",
            BaseKind::Bool => "bool",
            BaseKind::Sampler => "sampler",
            BaseKind::Buffer => "buffer",
        })
    }
}

/// JSL type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Type {
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
    /// Point-sampled texture
    Sampler,
    /// Linear-filtered texture
    LSampler,
    /// Float-data texture
    FSampler,
    CBuffer,
    TBuffer,
}

impl Type {
    pub const ALL: [Type; 18] = [
        Type::Void,
        Type::Float,
        Type::Float2,
        Type::Float3,
        Type::Float4,
        Type::Int,
        Type::Int2,
        Type::Int3,
        Type::Int4,
        Type::Bool,
        Type::Bool2,
        Type::Bool3,
        Type::Bool4,
        Type::Sampler,
        Type::LSampler,
        Type::FSampler,
        Type::CBuffer,
        Type::TBuffer,
    ];

    pub fn base(self) -> BaseKind {
        match self {
            Type::Void => BaseKind::Void,
            Type::Float | Type::Float2 | Type::Float3 | Type::Float4 => BaseKind::Float,
            Type::Int | Type::Int2 | Type::Int3 | Type::Int4 => BaseKind::Int,
            Type::Bool | Type::Bool2 | Type::Bool3 | Type::Bool4 => BaseKind::Bool,
            Type::Sampler | Type::LSampler | Type::FSampler => BaseKind::Sampler,
            Type::CBuffer | Type::TBuffer => BaseKind::Buffer,
        }
    }

    /// Number of components; 0 for void.
    pub fn arity(self) -> u8 {
        match self {
            Type::Void => 0,
            Type::Float2 | Type::Int2 | Type::Bool2 => 2,
            Type::Float3 | Type::Int3 | Type::Bool3 => 3,
            Type::Float4 | Type::Int4 | Type::Bool4 => 4,
            _ => 1,
        }
    }

    pub fn is_scalar(self) -> bool {
        self.arity() == 1
    }

    pub fn is_vector(self) -> bool {
        self.arity() > 1
    }

    /// The float/int/bool type with the given base and arity.
    pub fn vector(base: BaseKind, arity: u8) -> Option<Type> {
        let family = match base {
            BaseKind::Float => [Type::Float, Type::Float2, Type::Float3, Type::Float4],
            BaseKind::Int => [Type::Int, Type::Int2, Type::Int3, Type::Int4],
            BaseKind::Bool => [Type::Bool, Type::Bool2, Type::Bool3, Type::Bool4],
            _ => return None,
        };
        match arity {
            1..=4 => Some(family[arity as usize - 1]),
            _ => None,
        }
    }

    /// Same arity, different base (`float3` -> `bool3`).
    pub fn with_base(self, base: BaseKind) -> Option<Type> {
        Type::vector(base, self.arity())
    }

    /// Same base, different arity (`float3` -> `float`).
    pub fn with_arity(self, arity: u8) -> Option<Type> {
        Type::vector(self.base(), arity)
    }

    /// The scalar type of one component. Non-vector types are their own
    /// component.
    pub fn component(self) -> Type {
        if self.is_vector() {
            Type::vector(self.base(), 1).unwrap_or(self)
        } else {
            self
        }
    }

    pub fn name(self) -> &'static str {
        self.type_name().keyword()
    }

    fn type_name(self) -> TypeName {
        match self {
            Type::Void => TypeName::Void,
            Type::Float => TypeName::Float,
            Type::Float2 => TypeName::Float2,
            Type::Float3 => TypeName::Float3,
            Type::Float4 => TypeName::Float4,
            Type::Int => TypeName::Int,
            Type::Int2 => TypeName::Int2,
            Type::Int3 => TypeName::Int3,
            Type::Int4 => TypeName::Int4,
            Type::Bool => TypeName::Bool,
            Type::Bool2 => TypeName::Bool2,
            Type::Bool3 => TypeName::Bool3,
            Type::Bool4 => TypeName::Bool4,
            Type::Sampler => TypeName::Sampler,
            Type::LSampler => TypeName::LSampler,
            Type::FSampler => TypeName::FSampler,
            Type::CBuffer => TypeName::CBuffer,
            Type::TBuffer => TypeName::TBuffer,
        }
    }

    /// Convert a parsed type keyword.
    pub fn from_type_name(name: TypeName) -> Type {
        match name {
            TypeName::Void => Type::Void,
            TypeName::Float => Type::Float,
            TypeName::Float2 => Type::Float2,
            TypeName::Float3 => Type::Float3,
            TypeName::Float4 => Type::Float4,
            TypeName::Int => Type::Int,
            TypeName::Int2 => Type::Int2,
            TypeName::Int3 => Type::Int3,
            TypeName::Int4 => Type::Int4,
            TypeName::Bool => Type::Bool,
            TypeName::Bool2 => Type::Bool2,
            TypeName::Bool3 => Type::Bool3,
            TypeName::Bool4 => Type::Bool4,
            TypeName::Sampler => Type::Sampler,
            TypeName::LSampler => Type::LSampler,
            TypeName::FSampler => Type::FSampler,
            TypeName::CBuffer => Type::CBuffer,
            TypeName::TBuffer => Type::TBuffer,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Arity of a componentwise operation: equal arities, or one scalar side
/// broadcast against the other.
pub fn broadcast_arity(lhs: Type, rhs: Type) -> Option<u8> {
    let (l, r) = (lhs.arity(), rhs.arity());
    if l == r || r == 1 {
        Some(l)
    } else if l == 1 {
        Some(r)
    } else {
        None
    }
}

fn check_operand_base(op: BinaryOp, ty: Type) -> JslResult<()> {
    let ok = match op.class() {
        OpClass::Arithmetic | OpClass::Relational => ty.base().is_numeric(),
        OpClass::Equality => matches!(
            ty.base(),
            BaseKind::Float | BaseKind::Int | BaseKind::Bool
        ),
        OpClass::Logical => ty.base() == BaseKind::Bool,
        OpClass::Assignment => !matches!(ty.base(), BaseKind::Void),
    };
    if ok {
        Ok(())
    } else {
        let expected = match op.class() {
            OpClass::Arithmetic | OpClass::Relational => "float or int operands",
            OpClass::Logical => "bool operands",
            _ => "value operands",
        };
        Err(JslError::mismatch(
            format!("binary '{}'", op.symbol()),
            expected,
            ty.name(),
        ))
    }
}

/// Result type of a non-assignment binary operator.
pub fn binary_result(op: BinaryOp, lhs: Type, rhs: Type) -> JslResult<Type> {
    let context = || format!("binary '{}'", op.symbol());
    if lhs.base() != rhs.base() {
        return Err(JslError::mismatch(context(), lhs.name(), rhs.name()));
    }
    check_operand_base(op, lhs)?;
    let arity = broadcast_arity(lhs, rhs)
        .ok_or_else(|| JslError::mismatch(context(), lhs.name(), rhs.name()))?;
    let base = match op.class() {
        OpClass::Arithmetic => lhs.base(),
        _ => BaseKind::Bool,
    };
    Type::vector(base, arity).ok_or_else(|| JslError::mismatch(context(), lhs.name(), rhs.name()))
}

/// Result type of an assignment operator. Lvalue and read-only checks are
/// done by the caller.
pub fn assignment_result(op: BinaryOp, lhs: Type, rhs: Type) -> JslResult<Type> {
    let context = || format!("assignment '{}'", op.symbol());
    if lhs.base() != rhs.base() {
        return Err(JslError::mismatch(context(), lhs.name(), rhs.name()));
    }
    if op != BinaryOp::Assign && !lhs.base().is_numeric() {
        return Err(JslError::mismatch(context(), "float or int operands", lhs.name()));
    }
    if lhs.base() == BaseKind::Void || lhs.base() == BaseKind::Buffer {
        return Err(JslError::mismatch(context(), "assignable value", lhs.name()));
    }
    if rhs.arity() == lhs.arity() || rhs.arity() == 1 {
        Ok(lhs)
    } else {
        Err(JslError::mismatch(context(), lhs.name(), rhs.name()))
    }
}

/// Result type of a unary operator.
pub fn unary_result(op: UnaryOp, operand: Type) -> JslResult<Type> {
    let ok = match op {
        UnaryOp::Not => operand.base() == BaseKind::Bool,
        _ => operand.base().is_numeric(),
    };
    if ok {
        Ok(operand)
    } else {
        let expected = if op == UnaryOp::Not {
            "bool operand"
        } else {
            "float or int operand"
        };
        Err(JslError::mismatch(
            format!("unary '{}'", op.symbol()),
            expected,
            operand.name(),
        ))
    }
}

/// Resolve a swizzle string against a source type.
///
/// Returns the component indices and the result type. Letters come from a
/// single set (`xyzw` or `rgba`).
pub fn swizzle(source: Type, fields: &str) -> JslResult<([u8; 4], Type)> {
    let context = || format!("swizzle '.{}'", fields);
    if !matches!(source.base(), BaseKind::Float | BaseKind::Int | BaseKind::Bool) {
        return Err(JslError::mismatch(context(), "vector or scalar value", source.name()));
    }
    const SETS: [&str; 2] = ["xyzw", "rgba"];
    let len = fields.len();
    if !(1..=4).contains(&len) {
        return Err(JslError::mismatch(context(), "1 to 4 components", format!("{}", len)));
    }
    let set = fields
        .chars()
        .next()
        .and_then(|first| SETS.iter().find(|s| s.contains(first)))
        .ok_or_else(|| JslError::mismatch(context(), "xyzw or rgba letters", fields))?;
    let mut indices = [0u8; 4];
    for (i, c) in fields.chars().enumerate() {
        let index = set
            .find(c)
            .ok_or_else(|| JslError::mismatch(context(), "letters from one set", fields))?;
        if index >= source.arity() as usize {
            return Err(JslError::mismatch(
                context(),
                format!("components of {}", source.name()),
                format!("'{}'", c),
            ));
        }
        indices[i] = index as u8;
    }
    let ty = source
        .with_arity(len as u8)
        .ok_or_else(|| JslError::mismatch(context(), "vector type", source.name()))?;
    Ok((indices, ty))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_and_base() {
        assert_eq!(Type::Float3.arity(), 3);
        assert_eq!(Type::Bool.arity(), 1);
        assert_eq!(Type::Void.arity(), 0);
        assert_eq!(Type::LSampler.base(), BaseKind::Sampler);
        assert_eq!(Type::TBuffer.base(), BaseKind::Buffer);
        assert_eq!(Type::Int4.component(), Type::Int);
        assert_eq!(Type::Float2.with_base(BaseKind::Bool), Some(Type::Bool2));
    }

    #[test]
    fn test_binary_result_arity_is_max() {
        for l in [Type::Float, Type::Float2, Type::Float3, Type::Float4] {
            for r in [Type::Float, Type::Float2, Type::Float3, Type::Float4] {
                let result = binary_result(BinaryOp::Add, l, r);
                if l.arity() == r.arity() || l.is_scalar() || r.is_scalar() {
                    let ty = result.unwrap();
                    assert_eq!(ty.arity(), l.arity().max(r.arity()));
                } else {
                    assert!(result.is_err());
                }
            }
        }
    }

    #[test]
    fn test_mixed_base_always_fails() {
        let ops = [BinaryOp::Add, BinaryOp::Lt, BinaryOp::Eq, BinaryOp::And];
        for op in ops {
            let err = binary_result(op, Type::Int, Type::Float).unwrap_err();
            assert!(matches!(err, JslError::TypeMismatch { .. }));
        }
    }

    #[test]
    fn test_comparison_yields_bool() {
        assert_eq!(
            binary_result(BinaryOp::Lt, Type::Float3, Type::Float).unwrap(),
            Type::Bool3
        );
        assert_eq!(
            binary_result(BinaryOp::Eq, Type::Bool, Type::Bool).unwrap(),
            Type::Bool
        );
        assert!(binary_result(BinaryOp::Add, Type::Bool, Type::Bool).is_err());
        assert!(binary_result(BinaryOp::And, Type::Float, Type::Float).is_err());
    }

    #[test]
    fn test_assignment_result() {
        assert_eq!(
            assignment_result(BinaryOp::Assign, Type::Float3, Type::Float).unwrap(),
            Type::Float3
        );
        assert!(assignment_result(BinaryOp::Assign, Type::Float, Type::Float3).is_err());
        assert!(assignment_result(BinaryOp::AddAssign, Type::Bool, Type::Bool).is_err());
    }

    #[test]
    fn test_swizzle() {
        let (idx, ty) = swizzle(Type::Float4, "wzy").unwrap();
        assert_eq!(&idx[..3], &[3, 2, 1]);
        assert_eq!(ty, Type::Float3);

        let (_, ty) = swizzle(Type::Float, "x").unwrap();
        assert_eq!(ty, Type::Float);

        assert!(swizzle(Type::Float2, "xyz").is_err());
        assert!(swizzle(Type::Float4, "xg").is_err());
        assert!(swizzle(Type::Float4, "xyzwx").is_err());
        assert!(swizzle(Type::Sampler, "x").is_err());
    }

    #[test]
    fn test_from_type_name_roundtrip() {
        for name in TypeName::ALL {
            assert_eq!(Type::from_type_name(name).name(), name.keyword());
        }
    }
}
