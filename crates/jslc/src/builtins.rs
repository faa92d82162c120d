//! Builtin function catalog.
//!
//! Every builtin the language knows, its overload signatures and the lowest
//! shader model it may be used at. Each backend must provide an entry for
//! every builtin listed here.

use core::fmt;

use crate::{
    shader_model::ShaderModel,
    types::{BaseKind, Type},
};

/// Builtin function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Builtin {
    Sample,
    Intcast,
    Any,
    All,
    Length,
    Distance,
    Dot,
    Cross,
    Normalize,
    Abs,
    Ceil,
    Floor,
    Fract,
    Sign,
    Sqrt,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Exp,
    Log,
    Exp2,
    Log2,
    Degrees,
    Radians,
    Pow,
    Mod,
    Min,
    Max,
    Clamp,
    Mix,
    Step,
    Smoothstep,
    IsFinite,
    IsInfinite,
    IsNaN,
    Fma,
}

impl Builtin {
    pub const ALL: [Builtin; 39] = [
        Builtin::Sample,
        Builtin::Intcast,
        Builtin::Any,
        Builtin::All,
        Builtin::Length,
        Builtin::Distance,
        Builtin::Dot,
        Builtin::Cross,
        Builtin::Normalize,
        Builtin::Abs,
        Builtin::Ceil,
        Builtin::Floor,
        Builtin::Fract,
        Builtin::Sign,
        Builtin::Sqrt,
        Builtin::Sin,
        Builtin::Cos,
        Builtin::Tan,
        Builtin::Asin,
        Builtin::Acos,
        Builtin::Atan,
        Builtin::Exp,
        Builtin::Log,
        Builtin::Exp2,
        Builtin::Log2,
        Builtin::Degrees,
        Builtin::Radians,
        Builtin::Pow,
        Builtin::Mod,
        Builtin::Min,
        Builtin::Max,
        Builtin::Clamp,
        Builtin::Mix,
        Builtin::Step,
        Builtin::Smoothstep,
        Builtin::IsFinite,
        Builtin::IsInfinite,
        Builtin::IsNaN,
        Builtin::Fma,
    ];

    /// Source name.
    pub fn name(self) -> &'static str {
        match self {
            Builtin::Sample => "sample",
            Builtin::Intcast => "intcast",
            Builtin::Any => "any",
            Builtin::All => "all",
            Builtin::Length => "length",
            Builtin::Distance => "distance",
            Builtin::Dot => "dot",
            Builtin::Cross => "cross",
            Builtin::Normalize => "normalize",
            Builtin::Abs => "abs",
            Builtin::Ceil => "ceil",
            Builtin::Floor => "floor",
            Builtin::Fract => "fract",
            Builtin::Sign => "sign",
            Builtin::Sqrt => "sqrt",
            Builtin::Sin => "sin",
            Builtin::Cos => "cos",
            Builtin::Tan => "tan",
            Builtin::Asin => "asin",
            Builtin::Acos => "acos",
            Builtin::Atan => "atan",
            Builtin::Exp => "exp",
            Builtin::Log => "log",
            Builtin::Exp2 => "exp2",
            Builtin::Log2 => "log2",
            Builtin::Degrees => "degrees",
            Builtin::Radians => "radians",
            Builtin::Pow => "pow",
            Builtin::Mod => "mod",
            Builtin::Min => "min",
            Builtin::Max => "max",
            Builtin::Clamp => "clamp",
            Builtin::Mix => "mix",
            Builtin::Step => "step",
            Builtin::Smoothstep => "smoothstep",
            Builtin::IsFinite => "isFinite",
            Builtin::IsInfinite => "isInfinite",
            Builtin::IsNaN => "isNaN",
            Builtin::Fma => "fma",
        }
    }

    pub fn from_name(name: &str) -> Option<Builtin> {
        Self::ALL.iter().copied().find(|b| b.name() == name)
    }

    /// Lowest shader model the builtin may be used at.
    pub fn min_tier(self) -> ShaderModel {
        match self {
            Builtin::Fma => ShaderModel::Sm5_0,
            _ => ShaderModel::Sm3,
        }
    }

    /// Match `args` against the overloads; returns the result type.
    pub fn resolve(self, args: &[Type]) -> Option<Type> {
        use Builtin::*;

        let floatn = |t: &Type| t.base() == BaseKind::Float;
        let float = |t: &Type| *t == Type::Float;
        match (self, args) {
            (Sample, [s, coord]) if s.base() == BaseKind::Sampler && *coord == Type::Float2 => {
                Some(Type::Float4)
            }
            (Intcast, [Type::Float]) => Some(Type::Int),
            (Any | All, [b]) if b.base() == BaseKind::Bool => Some(Type::Bool),
            (Length, [a]) if floatn(a) => Some(Type::Float),
            (Distance | Dot, [a, b]) if floatn(a) && a == b => Some(Type::Float),
            (Cross, [Type::Float3, Type::Float3]) => Some(Type::Float3),
            (
                Normalize | Abs | Ceil | Floor | Fract | Sign | Sqrt | Sin | Cos | Tan | Asin
                | Acos | Atan | Exp | Log | Exp2 | Log2 | Degrees | Radians,
                [a],
            ) if floatn(a) => Some(*a),
            (Pow, [a, b]) if floatn(a) && a == b => Some(*a),
            (Mod | Min | Max, [a, b]) if floatn(a) && (a == b || float(b)) => Some(*a),
            (Clamp, [a, lo, hi])
                if floatn(a) && ((lo == a && hi == a) || (float(lo) && float(hi))) =>
            {
                Some(*a)
            }
            (Mix, [a, b, t]) if floatn(a) && a == b && (t == a || float(t)) => Some(*a),
            (Step, [edge, x]) if floatn(x) && (edge == x || float(edge)) => Some(*x),
            (Smoothstep, [e0, e1, x])
                if floatn(x) && ((e0 == x && e1 == x) || (float(e0) && float(e1))) =>
            {
                Some(*x)
            }
            (IsFinite | IsInfinite | IsNaN, [a]) if floatn(a) => a.with_base(BaseKind::Bool),
            (Fma, [a, b, c]) if floatn(a) && a == b && b == c => Some(*a),
            _ => None,
        }
    }
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
