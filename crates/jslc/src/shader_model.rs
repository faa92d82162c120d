//! Shader model capability tiers.

use alloc::{format, string::String};
use core::{fmt, str::FromStr};

/// Capability tier of a compilation target.
///
/// Tiers are totally ordered; a target at tier T supports every tier <= T.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ShaderModel {
    #[default]
    Sm3,
    Sm4_0,
    Sm4_1,
    Sm5_0,
    Sm5_1,
}

impl ShaderModel {
    /// All tiers, lowest first.
    pub const ALL: [ShaderModel; 5] = [
        ShaderModel::Sm3,
        ShaderModel::Sm4_0,
        ShaderModel::Sm4_1,
        ShaderModel::Sm5_0,
        ShaderModel::Sm5_1,
    ];

    /// Whether features introduced at `tier` are available at this tier.
    pub fn supports(self, tier: ShaderModel) -> bool {
        self >= tier
    }

    pub fn name(self) -> &'static str {
        match self {
            ShaderModel::Sm3 => "sm3",
            ShaderModel::Sm4_0 => "sm4_0",
            ShaderModel::Sm4_1 => "sm4_1",
            ShaderModel::Sm5_0 => "sm5_0",
            ShaderModel::Sm5_1 => "sm5_1",
        }
    }
}

impl fmt::Display for ShaderModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShaderModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown shader model '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn test_supports_is_monotonic() {
        for (i, model) in ShaderModel::ALL.iter().enumerate() {
            for (j, tier) in ShaderModel::ALL.iter().enumerate() {
                assert_eq!(model.supports(*tier), j <= i, "{} supports {}", model, tier);
            }
        }
    }

    #[test]
    fn test_parse_and_display() {
        for model in ShaderModel::ALL {
            assert_eq!(model.to_string().parse::<ShaderModel>(), Ok(model));
        }
        assert_eq!("SM5_0".parse::<ShaderModel>(), Ok(ShaderModel::Sm5_0));
        assert!("sm6".parse::<ShaderModel>().is_err());
    }

    #[test]
    fn test_default_is_lowest() {
        assert_eq!(ShaderModel::default(), ShaderModel::Sm3);
    }
}
