//! Filecheck directive parsing and matching using the filecheck crate

use alloc::format;
use alloc::string::String;
use filecheck::{Checker, CheckerBuilder, NO_VARIABLES};

/// Build a filechecker from expected text containing directives
pub fn build_filechecker(expected_text: &str) -> Result<Checker, String> {
    let mut builder = CheckerBuilder::new();
    for line in expected_text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        builder
            .directive(trimmed)
            .map_err(|e| format!("Failed to parse filecheck directive '{}': {}", trimmed, e))?;
    }
    Ok(builder.finish())
}

/// Match actual output against filecheck directives
pub fn match_filecheck(actual: &str, expected_text: &str) -> Result<(), String> {
    let checker = build_filechecker(expected_text)?;

    if checker
        .check(actual, NO_VARIABLES)
        .map_err(|e| format!("Filecheck error: {}", e))?
    {
        Ok(())
    } else {
        let (_, explain) = checker
            .explain(actual, NO_VARIABLES)
            .map_err(|e| format!("Failed to get filecheck explanation: {}", e))?;
        Err(format!("Filecheck failed:\n{}", explain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_and_nextln() {
        let actual = "float a = 1.0;\nfloat b = a;\ncolor = float4(b);\n";
        assert!(match_filecheck(actual, "check: float a = 1.0;\nnextln: float b = a;").is_ok());
        assert!(match_filecheck(actual, "check: float a = 1.0;\nnextln: color").is_err());
    }

    #[test]
    fn test_not_directive() {
        let actual = "color[0] = p_x;\n";
        assert!(match_filecheck(actual, "check: color[0]\nnot: jsl_tmp").is_ok());
        assert!(match_filecheck(actual, "not: p_x").is_err());
    }
}
