//! `test compile`: compile each case and filecheck the generated code.

use crate::filecheck::match_filecheck;
use crate::parser::TestCase;
use jslc::{compile, CompileOptions};

pub fn run_case(options: &CompileOptions, case: &TestCase) {
    let shader = match compile(&case.source, options) {
        Ok(shader) => shader,
        Err(e) => panic!(
            "Compile test at line {} failed to compile for {}: {}\n\nSource:\n{}",
            case.line, options.target, e, case.source
        ),
    };

    if let Err(e) = match_filecheck(&shader.code, &case.expected_text) {
        panic!(
            "Compile test at line {} failed: {}\n\nExpected:\n{}\n\nActual:\n{}\n\nSource:\n{}",
            case.line, e, case.expected_text, shader.code, case.source
        );
    }
}

#[cfg(test)]
mod tests {
    use crate::run_tests_from_file;

    #[test]
    fn test_hlsl_basic() {
        run_tests_from_file(include_str!("../filetests/compile/hlsl_basic.jsl"));
    }

    #[test]
    fn test_hlsl_sm5() {
        run_tests_from_file(include_str!("../filetests/compile/hlsl_sm5.jsl"));
    }

    #[test]
    fn test_sse_basic() {
        run_tests_from_file(include_str!("../filetests/compile/sse_basic.jsl"));
    }

    #[test]
    fn test_jsw_basic() {
        run_tests_from_file(include_str!("../filetests/compile/jsw_basic.jsl"));
    }
}
