//! `test error`: each case must fail to compile.
//!
//! A `kind: <Kind>` line names the expected error kind. The remaining
//! directives are matched against the error message.

use crate::filecheck::match_filecheck;
use crate::parser::TestCase;
use alloc::string::{String, ToString};
use jslc::{compile, CompileOptions};

pub fn run_case(options: &CompileOptions, case: &TestCase) {
    let err = match compile(&case.source, options) {
        Ok(shader) => panic!(
            "Error test at line {} compiled for {}:\n{}\n\nSource:\n{}",
            case.line, options.target, shader.code, case.source
        ),
        Err(e) => e,
    };

    let mut directives = String::new();
    for line in case.expected_text.lines() {
        match line.strip_prefix("kind:") {
            Some(kind) => {
                if err.kind() != kind.trim() {
                    panic!(
                        "Error test at line {}: expected {}, got {} ({})",
                        case.line,
                        kind.trim(),
                        err.kind(),
                        err
                    );
                }
            }
            None => {
                directives.push_str(line);
                directives.push('\n');
            }
        }
    }

    if let Err(e) = match_filecheck(&err.to_string(), &directives) {
        panic!(
            "Error test at line {} failed: {}\n\nMessage: {}\n\nSource:\n{}",
            case.line, e, err, case.source
        );
    }
}
