//! File-based tests for the JSL compiler.
//!
//! A test file starts with a command line (`test compile <target> [model]`
//! or `test error <target> [model]`), followed by cases. Each case is JSL
//! source followed by `;` comment lines holding filecheck directives.

#![no_std]

extern crate alloc;

pub mod filecheck;
pub mod parser;
pub mod test_compile;
pub mod test_error;

use parser::{parse_test_file, TestCommand};

/// Run every case in a test file, panicking on the first failure.
pub fn run_tests_from_file(content: &str) {
    let file = match parse_test_file(content) {
        Ok(file) => file,
        Err(e) => panic!("Malformed test file: {}", e),
    };
    for case in &file.cases {
        match file.command {
            TestCommand::Compile => test_compile::run_case(&file.options, case),
            TestCommand::Error => test_error::run_case(&file.options, case),
        }
    }
}
