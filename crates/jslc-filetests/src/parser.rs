//! Test file parsing

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use jslc::{CompileOptions, ShaderModel, TargetKind};

/// What a test file checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestCommand {
    /// Compile each case and filecheck the generated code
    Compile,
    /// Expect each case to fail and check the error
    Error,
}

/// A single case: JSL source and the directives that follow it.
#[derive(Debug, Clone)]
pub struct TestCase {
    pub source: String,
    pub expected_text: String,
    /// 1-based line of the first source line
    pub line: usize,
}

#[derive(Debug, Clone)]
pub struct TestFile {
    pub command: TestCommand,
    pub options: CompileOptions,
    pub cases: Vec<TestCase>,
}

/// Parse the `test <command> <target> [model]` header line.
pub fn parse_command(line: &str) -> Result<(TestCommand, CompileOptions), String> {
    let mut words = line.split_whitespace();
    if words.next() != Some("test") {
        return Err(format!("expected 'test' header, found '{}'", line));
    }
    let command = match words.next() {
        Some("compile") => TestCommand::Compile,
        Some("error") => TestCommand::Error,
        other => return Err(format!("unknown test command {:?}", other)),
    };
    let target: TargetKind = words
        .next()
        .ok_or_else(|| String::from("missing target"))?
        .parse()?;
    let mut options = CompileOptions::new(target);
    if let Some(model) = words.next() {
        options = options.with_shader_model(model.parse::<ShaderModel>()?);
    }
    if let Some(extra) = words.next() {
        return Err(format!("unexpected '{}' in header", extra));
    }
    Ok((command, options))
}

/// Parse a test file into its header and cases.
pub fn parse_test_file(content: &str) -> Result<TestFile, String> {
    let lines: Vec<&str> = content.lines().collect();
    let mut i = 0;

    while i < lines.len() && lines[i].trim().is_empty() {
        i += 1;
    }
    let header = lines.get(i).ok_or_else(|| String::from("empty test file"))?;
    let (command, options) = parse_command(header.trim())?;
    i += 1;

    let mut cases = Vec::new();
    while i < lines.len() {
        if lines[i].trim().is_empty() {
            i += 1;
            continue;
        }

        let start = i;
        while i < lines.len() && !is_comment(lines[i]) {
            i += 1;
        }
        let source = lines[start..i].join("\n");

        let mut expected_text = String::new();
        while i < lines.len() && is_comment(lines[i]) {
            let text = lines[i].trim_start()[1..].trim();
            expected_text.push_str(text);
            expected_text.push('\n');
            i += 1;
        }
        if expected_text.is_empty() {
            return Err(format!("case at line {} has no expectations", start + 1));
        }

        cases.push(TestCase {
            source,
            expected_text,
            line: start + 1,
        });
    }

    Ok(TestFile {
        command,
        options,
        cases,
    })
}

fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with(';')
}
