//! Inline implementations of builtins that have no single-call equivalent.
//!
//! A template is plain target text with placeholders:
//!
//! | placeholder | expands to                                            |
//! |-------------|-------------------------------------------------------|
//! | `$1`..`$9`  | argument N at the lane being emitted                  |
//! | `$1.x`      | argument N at a fixed lane (`x`, `y`, `z` or `w`)     |
//! | `$c`        | index of the lane being emitted                       |
//! | `$t`        | the call site's temporary (`jsl_t<site>`)             |
//! | `$r`        | the reduction: `term` expanded per lane of arg 1, joined |
//!
//! The preamble is emitted once per call site, before the statement that
//! contains the call.

use alloc::vec::Vec;

use crate::error::{JslError, JslResult};

/// Reduction over the lanes of the first argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reduction {
    pub term: &'static str,
    pub join: &'static str,
}

/// Expression text of a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateBody {
    /// Same text for every lane
    Lanewise(&'static str),
    /// One text per result lane
    PerLane([&'static str; 4]),
}

/// Parameterized implementation of one builtin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FuncTemplate {
    pub preamble: Option<&'static str>,
    pub reduce: Option<Reduction>,
    pub body: TemplateBody,
}

impl FuncTemplate {
    pub const fn lanewise(body: &'static str) -> Self {
        Self {
            preamble: None,
            reduce: None,
            body: TemplateBody::Lanewise(body),
        }
    }

    pub const fn per_lane(bodies: [&'static str; 4]) -> Self {
        Self {
            preamble: None,
            reduce: None,
            body: TemplateBody::PerLane(bodies),
        }
    }

    pub const fn with_preamble(mut self, preamble: &'static str) -> Self {
        self.preamble = Some(preamble);
        self
    }

    pub const fn with_reduce(mut self, term: &'static str, join: &'static str) -> Self {
        self.reduce = Some(Reduction { term, join });
        self
    }

    /// Body text for result lane `lane`.
    pub fn body(&self, lane: u8) -> &'static str {
        match self.body {
            TemplateBody::Lanewise(text) => text,
            TemplateBody::PerLane(texts) => texts[(lane & 3) as usize],
        }
    }

    /// Every text of the template, for validation.
    pub fn texts(&self) -> Vec<&'static str> {
        let mut texts = Vec::new();
        texts.extend(self.preamble);
        if let Some(r) = self.reduce {
            texts.push(r.term);
        }
        match self.body {
            TemplateBody::Lanewise(text) => texts.push(text),
            TemplateBody::PerLane(bodies) => texts.extend(bodies),
        }
        texts
    }
}

/// One piece of a template text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Piece<'a> {
    Text(&'a str),
    /// Zero-based argument index, optionally pinned to a lane
    Arg { index: usize, lane: Option<u8> },
    Lane,
    Temp,
    Reduction,
}

fn lane_letter(c: u8) -> Option<u8> {
    match c {
        b'x' => Some(0),
        b'y' => Some(1),
        b'z' => Some(2),
        b'w' => Some(3),
        _ => None,
    }
}

fn is_ident_byte(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

/// Split a template into pieces. `target` names the backend in errors.
pub fn pieces<'a>(target: &'static str, text: &'a str) -> JslResult<Vec<Piece<'a>>> {
    let bytes = text.as_bytes();
    let mut out = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'$' {
            i += 1;
            continue;
        }
        if start < i {
            out.push(Piece::Text(&text[start..i]));
        }
        let next = bytes.get(i + 1).copied();
        let (piece, len) = match next {
            Some(d @ b'1'..=b'9') => {
                let index = (d - b'1') as usize;
                // `$1.x` pins the lane; `$1.xy` or `$1.x0` is not a lane pin.
                let pinned = match (bytes.get(i + 2).copied(), bytes.get(i + 3).copied()) {
                    (Some(b'.'), Some(c)) if !bytes.get(i + 4).copied().is_some_and(is_ident_byte) => {
                        lane_letter(c)
                    }
                    _ => None,
                };
                match pinned {
                    Some(lane) => (Piece::Arg { index, lane: Some(lane) }, 4),
                    None => (Piece::Arg { index, lane: None }, 2),
                }
            }
            Some(b'c') => (Piece::Lane, 2),
            Some(b't') => (Piece::Temp, 2),
            Some(b'r') => (Piece::Reduction, 2),
            _ => {
                return Err(JslError::unresolved(
                    target,
                    alloc::format!("template placeholder at {} in '{}'", i, text),
                ))
            }
        };
        out.push(piece);
        i += len;
        start = i;
    }
    if start < bytes.len() {
        out.push(Piece::Text(&text[start..]));
    }
    Ok(out)
}

/// Highest argument index referenced by the template, plus one.
pub fn arg_count(target: &'static str, template: &FuncTemplate) -> JslResult<usize> {
    let mut count = 0;
    for text in template.texts() {
        for piece in pieces(target, text)? {
            if let Piece::Arg { index, .. } = piece {
                count = count.max(index + 1);
            }
        }
    }
    Ok(count)
}
