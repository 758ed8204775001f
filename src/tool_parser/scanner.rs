//! Call-shape scanner and argument splitter.
//!
//! A single left-to-right pass with an explicit bracket stack finds every
//! `name(...)` span, so scanning is linear in the input length no matter how
//! the brackets nest or fail to close.
use std::ops::Range;

use crate::tool_parser::{
    errors::{ParserError, ParserResult},
    state::{ScanEvent, ScanState},
};

/// Default cap on bracket nesting while scanning for calls
pub const DEFAULT_MAX_SCAN_DEPTH: usize = 512;

/// A call-shaped span found in the scanned text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCall<'a> {
    /// Dotted function name, e.g. `math.sqrt`
    pub name: &'a str,
    /// Text between the outer parentheses
    pub args: &'a str,
    /// Byte range of the whole call, name included
    pub span: Range<usize>,
}

/// Calls found by [`scan_calls`] plus the call openings that were skipped
#[derive(Debug, Clone, Default)]
pub struct ScanOutput<'a> {
    pub calls: Vec<RawCall<'a>>,
    /// Byte offsets of call names whose parenthesis never closed
    pub unterminated: Vec<usize>,
    /// Byte offsets of call names whose span holds a mismatched closer
    pub unbalanced: Vec<usize>,
}

struct Frame {
    /// The opening bracket byte
    opener: u8,
    open: usize,
    name_start: Option<usize>,
    /// A call frame or a bracket nested inside one
    in_call: bool,
}

fn closer_for(opener: u8) -> u8 {
    match opener {
        b'(' => b')',
        b'[' => b']',
        _ => b'}',
    }
}

/// Find every outermost `identifier(...)` span in `text`, in source order.
///
/// Calls nested inside an emitted call belong to that call's arguments and
/// are not reported separately. A call whose parenthesis never closes is
/// skipped, calls nested inside it are still found. A closer that does not
/// match the innermost open bracket is ignored and every call open at that
/// point is skipped as unbalanced.
///
/// Quotes only open strings inside a call, so apostrophes in prose, even
/// inside prose parentheses, never hide the calls that follow.
pub fn scan_calls(text: &str, max_depth: usize) -> ParserResult<ScanOutput<'_>> {
    let bytes = text.as_bytes();
    let mut state = ScanState::prose();
    let mut stack: Vec<Frame> = Vec::new();
    let mut closed: Vec<RawCall<'_>> = Vec::new();
    let mut unbalanced: Vec<usize> = Vec::new();
    // Frames below this stack index contain a mismatched closer
    let mut poisoned = 0;

    let mut pos = 0;
    while pos < bytes.len() {
        state.set_quotes_active(stack.last().is_some_and(|frame| frame.in_call));
        let (event, consumed) = state.process(bytes, pos);
        match event {
            ScanEvent::Open(byte) => {
                if stack.len() >= max_depth {
                    return Err(ParserError::DepthExceeded(max_depth));
                }
                let name_start = if byte == b'(' {
                    call_name_start(text, pos)
                } else {
                    None
                };
                let in_call =
                    name_start.is_some() || stack.last().is_some_and(|frame| frame.in_call);
                stack.push(Frame {
                    opener: byte,
                    open: pos,
                    name_start,
                    in_call,
                });
            }
            ScanEvent::Close(byte) => match stack.last() {
                None => {}
                Some(top) if closer_for(top.opener) != byte => {
                    poisoned = stack.len();
                }
                Some(_) => {
                    if let Some(frame) = stack.pop() {
                        let malformed = stack.len() < poisoned;
                        poisoned = poisoned.min(stack.len());
                        match frame.name_start {
                            Some(name_start) if malformed => unbalanced.push(name_start),
                            Some(name_start) => closed.push(RawCall {
                                name: &text[name_start..frame.open],
                                args: &text[frame.open + 1..pos],
                                span: name_start..pos + 1,
                            }),
                            None => {}
                        }
                    }
                }
            },
            ScanEvent::Plain(_) | ScanEvent::Quoted => {}
        }
        pos += consumed;
    }

    // Frames close innermost first; restore source order and drop calls
    // that sit inside an already accepted call.
    closed.sort_by_key(|call| call.span.start);
    let mut calls: Vec<RawCall<'_>> = Vec::with_capacity(closed.len());
    let mut covered_until = 0;
    for call in closed {
        if call.span.start >= covered_until {
            covered_until = call.span.end;
            calls.push(call);
        }
    }

    let unterminated = stack.iter().filter_map(|frame| frame.name_start).collect();
    unbalanced.sort_unstable();

    Ok(ScanOutput {
        calls,
        unterminated,
        unbalanced,
    })
}

/// Start offset of a valid dotted call name ending right before `paren`
fn call_name_start(text: &str, paren: usize) -> Option<usize> {
    let prefix = &text[..paren];
    let start = prefix
        .char_indices()
        .rev()
        .take_while(|&(_, ch)| is_name_char(ch))
        .last()
        .map(|(idx, _)| idx)?;

    // `foo().bar(` names `bar`
    let trimmed = prefix[start..].trim_start_matches('.');
    let start = paren - trimmed.len();
    is_dotted_name(trimmed).then_some(start)
}

fn is_name_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '.'
}

/// `a`, `a.b`, `_x.y2`; no empty segments, no leading digit
pub fn is_dotted_name(name: &str) -> bool {
    !name.is_empty() && name.split('.').all(is_identifier)
}

/// A Python-style identifier
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|ch| ch.is_alphanumeric() || ch == '_')
        }
        _ => false,
    }
}

/// Split call arguments on commas that are outside every bracket and string
pub fn split_arguments(args: &str) -> Vec<&str> {
    let bytes = args.as_bytes();
    let mut state = ScanState::new();
    let mut parts = Vec::new();
    let mut segment_start = 0;

    let mut pos = 0;
    while pos < bytes.len() {
        let (event, consumed) = state.process(bytes, pos);
        if event == ScanEvent::Plain(b',') && state.bracket_depth == 0 {
            push_trimmed(&mut parts, &args[segment_start..pos]);
            segment_start = pos + 1;
        }
        pos += consumed;
    }
    push_trimmed(&mut parts, &args[segment_start..]);

    parts
}

fn push_trimmed<'a>(parts: &mut Vec<&'a str>, segment: &'a str) {
    let segment = segment.trim();
    if !segment.is_empty() {
        parts.push(segment);
    }
}

/// Split one argument as `key = value` on its first top-level `=`.
///
/// Returns `None` for positional arguments, comparisons (`a == b`) and keys
/// that are not identifiers.
pub fn split_keyword(argument: &str) -> Option<(&str, &str)> {
    let bytes = argument.as_bytes();
    let mut state = ScanState::new();

    let mut pos = 0;
    while pos < bytes.len() {
        let (event, consumed) = state.process(bytes, pos);
        if event == ScanEvent::Plain(b'=') && state.bracket_depth == 0 {
            let key = argument[..pos].trim();
            let value = &argument[pos + 1..];
            if value.starts_with('=') || !is_identifier(key) {
                return None;
            }
            return Some((key, value.trim()));
        }
        pos += consumed;
    }
    None
}
