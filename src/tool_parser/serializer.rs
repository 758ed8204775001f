//! Canonical `name(key=value, ...)` rendering of extracted calls.
//!
//! Values are rendered the way Python's `repr` renders them, so the output can
//! be fed back through the extractor and yields the same records.
use std::fmt::Write;

use crate::tool_parser::types::{CallRecord, TypedValue};

/// Render one call as `name(k1=v1, k2=v2)`, arguments in record order
pub fn serialize_call(record: &CallRecord) -> String {
    let args = record
        .arguments
        .iter()
        .map(|(name, value)| format!("{}={}", name, python_repr(value)))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{}({})", record.function_name, args)
}

/// Render every call, order preserved
pub fn serialize_calls(records: &[CallRecord]) -> Vec<String> {
    records.iter().map(serialize_call).collect()
}

/// Python `repr` of a value
pub fn python_repr(value: &TypedValue) -> String {
    let mut out = String::new();
    write_repr(&mut out, value);
    out
}

fn write_repr(out: &mut String, value: &TypedValue) {
    match value {
        TypedValue::Integer(i) => {
            let _ = write!(out, "{}", i);
        }
        TypedValue::BigInteger(digits) => out.push_str(digits),
        TypedValue::Float(f) => out.push_str(&float_repr(*f)),
        TypedValue::Boolean(true) => out.push_str("True"),
        TypedValue::Boolean(false) => out.push_str("False"),
        TypedValue::None => out.push_str("None"),
        TypedValue::String(s) | TypedValue::RawString(s) => write_string_repr(out, s),
        TypedValue::List(items) => {
            out.push('[');
            write_items(out, items);
            out.push(']');
        }
        TypedValue::Tuple(items) => {
            out.push('(');
            write_items(out, items);
            if items.len() == 1 {
                out.push(',');
            }
            out.push(')');
        }
        TypedValue::Dict(entries) => {
            out.push('{');
            for (i, (key, value)) in entries.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_repr(out, key);
                out.push_str(": ");
                write_repr(out, value);
            }
            out.push('}');
        }
    }
}

fn write_items(out: &mut String, items: &[TypedValue]) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_repr(out, item);
    }
}

/// Single quotes unless the text has `'` and no `"`, like CPython
fn write_string_repr(out: &mut String, s: &str) {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };

    out.push(quote);
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => {
                let code = c as u32;
                let _ = match code {
                    0..=0xff => write!(out, "\\x{:02x}", code),
                    0x100..=0xffff => write!(out, "\\u{:04x}", code),
                    _ => write!(out, "\\U{:08x}", code),
                };
            }
            c => out.push(c),
        }
    }
    out.push(quote);
}

/// Shortest round-trip digits, exponent form outside `1e-4 <= |f| < 1e16`
fn float_repr(f: f64) -> String {
    if f.is_nan() {
        return "nan".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let scientific = format!("{:e}", f);
    let (mantissa, exponent) = scientific
        .split_once('e')
        .unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if f == 0.0 || (-4..16).contains(&exponent) {
        let mut plain = format!("{}", f);
        if !plain.contains('.') {
            plain.push_str(".0");
        }
        plain
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exponent.abs())
    }
}
