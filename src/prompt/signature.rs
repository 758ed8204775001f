//! Rendering of JSON function schemas as Python-style declarations.
//!
//! ```text
//! def get_weather(city: str, unit: Optional[Literal['c', 'f']] = None):
//!     """Current weather for a city
//!
//!     Args:
//!         city: City name
//!     """
//! ```
use crate::{
    prompt::schema::{FunctionSchema, ParameterSchema},
    tool_parser::{python_repr, TypedValue},
};

const INDENT: &str = "    ";

/// Python annotation for a parameter; `enum` overrides the declared type
pub fn python_type(param: &ParameterSchema) -> String {
    if let Some(values) = param.enum_values.as_ref().filter(|values| !values.is_empty()) {
        let literals = values
            .iter()
            .map(|value| python_repr(&TypedValue::from(value)))
            .collect::<Vec<_>>()
            .join(", ");
        return format!("Literal[{}]", literals);
    }

    match param.type_name.as_deref() {
        Some("integer") => "int".to_string(),
        Some("string") => "str".to_string(),
        Some("number") => "float".to_string(),
        Some("boolean") => "bool".to_string(),
        Some("array") => match &param.items {
            Some(items) => format!("List[{}]", python_type(items)),
            None => "List[Any]".to_string(),
        },
        _ => "Any".to_string(),
    }
}

/// `def name(...):` followed by a docstring with an `Args:` section
pub fn format_signature(function: &FunctionSchema) -> String {
    let params = function
        .parameters
        .properties
        .iter()
        .map(|(name, param)| {
            let annotation = python_type(param);
            if function.is_required(name) {
                format!("{}: {}", name, annotation)
            } else {
                format!("{}: Optional[{}] = None", name, annotation)
            }
        })
        .collect::<Vec<_>>()
        .join(", ");

    let mut out = format!("def {}({}):\n", function.name, params);
    out.push_str(&docstring(function));
    out
}

/// Every signature, separated by a blank line
pub fn format_signatures(functions: &[FunctionSchema]) -> String {
    functions
        .iter()
        .map(format_signature)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn docstring(function: &FunctionSchema) -> String {
    let args: Vec<(&str, &str)> = function
        .parameters
        .properties
        .iter()
        .filter_map(|(name, param)| {
            param
                .description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(|d| (name.as_str(), d))
        })
        .collect();

    let description = escape_docstring(function.description.trim());

    if args.is_empty() {
        return format!("{}\"\"\"{}\"\"\"", INDENT, indent_continuation(&description, INDENT));
    }

    let mut out = format!("{}\"\"\"", INDENT);
    if !description.is_empty() {
        out.push_str(&indent_continuation(&description, INDENT));
        out.push_str("\n\n");
        out.push_str(INDENT);
    }
    out.push_str("Args:\n");

    let arg_indent = INDENT.repeat(2);
    let continuation = INDENT.repeat(3);
    for (name, text) in args {
        let text = escape_docstring(text);
        out.push_str(&format!(
            "{}{}: {}\n",
            arg_indent,
            name,
            indent_continuation(&text, &continuation)
        ));
    }
    out.push_str(INDENT);
    out.push_str("\"\"\"");
    out
}

/// Indent every line after the first
fn indent_continuation(text: &str, indent: &str) -> String {
    text.lines()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 || line.is_empty() {
                line.to_string()
            } else {
                format!("{}{}", indent, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn escape_docstring(text: &str) -> String {
    text.replace('\\', "\\\\").replace("\"\"\"", "\\\"\\\"\\\"")
}
