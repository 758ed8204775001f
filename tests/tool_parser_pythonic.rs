//! Pythonic Parser Integration Tests
//!
//! Tests for the Pythonic parser which handles Python function call syntax

use pycall_extract::tool_parser::{
    serialize_calls, PythonicOptions, PythonicParser, ToolParser, TypedValue,
};
use pycall_extract::ExtractionMode;
use serde_json::json;

#[test]
fn test_pythonic_single_function() {
    let parser = PythonicParser::new();
    let input = r#"[get_weather(city="London", units="celsius")]"#;

    let result = parser.parse_tool_calls(input);
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].function.name, "get_weather");

    let args: serde_json::Value = serde_json::from_str(&result[0].function.arguments).unwrap();
    assert_eq!(args["city"], "London");
    assert_eq!(args["units"], "celsius");
}

#[test]
fn test_pythonic_multiple_functions() {
    let parser = PythonicParser::new();
    let input =
        r#"[search_web(query="Rust programming", max_results=5), get_time(timezone="UTC")]"#;

    let result = parser.parse_tool_calls(input);
    assert_eq!(result.len(), 2);
    assert_eq!(result[0].function.name, "search_web");
    assert_eq!(result[1].function.name, "get_time");

    let args0: serde_json::Value = serde_json::from_str(&result[0].function.arguments).unwrap();
    assert_eq!(args0["query"], "Rust programming");
    assert_eq!(args0["max_results"], 5);
}

#[test]
fn test_pythonic_with_python_literals() {
    let parser = PythonicParser::new();
    let input = r#"[configure(enabled=True, disabled=False, optional=None)]"#;

    let result = parser.parse_tool_calls(input);
    assert_eq!(result.len(), 1);

    let args: serde_json::Value = serde_json::from_str(&result[0].function.arguments).unwrap();
    assert_eq!(args["enabled"], true);
    assert_eq!(args["disabled"], false);
    assert_eq!(args["optional"], json!(null));
}

#[test]
fn test_pythonic_with_lists_and_dicts() {
    let parser = PythonicParser::new();
    let input =
        r#"[process_data(items=[1, 2, 3], config={"key": "value", "nested": {"deep": True}})]"#;

    let result = parser.parse_tool_calls(input);
    assert_eq!(result.len(), 1);

    let args: serde_json::Value = serde_json::from_str(&result[0].function.arguments).unwrap();
    assert_eq!(args["items"], json!([1, 2, 3]));
    assert_eq!(args["config"]["key"], "value");
    assert_eq!(args["config"]["nested"]["deep"], true);
}

#[test]
fn test_pythonic_code_block_with_assignments() {
    let parser = PythonicParser::fenced();
    let input = r#"I'll look both cities up.

```python
paris = get_weather(city="Paris", days=3)
tokyo = get_weather(city='Tokyo', days=1)
```

Done."#;

    let result = parser.parse_complete(input);
    assert_eq!(result.len(), 2);
    assert_eq!(result[0].get("city"), Some(&TypedValue::String("Paris".into())));
    assert_eq!(result[1].get("days"), Some(&TypedValue::Integer(1)));
}

#[test]
fn test_pythonic_dotted_names() {
    let parser = PythonicParser::new();
    let result = parser.parse_complete("math.hypot(x=3, y=4)\nclient.search.run(q='rust')");

    let names: Vec<&str> = result.iter().map(|c| c.function_name.as_str()).collect();
    assert_eq!(names, vec!["math.hypot", "client.search.run"]);
}

#[test]
fn test_pythonic_nested_call_is_argument_value() {
    let parser = PythonicParser::new();
    let result = parser.parse_complete("outer(value=inner(x=1), n=2)");

    assert_eq!(result.len(), 1);
    assert_eq!(result[0].function_name, "outer");
    assert_eq!(
        result[0].get("value"),
        Some(&TypedValue::RawString("inner(x=1)".into()))
    );
    assert_eq!(result[0].get("n"), Some(&TypedValue::Integer(2)));
}

#[test]
fn test_pythonic_brackets_inside_strings() {
    let parser = PythonicParser::new();
    let result = parser.parse_complete(r#"note(text="a) b] c} (d", tag='x,y')"#);

    assert_eq!(result.len(), 1);
    assert_eq!(
        result[0].get("text"),
        Some(&TypedValue::String("a) b] c} (d".into()))
    );
    assert_eq!(result[0].get("tag"), Some(&TypedValue::String("x,y".into())));
}

#[test]
fn test_pythonic_escaped_quotes() {
    let parser = PythonicParser::new();
    let result = parser.parse_complete(r#"say(text="He said \"hi\", then left")"#);

    assert_eq!(result.len(), 1);
    assert_eq!(
        result[0].get("text"),
        Some(&TypedValue::String(r#"He said "hi", then left"#.into()))
    );
}

#[test]
fn test_pythonic_numbers() {
    let parser = PythonicParser::new();
    let result = parser.parse_complete("calc(a=-3, b=2.5, c=1e3, d=-0.5e-2, e=1_000)");

    assert_eq!(result.len(), 1);
    let call = &result[0];
    assert_eq!(call.get("a"), Some(&TypedValue::Integer(-3)));
    assert_eq!(call.get("b"), Some(&TypedValue::Float(2.5)));
    assert_eq!(call.get("c"), Some(&TypedValue::Float(1000.0)));
    assert_eq!(call.get("d"), Some(&TypedValue::Float(-0.005)));
    assert_eq!(call.get("e"), Some(&TypedValue::Integer(1000)));
}

#[test]
fn test_pythonic_integer_literals_stay_exact() {
    let parser = PythonicParser::new();
    let calls =
        parser.parse_complete("f(n=12345678901234567890, mask=0x1F, mode=0o17, bits=0b101)");

    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].get("n"),
        Some(&TypedValue::BigInteger("12345678901234567890".into()))
    );
    assert_eq!(calls[0].get("mask"), Some(&TypedValue::Integer(31)));
    assert_eq!(
        serialize_calls(&calls),
        vec!["f(n=12345678901234567890, mask=31, mode=15, bits=5)"]
    );

    // Leading zeros are not a Python integer
    let calls = parser.parse_complete("f(code=007)");
    assert_eq!(calls[0].get("code"), Some(&TypedValue::RawString("007".into())));
}

#[test]
fn test_pythonic_canonical_strings() {
    let parser = PythonicParser::new();
    let calls = parser.parse_complete(
        r#"book(seats = [1,2], meta = {"vip" : true}, note = "it's", ratio=1.50, big=1e16)"#,
    );

    assert_eq!(
        serialize_calls(&calls),
        vec![r#"book(seats=[1, 2], meta='{"vip" : true}', note="it's", ratio=1.5, big=1e+16)"#]
    );
}

#[test]
fn test_pythonic_fence_language_option() {
    let parser = PythonicParser::with_options(PythonicOptions {
        mode: ExtractionMode::FencedBlock,
        fence_language: Some("python".to_string()),
        ..PythonicOptions::default()
    });
    let input = "```\nplain(x=1)\n```\n```python\ntagged(y=2)\n```";

    let result = parser.parse_complete(input);
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].function_name, "tagged");
}
