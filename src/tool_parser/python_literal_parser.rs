/// Minimal Python literal parser for pythonic call arguments
///
/// This module provides a recursive descent parser for Python literals
/// (strings, numbers, booleans, None, lists, tuples, dicts) without
/// evaluating arbitrary expressions. Anything outside that grammar is a
/// parse failure, and [`parse_argument_value`] degrades it to a raw string.
use indexmap::IndexMap;
use tracing::debug;

use crate::tool_parser::{
    errors::{ParserError, ParserResult},
    serializer::python_repr,
    types::TypedValue,
};

/// Default cap on container nesting inside a single literal
pub const DEFAULT_MAX_LITERAL_DEPTH: usize = 64;

/// Token types for Python literals
#[derive(Debug, Clone, PartialEq)]
enum Token {
    // Literals
    String(String),
    Number(String),
    True,
    False,
    None,

    // Delimiters
    LeftBracket,  // [
    RightBracket, // ]
    LeftBrace,    // {
    RightBrace,   // }
    LeftParen,    // (
    RightParen,   // )
    Comma,        // ,
    Colon,        // :

    // Any other name; never valid as a value
    Identifier(String),

    // End of input
    Eof,
}

/// Lexer for Python literals
struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        if self.position < self.input.len() {
            self.position += 1;
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_hex_escape(&mut self, digits: usize) -> Option<char> {
        let mut code = 0u32;
        for offset in 0..digits {
            let digit = self.peek_char(offset)?.to_digit(16)?;
            code = code * 16 + digit;
        }
        let ch = char::from_u32(code)?;
        for _ in 0..digits {
            self.advance();
        }
        Some(ch)
    }

    fn read_string(&mut self, quote_char: char) -> ParserResult<String> {
        let start = self.position;
        let triple =
            self.peek_char(1) == Some(quote_char) && self.peek_char(2) == Some(quote_char);
        let quote_len = if triple { 3 } else { 1 };
        for _ in 0..quote_len {
            self.advance();
        }

        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch == '\\' {
                self.advance();
                let Some(escaped) = self.current_char() else {
                    break;
                };
                self.advance();
                match escaped {
                    'n' => result.push('\n'),
                    't' => result.push('\t'),
                    'r' => result.push('\r'),
                    '0' => result.push('\0'),
                    'a' => result.push('\u{07}'),
                    'b' => result.push('\u{08}'),
                    'f' => result.push('\u{0C}'),
                    'v' => result.push('\u{0B}'),
                    '\\' => result.push('\\'),
                    '\'' => result.push('\''),
                    '"' => result.push('"'),
                    '\n' => {}
                    'x' | 'u' | 'U' => {
                        let digits = match escaped {
                            'x' => 2,
                            'u' => 4,
                            _ => 8,
                        };
                        match self.read_hex_escape(digits) {
                            Some(decoded) => result.push(decoded),
                            None => {
                                result.push('\\');
                                result.push(escaped);
                            }
                        }
                    }
                    _ => {
                        result.push('\\');
                        result.push(escaped);
                    }
                }
            } else if ch == quote_char
                && (!triple
                    || (self.peek_char(1) == Some(quote_char)
                        && self.peek_char(2) == Some(quote_char)))
            {
                for _ in 0..quote_len {
                    self.advance();
                }
                return Ok(result);
            } else if ch == '\n' && !triple {
                break;
            } else {
                result.push(ch);
                self.advance();
            }
        }

        Err(ParserError::UnterminatedString(start))
    }

    fn read_number(&mut self) -> String {
        let mut result = String::new();

        // Leading sign
        if let Some(sign @ ('-' | '+')) = self.current_char() {
            result.push(sign);
            self.advance();
        }

        // 0x / 0o / 0b integers; digits are validated when the token is parsed
        let radix_prefix = self.current_char() == Some('0')
            && matches!(self.peek_char(1), Some('x' | 'X' | 'o' | 'O' | 'b' | 'B'));
        if radix_prefix {
            while let Some(ch) = self.current_char() {
                if !(ch.is_ascii_alphanumeric() || ch == '_') {
                    break;
                }
                result.push(ch);
                self.advance();
            }
            return result;
        }

        // Digits, decimal point, exponent and digit separators
        while let Some(ch) = self.current_char() {
            let exponent_sign = (ch == '+' || ch == '-') && result.ends_with(&['e', 'E'][..]);
            let number_char = ch.is_ascii_digit() || matches!(ch, '.' | 'e' | 'E' | '_');
            if number_char || exponent_sign {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        result
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();

        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        result
    }

    fn starts_number(&self, ch: char) -> bool {
        let next_is_digit = |offset| {
            self.peek_char(offset)
                .is_some_and(|c: char| c.is_ascii_digit())
        };
        match ch {
            c if c.is_ascii_digit() => true,
            '.' => next_is_digit(1),
            '-' | '+' => {
                next_is_digit(1) || (self.peek_char(1) == Some('.') && next_is_digit(2))
            }
            _ => false,
        }
    }

    fn next_token(&mut self) -> ParserResult<Token> {
        self.skip_whitespace();

        let token = match self.current_char() {
            None => return Ok(Token::Eof),
            Some('[') => Token::LeftBracket,
            Some(']') => Token::RightBracket,
            Some('{') => Token::LeftBrace,
            Some('}') => Token::RightBrace,
            Some('(') => Token::LeftParen,
            Some(')') => Token::RightParen,
            Some(',') => Token::Comma,
            Some(':') => Token::Colon,
            Some(quote @ ('"' | '\'')) => return Ok(Token::String(self.read_string(quote)?)),
            Some(ch) if self.starts_number(ch) => return Ok(Token::Number(self.read_number())),
            Some(ch) if ch.is_alphabetic() || ch == '_' => {
                let ident = self.read_identifier();
                return Ok(match ident.as_str() {
                    "True" => Token::True,
                    "False" => Token::False,
                    "None" => Token::None,
                    _ => Token::Identifier(ident),
                });
            }
            Some(ch) => {
                return Err(ParserError::ParsingFailed(format!(
                    "Unexpected character: {}",
                    ch
                )))
            }
        };
        self.advance();
        Ok(token)
    }
}

/// Parser for Python literals
pub struct PythonLiteralParser {
    lexer: Lexer,
    current_token: Token,
    depth: usize,
    max_depth: usize,
}

impl PythonLiteralParser {
    pub fn new(input: &str, max_depth: usize) -> ParserResult<Self> {
        let mut lexer = Lexer::new(input);
        let current_token = lexer.next_token()?;
        Ok(Self {
            lexer,
            current_token,
            depth: 0,
            max_depth,
        })
    }

    fn advance(&mut self) -> ParserResult<()> {
        self.current_token = self.lexer.next_token()?;
        Ok(())
    }

    fn expect(&mut self, expected: Token) -> ParserResult<()> {
        if self.current_token == expected {
            self.advance()
        } else {
            Err(ParserError::ParsingFailed(format!(
                "Expected {:?}, got {:?}",
                expected, self.current_token
            )))
        }
    }

    fn enter(&mut self) -> ParserResult<()> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(ParserError::DepthExceeded(self.max_depth));
        }
        Ok(())
    }

    /// Parse the whole input as exactly one literal
    pub fn parse_complete(&mut self) -> ParserResult<TypedValue> {
        let value = self.parse_value()?;
        if self.current_token != Token::Eof {
            return Err(ParserError::ParsingFailed(format!(
                "Trailing input after literal: {:?}",
                self.current_token
            )));
        }
        Ok(value)
    }

    /// Parse a Python literal value
    pub fn parse_value(&mut self) -> ParserResult<TypedValue> {
        match std::mem::replace(&mut self.current_token, Token::Eof) {
            Token::String(s) => {
                self.advance()?;
                // Adjacent literals concatenate: "a" "b" == "ab"
                let mut value = s;
                while let Token::String(next) = &self.current_token {
                    value.push_str(next);
                    self.advance()?;
                }
                Ok(TypedValue::String(value))
            }
            Token::Number(n) => {
                let value = parse_number(&n)?;
                self.advance()?;
                Ok(value)
            }
            Token::True => {
                self.advance()?;
                Ok(TypedValue::Boolean(true))
            }
            Token::False => {
                self.advance()?;
                Ok(TypedValue::Boolean(false))
            }
            Token::None => {
                self.advance()?;
                Ok(TypedValue::None)
            }
            token @ (Token::LeftBracket | Token::LeftBrace | Token::LeftParen) => {
                self.current_token = token.clone();
                self.enter()?;
                let value = match token {
                    Token::LeftBracket => self.parse_list(),
                    Token::LeftBrace => self.parse_dict(),
                    _ => self.parse_tuple(),
                };
                self.depth -= 1;
                value
            }
            token => Err(ParserError::ParsingFailed(format!(
                "Unexpected token: {:?}",
                token
            ))),
        }
    }

    /// Parse a Python list: [item1, item2, ...]
    fn parse_list(&mut self) -> ParserResult<TypedValue> {
        self.expect(Token::LeftBracket)?;
        let items = self.parse_sequence(Token::RightBracket)?;
        Ok(TypedValue::List(items))
    }

    /// Parse a tuple `(a, b)`, `(a,)`, `()`, or a parenthesized value `(a)`
    fn parse_tuple(&mut self) -> ParserResult<TypedValue> {
        self.expect(Token::LeftParen)?;

        if self.current_token == Token::RightParen {
            self.advance()?;
            return Ok(TypedValue::Tuple(Vec::new()));
        }

        let first = self.parse_value()?;
        match self.current_token {
            Token::RightParen => {
                self.advance()?;
                Ok(first)
            }
            Token::Comma => {
                self.advance()?;
                let mut items = vec![first];
                items.extend(self.parse_sequence(Token::RightParen)?);
                Ok(TypedValue::Tuple(items))
            }
            _ => Err(ParserError::ParsingFailed(format!(
                "Expected ',' or ')', got {:?}",
                self.current_token
            ))),
        }
    }

    /// Comma separated values up to and including `close`, trailing comma allowed
    fn parse_sequence(&mut self, close: Token) -> ParserResult<Vec<TypedValue>> {
        let mut items = Vec::new();

        loop {
            if self.current_token == close {
                break;
            }

            items.push(self.parse_value()?);

            if self.current_token == Token::Comma {
                self.advance()?;
            } else if self.current_token != close {
                return Err(ParserError::ParsingFailed(format!(
                    "Expected ',' or {:?}, got {:?}",
                    close, self.current_token
                )));
            }
        }

        self.expect(close)?;
        Ok(items)
    }

    /// Parse a Python dict: {key1: value1, key2: value2, ...}
    fn parse_dict(&mut self) -> ParserResult<TypedValue> {
        self.expect(Token::LeftBrace)?;
        let mut entries: Vec<(TypedValue, TypedValue)> = Vec::new();
        // repr(key) -> entry index, so a repeated key overwrites in place
        let mut index: IndexMap<String, usize> = IndexMap::new();

        loop {
            if self.current_token == Token::RightBrace {
                break;
            }

            let key = self.parse_value()?;
            if matches!(key, TypedValue::List(_) | TypedValue::Dict(_)) {
                return Err(ParserError::ParsingFailed(format!(
                    "Unhashable dict key: {}",
                    python_repr(&key)
                )));
            }

            self.expect(Token::Colon)?;
            let value = self.parse_value()?;

            let key_repr = python_repr(&key);
            match index.get(&key_repr) {
                Some(&pos) => entries[pos].1 = value,
                None => {
                    index.insert(key_repr, entries.len());
                    entries.push((key, value));
                }
            }

            if self.current_token == Token::Comma {
                self.advance()?;
            } else if self.current_token != Token::RightBrace {
                return Err(ParserError::ParsingFailed(format!(
                    "Expected ',' or '}}', got {:?}",
                    self.current_token
                )));
            }
        }

        self.expect(Token::RightBrace)?;
        Ok(TypedValue::Dict(entries))
    }
}

fn parse_number(text: &str) -> ParserResult<TypedValue> {
    let invalid = || ParserError::InvalidNumber(text.to_string());
    let (negative, body) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let radix = match body.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        // A single separator may follow the prefix: 0x_ff
        let digits = body[2..].strip_prefix('_').unwrap_or(&body[2..]);
        let in_radix = digits.chars().all(|ch| ch == '_' || ch.is_digit(radix));
        if !in_radix || !valid_separators(digits) {
            return Err(invalid());
        }
        let decimal = radix_to_decimal(&digits.replace('_', ""), radix).ok_or_else(invalid)?;
        return Ok(integer_value(negative, &decimal));
    }

    if !valid_separators(body) {
        return Err(invalid());
    }
    let cleaned = body.replace('_', "");

    if !cleaned.is_empty() && cleaned.bytes().all(|b| b.is_ascii_digit()) {
        // Python rejects 007 but accepts 000
        if cleaned.starts_with('0') && cleaned.bytes().any(|b| b != b'0') {
            return Err(invalid());
        }
        return Ok(integer_value(negative, &cleaned));
    }

    let sign = if negative { "-" } else { "" };
    format!("{}{}", sign, cleaned)
        .parse::<f64>()
        .map(TypedValue::Float)
        .map_err(|_| invalid())
}

/// Underscores only between digits, never doubled
fn valid_separators(digits: &str) -> bool {
    !digits.is_empty()
        && !digits.starts_with('_')
        && !digits.ends_with('_')
        && !digits.contains("__")
}

/// `Integer` when it fits in 64 bits, otherwise the exact decimal text
fn integer_value(negative: bool, digits: &str) -> TypedValue {
    let digits = digits.trim_start_matches('0');
    let digits = if digits.is_empty() { "0" } else { digits };
    let signed = if negative && digits != "0" {
        format!("-{}", digits)
    } else {
        digits.to_string()
    };
    match signed.parse::<i64>() {
        Ok(value) => TypedValue::Integer(value),
        Err(_) => TypedValue::BigInteger(signed),
    }
}

/// Decimal digits of a non-empty digit string in `radix`
fn radix_to_decimal(digits: &str, radix: u32) -> Option<String> {
    const LIMB: u64 = 1_000_000_000;
    // Little-endian base 10^9 limbs
    let mut limbs: Vec<u64> = vec![0];
    for ch in digits.chars() {
        let mut carry = u64::from(ch.to_digit(radix)?);
        for limb in limbs.iter_mut() {
            let value = *limb * u64::from(radix) + carry;
            *limb = value % LIMB;
            carry = value / LIMB;
        }
        if carry > 0 {
            limbs.push(carry);
        }
    }

    let mut out = String::new();
    for (i, limb) in limbs.iter().rev().enumerate() {
        if i == 0 {
            out.push_str(&limb.to_string());
        } else {
            out.push_str(&format!("{:09}", limb));
        }
    }
    (!digits.is_empty()).then_some(out)
}

/// Parse a Python literal string into a typed value
pub fn parse_python_literal(input: &str, max_depth: usize) -> ParserResult<TypedValue> {
    let mut parser = PythonLiteralParser::new(input, max_depth)?;
    parser.parse_complete()
}

/// Strip one layer of matching `"` or `'` quotes
pub fn strip_matching_quotes(text: &str) -> &str {
    let bytes = text.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &text[1..text.len() - 1];
        }
    }
    text
}

/// Turn the text after `=` into a value.
///
/// Literal evaluation gets the raw text first; `true`/`false` in any case are
/// booleans; anything else is kept as a raw string with one layer of
/// surrounding quotes removed.
pub fn parse_argument_value(raw: &str, max_depth: usize) -> TypedValue {
    let text = raw.trim();

    match parse_python_literal(text, max_depth) {
        Ok(value) => value,
        Err(err) => {
            if text.eq_ignore_ascii_case("true") {
                return TypedValue::Boolean(true);
            }
            if text.eq_ignore_ascii_case("false") {
                return TypedValue::Boolean(false);
            }
            debug!(value = text, error = %err, "Argument is not a literal, keeping raw text");
            TypedValue::RawString(strip_matching_quotes(text).to_string())
        }
    }
}
