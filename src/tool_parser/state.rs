/// What a single step of the scanner saw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanEvent {
    /// `(`, `[` or `{` outside a string
    Open(u8),
    /// `)`, `]` or `}` outside a string
    Close(u8),
    /// Any other byte outside a string
    Plain(u8),
    /// Byte(s) belonging to a string literal, including its quotes
    Quoted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenQuote {
    ch: u8,
    triple: bool,
}

/// Bracket depth and string tracking shared by the call scanner and the
/// argument splitter.
///
/// Operates on bytes: every delimiter is ASCII, so positions where it reports
/// structure are always valid `str` boundaries.
#[derive(Debug, Clone, Default)]
pub struct ScanState {
    /// Net count of open brackets of any kind, never negative
    pub bracket_depth: usize,
    quote: Option<OpenQuote>,
    escape_next: bool,
    /// Whether a quote outside a string opens one
    quotes_active: bool,
}

impl ScanState {
    /// State that recognizes strings at every depth
    pub fn new() -> Self {
        Self {
            quotes_active: true,
            ..Self::default()
        }
    }

    /// State for free text: quotes are inert until [`Self::set_quotes_active`]
    /// turns them on, so apostrophes in prose cannot swallow the rest of the text
    pub fn prose() -> Self {
        Self::default()
    }

    /// Only affects quotes seen from now on; an open string stays open
    pub fn set_quotes_active(&mut self, active: bool) {
        self.quotes_active = active;
    }

    pub fn in_string(&self) -> bool {
        self.quote.is_some()
    }

    /// Outside every bracket and string
    pub fn is_top_level(&self) -> bool {
        self.bracket_depth == 0 && self.quote.is_none()
    }

    /// Process the byte at `pos` and return the event plus the number of
    /// bytes consumed (3 for triple quotes, 1 otherwise).
    pub fn process(&mut self, bytes: &[u8], pos: usize) -> (ScanEvent, usize) {
        let byte = bytes[pos];
        let repeats_twice =
            |ch: u8| bytes.get(pos + 1) == Some(&ch) && bytes.get(pos + 2) == Some(&ch);

        if let Some(quote) = self.quote {
            if self.escape_next {
                self.escape_next = false;
                return (ScanEvent::Quoted, 1);
            }
            return match byte {
                b'\\' => {
                    self.escape_next = true;
                    (ScanEvent::Quoted, 1)
                }
                // Single-quoted strings cannot span lines
                b'\n' if !quote.triple => {
                    self.quote = None;
                    (ScanEvent::Plain(byte), 1)
                }
                _ if byte == quote.ch && !quote.triple => {
                    self.quote = None;
                    (ScanEvent::Quoted, 1)
                }
                _ if byte == quote.ch && repeats_twice(byte) => {
                    self.quote = None;
                    (ScanEvent::Quoted, 3)
                }
                _ => (ScanEvent::Quoted, 1),
            };
        }

        match byte {
            b'"' | b'\'' if self.quotes_active => {
                let triple = repeats_twice(byte);
                self.quote = Some(OpenQuote { ch: byte, triple });
                (ScanEvent::Quoted, if triple { 3 } else { 1 })
            }
            b'(' | b'[' | b'{' => {
                self.bracket_depth += 1;
                (ScanEvent::Open(byte), 1)
            }
            b')' | b']' | b'}' => {
                self.bracket_depth = self.bracket_depth.saturating_sub(1);
                (ScanEvent::Close(byte), 1)
            }
            _ => (ScanEvent::Plain(byte), 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(state: &mut ScanState, text: &str) -> Vec<ScanEvent> {
        let bytes = text.as_bytes();
        let mut events = Vec::new();
        let mut pos = 0;
        while pos < bytes.len() {
            let (event, consumed) = state.process(bytes, pos);
            events.push(event);
            pos += consumed;
        }
        events
    }

    #[test]
    fn test_bracket_tracking() {
        let mut state = ScanState::new();
        run(&mut state, "([{");
        assert_eq!(state.bracket_depth, 3);
        run(&mut state, "}])");
        assert_eq!(state.bracket_depth, 0);
        // Extra closers never go negative
        run(&mut state, ")]");
        assert_eq!(state.bracket_depth, 0);
        assert!(state.is_top_level());
    }

    #[test]
    fn test_string_tracking() {
        let mut state = ScanState::new();
        run(&mut state, r#""a(b"#);
        assert!(state.in_string());
        assert_eq!(state.bracket_depth, 0);

        // Other quote character is inert, escaped quote does not close
        run(&mut state, r#"'\""#);
        assert!(state.in_string());

        run(&mut state, r#"""#);
        assert!(!state.in_string());
    }

    #[test]
    fn test_triple_quotes() {
        let mut state = ScanState::new();
        let events = run(&mut state, "'''a\n'b'''");
        assert!(!state.in_string());
        assert!(events.iter().all(|e| *e == ScanEvent::Quoted));
    }

    #[test]
    fn test_newline_ends_single_quoted_string() {
        let mut state = ScanState::new();
        run(&mut state, "'unterminated\n");
        assert!(!state.in_string());
    }

    #[test]
    fn test_prose_quotes_are_inert_until_enabled() {
        let mut state = ScanState::prose();
        run(&mut state, "it's (it's");
        assert!(!state.in_string());
        assert_eq!(state.bracket_depth, 1);

        state.set_quotes_active(true);
        run(&mut state, "'x");
        assert!(state.in_string());

        // Disabling does not close the open string
        state.set_quotes_active(false);
        run(&mut state, ")");
        assert!(state.in_string());
        assert_eq!(state.bracket_depth, 1);
    }
}
