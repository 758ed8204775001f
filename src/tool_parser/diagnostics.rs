//! Reporting of the failures the extractor absorbs.
//!
//! Decoding never fails from the caller's point of view, so everything that
//! went wrong is handed to a [`DiagnosticSink`] instead.
use std::fmt;

use parking_lot::Mutex;
use tracing::{debug, warn};

/// Category of an absorbed failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// A call-shaped span that never closed; it was skipped
    MalformedCall,
    /// An argument value that is not a literal; it was kept as a raw string
    LiteralParseFailure,
    /// Fenced-block mode found no block; the result is empty
    NoCodeBlockFound,
    /// Scanning itself failed; the result is empty
    UnexpectedScanFailure,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiagnosticKind::MalformedCall => "malformed_call",
            DiagnosticKind::LiteralParseFailure => "literal_parse_failure",
            DiagnosticKind::NoCodeBlockFound => "no_code_block_found",
            DiagnosticKind::UnexpectedScanFailure => "unexpected_scan_failure",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Receiver for diagnostics emitted during extraction
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Default sink: scan failures at `warn`, everything else at `debug`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: Diagnostic) {
        match diagnostic.kind {
            DiagnosticKind::UnexpectedScanFailure => {
                warn!(kind = %diagnostic.kind, "{}", diagnostic.message)
            }
            _ => debug!(kind = %diagnostic.kind, "{}", diagnostic.message),
        }
    }
}

/// Sink that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl DiagnosticSink for NoopSink {
    fn report(&self, _diagnostic: Diagnostic) {}
}

/// Sink that keeps diagnostics in memory for later inspection
#[derive(Debug, Default)]
pub struct CollectingSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.lock().clone()
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.diagnostics
            .lock()
            .iter()
            .filter(|d| d.kind == kind)
            .count()
    }

    pub fn clear(&self) {
        self.diagnostics.lock().clear();
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: Diagnostic) {
        self.diagnostics.lock().push(diagnostic);
    }
}
