//! Fail-fast error types for the two public checked entry points.
//!
//! [`lex`](crate::lex) and [`parse`](crate::parse) themselves never fail:
//! they accumulate diagnostics into a [`DiagnosticSink`] and recover with
//! `Error` tokens/nodes so every problem in a file can be reported at once.
//! Tooling that just wants to know whether a file compiles needs a
//! stricter contract on the two public boundary functions: stop at the
//! *first* error and surface it as a structured `(line, column, message)`
//! value with no recovery. [`lex_checked`] and [`parse_checked`] provide
//! that contract by running the recovering implementation and converting
//! the first error-severity diagnostic emitted into one of these types.

use aion_diagnostics::{Diagnostic, DiagnosticSink, TerminalRenderer, DiagnosticRenderer, Severity};
use aion_source::{FileId, SourceDb};
use thiserror::Error;

/// Raised by [`lex_checked`] on the first unexpected character after
/// whitespace/comment skipping.
#[derive(Debug, Clone, Error)]
#[error("{rendered}")]
pub struct LexerError {
    /// 1-indexed source line of the offending character.
    pub line: u32,
    /// 1-indexed source column of the offending character.
    pub column: u32,
    /// The diagnostic message (without position or caret rendering).
    pub message: String,
    /// The caret-annotated rendering of the error.
    pub rendered: String,
}

/// Raised by [`parse_checked`] on the first unexpected token given the
/// grammar state.
#[derive(Debug, Clone, Error)]
#[error("{rendered}")]
pub struct ParseError {
    /// 1-indexed source line of the offending token.
    pub line: u32,
    /// 1-indexed source column of the offending token.
    pub column: u32,
    /// The diagnostic message (without position or caret rendering).
    pub message: String,
    /// The caret-annotated rendering of the error.
    pub rendered: String,
}

/// Renders the first error-severity diagnostic in `sink` (in emission
/// order) against `source`, returning `(line, column, message, rendered)`.
///
/// Returns `None` if `sink` holds no error-severity diagnostic. A fresh
/// single-file [`SourceDb`] is always assigned `FileId(0)` by
/// [`SourceDb::add_source`]; the diagnostic's span is re-homed onto it so
/// rendering works regardless of which `FileId` the caller lexed/parsed
/// under.
fn first_error_rendered(sink: &DiagnosticSink, source: &str) -> Option<(u32, u32, String, String)> {
    let mut diag = sink.diagnostics().into_iter().find(|d| d.severity == Severity::Error)?;
    let mut db = SourceDb::new();
    let reassigned = db.add_source("<source>", source.to_string());
    diag.primary_span.file = reassigned;
    let (line, col) = db.get_file(reassigned).line_col(diag.primary_span.start);
    let rendered = TerminalRenderer::new(false, 120).render(&diag, &db);
    Some((line, col, diag.message.clone(), rendered))
}

/// Lexes `source` with a first-error-halts contract.
///
/// Internally reuses [`crate::lexer::lex`]'s recovering scan, but reports
/// only the first `LexerError` encountered (`E100`) and discards the token
/// stream in that case — a caller sees exactly the single-error contract
/// the caller needs, not a partially recovered stream.
pub fn lex_checked(source: &str, file: FileId) -> Result<Vec<crate::token::Token>, LexerError> {
    let sink = DiagnosticSink::new();
    let tokens = crate::lexer::lex(source, file, &sink);
    match first_error_rendered(&sink, source) {
        Some((line, column, message, rendered)) => Err(LexerError { line, column, message, rendered }),
        None => Ok(tokens),
    }
}

/// Parses `source` with a first-error-halts contract.
///
/// Internally reuses [`crate::parse`]'s recovering lex-then-parse pipeline,
/// but reports only the first error encountered — whether raised by the
/// lexer (`E100`) or the parser (`E101`) — as a single `ParseError`. No
/// error is caught and rewrapped along the way: the first one halts.
pub fn parse_checked(
    source: &str,
    file: FileId,
    interner: &aion_common::Interner,
) -> Result<crate::ast::VerilogSourceFile, ParseError> {
    let sink = DiagnosticSink::new();
    let source_file = crate::parse(source, file, interner, &sink);
    match first_error_rendered(&sink, source) {
        Some((line, column, message, rendered)) => Err(ParseError { line, column, message, rendered }),
        None => Ok(source_file),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aion_common::Interner;

    #[test]
    fn lex_checked_succeeds_on_clean_source() {
        let tokens = lex_checked("module top; endmodule", FileId::from_raw(0)).unwrap();
        assert!(!tokens.is_empty());
    }

    #[test]
    fn lex_checked_fails_on_unexpected_character() {
        let err = lex_checked("module top; \u{1} endmodule", FileId::from_raw(0)).unwrap_err();
        assert_eq!(err.line, 1);
        assert!(err.rendered.contains('^'));
    }

    #[test]
    fn parse_checked_succeeds_on_clean_source() {
        let interner = Interner::new();
        let sf = parse_checked(
            "module top(input a, output b); assign b = a; endmodule",
            FileId::from_raw(0),
            &interner,
        )
        .unwrap();
        assert_eq!(sf.items.len(), 1);
    }

    #[test]
    fn parse_checked_fails_on_first_error_only() {
        let interner = Interner::new();
        // Two separate problems: a missing semicolon, then a bogus token.
        // Only the first should surface.
        let err = parse_checked(
            "module top(input a, output b) assign b = a; endmodule",
            FileId::from_raw(0),
            &interner,
        )
        .unwrap_err();
        assert_eq!(err.line, 1);
        assert!(err.rendered.contains('^'));
    }
}
