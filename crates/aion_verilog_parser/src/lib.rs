//! Hand-rolled recursive descent parser for Verilog-2005.
//!
//! This crate provides a full Verilog-2005 lexer and parser with error
//! recovery, producing an AST with source spans for all nodes, plus a
//! numeric-literal value resolver. [`lex`] and [`parse`] never fail the
//! whole file on a single error: malformed constructs become `Error`
//! tokens/nodes so a caller that wants every problem in a file reported at
//! once (e.g. an IDE) gets that. [`lex_checked`](error::lex_checked) and
//! [`parse_checked`](error::parse_checked) give callers that just want to
//! know whether a file compiles a stricter first-error-halts contract,
//! wrapping the same recovering implementation.

#![warn(missing_docs)]

pub mod ast;
mod decl;
pub mod error;
mod expr;
pub mod lexer;
pub mod literal;
pub mod parser;
mod stmt;
pub mod token;

pub use ast::{VerilogItem, VerilogSourceFile};
pub use error::{lex_checked, parse_checked, LexerError, ParseError};
pub use lexer::lex;
pub use literal::{resolve_integer_literal, ResolvedLiteral};
pub use parser::VerilogParser;
pub use token::{Token, VerilogToken};

use aion_common::Interner;
use aion_diagnostics::DiagnosticSink;
use aion_source::FileId;

/// Lexes and parses a Verilog-2005 source file in one step.
///
/// Diagnostics encountered along the way are reported to `sink`; the
/// returned AST may contain `Error` nodes where recovery occurred.
pub fn parse(source: &str, file: FileId, interner: &Interner, sink: &DiagnosticSink) -> VerilogSourceFile {
    let tokens = lexer::lex(source, file, sink);
    let mut parser = VerilogParser::new(tokens, source, file, interner, sink);
    parser.parse_source_file()
}
