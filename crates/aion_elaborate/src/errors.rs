//! Diagnostic codes, helper functions, and the fail-fast error type for
//! elaboration.
//!
//! Error codes `E200`--`E210` cover elaboration failures (unknown modules,
//! duplicate signals, undefined signals, etc.). Warning codes `W200`--`W201`
//! cover non-fatal issues (width mismatches, unconnected ports). Unlike
//! lexing/parsing, elaboration is fail-fast: the first [`ElaborationError`]
//! halts the pass rather than accumulating in a [`DiagnosticSink`](aion_diagnostics::DiagnosticSink).

use aion_diagnostics::{Category, Diagnostic, DiagnosticCode};
use aion_ir::NetlistError;
use aion_source::Span;
use thiserror::Error;

/// Unknown module referenced in instantiation.
pub const E200: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 200,
};

/// Port count or name mismatch in instantiation.
pub const E201: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 201,
};

/// Duplicate module name across source files.
pub const E202: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 202,
};

/// Duplicate signal name within a module.
pub const E203: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 203,
};

/// Reference to an unknown signal.
pub const E204: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 204,
};

/// Type mismatch in assignment or connection.
pub const E205: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 205,
};

/// Top-level module not found in any source file.
pub const E206: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 206,
};

/// Circular instantiation detected.
pub const E207: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 207,
};

/// Unknown port name in instantiation connection.
pub const E208: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 208,
};

/// Parameter constant-expression evaluation failure.
pub const E209: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 209,
};

/// Unsupported construct (e.g., complex typedef in Phase 0).
pub const E210: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 210,
};

/// A sequential `always` block has no identifiable clock.
pub const E212: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 212,
};

/// A binary operation mixes a signed and an unsigned literal operand.
pub const E211: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 211,
};

/// Width mismatch in assignment or connection.
pub const W200: DiagnosticCode = DiagnosticCode {
    category: Category::Warning,
    number: 200,
};

/// Unconnected port in instantiation.
pub const W201: DiagnosticCode = DiagnosticCode {
    category: Category::Warning,
    number: 201,
};

/// Creates a diagnostic for an unknown module in an instantiation.
pub fn error_unknown_module(name: &str, span: Span) -> Diagnostic {
    Diagnostic::error(E200, format!("unknown module `{name}`"), span)
        .with_help("check that the module is defined in the source files")
}

/// Creates a diagnostic for a missing top-level module.
pub fn error_top_not_found(name: &str, span: Span) -> Diagnostic {
    Diagnostic::error(E206, format!("top-level module `{name}` not found"), span)
        .with_help("set `project.top` in aion.toml to the name of an existing module")
}

/// Creates a diagnostic for a duplicate module name.
pub fn error_duplicate_module(name: &str, span: Span, prev_span: Span) -> Diagnostic {
    Diagnostic::error(E202, format!("duplicate module `{name}`"), span).with_label(
        aion_diagnostics::Label::secondary(prev_span, "previously defined here"),
    )
}

/// Creates a diagnostic for a duplicate signal name within a module.
pub fn error_duplicate_signal(name: &str, span: Span) -> Diagnostic {
    Diagnostic::error(E203, format!("duplicate signal `{name}`"), span)
}

/// Creates a diagnostic for an unknown signal reference.
pub fn error_unknown_signal(name: &str, span: Span) -> Diagnostic {
    Diagnostic::error(E204, format!("unknown signal `{name}`"), span)
}

/// Creates a diagnostic for a circular instantiation.
pub fn error_circular_instantiation(name: &str, span: Span) -> Diagnostic {
    Diagnostic::error(
        E207,
        format!("circular instantiation of module `{name}`"),
        span,
    )
    .with_note("the module directly or indirectly instantiates itself")
}

/// Creates a diagnostic when a parameter cannot be constant-evaluated.
pub fn error_param_not_const(msg: &str, span: Span) -> Diagnostic {
    Diagnostic::error(E209, format!("cannot evaluate parameter: {msg}"), span)
}

/// Creates a diagnostic for an unsupported construct.
pub fn error_unsupported(what: &str, span: Span) -> Diagnostic {
    Diagnostic::error(E210, format!("unsupported construct: {what}"), span)
        .with_note("this will be supported in a future release")
}

/// Creates a diagnostic for a sequential always block with no clock.
pub fn error_missing_clock(span: Span) -> Diagnostic {
    Diagnostic::error(E212, "sequential always block has no clock", span)
        .with_help("a sequential always block needs a `posedge` entry in its sensitivity list")
}

/// Creates a diagnostic for a binary operation mixing signed and unsigned
/// literal operands.
pub fn error_signed_mixing(span: Span) -> Diagnostic {
    Diagnostic::error(
        E211,
        "binary operation mixes a signed and an unsigned literal",
        span,
    )
    .with_help("give both literals a matching `'s` signed marker, or make neither signed")
}

/// Creates a diagnostic for a port mismatch in instantiation.
pub fn error_port_mismatch(msg: &str, span: Span) -> Diagnostic {
    Diagnostic::error(E201, msg.to_string(), span)
}

/// Creates a diagnostic for an unknown port in an instantiation.
pub fn error_unknown_port(port_name: &str, module_name: &str, span: Span) -> Diagnostic {
    Diagnostic::error(
        E208,
        format!("unknown port `{port_name}` on module `{module_name}`"),
        span,
    )
}

/// Creates a warning for a width mismatch.
pub fn warn_width_mismatch(msg: &str, span: Span) -> Diagnostic {
    Diagnostic::warning(W200, msg.to_string(), span)
}

/// Creates a warning for an unconnected port.
pub fn warn_unconnected_port(port_name: &str, instance_name: &str, span: Span) -> Diagnostic {
    Diagnostic::warning(
        W201,
        format!("port `{port_name}` is unconnected on instance `{instance_name}`"),
        span,
    )
}

/// A semantic error raised while lowering an AST into a netlist.
///
/// Elaboration halts on the first one; there is no recovery path
/// analogous to the parser's `Error` nodes.
#[derive(Debug, Error)]
pub enum ElaborationError {
    /// A reference to a signal, memory, or parameter that was never declared.
    #[error("undefined signal `{name}`")]
    UndefinedSignal {
        /// The undefined name.
        name: String,
        /// Where it was referenced.
        span: Span,
    },
    /// A value required to be constant (a parameter, a slice bound, a
    /// generate condition) depends on something non-constant.
    #[error("cannot evaluate as a constant: {message}")]
    NotConstant {
        /// What went wrong.
        message: String,
        /// Where the non-constant expression appears.
        span: Span,
    },
    /// A construct outside this front-end's documented elaboration depth.
    #[error("unsupported construct: {what}")]
    Unsupported {
        /// A short description of the construct.
        what: String,
        /// Where it appears.
        span: Span,
    },
    /// An instantiation names a module with no matching declaration.
    #[error("unknown module `{name}`")]
    UnknownModule {
        /// The missing module's name.
        name: String,
        /// The instantiation's span.
        span: Span,
    },
    /// The requested (or default) top module does not exist.
    #[error("top-level module `{name}` not found")]
    TopNotFound {
        /// The requested top module name.
        name: String,
    },
    /// A sequential `always` block's sensitivity list has no `posedge` entry.
    #[error("sequential always block has no clock")]
    MissingClock {
        /// The always block's span.
        span: Span,
    },
    /// A binary operation combines a signed literal and an unsigned literal.
    #[error("binary operation mixes a signed and an unsigned literal")]
    SignedMixing {
        /// The binary operation's span.
        span: Span,
    },
    /// An instance's port connections do not match the target module's ports.
    #[error("port mismatch on instance: {message}")]
    PortMismatch {
        /// Details of the mismatch.
        message: String,
        /// The instance's span.
        span: Span,
    },
    /// The netlist rejected an operation the elaborator attempted — always a
    /// bug in the elaborator, since it is the only writer during this pass.
    #[error(transparent)]
    Netlist(#[from] NetlistError),
}

impl ElaborationError {
    /// Builds a renderable [`Diagnostic`] for this error.
    ///
    /// [`ElaborationError::Netlist`] and [`ElaborationError::TopNotFound`]
    /// have no meaningful source position and render at [`Span::DUMMY`].
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ElaborationError::UndefinedSignal { name, span } => error_unknown_signal(name, *span),
            ElaborationError::NotConstant { message, span } => error_param_not_const(message, *span),
            ElaborationError::Unsupported { what, span } => error_unsupported(what, *span),
            ElaborationError::UnknownModule { name, span } => error_unknown_module(name, *span),
            ElaborationError::TopNotFound { name } => error_top_not_found(name, Span::DUMMY),
            ElaborationError::MissingClock { span } => error_missing_clock(*span),
            ElaborationError::SignedMixing { span } => error_signed_mixing(*span),
            ElaborationError::PortMismatch { message, span } => error_port_mismatch(message, *span),
            ElaborationError::Netlist(e) => {
                Diagnostic::error(E210, format!("internal netlist error: {e}"), Span::DUMMY)
            }
        }
    }
}
