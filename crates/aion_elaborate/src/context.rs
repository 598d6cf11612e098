//! Mutable elaboration state: the netlist under construction, the per-module
//! name scope, and the module registry used to resolve instantiations.

use std::collections::HashMap;

use aion_common::Interner;
use aion_diagnostics::DiagnosticSink;
use aion_ir::{BitWidth, NetId, Netlist};
use aion_source::Span;
use aion_verilog_parser::ast::ModuleDecl;

use crate::errors::ElaborationError;

/// Per-module elaboration scope: the name bindings visible while lowering a
/// single module body (or a single flattened instance of one).
///
/// A fresh `Scope` is created for every module instance; nothing here is
/// shared across instances except through the netlist itself.
#[derive(Debug, Default)]
pub struct Scope {
    /// Signal name → net carrying its value.
    pub nets: HashMap<String, NetId>,
    /// Unpacked-array ("memory") declarations: name → (element width, depth).
    pub memories: HashMap<String, (BitWidth, u32)>,
    /// The constant environment: resolved parameters, `localparam`s, and (while
    /// expanding a `generate for`) the current genvar binding.
    pub params: HashMap<String, i64>,
}

impl Scope {
    /// Looks up an already-bound net by name, erroring if it is undeclared.
    pub fn lookup_net(&self, name: &str, span: Span) -> Result<NetId, ElaborationError> {
        self.nets
            .get(name)
            .copied()
            .ok_or_else(|| ElaborationError::UndefinedSignal { name: name.to_string(), span })
    }
}

/// Drives recursive elaboration of a module hierarchy into one shared
/// [`Netlist`].
///
/// Cell names are mangled with a dot-joined instance-path prefix as
/// elaboration descends into instances: the top module elaborates
/// with an empty prefix, and each instantiation appends `"<instance_name>."`
/// for its children.
pub struct Elaborator<'a> {
    /// The netlist under construction. Every instance elaborates into this
    /// same structure; there is no per-module sub-netlist.
    pub nl: Netlist,
    /// All module declarations found across the parsed source, keyed by name.
    pub modules: HashMap<String, &'a ModuleDecl>,
    /// The string interner shared with the parser.
    pub interner: &'a Interner,
    /// The original source text, for slicing literal/identifier spans.
    pub source: &'a str,
    /// Diagnostic sink for non-fatal warnings (unconnected ports, etc).
    pub sink: &'a DiagnosticSink,
    /// Counter for anonymous cell names, reset per elaborator (not per
    /// instance) so names stay unique across the whole design.
    tmp_counter: u32,
    /// Names of modules currently being elaborated, for instantiation-cycle
    /// detection.
    elab_stack: Vec<String>,
}

impl<'a> Elaborator<'a> {
    /// Creates a new elaborator over an empty netlist named after the top module.
    pub fn new(
        top_name: &str,
        modules: HashMap<String, &'a ModuleDecl>,
        interner: &'a Interner,
        source: &'a str,
        sink: &'a DiagnosticSink,
    ) -> Self {
        Self {
            nl: Netlist::new(top_name),
            modules,
            interner,
            source,
            sink,
            tmp_counter: 0,
            elab_stack: Vec::new(),
        }
    }

    /// Returns the source text spanned by `span`.
    pub fn span_text(&self, span: Span) -> &'a str {
        &self.source[span.start as usize..span.end as usize]
    }

    /// Generates a fresh, unique cell-name fragment such as `$and12`,
    /// to be prepended with the current instance prefix by the caller.
    pub fn fresh_name(&mut self, kind: &str) -> String {
        let id = self.tmp_counter;
        self.tmp_counter += 1;
        format!("${kind}{id}")
    }

    /// Pushes a module name onto the instantiation stack, returning an error
    /// if it is already present (a combinational instantiation cycle).
    pub fn push_instantiation(&mut self, name: &str, span: Span) -> Result<(), ElaborationError> {
        if self.elab_stack.iter().any(|n| n == name) {
            return Err(ElaborationError::Unsupported {
                what: format!("module `{name}` instantiates itself (directly or indirectly)"),
                span,
            });
        }
        self.elab_stack.push(name.to_string());
        Ok(())
    }

    /// Pops the most recently pushed module name.
    pub fn pop_instantiation(&mut self) {
        self.elab_stack.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aion_source::FileId;

    #[test]
    fn scope_lookup_missing_errors() {
        let scope = Scope::default();
        let span = Span::new(FileId::from_raw(0), 0, 1);
        assert!(scope.lookup_net("a", span).is_err());
    }

    #[test]
    fn scope_lookup_present() {
        let mut scope = Scope::default();
        let net = NetId::from_raw(3);
        scope.nets.insert("a".to_string(), net);
        let span = Span::new(FileId::from_raw(0), 0, 1);
        assert_eq!(scope.lookup_net("a", span).unwrap(), net);
    }

    #[test]
    fn fresh_name_increments_and_is_unique() {
        let interner = Interner::new();
        let sink = DiagnosticSink::new();
        let mut elab = Elaborator::new("top", HashMap::new(), &interner, "", &sink);
        let a = elab.fresh_name("and");
        let b = elab.fresh_name("and");
        assert_ne!(a, b);
    }

    #[test]
    fn instantiation_cycle_detected() {
        let interner = Interner::new();
        let sink = DiagnosticSink::new();
        let mut elab = Elaborator::new("top", HashMap::new(), &interner, "", &sink);
        let span = Span::new(FileId::from_raw(0), 0, 1);
        elab.push_instantiation("top", span).unwrap();
        assert!(elab.push_instantiation("top", span).is_err());
        elab.pop_instantiation();
        assert!(elab.push_instantiation("top", span).is_ok());
    }
}
