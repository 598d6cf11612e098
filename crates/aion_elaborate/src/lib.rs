//! AST-to-AionIR elaboration engine.
//!
//! Transforms a parsed Verilog source file into a single flattened
//! [`aion_ir::Netlist`]: the requested top module's hierarchy is walked
//! recursively, instance cell names are mangled with a dot-joined path, and
//! only the true top module's ports become netlist-level inputs/outputs.
//! Elaboration is fail-fast: the first [`ElaborationError`] aborts the whole
//! pass.

#![warn(missing_docs)]

mod const_eval;
pub mod context;
pub mod errors;
mod expr;
mod stmt;

use std::collections::HashMap;

use aion_common::Interner;
use aion_diagnostics::DiagnosticSink;
use aion_ir::{BitWidth, NetId, Netlist};
use aion_verilog_parser::ast::{
    Connection, Direction, GenerateBlock, Instance, Instantiation, ModuleDecl, ModuleItem,
    PortStyle, VerilogItem, VerilogSourceFile,
};

pub use context::{Elaborator, Scope};
pub use errors::ElaborationError;

use const_eval::{eval_const_expr, ConstEnv};

/// Maximum number of iterations a `generate for` loop may expand to, a
/// safety bound against runaway or malformed loop bounds.
const MAX_GENERATE_ITERATIONS: u32 = 4096;

/// Elaborates `source_file` into a flattened netlist rooted at `top`.
///
/// If `top` is `None`, the last module declared in the file is used (the
/// common convention for single-file designs). `source` is the original text
/// the AST's spans index into.
pub fn elaborate(
    source_file: &VerilogSourceFile,
    top: Option<&str>,
    interner: &Interner,
    sink: &DiagnosticSink,
    source: &str,
) -> Result<Netlist, ElaborationError> {
    let mut modules: HashMap<String, &ModuleDecl> = HashMap::new();
    let mut last_name: Option<String> = None;
    for item in &source_file.items {
        if let VerilogItem::Module(m) = item {
            let name = interner.resolve(m.name).to_string();
            last_name = Some(name.clone());
            modules.insert(name, m);
        }
    }

    let top_name = match top {
        Some(t) => t.to_string(),
        None => last_name.ok_or_else(|| ElaborationError::TopNotFound { name: "(none)".to_string() })?,
    };
    let top_decl = *modules
        .get(&top_name)
        .ok_or_else(|| ElaborationError::TopNotFound { name: top_name.clone() })?;

    let mut elab = Elaborator::new(&top_name, modules, interner, source, sink);
    let mut scope = Scope::default();
    elab.push_instantiation(&top_name, top_decl.span)?;
    elab.elaborate_module_ports(&mut scope, top_decl, &[], true)?;
    elab.elaborate_module_body(&mut scope, "", top_decl)?;
    elab.pop_instantiation();

    Ok(elab.nl)
}

impl<'a> Elaborator<'a> {
    /// Binds every port of `decl` in `scope`.
    ///
    /// On the true top module (`is_top`), input ports get a fresh net
    /// registered as a netlist-level input and output ports get a fresh net
    /// registered as a netlist-level output. On a nested instance, input
    /// ports alias the net the parent already computed for the matching
    /// actual connection (`actuals`), and output ports get a fresh net that
    /// the caller later rebinds into the parent's scope.
    fn elaborate_module_ports(
        &mut self,
        scope: &mut Scope,
        decl: &ModuleDecl,
        actuals: &[(String, NetId)],
        is_top: bool,
    ) -> Result<(), ElaborationError> {
        let actual_by_name: HashMap<&str, NetId> = actuals.iter().map(|(n, net)| (n.as_str(), *net)).collect();

        for port in self.collect_port_decls(decl) {
            let width = port_width(port.range.as_ref(), &scope.params, self.source, self.interner)?;
            for name_id in &port.names {
                let name = self.interner.resolve(*name_id).to_string();
                match port.direction {
                    Direction::Input => {
                        let net = if is_top {
                            let net = self.nl.add_net(width);
                            self.nl.register_input(name.clone(), net);
                            net
                        } else if let Some(&net) = actual_by_name.get(name.as_str()) {
                            net
                        } else {
                            self.nl.add_net(width)
                        };
                        scope.nets.insert(name, net);
                    }
                    Direction::Output | Direction::Inout => {
                        let net = self.nl.add_net(width);
                        if is_top {
                            self.nl.register_output(name.clone(), net);
                        }
                        scope.nets.insert(name, net);
                    }
                }
            }
        }
        Ok(())
    }

    fn collect_port_decls<'d>(&self, decl: &'d ModuleDecl) -> Vec<&'d aion_verilog_parser::ast::PortDecl> {
        if decl.port_style == PortStyle::Ansi {
            decl.ports.iter().collect()
        } else {
            decl.items
                .iter()
                .filter_map(|item| match unwrap_attributed(item) {
                    ModuleItem::PortDecl(p) => Some(p),
                    _ => None,
                })
                .collect()
        }
    }

    /// Resolves parameters not already bound by an instantiation's overrides,
    /// then lowers every body item of `decl` in source order.
    fn elaborate_module_body(&mut self, scope: &mut Scope, prefix: &str, decl: &ModuleDecl) -> Result<(), ElaborationError> {
        for param in &decl.params {
            let name = self.interner.resolve(param.name).to_string();
            if !scope.params.contains_key(&name) {
                if let Some(value) = &param.value {
                    let env = scope.params.clone();
                    let v = eval_const_expr(value, &env, self.source, self.interner)?;
                    scope.params.insert(name, v);
                }
            }
        }
        self.elaborate_items(scope, prefix, &decl.items)
    }

    fn elaborate_items(&mut self, scope: &mut Scope, prefix: &str, items: &[ModuleItem]) -> Result<(), ElaborationError> {
        for item in items {
            self.elaborate_item(scope, prefix, unwrap_attributed(item))?;
        }
        Ok(())
    }

    fn elaborate_item(&mut self, scope: &mut Scope, prefix: &str, item: &ModuleItem) -> Result<(), ElaborationError> {
        match item {
            ModuleItem::ParameterDecl(p) | ModuleItem::LocalparamDecl(p) => {
                let name = self.interner.resolve(p.name).to_string();
                if let Some(value) = &p.value {
                    let env = scope.params.clone();
                    let v = eval_const_expr(value, &env, self.source, self.interner)?;
                    scope.params.entry(name).or_insert(v);
                }
                Ok(())
            }
            ModuleItem::NetDecl(d) => self.declare_nets(scope, &d.names, d.range.as_ref()),
            ModuleItem::RegDecl(d) => {
                for n in &d.names {
                    if !n.dimensions.is_empty() {
                        let depth = self.eval_array_depth(scope, &n.dimensions)?;
                        let name = self.interner.resolve(n.name).to_string();
                        let width = port_width(d.range.as_ref(), &scope.params, self.source, self.interner)?;
                        scope.memories.insert(name, (width, depth));
                    }
                }
                self.declare_nets(scope, &d.names, d.range.as_ref())
            }
            ModuleItem::IntegerDecl(d) => self.declare_nets_plain(scope, &d.names, BitWidth::from_bits(32)),
            ModuleItem::RealDecl(_) => Ok(()),
            ModuleItem::PortDecl(_) => Ok(()),
            ModuleItem::ContinuousAssign(a) => self.elaborate_continuous_assign(scope, prefix, a),
            ModuleItem::AlwaysBlock(a) => self.elaborate_always(scope, prefix, &a.body),
            ModuleItem::InitialBlock(_) => Ok(()),
            ModuleItem::Instantiation(inst) => self.elaborate_instantiation(scope, prefix, inst),
            ModuleItem::GateInst(g) => self.elaborate_gate(scope, prefix, g),
            ModuleItem::GenerateBlock(g) => self.elaborate_generate(scope, prefix, g),
            ModuleItem::GenvarDecl(_) => Ok(()),
            ModuleItem::FunctionDecl(_) | ModuleItem::TaskDecl(_) => Ok(()),
            ModuleItem::DefparamDecl(_) => Ok(()),
            ModuleItem::EventDecl(_) => Ok(()),
            ModuleItem::TimeDecl(d) => self.declare_nets_plain(scope, &d.names, BitWidth::from_bits(64)),
            ModuleItem::SpecifyBlock(_) => Ok(()),
            ModuleItem::Attributed(_, inner) => self.elaborate_item(scope, prefix, inner),
            ModuleItem::Error(span) => {
                Err(ElaborationError::Unsupported { what: "parse error node in module body".to_string(), span: *span })
            }
        }
    }

    fn declare_nets(
        &mut self,
        scope: &mut Scope,
        names: &[aion_verilog_parser::ast::DeclName],
        range: Option<&aion_verilog_parser::ast::Range>,
    ) -> Result<(), ElaborationError> {
        let width = port_width(range, &scope.params, self.source, self.interner)?;
        for n in names {
            let text = self.interner.resolve(n.name);
            if !scope.memories.contains_key(text) {
                let name = text.to_string();
                scope.nets.entry(name).or_insert_with(|| self.nl.add_net(width));
            }
        }
        Ok(())
    }

    fn declare_nets_plain(
        &mut self,
        scope: &mut Scope,
        names: &[aion_verilog_parser::ast::DeclName],
        width: BitWidth,
    ) -> Result<(), ElaborationError> {
        for n in names {
            let name = self.interner.resolve(n.name).to_string();
            scope.nets.entry(name).or_insert_with(|| self.nl.add_net(width));
        }
        Ok(())
    }

    fn eval_array_depth(
        &self,
        scope: &Scope,
        dimensions: &[aion_verilog_parser::ast::Range],
    ) -> Result<u32, ElaborationError> {
        let dim = &dimensions[0];
        let msb = eval_const_expr(&dim.msb, &scope.params, self.source, self.interner)?;
        let lsb = eval_const_expr(&dim.lsb, &scope.params, self.source, self.interner)?;
        Ok((msb - lsb).unsigned_abs() as u32 + 1)
    }

    fn elaborate_gate(
        &mut self,
        scope: &mut Scope,
        prefix: &str,
        gate: &aion_verilog_parser::ast::GateInst,
    ) -> Result<(), ElaborationError> {
        let op = gate_op(self.interner.resolve(gate.gate_type)).ok_or_else(|| ElaborationError::Unsupported {
            what: format!("gate primitive `{}`", self.interner.resolve(gate.gate_type)),
            span: gate.span,
        })?;
        let Some((out, inputs)) = gate.ports.split_first() else {
            return Ok(());
        };
        let mut in_nets = Vec::with_capacity(inputs.len());
        let mut max_w = 1u32;
        for i in inputs {
            let (n, w) = self.lower_expr(scope, prefix, i)?;
            max_w = max_w.max(w);
            in_nets.push(n);
        }
        let cell = self.nl.add_cell(op, format!("{prefix}{}", self.fresh_name("gate")));
        for (i, n) in in_nets.into_iter().enumerate() {
            let pin = self.nl.add_input_pin(cell, format!("I{i}"), BitWidth::from_bits(max_w))?;
            self.nl.add_sink(n, pin)?;
        }
        let y = self.nl.add_output_pin(cell, "Y", BitWidth::from_bits(max_w))?;
        let out_net = self.nl.add_net(BitWidth::from_bits(max_w));
        self.nl.bind_driver(out_net, y)?;
        self.bind_lhs(scope, out, out_net, max_w)
    }

    fn elaborate_generate(&mut self, scope: &mut Scope, prefix: &str, g: &GenerateBlock) -> Result<(), ElaborationError> {
        match g {
            GenerateBlock::If { condition, then_items, else_items, .. } => {
                let env = scope.params.clone();
                let v = eval_const_expr(condition, &env, self.source, self.interner)?;
                let items = if v != 0 { then_items } else { else_items };
                self.elaborate_items(scope, prefix, items)
            }
            GenerateBlock::For { init, condition, step, label, items, span } => {
                let genvar = genvar_name(self, init)?;
                let mut iter_env: ConstEnv = scope.params.clone();
                let start = genvar_assigned_value(self, init, &iter_env)?;
                iter_env.insert(genvar.clone(), start);

                let label_text = label.map(|l| self.interner.resolve(l).to_string()).unwrap_or_else(|| "gen".to_string());
                let mut count = 0u32;
                loop {
                    let cont = eval_const_expr(condition, &iter_env, self.source, self.interner)?;
                    if cont == 0 {
                        break;
                    }
                    if count >= MAX_GENERATE_ITERATIONS {
                        return Err(ElaborationError::Unsupported {
                            what: "generate for loop exceeds the supported iteration bound".to_string(),
                            span: *span,
                        });
                    }
                    let iter_val = iter_env[&genvar];
                    let mut iter_scope = Scope {
                        nets: scope.nets.clone(),
                        memories: scope.memories.clone(),
                        params: iter_env.clone(),
                    };
                    let iter_prefix = format!("{prefix}{label_text}[{iter_val}].");
                    self.elaborate_items(&mut iter_scope, &iter_prefix, items)?;
                    scope.nets = iter_scope.nets;
                    scope.memories = iter_scope.memories;

                    let next = genvar_assigned_value(self, step, &iter_env)?;
                    iter_env.insert(genvar.clone(), next);
                    count += 1;
                }
                Ok(())
            }
        }
    }

    fn elaborate_instantiation(&mut self, scope: &mut Scope, prefix: &str, inst: &Instantiation) -> Result<(), ElaborationError> {
        let module_name = self.interner.resolve(inst.module_name).to_string();
        let Some(&child_decl) = self.modules.get(&module_name) else {
            return Err(ElaborationError::UnknownModule { name: module_name, span: inst.span });
        };

        for instance in &inst.instances {
            self.elaborate_instance(scope, prefix, child_decl, &module_name, instance, &inst.param_overrides)?;
        }
        Ok(())
    }

    fn elaborate_instance(
        &mut self,
        scope: &mut Scope,
        prefix: &str,
        child_decl: &ModuleDecl,
        module_name: &str,
        instance: &Instance,
        param_overrides: &[Connection],
    ) -> Result<(), ElaborationError> {
        let instance_name = self.interner.resolve(instance.name).to_string();
        self.push_instantiation(module_name, instance.span)?;

        let mut child_scope = Scope::default();
        for (i, ov) in param_overrides.iter().enumerate() {
            let Some(value_expr) = &ov.actual else { continue };
            let env = scope.params.clone();
            let v = eval_const_expr(value_expr, &env, self.source, self.interner)?;
            let param_name = match &ov.formal {
                Some(id) => self.interner.resolve(*id).to_string(),
                None => match child_decl.params.get(i) {
                    Some(p) => self.interner.resolve(p.name).to_string(),
                    None => continue,
                },
            };
            child_scope.params.insert(param_name, v);
        }

        let port_decls = self.collect_port_decls(child_decl);
        let mut actuals = Vec::with_capacity(instance.connections.len());
        for (i, conn) in instance.connections.iter().enumerate() {
            let port_name = match &conn.formal {
                Some(id) => self.interner.resolve(*id).to_string(),
                None => {
                    let Some(p) = port_decls.get(i).and_then(|p| p.names.first()) else { continue };
                    self.interner.resolve(*p).to_string()
                }
            };
            let Some(actual_expr) = &conn.actual else {
                self.sink.emit(errors::warn_unconnected_port(&port_name, &instance_name, conn.span));
                continue;
            };
            let (net, _) = self.lower_expr(scope, prefix, actual_expr)?;
            actuals.push((port_name, net));
        }

        self.elaborate_module_ports(&mut child_scope, child_decl, &actuals, false)?;
        let child_prefix = format!("{prefix}{instance_name}.");
        self.elaborate_module_body(&mut child_scope, &child_prefix, child_decl)?;

        for port in &port_decls {
            if port.direction == Direction::Input {
                continue;
            }
            for name_id in &port.names {
                let port_name = self.interner.resolve(*name_id).to_string();
                let Some(&(_, parent_net)) = actuals.iter().find(|(n, _)| *n == port_name) else { continue };
                if let Some(&child_net) = child_scope.nets.get(&port_name) {
                    if child_net != parent_net {
                        self.nl.redirect_sinks(parent_net, child_net)?;
                    }
                }
            }
        }

        self.pop_instantiation();
        Ok(())
    }
}

fn unwrap_attributed(item: &ModuleItem) -> &ModuleItem {
    match item {
        ModuleItem::Attributed(_, inner) => unwrap_attributed(inner),
        other => other,
    }
}

fn port_width(
    range: Option<&aion_verilog_parser::ast::Range>,
    params: &ConstEnv,
    source: &str,
    interner: &Interner,
) -> Result<BitWidth, ElaborationError> {
    match range {
        None => Ok(BitWidth::BIT),
        Some(r) => {
            let msb = eval_const_expr(&r.msb, params, source, interner)?;
            let lsb = eval_const_expr(&r.lsb, params, source, interner)?;
            Ok(BitWidth::new(msb as i32, lsb as i32))
        }
    }
}

fn gate_op(name: &str) -> Option<aion_ir::CellOp> {
    use aion_ir::CellOp;
    match name {
        "and" => Some(CellOp::And),
        "or" => Some(CellOp::Or),
        "xor" => Some(CellOp::Xor),
        "nand" => Some(CellOp::Nand),
        "nor" => Some(CellOp::Nor),
        "xnor" => Some(CellOp::Xnor),
        "not" => Some(CellOp::Not),
        "buf" => Some(CellOp::Buf),
        _ => None,
    }
}

fn genvar_name(elab: &Elaborator, init: &aion_verilog_parser::ast::Statement) -> Result<String, ElaborationError> {
    match init {
        aion_verilog_parser::ast::Statement::Blocking { target, .. } => expr::lvalue_name(elab, target),
        other => Err(ElaborationError::Unsupported {
            what: "generate for loop initializer other than a plain assignment".to_string(),
            span: statement_span(other),
        }),
    }
}

/// Evaluates the right-hand side of a genvar-assigning statement (the loop's
/// init or step) under `env`.
fn genvar_assigned_value(
    elab: &Elaborator,
    stmt: &aion_verilog_parser::ast::Statement,
    env: &ConstEnv,
) -> Result<i64, ElaborationError> {
    match stmt {
        aion_verilog_parser::ast::Statement::Blocking { value, .. } => eval_const_expr(value, env, elab.source, elab.interner),
        other => Err(ElaborationError::Unsupported {
            what: "generate for loop step other than a plain assignment".to_string(),
            span: statement_span(other),
        }),
    }
}

fn statement_span(stmt: &aion_verilog_parser::ast::Statement) -> aion_source::Span {
    use aion_verilog_parser::ast::Statement;
    match stmt {
        Statement::Blocking { span, .. }
        | Statement::NonBlocking { span, .. }
        | Statement::Block { span, .. }
        | Statement::If { span, .. }
        | Statement::Case { span, .. }
        | Statement::For { span, .. }
        | Statement::EventControl { span, .. } => *span,
        _ => aion_source::Span::DUMMY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aion_common::Interner;
    use aion_diagnostics::DiagnosticSink;
    use aion_source::FileId;
    use aion_verilog_parser::parse;

    fn parse_src<'a>(src: &str, interner: &'a Interner, sink: &DiagnosticSink) -> VerilogSourceFile {
        parse(src, FileId::from_raw(0), interner, sink)
    }

    #[test]
    fn elaborates_simple_combinational_module() {
        let src = "module top(input a, input b, output y); assign y = a & b; endmodule";
        let interner = Interner::new();
        let sink = DiagnosticSink::new();
        let sf = parse_src(src, &interner, &sink);
        let nl = elaborate(&sf, Some("top"), &interner, &sink, src).unwrap();
        assert!(nl.module_inputs().contains_key("a"));
        assert!(nl.module_outputs().contains_key("y"));
    }

    #[test]
    fn missing_top_module_errors() {
        let src = "module top(input a, output y); assign y = a; endmodule";
        let interner = Interner::new();
        let sink = DiagnosticSink::new();
        let sf = parse_src(src, &interner, &sink);
        let err = elaborate(&sf, Some("nope"), &interner, &sink, src).unwrap_err();
        assert!(matches!(err, ElaborationError::TopNotFound { .. }));
    }

    #[test]
    fn elaborates_sequential_counter() {
        let src = "module top(input clk, input rst, output reg [3:0] q); \
                    always @(posedge clk or negedge rst) begin \
                    if (!rst) q <= 4'd0; else q <= q + 4'd1; \
                    end endmodule";
        let interner = Interner::new();
        let sink = DiagnosticSink::new();
        let sf = parse_src(src, &interner, &sink);
        let nl = elaborate(&sf, Some("top"), &interner, &sink, src).unwrap();
        assert!(nl.cells().any(|c| c.op == aion_ir::CellOp::DffR));
    }

    #[test]
    fn flattens_module_instantiation() {
        let src = "module child(input a, output y); assign y = ~a; endmodule \
                    module top(input a, output y); child u1(.a(a), .y(y)); endmodule";
        let interner = Interner::new();
        let sink = DiagnosticSink::new();
        let sf = parse_src(src, &interner, &sink);
        let nl = elaborate(&sf, Some("top"), &interner, &sink, src).unwrap();
        assert!(nl.cells().any(|c| c.name.contains("u1.")));
    }
}
