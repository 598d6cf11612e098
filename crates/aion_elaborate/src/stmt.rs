//! Statement lowering: continuous assigns and `always`/`initial` blocks.
//!
//! Implements procedural-block handling: sequential blocks
//! (sensitivity lists carrying an edge) become flip-flops and memory writes,
//! combinational blocks are lowered as if every top-level blocking assign
//! were a continuous assign.

use aion_ir::{BitWidth, CellId, CellOp, NetId};
use aion_verilog_parser::ast::{ContinuousAssign, EdgeKind, Expr, SensitivityList, Statement, UnaryOp};

use crate::context::{Elaborator, Scope};
use crate::errors::ElaborationError;
use crate::expr::lvalue_name;

impl<'a> Elaborator<'a> {
    /// Lowers a continuous `assign lhs = rhs;`, rebinding `lhs`'s net to
    /// whatever drives the lowered `rhs`.
    pub fn elaborate_continuous_assign(
        &mut self,
        scope: &mut Scope,
        prefix: &str,
        assign: &ContinuousAssign,
    ) -> Result<(), ElaborationError> {
        let (rhs_net, rhs_width) = self.lower_expr(scope, prefix, &assign.value)?;
        self.bind_lhs(scope, &assign.target, rhs_net, rhs_width)
    }

    /// Rebinds the net named by `target` to `rhs_net`, creating the name's
    /// binding if this is its first assignment.
    pub(crate) fn bind_lhs(
        &mut self,
        scope: &mut Scope,
        target: &Expr,
        rhs_net: NetId,
        rhs_width: u32,
    ) -> Result<(), ElaborationError> {
        let name = lvalue_name(self, target)?;
        match scope.nets.get(&name).copied() {
            Some(old_net) if old_net != rhs_net => {
                self.nl.redirect_sinks(old_net, rhs_net)?;
                scope.nets.insert(name, rhs_net);
            }
            Some(_) => {}
            None => {
                scope.nets.insert(name, rhs_net);
                let _ = rhs_width;
            }
        }
        Ok(())
    }

    /// Classifies and lowers one `always` block.
    pub fn elaborate_always(&mut self, scope: &mut Scope, prefix: &str, body: &Statement) -> Result<(), ElaborationError> {
        match body {
            Statement::EventControl { sensitivity, body, span } => match sensitivity {
                SensitivityList::Star => self.elaborate_combinational_body(scope, prefix, body),
                SensitivityList::List(items) => {
                    if items.iter().any(|i| i.edge.is_some()) {
                        self.elaborate_sequential_always(scope, prefix, items, body, *span)
                    } else {
                        self.elaborate_combinational_body(scope, prefix, body)
                    }
                }
            },
            other => self.elaborate_combinational_body(scope, prefix, other),
        }
    }

    /// Lowers every top-level blocking assignment in `body` exactly as a
    /// continuous assign.
    fn elaborate_combinational_body(&mut self, scope: &mut Scope, prefix: &str, body: &Statement) -> Result<(), ElaborationError> {
        for (target, value) in collect_assigns(body, AssignKind::Blocking) {
            let (rhs_net, rhs_width) = self.lower_expr(scope, prefix, value)?;
            self.bind_lhs(scope, target, rhs_net, rhs_width)?;
        }
        Ok(())
    }

    fn elaborate_sequential_always(
        &mut self,
        scope: &mut Scope,
        prefix: &str,
        items: &[aion_verilog_parser::ast::SensitivityItem],
        body: &Statement,
        span: aion_source::Span,
    ) -> Result<(), ElaborationError> {
        let clk_item = items
            .iter()
            .find(|i| i.edge == Some(EdgeKind::Posedge))
            .ok_or(ElaborationError::MissingClock { span })?;
        let (clk_net, _) = self.lower_expr(scope, prefix, &clk_item.signal)?;

        let clk_name = lvalue_name(self, &clk_item.signal).ok();
        let reset_item = items.iter().find(|i| {
            if std::ptr::eq(*i, clk_item) {
                return false;
            }
            match i.edge {
                Some(EdgeKind::Negedge) => true,
                Some(EdgeKind::Posedge) => lvalue_name(self, &i.signal).ok() != clk_name,
                None => false,
            }
        });

        if let Some(reset_item) = reset_item {
            let (reset_net, _) = self.lower_expr(scope, prefix, &reset_item.signal)?;
            if let Statement::If { condition, else_stmt: Some(else_stmt), .. } = unwrap_single_statement_block(body) {
                if self.condition_negates_reset(condition, &reset_item.signal) {
                    for (target, value) in collect_assigns(else_stmt, AssignKind::NonBlocking) {
                        self.lower_sequential_assign(scope, prefix, target, value, clk_net, Some(reset_net))?;
                    }
                    return Ok(());
                }
            }
        }

        for (target, value) in collect_assigns(body, AssignKind::NonBlocking) {
            self.lower_sequential_assign(scope, prefix, target, value, clk_net, None)?;
        }
        Ok(())
    }

    /// True when `condition` is a `!rst`/`~rst` unary-not of `reset_signal`
    /// itself (by identifier/hierarchical-name match), the shape the
    /// `if (!rst) ... else ...` reset idiom requires. Anything else — an
    /// unrelated enable mux, a comparison, a positive-sense check — is not
    /// the reset pattern, and the caller falls back to a plain `DFF`.
    fn condition_negates_reset(&self, condition: &Expr, reset_signal: &Expr) -> bool {
        let Ok(reset_name) = lvalue_name(self, reset_signal) else { return false };
        match condition {
            Expr::Unary { op: UnaryOp::LogNot | UnaryOp::BitNot, operand, .. } => {
                lvalue_name(self, operand).map(|n| n == reset_name).unwrap_or(false)
            }
            _ => false,
        }
    }

    fn lower_sequential_assign(
        &mut self,
        scope: &mut Scope,
        prefix: &str,
        target: &Expr,
        value: &Expr,
        clk_net: NetId,
        reset_net: Option<NetId>,
    ) -> Result<(), ElaborationError> {
        if let Expr::Index { base, index, .. } = target {
            if let Expr::Identifier { name, .. } = base.as_ref() {
                let base_name = self.interner.resolve(*name).to_string();
                if let Some((elem_width, depth)) = scope.memories.get(&base_name).copied() {
                    return self.lower_memory_write(scope, prefix, &base_name, elem_width, depth, index, value, clk_net);
                }
            }
        }

        let (d_net, d_width) = self.lower_expr(scope, prefix, value)?;
        let name = lvalue_name(self, target)?;
        let q_width = scope.nets.get(&name).and_then(|n| self.nl.net(*n)).map(|n| n.width.bits()).unwrap_or(d_width);
        let width = BitWidth::from_bits(q_width.max(d_width));

        let cell = if reset_net.is_some() {
            self.new_dff_cell(prefix, "dffr", CellOp::DffR)
        } else {
            self.new_dff_cell(prefix, "dff", CellOp::Dff)
        };

        let clk_pin = self.nl.add_input_pin(cell, "CLK", BitWidth::BIT)?;
        self.nl.add_sink(clk_net, clk_pin)?;
        let d_pin = self.nl.add_input_pin(cell, "D", width)?;
        self.nl.add_sink(d_net, d_pin)?;
        if let Some(reset_net) = reset_net {
            let rst_pin = self.nl.add_input_pin(cell, "RST", BitWidth::BIT)?;
            self.nl.add_sink(reset_net, rst_pin)?;
        }
        let q_pin = self.nl.add_output_pin(cell, "Q", width)?;
        let q_net = self.nl.add_net(width);
        self.nl.bind_driver(q_net, q_pin)?;

        self.bind_lhs(scope, target, q_net, width.bits())
    }

    #[allow(clippy::too_many_arguments)]
    fn lower_memory_write(
        &mut self,
        scope: &mut Scope,
        prefix: &str,
        memory_name: &str,
        elem_width: BitWidth,
        depth: u32,
        index: &Expr,
        value: &Expr,
        clk_net: NetId,
    ) -> Result<(), ElaborationError> {
        let (addr_net, _) = self.lower_expr(scope, prefix, index)?;
        let (data_net, _) = self.lower_expr(scope, prefix, value)?;
        let mut attrs = aion_ir::Attributes::new();
        attrs.insert("memory".to_string(), aion_ir::AttrValue::Str(memory_name.to_string()));
        attrs.insert("depth".to_string(), aion_ir::AttrValue::Int(depth as i64));
        let name = format!("{prefix}{}", self.fresh_name("memwr"));
        let cell = self.nl.add_cell_with_attrs(CellOp::MemWr, name, attrs);

        let clk_pin = self.nl.add_input_pin(cell, "CLK", BitWidth::BIT)?;
        self.nl.add_sink(clk_net, clk_pin)?;
        let addr_pin = self.nl.add_input_pin(cell, "ADDR", BitWidth::from_bits(32))?;
        self.nl.add_sink(addr_net, addr_pin)?;
        let data_pin = self.nl.add_input_pin(cell, "DATA", elem_width)?;
        self.nl.add_sink(data_net, data_pin)?;
        let en_pin = self.nl.add_input_pin(cell, "EN", BitWidth::BIT)?;
        let en_net = self.const_net(prefix, 1, 1);
        self.nl.add_sink(en_net, en_pin)?;
        Ok(())
    }

    fn new_dff_cell(&mut self, prefix: &str, kind: &str, op: CellOp) -> CellId {
        let name = format!("{prefix}{}", self.fresh_name(kind));
        self.nl.add_cell(op, name)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum AssignKind {
    Blocking,
    NonBlocking,
}

/// Unwraps a `begin ... end` block holding a single statement down to that
/// statement, recursively. The `if (!rst) ... else ...` reset-pattern match
/// needs to see past the (extremely common) idiom of wrapping an always
/// block's body in a single-statement `begin...end`, since Verilog makes
/// that wrapping optional and semantically inert.
fn unwrap_single_statement_block(stmt: &Statement) -> &Statement {
    match stmt {
        Statement::Block { stmts, .. } if stmts.len() == 1 => unwrap_single_statement_block(&stmts[0]),
        other => other,
    }
}

/// Collects the top-level assignments of `kind` reachable from `stmt`,
/// descending through `begin...end` blocks and both arms of `if` (but not
/// into loops, which are outside this front-end's documented depth).
fn collect_assigns(stmt: &Statement, kind: AssignKind) -> Vec<(&Expr, &Expr)> {
    let mut out = Vec::new();
    collect_assigns_into(stmt, kind, &mut out);
    out
}

fn collect_assigns_into<'s>(stmt: &'s Statement, kind: AssignKind, out: &mut Vec<(&'s Expr, &'s Expr)>) {
    match stmt {
        Statement::Blocking { target, value, .. } if kind == AssignKind::Blocking => out.push((target, value)),
        Statement::NonBlocking { target, value, .. } if kind == AssignKind::NonBlocking => out.push((target, value)),
        Statement::Block { stmts, .. } => {
            for s in stmts {
                collect_assigns_into(s, kind, out);
            }
        }
        Statement::If { then_stmt, else_stmt, .. } => {
            collect_assigns_into(then_stmt, kind, out);
            if let Some(else_stmt) = else_stmt {
                collect_assigns_into(else_stmt, kind, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aion_common::Interner;
    use aion_diagnostics::DiagnosticSink;
    use aion_source::{FileId, Span};
    use std::collections::HashMap;

    fn span() -> Span {
        Span::new(FileId::from_raw(0), 0, 1)
    }

    fn ident_expr(interner: &Interner, name: &str) -> Expr {
        Expr::Identifier { name: interner.get_or_intern(name), span: span() }
    }

    #[test]
    fn continuous_assign_rebinds_lhs() {
        let interner = Interner::new();
        let sink = DiagnosticSink::new();
        let mut e = Elaborator::new("top", HashMap::new(), &interner, "", &sink);
        let a_net = e.nl.add_net(BitWidth::BIT);
        let mut scope = Scope::default();
        scope.nets.insert("a".to_string(), a_net);
        scope.nets.insert("y".to_string(), e.nl.add_net(BitWidth::BIT));

        let assign = ContinuousAssign { target: ident_expr(&interner, "y"), value: ident_expr(&interner, "a"), span: span() };
        e.elaborate_continuous_assign(&mut scope, "", &assign).unwrap();
        assert_eq!(scope.nets["y"], a_net);
    }

    #[test]
    fn combinational_always_star_lowers_blocking_assign() {
        let interner = Interner::new();
        let sink = DiagnosticSink::new();
        let mut e = Elaborator::new("top", HashMap::new(), &interner, "", &sink);
        let a_net = e.nl.add_net(BitWidth::BIT);
        let mut scope = Scope::default();
        scope.nets.insert("a".to_string(), a_net);
        scope.nets.insert("y".to_string(), e.nl.add_net(BitWidth::BIT));

        let body = Statement::Blocking { target: ident_expr(&interner, "y"), value: ident_expr(&interner, "a"), span: span() };
        let always_body = Statement::EventControl { sensitivity: SensitivityList::Star, body: Box::new(body), span: span() };
        e.elaborate_always(&mut scope, "", &always_body).unwrap();
        assert_eq!(scope.nets["y"], a_net);
    }

    #[test]
    fn sequential_plain_dff_no_reset() {
        let interner = Interner::new();
        let sink = DiagnosticSink::new();
        let mut e = Elaborator::new("top", HashMap::new(), &interner, "", &sink);
        let clk = e.nl.add_net(BitWidth::BIT);
        let d = e.nl.add_net(BitWidth::BIT);
        let mut scope = Scope::default();
        scope.nets.insert("clk".to_string(), clk);
        scope.nets.insert("d".to_string(), d);
        scope.nets.insert("q".to_string(), e.nl.add_net(BitWidth::BIT));

        let clk_sig = ident_expr(&interner, "clk");
        let items = vec![aion_verilog_parser::ast::SensitivityItem { edge: Some(EdgeKind::Posedge), signal: clk_sig, span: span() }];
        let assign = Statement::NonBlocking { target: ident_expr(&interner, "q"), value: ident_expr(&interner, "d"), span: span() };
        let always_body = Statement::EventControl { sensitivity: SensitivityList::List(items), body: Box::new(assign), span: span() };
        e.elaborate_always(&mut scope, "", &always_body).unwrap();

        let q_net = scope.nets["q"];
        let driver_pin = e.nl.net(q_net).unwrap().driver().unwrap();
        let cell_id = e.nl.pin(driver_pin).unwrap().cell();
        assert_eq!(e.nl.cell(cell_id).unwrap().op, CellOp::Dff);
    }

    #[test]
    fn sequential_reset_pattern_makes_dffr() {
        let interner = Interner::new();
        let sink = DiagnosticSink::new();
        let mut e = Elaborator::new("top", HashMap::new(), &interner, "", &sink);
        let clk = e.nl.add_net(BitWidth::BIT);
        let rst = e.nl.add_net(BitWidth::BIT);
        let d = e.nl.add_net(BitWidth::BIT);
        let mut scope = Scope::default();
        scope.nets.insert("clk".to_string(), clk);
        scope.nets.insert("rst".to_string(), rst);
        scope.nets.insert("d".to_string(), d);
        scope.nets.insert("q".to_string(), e.nl.add_net(BitWidth::BIT));

        let items = vec![
            aion_verilog_parser::ast::SensitivityItem { edge: Some(EdgeKind::Posedge), signal: ident_expr(&interner, "clk"), span: span() },
            aion_verilog_parser::ast::SensitivityItem { edge: Some(EdgeKind::Posedge), signal: ident_expr(&interner, "rst"), span: span() },
        ];
        let reset_branch = Statement::NonBlocking { target: ident_expr(&interner, "q"), value: Expr::Literal { span: span() }, span: span() };
        let clocked_branch = Statement::NonBlocking { target: ident_expr(&interner, "q"), value: ident_expr(&interner, "d"), span: span() };
        let if_stmt = Statement::If {
            condition: Expr::Unary { op: aion_verilog_parser::ast::UnaryOp::LogNot, operand: Box::new(ident_expr(&interner, "rst")), span: span() },
            then_stmt: Box::new(reset_branch),
            else_stmt: Some(Box::new(clocked_branch)),
            span: span(),
        };
        let always_body = Statement::EventControl { sensitivity: SensitivityList::List(items), body: Box::new(if_stmt), span: span() };
        e.elaborate_always(&mut scope, "", &always_body).unwrap();

        let q_net = scope.nets["q"];
        let driver_pin = e.nl.net(q_net).unwrap().driver().unwrap();
        let cell_id = e.nl.pin(driver_pin).unwrap().cell();
        assert_eq!(e.nl.cell(cell_id).unwrap().op, CellOp::DffR);
    }

    /// An `if/else` inside a reset-sensitive always block whose condition is
    /// not a negation of the reset signal (an enable mux, here) must not be
    /// mistaken for the reset idiom — both branches still need to lower,
    /// not just whichever one happens to sit in the `else` arm.
    #[test]
    fn unrelated_if_else_in_reset_block_is_not_mistaken_for_reset_pattern() {
        let interner = Interner::new();
        let sink = DiagnosticSink::new();
        let mut e = Elaborator::new("top", HashMap::new(), &interner, "", &sink);
        let clk = e.nl.add_net(BitWidth::BIT);
        let rst = e.nl.add_net(BitWidth::BIT);
        let d = e.nl.add_net(BitWidth::BIT);
        let d2 = e.nl.add_net(BitWidth::BIT);
        let mut scope = Scope::default();
        scope.nets.insert("clk".to_string(), clk);
        scope.nets.insert("rst".to_string(), rst);
        scope.nets.insert("en".to_string(), e.nl.add_net(BitWidth::BIT));
        scope.nets.insert("d".to_string(), d);
        scope.nets.insert("d2".to_string(), d2);
        scope.nets.insert("q".to_string(), e.nl.add_net(BitWidth::BIT));

        let items = vec![
            aion_verilog_parser::ast::SensitivityItem { edge: Some(EdgeKind::Posedge), signal: ident_expr(&interner, "clk"), span: span() },
            aion_verilog_parser::ast::SensitivityItem { edge: Some(EdgeKind::Posedge), signal: ident_expr(&interner, "rst"), span: span() },
        ];
        // if (en) q <= d2; else q <= d; -- an enable mux, not a reset check.
        let then_branch = Statement::NonBlocking { target: ident_expr(&interner, "q"), value: ident_expr(&interner, "d2"), span: span() };
        let else_branch = Statement::NonBlocking { target: ident_expr(&interner, "q"), value: ident_expr(&interner, "d"), span: span() };
        let if_stmt = Statement::If {
            condition: ident_expr(&interner, "en"),
            then_stmt: Box::new(then_branch),
            else_stmt: Some(Box::new(else_branch)),
            span: span(),
        };
        let always_body = Statement::EventControl { sensitivity: SensitivityList::List(items), body: Box::new(if_stmt), span: span() };
        e.elaborate_always(&mut scope, "", &always_body).unwrap();

        // Both branches must have lowered to something driving `q` -- the
        // then-branch's `d2` must not have been silently dropped.
        let d2_net = e.nl.net(d2).unwrap();
        assert!(d2_net.fanout() > 0, "then-branch assignment using d2 was never elaborated");

        let q_net = scope.nets["q"];
        let driver_pin = e.nl.net(q_net).unwrap().driver().unwrap();
        let cell_id = e.nl.pin(driver_pin).unwrap().cell();
        // Neither branch is a reset write, so this must not become a DFFR.
        assert_ne!(e.nl.cell(cell_id).unwrap().op, CellOp::DffR);
    }
}
