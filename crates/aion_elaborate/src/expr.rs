//! Expression lowering: AST [`Expr`] trees to netlist cells and nets.
//!
//! Implements the lowering table: literals become `CONST`
//! cells, identifiers resolve to existing nets, operators become the
//! matching primitive cell, and structural forms (`{}` concatenation,
//! `[msb:lsb]` slices, ternaries) become `CONCAT`/`SLICE`/`MUX`.

use aion_ir::{AttrValue, BitWidth, CellOp, NetId};
use aion_verilog_parser::ast::{BinaryOp, Expr, UnaryOp};
use aion_verilog_parser::literal::resolve_integer_literal;

use crate::const_eval::{eval_const_expr, ConstEnv};
use crate::context::{Elaborator, Scope};
use crate::errors::ElaborationError;

/// Resolves an lvalue expression to the plain name it refers to.
///
/// Only `Identifier` and `HierarchicalName` are legal lvalues in this
/// front-end's documented scope: assignment sets a net as the driver of
/// the LHS net, implying a simple reference, not a partial/sliced target.
pub fn lvalue_name(elab: &Elaborator, expr: &Expr) -> Result<String, ElaborationError> {
    match expr {
        Expr::Identifier { name, .. } => Ok(elab.interner.resolve(*name).to_string()),
        Expr::HierarchicalName { parts, .. } => Ok(parts
            .iter()
            .map(|p| elab.interner.resolve(*p))
            .collect::<Vec<_>>()
            .join(".")),
        other => Err(ElaborationError::Unsupported {
            what: "assignment target other than a plain signal name".to_string(),
            span: other.span(),
        }),
    }
}

impl<'a> Elaborator<'a> {
    /// Lowers `expr` in `scope` under the instance-path `prefix`, returning
    /// the net carrying its value and that net's bit width.
    pub fn lower_expr(
        &mut self,
        scope: &mut Scope,
        prefix: &str,
        expr: &Expr,
    ) -> Result<(NetId, u32), ElaborationError> {
        match expr {
            Expr::Literal { span } => {
                let text = self.span_text(*span);
                let lit = resolve_integer_literal(text).ok_or_else(|| ElaborationError::Unsupported {
                    what: format!("malformed numeric literal `{text}`"),
                    span: *span,
                })?;
                Ok((self.const_net(prefix, lit.value, lit.width), lit.width))
            }
            Expr::RealLiteral { span } => Err(ElaborationError::Unsupported {
                what: "real-valued literal in a synthesizable expression".to_string(),
                span: *span,
            }),
            Expr::StringLiteral { span } => Err(ElaborationError::Unsupported {
                what: "string literal in a synthesizable expression".to_string(),
                span: *span,
            }),
            Expr::Identifier { name, span } => {
                let text = self.interner.resolve(*name).to_string();
                if let Some(&net) = scope.nets.get(&text) {
                    let width = self.nl.net(net).map(|n| n.width.bits()).unwrap_or(1);
                    Ok((net, width))
                } else if let Some(&val) = scope.params.get(&text) {
                    Ok((self.const_net(prefix, val, 32), 32))
                } else {
                    Err(ElaborationError::UndefinedSignal { name: text, span: *span })
                }
            }
            Expr::HierarchicalName { parts, span } => {
                let text = parts.iter().map(|p| self.interner.resolve(*p)).collect::<Vec<_>>().join(".");
                let net = scope.lookup_net(&text, *span)?;
                let width = self.nl.net(net).map(|n| n.width.bits()).unwrap_or(1);
                Ok((net, width))
            }
            Expr::Index { base, index, span } => self.lower_index(scope, prefix, base, index, *span),
            Expr::RangeSelect { base, msb, lsb, span } => {
                self.lower_range_select(scope, prefix, base, msb, lsb, *span)
            }
            Expr::PartSelect { base, index, ascending, width, span } => {
                self.lower_part_select(scope, prefix, base, index, *ascending, width, *span)
            }
            Expr::Concat { elements, .. } => self.lower_concat(scope, prefix, elements),
            Expr::Repeat { count, elements, span } => {
                let env = scope.params.clone();
                let n = eval_const_expr(count, &env, self.source, self.interner)?;
                if n < 0 {
                    return Err(ElaborationError::NotConstant {
                        message: "replication count is negative".to_string(),
                        span: *span,
                    });
                }
                let (inner_net, inner_width) = self.lower_concat(scope, prefix, elements)?;
                let mut attrs = aion_ir::Attributes::new();
                attrs.insert("count".to_string(), AttrValue::Int(n));
                let cell = self.new_cell_with_attrs(prefix, "repeat", CellOp::Repeat, attrs);
                let a = self.nl.add_input_pin(cell, "A", BitWidth::from_bits(inner_width))?;
                self.nl.add_sink(inner_net, a)?;
                let out_width = inner_width * n as u32;
                let y = self.nl.add_output_pin(cell, "Y", BitWidth::from_bits(out_width))?;
                let out_net = self.nl.add_net(BitWidth::from_bits(out_width));
                self.nl.bind_driver(out_net, y)?;
                Ok((out_net, out_width))
            }
            Expr::Unary { op, operand, span } => self.lower_unary(scope, prefix, *op, operand, *span),
            Expr::Binary { left, op, right, span } => self.lower_binary(scope, prefix, left, *op, right, *span),
            Expr::Ternary { condition, then_expr, else_expr, .. } => {
                let (cond_net, cond_width) = self.lower_expr(scope, prefix, condition)?;
                let cond_bool = self.reduce_to_bool(prefix, cond_net, cond_width)?;
                let (then_net, then_width) = self.lower_expr(scope, prefix, then_expr)?;
                let (else_net, else_width) = self.lower_expr(scope, prefix, else_expr)?;
                let out_width = then_width.max(else_width);
                let cell = self.new_cell(prefix, "mux", CellOp::Mux);
                let s = self.nl.add_input_pin(cell, "S", BitWidth::BIT)?;
                let a = self.nl.add_input_pin(cell, "A", BitWidth::from_bits(else_width))?;
                let b = self.nl.add_input_pin(cell, "B", BitWidth::from_bits(then_width))?;
                self.nl.add_sink(cond_bool, s)?;
                self.nl.add_sink(else_net, a)?;
                self.nl.add_sink(then_net, b)?;
                let y = self.nl.add_output_pin(cell, "Y", BitWidth::from_bits(out_width))?;
                let out_net = self.nl.add_net(BitWidth::from_bits(out_width));
                self.nl.bind_driver(out_net, y)?;
                Ok((out_net, out_width))
            }
            Expr::FuncCall { span, .. } => Err(ElaborationError::Unsupported {
                what: "function call (functions are parsed but not inlined)".to_string(),
                span: *span,
            }),
            Expr::SystemCall { name, span, .. } => Err(ElaborationError::Unsupported {
                what: format!("system call `{}` outside a constant expression", self.interner.resolve(*name)),
                span: *span,
            }),
            Expr::Paren { inner, .. } => self.lower_expr(scope, prefix, inner),
            Expr::Error(span) => Err(ElaborationError::Unsupported { what: "parse error node".to_string(), span: *span }),
        }
    }

    fn lower_index(
        &mut self,
        scope: &mut Scope,
        prefix: &str,
        base: &Expr,
        index: &Expr,
        span: aion_source::Span,
    ) -> Result<(NetId, u32), ElaborationError> {
        if let Expr::Identifier { name, .. } = base {
            let base_name = self.interner.resolve(*name).to_string();
            if let Some((elem_width, depth)) = scope.memories.get(&base_name).copied() {
                let (addr_net, _) = self.lower_expr(scope, prefix, index)?;
                let mut attrs = aion_ir::Attributes::new();
                attrs.insert("memory".to_string(), AttrValue::Str(base_name));
                attrs.insert("depth".to_string(), AttrValue::Int(depth as i64));
                let cell = self.new_cell_with_attrs(prefix, "memrd", CellOp::MemRd, attrs);
                let addr_pin = self.nl.add_input_pin(cell, "ADDR", BitWidth::from_bits(32))?;
                self.nl.add_sink(addr_net, addr_pin)?;
                let q_width = elem_width.bits();
                let q = self.nl.add_output_pin(cell, "Q", elem_width)?;
                let out_net = self.nl.add_net(elem_width);
                self.nl.bind_driver(out_net, q)?;
                return Ok((out_net, q_width));
            }
        }
        let (base_net, _) = self.lower_expr(scope, prefix, base)?;
        let env = scope.params.clone();
        let idx = eval_const_expr(index, &env, self.source, self.interner)
            .map_err(|_| ElaborationError::Unsupported { what: "dynamic (non-constant) bit select".to_string(), span })?;
        self.make_slice(prefix, base_net, idx, idx)
    }

    fn lower_range_select(
        &mut self,
        scope: &mut Scope,
        prefix: &str,
        base: &Expr,
        msb: &Expr,
        lsb: &Expr,
        span: aion_source::Span,
    ) -> Result<(NetId, u32), ElaborationError> {
        let (base_net, _) = self.lower_expr(scope, prefix, base)?;
        let env = scope.params.clone();
        let msb = eval_const_expr(msb, &env, self.source, self.interner)
            .map_err(|_| ElaborationError::Unsupported { what: "non-constant range-select bound".to_string(), span })?;
        let lsb = eval_const_expr(lsb, &env, self.source, self.interner)
            .map_err(|_| ElaborationError::Unsupported { what: "non-constant range-select bound".to_string(), span })?;
        self.make_slice(prefix, base_net, msb, lsb)
    }

    fn lower_part_select(
        &mut self,
        scope: &mut Scope,
        prefix: &str,
        base: &Expr,
        index: &Expr,
        ascending: bool,
        width: &Expr,
        span: aion_source::Span,
    ) -> Result<(NetId, u32), ElaborationError> {
        let (base_net, _) = self.lower_expr(scope, prefix, base)?;
        let env = scope.params.clone();
        let idx = eval_const_expr(index, &env, self.source, self.interner)
            .map_err(|_| ElaborationError::Unsupported { what: "non-constant indexed part-select base".to_string(), span })?;
        let w = eval_const_expr(width, &env, self.source, self.interner)
            .map_err(|_| ElaborationError::Unsupported { what: "non-constant indexed part-select width".to_string(), span })?;
        let (msb, lsb) = if ascending { (idx + w - 1, idx) } else { (idx, idx - w + 1) };
        self.make_slice(prefix, base_net, msb, lsb)
    }

    fn make_slice(&mut self, prefix: &str, base_net: NetId, msb: i64, lsb: i64) -> Result<(NetId, u32), ElaborationError> {
        let width = msb.abs_diff(lsb) as u32 + 1;
        let mut attrs = aion_ir::Attributes::new();
        attrs.insert("msb".to_string(), AttrValue::Int(msb));
        attrs.insert("lsb".to_string(), AttrValue::Int(lsb));
        let base_width = self.nl.net(base_net).map(|n| n.width.bits()).unwrap_or(width);
        let cell = self.new_cell_with_attrs(prefix, "slice", CellOp::Slice, attrs);
        let a = self.nl.add_input_pin(cell, "A", BitWidth::from_bits(base_width))?;
        self.nl.add_sink(base_net, a)?;
        let y = self.nl.add_output_pin(cell, "Y", BitWidth::from_bits(width))?;
        let out_net = self.nl.add_net(BitWidth::from_bits(width));
        self.nl.bind_driver(out_net, y)?;
        Ok((out_net, width))
    }

    fn lower_concat(&mut self, scope: &mut Scope, prefix: &str, elements: &[Expr]) -> Result<(NetId, u32), ElaborationError> {
        if elements.len() == 1 {
            return self.lower_expr(scope, prefix, &elements[0]);
        }
        let mut nets = Vec::with_capacity(elements.len());
        let mut total = 0u32;
        for e in elements {
            let (n, w) = self.lower_expr(scope, prefix, e)?;
            nets.push((n, w));
            total += w;
        }
        let cell = self.new_cell(prefix, "concat", CellOp::Concat);
        for (i, (n, w)) in nets.into_iter().enumerate() {
            let pin = self.nl.add_input_pin(cell, format!("I{i}"), BitWidth::from_bits(w))?;
            self.nl.add_sink(n, pin)?;
        }
        let y = self.nl.add_output_pin(cell, "Y", BitWidth::from_bits(total))?;
        let out_net = self.nl.add_net(BitWidth::from_bits(total));
        self.nl.bind_driver(out_net, y)?;
        Ok((out_net, total))
    }

    fn lower_unary(
        &mut self,
        scope: &mut Scope,
        prefix: &str,
        op: UnaryOp,
        operand: &Expr,
        _span: aion_source::Span,
    ) -> Result<(NetId, u32), ElaborationError> {
        let (a_net, a_width) = self.lower_expr(scope, prefix, operand)?;
        match op {
            UnaryOp::Plus => Ok((a_net, a_width)),
            UnaryOp::Minus => self.unary_cell(prefix, "neg", CellOp::Neg, a_net, a_width, a_width),
            UnaryOp::BitNot | UnaryOp::LogNot => self.unary_cell(prefix, "not", CellOp::Not, a_net, a_width, a_width),
            UnaryOp::RedAnd => self.unary_cell(prefix, "redand", CellOp::ReduceAnd, a_net, a_width, 1),
            UnaryOp::RedOr => self.unary_cell(prefix, "redor", CellOp::ReduceOr, a_net, a_width, 1),
            UnaryOp::RedXor => self.unary_cell(prefix, "redxor", CellOp::ReduceXor, a_net, a_width, 1),
            UnaryOp::RedNand => {
                let (n, w) = self.unary_cell(prefix, "redand", CellOp::ReduceAnd, a_net, a_width, 1)?;
                self.unary_cell(prefix, "not", CellOp::Not, n, w, 1)
            }
            UnaryOp::RedNor => {
                let (n, w) = self.unary_cell(prefix, "redor", CellOp::ReduceOr, a_net, a_width, 1)?;
                self.unary_cell(prefix, "not", CellOp::Not, n, w, 1)
            }
            UnaryOp::RedXnor => {
                let (n, w) = self.unary_cell(prefix, "redxor", CellOp::ReduceXor, a_net, a_width, 1)?;
                self.unary_cell(prefix, "not", CellOp::Not, n, w, 1)
            }
        }
    }

    fn lower_binary(
        &mut self,
        scope: &mut Scope,
        prefix: &str,
        left: &Expr,
        op: BinaryOp,
        right: &Expr,
        span: aion_source::Span,
    ) -> Result<(NetId, u32), ElaborationError> {
        if let (Some(l_signed), Some(r_signed)) = (self.literal_signedness(left), self.literal_signedness(right)) {
            if l_signed != r_signed {
                return Err(ElaborationError::SignedMixing { span });
            }
        }
        let (l_net, l_width) = self.lower_expr(scope, prefix, left)?;
        let (r_net, r_width) = self.lower_expr(scope, prefix, right)?;
        let max_w = l_width.max(r_width);
        match op {
            BinaryOp::Add => self.binary_cell(prefix, "add", CellOp::Add, l_net, l_width, r_net, r_width, max_w),
            BinaryOp::Sub => self.binary_cell(prefix, "sub", CellOp::Sub, l_net, l_width, r_net, r_width, max_w),
            BinaryOp::Mul => self.binary_cell(prefix, "mul", CellOp::Mul, l_net, l_width, r_net, r_width, max_w),
            BinaryOp::BitAnd => self.binary_cell(prefix, "and", CellOp::And, l_net, l_width, r_net, r_width, max_w),
            BinaryOp::BitOr => self.binary_cell(prefix, "or", CellOp::Or, l_net, l_width, r_net, r_width, max_w),
            BinaryOp::BitXor => self.binary_cell(prefix, "xor", CellOp::Xor, l_net, l_width, r_net, r_width, max_w),
            BinaryOp::BitXnor => self.binary_cell(prefix, "xnor", CellOp::Xnor, l_net, l_width, r_net, r_width, max_w),
            BinaryOp::Eq | BinaryOp::CaseEq => self.binary_cell(prefix, "eq", CellOp::Eq, l_net, l_width, r_net, r_width, 1),
            BinaryOp::Neq | BinaryOp::CaseNeq => self.binary_cell(prefix, "neq", CellOp::Neq, l_net, l_width, r_net, r_width, 1),
            BinaryOp::Lt => self.binary_cell(prefix, "lt", CellOp::Lt, l_net, l_width, r_net, r_width, 1),
            BinaryOp::Le => self.binary_cell(prefix, "le", CellOp::Le, l_net, l_width, r_net, r_width, 1),
            BinaryOp::Gt => self.binary_cell(prefix, "gt", CellOp::Gt, l_net, l_width, r_net, r_width, 1),
            BinaryOp::Ge => self.binary_cell(prefix, "ge", CellOp::Ge, l_net, l_width, r_net, r_width, 1),
            BinaryOp::Shl | BinaryOp::AShl => self.binary_cell(prefix, "shl", CellOp::Shl, l_net, l_width, r_net, r_width, l_width),
            BinaryOp::Shr => self.binary_cell(prefix, "shr", CellOp::Shr, l_net, l_width, r_net, r_width, l_width),
            BinaryOp::AShr => self.binary_cell(prefix, "sshr", CellOp::Sshr, l_net, l_width, r_net, r_width, l_width),
            BinaryOp::LogAnd => {
                let lb = self.reduce_to_bool(prefix, l_net, l_width)?;
                let rb = self.reduce_to_bool(prefix, r_net, r_width)?;
                self.binary_cell(prefix, "and", CellOp::And, lb, 1, rb, 1, 1)
            }
            BinaryOp::LogOr => {
                let lb = self.reduce_to_bool(prefix, l_net, l_width)?;
                let rb = self.reduce_to_bool(prefix, r_net, r_width)?;
                self.binary_cell(prefix, "or", CellOp::Or, lb, 1, rb, 1, 1)
            }
            BinaryOp::Div | BinaryOp::Mod | BinaryOp::Pow => Err(ElaborationError::Unsupported {
                what: "division, modulo, and power are only supported in constant expressions".to_string(),
                span,
            }),
        }
    }

    /// Returns `expr`'s `is_signed` literal flag if `expr` resolves to a
    /// plain numeric literal (through parens and a leading unary minus),
    /// `None` otherwise. Nets carry no signedness of their own — this is
    /// the only place that information survives past lowering, so it's
    /// the only place a signed/unsigned mix can be detected at all.
    fn literal_signedness(&self, expr: &Expr) -> Option<bool> {
        match expr {
            Expr::Literal { span } => resolve_integer_literal(self.span_text(*span)).map(|lit| lit.signed),
            Expr::Paren { inner, .. } => self.literal_signedness(inner),
            Expr::Unary { op: UnaryOp::Minus, operand, .. } => self.literal_signedness(operand),
            _ => None,
        }
    }

    /// If `net` is already a single bit, returns it unchanged; otherwise
    /// reduces it to a truthiness bit via `REDUCE_OR`.
    fn reduce_to_bool(&mut self, prefix: &str, net: NetId, width: u32) -> Result<NetId, ElaborationError> {
        if width <= 1 {
            Ok(net)
        } else {
            let (out, _) = self.unary_cell(prefix, "redor", CellOp::ReduceOr, net, width, 1)?;
            Ok(out)
        }
    }

    fn new_cell(&mut self, prefix: &str, kind: &str, op: CellOp) -> aion_ir::CellId {
        let name = format!("{prefix}{}", self.fresh_name(kind));
        self.nl.add_cell(op, name)
    }

    fn new_cell_with_attrs(&mut self, prefix: &str, kind: &str, op: CellOp, attrs: aion_ir::Attributes) -> aion_ir::CellId {
        let name = format!("{prefix}{}", self.fresh_name(kind));
        self.nl.add_cell_with_attrs(op, name, attrs)
    }

    fn unary_cell(
        &mut self,
        prefix: &str,
        kind: &str,
        op: CellOp,
        a_net: NetId,
        a_width: u32,
        out_width: u32,
    ) -> Result<(NetId, u32), ElaborationError> {
        let cell = self.new_cell(prefix, kind, op);
        let a = self.nl.add_input_pin(cell, "A", BitWidth::from_bits(a_width))?;
        self.nl.add_sink(a_net, a)?;
        let y = self.nl.add_output_pin(cell, "Y", BitWidth::from_bits(out_width))?;
        let out_net = self.nl.add_net(BitWidth::from_bits(out_width));
        self.nl.bind_driver(out_net, y)?;
        Ok((out_net, out_width))
    }

    #[allow(clippy::too_many_arguments)]
    fn binary_cell(
        &mut self,
        prefix: &str,
        kind: &str,
        op: CellOp,
        a_net: NetId,
        a_width: u32,
        b_net: NetId,
        b_width: u32,
        out_width: u32,
    ) -> Result<(NetId, u32), ElaborationError> {
        let cell = self.new_cell(prefix, kind, op);
        let a = self.nl.add_input_pin(cell, "A", BitWidth::from_bits(a_width))?;
        let b = self.nl.add_input_pin(cell, "B", BitWidth::from_bits(b_width))?;
        self.nl.add_sink(a_net, a)?;
        self.nl.add_sink(b_net, b)?;
        let y = self.nl.add_output_pin(cell, "Y", BitWidth::from_bits(out_width))?;
        let out_net = self.nl.add_net(BitWidth::from_bits(out_width));
        self.nl.bind_driver(out_net, y)?;
        Ok((out_net, out_width))
    }

    /// Allocates a `CONST` cell driving a fresh net of `value` wrapped to `width` bits.
    pub(crate) fn const_net(&mut self, prefix: &str, value: i64, width: u32) -> NetId {
        let mut attrs = aion_ir::Attributes::new();
        attrs.insert("value".to_string(), AttrValue::Int(value));
        let cell = self.new_cell_with_attrs(prefix, "const", CellOp::Const, attrs);
        let y = self
            .nl
            .add_output_pin(cell, "Y", BitWidth::from_bits(width))
            .expect("freshly created cell accepts a pin");
        let net = self.nl.add_net(BitWidth::from_bits(width));
        self.nl.bind_driver(net, y).expect("freshly created net accepts a driver");
        net
    }
}
