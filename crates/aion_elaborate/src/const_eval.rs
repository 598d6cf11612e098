//! Constant-expression evaluation for elaboration.
//!
//! Used to resolve parameters, `localparam`s, slice/index bounds, generate
//! conditions, and loop bounds — every place elaboration requires a
//! compile-time-constant value rather than a netlist value.

use std::collections::HashMap;

use aion_common::Interner;
use aion_source::Span;
use aion_verilog_parser::ast::{BinaryOp, Expr, UnaryOp};
use aion_verilog_parser::literal::resolve_integer_literal;

use crate::errors::ElaborationError;

/// The constant environment: names in scope (parameters, `localparam`s, the
/// current genvar binding) mapped to their resolved `i64` values.
pub type ConstEnv = HashMap<String, i64>;

/// Evaluates `expr` as a compile-time constant integer, using `env` to
/// resolve identifiers and `source`/`interner` to decode literals and names.
pub fn eval_const_expr(
    expr: &Expr,
    env: &ConstEnv,
    source: &str,
    interner: &Interner,
) -> Result<i64, ElaborationError> {
    match expr {
        Expr::Literal { span } => resolve_integer_literal(text_at(source, *span))
            .map(|lit| lit.value)
            .ok_or_else(|| ElaborationError::NotConstant {
                message: format!("malformed numeric literal `{}`", text_at(source, *span)),
                span: *span,
            }),
        Expr::Identifier { name, span } => {
            let text = interner.resolve(*name);
            env.get(text).copied().ok_or_else(|| ElaborationError::NotConstant {
                message: format!("`{text}` is not a constant in this context"),
                span: *span,
            })
        }
        Expr::HierarchicalName { parts, span } => {
            let joined = parts.iter().map(|p| interner.resolve(*p)).collect::<Vec<_>>().join(".");
            env.get(&joined).copied().ok_or_else(|| ElaborationError::NotConstant {
                message: format!("`{joined}` is not a constant in this context"),
                span: *span,
            })
        }
        Expr::Unary { op, operand, span } => {
            let v = eval_const_expr(operand, env, source, interner)?;
            match op {
                UnaryOp::Plus => Ok(v),
                UnaryOp::Minus => Ok(-v),
                UnaryOp::BitNot => Ok(!v),
                UnaryOp::LogNot => Ok(if v == 0 { 1 } else { 0 }),
                UnaryOp::RedAnd | UnaryOp::RedOr | UnaryOp::RedXor | UnaryOp::RedNand
                | UnaryOp::RedNor | UnaryOp::RedXnor => Err(ElaborationError::Unsupported {
                    what: "reduction operator in a constant expression".to_string(),
                    span: *span,
                }),
            }
        }
        Expr::Binary { left, op, right, span } => {
            let l = eval_const_expr(left, env, source, interner)?;
            let r = eval_const_expr(right, env, source, interner)?;
            match op {
                BinaryOp::Add => Ok(l.wrapping_add(r)),
                BinaryOp::Sub => Ok(l.wrapping_sub(r)),
                BinaryOp::Mul => Ok(l.wrapping_mul(r)),
                BinaryOp::Div => {
                    if r == 0 {
                        Err(ElaborationError::NotConstant { message: "division by zero".to_string(), span: *span })
                    } else {
                        Ok(l / r)
                    }
                }
                BinaryOp::Mod => {
                    if r == 0 {
                        Err(ElaborationError::NotConstant { message: "modulo by zero".to_string(), span: *span })
                    } else {
                        Ok(l % r)
                    }
                }
                BinaryOp::Pow => Ok(if r >= 0 { l.pow(r as u32) } else { 0 }),
                BinaryOp::BitAnd => Ok(l & r),
                BinaryOp::BitOr => Ok(l | r),
                BinaryOp::BitXor => Ok(l ^ r),
                BinaryOp::BitXnor => Ok(!(l ^ r)),
                BinaryOp::Shl | BinaryOp::AShl => Ok(l.wrapping_shl(r as u32)),
                BinaryOp::Shr | BinaryOp::AShr => Ok(l.wrapping_shr(r as u32)),
                BinaryOp::Eq | BinaryOp::CaseEq => Ok(bool_to_i64(l == r)),
                BinaryOp::Neq | BinaryOp::CaseNeq => Ok(bool_to_i64(l != r)),
                BinaryOp::Lt => Ok(bool_to_i64(l < r)),
                BinaryOp::Le => Ok(bool_to_i64(l <= r)),
                BinaryOp::Gt => Ok(bool_to_i64(l > r)),
                BinaryOp::Ge => Ok(bool_to_i64(l >= r)),
                BinaryOp::LogAnd => Ok(bool_to_i64(l != 0 && r != 0)),
                BinaryOp::LogOr => Ok(bool_to_i64(l != 0 || r != 0)),
            }
        }
        Expr::Ternary { condition, then_expr, else_expr, .. } => {
            let c = eval_const_expr(condition, env, source, interner)?;
            if c != 0 {
                eval_const_expr(then_expr, env, source, interner)
            } else {
                eval_const_expr(else_expr, env, source, interner)
            }
        }
        Expr::Paren { inner, .. } => eval_const_expr(inner, env, source, interner),
        Expr::SystemCall { name, args, span } => {
            let name = interner.resolve(*name);
            if name == "$clog2" && args.len() == 1 {
                let v = eval_const_expr(&args[0], env, source, interner)?;
                Ok(clog2(v))
            } else {
                Err(ElaborationError::Unsupported {
                    what: format!("system call `{name}` in a constant expression"),
                    span: *span,
                })
            }
        }
        other => Err(ElaborationError::Unsupported {
            what: "expression form in a constant context".to_string(),
            span: other.span(),
        }),
    }
}

/// Evaluates `expr` returning a fallback span-carrying error if the type
/// isn't representable. Narrow convenience over the raw text slice.
fn text_at(source: &str, span: Span) -> &str {
    &source[span.start as usize..span.end as usize]
}

fn bool_to_i64(b: bool) -> i64 {
    if b {
        1
    } else {
        0
    }
}

/// `$clog2`: the number of bits needed to represent `n` distinct values.
/// `clog2(0) == clog2(1) == 0`, matching the common synthesis convention.
fn clog2(n: i64) -> i64 {
    if n <= 1 {
        return 0;
    }
    let mut bits = 0;
    let mut v: i64 = 1;
    while v < n {
        v <<= 1;
        bits += 1;
    }
    bits
}
