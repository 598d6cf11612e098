//! The optimizer driver: runs an ordered pass list to a fixed point.
//!
//! Iterates the pass list until an entire sweep makes no further rewrite —
//! giving the idempotence guarantee that running the optimizer again on its
//! own output is always a no-op.

use std::collections::BTreeMap;

use aion_common::{AionResult, InternalError};
use aion_ir::Netlist;

use crate::algebraic::algebraic_simplification;
use crate::const_prop::constant_propagation;
use crate::cse::common_subexpression_elimination;
use crate::dce::dead_code_elimination;
use crate::identity::identity_elimination;
use crate::strength_reduce::strength_reduction;

/// Eliminates `x & 1s`, `x | 0`, `x ^ 0`, `x + 0`, `x - 0`, `x << 0`, `x >> 0`.
pub const IDENTITY: &str = "identity";
/// Eliminates `x & x`, `x | x`, `x ^ x`, `x - x`.
pub const ALGEBRAIC: &str = "algebraic";
/// Folds cells whose inputs are all `CONST`.
pub const CONSTANT_PROP: &str = "constant_prop";
/// Rewrites `MUL` by a power of two as `SHL`.
pub const STRENGTH_REDUCE: &str = "strength_reduce";
/// Removes cells with no path to a `MODULE_OUTPUT`.
pub const DEAD_CODE: &str = "dead_code";
/// Merges cells computing the same operation over the same inputs.
pub const CSE: &str = "cse";

/// The default pass order.
pub const DEFAULT_PASSES: &[&str] = &[IDENTITY, ALGEBRAIC, CONSTANT_PROP, STRENGTH_REDUCE, DEAD_CODE, CSE];

/// Runs `passes` (or [`DEFAULT_PASSES`] if `None`) over `nl` repeatedly until
/// a complete sweep rewrites nothing. Returns the total number of rewrites
/// made by each pass, by name.
pub fn optimize(nl: &mut Netlist, passes: Option<&[&str]>) -> AionResult<BTreeMap<String, usize>> {
    let passes = passes.unwrap_or(DEFAULT_PASSES);
    let mut totals: BTreeMap<String, usize> = passes.iter().map(|&p| (p.to_string(), 0)).collect();

    loop {
        let mut changed = false;
        for &pass in passes {
            let count = run_pass(nl, pass)?;
            if count > 0 {
                changed = true;
            }
            *totals.entry(pass.to_string()).or_insert(0) += count;
        }
        if !changed {
            break;
        }
    }

    Ok(totals)
}

fn run_pass(nl: &mut Netlist, pass: &str) -> AionResult<usize> {
    match pass {
        IDENTITY => identity_elimination(nl),
        ALGEBRAIC => algebraic_simplification(nl),
        CONSTANT_PROP => constant_propagation(nl),
        STRENGTH_REDUCE => strength_reduction(nl),
        DEAD_CODE => dead_code_elimination(nl),
        CSE => common_subexpression_elimination(nl),
        other => Err(InternalError::new(format!("unknown optimizer pass `{other}`"))),
    }
}
