//! Combinational logic depth per cell.
//!
//! "Primary inputs and sequential cells have depth 0; other cells have depth
//! one greater than the max depth of their driving cells" — computed by
//! memoized depth-first traversal over [`Netlist::fanin_cells`].

use std::collections::{HashMap, HashSet};

use aion_ir::{CellId, Netlist};
use serde::{Deserialize, Serialize};

/// Per-cell combinational depth, keyed by [`CellId`].
pub fn combinational_depth(nl: &Netlist) -> HashMap<CellId, u32> {
    let mut memo = HashMap::new();
    let mut visiting = HashSet::new();
    for cell in nl.cells() {
        visit(nl, cell.id(), &mut memo, &mut visiting);
    }
    memo
}

/// Depth-first visit with memoization. `visiting` guards against infinite
/// recursion through a combinational cycle (which should not exist in a
/// well-formed netlist, but the analyzer makes no mutations and must not
/// hang on a malformed one); a back-edge is treated as depth 0 at the point
/// it's found.
fn visit(
    nl: &Netlist,
    cell: CellId,
    memo: &mut HashMap<CellId, u32>,
    visiting: &mut HashSet<CellId>,
) -> u32 {
    if let Some(&d) = memo.get(&cell) {
        return d;
    }
    let Some(c) = nl.cell(cell) else { return 0 };
    if c.op == aion_ir::CellOp::ModuleInput || c.op.is_sequential() {
        memo.insert(cell, 0);
        return 0;
    }
    if !visiting.insert(cell) {
        return 0;
    }
    let max_input_depth = nl
        .fanin_cells(cell)
        .into_iter()
        .map(|p| visit(nl, p, memo, visiting))
        .max()
        .unwrap_or(0);
    visiting.remove(&cell);
    let depth = max_input_depth + 1;
    memo.insert(cell, depth);
    depth
}

/// Summary of combinational depth across every cell in a netlist.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DepthSummary {
    /// The maximum combinational depth of any cell, or 0 if the netlist is empty.
    pub max_depth: u32,
    /// The mean combinational depth across all cells, or 0.0 if empty.
    pub mean_depth: f64,
    /// Every cell realizing `max_depth`.
    pub critical_cells: Vec<CellId>,
}

/// Computes [`DepthSummary`] over `nl`.
pub fn depth_summary(nl: &Netlist) -> DepthSummary {
    let depths = combinational_depth(nl);
    if depths.is_empty() {
        return DepthSummary::default();
    }
    let max_depth = *depths.values().max().unwrap();
    let mean_depth = depths.values().copied().sum::<u32>() as f64 / depths.len() as f64;
    let mut critical_cells: Vec<CellId> = depths
        .iter()
        .filter(|(_, &d)| d == max_depth)
        .map(|(&c, _)| c)
        .collect();
    critical_cells.sort();
    DepthSummary {
        max_depth,
        mean_depth,
        critical_cells,
    }
}
