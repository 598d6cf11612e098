//! Resource usage estimation and cell-type distribution.

use std::collections::BTreeMap;

use aion_ir::{CellOp, Netlist};
use serde::{Deserialize, Serialize};

/// Resource counts bucketed by cell category.
///
/// `MODULE_INPUT`/`MODULE_OUTPUT` cells are excluded from every bucket and
/// from `total_cells`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceUsage {
    /// "LUT-like" combinational cells: bitwise/reduction/comparison ops.
    pub luts: usize,
    /// Flip-flop cells (`DFF`, `DFFR`, `DFFRE`, `DFFS`).
    pub ffs: usize,
    /// Multiplexer cells (`MUX`, `PMUX`).
    pub muxes: usize,
    /// Adder/subtractor cells (`ADD`, `SUB`).
    pub adders: usize,
    /// Memory port cells (`MEMRD`, `MEMWR`).
    pub memories: usize,
    /// Total non-I/O cells counted across every bucket above, plus anything
    /// uncategorized (e.g. `CONST`, `MUL`, shifts, `CONCAT`/`SLICE`/`REPEAT`).
    pub total_cells: usize,
}

/// Buckets every non-I/O cell in `nl` into a [`ResourceUsage`].
pub fn resource_usage(nl: &Netlist) -> ResourceUsage {
    let mut usage = ResourceUsage::default();
    for cell in nl.cells() {
        if cell.op.is_io() {
            continue;
        }
        usage.total_cells += 1;
        match cell.op {
            op if op.is_sequential() => usage.ffs += 1,
            op if op.is_memory() => usage.memories += 1,
            CellOp::Mux | CellOp::Pmux => usage.muxes += 1,
            CellOp::Add | CellOp::Sub => usage.adders += 1,
            CellOp::And
            | CellOp::Or
            | CellOp::Xor
            | CellOp::Not
            | CellOp::Nand
            | CellOp::Nor
            | CellOp::Xnor
            | CellOp::Eq
            | CellOp::Neq
            | CellOp::Lt
            | CellOp::Le
            | CellOp::Gt
            | CellOp::Ge
            | CellOp::ReduceAnd
            | CellOp::ReduceOr
            | CellOp::ReduceXor => usage.luts += 1,
            _ => {}
        }
    }
    usage
}

/// The histogram of cell-op kinds present in `nl`, keyed by each op's debug
/// name (stable and unique per variant) so the result is a plain string map
/// suitable for reporting.
pub fn cell_type_distribution(nl: &Netlist) -> BTreeMap<String, usize> {
    let mut dist = BTreeMap::new();
    for cell in nl.cells() {
        *dist.entry(format!("{:?}", cell.op)).or_insert(0) += 1;
    }
    dist
}

#[cfg(test)]
mod tests {
    use super::*;
    use aion_ir::{reset_id_counters, BitWidth};

    #[test]
    fn and_gate_resource_usage() {
        reset_id_counters();
        let mut nl = Netlist::new("t");
        let a = nl.add_cell(CellOp::ModuleInput, "a");
        let a_y = nl.add_output_pin(a, "Y", BitWidth::BIT).unwrap();
        let and0 = nl.add_cell(CellOp::And, "and0");
        let and_a = nl.add_input_pin(and0, "A", BitWidth::BIT).unwrap();
        nl.add_input_pin(and0, "B", BitWidth::BIT).unwrap();
        let and_y = nl.add_output_pin(and0, "Y", BitWidth::BIT).unwrap();
        let o = nl.add_cell(CellOp::ModuleOutput, "o");
        let o_in = nl.add_input_pin(o, "A", BitWidth::BIT).unwrap();
        nl.connect(a_y, and_a).unwrap();
        nl.connect(and_y, o_in).unwrap();

        let usage = resource_usage(&nl);
        assert_eq!(usage.luts, 1);
        assert_eq!(usage.total_cells, 1);
        assert_eq!(usage.ffs, 0);
    }

    #[test]
    fn distribution_counts_every_cell_including_io() {
        reset_id_counters();
        let mut nl = Netlist::new("t");
        nl.add_cell(CellOp::ModuleInput, "a");
        nl.add_cell(CellOp::ModuleInput, "b");
        nl.add_cell(CellOp::And, "and0");

        let dist = cell_type_distribution(&nl);
        assert_eq!(dist.get("ModuleInput"), Some(&2));
        assert_eq!(dist.get("And"), Some(&1));
    }
}
