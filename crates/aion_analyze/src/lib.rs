//! Read-only netlist analysis: resource counts, fanout statistics,
//! combinational depth, hierarchy summaries, and DOT export.
//!
//! Every query here takes `&Netlist` and makes no mutations.

#![warn(missing_docs)]

mod depth;
mod dot;
mod fanout;
mod hierarchy;
mod resource;

pub use depth::{combinational_depth, depth_summary, DepthSummary};
pub use dot::{to_dot, DotOptions};
pub use fanout::{fanout_stats, FanoutStats};
pub use hierarchy::hierarchy_summary;
pub use resource::{cell_type_distribution, resource_usage, ResourceUsage};

use aion_ir::Netlist;
use std::collections::BTreeMap;

/// A bundle of every analysis this crate offers, computed in one call.
#[derive(Clone, Debug)]
pub struct AnalysisReport {
    /// Bucketed resource usage.
    pub resource_usage: ResourceUsage,
    /// Histogram of cell-op kinds.
    pub cell_distribution: BTreeMap<String, usize>,
    /// Net fanout statistics.
    pub fanout: FanoutStats,
    /// Combinational depth summary.
    pub depth: DepthSummary,
}

/// Runs every analysis in this crate over `nl` and bundles the results.
pub fn analyze(nl: &Netlist) -> AnalysisReport {
    AnalysisReport {
        resource_usage: resource_usage(nl),
        cell_distribution: cell_type_distribution(nl),
        fanout: fanout_stats(nl),
        depth: depth_summary(nl),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aion_ir::{reset_id_counters, BitWidth, CellOp};

    #[test]
    fn analyze_bundles_all_reports() {
        reset_id_counters();
        let mut nl = Netlist::new("t");
        let a = nl.add_cell(CellOp::ModuleInput, "a");
        let a_y = nl.add_output_pin(a, "Y", BitWidth::BIT).unwrap();
        let not0 = nl.add_cell(CellOp::Not, "not0");
        let not0_a = nl.add_input_pin(not0, "A", BitWidth::BIT).unwrap();
        nl.add_output_pin(not0, "Y", BitWidth::BIT).unwrap();
        nl.connect(a_y, not0_a).unwrap();

        let report = analyze(&nl);
        assert_eq!(report.resource_usage.luts, 1);
        assert_eq!(report.depth.max_depth, 1);
        assert_eq!(report.cell_distribution.get("Not"), Some(&1));
    }
}
