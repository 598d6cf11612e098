//! Fanout statistics over a netlist's nets.

use aion_ir::Netlist;
use serde::{Deserialize, Serialize};

/// Summary fanout statistics across every net in a netlist.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FanoutStats {
    /// The highest fanout (sink count) of any net, or 0 if there are no nets.
    pub max_fanout: usize,
    /// The mean fanout across all nets, or 0.0 if there are no nets.
    pub mean_fanout: f64,
    /// The number of nets with fanout strictly greater than 10.
    pub high_fanout_nets: usize,
}

/// Computes [`FanoutStats`] over every net in `nl`.
pub fn fanout_stats(nl: &Netlist) -> FanoutStats {
    let fanouts: Vec<usize> = nl.nets().map(|n| n.fanout()).collect();
    if fanouts.is_empty() {
        return FanoutStats::default();
    }
    let max_fanout = *fanouts.iter().max().unwrap();
    let mean_fanout = fanouts.iter().sum::<usize>() as f64 / fanouts.len() as f64;
    let high_fanout_nets = fanouts.iter().filter(|&&f| f > 10).count();
    FanoutStats {
        max_fanout,
        mean_fanout,
        high_fanout_nets,
    }
}
