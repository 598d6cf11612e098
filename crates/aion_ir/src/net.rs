//! Nets: single-driver, multi-sink hyperedges connecting pins.

use crate::ids::{NetId, PinId};
use crate::width::BitWidth;
use serde::{Deserialize, Serialize};

/// A single-driver, multi-sink hyperedge carrying one signal.
///
/// Two pins are "connected" iff they share a net. A net's width always
/// equals its driver's width; a net may transiently have no driver while
/// the netlist is under construction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Net {
    pub(crate) id: NetId,
    /// This net's bit-vector width.
    pub width: BitWidth,
    pub(crate) driver: Option<PinId>,
    pub(crate) sinks: Vec<PinId>,
}

impl Net {
    /// This net's unique ID.
    pub fn id(&self) -> NetId {
        self.id
    }

    /// The pin driving this net, if any.
    pub fn driver(&self) -> Option<PinId> {
        self.driver
    }

    /// The pins this net drives.
    pub fn sinks(&self) -> &[PinId] {
        &self.sinks
    }

    /// The number of sinks on this net (its fanout).
    pub fn fanout(&self) -> usize {
        self.sinks.len()
    }

    /// A net with no driver and no sinks is garbage and must be dropped.
    pub fn is_garbage(&self) -> bool {
        self.driver.is_none() && self.sinks.is_empty()
    }
}
