//! Pins: named, directional connection points on a cell.

use crate::ids::{CellId, NetId, PinId};
use crate::width::BitWidth;
use serde::{Deserialize, Serialize};

/// The direction of a [`Pin`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Direction {
    /// An input pin — may be a sink on at most one net.
    Input,
    /// An output pin — may drive at most one net.
    Output,
}

/// A named connection point on a cell.
///
/// Every pin belongs to exactly one cell and is connected to at most one
/// net at a time. Back-references (owning cell, connected net) are stored
/// as IDs rather than owning handles — ownership of all entities belongs
/// to the [`Netlist`](crate::Netlist).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Pin {
    pub(crate) id: PinId,
    pub(crate) cell: CellId,
    /// This pin's name, unique among its cell's pins of the same direction.
    pub name: String,
    /// Whether this is an input or output pin.
    pub direction: Direction,
    /// The bit-vector width of this pin.
    pub width: BitWidth,
    pub(crate) net: Option<NetId>,
}

impl Pin {
    /// This pin's unique ID.
    pub fn id(&self) -> PinId {
        self.id
    }

    /// The cell this pin belongs to.
    pub fn cell(&self) -> CellId {
        self.cell
    }

    /// The net this pin is currently connected to, if any.
    pub fn net(&self) -> Option<NetId> {
        self.net
    }
}
