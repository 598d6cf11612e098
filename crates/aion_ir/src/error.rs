//! Errors raised by netlist construction and mutation.

use crate::ids::{CellId, NetId, PinId};
use thiserror::Error;

/// An error raised by a [`Netlist`](crate::Netlist) construction or mutation operation.
///
/// These are internal invariant violations, not user-facing compiler errors
/// (those are `LexerError`/`ParseError`/`ElaborationError` in the crates
/// that produce them) — a well-behaved elaborator or optimizer should never
/// trigger one.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NetlistError {
    /// A net already has a driver and the caller tried to bind a different one.
    #[error("net {net:?} already has a driver pin; cannot rebind to {new_driver:?}")]
    DriverConflict {
        /// The net with a conflicting driver.
        net: NetId,
        /// The pin that could not be bound as its driver.
        new_driver: PinId,
    },
    /// An operation referenced a cell not present in the netlist.
    #[error("cell {0:?} is not present in this netlist")]
    UnknownCell(CellId),
    /// An operation referenced a net not present in the netlist.
    #[error("net {0:?} is not present in this netlist")]
    UnknownNet(NetId),
    /// An operation referenced a pin not present in the netlist.
    #[error("pin {0:?} is not present in this netlist")]
    UnknownPin(PinId),
    /// Attempted to connect an input pin as a driver, or an output pin as a sink.
    #[error("pin {0:?} has the wrong direction for this operation")]
    WrongDirection(PinId),
    /// A cell has no pin with the given name.
    #[error("cell {0:?} has no pin named {1:?}")]
    UnknownPinName(CellId, String),
}
