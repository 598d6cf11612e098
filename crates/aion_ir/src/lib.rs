//! AionIR — the netlist hypergraph intermediate representation.
//!
//! This crate defines the [`Netlist`] hypergraph — [`Cell`]s joined by
//! [`Net`]s through named, directional [`Pin`]s — that the elaborator
//! (`aion_elaborate`) produces from an AST, the optimizer (`aion_synth`)
//! rewrites in place, and the analyzer (`aion_analyze`) queries. It is the
//! lingua franca between every stage after parsing.

#![warn(missing_docs)]

mod attr;
mod cell;
mod error;
mod ids;
mod net;
mod netlist;
mod pin;
mod width;

pub use attr::{AttrValue, Attributes};
pub use cell::{Cell, CellOp};
pub use error::NetlistError;
pub use ids::{reset_id_counters, CellId, NetId, PinId};
pub use net::Net;
pub use netlist::Netlist;
pub use pin::{Direction, Pin};
pub use width::BitWidth;
