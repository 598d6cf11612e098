//! Local netlist optimization: a fixed-point driver over an ordered
//! pass list of identity elimination, algebraic simplification, constant
//! propagation, strength reduction, dead-code elimination, and common
//! subexpression elimination.
//!
//! Every pass operates purely on an [`aion_ir::Netlist`] in place; the
//! optimizer performs no I/O and raises no user-facing diagnostics — it
//! silently leaves alone any cell it cannot prove safe to rewrite.

#![warn(missing_docs)]

mod algebraic;
mod const_prop;
mod cse;
mod dce;
mod identity;
mod optimize;
mod strength_reduce;

pub use optimize::{optimize, ALGEBRAIC, CONSTANT_PROP, CSE, DEAD_CODE, DEFAULT_PASSES, IDENTITY, STRENGTH_REDUCE};
