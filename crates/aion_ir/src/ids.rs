//! Opaque ID newtypes for netlist entities, backed by process-wide monotonic counters.
//!
//! Cell, net, and pin IDs are allocated from `AtomicU32` counters rather than
//! from dense arena positions, since cells and nets are deleted during
//! optimization while their IDs must stay unique and stable for the lifetime
//! of anything still referencing them. [`reset_id_counters`] rewinds all three
//! counters to zero; it exists purely so golden-file tests can get
//! deterministic IDs and must not be called while other such tests run
//! concurrently (guarded in-crate with [`tests::TEST_LOCK`]).

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $counter:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` value.
            ///
            /// Intended for deserialization and tests; normal code should
            /// obtain IDs from allocation, not construct them directly.
            pub fn from_raw(raw: u32) -> Self {
                Self(raw)
            }

            /// Returns the raw `u32` value of this ID.
            pub fn as_raw(self) -> u32 {
                self.0
            }

            pub(crate) fn next() -> Self {
                Self($counter.fetch_add(1, Ordering::Relaxed))
            }
        }

        static $counter: AtomicU32 = AtomicU32::new(0);
    };
}

define_id!(
    /// Opaque, unique ID for a cell in a [`Netlist`](crate::Netlist).
    CellId,
    CELL_COUNTER
);

define_id!(
    /// Opaque, unique ID for a net (hyperedge) in a [`Netlist`](crate::Netlist).
    NetId,
    NET_COUNTER
);

define_id!(
    /// Opaque, unique ID for a pin owned by a cell.
    PinId,
    PIN_COUNTER
);

/// Rewinds the cell, net, and pin ID counters to zero.
///
/// A test convenience only, not a production guarantee. Tests that rely on
/// specific ID sequences must call this first and must not run concurrently
/// with other such tests.
pub fn reset_id_counters() {
    CELL_COUNTER.store(0, Ordering::Relaxed);
    NET_COUNTER.store(0, Ordering::Relaxed);
    PIN_COUNTER.store(0, Ordering::Relaxed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Serializes tests that reset the global ID counters; `cargo test` runs
    /// test functions in parallel threads by default within one binary.
    pub(crate) static TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn ids_are_monotonic_and_resettable() {
        let _guard = TEST_LOCK.lock().unwrap();
        reset_id_counters();
        let a = CellId::next();
        let b = CellId::next();
        assert_eq!(a.as_raw(), 0);
        assert_eq!(b.as_raw(), 1);
        reset_id_counters();
        let c = CellId::next();
        assert_eq!(c.as_raw(), 0);
    }

    #[test]
    fn counters_are_independent() {
        let _guard = TEST_LOCK.lock().unwrap();
        reset_id_counters();
        let cell = CellId::next();
        let net = NetId::next();
        let pin = PinId::next();
        assert_eq!(cell.as_raw(), 0);
        assert_eq!(net.as_raw(), 0);
        assert_eq!(pin.as_raw(), 0);
    }

    #[test]
    fn raw_roundtrip() {
        let id = CellId::from_raw(42);
        assert_eq!(id.as_raw(), 42);
    }
}
