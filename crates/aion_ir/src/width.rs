//! Bit-vector widths for pins and nets.

use serde::{Deserialize, Serialize};

/// A pin or net's bit-vector width, `[msb:lsb]`.
///
/// Verilog ranges may be declared with arbitrary sign (`[0:7]` is legal, if
/// unusual); `msb`/`lsb` are kept exactly as declared, and [`BitWidth::bits`]
/// always returns the positive bit count regardless of orientation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct BitWidth {
    /// The most-significant bit index as declared.
    pub msb: i32,
    /// The least-significant bit index as declared.
    pub lsb: i32,
}

impl BitWidth {
    /// A single-bit width, `[0:0]`.
    pub const BIT: BitWidth = BitWidth { msb: 0, lsb: 0 };

    /// Creates a `[msb:lsb]` width.
    pub fn new(msb: i32, lsb: i32) -> Self {
        Self { msb, lsb }
    }

    /// Creates a normalized `[width-1:0]` width.
    pub fn from_bits(bits: u32) -> Self {
        Self {
            msb: bits as i32 - 1,
            lsb: 0,
        }
    }

    /// The number of bits this width spans.
    pub fn bits(&self) -> u32 {
        self.msb.abs_diff(self.lsb) + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_width() {
        let w = BitWidth::from_bits(8);
        assert_eq!(w.msb, 7);
        assert_eq!(w.lsb, 0);
        assert_eq!(w.bits(), 8);
    }

    #[test]
    fn reversed_range_still_counts_bits() {
        let w = BitWidth::new(0, 7);
        assert_eq!(w.bits(), 8);
    }

    #[test]
    fn single_bit() {
        assert_eq!(BitWidth::BIT.bits(), 1);
    }
}
