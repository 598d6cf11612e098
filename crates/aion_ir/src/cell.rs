//! Cell operations (the closed primitive set) and the [`Cell`] type.

use crate::ids::{CellId, PinId};
use serde::{Deserialize, Serialize};

/// The closed set of primitive operations a [`Cell`] may perform.
///
/// This enumeration is exhaustive; adding a synthesizable primitive means
/// adding a variant here, which breaks every exhaustive match over it at
/// compile time.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum CellOp {
    /// A constant driver; carries an integer `value` attribute.
    Const,
    /// Single-input passthrough buffer.
    Buf,
    /// Bitwise NOT.
    Not,
    /// Bitwise AND.
    And,
    /// Bitwise OR.
    Or,
    /// Bitwise XOR.
    Xor,
    /// Bitwise NAND.
    Nand,
    /// Bitwise NOR.
    Nor,
    /// Bitwise XNOR.
    Xnor,
    /// Unary reduction-AND.
    ReduceAnd,
    /// Unary reduction-OR.
    ReduceOr,
    /// Unary reduction-XOR.
    ReduceXor,
    /// Two's-complement addition.
    Add,
    /// Two's-complement subtraction.
    Sub,
    /// Multiplication.
    Mul,
    /// Two's-complement negation.
    Neg,
    /// Equality comparison.
    Eq,
    /// Inequality comparison.
    Neq,
    /// Less-than comparison.
    Lt,
    /// Less-or-equal comparison.
    Le,
    /// Greater-than comparison.
    Gt,
    /// Greater-or-equal comparison.
    Ge,
    /// Logical left shift.
    Shl,
    /// Logical right shift.
    Shr,
    /// Arithmetic (sign-extending) right shift.
    Sshr,
    /// 2-to-1 multiplexer: `S=0 -> A`, `S=1 -> B`.
    Mux,
    /// Priority multiplexer, used to lower `case` statements.
    Pmux,
    /// Bit concatenation.
    Concat,
    /// A bit or part select; carries `msb`/`lsb` attributes.
    Slice,
    /// Bit replication.
    Repeat,
    /// Plain D flip-flop (no reset).
    Dff,
    /// D flip-flop with reset.
    DffR,
    /// D flip-flop with reset and clock enable.
    DffRe,
    /// D flip-flop with set.
    DffS,
    /// Memory read port; carries `memory` and `depth` attributes.
    MemRd,
    /// Memory write port; carries `memory` and `depth` attributes.
    MemWr,
    /// Module input port boundary: one output pin, no inputs.
    ModuleInput,
    /// Module output port boundary: one input pin, no outputs.
    ModuleOutput,
}

impl CellOp {
    /// Returns `true` for the flip-flop family (`DFF`, `DFFR`, `DFFRE`, `DFFS`).
    pub fn is_sequential(self) -> bool {
        matches!(
            self,
            CellOp::Dff | CellOp::DffR | CellOp::DffRe | CellOp::DffS
        )
    }

    /// Returns `true` for memory read/write ports.
    pub fn is_memory(self) -> bool {
        matches!(self, CellOp::MemRd | CellOp::MemWr)
    }

    /// Returns `true` for the structural module-boundary cells.
    pub fn is_io(self) -> bool {
        matches!(self, CellOp::ModuleInput | CellOp::ModuleOutput)
    }

    /// Returns `true` for cells whose output can be computed purely from
    /// constant inputs by the constant-propagation pass (everything except
    /// I/O boundary cells and cells that are already `CONST`).
    pub fn is_foldable(self) -> bool {
        !self.is_io() && self != CellOp::Const
    }
}

/// A node in the netlist performing one primitive [`CellOp`].
///
/// Input and output pins are stored as ordered, name-keyed lists (pin order
/// matters for e.g. BLIF/DOT emission and is preserved from first insertion).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Cell {
    pub(crate) id: CellId,
    /// The primitive operation this cell performs.
    pub op: CellOp,
    /// A unique name for this cell within its netlist.
    pub name: String,
    pub(crate) inputs: Vec<(String, PinId)>,
    pub(crate) outputs: Vec<(String, PinId)>,
    /// Free-form attributes (`value`, `memory`, `depth`, `msb`, `lsb`, ...).
    pub attributes: crate::attr::Attributes,
}

impl Cell {
    /// This cell's unique ID.
    pub fn id(&self) -> CellId {
        self.id
    }

    /// Looks up an input pin by name.
    pub fn input(&self, name: &str) -> Option<PinId> {
        self.inputs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, id)| *id)
    }

    /// Looks up an output pin by name.
    pub fn output(&self, name: &str) -> Option<PinId> {
        self.outputs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, id)| *id)
    }

    /// Iterates over this cell's input pins in declaration order.
    pub fn inputs(&self) -> impl Iterator<Item = (&str, PinId)> {
        self.inputs.iter().map(|(n, id)| (n.as_str(), *id))
    }

    /// Iterates over this cell's output pins in declaration order.
    pub fn outputs(&self) -> impl Iterator<Item = (&str, PinId)> {
        self.outputs.iter().map(|(n, id)| (n.as_str(), *id))
    }
}
