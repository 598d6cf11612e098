//! Constant propagation: replaces cells whose inputs are all driven by
//! `CONST` with a new `CONST` cell evaluating the operation, repeating until
//! no further cell can be folded.

use std::collections::HashMap;

use aion_common::{AionResult, InternalError};
use aion_ir::{Cell, CellId, CellOp, Netlist};

/// Runs constant propagation to a fixed point. Returns the total number of
/// cells replaced with constants.
pub(crate) fn constant_propagation(nl: &mut Netlist) -> AionResult<usize> {
    let mut propagated = 0;
    loop {
        let mut to_replace: Vec<(CellId, i64)> = Vec::new();
        for cell in nl.cells() {
            if !cell.op.is_foldable() {
                continue;
            }
            let Some(inputs) = constant_inputs(nl, cell) else { continue };
            if let Some(value) = evaluate(nl, cell, &inputs) {
                to_replace.push((cell.id(), value));
            }
        }
        if to_replace.is_empty() {
            break;
        }
        for (cell, value) in to_replace {
            nl.replace_with_const(cell, value)
                .map_err(|e| InternalError::new(e.to_string()))?;
            propagated += 1;
        }
    }
    Ok(propagated)
}

/// Returns a pin-name → value map, or `None` if any input pin of `cell` is
/// unconnected or not driven by a `CONST` cell.
fn constant_inputs(nl: &Netlist, cell: &Cell) -> Option<HashMap<String, i64>> {
    let mut values = HashMap::new();
    for (name, pin) in cell.inputs() {
        let net_id = nl.pin(pin)?.net()?;
        let driver_pin = nl.net(net_id)?.driver()?;
        let driver = nl.cell(nl.pin(driver_pin)?.cell())?;
        if driver.op != CellOp::Const {
            return None;
        }
        values.insert(name.to_string(), driver.attributes.get("value")?.as_int()?);
    }
    Some(values)
}

/// Evaluates `cell` under fully-constant `inputs`, at the two's-complement
/// wrap width of its output pin. Returns `None` for ops this pass does not
/// fold (e.g. `MUL`, `CONCAT`, `PMUX`).
fn evaluate(nl: &Netlist, cell: &Cell, inputs: &HashMap<String, i64>) -> Option<i64> {
    let a = *inputs.get("A").unwrap_or(&0);
    let b = *inputs.get("B").unwrap_or(&0);
    let out_width = cell
        .output("Y")
        .and_then(|p| nl.pin(p))
        .map(|p| p.width.bits())
        .unwrap_or(1);
    let mask: u64 = if out_width >= 64 { u64::MAX } else { (1u64 << out_width) - 1 };
    let wrap = |v: i64| (v as u64 & mask) as i64;
    let shift_in_range = |amount: i64| (0..64).contains(&amount);

    Some(match cell.op {
        CellOp::Buf => a,
        CellOp::Not => wrap(!a),
        CellOp::Neg => wrap(a.wrapping_neg()),
        CellOp::And => a & b,
        CellOp::Or => a | b,
        CellOp::Xor => a ^ b,
        CellOp::Nand => wrap(!(a & b)),
        CellOp::Nor => wrap(!(a | b)),
        CellOp::Xnor => wrap(!(a ^ b)),
        CellOp::Add => wrap(a.wrapping_add(b)),
        CellOp::Sub => wrap(a.wrapping_sub(b)),
        CellOp::Eq => (a == b) as i64,
        CellOp::Neq => (a != b) as i64,
        CellOp::Lt => (a < b) as i64,
        CellOp::Le => (a <= b) as i64,
        CellOp::Gt => (a > b) as i64,
        CellOp::Ge => (a >= b) as i64,
        CellOp::Shl if shift_in_range(b) => wrap(a << b),
        CellOp::Shr if shift_in_range(b) => a >> b,
        CellOp::Mux => {
            let s = *inputs.get("S").unwrap_or(&0);
            if s != 0 { b } else { a }
        }
        _ => return None,
    })
}
