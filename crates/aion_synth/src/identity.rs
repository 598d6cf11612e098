//! Identity elimination: `x & all_ones`, `x | 0`, `x ^ 0`, `x + 0`, `x - 0`,
//! `x << 0`, `x >> 0` all reduce to `x`.

use aion_common::{AionResult, InternalError};
use aion_ir::{CellId, CellOp, Netlist};

/// Eliminates identity operations, bypassing each matching cell with the
/// net that already carries the answer. Returns the number of cells removed.
pub(crate) fn identity_elimination(nl: &mut Netlist) -> AionResult<usize> {
    let mut to_bypass: Vec<(CellId, &'static str)> = Vec::new();

    for cell in nl.cells() {
        if !matches!(
            cell.op,
            CellOp::And | CellOp::Or | CellOp::Xor | CellOp::Add | CellOp::Sub | CellOp::Shl | CellOp::Shr
        ) {
            continue;
        }
        let Some(out_pin) = cell.output("Y") else { continue };
        let out_width = nl
            .pin(out_pin)
            .map(|p| p.width.bits())
            .unwrap_or(1);

        let Some(a_pin) = cell.input("A") else { continue };
        let Some(b_pin) = cell.input("B") else { continue };

        let a_const = const_value_of(nl, a_pin);
        let b_const = const_value_of(nl, b_pin);

        let identity_survivor = match cell.op {
            CellOp::And => {
                let all_ones = if out_width >= 64 { u64::MAX } else { (1u64 << out_width) - 1 };
                if a_const == Some(all_ones as i64) {
                    Some("B")
                } else if b_const == Some(all_ones as i64) {
                    Some("A")
                } else {
                    None
                }
            }
            CellOp::Or | CellOp::Xor => {
                if a_const == Some(0) {
                    Some("B")
                } else if b_const == Some(0) {
                    Some("A")
                } else {
                    None
                }
            }
            CellOp::Add => {
                if a_const == Some(0) {
                    Some("B")
                } else if b_const == Some(0) {
                    Some("A")
                } else {
                    None
                }
            }
            CellOp::Sub | CellOp::Shl | CellOp::Shr => {
                // Only the right-hand operand can be the identity element.
                if b_const == Some(0) {
                    Some("A")
                } else {
                    None
                }
            }
            _ => unreachable!(),
        };

        if let Some(survivor) = identity_survivor {
            to_bypass.push((cell.id(), survivor));
        }
    }

    let count = to_bypass.len();
    for (cell, survivor) in to_bypass {
        nl.bypass_cell(cell, survivor)
            .map_err(|e| InternalError::new(e.to_string()))?;
    }
    Ok(count)
}

fn const_value_of(nl: &Netlist, pin: aion_ir::PinId) -> Option<i64> {
    let net_id = nl.pin(pin)?.net()?;
    let driver_pin = nl.net(net_id)?.driver()?;
    let driver_cell = nl.cell(nl.pin(driver_pin)?.cell())?;
    if driver_cell.op != CellOp::Const {
        return None;
    }
    driver_cell.attributes.get("value")?.as_int()
}

#[cfg(test)]
mod tests {
    use super::*;
    use aion_ir::{reset_id_counters, AttrValue, Attributes, BitWidth};

    #[test]
    fn or_with_zero_is_eliminated() {
        reset_id_counters();
        let mut nl = Netlist::new("t");
        let zero = nl.add_cell_with_attrs(CellOp::Const, "c0", {
            let mut a = Attributes::new();
            a.insert("value".to_string(), AttrValue::Int(0));
            a
        });
        let zero_y = nl.add_output_pin(zero, "Y", BitWidth::BIT).unwrap();

        let x = nl.add_cell(CellOp::ModuleInput, "x");
        let x_y = nl.add_output_pin(x, "Y", BitWidth::BIT).unwrap();

        let or_cell = nl.add_cell(CellOp::Or, "or0");
        let or_a = nl.add_input_pin(or_cell, "A", BitWidth::BIT).unwrap();
        let or_b = nl.add_input_pin(or_cell, "B", BitWidth::BIT).unwrap();
        let or_y = nl.add_output_pin(or_cell, "Y", BitWidth::BIT).unwrap();

        let sink_cell = nl.add_cell(CellOp::ModuleOutput, "o");
        let sink_in = nl.add_input_pin(sink_cell, "A", BitWidth::BIT).unwrap();

        nl.connect(x_y, or_a).unwrap();
        nl.connect(zero_y, or_b).unwrap();
        nl.connect(or_y, sink_in).unwrap();

        let count = identity_elimination(&mut nl).unwrap();
        assert_eq!(count, 1);
        assert!(nl.cell(or_cell).is_none());
        // sink's input net should now be x's output net directly.
        assert_eq!(nl.pin(sink_in).unwrap().net(), Some(nl.pin(x_y).unwrap().net().unwrap()));
    }

    #[test]
    fn and_without_identity_input_is_untouched() {
        reset_id_counters();
        let mut nl = Netlist::new("t");
        let a = nl.add_cell(CellOp::ModuleInput, "a");
        let a_y = nl.add_output_pin(a, "Y", BitWidth::BIT).unwrap();
        let b = nl.add_cell(CellOp::ModuleInput, "b");
        let b_y = nl.add_output_pin(b, "Y", BitWidth::BIT).unwrap();
        let and_cell = nl.add_cell(CellOp::And, "and0");
        let and_a = nl.add_input_pin(and_cell, "A", BitWidth::BIT).unwrap();
        let and_b = nl.add_input_pin(and_cell, "B", BitWidth::BIT).unwrap();
        nl.add_output_pin(and_cell, "Y", BitWidth::BIT).unwrap();
        nl.connect(a_y, and_a).unwrap();
        nl.connect(b_y, and_b).unwrap();

        assert_eq!(identity_elimination(&mut nl).unwrap(), 0);
        assert!(nl.cell(and_cell).is_some());
    }
}
