//! Algebraic simplification: `x & x` and `x | x` reduce to `x`; `x ^ x` and
//! `x - x` reduce to `CONST 0`. Only triggers when both input pins of
//! a two-input cell are driven by the very same cell.

use aion_common::{AionResult, InternalError};
use aion_ir::{CellId, CellOp, Netlist, PinId};

/// Runs one pass of algebraic simplification over `nl`. Returns the number
/// of cells rewritten.
pub(crate) fn algebraic_simplification(nl: &mut Netlist) -> AionResult<usize> {
    let mut bypass: Vec<(CellId, &'static str)> = Vec::new();
    let mut zero: Vec<CellId> = Vec::new();

    for cell in nl.cells() {
        if !matches!(cell.op, CellOp::And | CellOp::Or | CellOp::Xor | CellOp::Sub) {
            continue;
        }
        let Some(a_pin) = cell.input("A") else { continue };
        let Some(b_pin) = cell.input("B") else { continue };
        let Some(a_driver) = driver_cell_of(nl, a_pin) else { continue };
        let Some(b_driver) = driver_cell_of(nl, b_pin) else { continue };
        if a_driver != b_driver {
            continue;
        }
        match cell.op {
            CellOp::And | CellOp::Or => bypass.push((cell.id(), "A")),
            CellOp::Xor | CellOp::Sub => zero.push(cell.id()),
            _ => unreachable!(),
        }
    }

    let count = bypass.len() + zero.len();
    for (cell, survivor) in bypass {
        nl.bypass_cell(cell, survivor).map_err(|e| InternalError::new(e.to_string()))?;
    }
    for cell in zero {
        nl.replace_with_const(cell, 0).map_err(|e| InternalError::new(e.to_string()))?;
    }
    Ok(count)
}

fn driver_cell_of(nl: &Netlist, pin: PinId) -> Option<CellId> {
    let net_id = nl.pin(pin)?.net()?;
    let driver_pin = nl.net(net_id)?.driver()?;
    Some(nl.pin(driver_pin)?.cell())
}

#[cfg(test)]
mod tests {
    use super::*;
    use aion_ir::{reset_id_counters, BitWidth};

    fn two_input_cell(nl: &mut Netlist, op: CellOp, name: &str) -> (PinId, PinId, PinId) {
        let cell = nl.add_cell(op, name);
        let a = nl.add_input_pin(cell, "A", BitWidth::BIT).unwrap();
        let b = nl.add_input_pin(cell, "B", BitWidth::BIT).unwrap();
        let y = nl.add_output_pin(cell, "Y", BitWidth::BIT).unwrap();
        (a, b, y)
    }

    #[test]
    fn and_of_x_with_itself_bypasses_to_x() {
        reset_id_counters();
        let mut nl = Netlist::new("t");
        let x = nl.add_cell(CellOp::ModuleInput, "x");
        let x_y = nl.add_output_pin(x, "Y", BitWidth::BIT).unwrap();

        let (a, b, y) = two_input_cell(&mut nl, CellOp::And, "and0");
        nl.connect(x_y, a).unwrap();
        nl.connect(x_y, b).unwrap();

        let out = nl.add_cell(CellOp::ModuleOutput, "o");
        let out_in = nl.add_input_pin(out, "A", BitWidth::BIT).unwrap();
        nl.connect(y, out_in).unwrap();

        let count = algebraic_simplification(&mut nl).unwrap();
        assert_eq!(count, 1);
        let x_net = nl.pin(x_y).unwrap().net();
        assert_eq!(nl.pin(out_in).unwrap().net(), x_net);
    }

    #[test]
    fn xor_of_x_with_itself_becomes_constant_zero() {
        reset_id_counters();
        let mut nl = Netlist::new("t");
        let x = nl.add_cell(CellOp::ModuleInput, "x");
        let x_y = nl.add_output_pin(x, "Y", BitWidth::BIT).unwrap();

        let (a, b, y) = two_input_cell(&mut nl, CellOp::Xor, "xor0");
        nl.connect(x_y, a).unwrap();
        nl.connect(x_y, b).unwrap();

        let out = nl.add_cell(CellOp::ModuleOutput, "o");
        let out_in = nl.add_input_pin(out, "A", BitWidth::BIT).unwrap();
        nl.connect(y, out_in).unwrap();

        let count = algebraic_simplification(&mut nl).unwrap();
        assert_eq!(count, 1);
        let driver_pin = nl.net(nl.pin(out_in).unwrap().net().unwrap()).unwrap().driver().unwrap();
        let driver = nl.cell(nl.pin(driver_pin).unwrap().cell()).unwrap();
        assert_eq!(driver.op, CellOp::Const);
        assert_eq!(driver.attributes.get("value").unwrap().as_int(), Some(0));
    }

    #[test]
    fn distinct_operands_are_left_alone() {
        reset_id_counters();
        let mut nl = Netlist::new("t");
        let x = nl.add_cell(CellOp::ModuleInput, "x");
        let x_y = nl.add_output_pin(x, "Y", BitWidth::BIT).unwrap();
        let z = nl.add_cell(CellOp::ModuleInput, "z");
        let z_y = nl.add_output_pin(z, "Y", BitWidth::BIT).unwrap();

        let (a, b, _y) = two_input_cell(&mut nl, CellOp::And, "and0");
        nl.connect(x_y, a).unwrap();
        nl.connect(z_y, b).unwrap();

        let count = algebraic_simplification(&mut nl).unwrap();
        assert_eq!(count, 0);
    }
}
