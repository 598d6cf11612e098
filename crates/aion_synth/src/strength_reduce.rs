//! Strength reduction: `MUL x, c` where `c` is a power of two becomes
//! `SHL x, log2(c)`.

use aion_common::{AionResult, InternalError};
use aion_ir::{AttrValue, Attributes, CellId, CellOp, Netlist, PinId};

/// Runs one pass of strength reduction over `nl`. Returns the number of
/// multiplies rewritten as shifts.
pub(crate) fn strength_reduction(nl: &mut Netlist) -> AionResult<usize> {
    let mut to_transform: Vec<(CellId, PinId, u32)> = Vec::new();

    for cell in nl.cells() {
        if cell.op != CellOp::Mul {
            continue;
        }
        let Some(a_pin) = cell.input("A") else { continue };
        let Some(b_pin) = cell.input("B") else { continue };

        if let Some(value) = const_value_of(nl, b_pin) {
            if let Some(shift) = power_of_two_shift(value) {
                to_transform.push((cell.id(), a_pin, shift));
                continue;
            }
        }
        if let Some(value) = const_value_of(nl, a_pin) {
            if let Some(shift) = power_of_two_shift(value) {
                to_transform.push((cell.id(), b_pin, shift));
            }
        }
    }

    let count = to_transform.len();
    for (cell, operand_pin, shift) in to_transform {
        transform_to_shift(nl, cell, operand_pin, shift)?;
    }
    Ok(count)
}

fn power_of_two_shift(value: i64) -> Option<u32> {
    if value > 0 && (value & (value - 1)) == 0 {
        Some(value.trailing_zeros())
    } else {
        None
    }
}

fn const_value_of(nl: &Netlist, pin: PinId) -> Option<i64> {
    let net_id = nl.pin(pin)?.net()?;
    let driver_pin = nl.net(net_id)?.driver()?;
    let driver = nl.cell(nl.pin(driver_pin)?.cell())?;
    if driver.op != CellOp::Const {
        return None;
    }
    driver.attributes.get("value")?.as_int()
}

/// Rewires `cell` (a `MUL`) into a `SHL` of `operand_pin` by `shift`,
/// introducing a fresh `CONST` cell for the shift amount and preserving the
/// original output net so downstream sinks see no difference.
fn transform_to_shift(nl: &mut Netlist, cell: CellId, operand_pin: PinId, shift: u32) -> AionResult<()> {
    let ir_err = |e: aion_ir::NetlistError| InternalError::new(e.to_string());

    let (operand_width, operand_net, out_width, out_net, name) = {
        let c = nl.cell(cell).ok_or_else(|| InternalError::new("strength_reduce: missing MUL cell"))?;
        let (_, out_pin) = c
            .outputs()
            .next()
            .ok_or_else(|| InternalError::new("strength_reduce: MUL cell has no output pin"))?;
        let out_pin_ref = nl
            .pin(out_pin)
            .ok_or_else(|| InternalError::new("strength_reduce: missing output pin"))?;
        let out_width = out_pin_ref.width;
        let out_net = out_pin_ref
            .net()
            .ok_or_else(|| InternalError::new("strength_reduce: output pin undriven"))?;
        let operand_pin_ref = nl
            .pin(operand_pin)
            .ok_or_else(|| InternalError::new("strength_reduce: missing operand pin"))?;
        let operand_width = operand_pin_ref.width;
        let operand_net = operand_pin_ref
            .net()
            .ok_or_else(|| InternalError::new("strength_reduce: operand pin unconnected"))?;
        (operand_width, operand_net, out_width, out_net, c.name.clone())
    };

    let shl = nl.add_cell(CellOp::Shl, format!("{name}$shl"));
    let shl_a = nl.add_input_pin(shl, "A", operand_width).map_err(ir_err)?;
    nl.add_sink(operand_net, shl_a).map_err(ir_err)?;

    let mut attrs = Attributes::new();
    attrs.insert("value".to_string(), AttrValue::Int(shift as i64));
    let shamt_width = aion_ir::BitWidth::from_bits(32);
    let const_cell = nl.add_cell_with_attrs(CellOp::Const, format!("{name}$shamt"), attrs);
    let const_y = nl.add_output_pin(const_cell, "Y", shamt_width).map_err(ir_err)?;
    let const_net = nl.add_net(shamt_width);
    nl.bind_driver(const_net, const_y).map_err(ir_err)?;
    let shl_b = nl.add_input_pin(shl, "B", shamt_width).map_err(ir_err)?;
    nl.add_sink(const_net, shl_b).map_err(ir_err)?;

    let shl_y = nl.add_output_pin(shl, "Y", out_width).map_err(ir_err)?;

    nl.remove_cell(cell).map_err(ir_err)?;
    nl.bind_driver(out_net, shl_y).map_err(ir_err)?;

    Ok(())
}
