//! Common subexpression elimination: merges cells computing the same
//! operation over the same driving cells. Sequential cells, memory
//! cells, `CONST`, and I/O cells are excluded — re-evaluating a register or a
//! memory port is never equivalent to reusing an earlier result.

use std::collections::HashMap;

use aion_common::{AionResult, InternalError};
use aion_ir::{Cell, CellId, CellOp, NetId, Netlist};

/// Merges duplicate cells in `nl`. Returns the number of cells removed.
pub(crate) fn common_subexpression_elimination(nl: &mut Netlist) -> AionResult<usize> {
    let mut ids: Vec<CellId> = nl.cells().map(|c| c.id()).collect();
    ids.sort();

    let mut signatures: HashMap<String, CellId> = HashMap::new();
    let mut to_merge: Vec<(CellId, CellId)> = Vec::new();

    for id in ids {
        let Some(cell) = nl.cell(id) else { continue };
        if cell.op.is_io() || cell.op.is_sequential() || cell.op.is_memory() || cell.op == CellOp::Const {
            continue;
        }
        let Some(sig) = cell_signature(nl, cell) else { continue };
        match signatures.get(&sig) {
            Some(&canonical) => to_merge.push((id, canonical)),
            None => {
                signatures.insert(sig, id);
            }
        }
    }

    let count = to_merge.len();
    for (duplicate, canonical) in to_merge {
        merge_cells(nl, canonical, duplicate)?;
    }
    Ok(count)
}

/// A signature identifying `cell`'s operation and, for each input pin, which
/// cell drives it — two cells with equal signatures compute the same value.
fn cell_signature(nl: &Netlist, cell: &Cell) -> Option<String> {
    let mut parts: Vec<(String, CellId)> = Vec::new();
    for (name, pin) in cell.inputs() {
        let net_id = nl.pin(pin)?.net()?;
        let driver_pin = nl.net(net_id)?.driver()?;
        parts.push((name.to_string(), nl.pin(driver_pin)?.cell()));
    }
    parts.sort();
    let body = parts
        .iter()
        .map(|(name, driver)| format!("{name}={}", driver.as_raw()))
        .collect::<Vec<_>>()
        .join(",");
    Some(format!("{:?}({body})", cell.op))
}

fn merge_cells(nl: &mut Netlist, keep: CellId, remove: CellId) -> AionResult<()> {
    let keep_net = output_net(nl, keep);
    let remove_net = output_net(nl, remove);
    if let (Some(k), Some(r)) = (keep_net, remove_net) {
        if k != r {
            nl.redirect_sinks(r, k).map_err(|e| InternalError::new(e.to_string()))?;
        }
    }
    nl.remove_cell(remove).map_err(|e| InternalError::new(e.to_string()))
}

fn output_net(nl: &Netlist, cell: CellId) -> Option<NetId> {
    let (_, pin) = nl.cell(cell)?.outputs().next()?;
    nl.pin(pin)?.net()
}
