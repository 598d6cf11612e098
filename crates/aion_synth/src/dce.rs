//! Dead-code elimination: deletes every non-I/O cell not reverse-reachable
//! from a `MODULE_OUTPUT`.

use aion_common::{AionResult, InternalError};
use aion_ir::Netlist;

/// Removes every dead cell from `nl`. Returns the number of cells removed.
pub(crate) fn dead_code_elimination(nl: &mut Netlist) -> AionResult<usize> {
    let dead: Vec<_> = nl.dead_cells().into_iter().collect();
    let count = dead.len();
    for cell in dead {
        nl.remove_cell(cell).map_err(|e| InternalError::new(e.to_string()))?;
    }
    Ok(count)
}
