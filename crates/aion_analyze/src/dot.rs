//! DOT graph export — a read-only query returning rendered text, not a
//! file-writing tool (see `DESIGN.md`'s Open Question on this).

use aion_ir::{CellId, CellOp, Netlist};

/// Options controlling [`to_dot`]'s output.
#[derive(Clone, Copy, Debug)]
pub struct DotOptions {
    /// Whether to include `CONST` cells as nodes.
    pub include_constants: bool,
    /// Whether to include `MODULE_INPUT`/`MODULE_OUTPUT` cells as nodes.
    pub include_io: bool,
    /// Upper bound on the number of cells rendered, protecting against huge graphs.
    pub max_cells: usize,
}

impl Default for DotOptions {
    fn default() -> Self {
        Self {
            include_constants: false,
            include_io: true,
            max_cells: 100,
        }
    }
}

/// Renders `nl` as a left-to-right directed DOT graph: one node per cell,
/// one edge per net connection actually present between two included cells.
pub fn to_dot(nl: &Netlist, opts: DotOptions) -> String {
    let mut cells: Vec<CellId> = nl
        .cells()
        .filter(|c| opts.include_constants || c.op != CellOp::Const)
        .filter(|c| opts.include_io || !c.op.is_io())
        .map(|c| c.id())
        .collect();
    cells.sort();
    cells.truncate(opts.max_cells);
    let included: std::collections::HashSet<CellId> = cells.iter().copied().collect();

    let mut out = String::new();
    out.push_str("digraph netlist {\n");
    out.push_str("  rankdir=LR;\n");
    out.push_str("  node [shape=box];\n\n");

    for &id in &cells {
        let cell = nl.cell(id).unwrap();
        let color = cell_color(cell.op);
        out.push_str(&format!(
            "  \"{}\" [label=\"{}\\n{:?}\", fillcolor=\"{}\", style=filled];\n",
            cell.name, cell.name, cell.op, color
        ));
    }
    out.push('\n');

    for &id in &cells {
        for driver in nl.fanin_cells(id) {
            if included.contains(&driver) {
                let from = &nl.cell(driver).unwrap().name;
                let to = &nl.cell(id).unwrap().name;
                out.push_str(&format!("  \"{from}\" -> \"{to}\";\n"));
            }
        }
    }

    out.push_str("}\n");
    out
}

fn cell_color(op: CellOp) -> &'static str {
    if op.is_io() {
        "lightblue"
    } else if op.is_sequential() {
        "lightgreen"
    } else if op.is_memory() {
        "lightyellow"
    } else if op == CellOp::Const {
        "lightgray"
    } else if matches!(op, CellOp::Mux | CellOp::Pmux) {
        "lightcoral"
    } else {
        "white"
    }
}
