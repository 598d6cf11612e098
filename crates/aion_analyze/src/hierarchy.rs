//! Hierarchy summary: grouping cells by the dot-depth of their mangled name,
//! which `aion_elaborate` produces via `<instance_name>.` prefixing.

use std::collections::BTreeMap;

use aion_ir::Netlist;

/// Groups every cell name in `nl` by its dot-depth (the number of `.`
/// separators introduced by instance flattening), keyed `"level_N"`.
pub fn hierarchy_summary(nl: &Netlist) -> BTreeMap<String, Vec<String>> {
    let mut hierarchy: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for cell in nl.cells() {
        let level = cell.name.matches('.').count();
        hierarchy
            .entry(format!("level_{level}"))
            .or_default()
            .push(cell.name.clone());
    }
    for names in hierarchy.values_mut() {
        names.sort();
    }
    hierarchy
}

#[cfg(test)]
mod tests {
    use super::*;
    use aion_ir::{reset_id_counters, CellOp};

    #[test]
    fn groups_by_dot_depth() {
        reset_id_counters();
        let mut nl = Netlist::new("t");
        nl.add_cell(CellOp::And, "and0");
        nl.add_cell(CellOp::Not, "u1.not0");
        nl.add_cell(CellOp::Not, "u1.u2.not1");

        let h = hierarchy_summary(&nl);
        assert_eq!(h["level_0"], vec!["and0".to_string()]);
        assert_eq!(h["level_1"], vec!["u1.not0".to_string()]);
        assert_eq!(h["level_2"], vec!["u1.u2.not1".to_string()]);
    }
}
