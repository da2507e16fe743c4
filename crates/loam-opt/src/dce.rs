//! Dead code elimination
//!
//! Removes instructions whose results are never used and which have no
//! side effects. Iterates to a local fixed point so chains of definitions
//! that only fed removed instructions disappear too.

use rustc_hash::FxHashSet;

use loam_ir::{Function, InstrId, Value};

use crate::OptPass;

/// Dead code elimination pass
pub struct DeadCodeElimination;

impl OptPass for DeadCodeElimination {
    fn name(&self) -> &str {
        "dce"
    }

    fn run(&self, func: &mut Function) -> usize {
        let mut removed_total = 0;
        loop {
            let used = collect_used_values(func);

            let dead: Vec<InstrId> = func
                .blocks
                .iter()
                .flat_map(|b| b.instrs.iter().copied())
                .filter(|&id| {
                    let instr = func.instr(id);
                    if instr.has_side_effects() {
                        return false;
                    }
                    match instr.dest() {
                        Some(dest) => !used.contains(&dest),
                        None => false,
                    }
                })
                .collect();

            if dead.is_empty() {
                break;
            }
            removed_total += dead.len();
            for id in dead {
                func.remove_instr(id);
            }
        }
        removed_total
    }
}

/// Collect every value read by an instruction or terminator
fn collect_used_values(func: &Function) -> FxHashSet<Value> {
    let mut used = FxHashSet::default();
    for block in &func.blocks {
        for &id in &block.instrs {
            func.instr(id).for_each_use(|v| {
                used.insert(v);
            });
        }
        block.terminator.for_each_use(|v| {
            used.insert(v);
        });
    }
    used
}
