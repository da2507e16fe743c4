//! Applying simplification results
//!
//! The simplifier core answers "is this result equal to an existing value"
//! without touching the IR. This pass commits those answers: it queries
//! every instruction against the stable function, resolves transitive
//! replacement chains, then rewrites all uses in instructions and
//! terminators. Dead definitions are left for dead-code elimination.

use rustc_hash::FxHashMap;

use loam_ir::{Function, Instr, InstrId, Terminator, Value};

use crate::simplify::simplify_instr;
use crate::OptPass;

/// Instruction simplification pass
pub struct Simplify;

impl OptPass for Simplify {
    fn name(&self) -> &str {
        "simplify"
    }

    fn run(&self, func: &mut Function) -> usize {
        // Phase 1: query the core over a stable snapshot.
        let mut replacements: FxHashMap<Value, Value> = FxHashMap::default();
        for block in &func.blocks {
            for &id in &block.instrs {
                if let Some(replacement) = simplify_instr(func, id) {
                    if let Some(dest) = func.instr(id).dest() {
                        replacements.insert(dest, replacement);
                    }
                }
            }
        }

        if replacements.is_empty() {
            return 0;
        }

        // Resolve transitive chains: if v2 -> v1 and v1 -> v0, use v0 directly.
        let resolved: FxHashMap<Value, Value> = replacements
            .keys()
            .map(|&value| {
                let mut current = value;
                let mut depth = 0;
                while let Some(&next) = replacements.get(&current) {
                    current = next;
                    depth += 1;
                    if depth > 100 {
                        break; // cycle guard
                    }
                }
                (value, current)
            })
            .collect();

        // Phase 2: rewrite every use.
        let ids: Vec<InstrId> = func
            .blocks
            .iter()
            .flat_map(|b| b.instrs.iter().copied())
            .collect();
        for id in ids {
            replace_uses(func.instr_mut(id), &resolved);
        }
        for block in &mut func.blocks {
            replace_terminator_uses(&mut block.terminator, &resolved);
        }

        resolved.len()
    }
}

fn sub(value: &mut Value, subs: &FxHashMap<Value, Value>) {
    if let Some(&new_value) = subs.get(value) {
        *value = new_value;
    }
}

/// Replace value uses in an instruction according to a substitution map
fn replace_uses(instr: &mut Instr, subs: &FxHashMap<Value, Value>) {
    match instr {
        Instr::IntConst { .. } => {}
        Instr::TupleNew { elems, .. } => {
            for e in elems {
                sub(e, subs);
            }
        }
        Instr::TupleGet { tuple, .. } => sub(tuple, subs),
        Instr::StructNew { fields, .. } => {
            for e in fields {
                sub(e, subs);
            }
        }
        Instr::FieldGet { object, .. } => sub(object, subs),
        Instr::VariantNew { payload, .. } => {
            if let Some(p) = payload {
                sub(p, subs);
            }
        }
        Instr::AddrToPtr { addr, .. } => sub(addr, subs),
        Instr::PtrToAddr { ptr, .. } => sub(ptr, subs),
        Instr::RefToRaw { object, .. } => sub(object, subs),
        Instr::RawToRef { ptr, .. } => sub(ptr, subs),
        Instr::RefToOpaque { object, .. } => sub(object, subs),
        Instr::OpaqueToRef { opaque, .. } => sub(opaque, subs),
        Instr::CheckedCast { operand, .. } => sub(operand, subs),
        Instr::BinOp { left, right, .. } => {
            sub(left, subs);
            sub(right, subs);
        }
        Instr::Load { ptr, .. } => sub(ptr, subs),
        Instr::Store { ptr, value } => {
            sub(ptr, subs);
            sub(value, subs);
        }
        Instr::Call { args, .. } => {
            for a in args {
                sub(a, subs);
            }
        }
    }
}

/// Replace value uses in a terminator according to a substitution map
fn replace_terminator_uses(term: &mut Terminator, subs: &FxHashMap<Value, Value>) {
    match term {
        Terminator::Branch { cond, .. } => sub(cond, subs),
        Terminator::SwitchTag { subject, .. } => sub(subject, subs),
        Terminator::Return(Some(value)) => sub(value, subs),
        Terminator::Jump(_)
        | Terminator::Return(None)
        | Terminator::Unreachable
        | Terminator::None => {}
    }
}
