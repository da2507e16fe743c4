//! IR structural verification
//!
//! Checks the well-formedness invariants the optimizer relies on: every
//! block terminated, every branch target valid, every operand defined,
//! one definition per value, distinct switch tags, and extract indices in
//! bounds where the aggregate's construction is visible.

use rustc_hash::FxHashSet;

use crate::block::{BlockId, Terminator};
use crate::function::Function;
use crate::instr::Instr;
use crate::types::VariantTag;
use crate::value::Value;

/// IR verification errors
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    /// Block left with the placeholder terminator
    #[error("Block {block} has no terminator")]
    MissingTerminator { block: BlockId },

    /// Terminator names a block that does not exist
    #[error("Invalid branch target {target} in block {block}")]
    InvalidTarget { block: BlockId, target: BlockId },

    /// Operand value with no definition
    #[error("Use of undefined value {value} in block {block}")]
    UndefinedValue { block: BlockId, value: Value },

    /// Single-assignment violation
    #[error("Value {value} defined more than once")]
    Redefined { value: Value },

    /// Two switch cases with the same tag
    #[error("Duplicate case tag {tag} in switch of block {block}")]
    DuplicateTag { block: BlockId, tag: VariantTag },

    /// Aggregate extract past the end of a visible constructor
    #[error("Extract index {index} out of bounds (arity {arity}) in block {block}")]
    ExtractOutOfBounds {
        block: BlockId,
        index: u32,
        arity: usize,
    },
}

/// Verify a function's structural invariants
pub fn verify_function(func: &Function) -> Result<(), VerifyError> {
    let block_count = func.blocks.len();

    // Defined values: parameters plus every instruction destination.
    let mut defined: FxHashSet<Value> = func.params.iter().copied().collect();
    for block in &func.blocks {
        for &id in &block.instrs {
            if let Some(dest) = func.instr(id).dest() {
                if !defined.insert(dest) {
                    return Err(VerifyError::Redefined { value: dest });
                }
            }
        }
    }

    for block in &func.blocks {
        if matches!(block.terminator, Terminator::None) {
            return Err(VerifyError::MissingTerminator { block: block.id });
        }

        for target in block.terminator.successors() {
            if target.0 as usize >= block_count {
                return Err(VerifyError::InvalidTarget {
                    block: block.id,
                    target,
                });
            }
        }

        if let Terminator::SwitchTag { cases, .. } = &block.terminator {
            let mut seen = FxHashSet::default();
            for (tag, _) in cases {
                if !seen.insert(*tag) {
                    return Err(VerifyError::DuplicateTag {
                        block: block.id,
                        tag: *tag,
                    });
                }
            }
        }

        for &id in &block.instrs {
            if let Some(value) = first_undefined_use(func.instr(id), &defined) {
                return Err(VerifyError::UndefinedValue {
                    block: block.id,
                    value,
                });
            }
            check_extract_bounds(func, block.id, func.instr(id))?;
        }

        let mut missing = None;
        block.terminator.for_each_use(|v| {
            if !defined.contains(&v) && missing.is_none() {
                missing = Some(v);
            }
        });
        if let Some(value) = missing {
            return Err(VerifyError::UndefinedValue {
                block: block.id,
                value,
            });
        }
    }

    Ok(())
}

fn first_undefined_use(instr: &Instr, defined: &FxHashSet<Value>) -> Option<Value> {
    let mut missing = None;
    instr.for_each_use(|v| {
        if !defined.contains(&v) && missing.is_none() {
            missing = Some(v);
        }
    });
    missing
}

/// Bounds-check extracts whose aggregate source is constructed in the same
/// function. Extracts from parameters cannot be checked here.
fn check_extract_bounds(
    func: &Function,
    block: BlockId,
    instr: &Instr,
) -> Result<(), VerifyError> {
    match instr {
        Instr::TupleGet { tuple, index, .. } => {
            if let Some(def) = func.def(*tuple) {
                if let Instr::TupleNew { elems, .. } = func.instr(def) {
                    if *index as usize >= elems.len() {
                        return Err(VerifyError::ExtractOutOfBounds {
                            block,
                            index: *index,
                            arity: elems.len(),
                        });
                    }
                }
            }
        }
        Instr::FieldGet { object, field, .. } => {
            if let Some(def) = func.def(*object) {
                if let Instr::StructNew { fields, .. } = func.instr(def) {
                    if *field as usize >= fields.len() {
                        return Err(VerifyError::ExtractOutOfBounds {
                            block,
                            index: *field,
                            arity: fields.len(),
                        });
                    }
                }
            }
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::FunctionBuilder;
    use crate::types::TypeId;

    #[test]
    fn test_verify_valid_function() {
        let mut b = FunctionBuilder::new("ok");
        let ty = TypeId::new(1);
        let a = b.param(ty);
        let bb = b.param(ty);
        let t = b.tuple_new(vec![a, bb], TypeId::new(2));
        let x = b.tuple_get(t, 1, ty);
        b.ret(Some(x));

        assert!(verify_function(&b.finish()).is_ok());
    }

    #[test]
    fn test_missing_terminator() {
        let b = FunctionBuilder::new("open");
        let err = verify_function(b.func()).unwrap_err();
        assert!(matches!(err, VerifyError::MissingTerminator { .. }));
    }

    #[test]
    fn test_undefined_value() {
        let mut b = FunctionBuilder::new("undef");
        let ty = TypeId::new(1);
        let foreign = Value(99);
        let x = b.tuple_get(foreign, 0, ty);
        b.ret(Some(x));

        let err = verify_function(&b.finish()).unwrap_err();
        assert!(matches!(
            err,
            VerifyError::UndefinedValue { value: Value(99), .. }
        ));
    }

    #[test]
    fn test_duplicate_switch_tag() {
        let mut b = FunctionBuilder::new("dup");
        let t_enum = TypeId::new(3);
        let subject = b.param(t_enum);
        let case_a = b.create_block();
        let case_b = b.create_block();
        b.switch_tag(
            subject,
            vec![(VariantTag(0), case_a), (VariantTag(0), case_b)],
            None,
        );
        b.switch_to_block(case_a);
        b.ret(None);
        b.switch_to_block(case_b);
        b.ret(None);

        let err = verify_function(&b.finish()).unwrap_err();
        assert!(matches!(err, VerifyError::DuplicateTag { .. }));
    }

    #[test]
    fn test_extract_out_of_bounds() {
        let mut b = FunctionBuilder::new("oob");
        let ty = TypeId::new(1);
        let a = b.param(ty);
        let t = b.tuple_new(vec![a], TypeId::new(2));
        let x = b.tuple_get(t, 3, ty);
        b.ret(Some(x));

        let err = verify_function(&b.finish()).unwrap_err();
        assert!(matches!(
            err,
            VerifyError::ExtractOutOfBounds { index: 3, arity: 1, .. }
        ));
    }
}
