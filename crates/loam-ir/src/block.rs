//! Basic blocks and terminators
//!
//! A block is an ordered list of instruction ids ending in exactly one
//! terminator. Predecessor lists are derived from terminator successors
//! when a function is finished, never edited by hand.

use crate::instr::InstrId;
use crate::types::VariantTag;
use crate::value::Value;

/// Basic block identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(pub u32);

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "bb{}", self.0)
    }
}

/// How a basic block terminates
#[derive(Debug, Clone)]
pub enum Terminator {
    /// Unconditional jump
    Jump(BlockId),
    /// Conditional branch on a boolean value
    Branch {
        cond: Value,
        then_block: BlockId,
        else_block: BlockId,
    },
    /// Multi-way branch on a variant's tag
    SwitchTag {
        subject: Value,
        cases: Vec<(VariantTag, BlockId)>,
        default: Option<BlockId>,
    },
    /// Return with an optional value
    Return(Option<Value>),
    /// Unreachable code
    Unreachable,
    /// Placeholder terminator (not yet assigned)
    None,
}

impl Terminator {
    /// Successor blocks, one entry per outgoing edge
    pub fn successors(&self) -> Vec<BlockId> {
        match self {
            Terminator::Jump(b) => vec![*b],
            Terminator::Branch {
                then_block,
                else_block,
                ..
            } => vec![*then_block, *else_block],
            Terminator::SwitchTag { cases, default, .. } => cases
                .iter()
                .map(|(_, b)| *b)
                .chain(default.iter().copied())
                .collect(),
            Terminator::Return(_) | Terminator::Unreachable | Terminator::None => vec![],
        }
    }

    /// Visit every value the terminator reads
    pub fn for_each_use<F: FnMut(Value)>(&self, mut f: F) {
        match self {
            Terminator::Branch { cond, .. } => f(*cond),
            Terminator::SwitchTag { subject, .. } => f(*subject),
            Terminator::Return(Some(v)) => f(*v),
            Terminator::Jump(_)
            | Terminator::Return(None)
            | Terminator::Unreachable
            | Terminator::None => {}
        }
    }
}

/// A basic block
#[derive(Debug, Clone)]
pub struct Block {
    pub id: BlockId,
    /// Instructions in execution order
    pub instrs: Vec<InstrId>,
    pub terminator: Terminator,
    /// Incoming edges, one entry per edge (derived by `compute_predecessors`)
    pub predecessors: Vec<BlockId>,
}

impl Block {
    pub fn new(id: BlockId) -> Self {
        Block {
            id,
            instrs: vec![],
            terminator: Terminator::None,
            predecessors: vec![],
        }
    }

    /// The unique predecessor, if this block has exactly one incoming edge
    pub fn single_predecessor(&self) -> Option<BlockId> {
        match self.predecessors.as_slice() {
            [pred] => Some(*pred),
            _ => None,
        }
    }
}
