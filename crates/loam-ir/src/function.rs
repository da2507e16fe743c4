//! IR functions
//!
//! A function owns its blocks and an instruction arena. Instruction ids
//! stay stable across edits: removing an instruction unlinks it from its
//! block and drops its definition, but never shifts other ids. Value types
//! and definitions are kept in per-function side tables.

use rustc_hash::FxHashMap;

use crate::block::{Block, BlockId, Terminator};
use crate::instr::{Instr, InstrId};
use crate::types::TypeId;
use crate::value::Value;

/// A function in SSA form
#[derive(Debug)]
pub struct Function {
    /// Function name (for debugging)
    pub name: String,
    /// Basic blocks, indexed by `BlockId`
    pub blocks: Vec<Block>,
    /// Entry block
    pub entry: BlockId,
    /// Parameter values, in declaration order
    pub params: Vec<Value>,
    /// Instruction arena; block instruction lists index into it
    instrs: Vec<Instr>,
    /// Owning block of each instruction, fixed when the instruction is appended
    owner: Vec<BlockId>,
    /// Next available value number
    next_value: u32,
    /// Type of each value
    value_types: FxHashMap<Value, TypeId>,
    /// Defining instruction of each non-parameter value
    defs: FxHashMap<Value, InstrId>,
}

impl Function {
    /// Create a new empty function
    pub fn new(name: &str) -> Self {
        Function {
            name: name.to_string(),
            blocks: vec![],
            entry: BlockId(0),
            params: vec![],
            instrs: vec![],
            owner: vec![],
            next_value: 0,
            value_types: FxHashMap::default(),
            defs: FxHashMap::default(),
        }
    }

    /// Add a new block and return its id
    pub fn add_block(&mut self) -> BlockId {
        let id = BlockId(self.blocks.len() as u32);
        self.blocks.push(Block::new(id));
        id
    }

    /// Get a block by id
    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.0 as usize]
    }

    /// Get a mutable block by id
    pub fn block_mut(&mut self, id: BlockId) -> &mut Block {
        &mut self.blocks[id.0 as usize]
    }

    /// Allocate a fresh value with the given type
    pub fn alloc_value(&mut self, ty: TypeId) -> Value {
        let value = Value(self.next_value);
        self.next_value += 1;
        self.value_types.insert(value, ty);
        value
    }

    /// Add a function parameter of the given type
    pub fn add_param(&mut self, ty: TypeId) -> Value {
        let value = self.alloc_value(ty);
        self.params.push(value);
        value
    }

    /// The type of a value; panics on values foreign to this function
    pub fn value_type(&self, value: Value) -> TypeId {
        self.value_types[&value]
    }

    /// The defining instruction of a value, or `None` for parameters
    pub fn def(&self, value: Value) -> Option<InstrId> {
        self.defs.get(&value).copied()
    }

    /// Get an instruction by id
    pub fn instr(&self, id: InstrId) -> &Instr {
        &self.instrs[id.0 as usize]
    }

    /// Get a mutable instruction by id (for operand rewriting; destinations
    /// must not be changed through this)
    pub fn instr_mut(&mut self, id: InstrId) -> &mut Instr {
        &mut self.instrs[id.0 as usize]
    }

    /// The block an instruction was appended to
    pub fn instr_block(&self, id: InstrId) -> BlockId {
        self.owner[id.0 as usize]
    }

    /// Append an instruction to the end of a block, registering its
    /// destination as defined
    pub fn append(&mut self, block: BlockId, instr: Instr) -> InstrId {
        let id = InstrId(self.instrs.len() as u32);
        if let Some(dest) = instr.dest() {
            let prev = self.defs.insert(dest, id);
            debug_assert!(prev.is_none(), "value {} defined twice", dest);
        }
        self.instrs.push(instr);
        self.owner.push(block);
        self.blocks[block.0 as usize].instrs.push(id);
        id
    }

    /// Unlink an instruction from its block and drop its definition.
    /// The arena slot stays in place so other ids remain valid.
    pub fn remove_instr(&mut self, id: InstrId) {
        let block = self.owner[id.0 as usize];
        self.blocks[block.0 as usize].instrs.retain(|&i| i != id);
        if let Some(dest) = self.instrs[id.0 as usize].dest() {
            self.defs.remove(&dest);
            self.value_types.remove(&dest);
        }
    }

    /// Set the terminator of a block
    pub fn set_terminator(&mut self, block: BlockId, term: Terminator) {
        self.blocks[block.0 as usize].terminator = term;
    }

    /// Total number of instructions linked into blocks
    pub fn instr_count(&self) -> usize {
        self.blocks.iter().map(|b| b.instrs.len()).sum()
    }

    /// Rebuild every block's predecessor list from terminator successors
    pub fn compute_predecessors(&mut self) {
        for block in &mut self.blocks {
            block.predecessors.clear();
        }
        let block_count = self.blocks.len();
        for idx in 0..block_count {
            let succs = self.blocks[idx].terminator.successors();
            let src = BlockId(idx as u32);
            for succ in succs {
                if (succ.0 as usize) < block_count {
                    self.blocks[succ.0 as usize].predecessors.push(src);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instr::BinOp;

    #[test]
    fn test_append_records_def() {
        let mut func = Function::new("test");
        let bb = func.add_block();
        let ty = TypeId::new(1);
        let a = func.alloc_value(ty);
        let b = func.alloc_value(ty);
        let dest = func.alloc_value(ty);

        let id = func.append(
            bb,
            Instr::BinOp {
                dest,
                op: BinOp::Add,
                left: a,
                right: b,
            },
        );

        assert_eq!(func.def(dest), Some(id));
        assert_eq!(func.def(a), None);
        assert_eq!(func.instr_block(id), bb);
        assert_eq!(func.value_type(dest), ty);
    }

    #[test]
    fn test_remove_instr_unlinks() {
        let mut func = Function::new("test");
        let bb = func.add_block();
        let ty = TypeId::new(1);
        let dest = func.alloc_value(ty);
        let id = func.append(
            bb,
            Instr::IntConst {
                dest,
                width: 32,
                bits: 7,
            },
        );

        func.remove_instr(id);
        assert!(func.block(bb).instrs.is_empty());
        assert_eq!(func.def(dest), None);
    }

    #[test]
    fn test_compute_predecessors() {
        let mut func = Function::new("test");
        let bb0 = func.add_block();
        let bb1 = func.add_block();
        let bb2 = func.add_block();
        let ty = TypeId::new(1);
        let cond = func.add_param(ty);

        func.set_terminator(
            bb0,
            Terminator::Branch {
                cond,
                then_block: bb1,
                else_block: bb2,
            },
        );
        func.set_terminator(bb1, Terminator::Jump(bb2));
        func.set_terminator(bb2, Terminator::Return(None));
        func.compute_predecessors();

        assert_eq!(func.block(bb1).single_predecessor(), Some(bb0));
        assert_eq!(func.block(bb2).predecessors, vec![bb0, bb1]);
        assert_eq!(func.block(bb2).single_predecessor(), None);
    }
}
