//! IR construction helpers
//!
//! [`FunctionBuilder`] wraps a function under construction: one emit helper
//! per instruction kind, each allocating and returning the fresh result
//! value. Since types are opaque to the mid-end, every value-producing
//! helper takes the result type explicitly.

use crate::block::{BlockId, Terminator};
use crate::function::Function;
use crate::instr::{BinOp, CastKind, FuncId, Instr, InstrId};
use crate::types::{TypeId, VariantTag};
use crate::value::Value;

/// Builder that simplifies function construction
pub struct FunctionBuilder {
    func: Function,
    current: BlockId,
}

impl FunctionBuilder {
    /// Create a builder with a fresh function and its entry block
    pub fn new(name: &str) -> Self {
        let mut func = Function::new(name);
        let entry = func.add_block();
        func.entry = entry;
        FunctionBuilder {
            func,
            current: entry,
        }
    }

    /// Add a function parameter
    pub fn param(&mut self, ty: TypeId) -> Value {
        self.func.add_param(ty)
    }

    /// Create a new basic block
    pub fn create_block(&mut self) -> BlockId {
        self.func.add_block()
    }

    /// Switch to emitting into a different block
    pub fn switch_to_block(&mut self, block: BlockId) {
        self.current = block;
    }

    /// Get the current block id
    pub fn current_block(&self) -> BlockId {
        self.current
    }

    /// Access the function under construction
    pub fn func(&self) -> &Function {
        &self.func
    }

    /// Emit an instruction into the current block
    pub fn emit(&mut self, instr: Instr) -> InstrId {
        self.func.append(self.current, instr)
    }

    fn alloc(&mut self, ty: TypeId) -> Value {
        self.func.alloc_value(ty)
    }

    /// Emit an integer literal
    pub fn int_const(&mut self, width: u8, bits: u64, ty: TypeId) -> Value {
        let dest = self.alloc(ty);
        self.emit(Instr::IntConst { dest, width, bits });
        dest
    }

    /// Emit a tuple constructor
    pub fn tuple_new(&mut self, elems: Vec<Value>, ty: TypeId) -> Value {
        let dest = self.alloc(ty);
        self.emit(Instr::TupleNew { dest, elems });
        dest
    }

    /// Emit a tuple element extraction
    pub fn tuple_get(&mut self, tuple: Value, index: u32, ty: TypeId) -> Value {
        let dest = self.alloc(ty);
        self.emit(Instr::TupleGet { dest, tuple, index });
        dest
    }

    /// Emit a struct constructor; field `i` is bound to `fields[i]`
    pub fn struct_new(&mut self, fields: Vec<Value>, ty: TypeId) -> Value {
        let dest = self.alloc(ty);
        self.emit(Instr::StructNew { dest, fields });
        dest
    }

    /// Emit a struct field extraction
    pub fn field_get(&mut self, object: Value, field: u32, ty: TypeId) -> Value {
        let dest = self.alloc(ty);
        self.emit(Instr::FieldGet {
            dest,
            object,
            field,
        });
        dest
    }

    /// Emit a variant constructor
    pub fn variant_new(&mut self, tag: VariantTag, payload: Option<Value>, ty: TypeId) -> Value {
        let dest = self.alloc(ty);
        self.emit(Instr::VariantNew { dest, tag, payload });
        dest
    }

    /// Emit an address-to-pointer conversion
    pub fn addr_to_ptr(&mut self, addr: Value, ty: TypeId) -> Value {
        let dest = self.alloc(ty);
        self.emit(Instr::AddrToPtr { dest, addr });
        dest
    }

    /// Emit a pointer-to-address conversion
    pub fn ptr_to_addr(&mut self, ptr: Value, ty: TypeId) -> Value {
        let dest = self.alloc(ty);
        self.emit(Instr::PtrToAddr { dest, ptr });
        dest
    }

    /// Emit a reference-to-raw-pointer conversion
    pub fn ref_to_raw(&mut self, object: Value, ty: TypeId) -> Value {
        let dest = self.alloc(ty);
        self.emit(Instr::RefToRaw { dest, object });
        dest
    }

    /// Emit a raw-pointer-to-reference conversion
    pub fn raw_to_ref(&mut self, ptr: Value, ty: TypeId) -> Value {
        let dest = self.alloc(ty);
        self.emit(Instr::RawToRef { dest, ptr });
        dest
    }

    /// Emit a reference-to-opaque-pointer conversion
    pub fn ref_to_opaque(&mut self, object: Value, ty: TypeId) -> Value {
        let dest = self.alloc(ty);
        self.emit(Instr::RefToOpaque { dest, object });
        dest
    }

    /// Emit an opaque-pointer-to-reference conversion
    pub fn opaque_to_ref(&mut self, opaque: Value, ty: TypeId) -> Value {
        let dest = self.alloc(ty);
        self.emit(Instr::OpaqueToRef { dest, opaque });
        dest
    }

    /// Emit a checked cast; the result type is the cast target
    pub fn checked_cast(&mut self, kind: CastKind, operand: Value, target: TypeId) -> Value {
        let dest = self.alloc(target);
        self.emit(Instr::CheckedCast {
            dest,
            kind,
            operand,
            target,
        });
        dest
    }

    /// Emit a binary operation
    pub fn bin_op(&mut self, op: BinOp, left: Value, right: Value, ty: TypeId) -> Value {
        let dest = self.alloc(ty);
        self.emit(Instr::BinOp {
            dest,
            op,
            left,
            right,
        });
        dest
    }

    /// Emit a memory load
    pub fn load(&mut self, ptr: Value, ty: TypeId) -> Value {
        let dest = self.alloc(ty);
        self.emit(Instr::Load { dest, ptr });
        dest
    }

    /// Emit a memory store
    pub fn store(&mut self, ptr: Value, value: Value) {
        self.emit(Instr::Store { ptr, value });
    }

    /// Emit a call; `result` is the result type for value-returning callees
    pub fn call(&mut self, callee: FuncId, args: Vec<Value>, result: Option<TypeId>) -> Option<Value> {
        let dest = result.map(|ty| self.alloc(ty));
        self.emit(Instr::Call { dest, callee, args });
        dest
    }

    /// Set the terminator of the current block
    pub fn terminate(&mut self, term: Terminator) {
        self.func.set_terminator(self.current, term);
    }

    /// Terminate the current block with an unconditional jump
    pub fn jump(&mut self, target: BlockId) {
        self.terminate(Terminator::Jump(target));
    }

    /// Terminate the current block with a conditional branch
    pub fn branch(&mut self, cond: Value, then_block: BlockId, else_block: BlockId) {
        self.terminate(Terminator::Branch {
            cond,
            then_block,
            else_block,
        });
    }

    /// Terminate the current block with a tag switch
    pub fn switch_tag(
        &mut self,
        subject: Value,
        cases: Vec<(VariantTag, BlockId)>,
        default: Option<BlockId>,
    ) {
        self.terminate(Terminator::SwitchTag {
            subject,
            cases,
            default,
        });
    }

    /// Terminate the current block with a return
    pub fn ret(&mut self, value: Option<Value>) {
        self.terminate(Terminator::Return(value));
    }

    /// Derive predecessor lists and hand back the finished function
    pub fn finish(mut self) -> Function {
        self.func.compute_predecessors();
        self.func
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_emits_into_current_block() {
        let mut b = FunctionBuilder::new("test");
        let ty = TypeId::new(1);
        let entry = b.current_block();
        let other = b.create_block();

        let x = b.int_const(32, 1, ty);
        b.jump(other);
        b.switch_to_block(other);
        let y = b.int_const(32, 2, ty);
        b.ret(Some(y));

        let func = b.finish();
        let x_id = func.def(x).unwrap();
        let y_id = func.def(y).unwrap();
        assert_eq!(func.instr_block(x_id), entry);
        assert_eq!(func.instr_block(y_id), other);
    }

    #[test]
    fn test_finish_derives_predecessors() {
        let mut b = FunctionBuilder::new("test");
        let t_bool = TypeId::new(0);
        let cond = b.param(t_bool);
        let then_bb = b.create_block();
        let else_bb = b.create_block();
        b.branch(cond, then_bb, else_bb);
        b.switch_to_block(then_bb);
        b.ret(None);
        b.switch_to_block(else_bb);
        b.ret(None);

        let func = b.finish();
        assert_eq!(func.block(then_bb).single_predecessor(), Some(func.entry));
        assert_eq!(func.block(else_bb).single_predecessor(), Some(func.entry));
    }

    #[test]
    fn test_checked_cast_result_type_is_target() {
        let mut b = FunctionBuilder::new("test");
        let t_base = TypeId::new(1);
        let t_derived = TypeId::new(2);
        let x = b.param(t_derived);
        let up = b.checked_cast(CastKind::Upcast, x, t_base);
        b.ret(Some(up));

        let func = b.finish();
        assert_eq!(func.value_type(up), t_base);
    }
}
