//! Instruction simplification
//!
//! Local algebraic simplification: given one instruction, decide whether
//! the value it produces is provably equal to an already-existing value,
//! looking only at the instruction's own operands and, for the two
//! control-flow rules, the single predecessor's terminator. Nothing is
//! rewritten here; the caller replaces uses of the instruction with the
//! returned value and removes the dead instruction.

use loam_ir::{CastKind, Function, Instr, InstrId, Terminator, TypeId, Value, VariantTag};

/// Try to simplify one instruction, without looking at its uses.
/// Returns a value equal to the instruction's result, or `None` if no
/// simpler form was found. Pure: the function is only read.
pub fn simplify_instr(func: &Function, id: InstrId) -> Option<Value> {
    InstSimplifier { func }.simplify(id)
}

struct InstSimplifier<'a> {
    func: &'a Function,
}

impl<'a> InstSimplifier<'a> {
    fn simplify(&self, id: InstrId) -> Option<Value> {
        match self.func.instr(id) {
            Instr::TupleGet { tuple, index, .. } => self.simplify_tuple_get(*tuple, *index),
            Instr::FieldGet { object, field, .. } => self.simplify_field_get(*object, *field),
            Instr::StructNew { dest, fields } => self.simplify_struct_new(*dest, fields),
            Instr::AddrToPtr { dest, addr } => self.simplify_addr_to_ptr(*dest, *addr),
            Instr::PtrToAddr { dest, ptr } => self.simplify_ptr_to_addr(*dest, *ptr),
            Instr::RefToRaw { object, .. } => self.simplify_ref_to_raw(*object),
            Instr::OpaqueToRef { dest, opaque } => self.simplify_opaque_to_ref(*dest, *opaque),
            Instr::CheckedCast {
                kind, operand, target, ..
            } => self.simplify_checked_cast(*kind, *operand, *target),
            Instr::IntConst { width, bits, .. } => self.simplify_int_const(id, *width, *bits),
            Instr::VariantNew { dest, tag, payload } => {
                self.simplify_variant_new(id, *dest, *tag, payload.is_some())
            }

            // Kinds with no simplification rule.
            Instr::TupleNew { .. }
            | Instr::RawToRef { .. }
            | Instr::RefToOpaque { .. }
            | Instr::BinOp { .. }
            | Instr::Load { .. }
            | Instr::Store { .. }
            | Instr::Call { .. } => None,
        }
    }

    /// The defining instruction of a value, if it has one
    fn def(&self, value: Value) -> Option<&'a Instr> {
        self.func.def(value).map(|id| self.func.instr(id))
    }

    // tuple_get(tuple_new(e0, ..., en), i) -> ei
    fn simplify_tuple_get(&self, tuple: Value, index: u32) -> Option<Value> {
        if let Instr::TupleNew { elems, .. } = self.def(tuple)? {
            return Some(elems[index as usize]);
        }
        None
    }

    // field_get(struct_new(f0, ..., fn), i) -> fi
    fn simplify_field_get(&self, object: Value, field: u32) -> Option<Value> {
        if let Instr::StructNew { fields, .. } = self.def(object)? {
            return Some(fields[field as usize]);
        }
        None
    }

    /// A constructor built purely from field extracts of one source, in
    /// field order, reconstructs that exact source. The extract feeding
    /// position `i` must read field `i`; a permuted reconstruction is a
    /// different value and must not fire.
    fn simplify_struct_new(&self, dest: Value, fields: &[Value]) -> Option<Value> {
        // Ignore empty structs.
        let first = *fields.first()?;

        let source = match self.def(first)? {
            Instr::FieldGet { object, .. } => *object,
            _ => return None,
        };

        // The constructed struct and the extracted struct must be of the
        // same type.
        if self.func.value_type(dest) != self.func.value_type(source) {
            return None;
        }

        for (position, &elem) in fields.iter().enumerate() {
            match self.def(elem) {
                Some(Instr::FieldGet { object, field, .. })
                    if *object == source && *field as usize == position => {}
                _ => return None,
            }
        }

        Some(source)
    }

    // addr_to_ptr(ptr_to_addr(x)) -> x, when the round trip lands on x's type
    fn simplify_addr_to_ptr(&self, dest: Value, addr: Value) -> Option<Value> {
        if let Instr::PtrToAddr { ptr, .. } = self.def(addr)? {
            if self.func.value_type(dest) == self.func.value_type(*ptr) {
                return Some(*ptr);
            }
        }
        None
    }

    // ptr_to_addr(addr_to_ptr(x)) -> x, when the round trip lands on x's type
    fn simplify_ptr_to_addr(&self, dest: Value, ptr: Value) -> Option<Value> {
        if let Instr::AddrToPtr { addr, .. } = self.def(ptr)? {
            if self.func.value_type(dest) == self.func.value_type(*addr) {
                return Some(*addr);
            }
        }
        None
    }

    // ref_to_raw(raw_to_ref(x)) -> x
    //
    // No type check needed: the pair is inverse by construction.
    fn simplify_ref_to_raw(&self, object: Value) -> Option<Value> {
        if let Instr::RawToRef { ptr, .. } = self.def(object)? {
            return Some(*ptr);
        }
        None
    }

    // opaque_to_ref(ref_to_opaque(x)) -> x, when the round trip lands on x's type
    fn simplify_opaque_to_ref(&self, dest: Value, opaque: Value) -> Option<Value> {
        if let Instr::RefToOpaque { object, .. } = self.def(opaque)? {
            if self.func.value_type(dest) == self.func.value_type(*object) {
                return Some(*object);
            }
        }
        None
    }

    // downcast(upcast(x: T1 to T2), T2 to T1) -> x
    fn simplify_checked_cast(
        &self,
        kind: CastKind,
        operand: Value,
        target: TypeId,
    ) -> Option<Value> {
        if kind != CastKind::Downcast {
            return None;
        }
        if let Instr::CheckedCast {
            kind: CastKind::Upcast,
            operand: source,
            ..
        } = self.def(operand)?
        {
            if target == self.func.value_type(*source) {
                return Some(*source);
            }
        }
        None
    }

    /// A boolean literal in a block reached only through one arm of a
    /// conditional branch re-derives the branch condition: a `true` in the
    /// then-target (or `false` in the else-target) is the condition itself.
    fn simplify_int_const(&self, id: InstrId, width: u8, bits: u64) -> Option<Value> {
        if width != 1 {
            return None;
        }

        let block = self.func.instr_block(id);
        let pred = self.func.block(block).single_predecessor()?;

        if let Terminator::Branch {
            cond,
            then_block,
            else_block,
        } = &self.func.block(pred).terminator
        {
            let reached = if bits != 0 { *then_block } else { *else_block };
            if reached == block {
                return Some(*cond);
            }
        }
        None
    }

    /// A payload-free variant constructed in the case target of a tag
    /// switch re-materializes the switched subject, e.g. for
    ///
    ///   switch_tag v0 [tag1: bb1]
    /// bb1:
    ///   v1 = variant_new tag1
    ///
    /// we'll return v0.
    fn simplify_variant_new(
        &self,
        id: InstrId,
        dest: Value,
        tag: VariantTag,
        has_payload: bool,
    ) -> Option<Value> {
        if has_payload {
            return None;
        }

        let block = self.func.instr_block(id);
        let pred = self.func.block(block).single_predecessor()?;

        if let Terminator::SwitchTag { subject, cases, .. } = &self.func.block(pred).terminator {
            if self.func.value_type(dest) != self.func.value_type(*subject) {
                return None;
            }
            let target = cases.iter().find(|(t, _)| *t == tag).map(|(_, b)| *b)?;
            if target == block {
                return Some(*subject);
            }
        }
        None
    }
}
