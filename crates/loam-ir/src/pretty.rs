//! Pretty-printing for IR
//!
//! Provides human-readable output for debugging IR structures.

use std::fmt::Write;

use crate::block::{Block, Terminator};
use crate::function::Function;
use crate::instr::{CastKind, Instr};

/// Trait for pretty-printing IR constructs
pub trait PrettyPrint {
    fn pretty_print(&self) -> String;
}

impl PrettyPrint for Function {
    fn pretty_print(&self) -> String {
        let mut output = String::new();

        let params: Vec<String> = self
            .params
            .iter()
            .map(|p| format!("{}: {}", p, self.value_type(*p)))
            .collect();
        writeln!(output, "fn {}({}) {{", self.name, params.join(", ")).unwrap();

        for block in &self.blocks {
            output.push_str(&pretty_print_block(self, block, 2));
        }

        writeln!(output, "}}").unwrap();
        output
    }
}

fn pretty_print_block(func: &Function, block: &Block, indent: usize) -> String {
    let mut output = String::new();
    let prefix = " ".repeat(indent);

    if block.predecessors.is_empty() {
        writeln!(output, "{}{}:", prefix, block.id).unwrap();
    } else {
        let preds: Vec<String> = block.predecessors.iter().map(|p| format!("{}", p)).collect();
        writeln!(output, "{}{}: ; preds: {}", prefix, block.id, preds.join(", ")).unwrap();
    }

    for &id in &block.instrs {
        writeln!(output, "{}  {}", prefix, format_instr(func.instr(id))).unwrap();
    }
    writeln!(output, "{}  {}", prefix, block.terminator).unwrap();

    output
}

pub fn format_instr(instr: &Instr) -> String {
    match instr {
        Instr::IntConst { dest, width, bits } => {
            format!("{} = int_const i{} {}", dest, width, bits)
        }
        Instr::TupleNew { dest, elems } => {
            let elems: Vec<String> = elems.iter().map(|e| format!("{}", e)).collect();
            format!("{} = tuple_new ({})", dest, elems.join(", "))
        }
        Instr::TupleGet { dest, tuple, index } => {
            format!("{} = tuple_get {}, {}", dest, tuple, index)
        }
        Instr::StructNew { dest, fields } => {
            let fields: Vec<String> = fields.iter().map(|e| format!("{}", e)).collect();
            format!("{} = struct_new {{ {} }}", dest, fields.join(", "))
        }
        Instr::FieldGet {
            dest,
            object,
            field,
        } => {
            format!("{} = field_get {}.field{}", dest, object, field)
        }
        Instr::VariantNew { dest, tag, payload } => match payload {
            Some(p) => format!("{} = variant_new {}({})", dest, tag, p),
            None => format!("{} = variant_new {}", dest, tag),
        },
        Instr::AddrToPtr { dest, addr } => format!("{} = addr_to_ptr {}", dest, addr),
        Instr::PtrToAddr { dest, ptr } => format!("{} = ptr_to_addr {}", dest, ptr),
        Instr::RefToRaw { dest, object } => format!("{} = ref_to_raw {}", dest, object),
        Instr::RawToRef { dest, ptr } => format!("{} = raw_to_ref {}", dest, ptr),
        Instr::RefToOpaque { dest, object } => format!("{} = ref_to_opaque {}", dest, object),
        Instr::OpaqueToRef { dest, opaque } => format!("{} = opaque_to_ref {}", dest, opaque),
        Instr::CheckedCast {
            dest,
            kind,
            operand,
            target,
        } => {
            let kind = match kind {
                CastKind::Upcast => "upcast",
                CastKind::Downcast => "downcast",
            };
            format!("{} = {} {} to {}", dest, kind, operand, target)
        }
        Instr::BinOp {
            dest,
            op,
            left,
            right,
        } => {
            format!("{} = {} {} {}", dest, left, op, right)
        }
        Instr::Load { dest, ptr } => format!("{} = load {}", dest, ptr),
        Instr::Store { ptr, value } => format!("store {} = {}", ptr, value),
        Instr::Call { dest, callee, args } => {
            let args: Vec<String> = args.iter().map(|a| format!("{}", a)).collect();
            match dest {
                Some(d) => format!("{} = call {}({})", d, callee, args.join(", ")),
                None => format!("call {}({})", callee, args.join(", ")),
            }
        }
    }
}

impl std::fmt::Display for Terminator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Terminator::Jump(target) => write!(f, "jump {}", target),
            Terminator::Branch {
                cond,
                then_block,
                else_block,
            } => write!(f, "branch {}, {}, {}", cond, then_block, else_block),
            Terminator::SwitchTag {
                subject,
                cases,
                default,
            } => {
                let cases: Vec<String> = cases
                    .iter()
                    .map(|(tag, block)| format!("{}: {}", tag, block))
                    .collect();
                write!(f, "switch_tag {} [{}]", subject, cases.join(", "))?;
                if let Some(d) = default {
                    write!(f, " default {}", d)?;
                }
                Ok(())
            }
            Terminator::Return(Some(v)) => write!(f, "return {}", v),
            Terminator::Return(None) => write!(f, "return"),
            Terminator::Unreachable => write!(f, "unreachable"),
            Terminator::None => write!(f, "<no terminator>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::FunctionBuilder;
    use crate::types::TypeId;
    use crate::value::Value;

    #[test]
    fn test_format_instr() {
        let instr = Instr::TupleGet {
            dest: Value(3),
            tuple: Value(1),
            index: 1,
        };
        assert_eq!(format_instr(&instr), "v3 = tuple_get v1, 1");
    }

    #[test]
    fn test_format_terminator() {
        let term = Terminator::Branch {
            cond: Value(0),
            then_block: crate::block::BlockId(1),
            else_block: crate::block::BlockId(2),
        };
        assert_eq!(format!("{}", term), "branch v0, bb1, bb2");
    }

    #[test]
    fn test_pretty_print_function() {
        let mut b = FunctionBuilder::new("extract");
        let ty = TypeId::new(1);
        let t = b.param(ty);
        let x = b.tuple_get(t, 0, ty);
        b.ret(Some(x));

        let output = b.finish().pretty_print();
        assert!(output.contains("fn extract"));
        assert!(output.contains("tuple_get"));
        assert!(output.contains("return"));
    }
}
