//! Loam mid-level IR
//!
//! SSA-form intermediate representation used by the Loam compiler mid-end.
//! Instructions operate on opaque value handles and are grouped into basic
//! blocks with explicit terminators. The IR is built once through
//! [`FunctionBuilder`] and then read (and selectively rewritten) by the
//! optimization passes in `loam-opt`.

pub mod block;
pub mod builder;
pub mod function;
pub mod instr;
pub mod pretty;
pub mod types;
pub mod value;
pub mod verify;

pub use block::{Block, BlockId, Terminator};
pub use builder::FunctionBuilder;
pub use function::Function;
pub use instr::{BinOp, CastKind, FuncId, Instr, InstrId};
pub use pretty::PrettyPrint;
pub use types::{TypeId, VariantTag};
pub use value::Value;
pub use verify::{verify_function, VerifyError};
