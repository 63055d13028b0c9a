//! Push virtual machine: executes nested, self-modifying Push programs.
//!
//! The VM is a tree-walking interpreter with:
//! - Typed data stacks (integer, float, boolean, name, code) and an input stack
//! - An exec stack driving execution, one atom per step
//! - A registry of named instructions plus names bound at runtime
//! - A random code generator over a configurable instruction subset
//!
//! Execution is total: stack underflow, bad indices and arithmetic faults
//! degrade to no-ops or default values, and every run is bounded by a step
//! limit. Only setup mistakes surface as [`PushError`].
//!
//! # Usage
//!
//! ```
//! use push_vm::{run, Program};
//!
//! let program: Program = "( 1 2 3 4.0 5.0 true false integer.+ float.+ )".parse().unwrap();
//! let interp = run(&program, 100).unwrap();
//! assert_eq!(interp.int_stack().as_slice(), &[1, 5]);
//! assert_eq!(interp.float_stack().as_slice(), &[9.0]);
//! ```

pub mod atom;
pub mod builtins;
pub mod config;
pub mod error;
pub mod execute;
pub mod instruction;
pub mod machine;
pub mod program;
pub mod random;

pub use atom::{Atom, InstructionRef, Name};
pub use builtins::{DefaultInputPusher, InputInN, InputPusher};
pub use config::{FloatRange, IntRange, InterpreterConfig};
pub use error::{ParseError, PushError};
pub use instruction::{
    BinaryAction, BinaryInstruction, Constant, Fault, Instruction, NullaryAction,
    NullaryInstruction, OpResult, TrinaryAction, TrinaryInstruction, UnaryAction,
    UnaryInstruction,
};
pub use machine::{Interpreter, StackAccessor, StackKind, StackType};
pub use program::Program;
pub use push_common::{Stack, TypedStack};
pub use random::AtomGenerator;

/// Run `program` on a fresh interpreter for at most `step_limit` steps and
/// return the interpreter so its stacks can be inspected.
///
/// # Errors
///
/// Returns [`PushError`] only if an instruction reports a hard failure,
/// which no built-in instruction does.
pub fn run(program: &Program, step_limit: usize) -> Result<Interpreter, PushError> {
    let mut interp = Interpreter::new();
    interp.execute(program, step_limit)?;
    Ok(interp)
}
