//! Input-stack instructions and the pluggable input routing strategy.

use crate::atom::Atom;
use crate::error::PushError;
use crate::instruction::{Instruction, NullaryAction};
use crate::machine::{Interpreter, StackKind};

use super::stack_ops::stack_depth;

/// Decides which stack an input value lands on.
///
/// Every input instruction goes through the interpreter's pusher, so a
/// problem can substitute its own routing (scaling, type coercion, and so
/// on) with [`Interpreter::set_input_pusher`].
pub trait InputPusher: Send + Sync {
    /// Push the input at bottom-relative position `index`.
    fn push_input(&self, interp: &mut Interpreter, index: usize);
}

/// Routes each input to the stack matching its kind. Programs and
/// instructions go to the code stack. Out-of-range indices clamp.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultInputPusher;

impl InputPusher for DefaultInputPusher {
    fn push_input(&self, interp: &mut Interpreter, index: usize) {
        let position = i64::try_from(index).unwrap_or(i64::MAX);
        let Some(value) = interp.input_stack().deep_peek(position).cloned() else {
            return;
        };
        match value {
            Atom::Integer(v) => interp.int_stack_mut().push(v),
            Atom::Float(v) => interp.float_stack_mut().push(v),
            Atom::Boolean(v) => interp.bool_stack_mut().push(v),
            Atom::Name(v) => interp.name_stack_mut().push(v),
            other => interp.code_stack_mut().push(other),
        }
    }
}

/// `input.inN`: push input `N`.
#[derive(Debug, Clone, Copy)]
pub struct InputInN {
    index: usize,
}

impl InputInN {
    /// An instruction pushing input `index`.
    pub fn new(index: usize) -> Self {
        Self { index }
    }
}

impl Instruction for InputInN {
    fn execute(&self, interp: &mut Interpreter) -> Result<(), PushError> {
        interp.push_input(self.index);
        Ok(())
    }
}

impl Interpreter {
    /// Push input `index` through the installed [`InputPusher`].
    pub fn push_input(&mut self, index: usize) {
        let pusher = self.input_pusher();
        pusher.push_input(self, index);
    }
}

pub(super) fn register(interp: &mut Interpreter) {
    interp.define_instruction(
        "input.index",
        NullaryAction::new(|interp| {
            let len = interp.input_stack().len();
            if len == 0 {
                return Ok(());
            }
            let Some(requested) = interp.int_stack_mut().pop() else {
                return Ok(());
            };
            let index = usize::try_from(requested.max(0)).map_or(len - 1, |i| i.min(len - 1));
            interp.push_input(index);
            Ok(())
        }),
    );
    interp.define_instruction(
        "input.inall",
        NullaryAction::new(|interp| {
            for index in 0..interp.input_stack().len() {
                interp.push_input(index);
            }
            Ok(())
        }),
    );
    interp.define_instruction(
        "input.inallrev",
        NullaryAction::new(|interp| {
            for index in (0..interp.input_stack().len()).rev() {
                interp.push_input(index);
            }
            Ok(())
        }),
    );
    interp.define_instruction("input.stackdepth", stack_depth(StackKind::Input));
}
