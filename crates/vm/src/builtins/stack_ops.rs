//! Instructions every data stack shares: `pop dup swap rot flush
//! stackdepth shove yank yankdup = define`.

use push_common::Stack;

use crate::atom::{Atom, Name};
use crate::instruction::{BinaryInstruction, Constant, NullaryAction, NullaryInstruction, UnaryAction};
use crate::machine::{Interpreter, StackAccessor, StackKind, StackType};

const DATA_KINDS: [StackKind; 6] = [
    StackKind::Integer,
    StackKind::Float,
    StackKind::Boolean,
    StackKind::Name,
    StackKind::Code,
    StackKind::Exec,
];

pub(super) fn register(interp: &mut Interpreter) {
    for kind in DATA_KINDS {
        let prefix = kind.prefix();
        interp.define_instruction(&format!("{prefix}.pop"), stack_op(kind, |s| s.pop_discard()));
        interp.define_instruction(&format!("{prefix}.dup"), stack_op(kind, |s| s.dup()));
        interp.define_instruction(&format!("{prefix}.swap"), stack_op(kind, |s| s.swap()));
        interp.define_instruction(&format!("{prefix}.rot"), stack_op(kind, |s| s.rot()));
        interp.define_instruction(&format!("{prefix}.flush"), stack_op(kind, |s| s.clear()));
        interp.define_instruction(&format!("{prefix}.stackdepth"), stack_depth(kind));
        interp.define_instruction(&format!("{prefix}.shove"), indexed_op(kind, |s, n| s.shove_top(n)));
        interp.define_instruction(&format!("{prefix}.yank"), indexed_op(kind, |s, n| s.yank(n)));
        interp.define_instruction(&format!("{prefix}.yankdup"), indexed_op(kind, |s, n| s.yank_dup(n)));
    }

    interp.define_instruction("integer.=", equals::<i64>());
    interp.define_instruction("float.=", equals::<f64>());
    interp.define_instruction("boolean.=", equals::<bool>());
    interp.define_instruction("name.=", equals::<Name>());
    interp.define_instruction("code.=", object_equals(Interpreter::code_stack_mut));
    interp.define_instruction("exec.=", object_equals(Interpreter::exec_stack_mut));

    interp.define_instruction("integer.define", define(i64::stack_mut));
    interp.define_instruction("float.define", define(f64::stack_mut));
    interp.define_instruction("boolean.define", define(bool::stack_mut));
    interp.define_instruction("code.define", define(Interpreter::code_stack_mut));
    interp.define_instruction("exec.define", define(Interpreter::exec_stack_mut));
}

fn stack_op(kind: StackKind, op: fn(&mut dyn Stack)) -> NullaryAction {
    NullaryAction::new(move |interp| {
        op(interp.stack_mut(kind));
        Ok(())
    })
}

/// Pops a position from the integer stack, then applies `op` at it.
fn indexed_op(kind: StackKind, op: fn(&mut dyn Stack, i64)) -> UnaryAction<i64> {
    UnaryAction::new(move |interp, n| {
        op(interp.stack_mut(kind), *n);
        Ok(())
    })
}

pub(super) fn stack_depth(kind: StackKind) -> NullaryInstruction<i64> {
    NullaryInstruction::new(move |interp| {
        Ok(i64::try_from(interp.stack(kind).len()).unwrap_or(i64::MAX))
    })
}

fn equals<T: StackType + PartialEq>() -> BinaryInstruction<T, T, bool> {
    BinaryInstruction::new(|a, b| Ok(a == b))
}

/// Compares the top two items of an atom stack. Needs two items; a single
/// item is left alone.
fn object_equals(stack: StackAccessor<Atom>) -> NullaryAction {
    NullaryAction::new(move |interp| {
        let atoms = stack(interp);
        if atoms.len() < 2 {
            return Ok(());
        }
        let (Some(a), Some(b)) = (atoms.pop(), atoms.pop()) else {
            return Ok(());
        };
        interp.bool_stack_mut().push(a == b);
        Ok(())
    })
}

/// Pops a name, then a value from `stack`, and binds the name so that
/// executing it pushes the value back onto `stack`. If `stack` is empty
/// the name is still consumed.
fn define<T: Clone + Send + Sync + 'static>(stack: StackAccessor<T>) -> NullaryAction {
    NullaryAction::new(move |interp| {
        let Some(name) = interp.name_stack_mut().pop() else {
            return Ok(());
        };
        let Some(value) = stack(interp).pop() else {
            return Ok(());
        };
        interp.bind(name, Constant::on(stack, value));
        Ok(())
    })
}
