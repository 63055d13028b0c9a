//! Exec-stack combinators: `exec.k`, `exec.s`, `exec.y`, plus `exec.if`
//! and `exec.noop`.

use super::code::branch;
use super::exceeds_size_limit;
use crate::atom::Atom;
use crate::instruction::{NullaryAction, OpResult};
use crate::machine::Interpreter;
use crate::program::Program;

pub(super) fn register(interp: &mut Interpreter) {
    interp.define_instruction("exec.k", NullaryAction::new(k));
    interp.define_instruction("exec.s", NullaryAction::new(s));
    interp.define_instruction("exec.y", NullaryAction::new(y));
    interp.define_instruction("exec.if", branch(Interpreter::exec_stack_mut));
    interp.define_instruction("exec.noop", NullaryAction::new(|_| Ok(())));
}

/// `a b` becomes `a`: drop the second item.
fn k(interp: &mut Interpreter) -> OpResult<()> {
    let exec = interp.exec_stack_mut();
    if exec.len() > 1 {
        exec.swap();
        exec.pop_discard();
    }
    Ok(())
}

/// `a b c` becomes `a c (b c)`: run `a` with `c` and `(b c)` below it.
/// Suppressed, with the stack restored, when `(b c)` is too large.
fn s(interp: &mut Interpreter) -> OpResult<()> {
    let exec = interp.exec_stack_mut();
    if exec.len() < 3 {
        return Ok(());
    }
    let (Some(a), Some(b), Some(c)) = (exec.pop(), exec.pop(), exec.pop()) else {
        return Ok(());
    };
    let list_bc: Program = vec![b.clone(), c.clone()].into();
    let too_large = exceeds_size_limit(interp, &list_bc, "exec.s");
    let exec = interp.exec_stack_mut();
    if too_large {
        exec.push(c);
        exec.push(b);
        exec.push(a);
    } else {
        exec.push(Atom::Program(list_bc));
        exec.push(c);
        exec.push(a);
    }
    Ok(())
}

/// `a` becomes `a (exec.y a)`: run `a`, then recurse.
fn y(interp: &mut Interpreter) -> OpResult<()> {
    let Some(a) = interp.exec_stack().top().cloned() else {
        return Ok(());
    };
    let wrapper: Program = vec![Atom::from("exec.y"), a.clone()].into();
    if exceeds_size_limit(interp, &wrapper, "exec.y") {
        return Ok(());
    }
    let exec = interp.exec_stack_mut();
    exec.pop_discard();
    exec.push(Atom::Program(wrapper));
    exec.push(a);
    Ok(())
}
