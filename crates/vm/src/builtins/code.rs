//! Code-stack instructions and the `do*` loop combinators shared by the
//! code and exec stacks.
//!
//! The loops never iterate in Rust. Each one builds a small program that
//! performs the next iteration and pushes it onto the exec stack, so every
//! iteration costs steps and the step limit bounds them.

use push_common::TypedStack;
use rand::Rng;

use super::exceeds_size_limit;
use crate::atom::{Atom, Name};
use crate::instruction::{Fault, NullaryAction, OpResult, UnaryInstruction};
use crate::machine::{Interpreter, StackAccessor};
use crate::program::Program;

/// Where a loop finds its body: `code.do*...` takes it from the code
/// stack, `exec.do*...` from the exec stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Domain {
    Code,
    Exec,
}

impl Domain {
    fn body_stack(self, interp: &mut Interpreter) -> &mut TypedStack<Atom> {
        match self {
            Domain::Code => interp.code_stack_mut(),
            Domain::Exec => interp.exec_stack_mut(),
        }
    }

    fn has_body(self, interp: &Interpreter) -> bool {
        match self {
            Domain::Code => !interp.code_stack().is_empty(),
            Domain::Exec => !interp.exec_stack().is_empty(),
        }
    }

    fn instruction(self, operation: &str) -> &'static str {
        match (self, operation) {
            (Domain::Code, "do*range") => "code.do*range",
            (Domain::Code, "do*count") => "code.do*count",
            (Domain::Code, _) => "code.do*times",
            (Domain::Exec, "do*range") => "exec.do*range",
            (Domain::Exec, "do*count") => "exec.do*count",
            (Domain::Exec, _) => "exec.do*times",
        }
    }

    /// The program that continues a range loop from `start` to `stop`:
    /// `(start stop code.quote body code.do*range)` for code,
    /// `(start stop exec.do*range body)` for exec.
    fn range_fragment(self, start: i64, stop: i64, body: Atom) -> Program {
        let atoms = match self {
            Domain::Code => vec![
                Atom::Integer(start),
                Atom::Integer(stop),
                Atom::from("code.quote"),
                body,
                Atom::from("code.do*range"),
            ],
            Domain::Exec => vec![
                Atom::Integer(start),
                Atom::Integer(stop),
                Atom::from("exec.do*range"),
                body,
            ],
        };
        atoms.into()
    }
}

pub(super) fn register(interp: &mut Interpreter) {
    interp.define_instruction(
        "code.quote",
        NullaryAction::new(|interp| {
            if let Some(atom) = interp.exec_stack_mut().pop() {
                interp.code_stack_mut().push(atom);
            }
            Ok(())
        }),
    );
    interp.define_instruction(
        "code.fromboolean",
        UnaryInstruction::<bool, Atom>::new(|b| Ok(Atom::Boolean(*b))),
    );
    interp.define_instruction(
        "code.frominteger",
        UnaryInstruction::<i64, Atom>::new(|i| Ok(Atom::Integer(*i))),
    );
    interp.define_instruction(
        "code.fromfloat",
        UnaryInstruction::<f64, Atom>::new(|f| Ok(Atom::Float(*f))),
    );
    interp.define_instruction("code.noop", NullaryAction::new(|_| Ok(())));
    interp.define_instruction("code.if", branch(Interpreter::code_stack_mut));
    interp.define_instruction("code.rand", random_code());

    for domain in [Domain::Code, Domain::Exec] {
        interp.define_instruction(domain.instruction("do*range"), do_range(domain));
        interp.define_instruction(domain.instruction("do*count"), do_count(domain));
        interp.define_instruction(domain.instruction("do*times"), do_times(domain));
    }
}

/// Pops a boolean and two branches from `source`; the first popped runs if
/// the boolean is true, the second otherwise.
pub(super) fn branch(source: StackAccessor<Atom>) -> NullaryAction {
    NullaryAction::new(move |interp| {
        if interp.bool_stack().is_empty() || source(interp).len() < 2 {
            return Ok(());
        }
        let condition = interp.bool_stack_mut().pop();
        let branches = source(interp);
        let (Some(condition), Some(if_true), Some(if_false)) =
            (condition, branches.pop(), branches.pop())
        else {
            return Ok(());
        };
        let chosen = if condition { if_true } else { if_false };
        interp.exec_stack_mut().push(chosen);
        Ok(())
    })
}

/// Pops a size bound and pushes random code of `2..|bound|+2` points
/// (capped by `max_random_code_size`) onto the code stack.
fn random_code() -> NullaryAction {
    NullaryAction::new(|interp| {
        if !interp.has_active_instructions() {
            return Ok(());
        }
        let Some(requested) = interp.int_stack_mut().pop() else {
            return Ok(());
        };
        let cap = interp.config().max_random_code_size;
        let limit = usize::try_from(requested.unsigned_abs()).map_or(cap, |n| n.min(cap));
        let size = if limit > 0 {
            interp.rng().gen_range(0..limit) + 2
        } else {
            2
        };
        let program = interp
            .random_code(size)
            .map_err(|err| Fault::Failed(err.to_string()))?;
        interp.code_stack_mut().push(Atom::Program(program));
        Ok(())
    })
}

/// `start stop do*range body`: push `start` as the loop index and run the
/// body, then continue one step closer to `stop`. When `start == stop` the
/// body runs one final time.
fn do_range(domain: Domain) -> NullaryAction {
    NullaryAction::new(move |interp| {
        if !domain.has_body(interp) || interp.int_stack().len() < 2 {
            return Ok(());
        }
        let ints = interp.int_stack();
        let (Some(&stop), Some(&start)) = (ints.peek(0), ints.peek(1)) else {
            return Ok(());
        };
        let Some(body) = domain.body_stack(interp).top().cloned() else {
            return Ok(());
        };

        let continuation = if start == stop {
            None
        } else {
            let next = if start < stop { start + 1 } else { start - 1 };
            let fragment = domain.range_fragment(next, stop, body.clone());
            if exceeds_size_limit(interp, &fragment, domain.instruction("do*range")) {
                return Ok(());
            }
            Some(fragment)
        };

        // `start` stays on the integer stack as the loop index.
        interp.int_stack_mut().pop_discard();
        domain.body_stack(interp).pop_discard();
        if let Some(fragment) = continuation {
            interp.exec_stack_mut().push(Atom::Program(fragment));
        }
        interp.exec_stack_mut().push(body);
        Ok(())
    })
}

/// `n do*count body`: run the body `n` times with the index `0..n` pushed
/// before each run.
fn do_count(domain: Domain) -> NullaryAction {
    NullaryAction::new(move |interp| counted_loop(interp, domain, "do*count", |body| body))
}

/// `n do*times body`: run the body `n` times without leaving an index.
fn do_times(domain: Domain) -> NullaryAction {
    NullaryAction::new(move |interp| {
        counted_loop(interp, domain, "do*times", |body| {
            Atom::Program(vec![Atom::Name(Name::new("integer.pop")), body].into())
        })
    })
}

fn counted_loop(
    interp: &mut Interpreter,
    domain: Domain,
    operation: &str,
    wrap: impl FnOnce(Atom) -> Atom,
) -> OpResult<()> {
    let Some(&count) = interp.int_stack().top() else {
        return Ok(());
    };
    if count <= 0 {
        return Ok(());
    }
    let Some(body) = domain.body_stack(interp).top().cloned() else {
        return Ok(());
    };
    let fragment = domain.range_fragment(0, count - 1, wrap(body));
    if exceeds_size_limit(interp, &fragment, domain.instruction(operation)) {
        return Ok(());
    }
    interp.int_stack_mut().pop_discard();
    domain.body_stack(interp).pop_discard();
    interp.exec_stack_mut().push(Atom::Program(fragment));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InterpreterConfig;

    fn run(text: &str) -> Interpreter {
        let mut interp = Interpreter::new();
        interp.execute(&Program::parse(text).unwrap(), 1000).unwrap();
        interp
    }

    #[test]
    fn range_fragments() {
        let code = Domain::Code.range_fragment(2, 5, Atom::Float(1.0));
        assert_eq!(code.to_string(), "(2 5 code.quote 1.0 code.do*range)");
        let exec = Domain::Exec.range_fragment(2, 5, Atom::Float(1.0));
        assert_eq!(exec.to_string(), "(2 5 exec.do*range 1.0)");
    }

    #[test]
    fn do_range_counts_down() {
        let interp = run("( 3 1 exec.do*range 2.0 )");
        assert_eq!(interp.int_stack().as_slice(), &[3, 2, 1]);
        assert_eq!(interp.float_stack().len(), 3);
    }

    #[test]
    fn do_range_equal_bounds_runs_once() {
        let interp = run("( 4 4 code.quote integer.dup code.do*range )");
        assert_eq!(interp.int_stack().as_slice(), &[4, 4]);
    }

    #[test]
    fn do_count_non_positive_is_noop() {
        let interp = run("( 0 exec.do*count 1.0 )");
        assert_eq!(interp.int_stack().as_slice(), &[0]);
        assert_eq!(interp.float_stack().as_slice(), &[1.0]);
    }

    #[test]
    fn oversized_loop_leaves_operands() {
        let mut interp = Interpreter::with_config(InterpreterConfig {
            max_points_in_program: 4,
            ..InterpreterConfig::default()
        });
        interp.int_stack_mut().push(1);
        interp.int_stack_mut().push(3);
        interp.code_stack_mut().push(Atom::Float(2.0));
        interp
            .execute(&Program::parse("( code.do*range )").unwrap(), 10)
            .unwrap();
        assert_eq!(interp.int_stack().as_slice(), &[1, 3]);
        assert_eq!(interp.code_stack().len(), 1);
    }

    #[test]
    fn code_quote_and_conversions() {
        let interp = run("( code.quote ( 1 x ) 5 code.frominteger true code.fromboolean )");
        let code: Vec<String> = interp.code_stack().iter().map(Atom::to_string).collect();
        assert_eq!(code, vec!["(1 x)", "5", "true"]);
    }

    #[test]
    fn code_rand_without_instructions_is_noop() {
        let interp = run("( 10 code.rand )");
        assert_eq!(interp.int_stack().as_slice(), &[10]);
        assert!(interp.code_stack().is_empty());
    }

    #[test]
    fn code_rand_pushes_bounded_program() {
        let mut interp = Interpreter::with_config(InterpreterConfig {
            seed: Some(9),
            ..InterpreterConfig::default()
        });
        interp.set_instructions(&["integer\\.[+*-]"]).unwrap();
        for requested in [-7i64, 0, 3, 1000] {
            interp.code_stack_mut().clear();
            interp.int_stack_mut().push(requested);
            interp
                .execute(&Program::parse("( code.rand )").unwrap(), 10)
                .unwrap();
            let Some(Atom::Program(program)) = interp.code_stack().top() else {
                panic!("no program pushed for {requested}");
            };
            let bound = requested.unsigned_abs().min(100) as usize;
            assert!(program.program_size() <= bound.max(1));
        }
    }
}
