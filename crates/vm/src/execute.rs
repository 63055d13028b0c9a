//! The step loop: pop the exec stack, dispatch on the atom kind.

use tracing::trace;

use crate::atom::Atom;
use crate::error::PushError;
use crate::machine::Interpreter;
use crate::program::Program;

impl Interpreter {
    /// Push `program` onto the exec stack as a single item and run up to
    /// `step_limit` steps. Returns the number of steps taken.
    ///
    /// Running out of steps is not an error: whatever is on the stacks at
    /// that point is the result.
    pub fn execute(&mut self, program: &Program, step_limit: usize) -> Result<usize, PushError> {
        trace!(points = program.program_size(), step_limit, "execute");
        self.load_program(program);
        let steps = self.step(step_limit)?;
        trace!(steps, remaining = self.exec_stack.len(), "execute finished");
        Ok(steps)
    }

    /// Push a copy of `program` onto the exec stack without running it.
    pub fn load_program(&mut self, program: &Program) {
        self.exec_stack.push(Atom::Program(program.clone()));
    }

    /// Perform up to `max_steps` steps, stopping early when the exec stack
    /// empties. Returns the number of steps taken; 0 means the exec stack
    /// was already empty.
    pub fn step(&mut self, max_steps: usize) -> Result<usize, PushError> {
        let mut executed = 0;
        while executed < max_steps {
            let Some(atom) = self.exec_stack.pop() else {
                break;
            };
            self.evaluation_executions += 1;
            executed += 1;
            self.dispatch(atom)?;
        }
        Ok(executed)
    }

    fn dispatch(&mut self, atom: Atom) -> Result<(), PushError> {
        match atom {
            Atom::Program(program) => {
                program.as_stack().push_all_reverse(&mut self.exec_stack);
            }
            Atom::Integer(v) => self.int_stack.push(v),
            Atom::Float(v) => self.float_stack.push(v),
            Atom::Boolean(v) => self.bool_stack.push(v),
            Atom::Name(name) => {
                let resolved = self
                    .bindings
                    .get(&name)
                    .or_else(|| self.instructions.get(&name))
                    .cloned();
                match resolved {
                    Some(op) => op.execute(self)?,
                    None => self.name_stack.push(name),
                }
            }
            Atom::Instruction(op) => op.execute(self)?,
        }
        Ok(())
    }
}
