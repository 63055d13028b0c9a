//! The built-in instruction library.
//!
//! Instructions are named `<kind>.<operation>` after the stack they work
//! on. `register_all` installs every built-in plus the literal generators
//! (`integer.erc`, `float.erc`, `boolean.erc`) used by random code.

mod code;
mod exec;
mod input;
mod numeric;
mod stack_ops;

pub use input::{DefaultInputPusher, InputInN, InputPusher};

use tracing::debug;

use crate::machine::Interpreter;
use crate::program::Program;
use crate::random::AtomGenerator;

pub(crate) fn register_all(interp: &mut Interpreter) {
    stack_ops::register(interp);
    numeric::register(interp);
    code::register(interp);
    exec::register(interp);
    input::register(interp);

    interp.define_generator("integer.erc", AtomGenerator::Integer);
    interp.define_generator("float.erc", AtomGenerator::Float);
    interp.define_generator("boolean.erc", AtomGenerator::Boolean);
}

/// Whether `fragment` is too big to construct at runtime.
pub(crate) fn exceeds_size_limit(
    interp: &Interpreter,
    fragment: &Program,
    instruction: &'static str,
) -> bool {
    let points = fragment.program_size();
    let limit = interp.config().max_points_in_program;
    if points > limit {
        debug!(instruction, points, limit, "constructed code over size limit, skipping");
        true
    } else {
        false
    }
}
