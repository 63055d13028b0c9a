//! Integer, float, boolean and name instructions.

use rand::Rng;

use crate::atom::Atom;
use crate::instruction::{
    BinaryInstruction, Constant, Fault, NullaryAction, NullaryInstruction, OpResult,
    UnaryInstruction,
};
use crate::machine::Interpreter;

pub(super) fn register(interp: &mut Interpreter) {
    register_integer(interp);
    register_float(interp);
    register_boolean(interp);
    register_name(interp);
}

fn int_binary(f: fn(i64, i64) -> OpResult<i64>) -> BinaryInstruction<i64, i64, i64> {
    BinaryInstruction::new(move |a, b| f(*a, *b))
}

fn int_compare(f: fn(&i64, &i64) -> bool) -> BinaryInstruction<i64, i64, bool> {
    BinaryInstruction::new(move |a, b| Ok(f(a, b)))
}

fn register_integer(interp: &mut Interpreter) {
    interp.define_instruction("integer.+", int_binary(|a, b| Ok(a.wrapping_add(b))));
    interp.define_instruction("integer.-", int_binary(|a, b| Ok(a.wrapping_sub(b))));
    interp.define_instruction("integer.*", int_binary(|a, b| Ok(a.wrapping_mul(b))));
    interp.define_instruction(
        "integer./",
        int_binary(|a, b| match b {
            0 => Err(Fault::Arithmetic),
            _ => Ok(a.wrapping_div(b)),
        }),
    );
    interp.define_instruction(
        "integer.%",
        int_binary(|a, b| match b {
            0 => Err(Fault::Arithmetic),
            _ => Ok(a.wrapping_rem(b)),
        }),
    );
    interp.define_instruction("integer.min", int_binary(|a, b| Ok(a.min(b))));
    interp.define_instruction("integer.max", int_binary(|a, b| Ok(a.max(b))));
    interp.define_instruction(
        "integer.abs",
        UnaryInstruction::<i64, i64>::new(|a| Ok(a.wrapping_abs())),
    );
    interp.define_instruction(
        "integer.neg",
        UnaryInstruction::<i64, i64>::new(|a| Ok(a.wrapping_neg())),
    );
    interp.define_instruction("integer.<", int_compare(i64::lt));
    interp.define_instruction("integer.>", int_compare(i64::gt));
    interp.define_instruction(
        "integer.fromfloat",
        UnaryInstruction::<f64, i64>::new(|f| Ok(*f as i64)),
    );
    interp.define_instruction(
        "integer.fromboolean",
        UnaryInstruction::<bool, i64>::new(|b| Ok(i64::from(*b))),
    );
    interp.define_instruction(
        "integer.rand",
        NullaryInstruction::<i64>::new(|interp| {
            let range = interp.config().int_erc;
            Ok(range.sample(interp.rng()))
        }),
    );
}

/// Non-finite results count as arithmetic faults.
fn finite(value: f64) -> OpResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Fault::Arithmetic)
    }
}

fn float_binary(f: fn(f64, f64) -> f64) -> BinaryInstruction<f64, f64, f64> {
    BinaryInstruction::new(move |a, b| finite(f(*a, *b)))
}

fn float_unary(f: fn(f64) -> f64) -> UnaryInstruction<f64, f64> {
    UnaryInstruction::new(move |a| finite(f(*a)))
}

fn float_compare(f: fn(&f64, &f64) -> bool) -> BinaryInstruction<f64, f64, bool> {
    BinaryInstruction::new(move |a, b| Ok(f(a, b)))
}

fn register_float(interp: &mut Interpreter) {
    interp.define_instruction("float.+", float_binary(|a, b| a + b));
    interp.define_instruction("float.-", float_binary(|a, b| a - b));
    interp.define_instruction("float.*", float_binary(|a, b| a * b));
    interp.define_instruction(
        "float./",
        BinaryInstruction::<f64, f64, f64>::new(|a, b| {
            if *b == 0.0 {
                Err(Fault::Arithmetic)
            } else {
                finite(a / b)
            }
        }),
    );
    interp.define_instruction(
        "float.%",
        BinaryInstruction::<f64, f64, f64>::new(|a, b| {
            if *b == 0.0 {
                Err(Fault::Arithmetic)
            } else {
                finite(a % b)
            }
        }),
    );
    interp.define_instruction("float.min", float_binary(f64::min));
    interp.define_instruction("float.max", float_binary(f64::max));
    interp.define_instruction("float.abs", float_unary(f64::abs));
    interp.define_instruction("float.neg", float_unary(|a| -a));
    interp.define_instruction("float.sin", float_unary(f64::sin));
    interp.define_instruction("float.cos", float_unary(f64::cos));
    interp.define_instruction("float.tan", float_unary(f64::tan));
    interp.define_instruction("float.exp", float_unary(f64::exp));
    interp.define_instruction("float.ln", float_unary(f64::ln));
    interp.define_instruction("float.<", float_compare(f64::lt));
    interp.define_instruction("float.>", float_compare(f64::gt));
    interp.define_instruction(
        "float.frominteger",
        UnaryInstruction::<i64, f64>::new(|i| Ok(*i as f64)),
    );
    interp.define_instruction(
        "float.fromboolean",
        UnaryInstruction::<bool, f64>::new(|b| Ok(if *b { 1.0 } else { 0.0 })),
    );
    interp.define_instruction(
        "float.rand",
        NullaryInstruction::<f64>::new(|interp| {
            let range = interp.config().float_erc;
            Ok(range.sample(interp.rng()))
        }),
    );
}

fn register_boolean(interp: &mut Interpreter) {
    interp.define_instruction("true", Constant::new(true));
    interp.define_instruction("false", Constant::new(false));
    interp.define_instruction(
        "boolean.not",
        UnaryInstruction::<bool, bool>::new(|b| Ok(!b)),
    );
    interp.define_instruction(
        "boolean.and",
        BinaryInstruction::<bool, bool, bool>::new(|a, b| Ok(*a && *b)),
    );
    interp.define_instruction(
        "boolean.or",
        BinaryInstruction::<bool, bool, bool>::new(|a, b| Ok(*a || *b)),
    );
    interp.define_instruction(
        "boolean.xor",
        BinaryInstruction::<bool, bool, bool>::new(|a, b| Ok(a != b)),
    );
    interp.define_instruction(
        "boolean.frominteger",
        UnaryInstruction::<i64, bool>::new(|i| Ok(*i != 0)),
    );
    interp.define_instruction(
        "boolean.fromfloat",
        UnaryInstruction::<f64, bool>::new(|f| Ok(*f != 0.0)),
    );
    interp.define_instruction(
        "boolean.rand",
        NullaryInstruction::<bool>::new(|interp| Ok(interp.rng().gen())),
    );
}

fn register_name(interp: &mut Interpreter) {
    // Moves the next exec item onto the name stack, if it is a name.
    interp.define_instruction(
        "name.quote",
        NullaryAction::new(|interp| {
            if let Some(Atom::Name(_)) = interp.exec_stack().top() {
                if let Some(Atom::Name(name)) = interp.exec_stack_mut().pop() {
                    interp.name_stack_mut().push(name);
                }
            }
            Ok(())
        }),
    );
}
