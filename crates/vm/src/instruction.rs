//! The instruction capability and its generic arity forms.
//!
//! Most built-ins are one of a handful of shapes: take zero to three
//! operands from typed stacks, run a callback, maybe push a result. The
//! forms below capture those shapes once. Each binds to its stacks through
//! [`StackType`], so the stack an operand comes from is fixed by the
//! operand's Rust type.
//!
//! Operands are popped top-down. For a binary form over `X` and `Y` the
//! expected layout is `... X Y` with `Y` on top, and the callback sees
//! `f(x, y)`. If `Y`'s stack is empty nothing happens. If `X`'s stack is
//! empty after `Y` was taken, the form also does nothing, and the `Y` value
//! is not restored. Ternary forms extend the same rule to `Z`, `Y`, `X`.
//!
//! Not every form backs a built-in. The trinary forms and the `with_peek`
//! builders are extension points for embedding code that registers its own
//! instructions through [`Interpreter::define_instruction`].

use crate::error::PushError;
use crate::machine::{Interpreter, StackAccessor, StackType};

/// An executable Push instruction.
pub trait Instruction: Send + Sync {
    fn execute(&self, interp: &mut Interpreter) -> Result<(), PushError>;
}

/// Why a callback produced no value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// Nothing to push. Not an error.
    NoResult,
    /// Division by zero, overflow, or a non-finite float. Producing forms
    /// push the output type's fault value; actions ignore it.
    Arithmetic,
    /// Anything else. Surfaces as [`PushError::InstructionFailed`].
    Failed(String),
}

/// What an instruction callback returns.
pub type OpResult<T> = Result<T, Fault>;

type Thunk<T> = Box<dyn Fn(&mut Interpreter) -> OpResult<T> + Send + Sync>;

fn take<T: StackType>(interp: &mut Interpreter, peek: bool) -> Option<T> {
    let stack = T::stack_mut(interp);
    if peek {
        stack.top().cloned()
    } else {
        stack.pop()
    }
}

fn take_two<X: StackType, Y: StackType>(interp: &mut Interpreter, peek: bool) -> Option<(X, Y)> {
    let y = take::<Y>(interp, peek)?;
    let x = take::<X>(interp, peek)?;
    Some((x, y))
}

fn take_three<X: StackType, Y: StackType, Z: StackType>(
    interp: &mut Interpreter,
    peek: bool,
) -> Option<(X, Y, Z)> {
    let z = take::<Z>(interp, peek)?;
    let y = take::<Y>(interp, peek)?;
    let x = take::<X>(interp, peek)?;
    Some((x, y, z))
}

fn settle_push<T: StackType>(
    interp: &mut Interpreter,
    result: OpResult<T>,
    operands: impl FnOnce() -> String,
) -> Result<(), PushError> {
    let value = match result {
        Ok(value) => Some(value),
        Err(Fault::NoResult) => None,
        Err(Fault::Arithmetic) => T::fault_value(),
        Err(Fault::Failed(reason)) => {
            return Err(PushError::InstructionFailed {
                operands: operands(),
                reason,
            })
        }
    };
    if let Some(value) = value {
        T::stack_mut(interp).push(value);
    }
    Ok(())
}

fn settle_action(result: OpResult<()>, operands: impl FnOnce() -> String) -> Result<(), PushError> {
    match result {
        Ok(()) | Err(Fault::NoResult) | Err(Fault::Arithmetic) => Ok(()),
        Err(Fault::Failed(reason)) => Err(PushError::InstructionFailed {
            operands: operands(),
            reason,
        }),
    }
}

const NO_OPERANDS: &str = "none";

/// Run a callback with no stack interaction.
pub struct NullaryAction {
    func: Thunk<()>,
}

impl NullaryAction {
    /// Wrap `func`.
    pub fn new(func: impl Fn(&mut Interpreter) -> OpResult<()> + Send + Sync + 'static) -> Self {
        Self {
            func: Box::new(func),
        }
    }
}

impl Instruction for NullaryAction {
    fn execute(&self, interp: &mut Interpreter) -> Result<(), PushError> {
        settle_action((self.func)(interp), || NO_OPERANDS.to_string())
    }
}

/// Compute a value and push it onto `T`'s stack.
pub struct NullaryInstruction<T> {
    func: Thunk<T>,
}

impl<T: StackType> NullaryInstruction<T> {
    /// Wrap `func`; its value is pushed onto `T`'s stack.
    pub fn new(func: impl Fn(&mut Interpreter) -> OpResult<T> + Send + Sync + 'static) -> Self {
        Self {
            func: Box::new(func),
        }
    }
}

impl<T: StackType> Instruction for NullaryInstruction<T> {
    fn execute(&self, interp: &mut Interpreter) -> Result<(), PushError> {
        let result = (self.func)(interp);
        settle_push(interp, result, || NO_OPERANDS.to_string())
    }
}

/// Take one `T` and run a callback on it.
pub struct UnaryAction<T> {
    func: Box<dyn Fn(&mut Interpreter, &T) -> OpResult<()> + Send + Sync>,
    peek: bool,
}

impl<T: StackType> UnaryAction<T> {
    /// Wrap `func`, popping its operands.
    pub fn new(
        func: impl Fn(&mut Interpreter, &T) -> OpResult<()> + Send + Sync + 'static,
    ) -> Self {
        Self {
            func: Box::new(func),
            peek: false,
        }
    }

    /// Read the operand without removing it.
    pub fn with_peek(mut self) -> Self {
        self.peek = true;
        self
    }
}

impl<T: StackType> Instruction for UnaryAction<T> {
    fn execute(&self, interp: &mut Interpreter) -> Result<(), PushError> {
        let Some(x) = take::<T>(interp, self.peek) else {
            return Ok(());
        };
        settle_action((self.func)(interp, &x), || format!("{x:?}"))
    }
}

/// Take one `I` and push the computed `O`.
pub struct UnaryInstruction<I, O> {
    func: Box<dyn Fn(&I) -> OpResult<O> + Send + Sync>,
    peek: bool,
}

impl<I: StackType, O: StackType> UnaryInstruction<I, O> {
    /// Wrap `func`, popping its operand.
    pub fn new(func: impl Fn(&I) -> OpResult<O> + Send + Sync + 'static) -> Self {
        Self {
            func: Box::new(func),
            peek: false,
        }
    }

    /// Read the operand without removing it.
    pub fn with_peek(mut self) -> Self {
        self.peek = true;
        self
    }
}

impl<I: StackType, O: StackType> Instruction for UnaryInstruction<I, O> {
    fn execute(&self, interp: &mut Interpreter) -> Result<(), PushError> {
        let Some(x) = take::<I>(interp, self.peek) else {
            return Ok(());
        };
        settle_push(interp, (self.func)(&x), || format!("{x:?}"))
    }
}

/// Take `Y` then `X` and run `f(x, y)`.
pub struct BinaryAction<X, Y> {
    func: Box<dyn Fn(&mut Interpreter, &X, &Y) -> OpResult<()> + Send + Sync>,
    peek: bool,
}

impl<X: StackType, Y: StackType> BinaryAction<X, Y> {
    /// Wrap `func`, popping its operands.
    pub fn new(
        func: impl Fn(&mut Interpreter, &X, &Y) -> OpResult<()> + Send + Sync + 'static,
    ) -> Self {
        Self {
            func: Box::new(func),
            peek: false,
        }
    }

    /// Read the operands without removing them.
    pub fn with_peek(mut self) -> Self {
        self.peek = true;
        self
    }
}

impl<X: StackType, Y: StackType> Instruction for BinaryAction<X, Y> {
    fn execute(&self, interp: &mut Interpreter) -> Result<(), PushError> {
        let Some((x, y)) = take_two::<X, Y>(interp, self.peek) else {
            return Ok(());
        };
        settle_action((self.func)(interp, &x, &y), || format!("{x:?} and {y:?}"))
    }
}

/// Take `Y` then `X` and push `f(x, y)` onto `Z`'s stack.
pub struct BinaryInstruction<X, Y, Z> {
    func: Box<dyn Fn(&X, &Y) -> OpResult<Z> + Send + Sync>,
    peek: bool,
}

impl<X: StackType, Y: StackType, Z: StackType> BinaryInstruction<X, Y, Z> {
    /// Wrap `func`, popping its operands.
    pub fn new(func: impl Fn(&X, &Y) -> OpResult<Z> + Send + Sync + 'static) -> Self {
        Self {
            func: Box::new(func),
            peek: false,
        }
    }

    /// Read the operands without removing them.
    pub fn with_peek(mut self) -> Self {
        self.peek = true;
        self
    }
}

impl<X: StackType, Y: StackType, Z: StackType> Instruction for BinaryInstruction<X, Y, Z> {
    fn execute(&self, interp: &mut Interpreter) -> Result<(), PushError> {
        let Some((x, y)) = take_two::<X, Y>(interp, self.peek) else {
            return Ok(());
        };
        settle_push(interp, (self.func)(&x, &y), || format!("{x:?} and {y:?}"))
    }
}

/// Take `Z`, `Y`, then `X` and run `f(x, y, z)`.
pub struct TrinaryAction<X, Y, Z> {
    func: Box<dyn Fn(&mut Interpreter, &X, &Y, &Z) -> OpResult<()> + Send + Sync>,
    peek: bool,
}

impl<X: StackType, Y: StackType, Z: StackType> TrinaryAction<X, Y, Z> {
    /// Wrap `func`, popping its operands.
    pub fn new(
        func: impl Fn(&mut Interpreter, &X, &Y, &Z) -> OpResult<()> + Send + Sync + 'static,
    ) -> Self {
        Self {
            func: Box::new(func),
            peek: false,
        }
    }

    /// Read the operands without removing them.
    pub fn with_peek(mut self) -> Self {
        self.peek = true;
        self
    }
}

impl<X: StackType, Y: StackType, Z: StackType> Instruction for TrinaryAction<X, Y, Z> {
    fn execute(&self, interp: &mut Interpreter) -> Result<(), PushError> {
        let Some((x, y, z)) = take_three::<X, Y, Z>(interp, self.peek) else {
            return Ok(());
        };
        settle_action((self.func)(interp, &x, &y, &z), || {
            format!("{x:?} and {y:?} and {z:?}")
        })
    }
}

/// Take `Z`, `Y`, then `X` and push `f(x, y, z)` onto `W`'s stack.
pub struct TrinaryInstruction<X, Y, Z, W> {
    func: Box<dyn Fn(&X, &Y, &Z) -> OpResult<W> + Send + Sync>,
    peek: bool,
}

impl<X: StackType, Y: StackType, Z: StackType, W: StackType> TrinaryInstruction<X, Y, Z, W> {
    /// Wrap `func`, popping its operands.
    pub fn new(func: impl Fn(&X, &Y, &Z) -> OpResult<W> + Send + Sync + 'static) -> Self {
        Self {
            func: Box::new(func),
            peek: false,
        }
    }

    /// Read the operands without removing them.
    pub fn with_peek(mut self) -> Self {
        self.peek = true;
        self
    }
}

impl<X: StackType, Y: StackType, Z: StackType, W: StackType> Instruction
    for TrinaryInstruction<X, Y, Z, W>
{
    fn execute(&self, interp: &mut Interpreter) -> Result<(), PushError> {
        let Some((x, y, z)) = take_three::<X, Y, Z>(interp, self.peek) else {
            return Ok(());
        };
        settle_push(interp, (self.func)(&x, &y, &z), || {
            format!("{x:?} and {y:?} and {z:?}")
        })
    }
}

/// Push a fixed value. Used for `true`/`false` and for names bound by
/// `<kind>.define`.
pub struct Constant<T> {
    value: T,
    stack: StackAccessor<T>,
}

impl<T: StackType> Constant<T> {
    /// A constant pushed onto `T`'s own stack.
    pub fn new(value: T) -> Self {
        Self {
            value,
            stack: T::stack_mut,
        }
    }
}

impl<T> Constant<T> {
    /// A constant pushed onto an explicitly chosen stack, such as exec.
    pub fn on(stack: StackAccessor<T>, value: T) -> Self {
        Self { value, stack }
    }
}

impl<T: Clone + Send + Sync> Instruction for Constant<T> {
    fn execute(&self, interp: &mut Interpreter) -> Result<(), PushError> {
        (self.stack)(interp).push(self.value.clone());
        Ok(())
    }
}
