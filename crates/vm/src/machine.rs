//! Interpreter state: typed stacks, instruction registry, name bindings.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use push_common::{Stack, TypedStack};

use crate::atom::{Atom, InstructionRef, Name};
use crate::builtins::{self, DefaultInputPusher, InputPusher};
use crate::config::InterpreterConfig;
use crate::instruction::Instruction;
use crate::random::{AtomGenerator, RandomCode};

/// A function selecting one of the interpreter's stacks.
pub type StackAccessor<T> = fn(&mut Interpreter) -> &mut TypedStack<T>;

/// Element types that own a stack in the interpreter.
///
/// `Atom` maps to the code stack. The exec and input stacks also hold atoms
/// and are reached through explicit [`StackAccessor`]s instead.
pub trait StackType: Clone + fmt::Debug + Send + Sync + 'static {
    fn stack_mut(interp: &mut Interpreter) -> &mut TypedStack<Self>;

    /// What a producing instruction pushes after an arithmetic fault.
    fn fault_value() -> Option<Self>;
}

impl StackType for i64 {
    fn stack_mut(interp: &mut Interpreter) -> &mut TypedStack<Self> {
        &mut interp.int_stack
    }

    fn fault_value() -> Option<Self> {
        Some(0)
    }
}

impl StackType for f64 {
    fn stack_mut(interp: &mut Interpreter) -> &mut TypedStack<Self> {
        &mut interp.float_stack
    }

    fn fault_value() -> Option<Self> {
        Some(0.0)
    }
}

impl StackType for bool {
    fn stack_mut(interp: &mut Interpreter) -> &mut TypedStack<Self> {
        &mut interp.bool_stack
    }

    fn fault_value() -> Option<Self> {
        Some(false)
    }
}

impl StackType for Name {
    fn stack_mut(interp: &mut Interpreter) -> &mut TypedStack<Self> {
        &mut interp.name_stack
    }

    fn fault_value() -> Option<Self> {
        None
    }
}

impl StackType for Atom {
    fn stack_mut(interp: &mut Interpreter) -> &mut TypedStack<Self> {
        &mut interp.code_stack
    }

    fn fault_value() -> Option<Self> {
        None
    }
}

/// The interpreter's stacks, by the prefix their instructions use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StackKind {
    Integer,
    Float,
    Boolean,
    Name,
    Code,
    Exec,
    Input,
}

impl StackKind {
    /// Every stack kind, in display order.
    pub const ALL: [StackKind; 7] = [
        StackKind::Integer,
        StackKind::Float,
        StackKind::Boolean,
        StackKind::Name,
        StackKind::Code,
        StackKind::Exec,
        StackKind::Input,
    ];

    /// Instruction name prefix, e.g. `integer` in `integer.dup`.
    pub fn prefix(self) -> &'static str {
        match self {
            StackKind::Integer => "integer",
            StackKind::Float => "float",
            StackKind::Boolean => "boolean",
            StackKind::Name => "name",
            StackKind::Code => "code",
            StackKind::Exec => "exec",
            StackKind::Input => "input",
        }
    }

    /// The kind whose instruction prefix is `prefix`.
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.prefix() == prefix)
    }
}

impl fmt::Display for StackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// The Push interpreter.
///
/// Owns every typed stack, the exec (control) stack, the instruction
/// registry, the name bindings made by `<kind>.define`, and the random
/// code generator. One interpreter runs one program at a time; reuse it
/// across evaluations with [`Interpreter::clear_stacks`].
pub struct Interpreter {
    pub(crate) int_stack: TypedStack<i64>,
    pub(crate) float_stack: TypedStack<f64>,
    pub(crate) bool_stack: TypedStack<bool>,
    pub(crate) name_stack: TypedStack<Name>,
    pub(crate) code_stack: TypedStack<Atom>,
    pub(crate) exec_stack: TypedStack<Atom>,
    pub(crate) input_stack: TypedStack<Atom>,
    /// Registered instructions by name.
    pub(crate) instructions: HashMap<Name, InstructionRef>,
    /// Names bound by `<kind>.define`. Checked before `instructions`.
    pub(crate) bindings: HashMap<Name, InstructionRef>,
    /// Every atom generator random code may draw from.
    pub(crate) generators: BTreeMap<Name, AtomGenerator>,
    pub(crate) random: RandomCode,
    pub(crate) input_pusher: Arc<dyn InputPusher>,
    pub(crate) evaluation_executions: u64,
    pub(crate) config: InterpreterConfig,
}

impl Interpreter {
    /// An interpreter with the default configuration and every built-in
    /// instruction registered.
    pub fn new() -> Self {
        Self::with_config(InterpreterConfig::default())
    }

    /// An interpreter with every built-in registered and the given configuration.
    pub fn with_config(config: InterpreterConfig) -> Self {
        let mut interp = Self {
            int_stack: TypedStack::new(),
            float_stack: TypedStack::new(),
            bool_stack: TypedStack::new(),
            name_stack: TypedStack::new(),
            code_stack: TypedStack::new(),
            exec_stack: TypedStack::new(),
            input_stack: TypedStack::new(),
            instructions: HashMap::new(),
            bindings: HashMap::new(),
            generators: BTreeMap::new(),
            random: RandomCode::new(config.seed),
            input_pusher: Arc::new(DefaultInputPusher),
            evaluation_executions: 0,
            config,
        };
        builtins::register_all(&mut interp);
        interp.load_instructions();
        interp
    }

    /// The active configuration.
    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    /// Mutable configuration. Changes apply to the next instruction executed.
    pub fn config_mut(&mut self) -> &mut InterpreterConfig {
        &mut self.config
    }

    /// Register `op` under `name`, replacing any previous instruction of
    /// that name, and make it available to random code generation.
    pub fn define_instruction(&mut self, name: &str, op: impl Instruction + 'static) {
        let name = Name::new(name);
        self.instructions
            .insert(name.clone(), InstructionRef::new(name.clone(), op));
        self.generators
            .insert(name.clone(), AtomGenerator::Instruction(name));
    }

    pub(crate) fn define_generator(&mut self, name: &str, generator: AtomGenerator) {
        self.generators.insert(Name::new(name), generator);
    }

    /// Look up a registered instruction.
    pub fn instruction(&self, name: &str) -> Option<&InstructionRef> {
        self.instructions.get(name)
    }

    /// Names of every registered instruction, sorted.
    pub fn instruction_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.instructions.keys().map(Name::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Record `name` so that executing it runs `op`. Takes precedence over
    /// registered instructions of the same name.
    pub(crate) fn bind(&mut self, name: Name, op: impl Instruction + 'static) {
        self.bindings
            .insert(name.clone(), InstructionRef::new(name, op));
    }

    /// Whether `name` has been bound by a `<kind>.define`.
    pub fn is_bound(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Empty every stack, exec included. Bindings and registered
    /// instructions survive.
    pub fn clear_stacks(&mut self) {
        for kind in StackKind::ALL {
            self.stack_mut(kind).clear();
        }
    }

    /// The stack for `kind`, with its element type erased.
    pub fn stack(&self, kind: StackKind) -> &dyn Stack {
        match kind {
            StackKind::Integer => &self.int_stack,
            StackKind::Float => &self.float_stack,
            StackKind::Boolean => &self.bool_stack,
            StackKind::Name => &self.name_stack,
            StackKind::Code => &self.code_stack,
            StackKind::Exec => &self.exec_stack,
            StackKind::Input => &self.input_stack,
        }
    }

    /// The stack for `kind`, mutably, with its element type erased.
    pub fn stack_mut(&mut self, kind: StackKind) -> &mut dyn Stack {
        match kind {
            StackKind::Integer => &mut self.int_stack,
            StackKind::Float => &mut self.float_stack,
            StackKind::Boolean => &mut self.bool_stack,
            StackKind::Name => &mut self.name_stack,
            StackKind::Code => &mut self.code_stack,
            StackKind::Exec => &mut self.exec_stack,
            StackKind::Input => &mut self.input_stack,
        }
    }

    /// The integer stack.
    pub fn int_stack(&self) -> &TypedStack<i64> {
        &self.int_stack
    }

    /// The integer stack, mutably.
    pub fn int_stack_mut(&mut self) -> &mut TypedStack<i64> {
        &mut self.int_stack
    }

    /// The float stack.
    pub fn float_stack(&self) -> &TypedStack<f64> {
        &self.float_stack
    }

    /// The float stack, mutably.
    pub fn float_stack_mut(&mut self) -> &mut TypedStack<f64> {
        &mut self.float_stack
    }

    /// The boolean stack.
    pub fn bool_stack(&self) -> &TypedStack<bool> {
        &self.bool_stack
    }

    /// The boolean stack, mutably.
    pub fn bool_stack_mut(&mut self) -> &mut TypedStack<bool> {
        &mut self.bool_stack
    }

    /// The name stack.
    pub fn name_stack(&self) -> &TypedStack<Name> {
        &self.name_stack
    }

    /// The name stack, mutably.
    pub fn name_stack_mut(&mut self) -> &mut TypedStack<Name> {
        &mut self.name_stack
    }

    /// The code stack.
    pub fn code_stack(&self) -> &TypedStack<Atom> {
        &self.code_stack
    }

    /// The code stack, mutably.
    pub fn code_stack_mut(&mut self) -> &mut TypedStack<Atom> {
        &mut self.code_stack
    }

    /// The control stack. Its top is the next atom to execute.
    pub fn exec_stack(&self) -> &TypedStack<Atom> {
        &self.exec_stack
    }

    /// The exec stack, mutably.
    pub fn exec_stack_mut(&mut self) -> &mut TypedStack<Atom> {
        &mut self.exec_stack
    }

    /// Read-only inputs of the current fitness case.
    pub fn input_stack(&self) -> &TypedStack<Atom> {
        &self.input_stack
    }

    /// The input stack, mutably. Seed inputs here before executing.
    pub fn input_stack_mut(&mut self) -> &mut TypedStack<Atom> {
        &mut self.input_stack
    }

    /// Replace the strategy that routes inputs onto typed stacks.
    pub fn set_input_pusher(&mut self, pusher: impl InputPusher + 'static) {
        self.input_pusher = Arc::new(pusher);
    }

    /// The installed input routing strategy.
    pub fn input_pusher(&self) -> Arc<dyn InputPusher> {
        Arc::clone(&self.input_pusher)
    }

    /// Total atoms executed by this interpreter across all runs.
    pub fn evaluation_executions(&self) -> u64 {
        self.evaluation_executions
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Interpreter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interpreter")
            .field("int_stack", &self.int_stack)
            .field("float_stack", &self.float_stack)
            .field("bool_stack", &self.bool_stack)
            .field("name_stack", &self.name_stack)
            .field("code_stack", &self.code_stack)
            .field("exec_stack", &self.exec_stack)
            .field("input_stack", &self.input_stack)
            .field("instructions", &self.instructions.len())
            .field("bindings", &self.bindings.len())
            .field("evaluation_executions", &self.evaluation_executions)
            .finish()
    }
}

impl fmt::Display for Interpreter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "exec stack: {}", self.exec_stack)?;
        writeln!(f, "code stack: {}", self.code_stack)?;
        writeln!(f, "int stack: {}", self.int_stack)?;
        writeln!(f, "float stack: {}", self.float_stack)?;
        writeln!(f, "boolean stack: {}", self.bool_stack)?;
        writeln!(f, "name stack: {}", self.name_stack)?;
        write!(f, "input stack: {}", self.input_stack)
    }
}
