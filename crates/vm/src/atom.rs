//! Atoms: the values that flow through stacks and program trees.

use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::instruction::Instruction;
use crate::machine::Interpreter;
use crate::program::Program;
use crate::PushError;

/// A bare symbol. Cheap to clone; compares and hashes like its text.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(Arc<str>);

impl Name {
    /// Intern `text` as a name.
    pub fn new(text: &str) -> Self {
        Self(Arc::from(text))
    }

    /// The name's text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Name {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Name {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Name {
    fn from(text: String) -> Self {
        Self(Arc::from(text))
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", &*self.0)
    }
}

/// A shared handle to a registered instruction.
///
/// Equality is identity: two handles are equal only if they point at the
/// same instruction object.
#[derive(Clone)]
pub struct InstructionRef {
    name: Name,
    op: Arc<dyn Instruction>,
}

impl InstructionRef {
    /// Share `op` under `name`.
    pub fn new(name: impl Into<Name>, op: impl Instruction + 'static) -> Self {
        Self {
            name: name.into(),
            op: Arc::new(op),
        }
    }

    /// The name the instruction was registered under.
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// Run the instruction against `interp`.
    pub fn execute(&self, interp: &mut Interpreter) -> Result<(), PushError> {
        self.op.execute(interp)
    }

    fn addr(&self) -> *const () {
        Arc::as_ptr(&self.op) as *const ()
    }
}

impl PartialEq for InstructionRef {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl Eq for InstructionRef {}

impl Hash for InstructionRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl fmt::Debug for InstructionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InstructionRef({})", self.name)
    }
}

/// A value on a stack or inside a program tree.
///
/// Every variant is cheap to share except [`Atom::Program`], whose clone is
/// a deep copy; a tree inserted into another tree never aliases it.
#[derive(Debug, Clone)]
pub enum Atom {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    /// An unresolved symbol. Resolved against bindings and the instruction
    /// registry only when executed.
    Name(Name),
    Instruction(InstructionRef),
    Program(Program),
}

impl Atom {
    /// The nested program, if this atom is one.
    pub fn as_program(&self) -> Option<&Program> {
        match self {
            Atom::Program(p) => Some(p),
            _ => None,
        }
    }

    /// Whether this atom is a nested program.
    pub fn is_program(&self) -> bool {
        matches!(self, Atom::Program(_))
    }
}

// Floats compare by value, except that NaN equals NaN so that a program
// always equals its own copy.
impl PartialEq for Atom {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Atom::Integer(a), Atom::Integer(b)) => a == b,
            (Atom::Float(a), Atom::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Atom::Boolean(a), Atom::Boolean(b)) => a == b,
            (Atom::Name(a), Atom::Name(b)) => a == b,
            (Atom::Instruction(a), Atom::Instruction(b)) => a == b,
            (Atom::Program(a), Atom::Program(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Atom {}

impl Hash for Atom {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Atom::Integer(v) => v.hash(state),
            Atom::Float(v) => {
                // Keep equal floats (0.0 / -0.0, any NaN) hashing alike.
                let bits = if *v == 0.0 {
                    0
                } else if v.is_nan() {
                    u64::MAX
                } else {
                    v.to_bits()
                };
                bits.hash(state);
            }
            Atom::Boolean(v) => v.hash(state),
            Atom::Name(v) => v.hash(state),
            Atom::Instruction(v) => v.hash(state),
            Atom::Program(v) => v.hash(state),
        }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::Integer(v) => write!(f, "{v}"),
            Atom::Float(v) => f.write_str(&format_float(*v)),
            Atom::Boolean(v) => write!(f, "{v}"),
            Atom::Name(v) => write!(f, "{v}"),
            Atom::Instruction(v) => write!(f, "{}", v.name()),
            Atom::Program(v) => write!(f, "{v}"),
        }
    }
}

/// Fixed-point rendering that always carries a fractional part and parses
/// back to the same value: `0.0`, `1.5`, `0.000001`, `-3.0`.
pub(crate) fn format_float(value: f64) -> String {
    let text = value.to_string();
    if !value.is_finite() || text.contains('.') {
        text
    } else {
        format!("{text}.0")
    }
}

impl From<i64> for Atom {
    fn from(v: i64) -> Self {
        Atom::Integer(v)
    }
}

impl From<f64> for Atom {
    fn from(v: f64) -> Self {
        Atom::Float(v)
    }
}

impl From<bool> for Atom {
    fn from(v: bool) -> Self {
        Atom::Boolean(v)
    }
}

impl From<Name> for Atom {
    fn from(v: Name) -> Self {
        Atom::Name(v)
    }
}

impl From<&str> for Atom {
    fn from(v: &str) -> Self {
        Atom::Name(Name::new(v))
    }
}

impl From<Program> for Atom {
    fn from(v: Program) -> Self {
        Atom::Program(v)
    }
}

impl From<InstructionRef> for Atom {
    fn from(v: InstructionRef) -> Self {
        Atom::Instruction(v)
    }
}
