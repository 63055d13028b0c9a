//! Random code generation and active instruction selection.
//!
//! Random programs are built from the *active* generator set. The active
//! set is edited against a retained snapshot of every *available*
//! generator, so include and exclude passes can be repeated. The snapshot
//! is taken when the interpreter is built and refreshed by
//! [`Interpreter::set_instructions`] and [`Interpreter::load_instructions`].

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use regex::Regex;
use tracing::{debug, warn};

use crate::atom::{Atom, Name};
use crate::builtins::InputInN;
use crate::config::InterpreterConfig;
use crate::error::PushError;
use crate::machine::{Interpreter, StackKind};
use crate::program::Program;

/// Produces one atom for random code.
#[derive(Debug, Clone, PartialEq)]
pub enum AtomGenerator {
    /// Always the given instruction name.
    Instruction(Name),
    /// `true` or `false`.
    Boolean,
    /// An integer from the configured `int_erc` range.
    Integer,
    /// A float from the configured `float_erc` range.
    Float,
}

impl AtomGenerator {
    /// Produce one atom, drawing literals from `config`'s ranges.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R, config: &InterpreterConfig) -> Atom {
        match self {
            AtomGenerator::Instruction(name) => Atom::Name(name.clone()),
            AtomGenerator::Boolean => Atom::Boolean(rng.gen()),
            AtomGenerator::Integer => Atom::Integer(config.int_erc.sample(rng)),
            AtomGenerator::Float => Atom::Float(config.float_erc.sample(rng)),
        }
    }
}

/// Generator state owned by an interpreter.
#[derive(Debug)]
pub struct RandomCode {
    rng: StdRng,
    active: BTreeMap<Name, AtomGenerator>,
    available: BTreeMap<Name, AtomGenerator>,
}

impl RandomCode {
    pub(crate) fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng,
            active: BTreeMap::new(),
            available: BTreeMap::new(),
        }
    }

    /// One atom from a uniformly chosen active generator.
    pub(crate) fn random_atom(&mut self, config: &InterpreterConfig) -> Result<Atom, PushError> {
        if self.active.is_empty() {
            return Err(PushError::NoActiveInstructions);
        }
        let index = self.rng.gen_range(0..self.active.len());
        let generator = self
            .active
            .values()
            .nth(index)
            .ok_or(PushError::NoActiveInstructions)?;
        Ok(generator.generate(&mut self.rng, config))
    }

    /// A program of `size` points: one point for the program itself, the
    /// rest split among children by [`RandomCode::distribution`].
    pub(crate) fn random_code(
        &mut self,
        size: usize,
        config: &InterpreterConfig,
    ) -> Result<Program, PushError> {
        let mut program = Program::new();
        for count in self.distribution(size.saturating_sub(1)) {
            let atom = if count == 1 {
                self.random_atom(config)?
            } else {
                Atom::Program(self.random_code(count, config)?)
            };
            program.push(atom);
        }
        Ok(program)
    }

    /// Split `count` into random positive chunks summing to `count`, in
    /// shuffled order.
    pub(crate) fn distribution(&mut self, count: usize) -> Vec<usize> {
        let mut chunks = Vec::new();
        let mut remaining = count;
        while remaining >= 1 {
            let chunk = if remaining < 2 {
                1
            } else {
                self.rng.gen_range(1..=remaining)
            };
            chunks.push(chunk);
            remaining -= chunk;
        }
        chunks.shuffle(&mut self.rng);
        chunks
    }

    pub(crate) fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}

impl Interpreter {
    /// Generate a random program of `size` points from the active
    /// instruction set.
    pub fn random_code(&mut self, size: usize) -> Result<Program, PushError> {
        self.random.random_code(size, &self.config)
    }

    /// Generate one random atom from the active instruction set.
    pub fn random_atom(&mut self) -> Result<Atom, PushError> {
        self.random.random_atom(&self.config)
    }

    /// The interpreter's random number generator.
    pub fn rng(&mut self) -> &mut StdRng {
        self.random.rng()
    }

    pub(crate) fn has_active_instructions(&self) -> bool {
        !self.random.active.is_empty()
    }

    /// Refresh the snapshot of available generators from the registry.
    pub fn load_instructions(&mut self) {
        self.random.available = self.generators.clone();
    }

    /// Make exactly the available generators matching any of `patterns`
    /// active.
    pub fn set_instructions(&mut self, patterns: &[&str]) -> Result<(), PushError> {
        self.load_instructions();
        self.random.active.clear();
        self.add_instructions(patterns)
    }

    /// Activate every available generator whose name matches one of the
    /// regular expressions in `patterns`.
    pub fn add_instructions(&mut self, patterns: &[&str]) -> Result<(), PushError> {
        for pattern in patterns {
            let regex = compile(pattern)?;
            for (name, generator) in &self.random.available {
                if regex.is_match(name.as_str()) {
                    self.random.active.insert(name.clone(), generator.clone());
                }
            }
        }
        debug!(active = self.random.active.len(), "instructions added");
        Ok(())
    }

    /// Deactivate every active generator whose name matches one of the
    /// regular expressions in `patterns`.
    pub fn remove_instructions(&mut self, patterns: &[&str]) -> Result<(), PushError> {
        for pattern in patterns {
            let regex = compile(pattern)?;
            self.random
                .active
                .retain(|name, _| !regex.is_match(name.as_str()));
        }
        debug!(active = self.random.active.len(), "instructions removed");
        Ok(())
    }

    /// Replace the active set from a list of instruction names.
    ///
    /// Besides plain instruction names the list understands two forms:
    /// `registered.<kind>` activates every instruction of that stack kind
    /// along with the kind's literal generators, and `input.makeinputsN`
    /// defines `input.in0` through `input.in{N-1}` and activates them.
    pub fn set_instruction_list(&mut self, list: &Program) -> Result<(), PushError> {
        self.random.active.clear();
        for atom in list.iter() {
            let name = match atom {
                Atom::Name(name) => name.clone(),
                Atom::Instruction(op) => op.name().clone(),
                other => {
                    return Err(PushError::NotAnInstructionName {
                        found: other.to_string(),
                    })
                }
            };
            self.activate_entry(&name)?;
        }
        debug!(active = self.random.active.len(), "instruction list set");
        Ok(())
    }

    fn activate_entry(&mut self, name: &Name) -> Result<(), PushError> {
        let text = name.as_str();

        if let Some(kind) = text.strip_prefix("registered.") {
            let Some(kind) = StackKind::from_prefix(kind) else {
                warn!(instruction = text, "unknown registered stack kind, skipping");
                return Ok(());
            };
            let prefix = kind.prefix();
            let matching: Vec<Name> = self
                .instructions
                .keys()
                .filter(|key| key.as_str().starts_with(prefix))
                .cloned()
                .collect();
            for key in matching {
                self.activate(&key)?;
            }
            let literals: &[&str] = match kind {
                StackKind::Boolean => &["true", "false"],
                StackKind::Integer => &["integer.erc"],
                StackKind::Float => &["float.erc"],
                _ => &[],
            };
            for literal in literals {
                self.activate(&Name::new(literal))?;
            }
            return Ok(());
        }

        if let Some(count) = text.strip_prefix("input.makeinputs") {
            let count: usize = count.parse().map_err(|_| PushError::UnknownInstruction {
                name: text.to_string(),
            })?;
            for index in 0..count {
                let input = format!("input.in{index}");
                self.define_instruction(&input, InputInN::new(index));
                self.activate(&Name::new(&input))?;
            }
            return Ok(());
        }

        self.activate(name)
    }

    fn activate(&mut self, name: &Name) -> Result<(), PushError> {
        let generator = self
            .generators
            .get(name)
            .cloned()
            .ok_or_else(|| PushError::UnknownInstruction {
                name: name.to_string(),
            })?;
        self.random.active.insert(name.clone(), generator);
        Ok(())
    }

    /// Active instruction names, sorted and space separated.
    pub fn instructions_string(&self) -> String {
        self.random
            .active
            .keys()
            .map(Name::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Number of active generators.
    pub fn active_instruction_count(&self) -> usize {
        self.random.active.len()
    }
}

fn compile(pattern: &str) -> Result<Regex, PushError> {
    Regex::new(pattern).map_err(|source| PushError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> Interpreter {
        Interpreter::with_config(InterpreterConfig {
            seed: Some(11),
            ..InterpreterConfig::default()
        })
    }

    #[test]
    fn distribution_sums_to_count() {
        let mut random = RandomCode::new(Some(3));
        for count in 0..40 {
            let chunks = random.distribution(count);
            assert_eq!(chunks.iter().sum::<usize>(), count);
            assert!(chunks.iter().all(|&c| c >= 1));
        }
    }

    #[test]
    fn random_code_has_requested_size() {
        let mut interp = seeded();
        interp.set_instructions(&["integer\\..*"]).unwrap();
        for size in 1..30 {
            let program = interp.random_code(size).unwrap();
            assert_eq!(program.program_size(), size - 1, "size {size}");
        }
    }

    #[test]
    fn random_atom_needs_active_instructions() {
        let mut interp = seeded();
        assert!(matches!(
            interp.random_atom(),
            Err(PushError::NoActiveInstructions)
        ));
        assert!(interp.random_code(1).unwrap().is_empty());
        assert!(interp.random_code(3).is_err());
    }

    #[test]
    fn set_and_remove_by_pattern() {
        let mut interp = seeded();
        assert_eq!(interp.active_instruction_count(), 0);

        interp.set_instructions(&["\\+$"]).unwrap();
        assert_eq!(interp.instructions_string(), "float.+ integer.+");

        interp.set_instructions(&[".*"]).unwrap();
        let all = interp.active_instruction_count();
        interp.remove_instructions(&["\\.rand$"]).unwrap();
        assert_eq!(interp.active_instruction_count(), all - 4);

        interp.add_instructions(&["^code\\.rand$"]).unwrap();
        assert_eq!(interp.active_instruction_count(), all - 3);
    }

    #[test]
    fn bad_pattern_is_reported() {
        let mut interp = seeded();
        let err = interp.set_instructions(&["("]).unwrap_err();
        assert!(matches!(err, PushError::InvalidPattern { .. }));
    }

    #[test]
    fn registered_kind_pulls_in_literals() {
        let mut interp = seeded();
        interp
            .set_instruction_list(&Program::parse("( registered.boolean registered.float )").unwrap())
            .unwrap();
        let names = interp.instructions_string();
        assert!(names.contains("boolean.and"));
        assert!(names.contains("float.erc"));
        assert!(names.contains("true"));
        assert!(names.contains("false"));
        assert!(!names.contains("integer."));
    }

    #[test]
    fn unknown_registered_kind_is_skipped() {
        let mut interp = seeded();
        interp
            .set_instruction_list(&Program::parse("( registered.frame exec.k )").unwrap())
            .unwrap();
        assert_eq!(interp.instructions_string(), "exec.k");
    }

    #[test]
    fn unknown_instruction_is_an_error() {
        let mut interp = seeded();
        let err = interp
            .set_instruction_list(&Program::parse("( integer.frob )").unwrap())
            .unwrap_err();
        assert!(matches!(err, PushError::UnknownInstruction { .. }));
    }

    #[test]
    fn non_name_entry_is_an_error() {
        let mut interp = seeded();
        let err = interp
            .set_instruction_list(&Program::parse("( 3 )").unwrap())
            .unwrap_err();
        assert!(matches!(err, PushError::NotAnInstructionName { .. }));
    }

    #[test]
    fn make_inputs_defines_input_instructions() {
        let mut interp = seeded();
        interp
            .set_instruction_list(&Program::parse("( input.makeinputs3 )").unwrap())
            .unwrap();
        assert_eq!(
            interp.instructions_string(),
            "input.in0 input.in1 input.in2"
        );
        assert!(interp.instruction("input.in2").is_some());
    }

    #[test]
    fn generated_literals_respect_ranges() {
        let mut interp = seeded();
        interp
            .set_instruction_list(&Program::parse("( integer.erc )").unwrap())
            .unwrap();
        for _ in 0..50 {
            match interp.random_atom().unwrap() {
                Atom::Integer(v) => assert!((-100..=100).contains(&v)),
                other => panic!("unexpected atom {other:?}"),
            }
        }
    }

    #[test]
    fn same_seed_same_code() {
        let mut a = seeded();
        let mut b = seeded();
        a.set_instructions(&[".*"]).unwrap();
        b.set_instructions(&[".*"]).unwrap();
        assert_eq!(a.random_code(40).unwrap(), b.random_code(40).unwrap());
    }
}
