//! Program trees and their text format.
//!
//! A [`Program`] is a stack of atoms whose elements may themselves be
//! programs. Every node of the nested structure is reachable through one
//! flat index space:
//!
//! - indices `0..size()` name the immediate children, each addressed as a
//!   unit (a nested program at index `i` is the whole subtree);
//! - indices `size()..program_size()` walk into nested children in order,
//!   where a nested child of total size `L` owns the next `L` indices and
//!   recurses with the index rebased to its own numbering.
//!
//! For `( 2.0 ( TEST 2 ( 3 ) ) )`: 0 is `2.0`, 1 is `( TEST 2 ( 3 ) )`,
//! 2 is `TEST`, 3 is `2`, 4 is `( 3 )`, 5 is `3`.

use std::fmt;
use std::str::FromStr;

use push_common::TypedStack;

use crate::atom::{Atom, Name};
use crate::error::ParseError;

/// A nested Push program.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Program {
    items: TypedStack<Atom>,
}

impl Program {
    /// Create an empty program.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse program text.
    ///
    /// Parentheses are padded with whitespace and the text is split on
    /// whitespace. An opening `(` as the very first token delimits the
    /// program itself; every later `(` opens a nested program. Tokens after
    /// the outermost closing `)` are ignored.
    ///
    /// Tokens starting with a letter become bare names (`true` included;
    /// resolution happens at execution time). Other tokens are numbers:
    /// floats if they contain `.`, integers otherwise.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let padded = text.replace('(', " ( ").replace(')', " ) ");
        let tokens: Vec<&str> = padded.split_whitespace().collect();
        let mut program = Program::new();
        program.parse_tokens(&tokens, 0)?;
        Ok(program)
    }

    /// Fill `self` from `tokens[start..]`, returning the index of the
    /// closing parenthesis that ends this level.
    fn parse_tokens(&mut self, tokens: &[&str], start: usize) -> Result<usize, ParseError> {
        let mut first = start == 0;
        let mut n = start;

        while n < tokens.len() {
            match tokens[n] {
                "(" if first => {}
                "(" => {
                    let mut child = Program::new();
                    n = child.parse_tokens(tokens, n + 1)?;
                    self.push(Atom::Program(child));
                }
                ")" => return Ok(n),
                token => self.push(parse_atom(token)?),
            }
            first = false;
            n += 1;
        }

        Err(ParseError::UnclosedProgram)
    }

    /// Number of immediate children.
    pub fn size(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the program has no children.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of atoms in the whole tree: immediate children plus the
    /// program size of every nested child.
    pub fn program_size(&self) -> usize {
        self.items.len()
            + self
                .items
                .iter()
                .filter_map(Atom::as_program)
                .map(Program::program_size)
                .sum::<usize>()
    }

    /// The node at flat index `index`, or `None` if the index is past the
    /// end of the tree.
    pub fn subtree(&self, index: usize) -> Option<&Atom> {
        if index < self.size() {
            return self.items.as_slice().get(index);
        }
        let (child, rebased) = self.locate(index)?;
        child.subtree(rebased)
    }

    /// Program size of the node at `index`: 1 for a non-program atom, 0 if
    /// the index addresses nothing.
    pub fn subtree_size(&self, index: usize) -> usize {
        match self.subtree(index) {
            None => 0,
            Some(Atom::Program(p)) => p.program_size(),
            Some(_) => 1,
        }
    }

    /// Replace the node at `index` with `replacement`.
    ///
    /// Replacing into an empty program always succeeds, whatever the index,
    /// by making `replacement` its only child. Returns false if the index
    /// addresses nothing.
    pub fn replace_subtree(&mut self, index: usize, replacement: Atom) -> bool {
        if self.is_empty() {
            self.push(replacement);
            return true;
        }
        if index < self.size() {
            self.items.as_mut_slice()[index] = replacement;
            return true;
        }
        match self.locate_mut(index) {
            Some((child, rebased)) => child.replace_subtree(rebased, replacement),
            None => false,
        }
    }

    /// Splice the children of the nested program at `index` into its
    /// parent, removing one level of nesting. Non-program targets and
    /// out-of-range indices leave the tree unchanged.
    pub fn flatten(&mut self, index: usize) {
        if index < self.size() {
            if !self.items.as_slice()[index].is_program() {
                return;
            }
            let old = std::mem::take(&mut self.items).into_vec();
            self.items = old
                .into_iter()
                .enumerate()
                .flat_map(|(i, atom)| match atom {
                    Atom::Program(p) if i == index => p.into_atoms(),
                    other => vec![other],
                })
                .collect();
            return;
        }
        if let Some((child, rebased)) = self.locate_mut(index) {
            child.flatten(rebased);
        }
    }

    /// Find the nested child owning flat index `index >= size()` and the
    /// index rebased into that child's numbering.
    fn locate(&self, index: usize) -> Option<(&Program, usize)> {
        let mut offset = self.size();
        for child in self.items.iter().filter_map(Atom::as_program) {
            let length = child.program_size();
            if index - offset < length {
                return Some((child, index - offset));
            }
            offset += length;
        }
        None
    }

    fn locate_mut(&mut self, index: usize) -> Option<(&mut Program, usize)> {
        let mut offset = self.size();
        for atom in self.items.as_mut_slice() {
            if let Atom::Program(child) = atom {
                let length = child.program_size();
                if index - offset < length {
                    return Some((child, index - offset));
                }
                offset += length;
            }
        }
        None
    }

    /// Append `atom` as the last child.
    pub fn push(&mut self, atom: Atom) {
        self.items.push(atom);
    }

    /// Remove and return the last child.
    pub fn pop(&mut self) -> Option<Atom> {
        self.items.pop()
    }

    /// Immediate children, first (leftmost) to last.
    pub fn iter(&self) -> std::slice::Iter<'_, Atom> {
        self.items.iter()
    }

    /// The children viewed as a stack: the last textual child is the top.
    pub fn as_stack(&self) -> &TypedStack<Atom> {
        &self.items
    }

    /// The children as a mutable stack.
    pub fn as_stack_mut(&mut self) -> &mut TypedStack<Atom> {
        &mut self.items
    }

    /// Consume the program, returning its children in order.
    pub fn into_atoms(self) -> Vec<Atom> {
        self.items.into_vec()
    }
}

fn parse_atom(token: &str) -> Result<Atom, ParseError> {
    if token.starts_with(char::is_alphabetic) {
        return Ok(Atom::Name(Name::new(token)));
    }
    let invalid = || ParseError::InvalidNumber {
        token: token.to_string(),
    };
    if token.contains('.') {
        token.parse::<f64>().map(Atom::Float).map_err(|_| invalid())
    } else {
        token.parse::<i64>().map(Atom::Integer).map_err(|_| invalid())
    }
}

impl FromStr for Program {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Program::parse(s)
    }
}

impl From<Vec<Atom>> for Program {
    fn from(atoms: Vec<Atom>) -> Self {
        Self {
            items: atoms.into(),
        }
    }
}

impl FromIterator<Atom> for Program {
    fn from_iter<I: IntoIterator<Item = Atom>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, atom) in self.items.iter().enumerate() {
            if i != 0 {
                write!(f, " ")?;
            }
            write!(f, "{atom}")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(text: &str) -> Program {
        Program::parse(text).unwrap()
    }

    #[test]
    fn parse_scalars_and_names() {
        let program = p("( 1 -2 3.5 x integer.+ true )");
        let atoms: Vec<Atom> = program.iter().cloned().collect();
        assert_eq!(
            atoms,
            vec![
                Atom::Integer(1),
                Atom::Integer(-2),
                Atom::Float(3.5),
                Atom::from("x"),
                Atom::from("integer.+"),
                Atom::from("true"),
            ]
        );
    }

    #[test]
    fn parse_nested_without_spaces() {
        let program = p("(1(2) (3) TEST TEST (2 TEST))");
        assert_eq!(program.size(), 6);
        assert_eq!(program.to_string(), "(1 (2) (3) TEST TEST (2 TEST))");
    }

    #[test]
    fn parse_empty_program() {
        assert!(p("( )").is_empty());
        assert!(p("()").is_empty());
    }

    #[test]
    fn parse_missing_close_is_error() {
        assert_eq!(Program::parse("( 1 2"), Err(ParseError::UnclosedProgram));
        assert_eq!(Program::parse("( 1 ( 2 )"), Err(ParseError::UnclosedProgram));
        assert_eq!(Program::parse(""), Err(ParseError::UnclosedProgram));
    }

    #[test]
    fn parse_bad_number_is_error() {
        assert_eq!(
            Program::parse("( 1 + 2 )"),
            Err(ParseError::InvalidNumber {
                token: "+".to_string()
            })
        );
        assert!(matches!(
            Program::parse("( 1.2.3 )"),
            Err(ParseError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn parse_ignores_tokens_after_outer_close() {
        assert_eq!(p("( 1 ) 2 3"), p("( 1 )"));
    }

    #[test]
    fn print_round_trip_literal() {
        let program = p("(0 1 0.0 1.0)");
        assert_eq!(program.to_string(), "(0 1 0.0 1.0)");
        assert_eq!(p(&program.to_string()).to_string(), "(0 1 0.0 1.0)");
    }

    #[test]
    fn nested_equality() {
        let a = p("( 1.0 ( TEST 2 ( 3 ) ) )");
        let b = p("( 1.0 ( TEST 2 ( 3 ) ) )");
        let c = p("( 2.0 ( TEST 2 ( 3 ) ) )");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn program_size_counts_every_atom() {
        let program = p("( 2.0 ( TEST 2 ( 3 ) ) )");
        assert_eq!(program.size(), 2);
        assert_eq!(program.program_size(), 6);
        assert_eq!(p("()").program_size(), 0);
        assert_eq!(p("(())").program_size(), 1);
    }

    #[test]
    fn subtree_fetch_walks_flat_index() {
        let program = p("( 2.0 ( TEST 2 ( 3 ) ) )");
        assert_eq!(program.subtree(0), Some(&Atom::Float(2.0)));
        assert_eq!(program.subtree(1), Some(&Atom::Program(p("( TEST 2 ( 3 ) )"))));
        assert_eq!(program.subtree(2), Some(&Atom::from("TEST")));
        assert_eq!(program.subtree(3), Some(&Atom::Integer(2)));
        assert_eq!(program.subtree(4), Some(&Atom::Program(p("( 3 )"))));
        assert_eq!(program.subtree(5), Some(&Atom::Integer(3)));
        assert_eq!(program.subtree(6), None);
    }

    #[test]
    fn subtree_size() {
        let program = p("( 2.0 ( TEST 2 ( 3 ) ) )");
        assert_eq!(program.subtree_size(0), 1);
        assert_eq!(program.subtree_size(1), 4);
        assert_eq!(program.subtree_size(4), 1);
        assert_eq!(program.subtree_size(42), 0);
    }

    #[test]
    fn subtree_replace_sequence() {
        let mut program = p("( 2.0 ( TEST 2 ( 3 ) ) )");
        assert!(program.replace_subtree(0, Atom::Integer(3)));
        assert!(program.replace_subtree(2, Atom::from("TEST2")));
        assert!(program.replace_subtree(3, Atom::Program(p("( X )"))));
        assert_eq!(program, p("( 3 ( TEST2 ( X ) ( 3 ) ) )"));
        assert_eq!(program.to_string(), "(3 (TEST2 (X) (3)))");
    }

    #[test]
    fn replace_into_empty_ignores_index() {
        let mut program = Program::new();
        assert!(program.replace_subtree(17, Atom::Integer(9)));
        assert_eq!(program, p("( 9 )"));
    }

    #[test]
    fn replace_out_of_range_fails() {
        let mut program = p("( 1 ( 2 ) )");
        assert!(!program.replace_subtree(3, Atom::Integer(0)));
        assert_eq!(program, p("( 1 ( 2 ) )"));
    }

    #[test]
    fn replacement_is_a_copy() {
        let mut inserted = p("( X )");
        let mut program = p("( 1 )");
        program.replace_subtree(0, Atom::Program(inserted.clone()));
        inserted.push(Atom::Integer(5));
        assert_eq!(program, p("( ( X ) )"));
    }

    #[test]
    fn flatten_immediate_child() {
        let mut program = p("( 1 ( 2 3 ) 4 )");
        program.flatten(1);
        assert_eq!(program, p("( 1 2 3 4 )"));
    }

    #[test]
    fn flatten_nested_child() {
        let mut program = p("( 1 ( 2 ( 3 4 ) ) )");
        // 0:1 1:(2 (3 4)) 2:2 3:(3 4)
        program.flatten(3);
        assert_eq!(program, p("( 1 ( 2 3 4 ) )"));
    }

    #[test]
    fn flatten_non_program_is_noop() {
        let mut program = p("( 1 ( 2 ) )");
        program.flatten(0);
        program.flatten(99);
        assert_eq!(program, p("( 1 ( 2 ) )"));
    }
}
