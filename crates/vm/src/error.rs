//! Errors surfaced to the code embedding the VM.
//!
//! None of these can be triggered by the shape of an evolved program.
//! They signal setup mistakes: malformed program text, unknown instruction
//! names in an instruction set, bad selection patterns, or a custom
//! instruction callback that reported a hard failure.

use thiserror::Error;

/// Errors from parsing Push program text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Input ended before the program's closing parenthesis.
    #[error("no closing parenthesis found for program")]
    UnclosedProgram,

    /// A token that does not start with a letter failed to parse as a number.
    #[error("could not convert '{token}' to a number")]
    InvalidNumber { token: String },
}

/// Errors reported by the interpreter and the random code generator.
#[derive(Debug, Error)]
pub enum PushError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// An instruction set named an instruction that is not registered.
    #[error("unknown instruction \"{name}\" in instruction set")]
    UnknownInstruction { name: String },

    /// An instruction list entry was not a bare name.
    #[error("instruction list must contain instruction names only, found {found}")]
    NotAnInstructionName { found: String },

    /// A whitelist/blacklist pattern is not a valid regular expression.
    #[error("invalid instruction pattern '{pattern}'")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Random code was requested with an empty active instruction set.
    #[error("no active instructions to generate random code from")]
    NoActiveInstructions,

    /// An instruction callback failed with something other than an
    /// arithmetic fault or a "no result" signal.
    #[error("instruction failed for arguments {operands}: {reason}")]
    InstructionFailed { operands: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_parse_errors() {
        assert_eq!(
            ParseError::UnclosedProgram.to_string(),
            "no closing parenthesis found for program"
        );
        assert_eq!(
            ParseError::InvalidNumber {
                token: "+".to_string()
            }
            .to_string(),
            "could not convert '+' to a number"
        );
    }

    #[test]
    fn display_push_errors() {
        assert_eq!(
            PushError::UnknownInstruction {
                name: "integer.frob".to_string()
            }
            .to_string(),
            "unknown instruction \"integer.frob\" in instruction set"
        );
        assert_eq!(
            PushError::InstructionFailed {
                operands: "3 and 4".to_string(),
                reason: "boom".to_string()
            }
            .to_string(),
            "instruction failed for arguments 3 and 4: boom"
        );
    }

    #[test]
    fn parse_error_converts() {
        let err: PushError = ParseError::UnclosedProgram.into();
        assert!(matches!(err, PushError::Parse(ParseError::UnclosedProgram)));
    }
}
