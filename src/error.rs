use crate::{FailurePoint, GrammarError, ParseError, ProductionError};
use std::fmt::{Display, Formatter};

impl ProductionError {
    pub fn is_unparsed(&self) -> bool {
        match self {
            ProductionError::Unparsed => true,
            ProductionError::Validation(_, _) => false,
        }
    }

    pub fn is_invalid(&self) -> bool {
        !self.is_unparsed()
    }
}

impl FailurePoint {
    fn write_location(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.position {
            Some(position) => write!(f, "({})", position),
            None => write!(f, "(token {})", self.pointer),
        }
    }
}

impl ParseError {
    /// The input position the error refers to.
    pub fn pointer(&self) -> usize {
        match self {
            ParseError::Unmatched(failure) | ParseError::Incomplete(failure) => failure.pointer,
            ParseError::Validation { pointer, .. } => *pointer,
            ParseError::NoDefaultRule => 0,
        }
    }

    pub fn is_incomplete(&self) -> bool {
        matches!(self, ParseError::Incomplete(_))
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::Unmatched(failure) => {
                match failure.expressions.last() {
                    Some(expectation) => write!(
                        f,
                        "Rule '{}' didn't match at '{}' ",
                        expectation, failure.snippet
                    )?,
                    None => write!(
                        f,
                        "Rule '{}' didn't match at '{}' ",
                        failure.rule, failure.snippet
                    )?,
                }
                failure.write_location(f)?;
                write!(f, ".")
            }
            ParseError::Incomplete(failure) => {
                write!(
                    f,
                    "Rule '{}' matched in its entirety, but it didn't consume all the input. \
                     The non-matching portion begins with '{}' ",
                    failure.rule, failure.snippet
                )?;
                failure.write_location(f)?;
                write!(f, ".")
            }
            ParseError::Validation { pointer, message } => {
                write!(f, "Validation failed at {}. {}", pointer, message)
            }
            ParseError::NoDefaultRule => {
                write!(
                    f,
                    "The grammar has no default rule; define a textual rule or pick one with default()."
                )
            }
        }
    }
}

impl std::error::Error for ParseError {}

impl Display for GrammarError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            GrammarError::BadGrammar(err) => {
                write!(f, "Failed to parse the grammar source. {}", err)
            }
            GrammarError::UndefinedLabel { name, pointer } => {
                write!(f, "The label '{}' is not defined in the grammar", name)?;
                match pointer {
                    Some(pointer) => write!(f, " (referenced at offset {}).", pointer),
                    None => write!(f, "."),
                }
            }
            GrammarError::CircularAlias { name } => {
                write!(f, "Rule '{}' is defined only in terms of itself.", name)
            }
            GrammarError::InvalidRegex { pattern, message } => {
                write!(f, "Invalid regex '{}'. {}", pattern, message)
            }
            GrammarError::TokenModeRegex { pattern } => {
                write!(
                    f,
                    "Token grammars cannot contain the regex atom ~\"{}\".",
                    pattern
                )
            }
            GrammarError::UnknownRule { name } => {
                write!(f, "No rule named '{}' in the grammar.", name)
            }
        }
    }
}

impl std::error::Error for GrammarError {}
