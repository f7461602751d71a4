use crate::{Code, Input, Position, Token};
use std::fmt::{Display, Formatter};
use std::rc::Rc;

impl Token {
    pub fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl Input {
    pub fn from_text(text: &str) -> Self {
        Input::Text(Rc::new(Code::new(text)))
    }

    pub fn from_tokens(tokens: &[Token]) -> Self {
        Input::Tokens(Rc::from(tokens.to_vec()))
    }

    /// Number of positions: byte length of the text, or token count.
    pub fn len(&self) -> usize {
        match self {
            Input::Text(code) => code.text().len(),
            Input::Tokens(tokens) => tokens.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn code(&self) -> Option<&Code> {
        match self {
            Input::Text(code) => Some(code),
            Input::Tokens(_) => None,
        }
    }

    pub fn tokens(&self) -> Option<&[Token]> {
        match self {
            Input::Text(_) => None,
            Input::Tokens(tokens) => Some(tokens),
        }
    }

    /// Line and column at `pointer`; [None] for token sequences.
    pub fn position(&self, pointer: usize) -> Option<Position> {
        match self {
            Input::Text(code) => Some(code.obtain_position(pointer)),
            Input::Tokens(_) => None,
        }
    }

    /// A short excerpt of the input starting at `pointer`, for error messages.
    pub fn snippet(&self, pointer: usize) -> String {
        match self {
            Input::Text(code) => match code.text().get(pointer..) {
                Some(rest) => rest.chars().take(20).collect(),
                None => String::new(),
            },
            Input::Tokens(tokens) => tokens
                .iter()
                .skip(pointer)
                .take(3)
                .map(|t| t.kind.as_str())
                .collect::<Vec<&str>>()
                .join(" "),
        }
    }

    /// Human readable location of `pointer`, used by debug logging.
    pub(crate) fn locate(&self, pointer: usize) -> String {
        match self.position(pointer) {
            Some(position) => position.to_string(),
            None => format!("token {}", pointer),
        }
    }
}
