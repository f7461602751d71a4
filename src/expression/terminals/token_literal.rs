use crate::expression::{terminals::escape_literal, ExpressionLogger, ExprTag, TokenLiteral};
use crate::{
    Cache, CacheKey, IExpression, Input, Log, ParseNode, ParsedResult, ProductionError,
    SuccessData,
};
use std::fmt::{Display, Formatter};
use std::rc::Rc;

impl TokenLiteral {
    /// Create a terminal matching one token whose kind equals `value`.
    pub fn new(value: &str) -> Self {
        Self {
            value: value.to_string(),
            tag: ExprTag::new(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl ExpressionLogger for TokenLiteral {
    fn get_debugger(&self) -> Option<&Log<&'static str>> {
        self.tag.get_debugger()
    }
}

impl Display for TokenLiteral {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.tag.rule_name() {
            Some(name) => write!(f, "{}", name),
            None => self.write_body(f),
        }
    }
}

impl IExpression for TokenLiteral {
    fn cache_key(&self) -> CacheKey {
        self.tag.key()
    }

    fn rule_name(&self) -> Option<&Rc<str>> {
        self.tag.rule_name()
    }

    fn assign_rule_name(&self, name: &str) -> Result<(), String> {
        self.tag.assign_rule_name(name)
    }

    fn set_log(&self, debugger: Log<&'static str>) -> Result<(), String> {
        self.tag.assign_debugger(debugger)
    }

    fn expects_input(&self) -> bool {
        true
    }

    fn write_body(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", escape_literal(&self.value))
    }

    fn eat(&self, input: &Input, index: usize, _: &mut Cache) -> ParsedResult {
        let tokens = match input {
            Input::Tokens(tokens) => tokens,
            Input::Text(_) => {
                panic!("Bug! TokenLiteral terminal should not be used with text parsing.")
            }
        };

        match tokens.get(index) {
            Some(token) if token.kind == self.value => {
                #[cfg(debug_assertions)]
                self.log_success(input, index, index + 1);

                Ok(SuccessData::new(
                    index + 1,
                    ParseNode::leaf(self.rule_label(), input.clone(), index, index + 1),
                ))
            }
            _ => {
                #[cfg(debug_assertions)]
                self.log_error(input, index, &ProductionError::Unparsed);

                Err(ProductionError::Unparsed)
            }
        }
    }
}
