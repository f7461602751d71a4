use crate::expression::{terminals::escape_literal, ExpressionLogger, ExprTag, Literal};
use crate::{
    Cache, CacheKey, IExpression, Input, Log, ParseNode, ParsedResult, ProductionError,
    SuccessData,
};
use std::fmt::{Display, Formatter};
use std::rc::Rc;

impl Literal {
    /// Create a [Literal] matching the exact string `value`.
    ///
    /// An empty value matches everywhere, consuming nothing.
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

impl ExpressionLogger for Literal {
    fn get_debugger(&self) -> Option<&Log<&'static str>> {
        self.tag.get_debugger()
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.tag.rule_name() {
            Some(name) => write!(f, "{}", name),
            None => self.write_body(f),
        }
    }
}

impl IExpression for Literal {
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
        let code = match input {
            Input::Text(code) => code,
            Input::Tokens(_) => {
                panic!("Bug! Literal terminal should not be used with token parsing.")
            }
        };

        let matched = match code.text().get(index..) {
            Some(rest) => rest.starts_with(self.value.as_str()),
            None => false,
        };

        if matched {
            let consumed_ptr = index + self.value.len();

            #[cfg(debug_assertions)]
            self.log_success(input, index, consumed_ptr);

            Ok(SuccessData::new(
                consumed_ptr,
                ParseNode::leaf(self.rule_label(), input.clone(), index, consumed_ptr),
            ))
        } else {
            #[cfg(debug_assertions)]
            self.log_error(input, index, &ProductionError::Unparsed);

            Err(ProductionError::Unparsed)
        }
    }
}
