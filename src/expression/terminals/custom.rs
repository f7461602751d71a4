use crate::expression::{CustomMatcher, ExpressionLogger, ExprTag};
use crate::{
    Cache, CacheKey, IExpression, Input, Log, ParseNode, ParsedResult, ProductionError,
    SuccessData,
};
use std::fmt::{Display, Formatter};
use std::rc::Rc;

impl CustomMatcher {
    /// Wrap a host matcher under the built-in matching contract.
    ///
    /// ### Arguments
    /// * `identifier` - Name used when the grammar is printed or the matcher
    ///   shows up in an error.
    /// * `matcher` - Returns the consumed end position, [None] on mismatch,
    ///   or a [Validation](ProductionError::Validation) error to abort.
    pub fn new<TF: Fn(&Input, usize) -> Result<Option<usize>, ProductionError> + 'static>(
        identifier: &str,
        matcher: TF,
    ) -> Self {
        Self {
            identifier: identifier.to_string(),
            matcher: Box::new(matcher),
            tag: ExprTag::new(),
        }
    }
}

impl ExpressionLogger for CustomMatcher {
    fn get_debugger(&self) -> Option<&Log<&'static str>> {
        self.tag.get_debugger()
    }
}

impl Display for CustomMatcher {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.tag.rule_name() {
            Some(name) => write!(f, "{}", name),
            None => self.write_body(f),
        }
    }
}

impl IExpression for CustomMatcher {
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
        write!(f, "{}", self.identifier)
    }

    fn eat(&self, input: &Input, index: usize, _: &mut Cache) -> ParsedResult {
        match (self.matcher)(input, index)? {
            Some(consumed_ptr) => {
                debug_assert!(
                    consumed_ptr >= index,
                    "A matcher must not consume backwards."
                );

                #[cfg(debug_assertions)]
                self.log_success(input, index, consumed_ptr);

                Ok(SuccessData::new(
                    consumed_ptr,
                    ParseNode::leaf(self.rule_label(), input.clone(), index, consumed_ptr),
                ))
            }
            None => {
                #[cfg(debug_assertions)]
                self.log_error(input, index, &ProductionError::Unparsed);

                Err(ProductionError::Unparsed)
            }
        }
    }
}
