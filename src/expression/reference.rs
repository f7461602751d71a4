use crate::expression::{ExprTag, LazyReference};
use crate::{Cache, CacheKey, IExpression, Input, Log, ParsedResult};
use std::fmt::{Display, Formatter};
use std::rc::Rc;

impl LazyReference {
    /// Create a placeholder reference to the rule named `target`.
    pub fn new(target: &str) -> Self {
        Self {
            target: target.to_string(),
            pointer: None,
            tag: ExprTag::new(),
        }
    }

    /// Create a placeholder carrying the reference's position in the grammar
    /// source, for error reporting.
    pub fn at(target: &str, pointer: usize) -> Self {
        Self {
            target: target.to_string(),
            pointer: Some(pointer),
            tag: ExprTag::new(),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

impl Display for LazyReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.target)
    }
}

impl IExpression for LazyReference {
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

    fn reference_target(&self) -> Option<&str> {
        Some(&self.target)
    }

    fn reference_pointer(&self) -> Option<usize> {
        self.pointer
    }

    fn write_body(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.target)
    }

    fn eat(&self, _: &Input, _: usize, _: &mut Cache) -> ParsedResult {
        panic!(
            "Bug! Unresolved reference '{}' reached while matching.",
            self.target
        )
    }
}
