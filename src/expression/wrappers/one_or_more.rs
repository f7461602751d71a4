use crate::compile;
use crate::expression::{ExpressionLogger, ExprTag, OneOrMore};
use crate::{
    Cache, CacheKey, GrammarError, IExpression, Input, Log, ParseNode, ParsedResult,
    ProductionError, SuccessData,
};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt::{Display, Formatter};
use std::rc::Rc;

impl OneOrMore {
    /// Create a greedy repetition of the provided symbol requiring at least
    /// one match.
    pub fn new(symbol: &Rc<dyn IExpression>) -> Self {
        Self {
            symbol: RefCell::new(symbol.clone()),
            tag: ExprTag::new(),
        }
    }
}

impl ExpressionLogger for OneOrMore {
    fn get_debugger(&self) -> Option<&Log<&'static str>> {
        self.tag.get_debugger()
    }
}

impl Display for OneOrMore {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.tag.rule_name() {
            Some(name) => write!(f, "{}", name),
            None => self.write_body(f),
        }
    }
}

impl IExpression for OneOrMore {
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

    fn write_body(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({})+", self.symbol.borrow())
    }

    fn resolve_children(
        &self,
        rules: &HashMap<String, Rc<dyn IExpression>>,
        visited: &mut HashSet<CacheKey>,
    ) -> Result<(), GrammarError> {
        {
            let mut symbol = self.symbol.borrow_mut();
            let target = symbol
                .reference_target()
                .map(|name| (name.to_string(), symbol.reference_pointer()));
            if let Some((name, pointer)) = target {
                *symbol = compile::lookup_rule(rules, &name, pointer)?;
            }
        }
        let symbol = self.symbol.borrow().clone();
        compile::resolve_expression(&symbol, rules, visited)
    }

    fn eat(&self, input: &Input, index: usize, cache: &mut Cache) -> ParsedResult {
        #[cfg(debug_assertions)]
        self.log_entry();

        let symbol = self.symbol.borrow();
        let mut children = Vec::new();
        let mut cursor = index;
        loop {
            match symbol.advance(input, cursor, cache) {
                Ok(data) => {
                    // Same zero-width-progress rule as ZeroOrMore.
                    if data.consumed_index == cursor {
                        break;
                    }
                    cursor = data.consumed_index;
                    children.push(data.tree);
                }
                Err(ProductionError::Unparsed) => break,
                Err(err) => return Err(err),
            }
        }

        if children.is_empty() {
            #[cfg(debug_assertions)]
            self.log_error(input, index, &ProductionError::Unparsed);

            return Err(ProductionError::Unparsed);
        }

        #[cfg(debug_assertions)]
        self.log_success(input, index, cursor);

        Ok(SuccessData::new(
            cursor,
            ParseNode::new(self.rule_label(), input.clone(), index, cursor, children, None),
        ))
    }
}
