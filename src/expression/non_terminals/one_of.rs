use crate::compile;
use crate::expression::{ExpressionLogger, ExprTag, OneOf};
use crate::{
    Cache, CacheKey, GrammarError, IExpression, Input, Log, ParseNode, ParsedResult,
    ProductionError, SuccessData,
};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt::{Display, Formatter};
use std::rc::Rc;

impl OneOf {
    /// Create an alternation of the provided symbols. The first symbol to
    /// match wins; later alternatives are never retried once one succeeded.
    pub fn new(symbols: Vec<Rc<dyn IExpression>>) -> Self {
        Self {
            symbols: RefCell::new(symbols),
            tag: ExprTag::new(),
        }
    }
}

impl ExpressionLogger for OneOf {
    fn get_debugger(&self) -> Option<&Log<&'static str>> {
        self.tag.get_debugger()
    }
}

impl Display for OneOf {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.tag.rule_name() {
            Some(name) => write!(f, "{}", name),
            None => {
                write!(f, "(")?;
                self.write_body(f)?;
                write!(f, ")")
            }
        }
    }
}

impl IExpression for OneOf {
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
        let symbols = self.symbols.borrow();
        for (index, symbol) in symbols.iter().enumerate() {
            if index > 0 {
                write!(f, " / ")?;
            }
            write!(f, "{}", symbol)?;
        }
        Ok(())
    }

    fn resolve_children(
        &self,
        rules: &HashMap<String, Rc<dyn IExpression>>,
        visited: &mut HashSet<CacheKey>,
    ) -> Result<(), GrammarError> {
        {
            let mut symbols = self.symbols.borrow_mut();
            for slot in symbols.iter_mut() {
                let target = slot
                    .reference_target()
                    .map(|name| (name.to_string(), slot.reference_pointer()));
                if let Some((name, pointer)) = target {
                    *slot = compile::lookup_rule(rules, &name, pointer)?;
                }
            }
        }
        for symbol in self.symbols.borrow().iter() {
            compile::resolve_expression(symbol, rules, visited)?;
        }
        Ok(())
    }

    fn eat(&self, input: &Input, index: usize, cache: &mut Cache) -> ParsedResult {
        #[cfg(debug_assertions)]
        self.log_entry();

        let symbols = self.symbols.borrow();
        for symbol in symbols.iter() {
            match symbol.advance(input, index, cache) {
                Ok(data) => {
                    #[cfg(debug_assertions)]
                    self.log_success(input, index, data.consumed_index);

                    return Ok(SuccessData::new(
                        data.consumed_index,
                        ParseNode::new(
                            self.rule_label(),
                            input.clone(),
                            index,
                            data.consumed_index,
                            vec![data.tree],
                            None,
                        ),
                    ));
                }
                Err(ProductionError::Unparsed) => continue,
                Err(err) => return Err(err),
            }
        }

        #[cfg(debug_assertions)]
        self.log_error(input, index, &ProductionError::Unparsed);

        Err(ProductionError::Unparsed)
    }
}
