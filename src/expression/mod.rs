//! A module consisting of the expression kinds a compiled grammar graph is
//! made of.
//!
//! Each expression represents one matching step. Terminal expressions like
//! [Literal], [Pattern] and [TokenLiteral] consume concrete input, whereas
//! [Sequence] and [OneOf] combine sub-expressions, and the wrapper utilities
//! [Lookahead], [Not], [Optional], [ZeroOrMore] and [OneOrMore] change how a
//! single sub-expression is applied. A [LazyReference] stands in for a rule
//! name until the whole grammar is known; none survives grammar construction.
//! A [CustomMatcher] lets the host supply a matcher with the same contract as
//! the built-ins.
//!
//! All expressions are held behind `Rc<dyn IExpression>` handles; the handle
//! identity doubles as the memoization key, so sharing one expression object
//! between rules shares its cache entries.

mod builder;
mod non_terminals;
mod reference;
mod terminals;
mod wrappers;

#[cfg(test)]
mod __tests__;

pub use builder::ExpressionBuilder;

use crate::{CacheKey, IExpression, Input, Log, ParsedResult, ProductionError};
use once_cell::unsync::OnceCell;
use regex::Regex;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

impl CacheKey {
    pub(crate) fn generate() -> Self {
        static NEXT: AtomicUsize = AtomicUsize::new(0);
        CacheKey(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Bookkeeping shared by every expression kind: the memoization identity, the
/// optional rule name bound at grammar construction, and the debug logger.
#[derive(Debug)]
pub(crate) struct ExprTag {
    key: CacheKey,
    rule_name: OnceCell<Rc<str>>,
    debugger: OnceCell<Log<&'static str>>,
}

impl ExprTag {
    pub(crate) fn new() -> Self {
        Self {
            key: CacheKey::generate(),
            rule_name: OnceCell::new(),
            debugger: OnceCell::new(),
        }
    }

    pub(crate) fn key(&self) -> CacheKey {
        self.key
    }

    pub(crate) fn rule_name(&self) -> Option<&Rc<str>> {
        self.rule_name.get()
    }

    pub(crate) fn assign_rule_name(&self, name: &str) -> Result<(), String> {
        self.rule_name
            .set(Rc::from(name))
            .map_err(|existing| format!("Rule name {} is already set for this expression.", existing))
    }

    pub(crate) fn assign_debugger(&self, debugger: Log<&'static str>) -> Result<(), String> {
        self.debugger
            .set(debugger)
            .map_err(|err| format!("Debugger {} is already set for this expression.", err))
    }

    pub(crate) fn get_debugger(&self) -> Option<&Log<&'static str>> {
        self.debugger.get()
    }
}

/// A terminal expression which matches an exact string value with the input.
pub struct Literal {
    value: String,
    tag: ExprTag,
}

/// A terminal expression which matches an anchored regex at the cursor and
/// retains the capture groups of the match.
#[derive(Debug)]
pub struct Pattern {
    pattern: String,
    flags: String,
    regexp: Regex,
    tag: ExprTag,
}

/// A terminal expression for [token grammars](crate::TokenGrammar) which
/// matches a single [Token](crate::Token) whose kind equals the literal.
pub struct TokenLiteral {
    value: String,
    tag: ExprTag,
}

/// The signature of a host-supplied matcher: return the consumed end position
/// on success, [None] on a plain mismatch, or a
/// [Validation](ProductionError::Validation) error to abort the parse.
pub type MatcherFn = dyn Fn(&Input, usize) -> Result<Option<usize>, ProductionError>;

/// A host-supplied matcher with the same matching contract as the built-in
/// expressions.
pub struct CustomMatcher {
    identifier: String,
    matcher: Box<MatcherFn>,
    tag: ExprTag,
}

/// A non-terminal expression which matches every symbol in order,
/// concatenating the consumed spans.
pub struct Sequence {
    symbols: RefCell<Vec<Rc<dyn IExpression>>>,
    tag: ExprTag,
}

/// A non-terminal expression implementing prioritized choice: symbols are
/// tried in order and the first success wins, even when a later alternative
/// would have consumed more input.
pub struct OneOf {
    symbols: RefCell<Vec<Rc<dyn IExpression>>>,
    tag: ExprTag,
}

/// A wrapper which succeeds when its symbol matches at the cursor, without
/// consuming any input.
pub struct Lookahead {
    symbol: RefCell<Rc<dyn IExpression>>,
    tag: ExprTag,
}

/// A wrapper which succeeds when its symbol fails at the cursor, without
/// consuming any input.
pub struct Not {
    symbol: RefCell<Rc<dyn IExpression>>,
    tag: ExprTag,
}

/// A wrapper which always succeeds, consuming its symbol's match if any and
/// zero input otherwise.
pub struct Optional {
    symbol: RefCell<Rc<dyn IExpression>>,
    tag: ExprTag,
}

/// A wrapper which greedily matches its symbol any number of times. A
/// zero-width iteration stops the loop so the match always terminates.
pub struct ZeroOrMore {
    symbol: RefCell<Rc<dyn IExpression>>,
    tag: ExprTag,
}

/// A wrapper which greedily matches its symbol one or more times; fails when
/// the first iteration fails.
pub struct OneOrMore {
    symbol: RefCell<Rc<dyn IExpression>>,
    tag: ExprTag,
}

/// A placeholder standing in for a rule name until the whole grammar is known.
/// Resolution replaces every reachable reference; matching one is a bug.
pub struct LazyReference {
    target: String,
    pointer: Option<usize>,
    tag: ExprTag,
}

pub(crate) trait ExpressionLogger {
    fn get_debugger(&self) -> Option<&Log<&'static str>>;

    fn log_entry(&self) {
        if let Some(label) = self.get_debugger() {
            if label.order() >= Log::Verbose(()).order() {
                println!("Entering '{}'", label)
            }
        }
    }

    fn log_success(&self, input: &Input, start: usize, end: usize) {
        if let Some(label) = self.get_debugger() {
            if label.order() >= Log::Success(()).order() {
                println!(
                    "Parsing success for '{}': from {} to {}.",
                    label,
                    input.locate(start),
                    input.locate(end),
                )
            }
        }
    }

    fn log_error(&self, input: &Input, index: usize, err: &ProductionError) {
        if let Some(label) = self.get_debugger() {
            if label.order() >= Log::Result(()).order() {
                match err {
                    ProductionError::Unparsed => {
                        println!("Unparsed expression '{}': at {}.", label, input.locate(index))
                    }
                    ProductionError::Validation(pointer, message) => {
                        println!(
                            "Validation error '{}': at {}. {}",
                            label,
                            input.locate(*pointer),
                            message
                        )
                    }
                }
            }
        }
    }

    fn log_result(&self, input: &Input, index: usize, result: &ParsedResult) {
        match result {
            Ok(data) => self.log_success(input, index, data.consumed_index),
            Err(err) => self.log_error(input, index, err),
        }
    }
}
