//! Grammar parsing tool (grammar_pt) is a library to compile a textual [Parsing
//! Expression Grammar](https://en.wikipedia.org/wiki/Parsing_expression_grammar)
//! into an executable expression graph and parse input into a concrete syntax
//! tree ([ParseNode]) using the Packrat technique.
//!
//! # Overview
//! Hand-writing a recursive descent parser for every small language, and
//! keeping it in sync with its documentation, quickly becomes a maintenance
//! burden. This library takes the opposite route: the grammar is plain text in
//! a compact PEG notation, compiled at runtime into a [Grammar] whose
//! [parse](Grammar::parse) method produces a full parse tree. Memoization of
//! intermediate results (Packrat parsing) keeps the running time linear in the
//! input length even though PEG matching backtracks freely.
//!
//! # Design
//!
//! A grammar rule is a named [expression](IExpression). Expressions are small
//! combinator objects — [Literal](expression::Literal),
//! [Pattern](expression::Pattern), [Sequence](expression::Sequence),
//! [OneOf](expression::OneOf), lookaheads and quantifiers — each implementing
//! one matching step over the input. The compiled grammar is a graph of
//! `Rc<dyn IExpression>` handles; rules may reference themselves or each other,
//! so the graph is possibly cyclic and kept immutable after construction.
//! Every match result is memoized in a per-parse [Cache] keyed by the
//! expression identity ([CacheKey]) and the input position, which both breaks
//! the recursion on cyclic rules and gives the linear time bound.
//!
//! The notation itself is parsed by a meta-grammar built from the same
//! combinators, and the resulting tree is folded into expressions by a
//! [NodeVisitor](visitor::NodeVisitor) — the same visitor framework user code
//! uses to evaluate its own parse trees.
//!
//! # Example
//!
//! ```
//! use grammar_pt::visitor::{HandlerError, NodeVisitor};
//! use grammar_pt::{Grammar, ParseNode};
//!
//! let grammar = Grammar::new(
//!     r#"
//!     sum       = number plus_term*
//!     plus_term = "+" number
//!     number    = ~"[0-9]+"
//!     "#,
//! )
//! .unwrap();
//!
//! let tree = grammar.parse("12+34+5").unwrap();
//! assert_eq!(tree.rule_name(), Some("sum"));
//!
//! struct SumVisitor;
//!
//! impl NodeVisitor for SumVisitor {
//!     type Value = i64;
//!     type Error = std::num::ParseIntError;
//!
//!     fn visit_rule(
//!         &mut self,
//!         rule: &str,
//!         node: &ParseNode,
//!         children: Vec<i64>,
//!     ) -> Result<i64, HandlerError<Self::Error>> {
//!         match rule {
//!             "number" => Ok(node.text().unwrap_or("").parse()?),
//!             _ => self.generic_visit(node, children),
//!         }
//!     }
//!
//!     fn generic_visit(
//!         &mut self,
//!         _node: &ParseNode,
//!         children: Vec<i64>,
//!     ) -> Result<i64, HandlerError<Self::Error>> {
//!         Ok(children.into_iter().sum())
//!     }
//! }
//!
//! assert_eq!(SumVisitor.visit(&tree).unwrap(), 51);
//! ```
//!
//! # License
//! [grammar_pt](crate) is provided under the MIT license.

mod bootstrap;
mod cache;
mod compile;
mod error;
pub mod examples;
pub mod expression;
mod grammar;
mod input;
mod node;
mod success_data;
mod util;
pub mod visitor;

#[cfg(test)]
mod __tests__;

use once_cell::unsync::OnceCell;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

pub use visitor::{HandlerError, NodeVisitor, RuleFragments, VisitError, VisitationError};

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
/// A unique identity per expression used to save and retrieve parsed results
/// for the Packrat parsing technique.
///
/// Two textually identical expressions are distinct identities unless the
/// grammar author shares the expression object; sharing a named rule is how a
/// grammar improves its cache hit rate.
pub struct CacheKey(usize);

#[derive(Clone)]
/// A node of the concrete syntax tree produced by a successful match.
///
/// A node with a [name](ParseNode::rule_name) was produced by the right hand
/// side of a named rule; unnamed interior nodes exist for structural
/// composition (sequences, quantifier iterations). Zero-width matches yield
/// nodes with `start == end`.
pub struct ParseNode {
    pub name: Option<Rc<str>>,
    pub input: Input,
    pub start: usize,
    pub end: usize,
    pub children: Vec<ParseNode>,
    /// Capture group spans recorded by a regex match, group 0 included.
    pub captures: Option<Vec<Option<(usize, usize)>>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// One element of a token sequence parsed by a [TokenGrammar].
pub struct Token {
    pub kind: String,
}

#[derive(Clone)]
/// The input a parse runs over: either UTF-8 text or a token sequence.
///
/// Positions are byte offsets in text mode and token indices in token mode.
pub enum Input {
    Text(Rc<Code>),
    Tokens(Rc<[Token]>),
}

/// A wrapper for the input text to be parsed, with lazily computed line
/// information for error reporting.
pub struct Code {
    value: Box<str>,
    line_breaks: OnceCell<Vec<usize>>,
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
/// The line and column information at a code point.
pub struct Position {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone)]
/// An [Ok] result value returned from an [expression](IExpression) when it
/// successfully consumes input.
pub struct SuccessData {
    pub consumed_index: usize,
    pub tree: ParseNode,
}

#[derive(Debug, Clone)]
/// An error value to indicate failure while consuming input.
///
/// When an expression fails to match, the matcher backtracks and tries the
/// next alternative; [Unparsed](ProductionError::Unparsed) failures are plain
/// values driving that backtracking, never surfaced directly. A
/// [Validation](ProductionError::Validation) error raised by a host
/// [CustomMatcher](expression::CustomMatcher) terminates the parse instead.
pub enum ProductionError {
    Unparsed,
    Validation(usize, String),
}

/// A result returned from an [expression](IExpression) match step.
pub type ParsedResult = Result<SuccessData, ProductionError>;

/// An object structure to memoize match results and track the rightmost
/// failure for the Packrat parsing technique.
///
/// A fresh cache is allocated per top-level parse call and discarded at its
/// end; results never leak between parses.
pub struct Cache {
    parsed_result_cache: HashMap<(CacheKey, usize), ParsedResult>,
    failure_pointer: usize,
    failure_expectations: Vec<String>,
}

#[derive(Debug, Clone)]
/// The rightmost failure summary carried by a [ParseError].
pub struct FailurePoint {
    /// Name of the rule the parse was started from.
    pub rule: String,
    pub pointer: usize,
    /// Line and column of `pointer`; [None] when parsing a token sequence.
    pub position: Option<Position>,
    /// Printable forms of the input-expecting expressions that failed there.
    pub expressions: Vec<String>,
    pub snippet: String,
}

#[derive(Debug, Clone)]
/// An error returned when the parser failed to consume the input.
pub enum ParseError {
    /// The start rule did not match.
    Unmatched(FailurePoint),
    /// The start rule matched but left trailing input behind.
    Incomplete(FailurePoint),
    /// A host matcher aborted the parse.
    Validation { pointer: usize, message: String },
    /// `parse`/`match_prefix` was called on a grammar without a default rule.
    NoDefaultRule,
}

#[derive(Debug)]
/// An error returned when a grammar could not be constructed from its source.
pub enum GrammarError {
    /// The grammar source itself failed to parse against the notation.
    BadGrammar(ParseError),
    /// A reference names a rule the grammar does not define. `pointer` is the
    /// reference's position in the grammar source when it came from one.
    UndefinedLabel {
        name: String,
        pointer: Option<usize>,
    },
    /// A rule is defined only through aliases leading back to itself.
    CircularAlias { name: String },
    InvalidRegex { pattern: String, message: String },
    /// Regex atoms are not available in token grammars.
    TokenModeRegex { pattern: String },
    /// Returned by [Grammar::default] for an unknown rule name.
    UnknownRule { name: String },
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
/// A enum structure to assign multiple level debugging to expressions.
pub enum Log<T> {
    None,
    Default(T),
    Success(T),
    Result(T),
    Verbose(T),
}

/// A trait implemented by every node kind of the compiled expression graph.
///
/// The variant-specific matching step is [eat](IExpression::eat); callers go
/// through [advance](IExpression::advance), which wraps every step in the
/// uniform Packrat contract: probe the [Cache] under
/// `(identity, position)`, dispatch, record the result, and feed the rightmost
/// failure tracker.
pub trait IExpression: Display {
    /// Identity under which results of this expression are memoized.
    fn cache_key(&self) -> CacheKey;

    /// The rule name when this expression is the right hand side of a named
    /// rule.
    fn rule_name(&self) -> Option<&Rc<str>>;

    /// Bind the expression to a rule name. The first binding wins.
    fn assign_rule_name(&self, name: &str) -> Result<(), String>;

    /// Set a log label to debug the expression based on the level of [Log].
    fn set_log(&self, debugger: Log<&'static str>) -> Result<(), String>;

    /// Variant-specific match step at `index`, without memoization.
    fn eat(&self, input: &Input, index: usize, cache: &mut Cache) -> ParsedResult;

    /// Write the right-hand-side form used when printing a grammar.
    fn write_body(&self, f: &mut Formatter<'_>) -> std::fmt::Result;

    /// Reports the target rule when self is an unresolved reference
    /// placeholder.
    fn reference_target(&self) -> Option<&str> {
        None
    }

    /// The grammar-source position of an unresolved reference, when known.
    fn reference_pointer(&self) -> Option<usize> {
        None
    }

    /// Whether the expression consumes concrete input. Only such expressions
    /// are recorded by the failure tracker.
    fn expects_input(&self) -> bool {
        false
    }

    /// Replace [LazyReference](expression::LazyReference) children in place.
    /// Called once per expression during grammar construction.
    fn resolve_children(
        &self,
        _rules: &HashMap<String, Rc<dyn IExpression>>,
        _visited: &mut std::collections::HashSet<CacheKey>,
    ) -> Result<(), GrammarError> {
        Ok(())
    }

    /// Cheap handle on the rule name for node construction.
    fn rule_label(&self) -> Option<Rc<str>> {
        self.rule_name().cloned()
    }

    /// Printable form recorded by the failure tracker.
    fn failure_label(&self) -> String {
        match self.rule_name() {
            Some(name) => name.to_string(),
            None => self.to_string(),
        }
    }

    /// Memoized match: probe the cache, dispatch to [eat](IExpression::eat),
    /// record the result and track failures.
    fn advance(&self, input: &Input, index: usize, cache: &mut Cache) -> ParsedResult {
        let key = self.cache_key();
        let result = match cache.find(key, index) {
            Some(result) => result.clone(),
            None => {
                // Matching recurses on the expression graph; allocate
                // additional stack as required instead of overflowing.
                let computed =
                    stacker::maybe_grow(32 * 1024, 1024 * 1024, || self.eat(input, index, cache));
                cache.insert(key, index, computed.clone());
                computed
            }
        };

        if matches!(result, Err(ProductionError::Unparsed)) && self.expects_input() {
            cache.record_failure(index, self.failure_label());
        }

        result
    }
}

#[derive(Clone, Default)]
/// A compiled grammar: an ordered rule table plus a designated default rule.
///
/// Built once from source text and immutable afterwards;
/// [default](Grammar::default) returns a re-defaulted copy sharing the same
/// expression graph.
pub struct Grammar {
    rules: HashMap<String, Rc<dyn IExpression>>,
    order: Vec<String>,
    default_rule: Option<String>,
}

#[derive(Clone)]
/// A grammar whose literal atoms match single [Token]s by kind instead of
/// characters. Regex atoms are rejected at compile time.
pub struct TokenGrammar {
    grammar: Grammar,
}
