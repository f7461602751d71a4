//! A bottom-up dispatch framework folding a [ParseNode] tree into an
//! arbitrary host value.
//!
//! A visitor implements [NodeVisitor] with one [visit_rule](NodeVisitor::visit_rule)
//! method dispatching on the rule name; nodes without a dedicated arm fall
//! back to [generic_visit](NodeVisitor::generic_visit). Handler errors are
//! wrapped into a [VisitationError] carrying the offending node and a printed
//! parse tree, unless the visitor opts the error kind out through
//! [unwrapped](NodeVisitor::unwrapped).

use crate::{node, Grammar, ParseError, ParseNode};
use std::fmt::{Debug, Display, Formatter};

#[derive(Debug)]
/// An error value returned from a visitor handler.
pub enum HandlerError<E> {
    /// No handler exists for the visited node.
    Unhandled,
    /// The handler raised its own error.
    Raised(E),
}

impl<E> From<E> for HandlerError<E> {
    fn from(error: E) -> Self {
        HandlerError::Raised(error)
    }
}

#[derive(Debug)]
/// A handler error wrapped with the node it was raised on and a printable
/// form of the full parse tree with that node marked.
pub struct VisitationError<E> {
    pub source: E,
    pub node: ParseNode,
    pub tree: String,
}

#[derive(Debug)]
/// An error returned from [NodeVisitor::visit] and the bundled
/// [parse](NodeVisitor::parse)/[match_prefix](NodeVisitor::match_prefix)
/// conveniences.
pub enum VisitError<E> {
    /// The bundled parse failed before visiting started.
    Parse(ParseError),
    /// The visitor carries no [grammar](NodeVisitor::grammar).
    MissingGrammar,
    /// Neither a named handler nor a generic fallback accepted the node.
    NoHandler { rule: String, start: usize },
    /// A handler error whose kind the visitor declared as unwrapped.
    Unwrapped(E),
    Visitation(VisitationError<E>),
}

impl<E: Debug> Display for VisitationError<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{:?} raised while visiting node '{}' spanning {}-{}.",
            self.source,
            self.node.rule_name().unwrap_or("<anonymous>"),
            self.node.start,
            self.node.end
        )?;
        writeln!(f, "Parse tree:")?;
        write!(f, "{}", self.tree)
    }
}

impl<E: Debug> Display for VisitError<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            VisitError::Parse(err) => write!(f, "{}", err),
            VisitError::MissingGrammar => {
                write!(f, "The visitor carries no grammar to parse with.")
            }
            VisitError::NoHandler { rule, start } => {
                write!(
                    f,
                    "No visitor handler accepted the node '{}' at {}.",
                    rule, start
                )
            }
            VisitError::Unwrapped(err) => write!(f, "{:?}", err),
            VisitError::Visitation(err) => write!(f, "{}", err),
        }
    }
}

impl<E: Debug> std::error::Error for VisitError<E> {}

/// A post-order fold over a parse tree into a host value.
pub trait NodeVisitor {
    type Value;
    type Error;

    /// The grammar backing [parse](NodeVisitor::parse) and
    /// [match_prefix](NodeVisitor::match_prefix).
    fn grammar(&self) -> Option<&Grammar> {
        None
    }

    /// Whether `error` should propagate raw instead of being wrapped into a
    /// [VisitationError].
    fn unwrapped(&self, _error: &Self::Error) -> bool {
        false
    }

    /// Handle one node. `rule` is the node's rule name, `""` for anonymous
    /// nodes; `children` holds the already-visited child values in order.
    fn visit_rule(
        &mut self,
        rule: &str,
        node: &ParseNode,
        children: Vec<Self::Value>,
    ) -> Result<Self::Value, HandlerError<Self::Error>> {
        let _ = rule;
        self.generic_visit(node, children)
    }

    /// Fallback invoked when no named handler exists.
    fn generic_visit(
        &mut self,
        _node: &ParseNode,
        _children: Vec<Self::Value>,
    ) -> Result<Self::Value, HandlerError<Self::Error>> {
        Err(HandlerError::Unhandled)
    }

    /// Fold the tree depth-first, children before parents.
    fn visit(&mut self, tree: &ParseNode) -> Result<Self::Value, VisitError<Self::Error>>
    where
        Self: Sized,
    {
        drive(self, tree, tree)
    }

    /// Parse `text` with [grammar](NodeVisitor::grammar) and visit the tree.
    fn parse(&mut self, text: &str) -> Result<Self::Value, VisitError<Self::Error>>
    where
        Self: Sized,
    {
        let grammar = match self.grammar() {
            Some(grammar) => grammar.clone(),
            None => return Err(VisitError::MissingGrammar),
        };
        let tree = grammar.parse(text).map_err(VisitError::Parse)?;
        self.visit(&tree)
    }

    /// Prefix-match `text` with [grammar](NodeVisitor::grammar) and visit the
    /// tree.
    fn match_prefix(&mut self, text: &str) -> Result<Self::Value, VisitError<Self::Error>>
    where
        Self: Sized,
    {
        let grammar = match self.grammar() {
            Some(grammar) => grammar.clone(),
            None => return Err(VisitError::MissingGrammar),
        };
        let tree = grammar.match_prefix(text).map_err(VisitError::Parse)?;
        self.visit(&tree)
    }
}

fn drive<T: NodeVisitor>(
    visitor: &mut T,
    root: &ParseNode,
    node: &ParseNode,
) -> Result<T::Value, VisitError<T::Error>> {
    // Tree depth follows the matcher's recursion depth; grow the stack the
    // same way.
    stacker::maybe_grow(32 * 1024, 1024 * 1024, || {
        let mut children = Vec::with_capacity(node.children.len());
        for child in &node.children {
            children.push(drive(visitor, root, child)?);
        }

        match visitor.visit_rule(node.rule_name().unwrap_or(""), node, children) {
            Ok(value) => Ok(value),
            Err(HandlerError::Unhandled) => Err(VisitError::NoHandler {
                rule: node.rule_name().unwrap_or("").to_string(),
                start: node.start,
            }),
            Err(HandlerError::Raised(error)) => {
                if visitor.unwrapped(&error) {
                    Err(VisitError::Unwrapped(error))
                } else {
                    Err(VisitError::Visitation(VisitationError {
                        source: error,
                        node: node.clone(),
                        tree: node::write_marked(root, node),
                    }))
                }
            }
        }
    })
}

#[derive(Default)]
/// A collector attaching grammar-rule source fragments to visitor handlers.
///
/// Fragments are assembled, in insertion order, into one grammar whose default
/// start is the first fragment's rule. Sugar over [Grammar::new].
pub struct RuleFragments {
    fragments: Vec<(String, String)>,
}

impl RuleFragments {
    pub fn new() -> Self {
        Self {
            fragments: Vec::new(),
        }
    }

    /// Attach the right-hand-side `body` for the rule `name`.
    pub fn rule(mut self, name: &str, body: &str) -> Self {
        self.fragments.push((name.to_string(), body.to_string()));
        self
    }

    /// Assemble the collected fragments into a [Grammar].
    pub fn grammar(&self) -> Result<Grammar, crate::GrammarError> {
        let mut source = String::new();
        for (name, body) in &self.fragments {
            source.push_str(name);
            source.push_str(" = ");
            source.push_str(body);
            source.push('\n');
        }
        Grammar::new(&source)
    }
}
