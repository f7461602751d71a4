//! The hand-built meta-grammar that parses the grammar notation itself.
//!
//! The graph is assembled from the same combinators user grammars compile to,
//! with [LazyReference]s for the forward and cyclic rule references, and is
//! resolved by the shared resolver. One instance is built per thread and
//! reused by every grammar construction.

use crate::compile::assemble;
use crate::expression::{
    LazyReference, Literal, Not, OneOf, Optional, Pattern, Sequence, ZeroOrMore,
};
use crate::{Grammar, IExpression};
use std::rc::Rc;

thread_local! {
    static META_GRAMMAR: Grammar = build_meta_grammar();
}

pub(crate) fn with_meta_grammar<R>(f: impl FnOnce(&Grammar) -> R) -> R {
    META_GRAMMAR.with(|grammar| f(grammar))
}

fn lit(value: &str) -> Rc<dyn IExpression> {
    Rc::new(Literal::new(value))
}

fn pat(pattern: &str, flags: &str) -> Rc<dyn IExpression> {
    match Pattern::new(pattern, flags) {
        Ok(pattern) => Rc::new(pattern),
        Err(err) => panic!("Bug! A meta grammar pattern failed to compile: {}", err),
    }
}

fn refer(name: &str) -> Rc<dyn IExpression> {
    Rc::new(LazyReference::new(name))
}

fn seq(symbols: Vec<Rc<dyn IExpression>>) -> Rc<dyn IExpression> {
    Rc::new(Sequence::new(symbols))
}

fn one_of(symbols: Vec<Rc<dyn IExpression>>) -> Rc<dyn IExpression> {
    Rc::new(OneOf::new(symbols))
}

fn opt(symbol: Rc<dyn IExpression>) -> Rc<dyn IExpression> {
    Rc::new(Optional::new(&symbol))
}

fn zom(symbol: Rc<dyn IExpression>) -> Rc<dyn IExpression> {
    Rc::new(ZeroOrMore::new(&symbol))
}

fn not(symbol: Rc<dyn IExpression>) -> Rc<dyn IExpression> {
    Rc::new(Not::new(&symbol))
}

fn build_meta_grammar() -> Grammar {
    // Precedence, loosest to tightest: alternation, juxtaposition, the
    // prefixes ! and &, the postfix quantifiers, atoms. Atoms try literals
    // before references so prefixed literals like u"x" are not read as the
    // reference u followed by a literal.
    let rules: Vec<(String, Rc<dyn IExpression>)> = vec![
        ("rules", seq(vec![refer("_"), zom(refer("rule"))])),
        ("rule", seq(vec![refer("label"), refer("equals"), refer("expression")])),
        ("equals", seq(vec![lit("="), refer("_")])),
        ("expression", refer("ored")),
        ("ored", seq(vec![refer("sequence"), zom(refer("or_term"))])),
        ("or_term", seq(vec![lit("/"), refer("_"), refer("sequence")])),
        ("sequence", seq(vec![refer("term"), zom(refer("term"))])),
        (
            "term",
            one_of(vec![
                refer("not_term"),
                refer("lookahead_term"),
                refer("quantified"),
            ]),
        ),
        ("not_term", seq(vec![lit("!"), refer("term"), refer("_")])),
        ("lookahead_term", seq(vec![lit("&"), refer("term"), refer("_")])),
        ("quantified", seq(vec![refer("atom"), opt(refer("quantifier"))])),
        ("quantifier", seq(vec![pat("[*+?]", ""), refer("_")])),
        (
            "atom",
            one_of(vec![
                refer("literal"),
                refer("regex"),
                refer("reference"),
                refer("parenthesized"),
            ]),
        ),
        (
            "parenthesized",
            seq(vec![lit("("), refer("_"), refer("expression"), lit(")"), refer("_")]),
        ),
        (
            "regex",
            seq(vec![lit("~"), refer("spaceless_literal"), refer("flags"), refer("_")]),
        ),
        ("flags", pat("[ilmsux]*", "i")),
        ("literal", seq(vec![refer("spaceless_literal"), refer("_")])),
        (
            "spaceless_literal",
            one_of(vec![
                pat(r#"u?r?b?"[^"\\]*(?:\\.[^"\\]*)*""#, "is"),
                pat(r#"u?r?b?'[^'\\]*(?:\\.[^'\\]*)*'"#, "is"),
            ]),
        ),
        ("reference", seq(vec![refer("label"), not(refer("equals"))])),
        ("label", seq(vec![pat("[a-zA-Z_][a-zA-Z_0-9]*", ""), refer("_")])),
        ("_", pat(r"\s*(?:#[^\r\n]*\s*)*", "")),
    ]
    .into_iter()
    .map(|(name, expr)| (name.to_string(), expr))
    .collect();

    match assemble(rules, Vec::new()) {
        Ok(grammar) => grammar,
        Err(err) => panic!("Bug! The meta grammar failed to assemble: {}", err),
    }
}
