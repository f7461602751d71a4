//! The rule compiler: folds the meta-grammar's parse tree into an expression
//! graph, merges host-supplied rules, resolves references and picks the
//! default rule.

use crate::expression::{
    Lookahead, Literal, Not, OneOf, OneOrMore, Optional, Pattern, Sequence, TokenLiteral,
    ZeroOrMore,
};
use crate::expression::LazyReference;
use crate::visitor::{HandlerError, NodeVisitor, VisitError};
use crate::{bootstrap, CacheKey, Grammar, GrammarError, IExpression, ParseNode};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

#[derive(Debug, Clone, Copy)]
pub(crate) enum GrammarKind {
    Text,
    Tokens,
}

/// Compile grammar source into a resolved [Grammar].
pub(crate) fn compile(
    source: &str,
    custom_rules: Vec<(String, Rc<dyn IExpression>)>,
    kind: GrammarKind,
) -> Result<Grammar, GrammarError> {
    let tree = bootstrap::with_meta_grammar(|meta| meta.parse(source))
        .map_err(GrammarError::BadGrammar)?;

    let mut visitor = RuleVisitor { kind };
    let compiled = match visitor.visit(&tree) {
        Ok(compiled) => compiled,
        Err(VisitError::Unwrapped(err)) => return Err(err),
        Err(VisitError::Visitation(err)) => return Err(err.source),
        Err(VisitError::NoHandler { rule, .. }) => {
            panic!("Bug! No compile handler for the meta rule '{}'.", rule)
        }
        Err(VisitError::Parse(_)) | Err(VisitError::MissingGrammar) => {
            panic!("Bug! The rule compiler visits a ready-made tree.")
        }
    };

    let mut rule_list = Vec::new();
    collect_rules(compiled, &mut rule_list);
    assemble(rule_list, custom_rules)
}

/// Build the rule table out of `(name, expression)` pairs: later textual
/// redefinitions win, custom rules fill the remaining names, the first textual
/// rule becomes the default, and all references are resolved in place.
pub(crate) fn assemble(
    rule_list: Vec<(String, Rc<dyn IExpression>)>,
    custom_rules: Vec<(String, Rc<dyn IExpression>)>,
) -> Result<Grammar, GrammarError> {
    let mut rules: HashMap<String, Rc<dyn IExpression>> = HashMap::new();
    let mut order: Vec<String> = Vec::new();
    for (name, expr) in rule_list {
        if expr.reference_target().is_none() {
            let _ = expr.assign_rule_name(&name);
        }
        if !order.contains(&name) {
            order.push(name.clone());
        }
        rules.insert(name, expr);
    }
    let default_rule = order.first().cloned();

    let mut extra = custom_rules;
    extra.sort_by(|a, b| a.0.cmp(&b.0));
    for (name, expr) in extra {
        if !rules.contains_key(&name) {
            if expr.reference_target().is_none() {
                let _ = expr.assign_rule_name(&name);
            }
            order.push(name.clone());
            rules.insert(name, expr);
        }
    }

    resolve_rules(&mut rules)?;
    Ok(Grammar {
        rules,
        order,
        default_rule,
    })
}

/// Resolve every [LazyReference] reachable from the rule table.
pub(crate) fn resolve_rules(
    rules: &mut HashMap<String, Rc<dyn IExpression>>,
) -> Result<(), GrammarError> {
    // Collapse alias rules (a whole right hand side that is a reference)
    // first, so the graph pass below only ever substitutes resolved targets.
    let alias_names: Vec<String> = rules
        .iter()
        .filter(|(_, expr)| expr.reference_target().is_some())
        .map(|(name, _)| name.clone())
        .collect();
    for name in alias_names {
        let mut seen = vec![name.clone()];
        loop {
            let reference = rules.get(&name).and_then(|expr| {
                expr.reference_target()
                    .map(|target| (target.to_string(), expr.reference_pointer()))
            });
            let (target, pointer) = match reference {
                Some(reference) => reference,
                None => break,
            };
            if seen.contains(&target) {
                return Err(GrammarError::CircularAlias { name });
            }
            let replacement = lookup_rule(rules, &target, pointer)?;
            seen.push(target);
            rules.insert(name.clone(), replacement);
        }
    }

    let mut visited: HashSet<CacheKey> = HashSet::new();
    let roots: Vec<Rc<dyn IExpression>> = rules.values().cloned().collect();
    for expr in roots {
        resolve_expression(&expr, rules, &mut visited)?;
    }
    Ok(())
}

/// Rewrite the references below `expr` at most once per expression, so the
/// pass terminates even when substitution makes the graph cyclic.
pub(crate) fn resolve_expression(
    expr: &Rc<dyn IExpression>,
    rules: &HashMap<String, Rc<dyn IExpression>>,
    visited: &mut HashSet<CacheKey>,
) -> Result<(), GrammarError> {
    if !visited.insert(expr.cache_key()) {
        return Ok(());
    }
    expr.resolve_children(rules, visited)
}

pub(crate) fn lookup_rule(
    rules: &HashMap<String, Rc<dyn IExpression>>,
    name: &str,
    pointer: Option<usize>,
) -> Result<Rc<dyn IExpression>, GrammarError> {
    match rules.get(name) {
        Some(expr) => Ok(expr.clone()),
        None => Err(GrammarError::UndefinedLabel {
            name: name.to_string(),
            pointer,
        }),
    }
}

/// Strip quotes and prefixes from a literal as written in grammar source and
/// process its escapes. A raw prefix (`r`) keeps the body verbatim; unknown
/// escapes stay verbatim either way so regex atoms survive literal
/// processing.
pub(crate) fn unescape_literal(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    let mut start = 0;
    let mut raw_mode = false;
    while start < chars.len() && chars[start] != '"' && chars[start] != '\'' {
        if chars[start] == 'r' || chars[start] == 'R' {
            raw_mode = true;
        }
        start += 1;
    }
    if chars.len() < start + 2 {
        return String::new();
    }
    let body = &chars[start + 1..chars.len() - 1];

    if raw_mode {
        return body.iter().collect();
    }

    let mut out = String::with_capacity(body.len());
    let mut i = 0;
    while i < body.len() {
        let c = body[i];
        if c != '\\' {
            out.push(c);
            i += 1;
            continue;
        }
        match body.get(i + 1) {
            None => {
                out.push('\\');
                i += 1;
            }
            Some('n') => {
                out.push('\n');
                i += 2;
            }
            Some('r') => {
                out.push('\r');
                i += 2;
            }
            Some('t') => {
                out.push('\t');
                i += 2;
            }
            Some('0') => {
                out.push('\0');
                i += 2;
            }
            Some('\'') => {
                out.push('\'');
                i += 2;
            }
            Some('"') => {
                out.push('"');
                i += 2;
            }
            Some('\\') => {
                out.push('\\');
                i += 2;
            }
            Some('x') => {
                let digits: String = body.iter().skip(i + 2).take(2).collect();
                let byte = (digits.len() == 2)
                    .then(|| u8::from_str_radix(&digits, 16).ok())
                    .flatten();
                match byte {
                    Some(byte) => {
                        out.push(byte as char);
                        i += 4;
                    }
                    None => {
                        out.push('\\');
                        out.push('x');
                        i += 2;
                    }
                }
            }
            Some('u') => {
                let digits: String = body.iter().skip(i + 2).take(4).collect();
                let scalar = (digits.len() == 4)
                    .then(|| u32::from_str_radix(&digits, 16).ok())
                    .flatten()
                    .and_then(char::from_u32);
                match scalar {
                    Some(c) => {
                        out.push(c);
                        i += 6;
                    }
                    None => {
                        out.push('\\');
                        out.push('u');
                        i += 2;
                    }
                }
            }
            Some(other) => {
                out.push('\\');
                out.push(*other);
                i += 2;
            }
        }
    }
    out
}

/// Intermediate values produced while folding the meta parse tree.
enum Compiled {
    Rules(Vec<(String, Rc<dyn IExpression>)>),
    Rule(String, Rc<dyn IExpression>),
    Expr(Rc<dyn IExpression>),
    Text(String),
    List(Vec<Compiled>),
    Empty,
}

fn first_text(value: &Compiled) -> Option<&str> {
    match value {
        Compiled::Text(text) => Some(text),
        Compiled::List(items) => items.iter().find_map(first_text),
        _ => None,
    }
}

fn find_expr(value: &Compiled) -> Option<Rc<dyn IExpression>> {
    match value {
        Compiled::Expr(expr) => Some(expr.clone()),
        Compiled::List(items) => items.iter().find_map(find_expr),
        _ => None,
    }
}

fn expect_expr(value: &Compiled) -> Rc<dyn IExpression> {
    match find_expr(value) {
        Some(expr) => expr,
        None => panic!("Bug! The meta grammar produced no expression where one was expected."),
    }
}

fn expect_text(value: &Compiled) -> String {
    match first_text(value) {
        Some(text) => text.to_string(),
        None => panic!("Bug! The meta grammar produced no text where some was expected."),
    }
}

fn collect_exprs(value: Compiled, out: &mut Vec<Rc<dyn IExpression>>) {
    match value {
        Compiled::Expr(expr) => out.push(expr),
        Compiled::List(items) => {
            for item in items {
                collect_exprs(item, out);
            }
        }
        _ => {}
    }
}

fn collect_rules(value: Compiled, out: &mut Vec<(String, Rc<dyn IExpression>)>) {
    match value {
        Compiled::Rule(name, expr) => out.push((name, expr)),
        Compiled::Rules(list) => out.extend(list),
        Compiled::List(items) => {
            for item in items {
                collect_rules(item, out);
            }
        }
        _ => {}
    }
}

/// A [NodeVisitor] over the meta parse tree turning notation into
/// expressions. Textual rule references become [LazyReference]s; resolution
/// happens in [assemble].
struct RuleVisitor {
    kind: GrammarKind,
}

impl NodeVisitor for RuleVisitor {
    type Value = Compiled;
    type Error = GrammarError;

    fn unwrapped(&self, _: &GrammarError) -> bool {
        true
    }

    fn visit_rule(
        &mut self,
        rule: &str,
        node: &ParseNode,
        children: Vec<Compiled>,
    ) -> Result<Compiled, HandlerError<GrammarError>> {
        match rule {
            "rules" => {
                let mut list = Vec::new();
                for child in children {
                    collect_rules(child, &mut list);
                }
                Ok(Compiled::Rules(list))
            }
            "rule" => {
                let name = expect_text(&children[0]);
                let expr = expect_expr(&Compiled::List(children));
                if expr.reference_target().is_none() {
                    let _ = expr.assign_rule_name(&name);
                }
                Ok(Compiled::Rule(name, expr))
            }
            "ored" | "sequence" => {
                let mut exprs = Vec::new();
                for child in children {
                    collect_exprs(child, &mut exprs);
                }
                let expr = match exprs.len() {
                    0 => panic!("Bug! A '{}' node without sub-expressions.", rule),
                    1 => exprs.remove(0),
                    _ if rule == "ored" => Rc::new(OneOf::new(exprs)) as Rc<dyn IExpression>,
                    _ => Rc::new(Sequence::new(exprs)) as Rc<dyn IExpression>,
                };
                Ok(Compiled::Expr(expr))
            }
            "or_term" | "parenthesized" | "term" | "atom" => {
                Ok(Compiled::Expr(expect_expr(&Compiled::List(children))))
            }
            "not_term" => {
                let symbol = expect_expr(&Compiled::List(children));
                Ok(Compiled::Expr(Rc::new(Not::new(&symbol))))
            }
            "lookahead_term" => {
                let symbol = expect_expr(&Compiled::List(children));
                Ok(Compiled::Expr(Rc::new(Lookahead::new(&symbol))))
            }
            "quantified" => {
                let atom = expect_expr(&children[0]);
                let quantifier = children
                    .get(1)
                    .and_then(|child| first_text(child))
                    .unwrap_or("")
                    .to_string();
                let expr: Rc<dyn IExpression> = match quantifier.as_str() {
                    "?" => Rc::new(Optional::new(&atom)),
                    "*" => Rc::new(ZeroOrMore::new(&atom)),
                    "+" => Rc::new(OneOrMore::new(&atom)),
                    _ => atom,
                };
                Ok(Compiled::Expr(expr))
            }
            "quantifier" => Ok(Compiled::Text(expect_text(&Compiled::List(children)))),
            "literal" => {
                let raw = expect_text(&children[0]);
                let value = unescape_literal(&raw);
                let expr: Rc<dyn IExpression> = match self.kind {
                    GrammarKind::Text => Rc::new(Literal::new(&value)),
                    GrammarKind::Tokens => Rc::new(TokenLiteral::new(&value)),
                };
                Ok(Compiled::Expr(expr))
            }
            "spaceless_literal" => Ok(Compiled::Text(expect_text(&Compiled::List(children)))),
            "regex" => {
                let raw = expect_text(&children[1]);
                let pattern = unescape_literal(&raw);
                if matches!(self.kind, GrammarKind::Tokens) {
                    return Err(HandlerError::Raised(GrammarError::TokenModeRegex {
                        pattern,
                    }));
                }
                let flags = children
                    .get(2)
                    .and_then(|child| first_text(child))
                    .unwrap_or("")
                    .to_string();
                let expr = Pattern::new(&pattern, &flags)?;
                Ok(Compiled::Expr(Rc::new(expr)))
            }
            "flags" => Ok(Compiled::Text(
                node.text().unwrap_or("").to_lowercase(),
            )),
            "reference" => {
                let name = expect_text(&children[0]);
                Ok(Compiled::Expr(Rc::new(LazyReference::at(&name, node.start))))
            }
            "label" => Ok(Compiled::Text(expect_text(&Compiled::List(children)))),
            "equals" | "_" => Ok(Compiled::Empty),
            _ => self.generic_visit(node, children),
        }
    }

    fn generic_visit(
        &mut self,
        node: &ParseNode,
        mut children: Vec<Compiled>,
    ) -> Result<Compiled, HandlerError<GrammarError>> {
        Ok(match children.len() {
            0 => {
                if node.start == node.end {
                    Compiled::Empty
                } else {
                    Compiled::Text(node.text().unwrap_or("").to_string())
                }
            }
            1 => children.remove(0),
            _ => Compiled::List(children),
        })
    }
}
