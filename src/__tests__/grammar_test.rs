use crate::expression::{Literal, Pattern};
use crate::{Grammar, GrammarError, IExpression, ParseError};
use std::rc::Rc;

#[test]
pub fn test_empty_grammar() {
    let grammar = Grammar::new("").unwrap();
    assert_eq!(grammar.default_rule(), None);
    assert_eq!(grammar.rule_names().count(), 0);

    match grammar.parse("x") {
        Err(ParseError::NoDefaultRule) => {}
        other => panic!("Expected a missing default rule, got {:?}", other),
    }

    // Comment-only sources compile to the same empty grammar.
    let grammar = Grammar::new("# nothing here\n   # still nothing\n").unwrap();
    assert_eq!(grammar.default_rule(), None);
}

#[test]
pub fn test_comments_and_whitespace() {
    let grammar = Grammar::new(
        r#"
        # A greeting and a name.
        greeting = hello ws name   # trailing comment
        hello    = "hi" / "hello"
        ws       = ~"\s+"
        name     = ~"[a-z]+"i
        "#,
    )
    .unwrap();

    assert_eq!(grammar.default_rule(), Some("greeting"));
    grammar.parse("hello Bob").unwrap();
}

#[test]
pub fn test_round_trip_printing() {
    let source = r#"
        greeting = ("hi" / "hello") ws name
        ws = ~"\s+"
        name = ~"[a-z]+"i
    "#;
    let grammar = Grammar::new(source).unwrap();
    let printed = grammar.to_string();

    let reparsed = Grammar::new(&printed).unwrap();
    assert_eq!(
        grammar.rule_names().collect::<Vec<_>>(),
        reparsed.rule_names().collect::<Vec<_>>()
    );
    assert_eq!(grammar.default_rule(), reparsed.default_rule());
    // The printed form is a fixed point.
    assert_eq!(printed, reparsed.to_string());

    grammar.parse("hi bob").unwrap();
    reparsed.parse("hi bob").unwrap();
}

#[test]
pub fn test_round_trip_quantifiers_and_prefixes() {
    let source = r#"
        list  = item ("," item)*
        item  = !"," ~"[a-z]+" tail?
        tail  = "!"+
    "#;
    let grammar = Grammar::new(source).unwrap();
    let reparsed = Grammar::new(&grammar.to_string()).unwrap();

    for text in ["a", "a,b", "ab!,cd!!", "a,b,c"] {
        assert_eq!(
            grammar.parse(text).is_ok(),
            reparsed.parse(text).is_ok(),
            "parse disagreement on {:?}",
            text
        );
    }
    assert_eq!(grammar.to_string(), reparsed.to_string());
}

#[test]
pub fn test_default_switch() {
    let grammar = Grammar::new(
        r#"
        greeting = "hi " name
        name     = ~"[a-z]+"
        "#,
    )
    .unwrap();

    grammar.parse("name").unwrap_err();

    let names = grammar.default("name").unwrap();
    let tree = names.parse("bob").unwrap();
    assert_eq!(tree.rule_name(), Some("name"));

    // The original grammar is untouched.
    assert_eq!(grammar.default_rule(), Some("greeting"));

    match grammar.default("nope") {
        Err(GrammarError::UnknownRule { name }) => assert_eq!(name, "nope"),
        other => panic!("Expected an unknown rule, got {:?}", other.map(|g| g.to_string())),
    }
}

#[test]
pub fn test_rule_indexing() {
    let grammar = Grammar::new("a = b\nb = \"x\"").unwrap();

    assert_eq!(grammar["b"].to_string(), "b");
    assert!(grammar.get("missing").is_none());
}

#[test]
#[should_panic(expected = "No rule named")]
pub fn test_rule_indexing_panics_on_missing() {
    let grammar = Grammar::new("a = \"x\"").unwrap();
    let _ = &grammar["missing"];
}

#[test]
pub fn test_later_redefinition_wins() {
    let grammar = Grammar::new("a = \"x\"\na = \"y\"").unwrap();

    grammar.parse("y").unwrap();
    grammar.parse("x").unwrap_err();
    assert_eq!(grammar.default_rule(), Some("a"));
    assert_eq!(grammar.rule_names().count(), 1);
}

#[test]
pub fn test_alias_shares_target_expression() {
    let grammar = Grammar::new("a = b\nb = \"x\"").unwrap();

    let tree = grammar.parse("x").unwrap();
    // The alias maps to the very expression of its target, so the node
    // carries the target's name.
    assert_eq!(tree.rule_name(), Some("b"));
    assert!(Rc::ptr_eq(&grammar["a"], &grammar["b"]));
}

#[test]
pub fn test_circular_alias_is_rejected() {
    match Grammar::new("a = b\nb = a") {
        Err(GrammarError::CircularAlias { .. }) => {}
        other => panic!("Expected a circular alias, got {:?}", other.map(|g| g.to_string())),
    }
}

#[test]
pub fn test_custom_rules_satisfy_references() {
    let digits: Rc<dyn IExpression> = Rc::new(Pattern::new("[0-9]+", "").unwrap());
    let grammar = Grammar::with_rules("amount = digits \"!\"", vec![("digits", digits)]).unwrap();

    let tree = grammar.parse("42!").unwrap();
    assert_eq!(tree.children[0].rule_name(), Some("digits"));
}

#[test]
pub fn test_textual_rules_win_over_custom() {
    let shadow: Rc<dyn IExpression> = Rc::new(Literal::new("zzz"));
    let grammar = Grammar::with_rules("a = \"x\"", vec![("a", shadow)]).unwrap();

    grammar.parse("x").unwrap();
    grammar.parse("zzz").unwrap_err();
}

#[test]
pub fn test_literal_escapes() {
    let grammar = Grammar::new(r#"a = "x\ty\n""#).unwrap();
    grammar.parse("x\ty\n").unwrap();

    // A raw literal keeps its backslashes.
    let grammar = Grammar::new(r#"a = r"x\n""#).unwrap();
    grammar.parse("x\\n").unwrap();

    // Unknown escapes stay verbatim.
    let grammar = Grammar::new(r#"a = "x\q""#).unwrap();
    grammar.parse("x\\q").unwrap();

    // Single quoted literals may hold double quotes.
    let grammar = Grammar::new(r#"a = '"'"#).unwrap();
    grammar.parse("\"").unwrap();
}

#[test]
pub fn test_bad_grammar_sources() {
    match Grammar::new("a = ") {
        Err(GrammarError::BadGrammar(_)) => {}
        other => panic!("Expected a bad grammar, got {:?}", other.map(|g| g.to_string())),
    }

    match Grammar::new("a = (\"x\"") {
        Err(GrammarError::BadGrammar(_)) => {}
        other => panic!("Expected a bad grammar, got {:?}", other.map(|g| g.to_string())),
    }
}

#[test]
pub fn test_invalid_regex_is_rejected() {
    match Grammar::new(r#"a = ~"[unclosed""#) {
        Err(GrammarError::InvalidRegex { .. }) => {}
        other => panic!("Expected an invalid regex, got {:?}", other.map(|g| g.to_string())),
    }
}

#[test]
pub fn test_grammars_share_structure_across_clones() {
    let grammar = Grammar::new("a = \"x\"").unwrap();
    let clone = grammar.clone();
    assert!(Rc::ptr_eq(&grammar["a"], &clone["a"]));
}

#[test]
pub fn test_multiple_rules_on_one_line() {
    // Rules are delimited by the label-equals structure, so tight layouts
    // still compile.
    let grammar = Grammar::new("a = \"x\" b = \"y\"").unwrap();
    assert_eq!(grammar.rule_names().count(), 2);
    grammar.parse("x").unwrap();
}

#[test]
pub fn test_no_reference_survives_resolution() {
    let grammar = Grammar::new("a = b c\nb = \"x\"\nc = b?").unwrap();

    for name in ["a", "b", "c"] {
        assert!(grammar[name].reference_target().is_none());
    }
    grammar.parse("xx").unwrap();
}
