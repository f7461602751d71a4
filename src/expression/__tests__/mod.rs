use crate::expression::{
    CustomMatcher, ExpressionBuilder, Literal, Lookahead, Not, OneOf, OneOrMore, Optional,
    Pattern, Sequence, ZeroOrMore,
};
use crate::{Cache, IExpression, Input, ProductionError};
use std::rc::Rc;

fn lit(value: &str) -> Rc<dyn IExpression> {
    Rc::new(Literal::new(value))
}

fn pat(pattern: &str, flags: &str) -> Rc<dyn IExpression> {
    Rc::new(Pattern::new(pattern, flags).unwrap())
}

#[test]
fn literal_matches_exact_prefix() {
    let expr = lit("let");
    let input = Input::from_text("let x");
    let mut cache = Cache::root();

    let data = expr.advance(&input, 0, &mut cache).unwrap();
    assert_eq!(data.consumed_index, 3);
    assert_eq!(data.tree.start, 0);
    assert_eq!(data.tree.end, 3);
    assert_eq!(data.tree.text(), Some("let"));

    let err = expr.advance(&input, 1, &mut cache).unwrap_err();
    assert!(err.is_unparsed());
}

#[test]
fn empty_literal_matches_everywhere() {
    let expr = lit("");
    let input = Input::from_text("ab");
    let mut cache = Cache::root();

    let data = expr.advance(&input, 2, &mut cache).unwrap();
    assert_eq!(data.consumed_index, 2);
    assert_eq!(data.tree.start, data.tree.end);
}

#[test]
fn pattern_is_anchored_at_the_cursor() {
    let expr = pat("[0-9]+", "");
    let input = Input::from_text("ab12");
    let mut cache = Cache::root();

    expr.advance(&input, 0, &mut cache).unwrap_err();

    let data = expr.advance(&input, 2, &mut cache).unwrap();
    assert_eq!(data.consumed_index, 4);
    assert_eq!(data.tree.text(), Some("12"));
}

#[test]
fn pattern_records_capture_groups() {
    let expr = pat("([a-z]+)-([0-9]+)", "");
    let input = Input::from_text("ab-12!");
    let mut cache = Cache::root();

    let data = expr.advance(&input, 0, &mut cache).unwrap();
    let captures = data.tree.captures.as_ref().unwrap();
    assert_eq!(captures.len(), 3);
    assert_eq!(captures[0], Some((0, 5)));
    assert_eq!(captures[1], Some((0, 2)));
    assert_eq!(captures[2], Some((3, 5)));
}

#[test]
fn pattern_flags_apply() {
    let expr = pat("[a-z]+", "i");
    let input = Input::from_text("MiXeD");
    let mut cache = Cache::root();

    let data = expr.advance(&input, 0, &mut cache).unwrap();
    assert_eq!(data.consumed_index, 5);
}

#[test]
fn pattern_rejects_unsupported_flags() {
    Pattern::new("x", "l").unwrap_err();
    Pattern::new("x", "q").unwrap_err();
}

#[test]
fn sequence_concatenates_child_spans() {
    let expr = Sequence::new(vec![lit("a"), lit("bc"), lit("d")]);
    let input = Input::from_text("abcd");
    let mut cache = Cache::root();

    let data = expr.advance(&input, 0, &mut cache).unwrap();
    assert_eq!(data.consumed_index, 4);
    assert_eq!(data.tree.children.len(), 3);
    assert_eq!(data.tree.children[1].start, 1);
    assert_eq!(data.tree.children[1].end, 3);

    let err = expr.advance(&Input::from_text("abd"), 0, &mut Cache::root());
    assert!(err.is_err());
}

#[test]
fn one_of_takes_the_first_success() {
    let expr = OneOf::new(vec![lit("a"), lit("ab")]);
    let input = Input::from_text("ab");
    let mut cache = Cache::root();

    // The first alternative wins even though the second is longer.
    let data = expr.advance(&input, 0, &mut cache).unwrap();
    assert_eq!(data.consumed_index, 1);
    assert_eq!(data.tree.children.len(), 1);
    assert_eq!(data.tree.children[0].text(), Some("a"));
}

#[test]
fn one_of_falls_through_failures() {
    let expr = OneOf::new(vec![lit("x"), lit("ab")]);
    let input = Input::from_text("ab");
    let mut cache = Cache::root();

    let data = expr.advance(&input, 0, &mut cache).unwrap();
    assert_eq!(data.consumed_index, 2);

    let err = OneOf::new(vec![lit("x"), lit("y")])
        .advance(&input, 0, &mut Cache::root())
        .unwrap_err();
    assert!(err.is_unparsed());
}

#[test]
fn lookahead_succeeds_without_consuming() {
    let expr = Lookahead::new(&lit("ab"));
    let input = Input::from_text("ab");
    let mut cache = Cache::root();

    let data = expr.advance(&input, 0, &mut cache).unwrap();
    assert_eq!(data.consumed_index, 0);
    assert_eq!(data.tree.start, data.tree.end);
    assert!(data.tree.children.is_empty());

    Lookahead::new(&lit("xy"))
        .advance(&input, 0, &mut Cache::root())
        .unwrap_err();
}

#[test]
fn not_inverts_its_symbol() {
    let input = Input::from_text("ab");

    let err = Not::new(&lit("ab"))
        .advance(&input, 0, &mut Cache::root())
        .unwrap_err();
    assert!(err.is_unparsed());

    let data = Not::new(&lit("xy"))
        .advance(&input, 0, &mut Cache::root())
        .unwrap();
    assert_eq!(data.consumed_index, 0);
    assert_eq!(data.tree.start, data.tree.end);
}

#[test]
fn optional_always_succeeds() {
    let expr = Optional::new(&lit("ab"));
    let input = Input::from_text("ab");

    let data = expr.advance(&input, 0, &mut Cache::root()).unwrap();
    assert_eq!(data.consumed_index, 2);
    assert_eq!(data.tree.children.len(), 1);

    let data = expr.advance(&Input::from_text("xy"), 0, &mut Cache::root()).unwrap();
    assert_eq!(data.consumed_index, 0);
    assert!(data.tree.children.is_empty());
}

#[test]
fn zero_or_more_is_greedy() {
    let expr = ZeroOrMore::new(&lit("ab"));
    let input = Input::from_text("ababx");

    let data = expr.advance(&input, 0, &mut Cache::root()).unwrap();
    assert_eq!(data.consumed_index, 4);
    assert_eq!(data.tree.children.len(), 2);

    let data = expr.advance(&Input::from_text("x"), 0, &mut Cache::root()).unwrap();
    assert_eq!(data.consumed_index, 0);
    assert!(data.tree.children.is_empty());
}

#[test]
fn quantifiers_stop_on_zero_width_matches() {
    let body = pat("x?", "");
    let input = Input::from_text("xxy");

    let data = ZeroOrMore::new(&body)
        .advance(&input, 0, &mut Cache::root())
        .unwrap();
    assert_eq!(data.consumed_index, 2);
    assert_eq!(data.tree.children.len(), 2);

    // A zero-width first iteration leaves OneOrMore without progress.
    let err = OneOrMore::new(&body)
        .advance(&Input::from_text("y"), 0, &mut Cache::root())
        .unwrap_err();
    assert!(err.is_unparsed());
}

#[test]
fn one_or_more_requires_one_match() {
    let expr = OneOrMore::new(&lit("ab"));

    let data = expr
        .advance(&Input::from_text("abab"), 0, &mut Cache::root())
        .unwrap();
    assert_eq!(data.consumed_index, 4);

    expr.advance(&Input::from_text("x"), 0, &mut Cache::root())
        .unwrap_err();
}

#[test]
fn cached_results_are_stable() {
    let expr = Sequence::new(vec![lit("a"), pat("[0-9]+", "")]);
    let input = Input::from_text("a42");
    let mut cache = Cache::root();

    let first = expr.advance(&input, 0, &mut cache).unwrap();
    let second = expr.advance(&input, 0, &mut cache).unwrap();
    assert_eq!(first.consumed_index, second.consumed_index);
    assert_eq!(first.tree, second.tree);
}

#[test]
fn distinct_expressions_cache_separately() {
    let a = lit("x");
    let b = lit("x");
    assert_ne!(a.cache_key(), b.cache_key());

    let shared = lit("x");
    assert_eq!(shared.cache_key(), shared.cache_key());
}

#[test]
fn custom_matcher_follows_the_contract() {
    let word = CustomMatcher::new("word", |input, index| {
        let text = match input.code() {
            Some(code) => code.text(),
            None => return Ok(None),
        };
        let length = text[index..]
            .chars()
            .take_while(|c| c.is_ascii_lowercase())
            .count();
        Ok(if length == 0 { None } else { Some(index + length) })
    });

    let data = word
        .advance(&Input::from_text("hello!"), 0, &mut Cache::root())
        .unwrap();
    assert_eq!(data.consumed_index, 5);

    word.advance(&Input::from_text("42"), 0, &mut Cache::root())
        .unwrap_err();
}

#[test]
fn custom_matcher_can_abort_with_validation() {
    let strict = CustomMatcher::new("strict", |_, index| {
        Err(ProductionError::Validation(
            index,
            "rejected by the host".to_string(),
        ))
    });

    let err = strict
        .advance(&Input::from_text("x"), 0, &mut Cache::root())
        .unwrap_err();
    assert!(err.is_invalid());
}

#[test]
fn builder_wrappers_compose() {
    let expr = Literal::new("ab").into_one_or_more();
    let data = expr
        .advance(&Input::from_text("ababab"), 0, &mut Cache::root())
        .unwrap();
    assert_eq!(data.consumed_index, 6);

    let guard = Literal::new("x").into_not();
    guard
        .advance(&Input::from_text("y"), 0, &mut Cache::root())
        .unwrap();
}

#[test]
fn display_forms_round_trip_notation() {
    assert_eq!(lit("hi").to_string(), "\"hi\"");
    assert_eq!(lit("a\"b").to_string(), "\"a\\\"b\"");
    assert_eq!(pat(r"\s+", "i").to_string(), "~\"\\\\s+\"i");

    let named = lit("x");
    named.assign_rule_name("marker").unwrap();
    assert_eq!(named.to_string(), "marker");

    let choice = OneOf::new(vec![lit("a"), lit("b")]);
    assert_eq!(choice.to_string(), "(\"a\" / \"b\")");

    let seq = Sequence::new(vec![lit("a"), lit("b")]);
    assert_eq!(seq.to_string(), "(\"a\" \"b\")");

    assert_eq!(Optional::new(&lit("a")).to_string(), "(\"a\")?");
    assert_eq!(Not::new(&lit("a")).to_string(), "!(\"a\")");
}

#[test]
fn log_labels_are_assigned_once() {
    let expr = lit("x");
    expr.set_log(crate::Log::Verbose("x_literal")).unwrap();
    expr.set_log(crate::Log::Default("again")).unwrap_err();

    expr.advance(&Input::from_text("x"), 0, &mut Cache::root())
        .unwrap();
    expr.advance(&Input::from_text("y"), 0, &mut Cache::root())
        .unwrap_err();
}
