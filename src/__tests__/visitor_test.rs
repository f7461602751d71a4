use crate::visitor::{HandlerError, NodeVisitor, RuleFragments, VisitError};
use crate::{Grammar, ParseNode};

#[derive(Debug, PartialEq)]
struct Boom;

/// Collects regex-matched fields of a comma separated row.
struct RowVisitor {
    grammar: Grammar,
}

impl RowVisitor {
    fn new() -> Self {
        Self {
            grammar: Grammar::new(
                r#"
                row   = field tail*
                tail  = "," field
                field = ~"[a-z]*"
                "#,
            )
            .unwrap(),
        }
    }
}

impl NodeVisitor for RowVisitor {
    type Value = Vec<String>;
    type Error = Boom;

    fn grammar(&self) -> Option<&Grammar> {
        Some(&self.grammar)
    }

    fn visit_rule(
        &mut self,
        rule: &str,
        node: &ParseNode,
        children: Vec<Vec<String>>,
    ) -> Result<Vec<String>, HandlerError<Boom>> {
        match rule {
            "field" => Ok(vec![node.text().unwrap_or("").to_string()]),
            _ => self.generic_visit(node, children),
        }
    }

    fn generic_visit(
        &mut self,
        _node: &ParseNode,
        children: Vec<Vec<String>>,
    ) -> Result<Vec<String>, HandlerError<Boom>> {
        Ok(children.into_iter().flatten().collect())
    }
}

#[test]
pub fn test_bottom_up_fold() {
    let mut visitor = RowVisitor::new();

    let fields = visitor.parse("a,b,c").unwrap();
    assert_eq!(fields, vec!["a", "b", "c"]);

    let fields = visitor.parse("x").unwrap();
    assert_eq!(fields, vec!["x"]);
}

#[test]
pub fn test_parse_errors_pass_through() {
    let mut visitor = RowVisitor::new();

    match visitor.parse("a,B") {
        Err(VisitError::Parse(_)) => {}
        other => panic!("Expected a parse error, got {:?}", other),
    }
}

/// Raises on every `text` node; used by the wrapping tests.
struct FussyVisitor {
    grammar: Grammar,
    unwrap_boom: bool,
}

impl FussyVisitor {
    fn new(unwrap_boom: bool) -> Self {
        Self {
            grammar: Grammar::new(
                r#"
                bold = "((" text "))"
                text = ~"[A-Z 0-9]*"i
                "#,
            )
            .unwrap(),
            unwrap_boom,
        }
    }
}

impl NodeVisitor for FussyVisitor {
    type Value = String;
    type Error = Boom;

    fn grammar(&self) -> Option<&Grammar> {
        Some(&self.grammar)
    }

    fn unwrapped(&self, _: &Boom) -> bool {
        self.unwrap_boom
    }

    fn visit_rule(
        &mut self,
        rule: &str,
        node: &ParseNode,
        children: Vec<String>,
    ) -> Result<String, HandlerError<Boom>> {
        match rule {
            "text" => Err(HandlerError::Raised(Boom)),
            _ => self.generic_visit(node, children),
        }
    }

    fn generic_visit(
        &mut self,
        node: &ParseNode,
        children: Vec<String>,
    ) -> Result<String, HandlerError<Boom>> {
        if children.is_empty() {
            Ok(node.text().unwrap_or("").to_string())
        } else {
            Ok(children.concat())
        }
    }
}

#[test]
pub fn test_handler_errors_are_wrapped() {
    let mut visitor = FussyVisitor::new(false);

    match visitor.parse("((BOLD STUFF))") {
        Err(VisitError::Visitation(err)) => {
            assert_eq!(err.source, Boom);
            assert_eq!(err.node.rule_name(), Some("text"));
            assert!(err.tree.contains("bold # 0-14"), "{}", err.tree);
            assert!(err.tree.contains("<-- error raised here"), "{}", err.tree);
        }
        other => panic!("Expected a visitation error, got {:?}", other),
    }
}

#[test]
pub fn test_unwrapped_errors_propagate_raw() {
    let mut visitor = FussyVisitor::new(true);

    match visitor.parse("((BOLD STUFF))") {
        Err(VisitError::Unwrapped(Boom)) => {}
        other => panic!("Expected the raw error, got {:?}", other),
    }
}

struct NoHandlers;

impl NodeVisitor for NoHandlers {
    type Value = ();
    type Error = Boom;
}

#[test]
pub fn test_missing_handlers_are_a_configuration_error() {
    let grammar = Grammar::new(r#"a = "x""#).unwrap();
    let tree = grammar.parse("x").unwrap();

    match NoHandlers.visit(&tree) {
        Err(VisitError::NoHandler { rule, .. }) => assert_eq!(rule, "a"),
        other => panic!("Expected a missing handler, got {:?}", other),
    }
}

#[test]
pub fn test_visitor_without_grammar() {
    match NoHandlers.parse("x") {
        Err(VisitError::MissingGrammar) => {}
        other => panic!("Expected a missing grammar, got {:?}", other),
    }
}

#[test]
pub fn test_rule_fragments_assemble_a_grammar() {
    let grammar = RuleFragments::new()
        .rule("greeting", r#"hello " " name"#)
        .rule("hello", r#""hi" / "hello""#)
        .rule("name", r#"~"[a-z]+""#)
        .grammar()
        .unwrap();

    assert_eq!(grammar.default_rule(), Some("greeting"));
    grammar.parse("hi bob").unwrap();

    let fields: Vec<&str> = grammar.rule_names().collect();
    assert_eq!(fields, vec!["greeting", "hello", "name"]);
}

#[test]
pub fn test_match_prefix_convenience() {
    let mut visitor = RowVisitor::new();

    let fields = visitor.match_prefix("a,b!trailing").unwrap();
    assert_eq!(fields, vec!["a", "b"]);
}
