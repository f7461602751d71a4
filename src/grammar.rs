use crate::compile::{self, GrammarKind};
use crate::{
    Cache, Grammar, GrammarError, IExpression, Input, ParseError, ParseNode, Token, TokenGrammar,
};
use std::fmt::{Display, Formatter};
use std::ops::Index;
use std::rc::Rc;

impl Grammar {
    /// Compile a grammar from source text in the PEG notation.
    ///
    /// The first rule in source order becomes the default rule; an empty
    /// source yields a grammar without one.
    pub fn new(source: &str) -> Result<Self, GrammarError> {
        compile::compile(source, Vec::new(), GrammarKind::Text)
    }

    /// Compile a grammar whose references may also be satisfied by
    /// host-supplied expressions.
    ///
    /// Custom rules merge into the rule table before resolution and only fill
    /// names the source leaves undefined; textual rules win on a collision.
    pub fn with_rules(
        source: &str,
        custom_rules: Vec<(&str, Rc<dyn IExpression>)>,
    ) -> Result<Self, GrammarError> {
        let custom = custom_rules
            .into_iter()
            .map(|(name, expr)| (name.to_string(), expr))
            .collect();
        compile::compile(source, custom, GrammarKind::Text)
    }

    /// Parse `text` with the default rule, requiring it to consume the whole
    /// input.
    pub fn parse(&self, text: &str) -> Result<ParseNode, ParseError> {
        self.parse_at(text, 0)
    }

    pub fn parse_at(&self, text: &str, pointer: usize) -> Result<ParseNode, ParseError> {
        self.run(Input::from_text(text), pointer, true)
    }

    /// Match the default rule against a prefix of `text`.
    pub fn match_prefix(&self, text: &str) -> Result<ParseNode, ParseError> {
        self.match_prefix_at(text, 0)
    }

    pub fn match_prefix_at(&self, text: &str, pointer: usize) -> Result<ParseNode, ParseError> {
        self.run(Input::from_text(text), pointer, false)
    }

    /// Return a grammar sharing this rule table with a different default
    /// rule.
    pub fn default(&self, rule_name: &str) -> Result<Grammar, GrammarError> {
        if !self.rules.contains_key(rule_name) {
            return Err(GrammarError::UnknownRule {
                name: rule_name.to_string(),
            });
        }
        Ok(Grammar {
            rules: self.rules.clone(),
            order: self.order.clone(),
            default_rule: Some(rule_name.to_string()),
        })
    }

    pub fn default_rule(&self) -> Option<&str> {
        self.default_rule.as_deref()
    }

    pub fn get(&self, name: &str) -> Option<&Rc<dyn IExpression>> {
        self.rules.get(name)
    }

    /// Rule names in source order, custom rules appended.
    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|name| name.as_str())
    }

    pub(crate) fn run(
        &self,
        input: Input,
        pointer: usize,
        complete: bool,
    ) -> Result<ParseNode, ParseError> {
        let name = match &self.default_rule {
            Some(name) => name.as_str(),
            None => return Err(ParseError::NoDefaultRule),
        };
        let root = match self.rules.get(name) {
            Some(expr) => expr,
            None => panic!("Bug! The default rule '{}' is missing from the rule table.", name),
        };

        let mut cache = Cache::root();
        match root.advance(&input, pointer, &mut cache) {
            Ok(data) => {
                if complete && data.consumed_index < input.len() {
                    Err(cache.incomplete_error(&input, name, data.consumed_index))
                } else {
                    Ok(data.tree)
                }
            }
            Err(err) => Err(cache.create_error(&input, name, err)),
        }
    }
}

impl Index<&str> for Grammar {
    type Output = Rc<dyn IExpression>;

    fn index(&self, name: &str) -> &Self::Output {
        match self.rules.get(name) {
            Some(expr) => expr,
            None => panic!("No rule named '{}' in the grammar.", name),
        }
    }
}

impl Display for Grammar {
    /// Write the grammar in its round-trippable source form.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for name in &self.order {
            let expr = match self.rules.get(name) {
                Some(expr) => expr,
                None => continue,
            };
            write!(f, "{} = ", name)?;
            if expr.rule_name().map(|rule| &**rule) == Some(name.as_str()) {
                expr.write_body(f)?;
            } else {
                // An alias rule shares its target's expression; print the
                // target's name.
                write!(f, "{}", expr)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl TokenGrammar {
    /// Compile a token-mode grammar: literal atoms match a single [Token] by
    /// kind, and regex atoms are rejected.
    pub fn new(source: &str) -> Result<Self, GrammarError> {
        Ok(Self {
            grammar: compile::compile(source, Vec::new(), GrammarKind::Tokens)?,
        })
    }

    pub fn with_rules(
        source: &str,
        custom_rules: Vec<(&str, Rc<dyn IExpression>)>,
    ) -> Result<Self, GrammarError> {
        let custom = custom_rules
            .into_iter()
            .map(|(name, expr)| (name.to_string(), expr))
            .collect();
        Ok(Self {
            grammar: compile::compile(source, custom, GrammarKind::Tokens)?,
        })
    }

    /// Parse the whole token sequence with the default rule.
    pub fn parse(&self, tokens: &[Token]) -> Result<ParseNode, ParseError> {
        self.parse_at(tokens, 0)
    }

    pub fn parse_at(&self, tokens: &[Token], pointer: usize) -> Result<ParseNode, ParseError> {
        self.grammar.run(Input::from_tokens(tokens), pointer, true)
    }

    pub fn match_prefix(&self, tokens: &[Token]) -> Result<ParseNode, ParseError> {
        self.match_prefix_at(tokens, 0)
    }

    pub fn match_prefix_at(
        &self,
        tokens: &[Token],
        pointer: usize,
    ) -> Result<ParseNode, ParseError> {
        self.grammar.run(Input::from_tokens(tokens), pointer, false)
    }

    pub fn default(&self, rule_name: &str) -> Result<TokenGrammar, GrammarError> {
        Ok(TokenGrammar {
            grammar: self.grammar.default(rule_name)?,
        })
    }

    pub fn default_rule(&self) -> Option<&str> {
        self.grammar.default_rule()
    }

    pub fn get(&self, name: &str) -> Option<&Rc<dyn IExpression>> {
        self.grammar.get(name)
    }

    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.grammar.rule_names()
    }
}

impl Display for TokenGrammar {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.grammar)
    }
}
