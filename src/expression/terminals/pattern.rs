use crate::expression::{terminals::escape_literal, ExpressionLogger, ExprTag, Pattern};
use crate::{
    Cache, CacheKey, GrammarError, IExpression, Input, Log, ParseNode, ParsedResult,
    ProductionError, SuccessData,
};
use regex::Regex;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

impl Pattern {
    /// Compile an anchored regex terminal.
    ///
    /// ### Arguments
    /// * `pattern` - The regex source, matched at the cursor position.
    /// * `flags` - Any of `i`, `m`, `s`, `u`, `x`, case-insensitive. The
    ///   locale flag `l` has no counterpart in the regex engine and is
    ///   rejected.
    pub fn new(pattern: &str, flags: &str) -> Result<Self, GrammarError> {
        let mut kept = String::new();
        for c in flags.to_lowercase().chars() {
            match c {
                'i' | 'm' | 's' | 'u' | 'x' => {
                    if !kept.contains(c) {
                        kept.push(c);
                    }
                }
                other => {
                    return Err(GrammarError::InvalidRegex {
                        pattern: pattern.to_string(),
                        message: format!("The regex flag '{}' is not supported.", other),
                    });
                }
            }
        }

        // Anchoring lives outside the flag group so a multi-line flag cannot
        // re-anchor the cursor at every line start.
        let anchored = format!("^(?{}:{})", kept, pattern);
        match Regex::new(&anchored) {
            Ok(regexp) => Ok(Self {
                pattern: pattern.to_string(),
                flags: kept,
                regexp,
                tag: ExprTag::new(),
            }),
            Err(err) => Err(GrammarError::InvalidRegex {
                pattern: pattern.to_string(),
                message: err.to_string(),
            }),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn flags(&self) -> &str {
        &self.flags
    }
}

impl ExpressionLogger for Pattern {
    fn get_debugger(&self) -> Option<&Log<&'static str>> {
        self.tag.get_debugger()
    }
}

impl Display for Pattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.tag.rule_name() {
            Some(name) => write!(f, "{}", name),
            None => self.write_body(f),
        }
    }
}

impl IExpression for Pattern {
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

    fn expects_input(&self) -> bool {
        true
    }

    fn write_body(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "~{}{}", escape_literal(&self.pattern), self.flags)
    }

    fn eat(&self, input: &Input, index: usize, _: &mut Cache) -> ParsedResult {
        let code = match input {
            Input::Text(code) => code,
            Input::Tokens(_) => {
                panic!("Bug! Pattern terminal should not be used with token parsing.")
            }
        };

        let rest = match code.text().get(index..) {
            Some(rest) => rest,
            None => return Err(ProductionError::Unparsed),
        };

        match self.regexp.captures(rest) {
            Some(captures) => {
                let whole = match captures.get(0) {
                    Some(m) => m,
                    None => return Err(ProductionError::Unparsed),
                };
                debug_assert!(whole.start() == 0, "Pattern should match from the cursor.");

                let consumed_ptr = index + whole.end();
                let groups: Vec<Option<(usize, usize)>> = captures
                    .iter()
                    .map(|group| group.map(|m| (index + m.start(), index + m.end())))
                    .collect();

                #[cfg(debug_assertions)]
                self.log_success(input, index, consumed_ptr);

                Ok(SuccessData::new(
                    consumed_ptr,
                    ParseNode::new(
                        self.rule_label(),
                        input.clone(),
                        index,
                        consumed_ptr,
                        Vec::with_capacity(0),
                        Some(groups),
                    ),
                ))
            }
            None => {
                #[cfg(debug_assertions)]
                self.log_error(input, index, &ProductionError::Unparsed);

                Err(ProductionError::Unparsed)
            }
        }
    }
}
