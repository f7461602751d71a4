use crate::{
    Cache, CacheKey, FailurePoint, Input, ParseError, ParsedResult, ProductionError,
};
use std::collections::HashMap;

impl Cache {
    pub fn root() -> Self {
        Self {
            parsed_result_cache: HashMap::new(),
            failure_pointer: 0,
            failure_expectations: Vec::new(),
        }
    }

    pub fn contains(&self, key: CacheKey, index: usize) -> bool {
        self.parsed_result_cache.contains_key(&(key, index))
    }

    pub fn find(&self, key: CacheKey, index: usize) -> Option<&ParsedResult> {
        self.parsed_result_cache.get(&(key, index))
    }

    pub fn insert(
        &mut self,
        key: CacheKey,
        index: usize,
        result: ParsedResult,
    ) -> Option<ParsedResult> {
        self.parsed_result_cache.insert((key, index), result)
    }

    /// Record that an input-expecting expression failed at `index`.
    ///
    /// Failures strictly right of the current record reset the expectation
    /// set; failures at the same point extend it.
    pub fn record_failure(&mut self, index: usize, expectation: String) {
        if index > self.failure_pointer {
            self.failure_pointer = index;
            self.failure_expectations.clear();
        }
        if index == self.failure_pointer && !self.failure_expectations.contains(&expectation) {
            self.failure_expectations.push(expectation);
        }
    }

    pub fn failure_pointer(&self) -> usize {
        self.failure_pointer
    }

    fn failure_point(&self, input: &Input, rule: &str, pointer: usize) -> FailurePoint {
        FailurePoint {
            rule: rule.to_string(),
            pointer,
            position: input.position(pointer),
            expressions: self.failure_expectations.clone(),
            snippet: input.snippet(pointer),
        }
    }

    /// Build the final [ParseError] once the start rule has failed.
    pub fn create_error(&self, input: &Input, rule: &str, err: ProductionError) -> ParseError {
        match err {
            ProductionError::Unparsed => {
                ParseError::Unmatched(self.failure_point(input, rule, self.failure_pointer))
            }
            ProductionError::Validation(pointer, message) => {
                ParseError::Validation { pointer, message }
            }
        }
    }

    /// Build the error for a start rule that matched but left trailing input.
    pub fn incomplete_error(&self, input: &Input, rule: &str, consumed: usize) -> ParseError {
        ParseError::Incomplete(self.failure_point(input, rule, consumed))
    }
}

impl Default for Cache {
    fn default() -> Self {
        Cache::root()
    }
}
