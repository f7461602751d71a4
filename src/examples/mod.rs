//! Ready-made grammars demonstrating the library.

pub mod json;

#[cfg(test)]
mod __tests__;
