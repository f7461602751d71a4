mod grammar_test;
mod visitor_test;
