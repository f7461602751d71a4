mod look_ahead;
mod not;
mod nullable;
mod one_or_more;
mod zero_or_more;
