mod one_of;
mod sequence;
