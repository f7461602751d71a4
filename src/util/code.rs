use crate::{Code, Position};
use once_cell::unsync::OnceCell;

impl From<&str> for Code {
    fn from(value: &str) -> Self {
        Code::new(value)
    }
}

impl Code {
    pub fn new(value: &str) -> Self {
        Self {
            value: value.into(),
            line_breaks: OnceCell::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.value
    }

    pub fn obtain_line_breaks(&self) -> &Vec<usize> {
        self.line_breaks.get_or_init(|| {
            self.value
                .bytes()
                .enumerate()
                .filter_map(|(index, b)| if b == b'\n' { Some(index) } else { None })
                .collect()
        })
    }

    pub fn obtain_position(&self, pointer: usize) -> Position {
        let line_breaks = self.obtain_line_breaks();
        let index = match line_breaks.binary_search(&pointer) {
            Ok(index) | Err(index) => index,
        };

        let line_start = if index == 0 { 0 } else { line_breaks[index - 1] + 1 };
        let column = match self.value.get(line_start..pointer) {
            Some(s) => s.chars().count() + 1,
            None => pointer - line_start + 1,
        };
        Position::new(index + 1, column)
    }
}
