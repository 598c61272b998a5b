//! Single-line text input for the terminal user interface.

/// A text input with a cursor counted in characters, not bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputField {
    pub value: String,
    pub cursor: usize,
}

impl InputField {
    pub fn new() -> Self {
        Self::default()
    }

    /// An input holding `value` with the cursor at the end.
    pub fn with_value(value: &str) -> Self {
        Self { value: value.to_string(), cursor: value.chars().count() }
    }

    fn byte_offset(&self, char_idx: usize) -> usize {
        self.value.char_indices().nth(char_idx).map_or(self.value.len(), |(i, _)| i)
    }

    fn len_chars(&self) -> usize {
        self.value.chars().count()
    }

    pub fn handle_char(&mut self, c: char) {
        let at = self.byte_offset(self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
    }

    /// Delete the character before the cursor.
    pub fn handle_backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_offset(self.cursor);
            self.value.remove(at);
        }
    }

    /// Delete the character under the cursor.
    pub fn handle_delete(&mut self) {
        if self.cursor < self.len_chars() {
            let at = self.byte_offset(self.cursor);
            self.value.remove(at);
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor < self.len_chars() {
            self.cursor += 1;
        }
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edits_multibyte_text() {
        let mut field = InputField::with_value("café");
        assert_eq!(field.cursor, 4);
        field.handle_backspace();
        assert_eq!(field.value, "caf");
        field.handle_char('é');
        field.move_cursor_left();
        field.move_cursor_left();
        field.handle_char('-');
        assert_eq!(field.value, "ca-fé");
        field.handle_delete();
        assert_eq!(field.value, "ca-é");
    }

    #[test]
    fn cursor_stays_in_bounds() {
        let mut field = InputField::new();
        field.move_cursor_left();
        field.handle_backspace();
        field.handle_delete();
        field.move_cursor_right();
        assert_eq!(field.cursor, 0);
        field.handle_char('x');
        field.clear();
        assert_eq!(field, InputField::new());
    }
}
