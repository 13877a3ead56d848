//! Search form text buffer.

use unicode_segmentation::UnicodeSegmentation;

/// Single-line text input with a grapheme-indexed cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchInput {
    text: String,
    cursor: usize,
}

impl SearchInput {
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Cursor position in graphemes.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn enter_char(&mut self, new_char: char) {
        if new_char == '\n' || new_char == '\r' {
            return;
        }
        let index = self.byte_index_at(self.cursor);
        self.text.insert(index, new_char);
        self.cursor = self.clamp_cursor(self.cursor.saturating_add(1));
    }

    pub fn enter_text(&mut self, text: &str) {
        for ch in text.chars() {
            self.enter_char(ch);
        }
    }

    pub fn delete_char(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let start = self.byte_index_at(self.cursor - 1);
        let end = self.byte_index_at(self.cursor);
        self.text.replace_range(start..end, "");
        self.cursor -= 1;
    }

    pub fn delete_word_backwards(&mut self) {
        while self.cursor > 0 && self.grapheme_is_whitespace(self.cursor - 1) {
            self.delete_char();
        }
        while self.cursor > 0 && !self.grapheme_is_whitespace(self.cursor - 1) {
            self.delete_char();
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        self.cursor = self.clamp_cursor(self.cursor.saturating_add(1));
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor = self.grapheme_count();
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cursor = self.grapheme_count();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    #[must_use]
    pub fn grapheme_count(&self) -> usize {
        self.text.graphemes(true).count()
    }

    /// Text before the cursor, for placing the terminal cursor.
    #[must_use]
    pub fn before_cursor(&self) -> &str {
        &self.text[..self.byte_index_at(self.cursor)]
    }

    fn clamp_cursor(&self, cursor: usize) -> usize {
        cursor.min(self.grapheme_count())
    }

    fn byte_index_at(&self, cursor: usize) -> usize {
        self.text
            .grapheme_indices(true)
            .nth(cursor)
            .map_or(self.text.len(), |(idx, _)| idx)
    }

    fn grapheme_is_whitespace(&self, index: usize) -> bool {
        self.text
            .graphemes(true)
            .nth(index)
            .is_some_and(|grapheme| grapheme.chars().all(char::is_whitespace))
    }
}
