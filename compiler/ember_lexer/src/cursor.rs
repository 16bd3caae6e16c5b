//! Byte cursor over the source text.
//!
//! Reads past the end return `0`, so lookahead never needs a bounds check at
//! the call site. Source text containing a literal NUL is still handled:
//! [`Cursor::is_eof`] compares the position, not the byte.

pub(crate) struct Cursor<'a> {
    src: &'a str,
    pos: u32,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(src: &'a str) -> Self {
        Cursor { src, pos: 0 }
    }

    #[inline]
    fn byte_at(&self, pos: usize) -> u8 {
        self.src.as_bytes().get(pos).copied().unwrap_or(0)
    }

    #[inline]
    pub(crate) fn current(&self) -> u8 {
        self.byte_at(self.pos as usize)
    }

    #[inline]
    pub(crate) fn peek(&self) -> u8 {
        self.peek_n(1)
    }

    #[inline]
    pub(crate) fn peek_n(&self, n: usize) -> u8 {
        self.byte_at(self.pos as usize + n)
    }

    #[inline]
    pub(crate) fn advance(&mut self) {
        self.pos += 1;
    }

    #[inline]
    pub(crate) fn advance_n(&mut self, n: u32) {
        self.pos += n;
    }

    /// Step over one whole UTF-8 character.
    pub(crate) fn advance_char(&mut self) {
        let width = match self.current() {
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => 1,
        };
        self.advance_n(width);
    }

    #[inline]
    pub(crate) fn is_eof(&self) -> bool {
        self.pos as usize >= self.src.len()
    }

    #[inline]
    pub(crate) fn pos(&self) -> u32 {
        self.pos
    }

    /// Source text from `start` to the current position.
    pub(crate) fn slice_from(&self, start: u32) -> &'a str {
        let end = (self.pos as usize).min(self.src.len());
        self.src.get(start as usize..end).unwrap_or("")
    }

    #[inline]
    pub(crate) fn eat_while(&mut self, pred: impl Fn(u8) -> bool) {
        while !self.is_eof() && pred(self.current()) {
            self.pos += 1;
        }
    }

    fn remaining(&self) -> &'a [u8] {
        self.src
            .as_bytes()
            .get(self.pos as usize..)
            .unwrap_or_default()
    }

    fn jump(&mut self, offset: usize) {
        self.pos += offset as u32;
    }

    /// Skip to the next `\n` (not consumed) or EOF.
    pub(crate) fn eat_line(&mut self) {
        match memchr::memchr(b'\n', self.remaining()) {
            Some(offset) => self.jump(offset),
            None => self.pos = self.src.len() as u32,
        }
    }

    /// Skip past the next occurrence of `needle`.
    ///
    /// Returns whether a line break was skipped, or `None` if `needle` never
    /// occurs (the cursor is then left at EOF).
    pub(crate) fn eat_through(&mut self, needle: &[u8]) -> Option<bool> {
        let rest = self.remaining();
        match memchr::memmem::find(rest, needle) {
            Some(offset) => {
                let newline = memchr::memchr(b'\n', &rest[..offset]).is_some();
                self.jump(offset + needle.len());
                Some(newline)
            }
            None => {
                self.pos = self.src.len() as u32;
                None
            }
        }
    }

    /// Skip ordinary string content up to the closing `quote`, a backslash or
    /// a line break, and return that byte without consuming it.
    ///
    /// `None` means EOF was reached first.
    pub(crate) fn skip_to_string_delim(&mut self, quote: u8) -> Option<u8> {
        match memchr::memchr3(quote, b'\\', b'\n', self.remaining()) {
            Some(offset) => {
                self.jump(offset);
                Some(self.current())
            }
            None => {
                self.pos = self.src.len() as u32;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Cursor;

    #[test]
    fn reads_past_end_are_zero() {
        let mut cursor = Cursor::new("ab");
        assert_eq!(cursor.peek_n(5), 0);
        cursor.advance_n(2);
        assert!(cursor.is_eof());
        assert_eq!(cursor.current(), 0);
    }

    #[test]
    fn eat_through_reports_newlines() {
        let mut cursor = Cursor::new("a\nb */x");
        assert_eq!(cursor.eat_through(b"*/"), Some(true));
        assert_eq!(cursor.current(), b'x');

        let mut cursor = Cursor::new("ab");
        assert_eq!(cursor.eat_through(b"*/"), None);
        assert!(cursor.is_eof());
    }

    #[test]
    fn string_delim_stops_at_backslash() {
        let mut cursor = Cursor::new(r#"abc\"def""#);
        assert_eq!(cursor.skip_to_string_delim(b'"'), Some(b'\\'));
        assert_eq!(cursor.slice_from(0), "abc");
    }

    #[test]
    fn advance_char_steps_over_multibyte() {
        let mut cursor = Cursor::new("é!");
        cursor.advance_char();
        assert_eq!(cursor.current(), b'!');
    }
}
