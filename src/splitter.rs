//! Batch splitting for SQL scripts
//!
//! Install scripts separate independently executable batches with a line
//! holding only `GO` (any case, trailing whitespace ignored). The `GO` line
//! belongs to no statement. No SQL is inspected here: malformed statements
//! pass through untouched and only fail once executed.
//!
//! Line terminators are normalized to `\n`. A final line without a
//! terminator is kept as-is, so `"SELECT 1\nGO\nSELECT 2"` splits into
//! `"SELECT 1\n"` and `"SELECT 2"`.
//!
//! A batch is empty only when it holds zero bytes. Whitespace-only content
//! is therefore emitted as a statement; use [`split_statements_nonblank`]
//! when those should be dropped.

/// Batch terminator keyword
pub const BATCH_TERMINATOR: &str = "GO";

/// Returns true when `line` is a batch terminator line
pub fn is_batch_terminator(line: &str) -> bool {
    line.trim_end().eq_ignore_ascii_case(BATCH_TERMINATOR)
}

/// Iterator over the statements of a script, in source order
pub struct Statements<'a> {
    rest: &'a str,
}

impl<'a> Statements<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { rest: text }
    }

    /// Take the next line, returning its content and whether a `\n` ended it
    fn next_line(&mut self) -> Option<(&'a str, bool)> {
        if self.rest.is_empty() {
            return None;
        }

        match self.rest.find('\n') {
            Some(pos) => {
                let line = &self.rest[..pos];
                self.rest = &self.rest[pos + 1..];
                Some((line.strip_suffix('\r').unwrap_or(line), true))
            }
            None => {
                let line = self.rest;
                self.rest = "";
                Some((line, false))
            }
        }
    }
}

impl Iterator for Statements<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let mut buffer = String::new();

        while let Some((line, terminated)) = self.next_line() {
            if is_batch_terminator(line) {
                if buffer.is_empty() {
                    // leading or repeated GO
                    continue;
                }
                return Some(buffer);
            }

            buffer.push_str(line);
            if terminated {
                buffer.push('\n');
            }
        }

        if buffer.is_empty() {
            None
        } else {
            Some(buffer)
        }
    }
}

/// Split script text into statements, in source order
pub fn split_statements(text: &str) -> Vec<String> {
    Statements::new(text).collect()
}

/// Like [`split_statements`], dropping statements made only of whitespace
pub fn split_statements_nonblank(text: &str) -> Vec<String> {
    Statements::new(text)
        .filter(|s| !s.trim().is_empty())
        .collect()
}
