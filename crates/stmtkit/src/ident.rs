//! SQL identifier quoting.
//!
//! This module provides [`Quoter`], which turns a possibly dotted, possibly
//! already-quoted identifier into a safely quoted compound identifier.
//!
//! - Each `.`-separated segment is quoted on its own
//! - A `*` segment passes through unquoted (`u.*` -> `` `u`.* ``)
//! - One pre-existing pair of delimiters is stripped before quoting, so
//!   quoting is idempotent
//! - Embedded delimiters are escaped by doubling them
//!
//! # Example
//! ```ignore
//! use stmtkit::ident::quote_identifier;
//!
//! assert_eq!(quote_identifier("app.users"), "`app`.`users`");
//! assert_eq!(quote_identifier("`users`"), "`users`");
//! ```

/// Default identifier delimiter.
pub const BACKTICK: char = '`';

/// Identifier quoting rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quoter {
    /// Delimiter wrapped around every segment.
    pub delimiter: char,
    /// Strip one pre-existing pair of delimiters before quoting.
    pub strip_existing: bool,
}

impl Default for Quoter {
    fn default() -> Self {
        Self {
            delimiter: BACKTICK,
            strip_existing: true,
        }
    }
}

impl Quoter {
    /// Create a quoter with the default delimiter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the delimiter.
    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Quote segments as given, even when they already carry delimiters.
    pub fn keep_existing_quotes(mut self) -> Self {
        self.strip_existing = false;
        self
    }

    /// Quote a possibly dotted identifier.
    pub fn quote(&self, ident: &str) -> String {
        let mut out = String::with_capacity(ident.len() + 2);
        for (i, segment) in ident.split('.').enumerate() {
            if i > 0 {
                out.push('.');
            }
            self.write_segment(segment, &mut out);
        }
        out
    }

    fn write_segment(&self, segment: &str, out: &mut String) {
        if segment.trim() == "*" {
            out.push('*');
            return;
        }

        let d = self.delimiter;
        let mut inner = segment;
        if self.strip_existing
            && inner.chars().count() > 2
            && inner.starts_with(d)
            && inner.ends_with(d)
        {
            inner = &inner[d.len_utf8()..inner.len() - d.len_utf8()];
        }

        out.push(d);
        for ch in inner.chars() {
            if ch == d {
                out.push(d);
            }
            out.push(ch);
        }
        out.push(d);
    }
}

/// Quote an identifier with the default [`Quoter`].
pub fn quote_identifier(ident: &str) -> String {
    Quoter::default().quote(ident)
}

/// Returns `true` for numeric literals (`42`, `-1.5`, ` 3e2`).
///
/// Numeric literals flow through the same call path as column names (e.g.
/// `SELECT 1`) and must never be quoted.
pub fn is_numeric(s: &str) -> bool {
    let s = s.trim();
    let bytes = s.as_bytes();
    let mut i = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;

    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        digits += i - frac_start;
    }

    if digits == 0 {
        return false;
    }

    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        i += 1;
        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return false;
        }
    }

    i == bytes.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_simple() {
        assert_eq!(quote_identifier("users"), "`users`");
    }

    #[test]
    fn quote_dotted() {
        assert_eq!(quote_identifier("u.status"), "`u`.`status`");
        assert_eq!(quote_identifier("app.users.id"), "`app`.`users`.`id`");
    }

    #[test]
    fn quote_star_passthrough() {
        assert_eq!(quote_identifier("*"), "*");
        assert_eq!(quote_identifier("u.*"), "`u`.*");
        assert_eq!(quote_identifier("u. * "), "`u`.*");
    }

    #[test]
    fn quote_is_idempotent() {
        let once = quote_identifier("u.status");
        assert_eq!(quote_identifier(&once), once);
    }

    #[test]
    fn quote_escapes_embedded_delimiter() {
        assert_eq!(quote_identifier("we`ird"), "`we``ird`");
    }

    #[test]
    fn quote_two_char_segment_is_not_stripped() {
        // "``" is too short to be a quoted name; it is escaped instead.
        assert_eq!(quote_identifier("``"), "``````");
    }

    #[test]
    fn quote_keep_existing() {
        let q = Quoter::new().keep_existing_quotes();
        assert_eq!(q.quote("`id`"), "```id```");
    }

    #[test]
    fn quote_custom_delimiter() {
        let q = Quoter::new().delimiter('"');
        assert_eq!(q.quote(r#"public."Users""#), r#""public"."Users""#);
        assert_eq!(q.quote(r#"a"b"#), r#""a""b""#);
    }

    #[test]
    fn numeric_detection() {
        assert!(is_numeric("1"));
        assert!(is_numeric("-12"));
        assert!(is_numeric("1.5"));
        assert!(is_numeric(".5"));
        assert!(is_numeric(" 3e2 "));
        assert!(!is_numeric(""));
        assert!(!is_numeric("."));
        assert!(!is_numeric("1e"));
        assert!(!is_numeric("id"));
        assert!(!is_numeric("0x1A"));
        assert!(!is_numeric("inf"));
    }
}
