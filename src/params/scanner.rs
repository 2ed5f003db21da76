use std::borrow::Cow;

use crate::error::RdsDataError;

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    Quoted(u8),
}

/// Replace every `?` outside of `'…'`, `"…"` and `` `…` `` spans with `:N`, counting up
/// from `base`. A backslash inside a quoted span escapes the next byte.
///
/// Returns the rewritten SQL and the number of placeholders replaced; the SQL is borrowed
/// when nothing changed.
pub(super) fn rewrite_positional(
    sql: &str,
    base: i64,
) -> Result<(Cow<'_, str>, usize), RdsDataError> {
    let bytes = sql.as_bytes();
    let mut out: Option<String> = None;
    let mut state = State::Normal;
    let mut next = base;
    let mut count = 0;
    let mut last_copied = 0;
    let mut idx = 0;

    while idx < bytes.len() {
        let b = bytes[idx];
        match state {
            State::Normal => match b {
                b'\'' | b'"' | b'`' => state = State::Quoted(b),
                b'?' => {
                    let buf = out.get_or_insert_with(|| String::with_capacity(sql.len() + 8));
                    buf.push_str(&sql[last_copied..idx]);
                    buf.push(':');
                    buf.push_str(&next.to_string());
                    last_copied = idx + 1;
                    next += 1;
                    count += 1;
                }
                _ => {}
            },
            State::Quoted(quote) => {
                if b == b'\\' {
                    idx += 1; // skip escaped byte
                } else if b == quote {
                    state = State::Normal;
                }
            }
        }
        idx += 1;
    }

    if let State::Quoted(quote) = state {
        return Err(RdsDataError::MalformedSql(format!(
            "unterminated {} literal in: {sql}",
            char::from(quote)
        )));
    }

    match out {
        Some(mut buf) => {
            buf.push_str(&sql[last_copied..]);
            Ok((Cow::Owned(buf), count))
        }
        None => Ok((Cow::Borrowed(sql), 0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewrite(sql: &str, base: i64) -> String {
        rewrite_positional(sql, base).unwrap().0.into_owned()
    }

    #[test]
    fn numbers_free_placeholders_from_base() {
        assert_eq!(rewrite("a = ? AND b = ?", 0), "a = :0 AND b = :1");
        assert_eq!(rewrite("a = ? AND b = ?", 1), "a = :1 AND b = :2");
    }

    #[test]
    fn skips_all_quote_styles() {
        assert_eq!(rewrite("x = '?' AND y = ?", 1), "x = '?' AND y = :1");
        assert_eq!(rewrite("x = \"?\" AND y = ?", 1), "x = \"?\" AND y = :1");
        assert_eq!(rewrite("x = `?` AND y = ?", 1), "x = `?` AND y = :1");
    }

    #[test]
    fn escaped_quotes_stay_inside_the_literal() {
        assert_eq!(rewrite(r"x = 'it\'s ?' AND y = ?", 0), r"x = 'it\'s ?' AND y = :0");
        assert_eq!(rewrite(r#"x = "a\"?" AND y = ?"#, 0), r#"x = "a\"?" AND y = :0"#);
        assert_eq!(rewrite(r"x = `a\`?` AND y = ?", 0), r"x = `a\`?` AND y = :0");
        assert_eq!(rewrite("x = 'it''s ?' AND y = ?", 0), "x = 'it''s ?' AND y = :0");
    }

    #[test]
    fn other_quotes_inside_a_literal_do_not_close_it() {
        assert_eq!(rewrite("x = '\"?`' AND y = ?", 0), "x = '\"?`' AND y = :0");
    }

    #[test]
    fn multibyte_text_is_preserved() {
        assert_eq!(rewrite("x = 'äöü?' AND y = ? -- ß", 1), "x = 'äöü?' AND y = :1 -- ß");
    }

    #[test]
    fn unterminated_literals_are_rejected() {
        assert!(matches!(
            rewrite_positional("x = 'abc AND y = ?", 0),
            Err(RdsDataError::MalformedSql(_))
        ));
        assert!(matches!(
            rewrite_positional(r"x = 'abc\'", 0),
            Err(RdsDataError::MalformedSql(_))
        ));
    }

    #[test]
    fn borrows_when_nothing_changes() {
        let (sql, count) = rewrite_positional("SELECT '?'", 0).unwrap();
        assert!(matches!(sql, Cow::Borrowed(_)));
        assert_eq!(count, 0);
    }
}
