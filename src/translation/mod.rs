//! T-SQL text helpers: positional placeholder rewriting and statement counting.
//!
//! Both walk the statement with a small state machine that skips string
//! literals, quoted and `[bracketed]` identifiers, and comments. It may still
//! miss exotic constructs; callers with such SQL can write `@P<n>` parameters
//! directly and turn translation off.

use std::borrow::Cow;

mod parsers;
mod scanner;

/// Rewrite `?` positional placeholders into SQL Server's `@P1`, `@P2`, ...
///
/// Returns a borrowed `Cow` when no changes are needed.
///
/// ```rust
/// use sql_helper::translation::translate_placeholders;
///
/// let sql = translate_placeholders("SELECT * FROM boards WHERE id = ? AND name <> '?'", true);
/// assert_eq!(sql, "SELECT * FROM boards WHERE id = @P1 AND name <> '?'");
/// ```
#[must_use]
pub fn translate_placeholders(sql: &str, enabled: bool) -> Cow<'_, str> {
    if !enabled {
        return Cow::Borrowed(sql);
    }

    let mut out: Option<String> = None;
    let mut copied_up_to = 0;
    let mut next_param = 1;

    scanner::scan(sql, |idx, b| {
        if b == b'?' {
            let buf = out.get_or_insert_with(|| String::with_capacity(sql.len() + 8));
            buf.push_str(&sql[copied_up_to..idx]);
            buf.push_str("@P");
            buf.push_str(&next_param.to_string());
            next_param += 1;
            copied_up_to = idx + 1;
        }
    });

    match out {
        Some(mut buf) => {
            buf.push_str(&sql[copied_up_to..]);
            Cow::Owned(buf)
        }
        None => Cow::Borrowed(sql),
    }
}

/// Count the top-level `;`-separated statements that contain any code.
///
/// T-SQL does not require terminators, so this is a lower bound for batches
/// that omit them.
#[must_use]
pub fn count_statements(sql: &str) -> usize {
    let mut count = 0;
    let mut pending = false;

    scanner::scan(sql, |_, b| match b {
        b';' => {
            if pending {
                count += 1;
            }
            pending = false;
        }
        _ if !b.is_ascii_whitespace() => pending = true,
        _ => {}
    });

    if pending {
        count += 1;
    }
    count
}
