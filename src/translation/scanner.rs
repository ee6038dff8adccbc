use super::parsers::{
    is_block_comment_end, is_block_comment_start, is_escaped_close, is_line_comment_start,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum State {
    Normal,
    SingleQuoted,
    DoubleQuoted,
    Bracketed,
    LineComment,
    BlockComment(u32),
}

/// Byte-level walk over T-SQL that knows which bytes are live code.
///
/// `on_code` is called for every byte outside literals, quoted or bracketed
/// identifiers, and comments, plus the opening delimiter of each literal or
/// quoted identifier (so callers can tell a statement is not empty).
pub(super) fn scan(sql: &str, mut on_code: impl FnMut(usize, u8)) {
    let bytes = sql.as_bytes();
    let mut state = State::Normal;
    let mut idx = 0;

    while idx < bytes.len() {
        let b = bytes[idx];
        match state {
            State::Normal => match b {
                b'\'' | b'"' | b'[' => {
                    on_code(idx, b);
                    state = match b {
                        b'\'' => State::SingleQuoted,
                        b'"' => State::DoubleQuoted,
                        _ => State::Bracketed,
                    };
                }
                _ if is_line_comment_start(bytes, idx) => {
                    state = State::LineComment;
                    idx += 1;
                }
                _ if is_block_comment_start(bytes, idx) => {
                    state = State::BlockComment(1);
                    idx += 1;
                }
                _ => on_code(idx, b),
            },
            State::SingleQuoted => state = close_quoted(bytes, &mut idx, b'\'', state),
            State::DoubleQuoted => state = close_quoted(bytes, &mut idx, b'"', state),
            State::Bracketed => state = close_quoted(bytes, &mut idx, b']', state),
            State::LineComment => {
                if b == b'\n' {
                    state = State::Normal;
                }
            }
            State::BlockComment(depth) => {
                if is_block_comment_start(bytes, idx) {
                    state = State::BlockComment(depth + 1);
                    idx += 1;
                } else if is_block_comment_end(bytes, idx) {
                    state = if depth == 1 {
                        State::Normal
                    } else {
                        State::BlockComment(depth - 1)
                    };
                    idx += 1;
                }
            }
        }
        idx += 1;
    }
}

fn close_quoted(bytes: &[u8], idx: &mut usize, close: u8, current: State) -> State {
    if bytes[*idx] != close {
        return current;
    }
    if is_escaped_close(bytes, *idx, close) {
        *idx += 1; // skip escaped quote
        current
    } else {
        State::Normal
    }
}
