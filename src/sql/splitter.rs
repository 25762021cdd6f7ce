use thiserror::Error;

/// Errors raised when a script cannot be tokenized.
///
/// Offsets are byte positions of the opening delimiter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SqlSplitError {
    #[error("unterminated string literal starting at byte {0}")]
    UnterminatedString(usize),

    #[error("unterminated quoted identifier starting at byte {0}")]
    UnterminatedIdentifier(usize),

    #[error("unterminated block comment starting at byte {0}")]
    UnterminatedComment(usize),

    #[error("unterminated dollar-quoted string starting at byte {0}")]
    UnterminatedDollarQuote(usize),
}

/// Splits a SQL script into individually executable statements.
///
/// Statement boundaries are semicolons outside of string literals
/// (`'..'` with `''` escapes, `E'..'` with backslash escapes), quoted
/// identifiers, `--` and nested `/* */` comments, and PostgreSQL dollar-quoted
/// bodies (`$$..$$`, `$tag$..$tag$`). Returned statements exclude the
/// terminator and any comments trailing the last token; leading comments are
/// kept. Segments holding nothing but whitespace and comments are dropped, and
/// a final statement without a terminator is still returned.
///
/// # Examples
///
/// ```
/// use revkit::sql::split_statements;
///
/// let stmts = split_statements("INSERT INTO notes VALUES ('a; b');\nDELETE FROM notes;").unwrap();
/// assert_eq!(stmts, vec!["INSERT INTO notes VALUES ('a; b')", "DELETE FROM notes"]);
/// ```
pub fn split_statements(sql: &str) -> Result<Vec<String>, SqlSplitError> {
    let bytes = sql.as_bytes();
    let mut statements = Vec::new();
    let mut start = 0;
    // End of the last code token in the current segment, if any
    let mut code_end: Option<usize> = None;
    let mut i = 0;

    while i < bytes.len() {
        let next = bytes.get(i + 1).copied();
        match bytes[i] {
            b'\'' => {
                let backslash_escapes = is_escape_string_prefix(bytes, i);
                i = skip_string(bytes, i, backslash_escapes)?;
                code_end = Some(i);
            }
            b'"' => {
                i = skip_quoted_identifier(bytes, i)?;
                code_end = Some(i);
            }
            b'-' if next == Some(b'-') => {
                i = skip_line_comment(bytes, i);
            }
            b'/' if next == Some(b'*') => {
                i = skip_block_comment(bytes, i)?;
            }
            b'$' => {
                i = match dollar_tag_len(bytes, i) {
                    Some(tag_len) => skip_dollar_quoted(sql, i, tag_len)?,
                    None => i + 1,
                };
                code_end = Some(i);
            }
            b';' => {
                if let Some(end) = code_end.take() {
                    statements.push(sql[start..end].trim().to_string());
                }
                i += 1;
                start = i;
            }
            b if b.is_ascii_whitespace() => i += 1,
            _ => {
                i += 1;
                code_end = Some(i);
            }
        }
    }

    if let Some(end) = code_end {
        statements.push(sql[start..end].trim().to_string());
    }

    Ok(statements)
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80
}

/// `E'..'` / `e'..'` literals, where the `E` is not the tail of an identifier.
fn is_escape_string_prefix(bytes: &[u8], quote: usize) -> bool {
    quote >= 1
        && matches!(bytes[quote - 1], b'E' | b'e')
        && (quote < 2 || !is_ident_byte(bytes[quote - 2]))
}

fn skip_string(bytes: &[u8], open: usize, backslash_escapes: bool) -> Result<usize, SqlSplitError> {
    let mut j = open + 1;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' if backslash_escapes => j += 2,
            b'\'' if bytes.get(j + 1) == Some(&b'\'') => j += 2,
            b'\'' => return Ok(j + 1),
            _ => j += 1,
        }
    }
    Err(SqlSplitError::UnterminatedString(open))
}

fn skip_quoted_identifier(bytes: &[u8], open: usize) -> Result<usize, SqlSplitError> {
    let mut j = open + 1;
    while j < bytes.len() {
        match bytes[j] {
            b'"' if bytes.get(j + 1) == Some(&b'"') => j += 2,
            b'"' => return Ok(j + 1),
            _ => j += 1,
        }
    }
    Err(SqlSplitError::UnterminatedIdentifier(open))
}

fn skip_line_comment(bytes: &[u8], open: usize) -> usize {
    bytes[open..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len(), |pos| open + pos + 1)
}

fn skip_block_comment(bytes: &[u8], open: usize) -> Result<usize, SqlSplitError> {
    let mut depth = 0usize;
    let mut j = open;
    while j + 1 < bytes.len() {
        match (bytes[j], bytes[j + 1]) {
            (b'/', b'*') => {
                depth += 1;
                j += 2;
            }
            (b'*', b'/') => {
                depth -= 1;
                j += 2;
                if depth == 0 {
                    return Ok(j);
                }
            }
            _ => j += 1,
        }
    }
    Err(SqlSplitError::UnterminatedComment(open))
}

/// Length of a dollar-quote opening tag at `open` (`$$` → 2, `$body$` → 6).
///
/// Positional parameters such as `$1` and `$` inside identifiers are not tags.
fn dollar_tag_len(bytes: &[u8], open: usize) -> Option<usize> {
    if open > 0 && is_ident_byte(bytes[open - 1]) {
        return None;
    }
    let mut j = open + 1;
    if let Some(&first) = bytes.get(j) {
        if first.is_ascii_digit() {
            return None;
        }
    }
    while let Some(&b) = bytes.get(j) {
        if b == b'$' {
            return Some(j + 1 - open);
        }
        if !(b.is_ascii_alphanumeric() || b == b'_') {
            return None;
        }
        j += 1;
    }
    None
}

fn skip_dollar_quoted(sql: &str, open: usize, tag_len: usize) -> Result<usize, SqlSplitError> {
    let tag = &sql[open..open + tag_len];
    let body = open + tag_len;
    sql[body..]
        .find(tag)
        .map(|pos| body + pos + tag_len)
        .ok_or(SqlSplitError::UnterminatedDollarQuote(open))
}
