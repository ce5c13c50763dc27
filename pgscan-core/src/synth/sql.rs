//! Quoting for generated SQL and psql text.
//!
//! Identifiers, literals, LIKE patterns and psql meta-command arguments each
//! have their own escaping rules; nothing from the catalog or the search
//! terms reaches the generated script without passing through one of these.

/// Quotes an identifier, doubling embedded double quotes.
///
/// Always quotes, so mixed case, reserved words and punctuation survive
/// unchanged.
///
/// ```rust
/// use pgscan_core::synth::quote_ident;
///
/// assert_eq!(quote_ident("Order"), "\"Order\"");
/// assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
/// ```
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Schema-qualified, quoted table name.
pub fn qualified_name(schema: &str, table: &str) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(table))
}

/// Quotes a string literal the way PostgreSQL's `quote_literal` does.
///
/// Single quotes are doubled. A value containing a backslash is emitted as
/// an `E'...'` string with the backslashes doubled, so the result reads the
/// same whatever `standard_conforming_strings` is set to.
///
/// ```rust
/// use pgscan_core::synth::quote_literal;
///
/// assert_eq!(quote_literal("O'Brien"), "'O''Brien'");
/// assert_eq!(quote_literal("a\\b"), "E'a\\\\b'");
/// ```
pub fn quote_literal(value: &str) -> String {
    let escaped = value.replace('\'', "''");
    if escaped.contains('\\') {
        format!("E'{}'", escaped.replace('\\', "\\\\"))
    } else {
        format!("'{}'", escaped)
    }
}

/// Escapes LIKE metacharacters using the default `\` escape character.
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// LIKE pattern matching any value that contains `term` literally.
///
/// ```rust
/// use pgscan_core::synth::contains_pattern;
///
/// assert_eq!(contains_pattern("50%"), "%50\\%%");
/// ```
pub fn contains_pattern(term: &str) -> String {
    format!("%{}%", escape_like(term))
}

/// Picks a dollar-quote tag that does not occur in `body`.
///
/// Starts with `$<base>$` and appends a counter until the tag is unused.
pub fn dollar_quote_tag(body: &str, base: &str) -> String {
    let mut tag = format!("${}$", base);
    let mut counter = 1u32;
    while body.contains(&tag) {
        tag = format!("${}{}$", base, counter);
        counter = counter.saturating_add(1);
    }
    tag
}

/// Quotes an argument for a psql meta-command such as `\echo`.
///
/// psql interprets C-style escapes inside single-quoted arguments, so
/// backslashes and control characters are escaped as well as quotes.
pub fn psql_quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('\'');
    for c in text.chars() {
        match c {
            '\'' => quoted.push_str("''"),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c if c.is_control() => quoted.push(' '),
            c => quoted.push(c),
        }
    }
    quoted.push('\'');
    quoted
}

/// Flattens text for a single-line `--` comment.
pub fn comment_text(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}
