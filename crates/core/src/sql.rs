//! SQL text helpers for identifiers and literal lists.

/// Quotes an identifier, doubling embedded double quotes.
#[must_use]
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Renders integers as a parenthesized SQL list, e.g. `(1,2,3)`.
#[must_use]
pub fn sql_int_list(values: &[i64]) -> String {
    let items: Vec<String> = values.iter().map(i64::to_string).collect();
    format!("({})", items.join(","))
}

/// Renders strings as a parenthesized list of quoted literals, e.g. `('a','b')`.
///
/// Single quotes inside values are doubled.
#[must_use]
pub fn sql_str_list<S: AsRef<str>>(values: &[S]) -> String {
    let items: Vec<String> = values
        .iter()
        .map(|v| format!("'{}'", v.as_ref().replace('\'', "''")))
        .collect();
    format!("({})", items.join(","))
}
