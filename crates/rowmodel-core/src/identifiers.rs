//! Quoting for identifiers and string literals embedded in generated SQL.

/// Quote a MySQL identifier with backticks, doubling any embedded backtick.
///
/// ```
/// use rowmodel_core::quote_ident;
///
/// assert_eq!(quote_ident("LogHistory"), "`LogHistory`");
/// assert_eq!(quote_ident("odd`name"), "`odd``name`");
/// ```
pub fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Quote a string literal for MySQL.
///
/// Single quotes are doubled; backslashes and NUL are escaped as the default
/// `sql_mode` expects (not `NO_BACKSLASH_ESCAPES`).
///
/// ```
/// use rowmodel_core::quote_string;
///
/// assert_eq!(quote_string("it's"), "'it''s'");
/// assert_eq!(quote_string(r"C:\tmp"), r"'C:\\tmp'");
/// ```
pub fn quote_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for ch in value.chars() {
        match ch {
            '\'' => out.push_str("''"),
            '\\' => out.push_str("\\\\"),
            '\0' => out.push_str("\\0"),
            _ => out.push(ch),
        }
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_string_plain() {
        assert_eq!(quote_string("Alice"), "'Alice'");
        assert_eq!(quote_string(""), "''");
    }

    #[test]
    fn test_quote_string_injection_attempt() {
        assert_eq!(
            quote_string("x'; DROP TABLE users; --"),
            "'x''; DROP TABLE users; --'"
        );
    }
}
