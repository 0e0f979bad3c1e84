//! Identifier and literal handling for generated SQL, plus credential storage.
//!
//! Every query the profiler issues is built by string interpolation. Schema,
//! table and column names are validated and double-quoted before they reach a
//! query; string literals have their single quotes doubled.

use crate::error::{ProfileError, Result};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Longest identifier accepted in generated SQL.
pub const MAX_IDENTIFIER_LENGTH: usize = 128;

/// A secure string that automatically clears its contents when dropped.
#[derive(Clone, ZeroizeOnDrop)]
pub struct SecureString(String);

impl std::fmt::Debug for SecureString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecureString(***)")
    }
}

impl SecureString {
    /// Create a new secure string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Get the string value. Use carefully and avoid storing the result.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Convert to a regular string. The SecureString will be zeroized.
    pub fn into_string(mut self) -> String {
        let value = std::mem::take(&mut self.0);
        self.0.zeroize();
        value
    }
}

impl From<String> for SecureString {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SecureString {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// SQL identifier validation and escaping utilities.
pub struct SqlSecurity;

impl SqlSecurity {
    /// Validates and quotes a SQL identifier (schema, table or column name).
    ///
    /// The identifier is wrapped in double quotes and embedded double quotes
    /// are doubled, so names with spaces, mixed case or punctuation survive
    /// intact and cannot terminate the quoted token.
    ///
    /// # Examples
    /// ```rust
    /// use table_profiler::security::SqlSecurity;
    ///
    /// assert_eq!(SqlSecurity::escape_identifier("order date").unwrap(), "\"order date\"");
    /// assert_eq!(SqlSecurity::escape_identifier("a\"b").unwrap(), "\"a\"\"b\"");
    /// assert!(SqlSecurity::escape_identifier("").is_err());
    /// ```
    pub fn escape_identifier(identifier: &str) -> Result<String> {
        Self::validate_identifier(identifier)?;
        let escaped = identifier.replace('"', "\"\"");
        Ok(format!("\"{escaped}\""))
    }

    /// Validates an identifier and renders it as a single-quoted string literal,
    /// for comparisons against catalog columns such as `table_name`.
    pub fn quote_identifier_literal(identifier: &str) -> Result<String> {
        Self::validate_identifier(identifier)?;
        Ok(Self::quote_literal(identifier))
    }

    /// Renders a string as a single-quoted SQL literal.
    pub fn quote_literal(value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }

    /// Validates a SQL identifier without escaping it.
    pub fn validate_identifier(identifier: &str) -> Result<()> {
        if identifier.trim().is_empty() {
            return Err(ProfileError::security(
                "SQL identifier cannot be empty or whitespace-only",
            ));
        }

        if identifier.chars().count() > MAX_IDENTIFIER_LENGTH {
            return Err(ProfileError::security(format!(
                "SQL identifier too long (max {MAX_IDENTIFIER_LENGTH} characters)"
            )));
        }

        if identifier.chars().any(char::is_control) {
            return Err(ProfileError::security(
                "SQL identifier cannot contain control characters",
            ));
        }

        Ok(())
    }
}
