//! Parsing of values typed by a user, one at a time or as a batch.

use std::num::ParseIntError;

use thiserror::Error;

/// Why a single value could not be parsed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("no value given")]
    Empty,
    #[error("`{token}` is not an integer")]
    Invalid {
        token: String,
        #[source]
        source: ParseIntError,
    },
}

/// Parses a single decimal integer, ignoring surrounding whitespace.
///
/// ```
/// use avl_engine::input::{parse_value, InputError};
/// assert_eq!(parse_value(" 42 "), Ok(42));
/// assert_eq!(parse_value(""), Err(InputError::Empty));
/// ```
pub fn parse_value(input: &str) -> Result<i64, InputError> {
    let token = input.trim();
    if token.is_empty() {
        return Err(InputError::Empty);
    }
    token.parse().map_err(|source| InputError::Invalid {
        token: token.to_owned(),
        source,
    })
}

/// Parses a list of integers separated by commas and/or whitespace.
/// Tokens that are not integers are skipped. Order and repeated values are kept.
pub fn parse_batch(input: &str) -> Vec<i64> {
    input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .filter_map(|token| token.parse().ok())
        .collect()
}
