//! `prefix__field[__operator]` key splitting.

use crate::Error;

const KEY_DELIMITER: &str = "__";

/// A parsed filter or order key. The prefix is not validated here.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FilterKey<'a> {
    pub prefix: &'a str,
    pub field: &'a str,
    /// Explicit operator token; `None` for 2-segment keys.
    pub operator: Option<&'a str>,
}

/// Split `key` on `__` into 2 or 3 segments.
///
/// Any other segment count, an empty field, or an empty operator segment is a
/// [`Error::MalformedFilterKey`].
pub fn parse_filter_key(key: &str) -> Result<FilterKey<'_>, Error> {
    let segments: Vec<&str> = key.split(KEY_DELIMITER).collect();
    let parsed = match *segments.as_slice() {
        [prefix, field] => FilterKey {
            prefix,
            field,
            operator: None,
        },
        [prefix, field, operator] => FilterKey {
            prefix,
            field,
            operator: Some(operator),
        },
        _ => return Err(Error::MalformedFilterKey(key.to_string())),
    };

    if parsed.field.is_empty() || parsed.operator.is_some_and(str::is_empty) {
        return Err(Error::MalformedFilterKey(key.to_string()));
    }
    Ok(parsed)
}
