//! Key Construction Module
//!
//! Builds composite cache keys from structured identifiers.
//!
//! Callers namespace keys by resource kind plus identifying parameters
//! (e.g. `asistencia:month:2024:3`), which keeps keys human-readable and
//! makes pattern invalidation usable as "invalidate everything about
//! resource X" without enumerating exact keys.

use crate::cache::KEY_DELIMITER;

// == Key Part ==
/// One component of a composite key: a string or an integer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyPart {
    Text(String),
    Number(i64),
}

impl std::fmt::Display for KeyPart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyPart::Text(s) => f.write_str(s),
            KeyPart::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for KeyPart {
    fn from(s: &str) -> Self {
        KeyPart::Text(s.to_string())
    }
}

impl From<String> for KeyPart {
    fn from(s: String) -> Self {
        KeyPart::Text(s)
    }
}

impl From<i64> for KeyPart {
    fn from(n: i64) -> Self {
        KeyPart::Number(n)
    }
}

impl From<i32> for KeyPart {
    fn from(n: i32) -> Self {
        KeyPart::Number(i64::from(n))
    }
}

impl From<u32> for KeyPart {
    fn from(n: u32) -> Self {
        KeyPart::Number(i64::from(n))
    }
}

impl From<usize> for KeyPart {
    fn from(n: usize) -> Self {
        KeyPart::Number(n as i64)
    }
}

// == Make Key ==
/// Joins an ordered sequence of parts with `':'`.
///
/// Pure and total: never fails for well-formed inputs, performs no I/O.
///
/// # Example
/// ```
/// use query_cache::make_key;
///
/// let key = make_key(["asistencia".into(), 2024.into(), 3.into()]);
/// assert_eq!(key, "asistencia:2024:3");
/// ```
pub fn make_key(parts: impl IntoIterator<Item = KeyPart>) -> String {
    let mut key = String::new();
    for part in parts {
        if !key.is_empty() {
            key.push(KEY_DELIMITER);
        }
        match part {
            KeyPart::Text(s) => key.push_str(&s),
            KeyPart::Number(n) => {
                use std::fmt::Write;
                // infallible on String
                let _ = write!(key, "{}", n);
            }
        }
    }
    key
}

/// Variadic convenience wrapper around [`make_key`].
///
/// # Example
/// ```
/// use query_cache::cache_key;
///
/// assert_eq!(cache_key!("empleado", 42, "contratos"), "empleado:42:contratos");
/// ```
#[macro_export]
macro_rules! cache_key {
    ($($part:expr),+ $(,)?) => {
        $crate::cache::make_key([$($crate::cache::KeyPart::from($part)),+])
    };
}
