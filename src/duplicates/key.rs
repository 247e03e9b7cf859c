//! Comparison key derivation.
//!
//! Two files are considered duplicates when their [`ComparisonKey`]s are
//! equal. The key is built from the basename, the size and the prefix
//! fingerprint; [`KeyFields`] selects which of these take part. Size is
//! always part of the key.
//!
//! # Example
//!
//! ```
//! use dupscan::duplicates::{ComparisonKey, KeyFields};
//! use dupscan::scanner::{FileDescriptor, Fingerprint};
//! use std::path::PathBuf;
//!
//! let a = FileDescriptor::new(PathBuf::from("/a/x.txt"), 10, Fingerprint::of_bytes(b"0123456789"));
//! let b = FileDescriptor::new(PathBuf::from("/b/y.txt"), 10, Fingerprint::of_bytes(b"0123456789"));
//!
//! // Default key includes the name, so these differ
//! assert_ne!(ComparisonKey::derive(&a, KeyFields::default()), ComparisonKey::derive(&b, KeyFields::default()));
//!
//! // Content-only key matches them
//! let content = KeyFields::content();
//! assert_eq!(ComparisonKey::derive(&a, content), ComparisonKey::derive(&b, content));
//! ```

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::scanner::{FileDescriptor, Fingerprint};

/// Names accepted by [`KeyFields::parse_list`].
pub const FIELD_NAMES: &[&str] = &["name", "size", "hash"];

/// Components that participate in a [`ComparisonKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyFields {
    /// Include the file basename.
    pub name: bool,
    /// Include the prefix fingerprint.
    pub hash: bool,
}

impl Default for KeyFields {
    fn default() -> Self {
        Self {
            name: true,
            hash: true,
        }
    }
}

/// Error for an unknown compare field.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("unknown compare field '{field}'{}", suggestion_suffix(.suggestion))]
pub struct KeyFieldsError {
    /// The rejected field name
    pub field: String,
    /// Closest valid name, if any is similar enough
    pub suggestion: Option<&'static str>,
}

fn suggestion_suffix(suggestion: &Option<&'static str>) -> String {
    suggestion
        .map(|s| format!(", did you mean '{s}'?"))
        .unwrap_or_default()
}

impl KeyFields {
    /// Key of size and fingerprint only, ignoring file names.
    #[must_use]
    pub fn content() -> Self {
        Self {
            name: false,
            hash: true,
        }
    }

    /// Key of name and size only, without reading file content.
    #[must_use]
    pub fn metadata() -> Self {
        Self {
            name: true,
            hash: false,
        }
    }

    /// Parse an explicit list of field names.
    ///
    /// An empty list yields the default fields. Otherwise only the listed
    /// fields are enabled (size is always on).
    ///
    /// # Errors
    ///
    /// Returns [`KeyFieldsError`] for any name not in [`FIELD_NAMES`].
    pub fn parse_list<I, S>(fields: I) -> Result<Self, KeyFieldsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selected = Self {
            name: false,
            hash: false,
        };
        let mut any = false;

        for field in fields {
            let field = field.as_ref().trim().to_lowercase();
            if field.is_empty() {
                continue;
            }
            any = true;
            match field.as_str() {
                "name" => selected.name = true,
                "size" => {}
                "hash" => selected.hash = true,
                _ => {
                    let suggestion = FIELD_NAMES
                        .iter()
                        .copied()
                        .find(|candidate| strsim::levenshtein(candidate, &field) <= 2);
                    return Err(KeyFieldsError { field, suggestion });
                }
            }
        }

        Ok(if any { selected } else { Self::default() })
    }
}

impl FromStr for KeyFields {
    type Err = KeyFieldsError;

    /// Parse a comma-separated list such as `"size,hash"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_list(s.split(','))
    }
}

impl fmt::Display for KeyFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::with_capacity(3);
        if self.name {
            parts.push("name");
        }
        parts.push("size");
        if self.hash {
            parts.push("hash");
        }
        write!(f, "{}", parts.join(","))
    }
}

/// Composite identity of a file for duplicate grouping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ComparisonKey {
    /// Basename, when names are compared
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Size in bytes
    pub size: u64,
    /// Prefix fingerprint, when content is compared
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<Fingerprint>,
}

impl ComparisonKey {
    /// Derive the key of `file` for the selected `fields`.
    #[must_use]
    pub fn derive(file: &FileDescriptor, fields: KeyFields) -> Self {
        Self {
            name: fields.name.then(|| file.name().to_owned()),
            size: file.size(),
            fingerprint: fields.hash.then(|| file.fingerprint()),
        }
    }
}

impl fmt::Display for ComparisonKey {
    /// Renders as `name:size:hash`, omitting disabled components.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            write!(f, "{name}:")?;
        }
        write!(f, "{}", self.size)?;
        if let Some(fp) = &self.fingerprint {
            write!(f, ":{fp}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn desc(path: &str, size: u64, content: &[u8]) -> FileDescriptor {
        FileDescriptor::new(PathBuf::from(path), size, Fingerprint::of_bytes(content))
    }

    #[test]
    fn test_default_fields() {
        let fields = KeyFields::default();
        assert!(fields.name);
        assert!(fields.hash);
        assert_eq!(fields.to_string(), "name,size,hash");
    }

    #[test]
    fn test_parse_list_selects_fields() {
        assert_eq!(
            KeyFields::parse_list(["size", "hash"]).unwrap(),
            KeyFields::content()
        );
        assert_eq!(
            KeyFields::parse_list(["name"]).unwrap(),
            KeyFields::metadata()
        );
        assert_eq!(
            KeyFields::parse_list(Vec::<String>::new()).unwrap(),
            KeyFields::default()
        );
    }

    #[test]
    fn test_from_str_comma_separated() {
        let fields: KeyFields = "Name, HASH".parse().unwrap();
        assert_eq!(fields, KeyFields::default());

        let fields: KeyFields = "".parse().unwrap();
        assert_eq!(fields, KeyFields::default());
    }

    #[test]
    fn test_unknown_field_with_suggestion() {
        let err = KeyFields::parse_list(["hsah"]).unwrap_err();
        assert_eq!(err.field, "hsah");
        assert_eq!(err.suggestion, Some("hash"));
        assert_eq!(
            err.to_string(),
            "unknown compare field 'hsah', did you mean 'hash'?"
        );

        let err = KeyFields::parse_list(["modified"]).unwrap_err();
        assert_eq!(err.suggestion, None);
        assert_eq!(err.to_string(), "unknown compare field 'modified'");
    }

    #[test]
    fn test_key_includes_selected_components() {
        let file = desc("/dir/a.txt", 10, b"0123456789");

        let key = ComparisonKey::derive(&file, KeyFields::default());
        assert_eq!(key.name.as_deref(), Some("a.txt"));
        assert_eq!(key.size, 10);
        assert_eq!(key.fingerprint, Some(Fingerprint::of_bytes(b"0123456789")));

        let key = ComparisonKey::derive(&file, KeyFields::metadata());
        assert!(key.fingerprint.is_none());
        assert_eq!(key.to_string(), "a.txt:10");
    }

    #[test]
    fn test_key_display() {
        let file = desc("/dir/a.txt", 3, b"abc");
        let fp = Fingerprint::of_bytes(b"abc");

        let key = ComparisonKey::derive(&file, KeyFields::default());
        assert_eq!(key.to_string(), format!("a.txt:3:{fp}"));

        let key = ComparisonKey::derive(&file, KeyFields::content());
        assert_eq!(key.to_string(), format!("3:{fp}"));
    }

    #[test]
    fn test_same_name_other_directory_is_equal() {
        let a = desc("/one/report.pdf", 5, b"12345");
        let b = desc("/two/report.pdf", 5, b"12345");
        let c = desc("/two/report.pdf", 5, b"54321");

        let fields = KeyFields::default();
        assert_eq!(
            ComparisonKey::derive(&a, fields),
            ComparisonKey::derive(&b, fields)
        );
        assert_ne!(
            ComparisonKey::derive(&a, fields),
            ComparisonKey::derive(&c, fields)
        );
    }
}
