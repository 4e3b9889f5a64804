//! Backend entry naming.
//!
//! Every cell payload is stored under a [`CacheName`] of the form
//! `{tag}:{resolution}:{cell}` (e.g. `ring:6:6/25/54`). The tag names the
//! cache variant so that differently configured caches sharing one backend
//! never read or overwrite each other's entries.

use std::fmt;

use crate::config::ConfigError;

/// Separator between name components. Tags may not contain it.
pub const NAME_SEPARATOR: char = ':';

/// Name of one cell's backend entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheName(String);

impl CacheName {
    /// The name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the name, returning the backend key.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CacheName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Derives backend entry names for one cache variant.
///
/// Naming is a pure function of `(tag, resolution, cell)`. Because the tag
/// is separator-free and the resolution is numeric, the first two separators
/// always delimit the tag and resolution, so distinct triples cannot produce
/// the same name as long as the cell's `Display` is injective.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKeyBuilder {
    tag: String,
}

impl CacheKeyBuilder {
    /// Create a builder for `tag`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTag`] if the tag is empty or contains
    /// [`NAME_SEPARATOR`].
    pub fn new(tag: impl Into<String>) -> Result<Self, ConfigError> {
        let tag = tag.into();
        validate_tag(&tag)?;
        Ok(Self { tag })
    }

    /// The cache variant tag.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Name the backend entry for `cell` at `resolution`.
    pub fn name<C: fmt::Display + ?Sized>(&self, resolution: u8, cell: &C) -> CacheName {
        CacheName(format!(
            "{}{sep}{}{sep}{}",
            self.tag,
            resolution,
            cell,
            sep = NAME_SEPARATOR
        ))
    }
}

/// Check that `tag` can be used as a name prefix.
pub(crate) fn validate_tag(tag: &str) -> Result<(), ConfigError> {
    if tag.is_empty() || tag.contains(NAME_SEPARATOR) {
        return Err(ConfigError::InvalidTag(tag.to_string()));
    }
    Ok(())
}
