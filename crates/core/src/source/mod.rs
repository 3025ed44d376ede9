//! Device photo library boundary.
//!
//! The review engine never touches the platform media API directly; it talks
//! to an [`AssetSource`]. Each target plugs in its own provider behind this
//! one trait: [`DirectoryAssetSource`] for a folder on disk,
//! [`MemoryAssetSource`] for tests and placeholder content.

pub mod directory;
pub mod memory;

pub use directory::DirectoryAssetSource;
pub use memory::{DeleteBehavior, MemoryAssetSource};

use crate::domain::{AssetId, AssetPage, PermissionLevel};
use crate::error::Result;

/// Paged enumeration and batch deletion of library assets.
///
/// Implementations may be slow, partial, or fail outright; callers treat
/// every error as transient.
pub trait AssetSource {
    /// Fetch up to `page_size` assets starting after `cursor`
    /// (`None` starts a fresh enumeration).
    fn list_page(&mut self, page_size: usize, cursor: Option<&str>) -> Result<AssetPage>;

    /// Physically delete every asset in `ids` in a single operation.
    ///
    /// The result is coarse: `true` when the platform reported success,
    /// `false` otherwise. There is no per-id outcome.
    fn delete_batch(&mut self, ids: &[AssetId]) -> Result<bool>;

    fn permission_level(&self) -> PermissionLevel;
}

/// Parse an offset cursor as produced by the bundled sources.
pub(crate) fn parse_offset_cursor(cursor: Option<&str>) -> Result<usize> {
    match cursor {
        None => Ok(0),
        Some(raw) => raw
            .parse()
            .map_err(|_| crate::error::Error::Source(format!("invalid cursor: {raw}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_offset_cursor() {
        assert_eq!(parse_offset_cursor(None).unwrap(), 0);
        assert_eq!(parse_offset_cursor(Some("500")).unwrap(), 500);
        assert!(parse_offset_cursor(Some("abc")).is_err());
    }
}
