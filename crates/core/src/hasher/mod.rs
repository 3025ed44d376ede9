use std::path::Path;

use sha2::{Digest, Sha256};

/// Derive a stable asset id from a library-relative path.
///
/// Path separators are normalised to `/` so the same library yields the same
/// ids on every platform.
pub fn asset_id(relative: &Path) -> String {
    let normalised = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    let mut hasher = Sha256::new();
    hasher.update(normalised.as_bytes());
    let result = hasher.finalize();
    format!("{:x}", result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_id_consistency() {
        let a = asset_id(Path::new("2024/06/IMG_0001.jpg"));
        let b = asset_id(Path::new("2024/06/IMG_0001.jpg"));
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_asset_id_different_paths() {
        assert_ne!(
            asset_id(Path::new("a/IMG_0001.jpg")),
            asset_id(Path::new("b/IMG_0001.jpg"))
        );
    }

    #[test]
    fn test_asset_id_known_value() {
        // Known SHA-256 of "hello world"
        assert_eq!(
            asset_id(Path::new("hello world")),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }
}
