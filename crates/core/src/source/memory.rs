use crate::domain::{AssetId, AssetPage, PermissionLevel, PhotoAsset};
use crate::error::{Error, Result};

use super::{parse_offset_cursor, AssetSource};

/// What [`MemoryAssetSource::delete_batch`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteBehavior {
    /// Remove the assets and report success.
    Succeed,
    /// Keep the assets and report `false`.
    Fail,
    /// Keep the assets and return an error.
    Error,
}

/// In-memory asset library.
///
/// Assets are served newest first. Listing and deletion outcomes can be
/// forced, and every batch delete request is recorded.
pub struct MemoryAssetSource {
    assets: Vec<PhotoAsset>,
    permission: PermissionLevel,
    fail_listing: bool,
    delete_behavior: DeleteBehavior,
    delete_calls: Vec<Vec<AssetId>>,
}

impl MemoryAssetSource {
    pub fn new(mut assets: Vec<PhotoAsset>) -> Self {
        assets.sort_by(|a, b| b.creation_time.cmp(&a.creation_time));
        Self {
            assets,
            permission: PermissionLevel::Full,
            fail_listing: false,
            delete_behavior: DeleteBehavior::Succeed,
            delete_calls: Vec::new(),
        }
    }

    pub fn with_permission(mut self, level: PermissionLevel) -> Self {
        self.permission = level;
        self
    }

    pub fn with_delete_behavior(mut self, behavior: DeleteBehavior) -> Self {
        self.delete_behavior = behavior;
        self
    }

    pub fn set_permission(&mut self, level: PermissionLevel) {
        self.permission = level;
    }

    pub fn set_delete_behavior(&mut self, behavior: DeleteBehavior) {
        self.delete_behavior = behavior;
    }

    /// Make subsequent `list_page` calls fail.
    pub fn set_fail_listing(&mut self, fail: bool) {
        self.fail_listing = fail;
    }

    pub fn insert(&mut self, asset: PhotoAsset) {
        let pos = self
            .assets
            .iter()
            .position(|a| a.creation_time < asset.creation_time)
            .unwrap_or(self.assets.len());
        self.assets.insert(pos, asset);
    }

    pub fn assets(&self) -> &[PhotoAsset] {
        &self.assets
    }

    /// Every id set passed to `delete_batch`, in call order.
    pub fn delete_calls(&self) -> &[Vec<AssetId>] {
        &self.delete_calls
    }
}

impl AssetSource for MemoryAssetSource {
    fn list_page(&mut self, page_size: usize, cursor: Option<&str>) -> Result<AssetPage> {
        if self.fail_listing {
            return Err(Error::Source("enumeration failed".to_string()));
        }
        let start = parse_offset_cursor(cursor)?.min(self.assets.len());
        let end = (start + page_size.max(1)).min(self.assets.len());
        let has_more = end < self.assets.len();
        Ok(AssetPage {
            assets: self.assets[start..end].to_vec(),
            next_cursor: has_more.then(|| end.to_string()),
            has_more,
        })
    }

    fn delete_batch(&mut self, ids: &[AssetId]) -> Result<bool> {
        self.delete_calls.push(ids.to_vec());
        match self.delete_behavior {
            DeleteBehavior::Succeed => {
                self.assets.retain(|a| !ids.contains(&a.id));
                Ok(true)
            }
            DeleteBehavior::Fail => Ok(false),
            DeleteBehavior::Error => Err(Error::Source("delete request rejected".to_string())),
        }
    }

    fn permission_level(&self) -> PermissionLevel {
        self.permission
    }
}
