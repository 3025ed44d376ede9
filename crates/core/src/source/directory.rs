use std::collections::HashMap;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::domain::{AssetId, AssetPage, MediaType, PermissionLevel, PhotoAsset};
use crate::error::{Error, Result};
use crate::hasher;

use super::{parse_offset_cursor, AssetSource};

const PHOTO_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tif", "tiff", "webp", "heic", "heif"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "m4v"];

/// A file found by the directory walk, before metadata extraction.
#[derive(Debug, Clone)]
struct IndexedFile {
    id: AssetId,
    path: PathBuf,
    media_type: MediaType,
    size: u64,
    /// Epoch milliseconds.
    mtime: i64,
}

/// Photo library backed by a directory tree.
///
/// A fresh enumeration (`cursor == None`) re-walks the tree; pages are then
/// served from that snapshot, newest file first by modification time. EXIF
/// and pixel dimensions are read per page, so creation times inside a page
/// follow the EXIF capture date when one exists.
///
/// Paging order is file mtime, not capture time. When the catalog cap cuts
/// the enumeration short, the photos kept are the most recently modified
/// files, which can differ from the most recently taken ones.
///
/// Entries below the root that cannot be read are logged and skipped; only
/// an unreadable root fails the walk.
pub struct DirectoryAssetSource {
    root: PathBuf,
    /// Offset used to interpret zone-less EXIF timestamps.
    offset: FixedOffset,
    index: Vec<IndexedFile>,
    by_id: HashMap<AssetId, PathBuf>,
}

impl DirectoryAssetSource {
    pub fn open(root: &Path, offset: FixedOffset) -> Result<Self> {
        if !root.exists() {
            return Err(Error::SourceNotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(Error::SourceNotDirectory(root.to_path_buf()));
        }
        Ok(Self {
            root: root.canonicalize()?,
            offset,
            index: Vec::new(),
            by_id: HashMap::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn reindex(&mut self) -> Result<()> {
        let mut files = Vec::new();
        let mut skipped = 0usize;
        for entry in WalkDir::new(&self.root).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => return Err(err.into()),
                Err(err) => {
                    tracing::warn!(%err, "skipping unreadable entry");
                    skipped += 1;
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(media_type) = media_type_for(entry.path()) else {
                continue;
            };
            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(err) => {
                    tracing::warn!(path = %entry.path().display(), %err, "skipping unreadable file");
                    skipped += 1;
                    continue;
                }
            };
            let mtime = metadata
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_millis() as i64)
                .unwrap_or(0);
            let relative = entry.path().strip_prefix(&self.root).unwrap_or(entry.path());
            files.push(IndexedFile {
                id: hasher::asset_id(relative),
                path: entry.path().to_path_buf(),
                media_type,
                size: metadata.len(),
                mtime,
            });
        }

        files.sort_by(|a, b| b.mtime.cmp(&a.mtime).then_with(|| a.path.cmp(&b.path)));
        self.by_id = files.iter().map(|f| (f.id.clone(), f.path.clone())).collect();
        self.index = files;
        tracing::debug!(
            root = %self.root.display(),
            files = self.index.len(),
            skipped,
            "indexed library"
        );
        Ok(())
    }

    fn describe(&self, file: &IndexedFile) -> PhotoAsset {
        let (width, height) = match file.media_type {
            MediaType::Photo => image::image_dimensions(&file.path).unwrap_or((0, 0)),
            MediaType::Video => (0, 0),
        };
        let creation_time = read_exif_capture_time(&file.path)
            .and_then(|naive| self.offset.from_local_datetime(&naive).single())
            .map(|dt| dt.timestamp_millis())
            .unwrap_or(file.mtime);

        PhotoAsset {
            id: file.id.clone(),
            uri: file.path.to_string_lossy().into_owned(),
            filename: file
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            media_type: file.media_type,
            width,
            height,
            creation_time,
            modification_time: file.mtime,
            file_size: Some(file.size),
            duration: None,
        }
    }
}

impl AssetSource for DirectoryAssetSource {
    fn list_page(&mut self, page_size: usize, cursor: Option<&str>) -> Result<AssetPage> {
        if cursor.is_none() {
            self.reindex()?;
        }
        let start = parse_offset_cursor(cursor)?.min(self.index.len());
        let end = (start + page_size.max(1)).min(self.index.len());

        let assets: Vec<PhotoAsset> = self.index[start..end]
            .par_iter()
            .map(|file| self.describe(file))
            .collect();

        let has_more = end < self.index.len();
        Ok(AssetPage {
            assets,
            next_cursor: has_more.then(|| end.to_string()),
            has_more,
        })
    }

    fn delete_batch(&mut self, ids: &[AssetId]) -> Result<bool> {
        let mut all_removed = true;
        for id in ids {
            let Some(path) = self.by_id.get(id) else {
                tracing::warn!(%id, "delete requested for unknown asset");
                all_removed = false;
                continue;
            };
            if let Err(err) = std::fs::remove_file(path) {
                tracing::warn!(path = %path.display(), %err, "failed to delete asset");
                all_removed = false;
                continue;
            }
            self.by_id.remove(id);
        }
        self.index.retain(|f| self.by_id.contains_key(&f.id));
        Ok(all_removed)
    }

    fn permission_level(&self) -> PermissionLevel {
        if std::fs::read_dir(&self.root).is_err() {
            return PermissionLevel::None;
        }
        match std::fs::metadata(&self.root) {
            Ok(meta) if meta.permissions().readonly() => PermissionLevel::Limited,
            Ok(_) => PermissionLevel::Full,
            Err(_) => PermissionLevel::None,
        }
    }
}

fn media_type_for(path: &Path) -> Option<MediaType> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    if PHOTO_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaType::Photo)
    } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaType::Video)
    } else {
        None
    }
}

fn read_exif_capture_time(path: &Path) -> Option<NaiveDateTime> {
    let file = std::fs::File::open(path).ok()?;
    let mut reader = BufReader::new(file);
    let exif = exif::Reader::new().read_from_container(&mut reader).ok()?;
    let field = exif
        .get_field(exif::Tag::DateTimeOriginal, exif::In::PRIMARY)
        .or_else(|| exif.get_field(exif::Tag::DateTimeDigitized, exif::In::PRIMARY))?;
    parse_exif_datetime(&field.display_value().to_string())
}

/// Parse an EXIF timestamp.
/// Handles both "2024-01-15 12:00:00" (display_value) and "2024:01:15 12:00:00" (raw EXIF).
/// A missing time part means midnight.
pub fn parse_exif_datetime(raw: &str) -> Option<NaiveDateTime> {
    let mut parts = raw.split_whitespace();
    let date_part = parts.next()?;
    let fields: Vec<&str> = date_part.split([':', '-']).collect();
    if fields.len() < 3 {
        return None;
    }
    let year: i32 = fields[0].parse().ok()?;
    let month: u32 = fields[1].parse().ok()?;
    let day: u32 = fields[2].parse().ok()?;
    if !(1970..=2100).contains(&year) {
        return None;
    }
    let date = NaiveDate::from_ymd_opt(year, month, day)?;

    let (hour, minute, second) = match parts.next() {
        Some(time) => {
            let t: Vec<u32> = time
                .split(':')
                .map(|s| s.parse().ok())
                .collect::<Option<Vec<_>>>()?;
            (
                t.first().copied().unwrap_or(0),
                t.get(1).copied().unwrap_or(0),
                t.get(2).copied().unwrap_or(0),
            )
        }
        None => (0, 0, 0),
    };
    date.and_hms_opt(hour, minute, second)
}
