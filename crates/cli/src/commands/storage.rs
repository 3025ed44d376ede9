use std::path::PathBuf;

use anyhow::Result;
use swipeaway_core::error::Error;
use swipeaway_core::source::AssetSource;
use swipeaway_core::storage_alert::{DiskSpace, Notifier, StorageCheck, StorageProbe};
use swipeaway_core::store::KeyValueStore;
use swipeaway_core::Swipeaway;

use super::format_size;

/// Free space of the volume holding `path`, via `statvfs`.
pub(crate) struct StatvfsProbe {
    path: PathBuf,
}

impl StorageProbe for StatvfsProbe {
    #[cfg(unix)]
    fn disk_space(&self) -> swipeaway_core::error::Result<DiskSpace> {
        use std::ffi::CString;
        use std::mem::MaybeUninit;
        use std::os::unix::ffi::OsStrExt;

        let c_path = CString::new(self.path.as_os_str().as_bytes())
            .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidInput, e)))?;
        let mut stat = MaybeUninit::<libc::statvfs>::uninit();

        // Safety: `c_path` is a valid NUL-terminated string and `stat` is
        // only read after a successful call.
        let ret = unsafe { libc::statvfs(c_path.as_ptr(), stat.as_mut_ptr()) };
        if ret != 0 {
            return Err(Error::Io(std::io::Error::last_os_error()));
        }
        let stat = unsafe { stat.assume_init() };
        let block_size = stat.f_frsize as u64;
        Ok(DiskSpace {
            free: stat.f_bavail as u64 * block_size,
            total: stat.f_blocks as u64 * block_size,
        })
    }

    #[cfg(not(unix))]
    fn disk_space(&self) -> swipeaway_core::error::Result<DiskSpace> {
        Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            format!("cannot read free space for {}", self.path.display()),
        )))
    }
}

/// Prints alerts to the terminal.
pub(crate) struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&mut self, title: &str, body: &str) -> swipeaway_core::error::Result<()> {
        println!("  \u{26a0} {title}");
        println!("    {body}");
        Ok(())
    }
}

pub fn run<K: KeyValueStore>(
    app: &mut Swipeaway<swipeaway_core::source::DirectoryAssetSource, K>,
) -> Result<()> {
    let probe = StatvfsProbe {
        path: app.source().root().to_path_buf(),
    };
    report(app, &probe)
}

fn report<S: AssetSource, K: KeyValueStore>(
    app: &mut Swipeaway<S, K>,
    probe: &dyn StorageProbe,
) -> Result<()> {
    match app.check_storage(probe, &mut TerminalNotifier, chrono::Utc::now())? {
        StorageCheck::CoolingDown { last_alert } => {
            println!(
                "  Already alerted at {}; next check after the cooldown.",
                last_alert.format("%Y-%m-%d %H:%M UTC")
            );
        }
        StorageCheck::Healthy(space) | StorageCheck::Notified(space) => {
            println!(
                "  {} free of {}.",
                format_size(space.free),
                format_size(space.total)
            );
        }
    }
    Ok(())
}
