use std::io::{self, BufRead, Write};

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use swipeaway_core::domain::{PhotoAsset, ReviewMode, SwipeAction};
use swipeaway_core::reconcile::FlushOutcome;
use swipeaway_core::session::SessionOutcome;
use swipeaway_core::source::AssetSource;
use swipeaway_core::store::KeyValueStore;
use swipeaway_core::{SessionSummary, Swipeaway};

use super::{format_size, load_library};
use crate::ReviewArg;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Key {
    Keep,
    Delete,
    Undo,
    Bookmark,
    Info,
    Quit,
}

pub(crate) fn parse_key(line: &str) -> Option<Key> {
    match line.trim().to_ascii_lowercase().as_str() {
        "k" | "keep" => Some(Key::Keep),
        "d" | "delete" => Some(Key::Delete),
        "u" | "undo" => Some(Key::Undo),
        "b" | "bookmark" => Some(Key::Bookmark),
        "i" | "info" => Some(Key::Info),
        "q" | "quit" | "done" => Some(Key::Quit),
        _ => None,
    }
}

pub(crate) fn review_mode(arg: ReviewArg, today: NaiveDate) -> ReviewMode {
    match arg {
        ReviewArg::Recents => ReviewMode::Recents,
        ReviewArg::Random => ReviewMode::Random,
        ReviewArg::Month { id } => ReviewMode::Month(id),
        ReviewArg::OnThisDay => ReviewMode::OnThisDay(today),
        ReviewArg::All => ReviewMode::All,
    }
}

pub(crate) fn describe_flush(outcome: &FlushOutcome) -> String {
    match outcome {
        FlushOutcome::Nothing => "Nothing to delete.".to_string(),
        FlushOutcome::Deleted(n) => format!("Deleted {n} photo(s)."),
        FlushOutcome::Failed(n) => format!(
            "{n} photo(s) could not be deleted right now; they are hidden until the next refresh."
        ),
        FlushOutcome::PermissionDenied(level, n) => format!(
            "{n} photo(s) were not deleted: photo access is {level}. \
             Allow full access in system settings, then review again."
        ),
    }
}

fn print_card<S: AssetSource, K: KeyValueStore>(app: &Swipeaway<S, K>, photo: &PhotoAsset) {
    let review = app.review();
    let offset = app.catalog().offset();
    let star = if app.is_bookmarked(&photo.id) { " \u{2605}" } else { "" };
    println!();
    println!(
        "  [{}] {}{}  {}  {}",
        review.progress(),
        photo.filename,
        star,
        photo.created_at(offset).format("%Y-%m-%d"),
        format_size(photo.effective_size(&app.config().size_estimate)),
    );
}

fn print_info<S: AssetSource, K: KeyValueStore>(app: &Swipeaway<S, K>, photo: &PhotoAsset) {
    let offset = app.catalog().offset();
    println!("    id:       {}", photo.id);
    println!("    location: {}", photo.uri);
    println!("    taken:    {}", photo.created_at(offset).format("%Y-%m-%d %H:%M:%S"));
    println!("    pixels:   {}x{}", photo.width, photo.height);
    match photo.file_size {
        Some(size) => println!("    size:     {}", format_size(size)),
        None => println!(
            "    size:     ~{} (estimated)",
            format_size(photo.effective_size(&app.config().size_estimate))
        ),
    }
    if let Some(session) = app.review().session() {
        println!(
            "    session:  {} kept, {} deleted, {} to free",
            session.photos_kept,
            session.photos_deleted,
            format_size(session.space_saved)
        );
    }
}

fn print_summary(summary: &SessionSummary) {
    let s = &summary.session;
    println!();
    match summary.outcome {
        SessionOutcome::Exhausted => println!("  All done!"),
        SessionOutcome::Abandoned => println!("  Review ended early."),
    }
    println!(
        "  Reviewed {} (kept {}, deleted {}), {} freed.",
        s.photos_reviewed,
        s.photos_kept,
        s.photos_deleted,
        format_size(s.space_saved)
    );
    println!("  {}", describe_flush(&summary.flush));
    if let Some(month) = &summary.completed_month {
        println!("  Month {month} marked as reviewed.");
    }
    if !summary.stats_persisted {
        println!("  warning: stats could not be saved.");
    }
    println!();
}

pub fn run<S: AssetSource, K: KeyValueStore>(app: &mut Swipeaway<S, K>, arg: ReviewArg) -> Result<()> {
    load_library(app)?;
    if let ReviewArg::Month { id } = &arg {
        app.month(id)?;
    }
    if let Err(e) = app.ensure_delete_permission() {
        println!("  {e}");
        println!("  You can still review; deletions will be skipped.");
    }

    let today = Utc::now().with_timezone(app.catalog().offset()).date_naive();
    app.start_review(review_mode(arg, today))?;
    if app.review().queue_len() == 0 {
        println!("  No photos to review here.");
    }

    let stdin = io::stdin();
    let looped = swipe_loop(app, &mut stdin.lock());

    // Reconcile whatever was decided even when the input broke off.
    if let Some(summary) = app.end_review() {
        print_summary(&summary);
    }
    looped
}

/// Read one command per line from `input` until the queue runs out, the
/// user quits, or the input ends. Lines that are not valid UTF-8 count as
/// unknown keys.
pub(crate) fn swipe_loop<S, K, R>(app: &mut Swipeaway<S, K>, input: &mut R) -> Result<()>
where
    S: AssetSource,
    K: KeyValueStore,
    R: BufRead,
{
    let haptics = app.settings().haptic_feedback;
    let mut buf = Vec::new();

    while let Some(photo) = app.review().current().cloned() {
        print_card(app, &photo);
        print!("  [k]eep [d]elete [u]ndo [b]ookmark [i]nfo [q]uit > ");
        io::stdout().flush()?;

        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        match parse_key(&String::from_utf8_lossy(&buf)) {
            Some(Key::Keep) => {
                if let Some(outcome) = app.decide(SwipeAction::Keep) {
                    paywall_notice(outcome.show_paywall);
                }
            }
            Some(Key::Delete) => {
                if let Some(outcome) = app.decide(SwipeAction::Delete) {
                    if haptics {
                        print!("\x07");
                    }
                    println!("  Marked for deletion ({}).", format_size(outcome.size));
                    paywall_notice(outcome.show_paywall);
                }
            }
            Some(Key::Undo) => match app.undo() {
                Some(item) => println!("  Undid {} of {}.", item.action, item.photo.filename),
                None => println!("  Nothing to undo."),
            },
            Some(Key::Bookmark) => match app.toggle_current_bookmark() {
                Ok(true) => println!("  Bookmarked."),
                Ok(false) => println!("  Bookmark removed."),
                Err(e) => println!("  warning: {e}"),
            },
            Some(Key::Info) => print_info(app, &photo),
            Some(Key::Quit) => break,
            None => println!("  Unknown key."),
        }
    }
    Ok(())
}

fn paywall_notice(show: bool) {
    if show {
        println!();
        println!("  \u{2728} Go premium to swipe without interruptions (run with --premium).");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use std::io::{BufReader, Cursor, Read};
    use swipeaway_core::config::EngineConfig;
    use swipeaway_core::domain::{MediaType, PermissionLevel};
    use swipeaway_core::source::MemoryAssetSource;
    use swipeaway_core::store::MemoryStore;

    fn photo(id: &str, creation_time: i64) -> PhotoAsset {
        PhotoAsset {
            id: id.to_string(),
            uri: format!("mem://{id}"),
            filename: format!("{id}.jpg"),
            media_type: MediaType::Photo,
            width: 100,
            height: 100,
            creation_time,
            modification_time: creation_time,
            file_size: Some(1_000),
            duration: None,
        }
    }

    fn app() -> Swipeaway<MemoryAssetSource, MemoryStore> {
        let source = MemoryAssetSource::new(vec![
            photo("p1", 1_718_000_000_000),
            photo("p2", 1_717_000_000_000),
        ]);
        let utc = FixedOffset::east_opt(0).unwrap();
        let mut app = Swipeaway::new(source, MemoryStore::new(), EngineConfig::default(), utc);
        app.refresh_library(None).unwrap();
        app.start_review(ReviewMode::All).unwrap();
        app
    }

    /// Serves its bytes, then fails every later read.
    struct BrokenInput(Cursor<Vec<u8>>);

    impl Read for BrokenInput {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.0.read(buf)? {
                0 => Err(io::Error::other("terminal went away")),
                n => Ok(n),
            }
        }
    }

    #[test]
    fn test_invalid_utf8_line_is_an_unknown_key() {
        let mut app = app();
        let mut input = Cursor::new(b"d\n\xff\xfe\nq\n".to_vec());
        swipe_loop(&mut app, &mut input).unwrap();

        let summary = app.end_review().unwrap();
        assert_eq!(summary.session.photos_deleted, 1);
        assert_eq!(summary.flush, FlushOutcome::Deleted(1));
        assert_eq!(app.stats().total_photos_reviewed, 1);
        assert_eq!(app.source().assets().len(), 1);
    }

    #[test]
    fn test_read_error_keeps_decisions_for_end_review() {
        let mut app = app();
        let mut input = BufReader::new(BrokenInput(Cursor::new(b"d\n".to_vec())));
        assert!(swipe_loop(&mut app, &mut input).is_err());

        let summary = app.end_review().unwrap();
        assert_eq!(summary.outcome, SessionOutcome::Abandoned);
        assert_eq!(summary.flush, FlushOutcome::Deleted(1));
        assert_eq!(app.stats().sessions_completed, 1);
        assert!(!app.catalog().contains("p1"));
    }

    #[test]
    fn test_parse_key() {
        assert_eq!(parse_key("k"), Some(Key::Keep));
        assert_eq!(parse_key(" D \n"), Some(Key::Delete));
        assert_eq!(parse_key("undo"), Some(Key::Undo));
        assert_eq!(parse_key("b"), Some(Key::Bookmark));
        assert_eq!(parse_key("i"), Some(Key::Info));
        assert_eq!(parse_key("done"), Some(Key::Quit));
        assert_eq!(parse_key("x"), None);
        assert_eq!(parse_key(""), None);
    }

    #[test]
    fn test_review_mode_mapping() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        assert_eq!(review_mode(ReviewArg::Recents, today), ReviewMode::Recents);
        assert_eq!(
            review_mode(ReviewArg::Month { id: "2024-06".to_string() }, today),
            ReviewMode::Month("2024-06".to_string())
        );
        assert_eq!(review_mode(ReviewArg::OnThisDay, today), ReviewMode::OnThisDay(today));
    }

    #[test]
    fn test_describe_flush() {
        assert_eq!(describe_flush(&FlushOutcome::Deleted(2)), "Deleted 2 photo(s).");
        assert!(describe_flush(&FlushOutcome::Failed(1)).contains("next refresh"));
        let denied = describe_flush(&FlushOutcome::PermissionDenied(PermissionLevel::Limited, 3));
        assert!(denied.contains("limited"));
        assert!(denied.contains("system settings"));
    }
}
