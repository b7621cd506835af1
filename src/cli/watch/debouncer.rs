use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rustc_hash::FxHashSet;

pub(super) const DEBOUNCE_MS: u64 = 300;

/// Collects changed pages until the event stream has been quiet for
/// `DEBOUNCE_MS`. Site generators write many files in a burst.
pub(super) struct Debouncer {
    /// Pages touched since the last batch (dedup via set)
    pub(super) changes: FxHashSet<PathBuf>,
    pub(super) last_event: Option<Instant>,
}

impl Debouncer {
    pub(super) fn new() -> Self {
        Self {
            changes: FxHashSet::default(),
            last_event: None,
        }
    }

    /// Record a notify event. Only creations and content modifications of
    /// paths accepted by `is_page` count; removals have nothing left to filter.
    pub(super) fn add_event(&mut self, event: &notify::Event, is_page: impl Fn(&Path) -> bool) {
        use notify::EventKind;

        match event.kind {
            EventKind::Create(_) => {}
            // Metadata-only changes (mtime/chmod) would loop on our own writes
            EventKind::Modify(notify::event::ModifyKind::Metadata(_)) => return,
            EventKind::Modify(_) => {}
            _ => return,
        }

        crate::debug!("watch"; "raw notify: {:?} {:?}", event.kind, event.paths);

        for path in &event.paths {
            if is_temp_file(path) || !is_page(path) {
                continue;
            }
            self.changes.insert(path.clone());
            self.last_event = Some(Instant::now());
        }
    }

    /// Take the pending pages once the debounce window has elapsed.
    pub(super) fn take_if_ready(&mut self) -> Option<Vec<PathBuf>> {
        let last_event = self.last_event?;
        if last_event.elapsed() < Duration::from_millis(DEBOUNCE_MS) {
            return None;
        }

        self.last_event = None;
        let mut pages: Vec<PathBuf> = std::mem::take(&mut self.changes).into_iter().collect();
        if pages.is_empty() {
            return None;
        }
        pages.sort();
        Some(pages)
    }

    /// How long to wait for the next event before checking readiness again.
    pub(super) fn sleep_duration(&self) -> Duration {
        let Some(last_event) = self.last_event else {
            // Idle: wake periodically to notice shutdown
            return Duration::from_millis(200);
        };
        Duration::from_millis(DEBOUNCE_MS)
            .saturating_sub(last_event.elapsed())
            .max(Duration::from_millis(1))
    }
}

/// Check if path is a temp/backup file (editor artifacts).
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, DataChange, MetadataKind, ModifyKind, RemoveKind};
    use notify::{Event, EventKind};

    fn make_event(paths: Vec<&str>, kind: EventKind) -> Event {
        let mut event = Event::new(kind);
        for path in paths {
            event = event.add_path(PathBuf::from(path));
        }
        event
    }

    fn is_html(path: &Path) -> bool {
        path.extension().is_some_and(|e| e == "html")
    }

    #[test]
    fn test_collects_pages_only() {
        let mut debouncer = Debouncer::new();
        debouncer.add_event(
            &make_event(
                vec!["/site/index.html", "/site/assets/app.js", "/site/.index.html.swp"],
                EventKind::Modify(ModifyKind::Data(DataChange::Content)),
            ),
            is_html,
        );
        assert_eq!(debouncer.changes.len(), 1);
        assert!(debouncer.changes.contains(Path::new("/site/index.html")));
    }

    #[test]
    fn test_ignores_metadata_and_removals() {
        let mut debouncer = Debouncer::new();
        debouncer.add_event(
            &make_event(
                vec!["/site/index.html"],
                EventKind::Modify(ModifyKind::Metadata(MetadataKind::WriteTime)),
            ),
            is_html,
        );
        debouncer.add_event(
            &make_event(vec!["/site/old.html"], EventKind::Remove(RemoveKind::File)),
            is_html,
        );
        assert!(debouncer.changes.is_empty());
        assert!(debouncer.last_event.is_none());
    }

    #[test]
    fn test_dedups_bursts() {
        let mut debouncer = Debouncer::new();
        for kind in [
            EventKind::Create(CreateKind::File),
            EventKind::Modify(ModifyKind::Data(DataChange::Content)),
        ] {
            debouncer.add_event(&make_event(vec!["/site/a.html"], kind), is_html);
        }
        assert_eq!(debouncer.changes.len(), 1);
    }

    #[test]
    fn test_take_waits_for_quiet_period() {
        let mut debouncer = Debouncer::new();
        debouncer.add_event(
            &make_event(vec!["/site/b.html", "/site/a.html"], EventKind::Create(CreateKind::File)),
            is_html,
        );
        assert!(debouncer.take_if_ready().is_none());

        debouncer.last_event = Some(Instant::now() - Duration::from_millis(DEBOUNCE_MS + 50));
        let pages = debouncer.take_if_ready().unwrap();
        assert_eq!(pages, vec![PathBuf::from("/site/a.html"), PathBuf::from("/site/b.html")]);
        assert!(debouncer.take_if_ready().is_none());
    }

    #[test]
    fn test_sleep_duration_when_idle() {
        let debouncer = Debouncer::new();
        assert_eq!(debouncer.sleep_duration(), Duration::from_millis(200));
    }

    #[test]
    fn test_temp_files() {
        assert!(is_temp_file(Path::new("/site/index.html~")));
        assert!(is_temp_file(Path::new("/site/page.tmp")));
        assert!(!is_temp_file(Path::new("/site/index.html")));
    }
}
