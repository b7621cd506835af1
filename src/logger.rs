//! Terminal output.
//!
//! - `log!("module"; ...)` prints a line behind a colored `[module]` tag
//! - `debug!` does the same, but only with `--verbose`
//! - [`Progress`] keeps a `[apply] pages 42/120` counter on the last line
//!   while a batch runs
//! - [`status`] redraws the watch-mode status block in place
//!
//! ```ignore
//! log!("apply"; "processing {} pages", count);
//!
//! let progress = Progress::new("apply", pages.len());
//! progress.tick();
//! progress.finish();
//! ```

use std::io::{StdoutLock, Write, stdout};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crossterm::{
    cursor, queue,
    terminal::{Clear, ClearType},
};
use owo_colors::{OwoColorize, Stream, Style};
use parking_lot::Mutex;

static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Whether a progress counter currently owns the last terminal line.
static PROGRESS_ACTIVE: AtomicBool = AtomicBool::new(false);

pub fn set_verbose(verbose: bool) {
    VERBOSE.store(verbose, Ordering::Relaxed);
}

pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

/// Print `message` behind a colored `[module]` tag.
///
/// ```ignore
/// log!("check"; "{} would be hidden", n);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// [`log!`] that only prints with `--verbose`.
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

pub fn log(module: &str, message: &str) {
    let mut out = stdout().lock();
    if PROGRESS_ACTIVE.load(Ordering::Acquire) {
        // The counter is redrawn below on its next tick
        clear_line(&mut out);
    }
    writeln!(out, "{} {message}", tag(module)).ok();
    out.flush().ok();
}

/// `[module]` in the module's color, honoring `--color`.
fn tag(module: &str) -> String {
    let style = match module.to_ascii_lowercase().as_str() {
        "error" => Style::new().bright_red(),
        "warning" => Style::new().yellow(),
        "exclude" => Style::new().bright_magenta(),
        "check" => Style::new().bright_blue(),
        "watch" => Style::new().bright_green(),
        _ => Style::new().bright_cyan(),
    };
    format!("[{module}]")
        .if_supports_color(Stream::Stdout, |t| t.style(style.bold()))
        .to_string()
}

fn clear_line(out: &mut StdoutLock<'_>) {
    queue!(out, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
}

// ============================================================================
// batch progress
// ============================================================================

/// Page counter on the last terminal line, shared by rayon workers.
pub struct Progress {
    module: &'static str,
    total: usize,
    done: AtomicUsize,
    /// Held while drawing; workers skip a redraw instead of waiting.
    drawing: Mutex<()>,
}

impl Progress {
    pub fn new(module: &'static str, total: usize) -> Self {
        PROGRESS_ACTIVE.store(true, Ordering::Release);
        let progress = Self {
            module,
            total,
            done: AtomicUsize::new(0),
            drawing: Mutex::new(()),
        };
        progress.draw(false);
        progress
    }

    pub fn tick(&self) {
        self.done.fetch_add(1, Ordering::Relaxed);
        if let Some(_guard) = self.drawing.try_lock() {
            self.draw(false);
        }
    }

    fn line(&self) -> String {
        format!("pages {}/{}", self.done.load(Ordering::Relaxed), self.total)
    }

    fn draw(&self, keep: bool) {
        let mut out = stdout().lock();
        clear_line(&mut out);
        if keep {
            writeln!(out, "{} {}", tag(self.module), self.line()).ok();
        } else {
            write!(out, "{} {}", tag(self.module), self.line()).ok();
        }
        out.flush().ok();
    }

    /// Leave the final count on screen.
    pub fn finish(self) {
        let _guard = self.drawing.lock();
        self.draw(true);
    }
}

impl Drop for Progress {
    fn drop(&mut self) {
        PROGRESS_ACTIVE.store(false, Ordering::Release);
    }
}

// ============================================================================
// watch status
// ============================================================================

/// Outcome shown on the watch status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Links were hidden.
    Hidden,
    /// Pages re-processed with nothing new to hide.
    Unchanged,
    Failed,
}

/// Lines printed by the previous status, erased before the next one.
static LAST_STATUS_LINES: Mutex<u16> = parking_lot::const_mutex(0);

/// Replace the previous watch status with `message`.
///
/// A multi-line `message` (summary plus error detail) is erased as a whole.
pub fn status(kind: Status, message: &str) {
    let mut last = LAST_STATUS_LINES.lock();
    let mut out = stdout().lock();

    if *last > 0 {
        queue!(out, cursor::MoveUp(*last), Clear(ClearType::FromCursorDown)).ok();
    }

    let stamp = format!("[{}]", clock()).dimmed().to_string();
    let line = match kind {
        Status::Hidden => format!("{stamp} {} {message}", "✓".green()),
        Status::Unchanged => format!("{stamp} {}", message.dimmed()),
        Status::Failed => format!("{stamp} {} {message}", "✗".red()),
    };
    writeln!(out, "{line}").ok();
    out.flush().ok();

    *last = line_count(message);
}

fn line_count(message: &str) -> u16 {
    u16::try_from(message.lines().count().max(1)).unwrap_or(u16::MAX)
}

/// Wall-clock time of day (UTC) as `HH:MM:SS`.
fn clock() -> String {
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| d.as_secs());
    format!("{:02}:{:02}:{:02}", secs / 3600 % 24, secs / 60 % 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_count() {
        assert_eq!(line_count("hid 1 link in index.html"), 1);
        assert_eq!(line_count("failed: 1 page\n  `index.html`: cannot locate the `<a>` start tag"), 2);
        assert_eq!(line_count(""), 1);
    }

    #[test]
    fn test_clock_format() {
        let t = clock();
        assert_eq!(t.len(), 8);
        assert_eq!(t.as_bytes()[2], b':');
        assert_eq!(t.as_bytes()[5], b':');
    }

    #[test]
    fn test_tag_keeps_module_name() {
        owo_colors::set_override(false);
        assert_eq!(tag("apply"), "[apply]");
        assert_eq!(tag("ERROR"), "[ERROR]");
    }

    #[test]
    fn test_progress_counts_ticks() {
        let progress = Progress::new("apply", 3);
        progress.tick();
        progress.tick();
        assert_eq!(progress.line(), "pages 2/3");
        progress.finish();
    }
}
