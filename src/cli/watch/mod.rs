//! `watch` command: re-apply the filter whenever built pages change.
//!
//! The watcher is attached before the initial run so pages written while it
//! is in progress are not missed. Our own rewrites produce one more event per
//! page; the second pass finds nothing new to hide and writes nothing.

mod debouncer;

use std::path::PathBuf;

use anyhow::{Context, Result};
use crossbeam::channel::{self, RecvTimeoutError};
use notify::{RecursiveMode, Watcher};

use super::apply::apply_pages;
use super::common::run_batch;
use crate::cli::FilterArgs;
use crate::config::Config;
use crate::core::is_shutdown;
use crate::log;
use crate::logger::{Status, status};
use crate::page::{PageError, PageMode};
use crate::utils::plural_count;
use debouncer::Debouncer;

pub fn watch(args: &FilterArgs, config: &Config) -> Result<()> {
    let input = &config.build.input;
    if !input.is_dir() {
        anyhow::bail!("Input directory not found: {}", input.display());
    }

    let (tx, rx) = channel::unbounded();
    let mut watcher = notify::recommended_watcher(move |res| {
        let _ = tx.send(res);
    })
    .context("Failed to create file watcher")?;
    watcher
        .watch(input, RecursiveMode::Recursive)
        .with_context(|| format!("Failed to watch {}", input.display()))?;

    // A failing initial run is reported but does not stop the watcher
    if let Err(e) = apply_pages(args, config) {
        log!("error"; "{:#}", e);
    }

    log!(
        "watch";
        "watching {} (ctrl+c to stop)",
        config.root_relative(input).display()
    );

    let mut debouncer = Debouncer::new();
    while !is_shutdown() {
        match rx.recv_timeout(debouncer.sleep_duration()) {
            Ok(Ok(event)) => debouncer.add_event(&event, |p| config.build.is_page(p)),
            Ok(Err(e)) => log!("watch"; "watcher error: {}", e),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        if let Some(pages) = debouncer.take_if_ready() {
            reapply(&pages, config);
        }
    }

    Ok(())
}

/// Re-run the filter over changed pages and report on the status line.
fn reapply(pages: &[PathBuf], config: &Config) {
    // Pages may be gone by the time the burst settles
    let pages: Vec<PathBuf> = pages.iter().filter(|p| p.is_file()).cloned().collect();
    if pages.is_empty() {
        return;
    }

    let result = run_batch(&pages, config, PageMode::Apply);

    if !result.errors.is_empty() {
        let summary = format!("failed: {}", plural_count(result.errors.len(), "page"));
        status(Status::Failed, &format!("{summary}\n{}", error_detail(&result.errors)));
        return;
    }

    let hidden = result.hidden_links();
    if hidden == 0 {
        status(
            Status::Unchanged,
            &format!("{}: nothing new to hide", describe(&result.outcomes)),
        );
    } else {
        let message = format!(
            "hid {} in {}",
            plural_count(hidden, "link"),
            describe(&result.outcomes)
        );
        status(Status::Hidden, &message);
    }
}

/// Single page by name, otherwise a count.
fn describe(outcomes: &[crate::page::PageOutcome]) -> String {
    match outcomes {
        [one] => one.rel_path.display().to_string(),
        many => plural_count(many.len(), "page"),
    }
}

fn error_detail(errors: &[PageError]) -> String {
    errors
        .iter()
        .map(|err| match std::error::Error::source(err) {
            Some(cause) => format!("  {err}: {cause}"),
            None => format!("  {err}"),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
