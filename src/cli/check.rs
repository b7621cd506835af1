//! `check` command: dry run that reports what `apply` would hide.

use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use super::common::{BatchResult, collect_pages, report_errors, run_batch};
use crate::cli::FilterArgs;
use crate::config::Config;
use crate::filter::HiddenLink;
use crate::log;
use crate::page::PageMode;
use crate::utils::plural_count;

/// Per-page entry of the JSON report.
#[derive(Debug, Serialize)]
struct PageReport<'a> {
    page: &'a PathBuf,
    excluded: Vec<&'a str>,
    toc_links: usize,
    hidden: &'a [HiddenLink],
}

pub fn check_pages(args: &FilterArgs, json: bool, config: &Config) -> Result<()> {
    let pages = collect_pages(&args.paths, config)?;
    let result = run_batch(&pages, config, PageMode::Check);

    if json {
        println!("{}", render_json(&result)?);
    } else {
        print_report(&result, config);
    }

    if !result.errors.is_empty() {
        report_errors(&result.errors);
        anyhow::bail!(
            "{} failed to process",
            plural_count(result.errors.len(), "page")
        );
    }
    Ok(())
}

/// Pages with something excluded, as pretty JSON.
fn render_json(result: &BatchResult) -> Result<String> {
    let entries: Vec<PageReport<'_>> = result
        .outcomes
        .iter()
        .filter(|o| !o.report.excluded.is_empty())
        .map(|o| PageReport {
            page: &o.rel_path,
            excluded: o.report.excluded.iter().map(|e| e.text.as_str()).collect(),
            toc_links: o.report.toc_links,
            hidden: &o.report.hidden,
        })
        .collect();
    Ok(serde_json::to_string_pretty(&entries)?)
}

fn print_report(result: &BatchResult, config: &Config) {
    for outcome in &result.outcomes {
        let report = &outcome.report;
        if report.excluded.is_empty() {
            crate::debug!("exclude"; "{}: []", outcome.rel_path.display());
            continue;
        }

        log!("exclude"; "{}: {}", outcome.rel_path.display(), report.excluded_text_line());
        for link in &report.hidden {
            let state = if link.newly_hidden { "hide" } else { "already hidden" };
            log!("check"; "  {} {} (matches `{}`)", state, link.href, link.matched);
        }
    }

    let hidden = result.hidden_links();
    log!(
        "check";
        "{} would be hidden across {} ({} match mode)",
        plural_count(hidden, "link"),
        plural_count(result.outcomes.len(), "page"),
        config.filter.match_mode.as_str()
    );
}
