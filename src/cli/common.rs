//! Page discovery and the parallel batch runner shared by all commands.

use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use anyhow::Result;
use crossbeam::queue::SegQueue;
use jwalk::WalkDir;
use rayon::prelude::*;

use crate::config::Config;
use crate::logger::Progress;
use crate::page::{PageError, PageMode, PageOutcome, process_page};
use crate::utils::path::resolve_path;

/// Lock-free parallel result collector using `SegQueue`
pub struct ParallelCollector<T> {
    queue: SegQueue<T>,
}

impl<T> ParallelCollector<T> {
    #[inline]
    pub fn new() -> Self {
        Self {
            queue: SegQueue::new(),
        }
    }

    /// Push an item (lock-free, wait-free).
    #[inline]
    pub fn push(&self, item: T) {
        self.queue.push(item);
    }

    /// Drain all items into a Vec.
    pub fn drain(self) -> Vec<T> {
        let mut results = Vec::with_capacity(self.queue.len());
        while let Some(item) = self.queue.pop() {
            results.push(item);
        }
        results
    }
}

impl<T> Default for ParallelCollector<T> {
    fn default() -> Self {
        Self::new()
    }
}

const IGNORED_FILES: &[&str] = &[".DS_Store"];

/// Collect all files from a directory recursively
pub fn collect_all_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_str().unwrap_or_default();
            !IGNORED_FILES.contains(&name)
        })
        .map(|e| e.path())
        .collect()
}

/// Collect the pages to process.
///
/// No paths means every page under the input directory. `-` reads paths from
/// stdin. Relative paths are tried against cwd first, then the input directory.
pub fn collect_pages(paths: &[PathBuf], config: &Config) -> Result<Vec<PathBuf>> {
    let paths: Vec<PathBuf> = if paths.len() == 1 && paths[0].as_os_str() == "-" {
        read_paths_from_stdin()?
    } else {
        paths.to_vec()
    };

    let input = &config.build.input;
    if paths.is_empty() {
        if !input.is_dir() {
            anyhow::bail!("Input directory not found: {}", input.display());
        }
        let mut pages = filter_pages(collect_all_files(input), config);
        pages.sort();
        return Ok(pages);
    }

    let mut pages = Vec::new();
    for path in &paths {
        let resolved = resolve_path(path, input);

        if resolved.is_file() {
            if config.build.is_page(&resolved) {
                pages.push(resolved);
            } else {
                anyhow::bail!("Not a page: {}", path.display());
            }
        } else if resolved.is_dir() {
            pages.extend(filter_pages(collect_all_files(&resolved), config));
        } else {
            anyhow::bail!(
                "Path not found: {}\n  Tried:\n    - {}\n    - {}",
                path.display(),
                path.display(),
                input.join(path).display()
            );
        }
    }

    pages.sort();
    pages.dedup();
    Ok(pages)
}

/// Read file paths from stdin, one per line
pub fn read_paths_from_stdin() -> Result<Vec<PathBuf>> {
    let stdin = io::stdin();
    let mut paths = Vec::new();

    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            paths.push(PathBuf::from(trimmed));
        }
    }

    Ok(paths)
}

fn filter_pages(files: Vec<PathBuf>, config: &Config) -> Vec<PathBuf> {
    files
        .into_iter()
        .filter(|p| config.build.is_page(p))
        .collect()
}

/// Outcomes of a batch, sorted by page path.
#[derive(Debug, Default)]
pub struct BatchResult {
    pub outcomes: Vec<PageOutcome>,
    pub errors: Vec<PageError>,
}

impl BatchResult {
    pub fn hidden_links(&self) -> usize {
        self.outcomes.iter().map(|o| o.report.newly_hidden()).sum()
    }

    pub fn changed_pages(&self) -> usize {
        self.outcomes.iter().filter(|o| o.report.changed()).count()
    }

    pub fn written_pages(&self) -> usize {
        self.outcomes.iter().filter(|o| o.written).count()
    }

    pub fn missing_ids(&self) -> usize {
        self.outcomes.iter().map(|o| o.report.missing_ids()).sum()
    }
}

/// Process `pages` in parallel, showing a progress line for larger batches.
pub fn run_batch(pages: &[PathBuf], config: &Config, mode: PageMode) -> BatchResult {
    let module = match mode {
        PageMode::Apply => "apply",
        PageMode::Check => "check",
    };
    let progress = (pages.len() > 1).then(|| Progress::new(module, pages.len()));

    let outcomes = ParallelCollector::new();
    let errors = ParallelCollector::new();

    pages.par_iter().for_each(|page| {
        match process_page(page, config, mode) {
            Ok(outcome) => outcomes.push(outcome),
            Err(err) => errors.push(err),
        }
        if let Some(progress) = &progress {
            progress.tick();
        }
    });

    if let Some(progress) = progress {
        progress.finish();
    }

    let mut outcomes = outcomes.drain();
    outcomes.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
    let mut errors = errors.drain();
    errors.sort_by(|a, b| a.path().cmp(b.path()));

    BatchResult { outcomes, errors }
}

/// Log every page error with its cause.
pub fn report_errors(errors: &[PageError]) {
    for err in errors {
        match std::error::Error::source(err) {
            Some(cause) => crate::log!("error"; "{}: {}", err, cause),
            None => crate::log!("error"; "{}", err),
        }
    }
}
