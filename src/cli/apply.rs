//! `apply` command: hide excluded TOC links in built pages.

use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use rayon::prelude::*;

use super::common::{BatchResult, collect_all_files, collect_pages, report_errors, run_batch};
use crate::cli::FilterArgs;
use crate::config::Config;
use crate::filter::MatchMode;
use crate::log;
use crate::page::{PageMode, relative_path, write_file};
use crate::utils::{plural_count, plural_s};

/// Run the filter over the selected pages and write the results.
pub fn apply_pages(args: &FilterArgs, config: &Config) -> Result<BatchResult> {
    let pages = collect_pages(&args.paths, config)?;
    if pages.is_empty() {
        log!("apply"; "no pages found in {}", config.root_relative(&config.build.input).display());
        return Ok(BatchResult::default());
    }

    log!("apply"; "processing {}", plural_count(pages.len(), "page"));
    let result = run_batch(&pages, config, PageMode::Apply);

    // Whole-site run into a separate directory: bring the assets along
    if !config.build.in_place() && args.paths.is_empty() {
        let copied = copy_assets(config)?;
        crate::debug!("apply"; "copied {}", plural_count(copied, "asset"));
    }

    print_summary(&result, config);

    if !result.errors.is_empty() {
        report_errors(&result.errors);
        anyhow::bail!(
            "{} failed to process",
            plural_count(result.errors.len(), "page")
        );
    }
    Ok(result)
}

/// Copy every non-page file of the input directory to the output directory.
fn copy_assets(config: &Config) -> Result<usize> {
    let input = &config.build.input;
    let output = config.build.output_dir();

    let assets: Vec<PathBuf> = collect_all_files(input)
        .into_iter()
        .filter(|p| !config.build.is_page(p))
        .collect();

    assets.par_iter().try_for_each(|asset| -> Result<()> {
        let target = output.join(relative_path(asset, input));
        let bytes = fs::read(asset)?;
        write_file(&target, &bytes)?;
        Ok(())
    })?;

    Ok(assets.len())
}

fn print_summary(result: &BatchResult, config: &Config) {
    for outcome in &result.outcomes {
        if outcome.report.changed() {
            crate::debug!(
                "apply";
                "{}: hid {}",
                outcome.rel_path.display(),
                plural_count(outcome.report.newly_hidden(), "link")
            );
        }
    }

    crate::debug!("apply"; "wrote {}", plural_count(result.written_pages(), "page"));

    let missing = result.missing_ids();
    if missing > 0 {
        let elements = plural_count(missing, "excluded element");
        match config.filter.match_mode {
            MatchMode::Substring => log!(
                "warning";
                "{} without an id, which hides every TOC link on {}",
                elements,
                if missing == 1 { "its page" } else { "their pages" }
            ),
            MatchMode::Fragment => log!("warning"; "skipped {} without an id", elements),
        }
    }

    let hidden = result.hidden_links();
    if hidden == 0 {
        log!("apply"; "nothing to hide");
    } else {
        let changed = result.changed_pages();
        log!(
            "apply";
            "hid {} in {} page{} -> {}",
            plural_count(hidden, "link"),
            changed,
            plural_s(changed),
            config.root_relative(config.build.output_dir()).display()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config_at;
    use std::path::Path;

    const LEGACY: &str = r##"<nav data-md-component="toc"><a href="#legacy-notes-detail">Details</a></nav><div class="exclude" id="legacy-notes">Legacy</div>"##;

    fn args() -> FilterArgs {
        FilterArgs {
            paths: Vec::new(),
            input: None,
            site_url: None,
            match_mode: None,
        }
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_apply_whole_site_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config_at(dir.path());
        write(&config.build.input, "index.html", LEGACY);
        write(&config.build.input, "plain/index.html", "<p>plain</p>");

        let result = apply_pages(&args(), &config).unwrap();

        assert_eq!(result.hidden_links(), 1);
        assert_eq!(result.written_pages(), 1);
        let html = fs::read_to_string(config.build.input.join("index.html")).unwrap();
        assert!(html.contains(r##"<a href="#legacy-notes-detail" class="hidden">"##), "{html}");
    }

    #[test]
    fn test_apply_to_output_dir_copies_assets() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config_at(dir.path());
        config.build.output = Some(dir.path().join("public"));
        write(&config.build.input, "index.html", LEGACY);
        write(&config.build.input, "assets/extra.css", ".hidden { display: none }");

        let result = apply_pages(&args(), &config).unwrap();
        assert_eq!(result.written_pages(), 1);

        let public = dir.path().join("public");
        assert!(fs::read_to_string(public.join("index.html")).unwrap().contains("hidden"));
        assert!(public.join("assets/extra.css").is_file());
        // Input left untouched
        assert_eq!(fs::read_to_string(config.build.input.join("index.html")).unwrap(), LEGACY);
    }

    #[test]
    fn test_apply_empty_id_hides_whole_toc() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config_at(dir.path());
        write(
            &config.build.input,
            "index.html",
            r##"<div class="exclude" id="">X</div><nav data-md-component="toc"><a href="#x">X</a><a href="#y">Y</a></nav>"##,
        );

        let result = apply_pages(&args(), &config).unwrap();

        assert_eq!(result.missing_ids(), 1);
        assert_eq!(result.hidden_links(), 2);
    }

    #[test]
    fn test_apply_empty_site() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config_at(dir.path());
        fs::create_dir_all(&config.build.input).unwrap();

        let result = apply_pages(&args(), &config).unwrap();
        assert!(result.outcomes.is_empty());
    }
}
