use std::path::Path;
use std::time::Instant;

use log::{error, info, warn};

use crate::{
    BuildArgs,
    build::{BuildResult, Builder, FileWatcher, PathClassifier, WatchEvent, pipeline::DocumentFailure},
    commands::absolute,
    config::{Config, site_root_from_config},
    logging::format_elapsed,
};

pub fn run(args: &BuildArgs) -> Result<(), anyhow::Error> {
    let config_path = Config::path_from_arg(args.config_file.as_deref())?;

    let result = build_site(&config_path, args)?;
    if !args.watch {
        if result.has_failures() {
            anyhow::bail!(
                "{} document(s) failed to build:\n{}",
                result.failures.len(),
                failure_report(&result.failures)
            );
        }
        return Ok(());
    }

    let config = Config::load_from_file(&config_path)?;
    let site_root = site_root_from_config(&config_path).canonicalize()?;
    let classifier = PathClassifier::new(
        site_root,
        result.output_dir.canonicalize()?,
        config_path.canonicalize()?,
    );
    let watcher = FileWatcher::new(&config.dev.watch, classifier)?;
    info!("Watching for changes...");

    while let Some(event) = watcher.recv() {
        match event {
            WatchEvent::FilesChanged(changes) => {
                info!("Detected {} change(s), rebuilding...", changes.len());
                // Config errors are reported and the previous output kept
                if let Err(e) = build_site(&config_path, args) {
                    error!("Build error: {:#}", e);
                }
            }
            WatchEvent::Error(e) => warn!("Watch error: {}", e),
        }
    }

    Ok(())
}

/// Load the config from disk and run one full build.
fn build_site(config_path: &Path, args: &BuildArgs) -> Result<BuildResult, anyhow::Error> {
    let started = Instant::now();
    let config = Config::load_from_file(config_path)?;
    let site_root = site_root_from_config(config_path);

    let mut builder = Builder::new(config, site_root).with_drafts(args.drafts);
    if let Some(output) = &args.output {
        builder = builder.with_output_dir(absolute(output)?);
    }
    let result = builder.build()?;

    info!(
        "Built site to {} in {} ({} documents, {} index pages, {} static files)",
        result.output_dir.display(),
        format_elapsed(started.elapsed()),
        result.documents,
        result.index_pages,
        result.static_files
    );
    if !result.missing_assets.is_empty() {
        warn!("{} missing asset reference(s)", result.missing_assets.len());
    }
    Ok(result)
}

/// One line per failed document: source path, stage and error.
fn failure_report(failures: &[DocumentFailure]) -> String {
    failures
        .iter()
        .map(|failure| {
            format!(
                "  {} ({}): {}",
                failure.path.display(),
                failure.stage,
                failure.error
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::pipeline::PipelineError;
    use std::path::PathBuf;

    #[test]
    fn test_failure_report() {
        let failures = vec![
            DocumentFailure {
                path: PathBuf::from("evil.md"),
                stage: "front_matter",
                error: PipelineError::UnsafeUrl {
                    url: "/../escaped.html".to_string(),
                },
            },
            DocumentFailure {
                path: PathBuf::from("about.md"),
                stage: "template",
                error: PipelineError::stage("template", "boom"),
            },
        ];

        assert_eq!(
            failure_report(&failures),
            "  evil.md (front_matter): URL /../escaped.html leaves the output directory\n  \
             about.md (template): stage 'template' failed: boom"
        );
    }
}
