use std::path::{Path, PathBuf};

use periop_core::InsightRecord;
use periop_extract::Document;
use serde_json::{Map, Value};
use tracing::{info, warn};

/// Input parameters for the Batch command strategy.
#[derive(Debug, Clone)]
pub struct BatchInput {
    pub dir: PathBuf,
    /// Glob pattern relative to `dir`
    pub pattern: String,
    pub clean: bool,
    pub compact: bool,
}

/// Strategy for extracting every matching file in a directory.
///
/// Files are read up front, then extracted in parallel on a blocking worker.
/// Unreadable or non-UTF-8 files are logged as warnings and left out of the
/// output object, which is keyed by path relative to `dir`.
///
/// # Design
/// - Stateless: all input via `BatchInput`
/// - One bad file never fails the whole run
#[derive(Debug, Clone, Copy)]
pub struct BatchStrategy;

impl super::CommandStrategy for BatchStrategy {
    type Input = BatchInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let (config, extractor) = super::load_extractor(input.clean)?;
        let pretty = config.output.pretty && !input.compact;

        let paths = discover(&input.dir, &input.pattern)?;
        if paths.is_empty() {
            anyhow::bail!(
                "No files match {} in {}",
                input.pattern,
                input.dir.display()
            );
        }
        info!(files = paths.len(), dir = %input.dir.display(), "Discovered documents");

        let mut documents = Vec::with_capacity(paths.len());
        for path in &paths {
            match tokio::fs::read(path).await {
                Ok(content) => documents.push(Document::new(relative_label(&input.dir, path), content)),
                Err(e) => warn!(path = %path.display(), error = %e, "Skipped unreadable file"),
            }
        }

        let results = tokio::task::spawn_blocking(move || {
            let results = extractor.extract_batch(&documents);
            documents
                .into_iter()
                .map(|d| d.source)
                .zip(results)
                .collect::<Vec<_>>()
        })
        .await?;

        let (records, failed) = collect_records(results)?;
        if failed > 0 {
            warn!(failed, extracted = records.len(), "Some documents were skipped");
        }

        println!("{}", super::to_json(&Value::Object(records), pretty)?);
        Ok(())
    }
}

/// Key the extracted records by label. Failed documents are logged and
/// counted, not returned.
fn collect_records(
    results: Vec<(String, periop_core::Result<InsightRecord>)>,
) -> anyhow::Result<(Map<String, Value>, usize)> {
    let mut records = Map::new();
    let mut failed = 0usize;
    for (label, result) in results {
        match result {
            Ok(record) => {
                records.insert(label, serde_json::to_value(record)?);
            }
            Err(e) => {
                failed += 1;
                warn!(source = %label, error = %e, "Skipped document");
            }
        }
    }
    Ok((records, failed))
}

/// Regular files under `dir` matching `pattern`, in sorted order.
fn discover(dir: &Path, pattern: &str) -> anyhow::Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("Not a directory: {}", dir.display());
    }

    let full = dir.join(pattern);
    let mut paths = Vec::new();
    for entry in glob::glob(&full.to_string_lossy())? {
        match entry {
            Ok(path) if path.is_file() => paths.push(path),
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Unreadable glob entry"),
        }
    }

    paths.sort();
    Ok(paths)
}

fn relative_label(dir: &Path, path: &Path) -> String {
    path.strip_prefix(dir)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}
