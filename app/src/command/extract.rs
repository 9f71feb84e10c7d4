use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use periop_core::InsightRecord;
use periop_extract::InsightExtractor;
use serde_json::{Map, Value};
use tokio::io::AsyncReadExt;
use tracing::info;

/// Template marker left in place when a chart was never pasted in.
pub const PLACEHOLDER: &str = "<<INSERT PATIENT CHART TEXT>>";

/// Input parameters for the Extract command strategy.
#[derive(Debug, Clone)]
pub struct ExtractInput {
    /// Chart text given on the command line
    pub text: Option<String>,
    /// Files to read instead of `text`
    pub files: Vec<PathBuf>,
    /// Optional `metadata.source` label for a single input
    pub source: Option<String>,
    pub clean: bool,
    pub compact: bool,
}

/// Strategy for extracting records from chart text.
///
/// Text comes from the argument, from one or more files, or from stdin, in
/// that order of preference. One input prints one record; several files
/// print a JSON object keyed by file name, or by the path as given where two
/// files share a name.
///
/// # Design
/// - Stateless: all input via `ExtractInput`
/// - Refuses empty or placeholder text before the extractor runs
#[derive(Debug, Clone, Copy)]
pub struct ExtractStrategy;

impl super::CommandStrategy for ExtractStrategy {
    type Input = ExtractInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let (config, extractor) = super::load_extractor(input.clean)?;
        let pretty = config.output.pretty && !input.compact;

        let output = match (input.text, input.files.as_slice()) {
            (Some(text), _) => {
                let record = extract_one(&extractor, &text, input.source)?;
                super::to_json(&record, pretty)?
            }
            (None, [path]) => {
                let text = read_text(path).await?;
                let label = input.source.unwrap_or_else(|| file_label(path));
                let record = extract_one(&extractor, &text, Some(label))?;
                super::to_json(&record, pretty)?
            }
            (None, []) => {
                let mut bytes = Vec::new();
                tokio::io::stdin().read_to_end(&mut bytes).await?;
                let text = String::from_utf8(bytes)
                    .map_err(|_| anyhow::anyhow!("stdin is not UTF-8 text"))?;
                let record = extract_one(&extractor, &text, input.source)?;
                super::to_json(&record, pretty)?
            }
            (None, paths) => {
                if input.source.is_some() {
                    anyhow::bail!("--source applies to a single input; file names label each record");
                }
                let labels = record_labels(paths)?;
                let mut records = Map::new();
                for (path, label) in paths.iter().zip(labels) {
                    let text = read_text(path).await?;
                    let record = extract_one(&extractor, &text, Some(label.clone()))?;
                    records.insert(label, serde_json::to_value(record)?);
                }
                super::to_json(&Value::Object(records), pretty)?
            }
        };

        println!("{output}");
        Ok(())
    }
}

fn extract_one(
    extractor: &InsightExtractor,
    text: &str,
    source: Option<String>,
) -> anyhow::Result<InsightRecord> {
    ensure_chart_text(text)?;

    let mut record = extractor.extract(text)?;
    if let Some(source) = source {
        record.metadata = record.metadata.with_source(source);
    }
    info!(
        source = record.metadata.source.as_deref().unwrap_or("-"),
        "Extracted record"
    );
    Ok(record)
}

/// Refuse text that is empty or still the template placeholder.
fn ensure_chart_text(text: &str) -> anyhow::Result<()> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == PLACEHOLDER {
        anyhow::bail!(
            "No chart text provided. Pass the note as an argument, with --file, or on stdin."
        );
    }
    Ok(())
}

async fn read_text(path: &Path) -> anyhow::Result<String> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", path.display()))?;
    String::from_utf8(bytes).map_err(|_| anyhow::anyhow!("{} is not UTF-8 text", path.display()))
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

/// One object key per input file. Bare file names are kept where they are
/// unique; clashing ones fall back to the path as given.
fn record_labels(paths: &[PathBuf]) -> anyhow::Result<Vec<String>> {
    let mut name_counts: HashMap<String, usize> = HashMap::new();
    for path in paths {
        *name_counts.entry(file_label(path)).or_insert(0) += 1;
    }

    let mut seen = HashSet::new();
    paths
        .iter()
        .map(|path| {
            let name = file_label(path);
            let label = if name_counts.get(&name).copied().unwrap_or(0) > 1 {
                path.display().to_string()
            } else {
                name
            };
            if !seen.insert(label.clone()) {
                anyhow::bail!("{label} is given more than once");
            }
            Ok(label)
        })
        .collect()
}
