//! High-level pipeline: resolve → fetch → read → classify → normalize →
//! assemble → write, synchronously and to completion, once per invocation.
//!
//! Per-entry problems (decode failures, unparsable sources) are contained
//! here and degrade gracefully; only fatal conditions — an unresolvable
//! archive, a failed fetch, an unwritable output target — propagate out and
//! terminate the run with a non-zero exit.

use std::io::Write;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::archive::{open_archive, ArchiveError};
use crate::assemble::{assemble, find_readme, ClassifiedEntry};
use crate::classify::{classify, Category};
use crate::config::{CompileConfig, OutputMode};
use crate::fetch::{repo_name, ArchiveFetcher, FetchError};
use crate::normalize::normalize;
use crate::resolve::{resolve_reference, BranchLister};

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("archive download failed: {0}")]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    #[error("failed to write artifact: {0}")]
    Write(#[source] std::io::Error),
}

/// What to compile: one remote repository reference.
#[derive(Debug, Clone)]
pub struct CompileRequest {
    pub repo_url: String,
    /// Branch or tag; resolved against the hosting service when absent or
    /// set to a conventional default.
    pub reference: Option<String>,
    pub token: Option<String>,
}

/// Outcome summary for one run.
#[derive(Debug)]
pub struct CompileReport {
    pub output_file: PathBuf,
    pub reference: String,
    pub entries: usize,
    pub documents: usize,
    pub included: usize,
    pub excluded: usize,
    pub tests: usize,
    pub binary: usize,
    pub errors: usize,
}

/// Run the full pipeline and write the artifact.
pub async fn compile<F, L>(
    request: &CompileRequest,
    config: &CompileConfig,
    fetcher: &F,
    lister: &L,
) -> Result<CompileReport, CompileError>
where
    F: ArchiveFetcher + ?Sized,
    L: BranchLister + ?Sized,
{
    info!(repo_url = %request.repo_url, "Starting repository compilation");

    let reference = resolve_reference(
        lister,
        &request.repo_url,
        request.reference.as_deref(),
        request.token.as_deref(),
    )
    .await;

    let bytes = fetcher
        .fetch_archive(&request.repo_url, &reference, request.token.as_deref())
        .await?;
    let entries = open_archive(&bytes)?;

    let readme = find_readme(&entries);
    debug!(readme = %readme.path, "README selected");

    let mut classified = Vec::with_capacity(entries.len());
    let mut included = 0usize;
    let mut excluded = 0usize;
    let mut tests = 0usize;
    let mut binary = 0usize;
    let mut errors = 0usize;

    for entry in &entries {
        let classification = classify(&entry.path, &entry.raw_bytes, config);
        let content = match classification.category {
            Category::Useful => {
                included += 1;
                let decoded = String::from_utf8_lossy(&entry.raw_bytes).into_owned();
                match classification.matched_language {
                    Some(language) if !config.keep_comments => {
                        Some(normalize(&decoded, language))
                    }
                    _ => Some(decoded),
                }
            }
            Category::Excluded => {
                excluded += 1;
                None
            }
            Category::Test => {
                tests += 1;
                None
            }
            Category::Binary => {
                binary += 1;
                None
            }
            Category::Error => {
                errors += 1;
                warn!(path = %entry.path, "Skipping entry due to decoding error");
                None
            }
        };
        classified.push(ClassifiedEntry {
            path: entry.path.clone(),
            classification,
            content,
        });
    }

    let artifact = assemble(&classified, &readme, config);

    let output_file = output_path(&request.repo_url, config);
    write_artifact(&artifact.text, &output_file, config)?;
    info!(output_file = %output_file.display(), "Artifact written");

    Ok(CompileReport {
        output_file,
        reference,
        entries: entries.len(),
        documents: artifact.documents.len(),
        included,
        excluded,
        tests,
        binary,
        errors,
    })
}

fn output_path(repo_url: &str, config: &CompileConfig) -> PathBuf {
    let name = repo_name(repo_url);
    let suffix = match config.output_mode {
        OutputMode::Plain => "",
        OutputMode::Structured => "-structured",
    };
    config
        .output_dir
        .join(format!("{name}_{}{suffix}.txt", config.language.name()))
}

/// Write the artifact whole-or-not-at-all: render to a temp file in the
/// output directory, then persist over the final path.
fn write_artifact(
    text: &str,
    output_file: &PathBuf,
    config: &CompileConfig,
) -> Result<(), CompileError> {
    std::fs::create_dir_all(&config.output_dir).map_err(CompileError::Write)?;
    let mut tmp =
        tempfile::NamedTempFile::new_in(&config.output_dir).map_err(CompileError::Write)?;
    tmp.write_all(text.as_bytes()).map_err(CompileError::Write)?;
    tmp.persist(output_file)
        .map_err(|e| CompileError::Write(e.error))?;
    Ok(())
}
