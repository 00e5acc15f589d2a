//! Document assembly: deterministic ordering, stable indices, manifest
//! cross-references, and the two output renderings.
//!
//! Index assignment happens in a single pre-pass over the sorted path list
//! before any rendering starts. The manifest is rendered from the same
//! table, so every `<link target="N">` is correct by construction; nothing
//! assigns indices while writing.

use crate::archive::ArchiveEntry;
use crate::classify::Classification;
use crate::config::{CompileConfig, OutputMode};

pub const NO_README_PLACEHOLDER: &str = "No README file found in the repository.";
const PREFACE: &str = "Here are some documents for you to reference for your task:\n\n";

/// What one emitted document is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Structure,
    Readme,
    Manifest,
    Source,
}

/// One unit of emitted content with a stable index.
#[derive(Debug, Clone)]
pub struct CanonicalDocument {
    pub index: usize,
    pub source_path: String,
    pub content: String,
    pub kind: DocumentKind,
}

/// One manifest row: every discovered path gets exactly one.
#[derive(Debug, Clone)]
pub struct ManifestRow {
    pub path: String,
    pub description: String,
    /// Index of the document holding this file's content; `None` when the
    /// file was excluded or binary.
    pub linked_index: Option<usize>,
}

/// The assembled output: rendered text plus the document table behind it.
#[derive(Debug)]
pub struct CompiledArtifact {
    pub text: String,
    pub documents: Vec<CanonicalDocument>,
    pub manifest: Vec<ManifestRow>,
}

impl CompiledArtifact {
    /// Narrow read-only interface for downstream consumers: emitted
    /// documents as (path, content) pairs.
    pub fn documents(&self) -> impl Iterator<Item = (&str, &str)> {
        self.documents
            .iter()
            .map(|d| (d.source_path.as_str(), d.content.as_str()))
    }
}

/// The README chosen (or synthesized) for the run.
#[derive(Debug, Clone)]
pub struct Readme {
    pub path: String,
    pub content: String,
}

/// README search chain: `*/README.md` or root `README.md`, then `*/README`
/// or root `README`, then the verbatim placeholder. Archive native order
/// decides ties, matching the original behaviour.
pub fn find_readme(entries: &[ArchiveEntry]) -> Readme {
    for suffix in ["README.md", "README"] {
        for entry in entries {
            if entry.path == suffix || entry.path.ends_with(&format!("/{suffix}")) {
                return Readme {
                    path: entry.path.clone(),
                    content: String::from_utf8_lossy(&entry.raw_bytes).into_owned(),
                };
            }
        }
    }
    Readme {
        path: "README".to_string(),
        content: NO_README_PLACEHOLDER.to_string(),
    }
}

/// A classified entry, carrying decoded (and possibly normalized) content
/// for files that survived classification.
#[derive(Debug)]
pub struct ClassifiedEntry {
    pub path: String,
    pub classification: Classification,
    pub content: Option<String>,
}

/// Assemble the final artifact from classified entries.
///
/// Ordering is lexicographic by path throughout, except the README, which
/// always precedes the source documents.
pub fn assemble(
    entries: &[ClassifiedEntry],
    readme: &Readme,
    config: &CompileConfig,
) -> CompiledArtifact {
    let mut sorted: Vec<&ClassifiedEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| a.path.cmp(&b.path));

    match config.output_mode {
        OutputMode::Structured => assemble_structured(&sorted, readme, config),
        OutputMode::Plain => assemble_plain(&sorted, readme, config),
    }
}

fn assemble_structured(
    sorted: &[&ClassifiedEntry],
    readme: &Readme,
    config: &CompileConfig,
) -> CompiledArtifact {
    // Pre-pass: assign every index before a single byte is rendered.
    let mut next = 0usize;
    let structure_index = config.file_list.then(|| {
        let i = next;
        next += 1;
        i
    });
    let readme_index = next;
    next += 1;
    let manifest_index = next;
    next += 1;

    let mut source_indices = Vec::new();
    for entry in sorted {
        if entry.classification.is_useful() && entry.path != readme.path {
            source_indices.push((next, *entry));
            next += 1;
        }
    }

    let manifest = build_manifest(sorted, readme, readme_index, &source_indices);

    let mut documents = Vec::new();
    if let Some(index) = structure_index {
        documents.push(CanonicalDocument {
            index,
            source_path: "FILE_STRUCTURE".to_string(),
            content: render_structure(sorted),
            kind: DocumentKind::Structure,
        });
    }
    documents.push(CanonicalDocument {
        index: readme_index,
        source_path: readme.path.clone(),
        content: readme.content.clone(),
        kind: DocumentKind::Readme,
    });
    documents.push(CanonicalDocument {
        index: manifest_index,
        source_path: "MANIFEST".to_string(),
        content: render_manifest(&manifest),
        kind: DocumentKind::Manifest,
    });
    for (index, entry) in &source_indices {
        documents.push(CanonicalDocument {
            index: *index,
            source_path: entry.path.clone(),
            content: entry.content.clone().unwrap_or_default(),
            kind: DocumentKind::Source,
        });
    }

    let mut text = String::from(PREFACE);
    text.push_str("<documents>\n");
    for doc in &documents {
        text.push_str(&format!("<document index=\"{}\">\n", doc.index));
        text.push_str(&format!("<source>{}</source>\n", doc.source_path));
        if doc.kind == DocumentKind::Source {
            text.push_str(&format!("<file_size>{}</file_size>\n", doc.content.len()));
        }
        text.push_str("<document_content>\n");
        text.push_str(&doc.content);
        text.push_str("\n</document_content>\n");
        text.push_str("</document>\n\n");
    }
    text.push_str("</documents>");

    CompiledArtifact {
        text,
        documents,
        manifest,
    }
}

fn assemble_plain(
    sorted: &[&ClassifiedEntry],
    readme: &Readme,
    config: &CompileConfig,
) -> CompiledArtifact {
    let marker = config.language.comment_marker();

    let mut documents = Vec::new();
    documents.push(CanonicalDocument {
        index: 0,
        source_path: readme.path.clone(),
        content: readme.content.clone(),
        kind: DocumentKind::Readme,
    });
    let mut next = 1usize;
    for entry in sorted {
        if entry.classification.is_useful() && entry.path != readme.path {
            documents.push(CanonicalDocument {
                index: next,
                source_path: entry.path.clone(),
                content: entry.content.clone().unwrap_or_default(),
                kind: DocumentKind::Source,
            });
            next += 1;
        }
    }

    let mut text = String::new();
    for doc in &documents {
        text.push_str(&format!("{marker}File: {}\n", doc.source_path));
        text.push_str(&doc.content);
        text.push_str("\n\n");
    }

    CompiledArtifact {
        text,
        documents,
        manifest: Vec::new(),
    }
}

fn build_manifest(
    sorted: &[&ClassifiedEntry],
    readme: &Readme,
    readme_index: usize,
    source_indices: &[(usize, &ClassifiedEntry)],
) -> Vec<ManifestRow> {
    sorted
        .iter()
        .map(|entry| {
            if entry.path == readme.path {
                return ManifestRow {
                    path: entry.path.clone(),
                    description: "project README".to_string(),
                    linked_index: Some(readme_index),
                };
            }
            let linked = source_indices
                .iter()
                .find(|(_, e)| e.path == entry.path)
                .map(|(i, _)| *i);
            ManifestRow {
                path: entry.path.clone(),
                description: entry.classification.description(),
                linked_index: linked,
            }
        })
        .collect()
}

fn render_structure(sorted: &[&ClassifiedEntry]) -> String {
    let mut out = String::from("File structure of the repository:\n\n");
    for entry in sorted {
        out.push_str(&entry.path);
        out.push('\n');
    }
    out.trim_end().to_string()
}

fn render_manifest(rows: &[ManifestRow]) -> String {
    let width = rows.iter().map(|r| r.path.len()).max().unwrap_or(0);
    let mut out = String::from("Manifest of all files in the repository:\n\n");
    for row in rows {
        let link = match row.linked_index {
            Some(index) => format!("<link target=\"{index}\">{}</link>", row.path),
            None => format!("<skipped>{}</skipped>", row.path),
        };
        out.push_str(&format!(
            "{:<width$}  {}  {}\n",
            row.path,
            row.description,
            link,
            width = width
        ));
    }
    out.trim_end().to_string()
}
