//! Content classification: decides, per archive entry, whether the file is
//! useful source, excluded by policy, binary, test code, or undecodable.
//!
//! `classify` is a pure function of (path, raw bytes, configuration). Rules
//! apply in a fixed precedence order and the first match wins, so a path
//! sitting in an excluded directory is excluded even when its extension
//! matches the language table. Policy exclusions are expected outcomes, not
//! errors; they are recorded in the manifest and never logged as warnings.

use crate::config::{CompileConfig, Language, BUILD_FILES, DOTFILE_ALLOWLIST};

/// Leading sample size used for binary sniffing.
const BINARY_SAMPLE_LEN: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Useful,
    Excluded,
    Binary,
    Test,
    Error,
}

/// The categorical decision for one file.
#[derive(Debug, Clone)]
pub struct Classification {
    pub category: Category,
    pub matched_language: Option<Language>,
    pub reason: Option<String>,
}

impl Classification {
    fn useful(language: Option<Language>) -> Self {
        Classification {
            category: Category::Useful,
            matched_language: language,
            reason: None,
        }
    }

    fn excluded(reason: impl Into<String>) -> Self {
        Classification {
            category: Category::Excluded,
            matched_language: None,
            reason: Some(reason.into()),
        }
    }

    fn test(reason: impl Into<String>, language: Option<Language>) -> Self {
        Classification {
            category: Category::Test,
            matched_language: language,
            reason: Some(reason.into()),
        }
    }

    fn binary() -> Self {
        Classification {
            category: Category::Binary,
            matched_language: None,
            reason: Some("binary file".to_string()),
        }
    }

    fn error(reason: impl Into<String>) -> Self {
        Classification {
            category: Category::Error,
            matched_language: None,
            reason: Some(reason.into()),
        }
    }

    pub fn is_useful(&self) -> bool {
        self.category == Category::Useful
    }

    /// Human-readable manifest description for this decision.
    pub fn description(&self) -> String {
        match self.category {
            Category::Useful => match self.matched_language {
                Some(lang) => format!("{} source", lang.name()),
                None => "build file".to_string(),
            },
            _ => self
                .reason
                .clone()
                .unwrap_or_else(|| "excluded".to_string()),
        }
    }
}

/// Classify one archive entry.
pub fn classify(path: &str, raw_bytes: &[u8], config: &CompileConfig) -> Classification {
    let language = config.language;

    if !config.include_all {
        // Rule 1: hidden path segments, with a small dotfile allowlist.
        if let Some(segment) = hidden_segment(path) {
            return Classification::excluded(format!("hidden path segment '{segment}'"));
        }

        // Rule 2: language-specific excluded directories.
        if let Some(dir) = excluded_dir(path, &language.excluded_dirs()) {
            return Classification::excluded(format!("inside excluded directory '{dir}'"));
        }

        // Rule 3: anything that merely looks like a test path.
        if path.to_lowercase().contains("test") {
            return Classification::test("test file (path)", None);
        }

        // Utility, workflow, and documentation files.
        for name in language.utility_files() {
            if path.contains(name) {
                return Classification::excluded(format!("utility or config file '{name}'"));
            }
        }
        for name in language.workflow_docs() {
            if path.contains(name) {
                return Classification::excluded(format!("workflow or documentation file '{name}'"));
            }
        }
    }

    // Rule 4: extension table (or recognized extensionless build file).
    // Include-all means exactly that: every non-binary file is kept, so the
    // table only decides the language tag in that mode.
    let matched = match_language(path, language);
    if !config.include_all {
        let is_build_file = basename(path)
            .map(|b| BUILD_FILES.contains(&b))
            .unwrap_or(false);
        if matched.is_none() && !is_build_file {
            return Classification::excluded(format!(
                "extension not in '{}' language set",
                language.name()
            ));
        }
    }

    // Rule 5: binary sniffing on the leading sample. Binary entries are kept
    // in the manifest but never emitted, include-all or not.
    let sample = &raw_bytes[..raw_bytes.len().min(BINARY_SAMPLE_LEN)];
    if is_binary_sample(sample) {
        return Classification::binary();
    }

    // Full decode. Failure here is per-entry recoverable, recorded as an
    // error classification rather than aborting the run.
    let content = match std::str::from_utf8(raw_bytes) {
        Ok(content) => content,
        Err(_) => return Classification::error("invalid UTF-8 content"),
    };

    if !config.include_all {
        // Rule 6: content-based test detection.
        if let Some(lang) = matched {
            if let Some(marker) = test_marker(content, lang) {
                return Classification::test(format!("test framework usage ('{marker}')"), matched);
            }
        }

        // Rule 7: substantive-content floor.
        let substantive = substantive_line_count(content);
        if substantive < config.min_lines {
            return Classification::excluded(format!(
                "only {substantive} substantive lines (minimum {})",
                config.min_lines
            ));
        }
    }

    Classification::useful(matched)
}

fn basename(path: &str) -> Option<&str> {
    path.rsplit('/').next().filter(|b| !b.is_empty())
}

/// First path segment starting with `.` that is not an allow-listed dotfile.
fn hidden_segment(path: &str) -> Option<&str> {
    path.split('/').find(|segment| {
        segment.starts_with('.') && !DOTFILE_ALLOWLIST.contains(segment)
    })
}

fn excluded_dir<'a>(path: &str, dirs: &[&'a str]) -> Option<&'a str> {
    dirs.iter()
        .find(|dir| {
            path.contains(&format!("/{dir}/")) || path.starts_with(&format!("{dir}/"))
        })
        .copied()
}

/// Which concrete language's extension table matches this path, if any.
fn match_language(path: &str, language: Language) -> Option<Language> {
    language
        .concrete_languages()
        .iter()
        .find(|lang| lang.extensions().iter().any(|ext| path.ends_with(ext)))
        .copied()
}

/// Binary means: invalid UTF-8 inside the sample, or a NUL byte. A decode
/// error exactly at the sample boundary is just a truncated multi-byte
/// character and does not count.
fn is_binary_sample(sample: &[u8]) -> bool {
    match std::str::from_utf8(sample) {
        Ok(_) => sample.contains(&0),
        Err(e) => e.error_len().is_some() || sample[..e.valid_up_to()].contains(&0),
    }
}

fn test_marker(content: &str, language: Language) -> Option<&'static str> {
    language
        .test_indicators()
        .iter()
        .find(|marker| content.contains(*marker))
        .copied()
}

/// Non-blank lines that are not comment-prefixed.
pub fn substantive_line_count(content: &str) -> usize {
    content
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#') && !trimmed.starts_with("//")
        })
        .count()
}
