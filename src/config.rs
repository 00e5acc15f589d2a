//! Unified compile configuration.
//!
//! One configuration object covers every knob the pipeline understands, so
//! there is a single code path instead of parallel near-duplicate pipelines
//! per output flavour. Everything here is plain data; the pipeline never
//! mutates it.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::info;

/// How the final artifact is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Flat concatenation: one `# File: path` header per file, no manifest.
    Plain,
    /// Tagged document envelope with a manifest and stable indices.
    Structured,
}

/// Recognized language categories. `All` unions every extension table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Go,
    Javascript,
    Java,
    // The CLI accepts both spellings; the config file does too.
    #[serde(alias = "md")]
    Markdown,
    All,
}

impl Language {
    pub fn parse(name: &str) -> Option<Language> {
        match name.to_ascii_lowercase().as_str() {
            "python" => Some(Language::Python),
            "go" => Some(Language::Go),
            "javascript" => Some(Language::Javascript),
            "java" => Some(Language::Java),
            "md" | "markdown" => Some(Language::Markdown),
            "all" => Some(Language::All),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Go => "go",
            Language::Javascript => "javascript",
            Language::Java => "java",
            Language::Markdown => "markdown",
            Language::All => "all",
        }
    }

    /// Fixed extension table for one concrete language.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Language::Python => &[".py", ".pyw"],
            Language::Go => &[".go"],
            Language::Javascript => &[".js", ".jsx", ".ts", ".tsx"],
            Language::Java => &[".java"],
            Language::Markdown => &[".md"],
            // `All` has no table of its own; see `concrete_languages`.
            Language::All => &[],
        }
    }

    /// The concrete languages a category stands for.
    pub fn concrete_languages(&self) -> &'static [Language] {
        match self {
            Language::All => &[
                Language::Python,
                Language::Go,
                Language::Javascript,
                Language::Java,
                Language::Markdown,
            ],
            Language::Python => &[Language::Python],
            Language::Go => &[Language::Go],
            Language::Javascript => &[Language::Javascript],
            Language::Java => &[Language::Java],
            Language::Markdown => &[Language::Markdown],
        }
    }

    /// Comment marker used by plain-mode file headers.
    pub fn comment_marker(&self) -> &'static str {
        match self {
            Language::Go | Language::Javascript | Language::Java => "// ",
            _ => "# ",
        }
    }

    /// Directory segments whose contents are never useful for this language.
    pub fn excluded_dirs(&self) -> Vec<&'static str> {
        let mut dirs = vec!["examples", "tests", "test", "scripts", "utils", "benchmarks"];
        match self {
            Language::Python => dirs.push("__pycache__"),
            Language::Go => dirs.push("vendor"),
            Language::All => {
                dirs.push("__pycache__");
                dirs.push("vendor");
            }
            _ => {}
        }
        dirs
    }

    /// Utility/config basenames that carry no source content worth emitting.
    pub fn utility_files(&self) -> Vec<&'static str> {
        match self {
            Language::Python => vec!["hubconf.py", "setup.py"],
            Language::Go => vec!["go.mod", "go.sum", "Makefile"],
            Language::All => vec!["hubconf.py", "setup.py", "go.mod", "go.sum"],
            _ => vec![],
        }
    }

    /// Workflow and documentation markers excluded from the document body.
    pub fn workflow_docs(&self) -> Vec<&'static str> {
        let mut docs = vec![".github", ".gitlab-ci.yml", "LICENSE", "README"];
        if matches!(self, Language::Python | Language::All) {
            docs.extend(["stale.py", "gen-card-", "write_model_card"]);
        }
        docs
    }

    /// Content substrings that mark a file as test code.
    pub fn test_indicators(&self) -> &'static [&'static str] {
        match self {
            Language::Python => &[
                "import unittest",
                "import pytest",
                "from unittest",
                "from pytest",
            ],
            Language::Go => &["import testing", "func Test"],
            _ => &[],
        }
    }
}

/// Extensionless basenames accepted as build files.
pub const BUILD_FILES: &[&str] = &["Makefile", "Dockerfile"];

/// Dotfiles that escape the leading-dot exclusion.
pub const DOTFILE_ALLOWLIST: &[&str] =
    &[".gitignore", ".gitattributes", ".dockerignore", ".env.example"];

/// Default floor for substantive (non-blank, non-comment) lines.
pub const DEFAULT_MIN_LINES: usize = 10;

/// The one configuration object for a compile run.
#[derive(Debug, Clone)]
pub struct CompileConfig {
    pub language: Language,
    /// Disable the path-usefulness filters and content floors.
    pub include_all: bool,
    /// Skip comment/docstring stripping.
    pub keep_comments: bool,
    pub output_mode: OutputMode,
    /// Prepend the raw sorted file-structure listing as its own document.
    pub file_list: bool,
    pub min_lines: usize,
    pub output_dir: PathBuf,
}

impl Default for CompileConfig {
    fn default() -> Self {
        CompileConfig {
            language: Language::Python,
            include_all: false,
            keep_comments: false,
            output_mode: OutputMode::Plain,
            file_list: false,
            min_lines: DEFAULT_MIN_LINES,
            output_dir: PathBuf::from("repos"),
        }
    }
}

impl CompileConfig {
    pub fn trace_loaded(&self) {
        info!(
            language = self.language.name(),
            include_all = self.include_all,
            keep_comments = self.keep_comments,
            output_mode = ?self.output_mode,
            output_dir = %self.output_dir.display(),
            "Compile configuration ready"
        );
    }
}
