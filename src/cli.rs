//! CLI glue: argument parsing, config merging, and the async entrypoint
//! shared by `main` and the integration tests. All pipeline logic lives in
//! the library modules; this module only wires them together.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use crate::compile::{compile, CompileRequest};
use crate::config::{CompileConfig, Language, OutputMode, DEFAULT_MIN_LINES};
use crate::fetch::HttpArchiveFetcher;
use crate::load_config::{load_config, FileConfig};
use crate::resolve::HttpBranchLister;

/// Compile a remote repository archive into a single text document.
#[derive(Parser)]
#[clap(
    name = "repo2doc",
    version,
    about = "Compile a GitHub/GitLab repository archive into a single ordered text document for LLM ingestion"
)]
pub struct Cli {
    /// The URL of the GitHub or GitLab repository
    pub repo_url: String,

    /// The programming language of the repository (python, go, javascript, java, md, all)
    #[clap(long)]
    pub lang: Option<String>,

    /// The branch or tag to download; resolved against the hosting service when omitted
    #[clap(long)]
    pub branch_or_tag: Option<String>,

    /// Personal access token for private repositories
    #[clap(long)]
    pub token: Option<String>,

    /// Emit the tagged document envelope with a manifest instead of a flat concatenation
    #[clap(long)]
    pub structured: bool,

    /// Include files the usefulness filters would normally drop
    #[clap(long)]
    pub include_all: bool,

    /// Keep comments and docstrings in the source code
    #[clap(long)]
    pub keep_comments: bool,

    /// Prepend the raw sorted file-structure listing as its own document
    #[clap(long)]
    pub file_list: bool,

    /// Minimum number of substantive lines a file must have
    #[clap(long)]
    pub min_lines: Option<usize>,

    /// The folder where the artifact is written
    #[clap(long)]
    pub output_folder: Option<PathBuf>,

    /// Path to a YAML config file supplying defaults for the flags above
    #[clap(long)]
    pub config: Option<PathBuf>,
}

/// Async CLI entrypoint, extracted for integration tests and `main()`.
pub async fn run(cli: Cli) -> Result<()> {
    info!("trace_initialised");

    let defaults = match &cli.config {
        Some(path) => load_config(path)?,
        None => FileConfig::default(),
    };

    let config = merge_config(&cli, &defaults)?;
    config.trace_loaded();

    let token = cli
        .token
        .clone()
        .or_else(|| std::env::var("GITHUB_TOKEN").ok())
        .or_else(|| std::env::var("GITLAB_TOKEN").ok());

    let request = CompileRequest {
        repo_url: cli.repo_url.clone(),
        reference: cli.branch_or_tag.clone().or(defaults.branch_or_tag),
        token,
    };

    let fetcher = HttpArchiveFetcher::new();
    let lister = HttpBranchLister::new();
    let report = compile(&request, &config, &fetcher, &lister).await?;

    println!("Compilation complete.\nReport:");
    println!("{report:#?}");
    Ok(())
}

/// CLI flags win over file-config values; built-in defaults fill the rest.
fn merge_config(cli: &Cli, defaults: &FileConfig) -> Result<CompileConfig> {
    let language = match &cli.lang {
        Some(name) => Language::parse(name)
            .ok_or_else(|| anyhow::anyhow!("Unknown language: {name}"))?,
        None => defaults.language.unwrap_or(Language::Python),
    };

    let output_mode = if cli.structured {
        OutputMode::Structured
    } else {
        defaults.output_mode.unwrap_or(OutputMode::Plain)
    };

    Ok(CompileConfig {
        language,
        include_all: cli.include_all || defaults.include_all.unwrap_or(false),
        keep_comments: cli.keep_comments || defaults.keep_comments.unwrap_or(false),
        output_mode,
        file_list: cli.file_list || defaults.file_list.unwrap_or(false),
        min_lines: cli
            .min_lines
            .or(defaults.min_lines)
            .unwrap_or(DEFAULT_MIN_LINES),
        output_dir: cli
            .output_folder
            .clone()
            .or_else(|| defaults.output_dir.clone())
            .unwrap_or_else(|| PathBuf::from("repos")),
    })
}
