//! End-to-end pipeline tests against mocked transports: no network, real
//! archives, real filesystem output.

mod common;

use repo2doc::compile::{compile, CompileError, CompileRequest};
use repo2doc::config::{CompileConfig, Language, OutputMode};
use repo2doc::fetch::{FetchError, MockArchiveFetcher};
use repo2doc::resolve::MockBranchLister;

fn request(reference: Option<&str>) -> CompileRequest {
    CompileRequest {
        repo_url: "https://github.com/acme/widget".to_string(),
        reference: reference.map(str::to_string),
        token: None,
    }
}

fn fetcher_returning(zip: Vec<u8>) -> MockArchiveFetcher {
    let mut fetcher = MockArchiveFetcher::new();
    fetcher
        .expect_fetch_archive()
        .returning(move |_, _, _| Ok(zip.clone()));
    fetcher
}

fn scenario_zip() -> Vec<u8> {
    let calc = common::python_module(50);
    let test_file = "import pytest\n\ndef test_add():\n    assert 1 + 1 == 2\n";
    common::zip_bytes(&[
        ("widget-main/README.md", b"# Widget\n"),
        ("widget-main/src/calc.py", calc.as_bytes()),
        ("widget-main/tests/test_calc.py", test_file.as_bytes()),
    ])
}

#[tokio::test]
async fn structured_run_emits_readme_manifest_and_one_source_document() {
    let dir = tempfile::tempdir().unwrap();
    let config = CompileConfig {
        language: Language::Python,
        output_mode: OutputMode::Structured,
        output_dir: dir.path().to_path_buf(),
        ..CompileConfig::default()
    };
    let fetcher = fetcher_returning(scenario_zip());
    let lister = MockBranchLister::new();

    let report = compile(&request(Some("v1.2")), &config, &fetcher, &lister)
        .await
        .unwrap();

    assert_eq!(report.entries, 3);
    assert_eq!(report.included, 1);
    // README and the test directory both fall to path policy.
    assert_eq!(report.excluded, 2);
    // README + MANIFEST + calc.py
    assert_eq!(report.documents, 3);
    assert_eq!(
        report.output_file,
        dir.path().join("widget_python-structured.txt")
    );

    let text = std::fs::read_to_string(&report.output_file).unwrap();
    assert!(text.contains("<source>widget-main/src/calc.py</source>"));
    assert!(text.contains("<skipped>widget-main/tests/test_calc.py</skipped>"));
    assert!(text.contains(&format!(
        "<link target=\"{}\">widget-main/src/calc.py</link>",
        report.documents - 1
    )));
}

#[tokio::test]
async fn two_runs_over_the_same_archive_are_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let config = CompileConfig {
        language: Language::Python,
        output_mode: OutputMode::Structured,
        output_dir: dir.path().to_path_buf(),
        ..CompileConfig::default()
    };
    let fetcher = fetcher_returning(scenario_zip());
    let lister = MockBranchLister::new();

    let first = compile(&request(Some("v1.2")), &config, &fetcher, &lister)
        .await
        .unwrap();
    let first_bytes = std::fs::read(&first.output_file).unwrap();

    let second = compile(&request(Some("v1.2")), &config, &fetcher, &lister)
        .await
        .unwrap();
    let second_bytes = std::fs::read(&second.output_file).unwrap();

    assert_eq!(first.output_file, second.output_file);
    assert_eq!(first_bytes, second_bytes);
}

#[tokio::test]
async fn resolved_reference_is_the_one_fetched() {
    let dir = tempfile::tempdir().unwrap();
    let config = CompileConfig {
        language: Language::Python,
        output_dir: dir.path().to_path_buf(),
        ..CompileConfig::default()
    };

    let zip = scenario_zip();
    let mut fetcher = MockArchiveFetcher::new();
    fetcher
        .expect_fetch_archive()
        .withf(|_, reference, _| reference == "master")
        .returning(move |_, _, _| Ok(zip.clone()));
    let mut lister = MockBranchLister::new();
    lister
        .expect_list_branches()
        .returning(|_, _| Ok(vec!["develop".to_string(), "master".to_string()]));

    let report = compile(&request(None), &config, &fetcher, &lister)
        .await
        .unwrap();
    assert_eq!(report.reference, "master");
}

#[tokio::test]
async fn comment_stripping_is_on_by_default_and_off_with_keep_comments() {
    let mut source = String::from(
        "def add(a, b):\n    \"\"\"Add two numbers.\"\"\"\n    return a + b  # sum\n",
    );
    source.push_str(&common::python_module(20));
    let zip = common::zip_bytes(&[("widget-main/calc.py", source.as_bytes())]);

    let dir = tempfile::tempdir().unwrap();
    let mut config = CompileConfig {
        language: Language::Python,
        output_dir: dir.path().to_path_buf(),
        ..CompileConfig::default()
    };
    let fetcher = fetcher_returning(zip);
    let lister = MockBranchLister::new();

    let report = compile(&request(Some("v1.2")), &config, &fetcher, &lister)
        .await
        .unwrap();
    let stripped = std::fs::read_to_string(&report.output_file).unwrap();
    assert!(!stripped.contains("Add two numbers"));
    assert!(!stripped.contains("# sum"));
    assert!(stripped.contains("return a + b"));

    config.keep_comments = true;
    let report = compile(&request(Some("v1.2")), &config, &fetcher, &lister)
        .await
        .unwrap();
    let kept = std::fs::read_to_string(&report.output_file).unwrap();
    assert!(kept.contains("Add two numbers"));
    assert!(kept.contains("# sum"));
}

#[tokio::test]
async fn binary_content_is_never_emitted_even_with_include_all() {
    let zip = common::zip_bytes(&[
        ("widget-main/README.md", b"# Widget\n" as &[u8]),
        ("widget-main/data.bin", b"\x00\x01\x02\x03binary"),
    ]);
    let dir = tempfile::tempdir().unwrap();
    let config = CompileConfig {
        language: Language::All,
        output_mode: OutputMode::Structured,
        include_all: true,
        output_dir: dir.path().to_path_buf(),
        ..CompileConfig::default()
    };
    let fetcher = fetcher_returning(zip);
    let lister = MockBranchLister::new();

    let report = compile(&request(Some("v1.2")), &config, &fetcher, &lister)
        .await
        .unwrap();
    assert_eq!(report.binary, 1);

    let text = std::fs::read_to_string(&report.output_file).unwrap();
    assert!(!text.contains('\u{0}'));
    assert!(text.contains("<skipped>widget-main/data.bin</skipped>"));
}

#[tokio::test]
async fn undecodable_entry_degrades_without_aborting_the_run() {
    // Valid ascii past the 1 KiB binary-sniffing sample, invalid bytes at
    // the end, so the failure surfaces at full decode rather than sniffing.
    let mut bad = common::python_module(80).into_bytes();
    bad.extend_from_slice(&[0xFF, 0xFE]);
    let good = common::python_module(50);
    let zip = common::zip_bytes(&[
        ("widget-main/README.md", b"# Widget\n"),
        ("widget-main/src/calc.py", good.as_bytes()),
        ("widget-main/src/bad.py", &bad),
    ]);

    let dir = tempfile::tempdir().unwrap();
    let config = CompileConfig {
        language: Language::Python,
        output_mode: OutputMode::Structured,
        output_dir: dir.path().to_path_buf(),
        ..CompileConfig::default()
    };
    let fetcher = fetcher_returning(zip);
    let lister = MockBranchLister::new();

    let report = compile(&request(Some("v1.2")), &config, &fetcher, &lister)
        .await
        .unwrap();
    assert_eq!(report.errors, 1);
    assert_eq!(report.included, 1);

    let text = std::fs::read_to_string(&report.output_file).unwrap();
    assert!(text.contains("<skipped>widget-main/src/bad.py</skipped>"));
    assert!(text.contains("<source>widget-main/src/calc.py</source>"));
}

#[tokio::test]
async fn plain_mode_writes_the_unsuffixed_artifact_name() {
    let dir = tempfile::tempdir().unwrap();
    let config = CompileConfig {
        language: Language::Python,
        output_mode: OutputMode::Plain,
        output_dir: dir.path().to_path_buf(),
        ..CompileConfig::default()
    };
    let fetcher = fetcher_returning(scenario_zip());
    let lister = MockBranchLister::new();

    let report = compile(&request(Some("v1.2")), &config, &fetcher, &lister)
        .await
        .unwrap();
    assert_eq!(report.output_file, dir.path().join("widget_python.txt"));

    let text = std::fs::read_to_string(&report.output_file).unwrap();
    assert!(text.starts_with("# File: widget-main/README.md\n"));
    assert!(!text.contains("<document"));
}

#[tokio::test]
async fn failed_download_aborts_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = CompileConfig {
        output_dir: dir.path().to_path_buf(),
        ..CompileConfig::default()
    };
    let mut fetcher = MockArchiveFetcher::new();
    fetcher.expect_fetch_archive().returning(|_, _, _| {
        Err(FetchError::Status(
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
        ))
    });
    let lister = MockBranchLister::new();

    let err = compile(&request(Some("v1.2")), &config, &fetcher, &lister)
        .await
        .unwrap_err();
    assert!(matches!(err, CompileError::Fetch(FetchError::Status(_))));

    // Nothing partial may appear in the output directory.
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn garbage_archive_bytes_are_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let config = CompileConfig {
        output_dir: dir.path().to_path_buf(),
        ..CompileConfig::default()
    };
    let fetcher = fetcher_returning(b"not a zip archive".to_vec());
    let lister = MockBranchLister::new();

    let err = compile(&request(Some("v1.2")), &config, &fetcher, &lister)
        .await
        .unwrap_err();
    assert!(matches!(err, CompileError::Archive(_)));
}
