use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Build an in-memory zip archive from (path, bytes) pairs.
pub fn zip_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (path, content) in files {
        writer.start_file(*path, options).expect("start_file");
        writer.write_all(content).expect("write entry");
    }
    writer.finish().expect("finish zip").into_inner()
}

/// A python file with `n` substantive lines.
pub fn python_module(n: usize) -> String {
    let mut out = String::from("def main():\n");
    for i in 0..n.saturating_sub(1) {
        out.push_str(&format!("    value_{i} = {i}\n"));
    }
    out
}
