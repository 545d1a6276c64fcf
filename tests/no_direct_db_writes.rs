// tests/no_direct_db_writes.rs
// Fails if SQLite write calls appear in runtime code outside the writer.
// Allowed: the writer, connection setup (pragmas) and inline test modules.

use std::fs;
use std::path::Path;
use walkdir::WalkDir;

fn is_whitelisted(path: &Path) -> bool {
    let p = path.to_string_lossy().replace('\\', "/");
    p.ends_with("/database/writer.rs") || p.ends_with("/database/connection.rs")
}

/// Source before the first `#[cfg(test)]` item.
fn runtime_part(content: &str) -> &str {
    match content.find("#[cfg(test)]") {
        Some(index) => &content[..index],
        None => content,
    }
}

#[test]
fn no_direct_db_writes_in_runtime() {
    let src_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("src");

    let bad_patterns = [
        ".execute(",
        ".execute_batch(",
        "stmt.insert(",
        "Transaction::execute(",
    ];

    let mut offenders: Vec<(String, String)> = Vec::new();
    for entry in WalkDir::new(&src_dir).into_iter().filter_map(Result::ok) {
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().map(|s| s != "rs").unwrap_or(true) {
            continue;
        }
        if is_whitelisted(path) {
            continue;
        }
        let Ok(content) = fs::read_to_string(path) else {
            continue;
        };
        let runtime = runtime_part(&content);
        for pat in &bad_patterns {
            if runtime.contains(pat) {
                offenders.push((path.to_string_lossy().to_string(), pat.to_string()));
            }
        }
    }

    if !offenders.is_empty() {
        let mut msg = String::from("Direct DB write calls found in runtime code:\n");
        for (file, pat) in offenders {
            msg.push_str(&format!("  {} contains pattern '{}': route through DbWriter instead\n", file, pat));
        }
        panic!("{}", msg);
    }
}

#[test]
fn writer_issues_statements() {
    let writer = Path::new(env!("CARGO_MANIFEST_DIR")).join("src/database/writer.rs");
    let content = fs::read_to_string(writer).unwrap();
    assert!(runtime_part(&content).contains(".execute("));
}
