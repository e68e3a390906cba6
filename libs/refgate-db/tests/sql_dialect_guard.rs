//! Keeps query literals portable so the store can move off SQLite without rewrites.

use std::fs;
use std::path::{Path, PathBuf};

fn collect_rs_files(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_rs_files(&path, out);
        } else if path.extension().and_then(|s| s.to_str()) == Some("rs") {
            out.push(path);
        }
    }
}

fn line_number(content: &str, byte_idx: usize) -> usize {
    content[..byte_idx].bytes().filter(|b| *b == b'\n').count() + 1
}

/// Returns the first string literal argument of a call starting at `call_idx`, if any.
fn first_literal_after(content: &str, call_idx: usize) -> Option<(usize, String)> {
    let open = call_idx + content[call_idx..].find('(')? + 1;
    let rest = content[open..].trim_start();
    let start = content.len() - rest.len();
    let bytes = rest.as_bytes();

    match bytes.first()? {
        b'r' => {
            let hashes = rest[1..].chars().take_while(|c| *c == '#').count();
            if rest.as_bytes().get(1 + hashes) != Some(&b'"') {
                return None;
            }
            let body_start = 2 + hashes;
            let terminator = format!("\"{}", "#".repeat(hashes));
            let end = rest[body_start..].find(&terminator)?;
            Some((start, rest[body_start..body_start + end].to_string()))
        }
        b'"' => {
            let mut escaped = false;
            for (i, b) in bytes.iter().enumerate().skip(1) {
                match b {
                    _ if escaped => escaped = false,
                    b'\\' => escaped = true,
                    b'"' => return Some((start, rest[1..i].to_string())),
                    _ => {}
                }
            }
            None
        }
        _ => None,
    }
}

fn query_literals() -> Vec<(PathBuf, usize, String)> {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("src");
    let mut files = Vec::new();
    collect_rs_files(&root, &mut files);

    let mut found = Vec::new();
    for file in files {
        let Ok(content) = fs::read_to_string(&file) else {
            continue;
        };
        let mut pos = 0usize;
        while let Some(rel) = content[pos..].find("sqlx::query") {
            let idx = pos + rel;
            if let Some((at, sql)) = first_literal_after(&content, idx) {
                found.push((file.clone(), line_number(&content, at), sql));
            }
            pos = idx + "sqlx::query".len();
        }
    }
    found
}

#[test]
fn guard_sees_the_repositories() {
    assert!(
        query_literals().len() > 10,
        "expected to find the repository queries; has the source layout changed?"
    );
}

#[test]
fn query_literals_use_numbered_placeholders() {
    let violations: Vec<String> = query_literals()
        .into_iter()
        .filter(|(_, _, sql)| sql.contains('?'))
        .map(|(file, line, _)| format!("{}:{} uses a '?' placeholder", file.display(), line))
        .collect();

    assert!(
        violations.is_empty(),
        "Found positional placeholders in SQL literals:\n{}",
        violations.join("\n")
    );
}

#[test]
fn query_literals_avoid_sqlite_only_syntax() {
    const SQLITE_ONLY: [&str; 5] = [
        "insert or ignore",
        "insert or replace",
        "strftime(",
        "datetime(",
        "autoincrement",
    ];

    let violations: Vec<String> = query_literals()
        .into_iter()
        .filter(|(_, _, sql)| {
            let lower = sql.to_lowercase();
            SQLITE_ONLY.iter().any(|needle| lower.contains(needle))
        })
        .map(|(file, line, _)| format!("{}:{} uses SQLite-only syntax", file.display(), line))
        .collect();

    assert!(
        violations.is_empty(),
        "Found SQLite-specific SQL in query literals:\n{}",
        violations.join("\n")
    );
}
