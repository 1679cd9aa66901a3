use std::fs;
use std::path::{Path, PathBuf};

fn collect_rs_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        if let Ok(read_dir) = fs::read_dir(&dir) {
            for entry in read_dir.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    stack.push(path);
                } else if path.extension().map(|e| e == "rs").unwrap_or(false) {
                    files.push(path);
                }
            }
        }
    }
    files
}

/// Source text without the trailing `#[cfg(test)]` module
fn production_source(path: &Path) -> String {
    let content = fs::read_to_string(path).unwrap_or_default();
    match content.find("#[cfg(test)]") {
        Some(idx) => content[..idx].to_string(),
        None => content,
    }
}

fn offenders(needles: &[&str]) -> Vec<String> {
    let services_root = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("src")
        .join("services");

    collect_rs_files(&services_root)
        .into_iter()
        .filter(|file| {
            let source = production_source(file);
            needles.iter().any(|needle| source.contains(needle))
        })
        .map(|file| file.to_string_lossy().to_string())
        .collect()
}

#[test]
fn pipeline_stages_do_not_read_the_clock() {
    let found = offenders(&["Utc::now", "SystemTime::now", "Local::now"]);
    if !found.is_empty() {
        panic!(
            "Pipeline stages must take `now` from the request, not the wall clock. Offenders: {:?}",
            found
        );
    }
}

#[test]
fn pipeline_stages_do_not_touch_the_environment() {
    let found = offenders(&["std::env::", "env::var", "std::fs::", "std::io::stdin"]);
    if !found.is_empty() {
        panic!(
            "Pipeline stages must stay free of environment and I/O access. Offenders: {:?}",
            found
        );
    }
}
