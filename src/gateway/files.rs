use std::{cmp::Ordering, path::PathBuf};

use walkdir::{DirEntry, WalkDir};

/// Maximum number of entries visited across every root
const MAX_VISITED: usize = 100_000;

/// Walks the roots looking for files whose name resembles the term, using Jaro-Winkler similarity.
///
/// Returns at most `limit` paths scoring above `threshold`, best first.
pub(super) fn search_files(roots: &[PathBuf], term: &str, limit: usize, threshold: f64) -> Vec<String> {
    let term = term.to_lowercase();
    let mut scored: Vec<(f64, String)> = Vec::new();
    let mut visited = 0;
    for root in roots {
        let walker = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e));
        for entry in walker {
            visited += 1;
            if visited > MAX_VISITED {
                tracing::debug!("Stopped file search after {MAX_VISITED} entries");
                break;
            }
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::trace!("Skipping entry: {err}");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str() else {
                continue;
            };
            let score = strsim::jaro_winkler(&term, &name.to_lowercase());
            if score > threshold {
                let path = entry.path().display().to_string();
                if !scored.iter().any(|(_, p)| *p == path) {
                    scored.push((score, path));
                }
            }
        }
    }

    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
    scored.into_iter().take(limit).map(|(_, path)| path).collect()
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_str().is_some_and(|n| n.starts_with('.'))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_search_files_ranks_by_similarity() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("docs/archive")).unwrap();
        fs::write(dir.path().join("docs/report.pdf"), "").unwrap();
        fs::write(dir.path().join("docs/archive/report-2019.pdf"), "").unwrap();
        fs::write(dir.path().join("docs/holidays.jpg"), "").unwrap();

        let found = search_files(&[dir.path().to_path_buf()], "report.pdf", 8, 0.6);
        assert_eq!(
            found,
            vec![
                dir.path().join("docs/report.pdf").display().to_string(),
                dir.path().join("docs/archive/report-2019.pdf").display().to_string(),
            ]
        );
    }

    #[test]
    fn test_search_files_limit_and_hidden() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".cache")).unwrap();
        fs::write(dir.path().join(".cache/notes.txt"), "").unwrap();
        for i in 0..5 {
            fs::write(dir.path().join(format!("notes{i}.txt")), "").unwrap();
        }

        let found = search_files(&[dir.path().to_path_buf()], "notes", 3, 0.6);
        assert_eq!(found.len(), 3);
        assert!(found.iter().all(|p| !p.contains(".cache")));
    }
}
