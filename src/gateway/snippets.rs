use std::path::Path;

use tokio::fs;

use crate::{errors::Result, model::Snippet};

/// Reads every file in the directory as a snippet named after the file stem.
///
/// A missing directory has no snippets.
pub(super) async fn read_snippets(dir: &Path) -> Result<Vec<Snippet>> {
    if !fs::try_exists(dir).await? {
        tracing::debug!("Snippets dir {} doesn't exist", dir.display());
        return Ok(Vec::new());
    }

    let mut snippets = Vec::new();
    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let Some(name) = path.file_stem().and_then(|n| n.to_str()) else {
            continue;
        };
        match fs::read_to_string(&path).await {
            Ok(content) => snippets.push(Snippet {
                name: name.to_owned(),
                content,
            }),
            Err(err) => tracing::warn!("Skipping snippet {}: {err}", path.display()),
        }
    }
    snippets.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(snippets)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[tokio::test]
    async fn test_read_snippets() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("signature.txt"), "Best regards,\nMe").unwrap();
        std::fs::write(dir.path().join("address"), "221B Baker Street").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let snippets = read_snippets(dir.path()).await.unwrap();
        assert_eq!(
            snippets,
            vec![
                Snippet {
                    name: String::from("address"),
                    content: String::from("221B Baker Street"),
                },
                Snippet {
                    name: String::from("signature"),
                    content: String::from("Best regards,\nMe"),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_read_snippets_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let snippets = read_snippets(&dir.path().join("missing")).await.unwrap();
        assert!(snippets.is_empty());
    }
}
