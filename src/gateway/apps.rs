use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use walkdir::WalkDir;

use crate::model::Application;

/// Scans the directories for launchable applications: `.app` bundles, `.desktop` entries and `.lnk` shortcuts.
///
/// Results are de-duplicated by path and sorted by name.
pub(super) fn scan_applications(dirs: &[PathBuf]) -> Vec<Application> {
    let mut seen = HashSet::new();
    let mut apps = Vec::new();
    for dir in dirs {
        let mut walker = WalkDir::new(dir).min_depth(1).max_depth(4).into_iter();
        loop {
            let entry = match walker.next() {
                None => break,
                Some(Err(err)) => {
                    tracing::trace!("Skipping entry: {err}");
                    continue;
                }
                Some(Ok(entry)) => entry,
            };
            let path = entry.path();
            let name = match path.extension().and_then(|e| e.to_str()) {
                Some("app") => {
                    // Bundles may contain helper apps, which aren't listed
                    if entry.file_type().is_dir() {
                        walker.skip_current_dir();
                    }
                    stem_name(path)
                }
                Some("lnk") => stem_name(path),
                Some("desktop") => desktop_entry_name(path),
                _ => None,
            };
            if let Some(name) = name {
                let path = path.display().to_string();
                if seen.insert(path.clone()) {
                    apps.push(Application { name, path });
                }
            }
        }
    }
    apps.sort_by_key(|a| a.name.to_lowercase());
    apps
}

fn stem_name(path: &Path) -> Option<String> {
    path.file_stem().and_then(|n| n.to_str()).map(String::from)
}

/// Reads the `Name` of a desktop entry, skipping hidden ones
fn desktop_entry_name(path: &Path) -> Option<String> {
    let content = fs::read_to_string(path)
        .inspect_err(|err| tracing::trace!("Couldn't read {}: {err}", path.display()))
        .ok()?;
    parse_desktop_entry(&content)
}

fn parse_desktop_entry(content: &str) -> Option<String> {
    let mut in_main_group = false;
    let mut name = None;
    for line in content.lines().map(str::trim) {
        if line.starts_with('[') {
            in_main_group = line == "[Desktop Entry]";
            continue;
        }
        if !in_main_group {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        match (key.trim(), value.trim()) {
            ("Name", value) if name.is_none() => name = Some(value.to_owned()),
            ("NoDisplay" | "Hidden", "true") => return None,
            ("Type", value) if value != "Application" => return None,
            _ => (),
        }
    }
    name.filter(|n| !n.is_empty())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_desktop_entry() {
        let entry = "[Desktop Entry]\nType=Application\nName=Firefox\nName[es]=Firefox ES\nExec=firefox %u\n\n\
                     [Desktop Action new-window]\nName=New Window\n";
        assert_eq!(parse_desktop_entry(entry), Some(String::from("Firefox")));

        let hidden = "[Desktop Entry]\nType=Application\nName=Helper\nNoDisplay=true\n";
        assert_eq!(parse_desktop_entry(hidden), None);

        let link = "[Desktop Entry]\nType=Link\nName=Docs\nURL=https://example.com\n";
        assert_eq!(parse_desktop_entry(link), None);
    }

    #[test]
    fn test_scan_applications() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(
            root.join("zed.desktop"),
            "[Desktop Entry]\nType=Application\nName=Zed\nExec=zed\n",
        )
        .unwrap();
        fs::write(
            root.join("calc.desktop"),
            "[Desktop Entry]\nType=Application\nName=Calculator\nExec=calc\n",
        )
        .unwrap();
        fs::create_dir_all(root.join("Notes.app/Contents/Helpers/Sync.app")).unwrap();
        fs::create_dir_all(root.join("Accessories")).unwrap();
        fs::write(root.join("Accessories/Paint.lnk"), "").unwrap();
        fs::write(root.join("readme.txt"), "").unwrap();

        let apps = scan_applications(&[root.to_path_buf(), root.to_path_buf()]);
        let names = apps.iter().map(|a| a.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["Calculator", "Notes", "Paint", "Zed"]);
        assert_eq!(apps[1].path, root.join("Notes.app").display().to_string());
    }
}
