//! Controller discovery.

use std::path::Path;

use tokio::fs::read_dir;

use crate::consts::FILE_MAX_BRIGHTNESS;
use crate::errors::*;
use crate::storage;

make_log_macro!(debug, "ctrl");

/// List every controller under the given sysfs prefix, sorted so that
/// iteration and output order are deterministic.
pub(crate) async fn enumerate(sys_prefix: &Path) -> Result<Vec<String>> {
    let mut entries = read_dir(sys_prefix).await?;
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        names.push(entry.file_name().to_string_lossy().to_string());
    }
    names.sort();
    Ok(names)
}

/// Pick the controller with the highest maximum brightness, returning
/// its name along with the maximum read during selection.
pub(crate) async fn auto_select(sys_prefix: &Path) -> Result<(String, u64)> {
    let mut best: Option<(String, u64)> = None;
    for name in enumerate(sys_prefix).await? {
        let max_path = sys_prefix.join(&name).join(FILE_MAX_BRIGHTNESS);
        let max = match storage::read_value(&max_path).await {
            Ok(max) => max,
            Err(e) => {
                debug!("skipping '{name}': {e}");
                continue;
            }
        };
        match &best {
            Some((_, best_max)) if *best_max >= max => {}
            _ => best = Some((name, max)),
        }
    }
    best.ok_or_else(|| LumenError::NoControllers(sys_prefix.display().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn add_controller(root: &Path, name: &str, max: Option<u64>) {
        let dir = root.join(name);
        std::fs::create_dir_all(&dir).unwrap();
        if let Some(max) = max {
            std::fs::write(dir.join("max_brightness"), max.to_string()).unwrap();
        }
    }

    #[tokio::test]
    async fn enumerate_returns_sorted_names() {
        let tmp = TempDir::new().unwrap();
        add_controller(tmp.path(), "zzz", Some(1));
        add_controller(tmp.path(), "aaa", Some(1));
        add_controller(tmp.path(), "mmm", Some(1));
        assert_eq!(enumerate(tmp.path()).await.unwrap(), ["aaa", "mmm", "zzz"]);
    }

    #[tokio::test]
    async fn auto_select_picks_the_highest_maximum() {
        let tmp = TempDir::new().unwrap();
        add_controller(tmp.path(), "dim", Some(255));
        add_controller(tmp.path(), "bright", Some(1023));
        let (name, max) = auto_select(tmp.path()).await.unwrap();
        assert_eq!(name, "bright");
        assert_eq!(max, 1023);
    }

    #[tokio::test]
    async fn auto_select_skips_unreadable_controllers() {
        let tmp = TempDir::new().unwrap();
        add_controller(tmp.path(), "broken", None);
        add_controller(tmp.path(), "working", Some(100));
        let (name, _) = auto_select(tmp.path()).await.unwrap();
        assert_eq!(name, "working");
    }

    #[tokio::test]
    async fn auto_select_fails_with_nothing_usable() {
        let tmp = TempDir::new().unwrap();
        add_controller(tmp.path(), "broken", None);
        assert!(matches!(
            auto_select(tmp.path()).await,
            Err(LumenError::NoControllers(_))
        ));
    }
}
