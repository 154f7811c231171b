use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::BotError;

/// A supported countdown and the label shown on its button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownOption {
    pub duration: u32,
    pub label: &'static str,
}

pub const COUNTDOWN_OPTIONS: [CountdownOption; 6] = [
    CountdownOption { duration: 5, label: "5️⃣ Countdown 5 to 0" },
    CountdownOption { duration: 10, label: "🔟 Countdown 10 to 0" },
    CountdownOption { duration: 15, label: "1️⃣5️⃣ Countdown 15 to 0" },
    CountdownOption { duration: 20, label: "2️⃣0️⃣ Countdown 20 to 0" },
    CountdownOption { duration: 25, label: "2️⃣5️⃣ Countdown 25 to 0" },
    CountdownOption { duration: 30, label: "3️⃣0️⃣ Countdown 30 to 0" },
];

/// A countdown clip resolved to a file that existed at lookup time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioResource {
    pub duration: u32,
    pub file_name: String,
    pub path: PathBuf,
}

/// Maps countdown durations to `{duration}to0.{ext}` files in one directory.
///
/// Only existence is checked; format and length are trusted from the name.
#[derive(Debug, Clone)]
pub struct AudioCatalog {
    dir: PathBuf,
    extension: String,
}

impl AudioCatalog {
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn file_name(&self, duration: u32) -> String {
        format!("{}to0.{}", duration, self.extension)
    }

    pub fn resolve(&self, duration: u32) -> Result<AudioResource, BotError> {
        let file_name = self.file_name(duration);
        let path = self.dir.join(&file_name);

        if !path.is_file() {
            debug!("Audio file missing: {}", path.display());
            return Err(BotError::ResourceNotFound { file: file_name });
        }

        Ok(AudioResource {
            duration,
            file_name,
            path,
        })
    }

    /// File names of supported countdowns that are not on disk.
    pub fn missing_files(&self) -> Vec<String> {
        COUNTDOWN_OPTIONS
            .iter()
            .filter(|option| self.resolve(option.duration).is_err())
            .map(|option| self.file_name(option.duration))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn catalog_with(durations: &[u32]) -> (tempfile::TempDir, AudioCatalog) {
        let dir = tempfile::tempdir().unwrap();
        for duration in durations {
            std::fs::write(dir.path().join(format!("{}to0.mp3", duration)), b"ID3").unwrap();
        }
        let catalog = AudioCatalog::new(dir.path(), "mp3");
        (dir, catalog)
    }

    #[test]
    fn test_resolves_existing_file() {
        let (dir, catalog) = catalog_with(&[10]);

        let resource = catalog.resolve(10).unwrap();

        assert_eq!(resource.file_name, "10to0.mp3");
        assert_eq!(resource.path, dir.path().join("10to0.mp3"));
        assert_eq!(resource.duration, 10);
    }

    #[test]
    fn test_missing_file_is_resource_not_found() {
        let (_dir, catalog) = catalog_with(&[5]);

        assert_eq!(
            catalog.resolve(7),
            Err(BotError::ResourceNotFound {
                file: "7to0.mp3".to_string()
            })
        );
    }

    #[test]
    fn test_directory_named_like_clip_is_not_a_resource() {
        let (dir, catalog) = catalog_with(&[]);
        std::fs::create_dir(dir.path().join("15to0.mp3")).unwrap();

        assert!(catalog.resolve(15).is_err());
    }

    #[test]
    fn test_missing_files_lists_only_absent_options() {
        let (_dir, catalog) = catalog_with(&[5, 10, 15, 20]);

        assert_eq!(catalog.missing_files(), vec!["25to0.mp3", "30to0.mp3"]);
    }

    #[test]
    fn test_options_are_unique_and_ordered() {
        let durations: Vec<u32> = COUNTDOWN_OPTIONS.iter().map(|o| o.duration).collect();

        assert_eq!(durations, vec![5, 10, 15, 20, 25, 30]);
    }
}
