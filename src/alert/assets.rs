use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Single-file overrides, looked up by fixed name.
pub const BACKGROUND_OVERRIDE: &str = "bg.png";
pub const MUSIC_OVERRIDE: &str = "bgm.wav";

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];
const SOUND_EXTENSIONS: &[&str] = &["wav"];

/// Directory holding the running executable, or `.` if unknown.
pub fn exe_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Where override files are searched, in priority order.
pub fn override_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![exe_dir()];
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.contains(&cwd) {
            dirs.push(cwd);
        }
    }
    dirs
}

pub fn find_override(name: &str, dirs: &[PathBuf]) -> Option<PathBuf> {
    dirs.iter().map(|d| d.join(name)).find(|p| p.is_file())
}

/// Everything an alert can show or play, gathered once at startup.
#[derive(Debug, Clone, Default)]
pub struct AlertAssets {
    pub dir: PathBuf,
    pub images: Vec<PathBuf>,
    pub sounds: Vec<PathBuf>,
    pub background_override: Option<PathBuf>,
    pub music_override: Option<PathBuf>,
}

impl AlertAssets {
    pub fn load(dir: &Path) -> Self {
        Self::scan(dir).with_overrides(&override_dirs())
    }

    /// Top-level images and sounds in `dir`. A missing directory is created
    /// and yields nothing.
    pub fn scan(dir: &Path) -> Self {
        let mut assets = AlertAssets {
            dir: dir.to_path_buf(),
            ..Default::default()
        };

        if !dir.exists() {
            if let Err(e) = fs::create_dir_all(dir) {
                warn!("could not create assets directory {:?}: {}", dir, e);
            }
            return assets;
        }

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("could not read assets directory {:?}: {}", dir, e);
                return assets;
            }
        };

        for entry in entries {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    debug!("skipping unreadable asset entry: {}", e);
                    continue;
                }
            };
            if !path.is_file() {
                continue;
            }
            if has_extension(&path, IMAGE_EXTENSIONS) {
                assets.images.push(path);
            } else if has_extension(&path, SOUND_EXTENSIONS) {
                assets.sounds.push(path);
            }
        }

        assets.images.sort();
        assets.sounds.sort();
        debug!(
            "assets: {} image(s), {} sound(s) in {:?}",
            assets.images.len(),
            assets.sounds.len(),
            dir
        );
        assets
    }

    pub fn with_overrides(mut self, dirs: &[PathBuf]) -> Self {
        self.background_override = find_override(BACKGROUND_OVERRIDE, dirs);
        self.music_override = find_override(MUSIC_OVERRIDE, dirs);
        self
    }
}

fn has_extension(path: &Path, wanted: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| wanted.iter().any(|w| e.eq_ignore_ascii_case(w)))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, b"x").unwrap();
        path
    }

    #[test]
    fn missing_dir_is_created_and_empty() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("assets");

        let assets = AlertAssets::scan(&dir);
        assert!(dir.is_dir());
        assert!(assets.images.is_empty());
        assert!(assets.sounds.is_empty());
    }

    #[test]
    fn sorts_files_by_kind() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path();
        touch(dir, "b.JPG");
        touch(dir, "a.png");
        touch(dir, "call.WAV");
        touch(dir, "notes.txt");
        touch(dir, "photo.jpeg");
        fs::create_dir(dir.join("nested.png")).unwrap();

        let assets = AlertAssets::scan(dir);
        let names: Vec<_> = assets
            .images
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.png", "b.JPG", "photo.jpeg"]);
        assert_eq!(assets.sounds, vec![dir.join("call.WAV")]);
    }

    #[test]
    fn overrides_prefer_earlier_dirs() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        touch(second.path(), BACKGROUND_OVERRIDE);
        let music = touch(first.path(), MUSIC_OVERRIDE);
        touch(second.path(), MUSIC_OVERRIDE);

        let dirs = vec![first.path().to_path_buf(), second.path().to_path_buf()];
        let assets = AlertAssets::default().with_overrides(&dirs);

        assert_eq!(assets.music_override, Some(music));
        assert_eq!(
            assets.background_override,
            Some(second.path().join(BACKGROUND_OVERRIDE))
        );
    }
}
