use std::path::{Component, Path, PathBuf};

use anyhow::{Result, bail};

/// Directory the chat downloader writes `<videoId>.live_chat.json` into,
/// relative to the working directory.
pub const DEFAULT_DOWNLOAD_DIR: &str = "youtube_chat";

/// Absolute directories every command works against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimePaths {
    pub home_dir: PathBuf,
    pub cwd: PathBuf,
    pub out_dir: PathBuf,
    pub download_dir: PathBuf,
}

impl RuntimePaths {
    /// `home_dir` and `cwd` must be absolute. Without an override, artifacts
    /// go under `~/.replaylog/output` and replay logs are looked up in
    /// `./youtube_chat`.
    pub fn new(home_dir: &Path, cwd: &Path, out_dir_override: Option<&Path>) -> Result<Self> {
        for (name, dir) in [("home_dir", home_dir), ("cwd", cwd)] {
            if !dir.is_absolute() {
                bail!("{name} must be absolute: {}", dir.display());
            }
        }

        let mut paths = Self {
            home_dir: clean(home_dir),
            cwd: clean(cwd),
            out_dir: PathBuf::new(),
            download_dir: PathBuf::new(),
        };
        paths.out_dir = match out_dir_override {
            Some(path) => paths.resolve(path),
            None => paths.home_dir.join(".replaylog").join("output"),
        };
        paths.download_dir = paths.cwd.join(DEFAULT_DOWNLOAD_DIR);
        Ok(paths)
    }

    /// Output directory for one video's artifacts.
    #[must_use]
    pub fn video_out_dir(&self, video_id: &str) -> PathBuf {
        self.out_dir.join(video_id)
    }

    /// The directory `batch` scans: `--download-dir` when given, otherwise
    /// the downloader's default next to the working directory.
    #[must_use]
    pub fn download_dir_or(&self, override_dir: Option<&Path>) -> PathBuf {
        override_dir.map_or_else(|| self.download_dir.clone(), |dir| self.resolve(dir))
    }

    /// Resolves a command-line path: a leading `~` component means the home
    /// directory, other relative paths hang off `cwd`.
    #[must_use]
    pub fn resolve(&self, path: &Path) -> PathBuf {
        let mut components = path.components();
        let base = match components.clone().next() {
            Some(Component::Normal(first)) if first == "~" => {
                components.next();
                &self.home_dir
            }
            _ if path.is_absolute() => return clean(path),
            _ => &self.cwd,
        };

        let mut resolved = base.clone();
        resolved.extend(components);
        clean(&resolved)
    }
}

/// Folds `.` and `..` without touching the filesystem; the replay directory
/// may not exist yet when paths are resolved.
fn clean(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir if cleaned.file_name().is_some() => {
                cleaned.pop();
            }
            other => cleaned.push(other),
        }
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::RuntimePaths;
    use std::path::Path;

    fn paths(out_dir: Option<&str>) -> RuntimePaths {
        RuntimePaths::new(
            Path::new("/home/viewer"),
            Path::new("/srv/streams/2024-03"),
            out_dir.map(Path::new),
        )
        .expect("absolute home and cwd should resolve")
    }

    #[test]
    fn video_artifacts_default_under_home() {
        let paths = paths(None);
        assert_eq!(paths.out_dir, Path::new("/home/viewer/.replaylog/output"));
        assert_eq!(
            paths.video_out_dir("dQw4w9WgXcQ"),
            Path::new("/home/viewer/.replaylog/output/dQw4w9WgXcQ")
        );
    }

    #[test]
    fn batch_scans_downloader_directory_unless_overridden() {
        let paths = paths(None);
        assert_eq!(
            paths.download_dir_or(None),
            Path::new("/srv/streams/2024-03/youtube_chat")
        );
        assert_eq!(
            paths.download_dir_or(Some(Path::new("../2024-02/youtube_chat"))),
            Path::new("/srv/streams/2024-02/youtube_chat")
        );
        assert_eq!(
            paths.download_dir_or(Some(Path::new("~/Downloads/chat"))),
            Path::new("/home/viewer/Downloads/chat")
        );
    }

    #[test]
    fn out_dir_override_follows_the_same_rules_as_inputs() {
        assert_eq!(paths(Some("~/rows")).out_dir, Path::new("/home/viewer/rows"));
        assert_eq!(paths(Some("./rows/./v1")).out_dir, Path::new("/srv/streams/2024-03/rows/v1"));
        assert_eq!(paths(Some("/tmp/rows/..")).out_dir, Path::new("/tmp"));
    }

    #[test]
    fn tilde_only_expands_as_a_whole_component() {
        let paths = paths(None);
        assert_eq!(
            paths.resolve(Path::new("~abc123.live_chat.json")),
            Path::new("/srv/streams/2024-03/~abc123.live_chat.json")
        );
        assert_eq!(
            paths.resolve(Path::new("youtube_chat/~/abc123.live_chat.json")),
            Path::new("/srv/streams/2024-03/youtube_chat/~/abc123.live_chat.json")
        );
    }

    #[test]
    fn relative_home_or_cwd_is_rejected() {
        let err = RuntimePaths::new(Path::new("/home/viewer"), Path::new("streams"), None)
            .expect_err("relative cwd must fail");
        assert!(err.to_string().contains("cwd must be absolute"), "unexpected error: {err}");

        let err = RuntimePaths::new(Path::new("viewer"), Path::new("/srv"), None)
            .expect_err("relative home must fail");
        assert!(err.to_string().contains("home_dir must be absolute"), "unexpected error: {err}");
    }
}
