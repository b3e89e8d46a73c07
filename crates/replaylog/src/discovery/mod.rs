use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use regex::Regex;

pub const REPLAY_LOG_SUFFIX: &str = ".live_chat.json";

/// A replay log found on disk together with the video it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReplaySource {
    pub video_id: String,
    pub path: PathBuf,
}

/// Path the downloader writes a video's chat replay to.
#[must_use]
pub fn replay_log_path(download_dir: &Path, video_id: &str) -> PathBuf {
    download_dir.join(format!("{video_id}{REPLAY_LOG_SUFFIX}"))
}

#[must_use]
pub fn video_id_from_path(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;
    replay_file_name_regex()
        .captures(file_name)
        .and_then(|captures| captures.name("video_id"))
        .map(|video_id| video_id.as_str().to_string())
}

/// Lists every `<videoId>.live_chat.json` file directly inside
/// `download_dir`, sorted by video id.
pub fn discover_replay_logs(download_dir: &Path) -> Result<Vec<ReplaySource>> {
    let entries = std::fs::read_dir(download_dir).with_context(|| {
        format!(
            "failed to read replay download directory: {}",
            download_dir.display()
        )
    })?;

    let mut sources = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| {
            format!("failed to list replay download directory: {}", download_dir.display())
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(video_id) = video_id_from_path(&path) {
            sources.push(ReplaySource { video_id, path });
        }
    }

    sources.sort();
    Ok(sources)
}

fn replay_file_name_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"^(?P<video_id>[A-Za-z0-9_-]+)\.live_chat\.json$")
            .expect("replay file name regex should compile")
    })
}

#[cfg(test)]
mod tests {
    use super::{replay_log_path, video_id_from_path};
    use std::path::Path;

    #[test]
    fn derives_video_id_from_downloader_file_name() {
        assert_eq!(
            video_id_from_path(Path::new("/tmp/youtube_chat/dQw4w9WgXcQ.live_chat.json")).as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            video_id_from_path(Path::new("a-b_c.live_chat.json")).as_deref(),
            Some("a-b_c")
        );
    }

    #[test]
    fn ignores_other_file_names() {
        for name in [
            "abc.json",
            "abc.live_chat.json.part",
            ".live_chat.json",
            "a.b.live_chat.json",
            "abc.info.json",
        ] {
            assert!(video_id_from_path(Path::new(name)).is_none(), "{name} should not match");
        }
    }

    #[test]
    fn replay_path_matches_downloader_template() {
        assert_eq!(
            replay_log_path(Path::new("youtube_chat"), "abc123"),
            Path::new("youtube_chat/abc123.live_chat.json")
        );
    }
}
