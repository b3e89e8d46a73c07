use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Args;

use crate::config::RuntimePaths;
use crate::discovery::{ReplaySource, discover_replay_logs, replay_log_path};

#[derive(Debug, Clone, Args)]
pub struct BatchArgs {
    /// Directory holding `<videoId>.live_chat.json` files.
    #[arg(long, value_name = "PATH")]
    pub download_dir: Option<PathBuf>,

    /// Only extract these videos instead of everything in the download directory.
    #[arg(long = "video-id", value_name = "ID")]
    pub video_ids: Vec<String>,

    #[arg(long, default_value_t = false)]
    pub fail_fast: bool,
}

pub fn run(args: &BatchArgs, runtime_paths: &RuntimePaths) -> Result<()> {
    let download_dir = runtime_paths.download_dir_or(args.download_dir.as_deref());
    println!(
        "batch: start fail_fast={} download_dir={} out_dir={}",
        args.fail_fast,
        download_dir.display(),
        runtime_paths.out_dir.display()
    );

    let mut skipped = 0usize;
    let sources = if args.video_ids.is_empty() {
        discover_replay_logs(&download_dir)?
    } else {
        let mut sources = Vec::new();
        for video_id in &args.video_ids {
            let path = replay_log_path(&download_dir, video_id);
            if path.is_file() {
                sources.push(ReplaySource {
                    video_id: video_id.clone(),
                    path,
                });
            } else if args.fail_fast {
                bail!(
                    "no chat data for video {} at {} (--fail-fast)",
                    video_id,
                    path.display()
                );
            } else {
                skipped += 1;
                println!(
                    "batch: skip video_id={} reason=no_chat_data path={}",
                    video_id,
                    path.display()
                );
            }
        }
        sources
    };
    println!("batch: checkpoint discovered sources={}", sources.len());

    let mut extracted = 0usize;
    let mut failed = 0usize;
    let mut messages = 0usize;
    for source in &sources {
        match super::extract::extract_replay_log(&source.path, &source.video_id, runtime_paths) {
            Ok(stats) => {
                extracted += 1;
                messages += stats.counts.messages_emitted;
            }
            Err(error) if args.fail_fast => {
                return Err(error.context(format!(
                    "batch aborted on video {} (--fail-fast)",
                    source.video_id
                )));
            }
            Err(error) => {
                failed += 1;
                eprintln!(
                    "batch: failed video_id={} detail={error:#}",
                    source.video_id
                );
            }
        }
    }

    println!(
        "batch: complete sources={} extracted={} failed={} skipped={} messages={}",
        sources.len(),
        extracted,
        failed,
        skipped,
        messages
    );

    Ok(())
}
