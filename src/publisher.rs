//! Stream publisher: feeds a compiled playlist to an external ffmpeg
//! process producing a continuously served HLS stream.
//!
//! The compiler only writes playlist artifacts; swapping a new day's
//! playlist in is the publisher's job (stop, then start again). The
//! publisher refuses to start on a missing or empty playlist.

use crate::error::{Error, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use tracing::{info, warn};

/// Control surface of a stream publisher.
pub trait Publisher {
    fn start(&mut self) -> Result<()>;
    fn stop(&mut self);
    fn is_healthy(&mut self) -> bool;
}

/// Publishes one channel's playlist as an HLS stream via ffmpeg.
pub struct FfmpegPublisher {
    pub channel_id: String,
    playlist_path: PathBuf,
    stream_dir: PathBuf,
    hls_time_secs: u32,
    child: Option<Child>,
}

impl FfmpegPublisher {
    /// `stream_dir` is the base streaming directory; each channel gets its
    /// own subdirectory under it.
    pub fn new(channel_id: &str, playlist_path: &Path, stream_dir: &Path) -> Self {
        FfmpegPublisher {
            channel_id: channel_id.to_string(),
            playlist_path: playlist_path.to_path_buf(),
            stream_dir: stream_dir.join(channel_id),
            hls_time_secs: 10,
            child: None,
        }
    }

    /// Path of the HLS manifest this publisher writes.
    pub fn manifest_path(&self) -> PathBuf {
        self.stream_dir.join("channel.m3u8")
    }

    fn is_running(&mut self) -> bool {
        match self.child.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }
}

impl Publisher for FfmpegPublisher {
    fn start(&mut self) -> Result<()> {
        let content = fs::read_to_string(&self.playlist_path).map_err(|e| {
            Error::Publisher(format!(
                "playlist not readable '{}': {}",
                self.playlist_path.display(),
                e
            ))
        })?;
        if content.trim().is_empty() {
            return Err(Error::Publisher(format!(
                "refusing to start '{}' on an empty playlist",
                self.channel_id
            )));
        }

        fs::create_dir_all(&self.stream_dir)?;
        let segment_pattern = self.stream_dir.join("segment_%03d.ts");

        let child = Command::new("ffmpeg")
            .arg("-re")
            .args(["-f", "concat", "-safe", "0"])
            .arg("-i")
            .arg(&self.playlist_path)
            .args(["-c:v", "copy", "-c:a", "copy"])
            .args(["-f", "hls"])
            .args(["-hls_time", &self.hls_time_secs.to_string()])
            .args(["-hls_list_size", "6"])
            .args(["-hls_flags", "delete_segments+append_list"])
            .arg("-hls_segment_filename")
            .arg(&segment_pattern)
            .arg(self.manifest_path())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => {
                    Error::Publisher("ffmpeg not found in PATH".to_string())
                }
                _ => Error::Publisher(format!("failed to start ffmpeg: {e}")),
            })?;

        info!(channel = %self.channel_id, pid = child.id(), "ffmpeg started");
        self.child = Some(child);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill() {
                warn!(channel = %self.channel_id, error = %e, "could not kill ffmpeg");
            }
            let _ = child.wait();
            info!(channel = %self.channel_id, "ffmpeg stopped");
        }
    }

    fn is_healthy(&mut self) -> bool {
        self.is_running() && self.manifest_path().exists()
    }
}

impl Drop for FfmpegPublisher {
    fn drop(&mut self) {
        self.stop();
    }
}
