// SPDX-License-Identifier: MPL-2.0

//! Storage utilities for captured photos and videos
//!
//! Artifacts are "downloaded" into one output directory, named
//! `photo_<unixMillis>.<ext>` and `video_<unixMillis>.<ext>`.

use crate::backends::FileSink;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Directory name created under the user's download directory
pub const APP_DIR_NAME: &str = "ikdao-camera";

/// Milliseconds since the Unix epoch
pub fn unix_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

pub fn photo_filename(millis: i64, extension: &str) -> String {
    format!("photo_{}.{}", millis, extension)
}

pub fn video_filename(millis: i64, extension: &str) -> String {
    format!("video_{}.{}", millis, extension)
}

/// Default output directory (`~/Downloads/ikdao-camera`)
///
/// Falls back to the home directory, then the working directory, when the
/// platform has no download directory.
pub fn default_output_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

/// [`FileSink`] writing each artifact into a directory
///
/// Writes happen on spawned tokio tasks; failures are logged. Clones share
/// the outstanding writes, so any clone can [`flush`](Self::flush) them.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
    writes: Arc<Mutex<JoinSet<()>>>,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            writes: Arc::default(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `bytes` to `<dir>/<filename>`, creating the directory if needed
    pub async fn write(dir: &Path, filename: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
        // Filenames come from the controller, but never let one escape the directory
        let name = Path::new(filename)
            .file_name()
            .ok_or_else(|| std::io::Error::other(format!("invalid filename {:?}", filename)))?;
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(name);
        tokio::fs::write(&path, bytes).await?;
        Ok(path)
    }

    /// Wait for every write started so far
    pub async fn flush(&self) {
        let mut writes = {
            let mut guard = self.writes.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            std::mem::take(&mut *guard)
        };
        if !writes.is_empty() {
            debug!(count = writes.len(), "Flushing artifact writes");
        }
        while let Some(result) = writes.join_next().await {
            if let Err(e) = result {
                warn!(error = %e, "Artifact write task failed");
            }
        }
    }
}

impl FileSink for DirectorySink {
    fn save(&self, bytes: Vec<u8>, filename: &str, mime_type: &str) {
        let dir = self.dir.clone();
        let filename = filename.to_string();
        debug!(filename = %filename, mime_type, size = bytes.len(), "Saving artifact");

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            error!(filename = %filename, "No async runtime available, artifact dropped");
            return;
        };
        let write = async move {
            match Self::write(&dir, &filename, &bytes).await {
                Ok(path) => info!(path = %path.display(), "Artifact saved"),
                Err(e) => error!(filename = %filename, error = %e, "Failed to save artifact"),
            }
        };
        let mut writes = self.writes.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        // Reap finished writes
        while writes.try_join_next().is_some() {}
        writes.spawn_on(write, &handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filenames_follow_pattern() {
        assert_eq!(photo_filename(1700000000123, "jpg"), "photo_1700000000123.jpg");
        assert_eq!(video_filename(42, "webm"), "video_42.webm");
    }

    #[test]
    fn unix_millis_is_recent() {
        // 2020-01-01T00:00:00Z
        assert!(unix_millis() > 1_577_836_800_000);
    }

    #[tokio::test]
    async fn write_creates_directory_and_file() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested");
        let path = DirectorySink::write(&dir, "photo_1.jpg", b"abc").await.unwrap();
        assert_eq!(path, dir.join("photo_1.jpg"));
        assert_eq!(std::fs::read(path).unwrap(), b"abc");
    }

    #[tokio::test]
    async fn write_strips_directory_components() {
        let tmp = tempfile::tempdir().unwrap();
        let path = DirectorySink::write(tmp.path(), "../escape.jpg", b"x").await.unwrap();
        assert_eq!(path, tmp.path().join("escape.jpg"));
    }

    #[tokio::test]
    async fn save_writes_in_background() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(tmp.path());
        sink.save(vec![1, 2, 3], "video_5.mjpeg", "video/x-motion-jpeg");

        let path = tmp.path().join("video_5.mjpeg");
        for _ in 0..100 {
            if path.exists() && std::fs::read(&path).unwrap().len() == 3 {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        panic!("artifact was not written");
    }

    #[tokio::test]
    async fn flush_waits_for_every_clone() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(tmp.path());
        let shared = sink.clone();
        shared.save(vec![1; 64], "photo_1.jpg", "image/jpeg");
        sink.save(vec![2; 64], "photo_2.jpg", "image/jpeg");

        sink.flush().await;
        assert_eq!(std::fs::read(tmp.path().join("photo_1.jpg")).unwrap().len(), 64);
        assert_eq!(std::fs::read(tmp.path().join("photo_2.jpg")).unwrap().len(), 64);

        // Nothing is left to wait for
        shared.flush().await;
    }
}
