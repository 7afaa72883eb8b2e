//! Local directory source.
//!
//! The connect address is a directory; every regular file in it is a target.
//! Peeking a target tails the file: new complete lines are emitted as they
//! are appended, and a shrinking file (truncation or rotation) is re-read
//! from the start.

use std::collections::VecDeque;
use std::io::{self, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use futures::StreamExt;
use futures::stream::BoxStream;
use log::{debug, info, warn};
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use crate::core::cancel::CancelToken;
use crate::core::config::{DEFAULT_POLL_INTERVAL, ResolvedConfig};
use crate::source::provider::{
    ConnectionError, Connected, Credentials, DataSource, FetchError, Target,
};

pub struct FileSource {
    poll_interval: Duration,
    from_start: bool,
    root: Mutex<Option<PathBuf>>,
}

impl FileSource {
    pub fn new(poll_interval: Duration, from_start: bool) -> Self {
        Self {
            poll_interval,
            from_start,
            root: Mutex::new(None),
        }
    }

    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self::new(config.files_poll_interval, config.files_from_start)
    }

    fn root(&self) -> Option<PathBuf> {
        self.root.lock().ok().and_then(|root| root.clone())
    }
}

impl Default for FileSource {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL, false)
    }
}

fn describe(meta: &std::fs::Metadata) -> String {
    let modified = meta
        .modified()
        .map(|t| DateTime::<Local>::from(t).format("%b %d %H:%M").to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    format!("{} bytes, modified {modified}", meta.len())
}

#[async_trait]
impl DataSource for FileSource {
    fn name(&self) -> &str {
        "files"
    }

    async fn connect(
        &self,
        cancel: &CancelToken,
        address: &str,
        _credentials: &Credentials,
        _timeout: Duration,
    ) -> Result<Connected, ConnectionError> {
        if cancel.is_cancelled() {
            return Err(ConnectionError::Refused("connect cancelled".to_string()));
        }

        let meta = tokio::fs::metadata(address).await.map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ConnectionError::Refused(format!("{address} does not exist")),
            io::ErrorKind::PermissionDenied => ConnectionError::Unauthorized,
            _ => ConnectionError::Io(e.to_string()),
        })?;
        if !meta.is_dir() {
            return Err(ConnectionError::Refused(format!(
                "{address} is not a directory"
            )));
        }

        if let Ok(mut root) = self.root.lock() {
            *root = Some(PathBuf::from(address));
        }
        info!("File source rooted at {address}");
        Ok(Connected {
            address: address.to_string(),
        })
    }

    async fn list_targets(&self, cancel: &CancelToken) -> Result<Vec<Target>, FetchError> {
        let root = self
            .root()
            .ok_or_else(|| FetchError::Unavailable("not connected".to_string()))?;

        let mut entries = tokio::fs::read_dir(&root)
            .await
            .map_err(|e| FetchError::Io(e.to_string()))?;
        let mut targets = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| FetchError::Io(e.to_string()))?
        {
            if cancel.is_cancelled() {
                return Err(FetchError::Unavailable("fetch cancelled".to_string()));
            }
            let Ok(meta) = entry.metadata().await else {
                continue;
            };
            if !meta.is_file() {
                continue;
            }
            targets.push(Target::new(
                entry.file_name().to_string_lossy().into_owned(),
                describe(&meta),
            ));
        }
        targets.sort_by(|a, b| a.id.cmp(&b.id));
        debug!("Listed {} file targets under {}", targets.len(), root.display());
        Ok(targets)
    }

    fn stream_lines(&self, cancel: CancelToken, target: &str) -> BoxStream<'static, String> {
        let path = match self.root() {
            Some(root) => root.join(target),
            None => PathBuf::from(target),
        };
        let tail = Tail::new(path, self.poll_interval, self.from_start, cancel);
        futures::stream::unfold(tail, |mut tail| async move {
            tail.next_line().await.map(|line| (line, tail))
        })
        .boxed()
    }
}

/// Follow state for one file.
struct Tail {
    path: PathBuf,
    interval: Duration,
    from_start: bool,
    cancel: CancelToken,
    opened: bool,
    offset: u64,
    partial: Vec<u8>,
    pending: VecDeque<String>,
}

impl Tail {
    fn new(path: PathBuf, interval: Duration, from_start: bool, cancel: CancelToken) -> Self {
        Self {
            path,
            interval,
            from_start,
            cancel,
            opened: false,
            offset: 0,
            partial: Vec::new(),
            pending: VecDeque::new(),
        }
    }

    async fn next_line(&mut self) -> Option<String> {
        loop {
            if let Some(line) = self.pending.pop_front() {
                return Some(line);
            }
            if self.cancel.is_cancelled() {
                return None;
            }
            match self.read_more().await {
                Ok(true) => continue,
                Ok(false) => {}
                // The file may be mid-rotation; keep polling.
                Err(e) => warn!("Tail of {} failed: {}", self.path.display(), e),
            }
            tokio::select! {
                _ = self.cancel.cancelled() => return None,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
    }

    /// Read whatever was appended since the last call. Returns `true` if
    /// new complete lines are pending.
    async fn read_more(&mut self) -> io::Result<bool> {
        let len = tokio::fs::metadata(&self.path).await?.len();

        if !self.opened {
            self.opened = true;
            if !self.from_start {
                self.offset = len;
                return Ok(false);
            }
        }

        if len < self.offset {
            info!("{} shrank, re-reading from start", self.path.display());
            self.offset = 0;
            self.partial.clear();
        }
        if len == self.offset {
            return Ok(false);
        }

        let buf = read_range(&self.path, self.offset, len - self.offset).await?;
        self.offset += buf.len() as u64;
        self.partial.extend_from_slice(&buf);

        while let Some(idx) = self.partial.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.partial.drain(..=idx).collect();
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end_matches(['\n', '\r']);
            if !line.is_empty() {
                self.pending.push_back(line.to_string());
            }
        }
        Ok(!self.pending.is_empty())
    }
}

async fn read_range(path: &Path, offset: u64, len: u64) -> io::Result<Vec<u8>> {
    let mut file = tokio::fs::File::open(path).await?;
    file.seek(SeekFrom::Start(offset)).await?;
    let mut buf = Vec::new();
    file.take(len).read_to_end(&mut buf).await?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use tempfile::TempDir;

    const STEP: Duration = Duration::from_secs(2);

    async fn connected(dir: &TempDir, from_start: bool) -> FileSource {
        let source = FileSource::new(Duration::from_millis(10), from_start);
        source
            .connect(
                &CancelToken::new(),
                dir.path().to_str().unwrap(),
                &Credentials::default(),
                Duration::from_secs(1),
            )
            .await
            .unwrap();
        source
    }

    async fn next_line(stream: &mut BoxStream<'static, String>) -> Option<String> {
        tokio::time::timeout(STEP, stream.next()).await.unwrap()
    }

    fn append(path: &Path, text: &str) {
        let mut file = fs::OpenOptions::new().append(true).create(true).open(path).unwrap();
        file.write_all(text.as_bytes()).unwrap();
    }

    #[tokio::test]
    async fn test_connect_rejects_missing_directory() {
        let source = FileSource::default();
        let err = source
            .connect(
                &CancelToken::new(),
                "/definitely/not/a/dir",
                &Credentials::default(),
                Duration::from_secs(1),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ConnectionError::Refused(_)));
    }

    #[tokio::test]
    async fn test_list_targets_requires_connect() {
        let source = FileSource::default();
        let err = source.list_targets(&CancelToken::new()).await.unwrap_err();
        assert!(matches!(err, FetchError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_list_targets_sorted_files_only() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.log"), "x\n").unwrap();
        fs::write(dir.path().join("a.log"), "").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();

        let source = connected(&dir, false).await;
        let targets = source.list_targets(&CancelToken::new()).await.unwrap();
        let ids: Vec<_> = targets.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["a.log", "b.log"]);
        assert!(targets[1].description.starts_with("2 bytes"));
    }

    #[tokio::test]
    async fn test_tail_skips_existing_content_by_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        fs::write(&path, "old line\n").unwrap();

        let source = connected(&dir, false).await;
        let mut stream = source.stream_lines(CancelToken::new(), "app.log");

        // Let the tail record the starting offset before appending.
        let first = tokio::spawn(async move { (stream.next().await, stream) });
        tokio::time::sleep(Duration::from_millis(50)).await;
        append(&path, "new line\n");

        let (line, _stream) = tokio::time::timeout(STEP, first).await.unwrap().unwrap();
        assert_eq!(line.as_deref(), Some("new line"));
    }

    #[tokio::test]
    async fn test_tail_from_start_and_partial_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        fs::write(&path, "one\r\ntwo\nthr").unwrap();

        let source = connected(&dir, true).await;
        let mut stream = source.stream_lines(CancelToken::new(), "app.log");

        assert_eq!(next_line(&mut stream).await.as_deref(), Some("one"));
        assert_eq!(next_line(&mut stream).await.as_deref(), Some("two"));

        append(&path, "ee\n");
        assert_eq!(next_line(&mut stream).await.as_deref(), Some("three"));
    }

    #[tokio::test]
    async fn test_tail_rereads_after_truncation() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        fs::write(&path, "first line that is long\n").unwrap();

        let source = connected(&dir, true).await;
        let mut stream = source.stream_lines(CancelToken::new(), "app.log");
        assert_eq!(
            next_line(&mut stream).await.as_deref(),
            Some("first line that is long")
        );

        fs::write(&path, "short\n").unwrap();
        assert_eq!(next_line(&mut stream).await.as_deref(), Some("short"));
    }

    #[tokio::test]
    async fn test_stream_ends_on_cancel() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("app.log"), "").unwrap();
        let source = connected(&dir, false).await;
        let cancel = CancelToken::new();
        let mut stream = source.stream_lines(cancel.clone(), "app.log");

        cancel.cancel();
        assert_eq!(next_line(&mut stream).await, None);
    }
}
