//! Progress plumbing shared by the writer and the reader.

use std::io::Read;
use std::path::Path;

use crate::ProgressCallback;

/// Numbers entries as they are processed and forwards lifecycle events.
pub struct ProgressTracker<'a> {
    progress: &'a mut dyn ProgressCallback,
    current_entry: usize,
    total_entries: usize,
}

impl<'a> ProgressTracker<'a> {
    /// Creates a tracker; pass `0` as `total_entries` when unknown.
    #[must_use]
    pub fn new(progress: &'a mut dyn ProgressCallback, total_entries: usize) -> Self {
        Self {
            progress,
            current_entry: 0,
            total_entries,
        }
    }

    /// Advances the counter and reports the entry start.
    pub fn on_entry_start(&mut self, path: &Path) {
        self.current_entry += 1;
        self.progress
            .on_entry_start(path, self.total_entries, self.current_entry);
    }

    /// Reports that the entry is done.
    pub fn on_entry_complete(&mut self, path: &Path) {
        self.progress.on_entry_complete(path);
    }

    /// Reports the end of the operation.
    pub fn on_complete(&mut self) {
        self.progress.on_complete();
    }

    /// Wraps `inner` so bytes read through it are reported.
    pub fn reader<R: Read>(&mut self, inner: R) -> ProgressReader<'_, R> {
        ProgressReader::new(inner, &mut *self.progress)
    }
}

/// Reader that reports bytes read to a progress callback.
///
/// Updates are batched (1 MB) and the remainder is flushed on drop.
pub struct ProgressReader<'a, R> {
    inner: R,
    progress: &'a mut dyn ProgressCallback,
    bytes_since_last_update: u64,
    batch_threshold: u64,
    total: u64,
}

impl<'a, R> ProgressReader<'a, R> {
    /// Wraps `inner`.
    #[must_use]
    pub fn new(inner: R, progress: &'a mut dyn ProgressCallback) -> Self {
        Self {
            inner,
            progress,
            bytes_since_last_update: 0,
            batch_threshold: 1024 * 1024,
            total: 0,
        }
    }

    /// Bytes read through this reader so far.
    #[must_use]
    pub fn bytes_read(&self) -> u64 {
        self.total
    }
}

impl<R: Read> Read for ProgressReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let bytes_read = self.inner.read(buf)?;
        self.bytes_since_last_update += bytes_read as u64;
        self.total += bytes_read as u64;
        if self.bytes_since_last_update >= self.batch_threshold {
            self.progress.on_bytes_written(self.bytes_since_last_update);
            self.bytes_since_last_update = 0;
        }
        Ok(bytes_read)
    }
}

impl<R> Drop for ProgressReader<'_, R> {
    fn drop(&mut self) {
        if self.bytes_since_last_update > 0 {
            self.progress.on_bytes_written(self.bytes_since_last_update);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[derive(Default)]
    struct Recorder {
        starts: Vec<(PathBuf, usize, usize)>,
        bytes: u64,
        completed: bool,
    }

    impl ProgressCallback for Recorder {
        fn on_entry_start(&mut self, path: &Path, total: usize, current: usize) {
            self.starts.push((path.to_path_buf(), total, current));
        }

        fn on_bytes_written(&mut self, bytes: u64) {
            self.bytes += bytes;
        }

        fn on_entry_complete(&mut self, _path: &Path) {}

        fn on_complete(&mut self) {
            self.completed = true;
        }
    }

    #[test]
    fn test_tracker_numbers_entries() {
        let mut recorder = Recorder::default();
        let mut tracker = ProgressTracker::new(&mut recorder, 2);
        tracker.on_entry_start(Path::new("a"));
        tracker.on_entry_start(Path::new("b"));
        tracker.on_complete();

        assert_eq!(recorder.starts[0], (PathBuf::from("a"), 2, 1));
        assert_eq!(recorder.starts[1], (PathBuf::from("b"), 2, 2));
        assert!(recorder.completed);
    }

    #[test]
    fn test_reader_flushes_on_drop() {
        let mut recorder = Recorder::default();
        {
            let mut tracker = ProgressTracker::new(&mut recorder, 0);
            let mut reader = tracker.reader(&b"twelve bytes"[..]);
            std::io::copy(&mut reader, &mut std::io::sink()).unwrap();
        }
        assert_eq!(recorder.bytes, 12);
    }

    #[test]
    fn test_reader_counts_bytes_read() {
        let mut recorder = Recorder::default();
        let mut tracker = ProgressTracker::new(&mut recorder, 0);
        let mut reader = tracker.reader(&b"0123456789"[..]);
        let mut buf = [0u8; 4];
        reader.read_exact(&mut buf).unwrap();
        assert_eq!(reader.bytes_read(), 4);
        std::io::copy(&mut reader, &mut std::io::sink()).unwrap();
        assert_eq!(reader.bytes_read(), 10);
    }
}
