use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use log::{debug, error, info};

/// Streaming `tar.gz` writer: tar layer over gzip layer over the backing writer.
///
/// Entries are appended in call order and never rewritten. Callers must
/// finish the stream with [`ArchiveWriter::finalize`]; dropping the writer
/// instead still closes every layer, but without reporting errors.
pub struct ArchiveWriter {
    builder: tar::Builder<GzEncoder<Box<dyn Write>>>,
    mode: u32,
    entries: usize,
}

impl ArchiveWriter {
    /// Create the archive file, truncating any previous one
    pub fn create(path: &Path, mode: u32) -> Result<Self> {
        let file = File::create(path)
            .context(format!("Failed to create archive file {}", path.display()))?;
        info!("Writing archive to {}", path.display());
        Ok(Self::new(Box::new(file), mode))
    }

    pub fn new(writer: Box<dyn Write>, mode: u32) -> Self {
        let encoder = GzEncoder::new(writer, Compression::default());
        Self {
            builder: tar::Builder::new(encoder),
            mode,
            entries: 0,
        }
    }

    /// Append one regular-file entry stamped with the current time
    pub fn append(&mut self, path: &str, content: &[u8]) -> Result<()> {
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Regular);
        header.set_mode(self.mode);
        header.set_size(content.len() as u64);
        header.set_mtime(chrono::Utc::now().timestamp().max(0) as u64);

        self.builder
            .append_data(&mut header, path, content)
            .context(format!("write entry {}", path))?;

        self.entries += 1;
        debug!("Archived {} ({} bytes)", path, content.len());
        Ok(())
    }

    /// Number of entries appended so far
    pub fn entry_count(&self) -> usize {
        self.entries
    }

    /// Write the trailing entry, then close tar, gzip and the backing writer in
    /// that order. Each step is attempted and logged; the first error is returned.
    pub fn finalize(mut self, trailer_path: &str, trailer: &[u8]) -> Result<()> {
        let mut first_error: Option<anyhow::Error> = None;

        if let Err(e) = self.append(trailer_path, trailer) {
            error!("Error: add {} to archive: {:#}", trailer_path, e);
            first_error = Some(e);
        }

        // On error each consumed layer is dropped, and its Drop impl still
        // flushes and closes the layers beneath it.
        let encoder = match self.builder.into_inner() {
            Ok(encoder) => encoder,
            Err(e) => {
                error!("close tar writer: {}", e);
                return Err(first_error.unwrap_or_else(|| anyhow!("close tar writer: {}", e)));
            }
        };

        let mut writer = match encoder.finish() {
            Ok(writer) => writer,
            Err(e) => {
                error!("close gzip writer: {}", e);
                return Err(first_error.unwrap_or_else(|| anyhow!("close gzip writer: {}", e)));
            }
        };

        if let Err(e) = writer.flush() {
            error!("close file: {}", e);
            return Err(first_error.unwrap_or_else(|| anyhow!("close file: {}", e)));
        }
        drop(writer);

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::{self, Read};
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    fn read_entries(path: &Path) -> Vec<(String, Vec<u8>, u32)> {
        let file = File::open(path).unwrap();
        let mut archive = tar::Archive::new(GzDecoder::new(file));
        archive
            .entries()
            .unwrap()
            .map(|entry| {
                let mut entry = entry.unwrap();
                let name = entry.path().unwrap().to_string_lossy().into_owned();
                let mode = entry.header().mode().unwrap();
                let mut content = Vec::new();
                entry.read_to_end(&mut content).unwrap();
                (name, content, mode)
            })
            .collect()
    }

    #[test]
    fn test_entries_in_write_order_with_trailer_last() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("dump.tar.gz");

        let mut archive = ArchiveWriter::create(&path, 0o777).unwrap();
        archive.append("dump/ns/pods.yaml", b"kind: List").unwrap();
        archive.append("dump/ns/pod-0/logs.txt", b"").unwrap();
        assert_eq!(archive.entry_count(), 2);
        archive.finalize("dump/errors.txt", b"kubectl get x\nboom\n\n").unwrap();

        let entries = read_entries(&path);
        let names: Vec<_> = entries.iter().map(|(n, _, _)| n.as_str()).collect();
        assert_eq!(names, vec!["dump/ns/pods.yaml", "dump/ns/pod-0/logs.txt", "dump/errors.txt"]);
        assert_eq!(entries[0].1, b"kind: List");
        assert!(entries[1].1.is_empty());
        assert_eq!(entries[2].1, b"kubectl get x\nboom\n\n");
        assert!(entries.iter().all(|(_, _, mode)| *mode == 0o777));
    }

    #[test]
    fn test_long_entry_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("long.tar.gz");
        let long_name = format!("dump/{}/var/lib/mysql/mysqld.post.processing.log", "p".repeat(120));

        let mut archive = ArchiveWriter::create(&path, 0o644).unwrap();
        archive.append(&long_name, b"data").unwrap();
        archive.finalize("dump/errors.txt", b"").unwrap();

        let entries = read_entries(&path);
        assert_eq!(entries[0].0, long_name);
    }

    #[test]
    fn test_create_fails_for_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("dump.tar.gz");
        assert!(ArchiveWriter::create(&path, 0o777).is_err());
    }

    /// Writer that accepts a fixed number of bytes and then fails
    struct FailingWriter {
        budget: usize,
        written: Arc<Mutex<usize>>,
    }

    impl Write for FailingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let mut written = self.written.lock().unwrap();
            if *written >= self.budget {
                return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
            }
            let n = buf.len().min(self.budget - *written);
            *written += n;
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_finalize_reports_failure_of_backing_writer() {
        let written = Arc::new(Mutex::new(0));
        let writer = FailingWriter { budget: 4, written: Arc::clone(&written) };
        let archive = ArchiveWriter::new(Box::new(writer), 0o777);

        assert!(archive.finalize("dump/errors.txt", &vec![b'x'; 64 * 1024]).is_err());
        assert_eq!(*written.lock().unwrap(), 4);
    }
}
