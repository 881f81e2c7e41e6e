use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Size-bounded rotating writer.
///
/// Keeps the live file at `path` below `max_bytes`. On overflow the live
/// file becomes `<path>.1`, existing backups shift up by one index, and
/// the backup beyond `backup_count` is discarded.
#[derive(Debug)]
pub(crate) struct SizeRotatingWriter {
    path: PathBuf,
    max_bytes: u64,
    backup_count: usize,
    file: File,
    written: u64,
}

impl SizeRotatingWriter {
    /// Opens (or creates) the live log file in append mode, creating the
    /// parent directory when absent.
    ///
    /// # Errors
    /// Returns any I/O error from creating the directory or opening the file.
    pub(crate) fn new(
        path: impl Into<PathBuf>,
        max_bytes: u64,
        backup_count: usize,
    ) -> io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = open_append(&path)?;
        let written = file.metadata()?.len();

        Ok(Self { path, max_bytes, backup_count, file, written })
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        let mut os = self.path.clone().into_os_string();
        os.push(format!(".{index}"));
        PathBuf::from(os)
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;

        for index in (1..self.backup_count).rev() {
            let from = self.backup_path(index);
            if from.exists() {
                let to = self.backup_path(index + 1);
                let _ = fs::remove_file(&to);
                fs::rename(&from, &to)?;
            }
        }

        let first = self.backup_path(1);
        let _ = fs::remove_file(&first);
        fs::rename(&self.path, &first)?;

        self.file = open_append(&self.path)?;
        self.written = 0;
        Ok(())
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

impl Write for SizeRotatingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let incoming = buf.len() as u64;
        // Reaching the cap exactly already rotates; only a single record
        // larger than the cap may land whole in a fresh file.
        if self.written > 0 && self.written + incoming >= self.max_bytes {
            self.rotate()?;
        }

        let n = self.file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}
