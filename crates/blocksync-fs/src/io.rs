//! Atomic I/O operations with file locking

use fs2::FileExt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::{Error, NormalizedPath, Result, TextEncoding, TextFile};

/// Distinguishes side files of concurrent writers within one process.
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Write content atomically to a file with locking.
///
/// Uses write-to-temp-then-rename so a concurrent reader sees either the old
/// or the new file, never a truncated one. The side file lives in the target's
/// directory to stay on the same filesystem and is removed if any step fails.
pub fn write_atomic(path: &NormalizedPath, content: &[u8]) -> Result<()> {
    let native_path = path.to_native();

    if let Some(parent) = native_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let temp_name = format!(
        ".{}.{}.{}.tmp",
        native_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id(),
        TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
    );
    let temp_path = native_path.with_file_name(&temp_name);

    let result = (|| -> Result<()> {
        let mut temp_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|e| Error::io(&temp_path, e))?;

        temp_file.lock_exclusive().map_err(|_| Error::LockFailed {
            path: native_path.clone(),
        })?;

        temp_file
            .write_all(content)
            .map_err(|e| Error::io(&temp_path, e))?;
        temp_file.sync_all().map_err(|e| Error::io(&temp_path, e))?;

        temp_file.unlock().map_err(|_| Error::LockFailed {
            path: native_path.clone(),
        })?;

        fs::rename(&temp_path, &native_path).map_err(|e| Error::io(&native_path, e))
    })();

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

/// Read a UTF-8 text file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Write UTF-8 text to a file atomically.
pub fn write_text(path: &NormalizedPath, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes())
}

/// Read a document, detecting its encoding from the byte-order mark.
///
/// The returned text never contains the BOM itself.
pub fn read_document(path: &NormalizedPath) -> Result<TextFile> {
    let native_path = path.to_native();
    let bytes = fs::read(&native_path).map_err(|e| Error::io(&native_path, e))?;
    let encoding = TextEncoding::detect(&bytes);
    let text = encoding.decode(&bytes).map_err(|message| Error::Decode {
        path: native_path.clone(),
        encoding: encoding.to_string(),
        message,
    })?;
    tracing::trace!(path = %path, %encoding, bytes = bytes.len(), "Read document");
    Ok(TextFile { text, encoding })
}

/// Write a document atomically in its recorded encoding.
pub fn write_document(path: &NormalizedPath, file: &TextFile) -> Result<()> {
    write_atomic(path, &file.to_bytes())
}
