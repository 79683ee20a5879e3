//! Per-file fingerprinting: streamed digest, filesystem metadata, import lines

use crate::error::ScanError;
use crate::snapshot::FileRecord;
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use std::time::UNIX_EPOCH;

/// Stream `path` through SHA-256 in `chunk_size` reads
pub fn hash_file(path: &Path, chunk_size: usize) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; chunk_size.max(1)];

    loop {
        let n = match file.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Collect trimmed lines starting with any of `prefixes`, in file order
pub fn extract_imports<R: BufRead>(reader: R, prefixes: &[String]) -> io::Result<Vec<String>> {
    let mut imports = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if prefixes.iter().any(|p| trimmed.starts_with(p.as_str())) {
            imports.push(trimmed.to_string());
        }
    }
    Ok(imports)
}

/// Import lines of a file on disk
///
/// A file that cannot be decoded as UTF-8 yields no imports; its hash and
/// size are still tracked.
pub fn detect_imports(path: &Path, prefixes: &[String]) -> Vec<String> {
    let result = File::open(path).and_then(|f| extract_imports(BufReader::new(f), prefixes));
    match result {
        Ok(imports) => imports,
        Err(e) => {
            tracing::warn!("Error reading imports from {:?}: {}", path, e);
            Vec::new()
        }
    }
}

/// Modification time as fractional seconds since the Unix epoch
fn mtime_secs(metadata: &fs::Metadata) -> f64 {
    metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// Build a fresh [`FileRecord`] for one file
pub fn fingerprint_file(
    path: &Path,
    chunk_size: usize,
    import_prefixes: &[String],
) -> Result<FileRecord, ScanError> {
    let metadata = fs::metadata(path).map_err(|e| ScanError::MetadataFailed {
        file: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let hash = hash_file(path, chunk_size).map_err(|e| ScanError::FileReadFailed {
        file: path.display().to_string(),
        reason: e.to_string(),
    })?;

    Ok(FileRecord {
        last_modified: mtime_secs(&metadata),
        size: metadata.len(),
        hash,
        imports: detect_imports(path, import_prefixes),
        last_analyzed: chrono::Local::now().to_rfc3339(),
    })
}
