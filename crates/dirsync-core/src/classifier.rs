//! Content classifier
//!
//! Decides whether two same-named files hold the same content. Checks run
//! cheapest first and stop at the first conclusive one:
//!
//! 1. sizes differ => different
//! 2. one file is text and the other binary => different
//! 3. both binary and bigger than the large-file threshold => assumed equal
//! 4. buffered byte-for-byte comparison

use std::fs::{self, File};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use crate::settings::Settings;
use crate::{Error, Result};

/// Upper bound on bytes read by the line probe.
const LINE_PROBE_LIMIT: u64 = 64 * 1024;

/// Share of control bytes above which a chunk is considered binary.
const CONTROL_BYTE_PERCENT: usize = 30;

/// Text or binary, as judged by the layered probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Text,
    Binary,
}

/// Why two files were judged equal or different.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    SizeMismatch,
    KindMismatch,
    /// Both binary, same size, above the threshold; bytes not read
    AssumedEqual,
    ContentsEqual,
    ContentsDiffer,
}

impl Verdict {
    pub fn is_equal(self) -> bool {
        matches!(self, Self::AssumedEqual | Self::ContentsEqual)
    }
}

/// Result of comparing two files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileComparison {
    pub left_size: u64,
    pub right_size: u64,
    pub verdict: Verdict,
}

/// Compares file contents using the thresholds from [`Settings`].
#[derive(Debug, Clone)]
pub struct ContentClassifier {
    large_file_threshold: u64,
    buffer_size: usize,
    probe_bytes: usize,
    probe_lines: usize,
}

impl Default for ContentClassifier {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}

impl ContentClassifier {
    pub fn new(settings: &Settings) -> Self {
        Self {
            large_file_threshold: settings.large_file_threshold,
            buffer_size: settings.compare_buffer_size.max(1),
            probe_bytes: settings.text_probe_bytes.max(1),
            probe_lines: settings.text_probe_lines,
        }
    }

    /// Whether `a` and `b` are considered to have equal content.
    pub fn are_files_equal(&self, a: &Path, b: &Path) -> Result<bool> {
        Ok(self.compare(a, b)?.verdict.is_equal())
    }

    /// Compare two files and explain the verdict.
    pub fn compare(&self, a: &Path, b: &Path) -> Result<FileComparison> {
        let left_size = file_size(a)?;
        let right_size = file_size(b)?;
        let verdict = self.verdict(a, b, left_size, right_size)?;
        Ok(FileComparison {
            left_size,
            right_size,
            verdict,
        })
    }

    fn verdict(&self, a: &Path, b: &Path, left_size: u64, right_size: u64) -> Result<Verdict> {
        if left_size != right_size {
            return Ok(Verdict::SizeMismatch);
        }

        let a_kind = self.content_kind(a)?;
        let b_kind = self.content_kind(b)?;
        if a_kind != b_kind {
            return Ok(Verdict::KindMismatch);
        }

        if a_kind == ContentKind::Binary && left_size > self.large_file_threshold {
            return Ok(Verdict::AssumedEqual);
        }

        if self.contents_equal(a, b)? {
            Ok(Verdict::ContentsEqual)
        } else {
            Ok(Verdict::ContentsDiffer)
        }
    }

    /// Classify a file as text or binary.
    ///
    /// Text requires that the leading chunk decodes as UTF-8, that the
    /// first lines decode as UTF-8, and that the leading chunk passes the
    /// control-byte heuristic.
    pub fn content_kind(&self, path: &Path) -> Result<ContentKind> {
        let mut file = File::open(path).map_err(|e| Error::io(path, e))?;

        let mut head = Vec::with_capacity(self.probe_bytes);
        (&mut file)
            .take(self.probe_bytes as u64)
            .read_to_end(&mut head)
            .map_err(|e| Error::io(path, e))?;
        let head_truncated = head.len() == self.probe_bytes;

        if !decodes_as_utf8(&head, head_truncated) || looks_binary(&head) {
            return Ok(ContentKind::Binary);
        }

        file.seek(SeekFrom::Start(0))
            .map_err(|e| Error::io(path, e))?;
        let mut lines = Vec::new();
        let mut reader = BufReader::new(file.take(LINE_PROBE_LIMIT));
        for _ in 0..self.probe_lines {
            let read = reader
                .read_until(b'\n', &mut lines)
                .map_err(|e| Error::io(path, e))?;
            if read == 0 {
                break;
            }
        }
        let lines_truncated = lines.len() as u64 >= LINE_PROBE_LIMIT;

        if decodes_as_utf8(&lines, lines_truncated) {
            Ok(ContentKind::Text)
        } else {
            Ok(ContentKind::Binary)
        }
    }

    /// Byte-for-byte comparison in fixed-size chunks.
    fn contents_equal(&self, a: &Path, b: &Path) -> Result<bool> {
        let mut fa = File::open(a).map_err(|e| Error::io(a, e))?;
        let mut fb = File::open(b).map_err(|e| Error::io(b, e))?;
        let mut buf_a = vec![0u8; self.buffer_size];
        let mut buf_b = vec![0u8; self.buffer_size];

        loop {
            let na = fill(&mut fa, &mut buf_a).map_err(|e| Error::io(a, e))?;
            let nb = fill(&mut fb, &mut buf_b).map_err(|e| Error::io(b, e))?;
            if na != nb || buf_a[..na] != buf_b[..nb] {
                return Ok(false);
            }
            if na == 0 {
                return Ok(true);
            }
        }
    }
}

fn file_size(path: &Path) -> Result<u64> {
    fs::metadata(path)
        .map(|m| m.len())
        .map_err(|e| Error::io(path, e))
}

/// Read until `buf` is full or the reader is exhausted.
fn fill(reader: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// UTF-8 check that tolerates a character cut off by a probe limit.
fn decodes_as_utf8(bytes: &[u8], truncated: bool) -> bool {
    match std::str::from_utf8(bytes) {
        Ok(_) => true,
        Err(e) => truncated && e.error_len().is_none(),
    }
}

/// NUL bytes or too many control characters mark a chunk as binary.
fn looks_binary(chunk: &[u8]) -> bool {
    if chunk.is_empty() {
        return false;
    }
    if chunk.contains(&0) {
        return true;
    }
    let control = chunk
        .iter()
        .filter(|&&b| (b < 0x20 && !matches!(b, b'\t' | b'\n' | b'\r' | 0x0c | 0x08 | 0x1b)) || b == 0x7f)
        .count();
    control * 100 > chunk.len() * CONTROL_BYTE_PERCENT
}
