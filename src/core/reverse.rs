// studiolog - core/reverse.rs
//
// Backward streaming of a log file: yields complete lines newest-first
// without loading the whole file. Used by the tail-scan retrieval path
// ("most recent N entries") where scanning forward through a multi-hundred-
// megabyte session log would be wasteful.
//
// Algorithm: seek to end, walk backward in chunk-sized reads, prepend each
// chunk to a carry buffer, split on '\n', emit the fully-split fragments in
// reverse order, and keep the first (possibly incomplete) fragment as carry
// for the next, earlier chunk. At offset 0 the remaining carry is the file's
// first line.
//
// Decoding is lossy: invalid byte sequences are substituted, never raised.
// The iterator is finite and non-restartable; a read fault mid-iteration
// ends the sequence at the last successfully read chunk.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use crate::util::constants::DEFAULT_REVERSE_CHUNK_SIZE;

/// Iterator over trimmed, non-empty lines of a file, newest-first.
#[derive(Debug)]
pub struct ReverseLineReader {
    file: File,
    /// Offset of the first byte not yet read; 0 once the walk reaches the
    /// start of the file.
    position: u64,
    /// Bytes before the earliest '\n' seen so far: the (possibly partial)
    /// continuation of a line that starts in an earlier chunk.
    carry: Vec<u8>,
    chunk_size: usize,
    /// Complete lines ready to emit, in emit order (newest first).
    pending: VecDeque<String>,
    finished: bool,
}

impl ReverseLineReader {
    /// Open `path` for backward reading with the default chunk size.
    ///
    /// Fails fast if the file does not exist; everything after a successful
    /// open is recovered locally.
    pub fn open(path: &Path) -> io::Result<Self> {
        Self::with_chunk_size(path, DEFAULT_REVERSE_CHUNK_SIZE)
    }

    /// Open `path` with an explicit chunk size (must be non-zero).
    pub fn with_chunk_size(path: &Path, chunk_size: usize) -> io::Result<Self> {
        let mut file = File::open(path)?;
        let size = file.seek(SeekFrom::End(0))?;
        Ok(Self {
            file,
            position: size,
            carry: Vec::new(),
            chunk_size: chunk_size.max(1),
            pending: VecDeque::new(),
            finished: false,
        })
    }

    /// Read the chunk ending at `self.position` and split out complete lines.
    /// Returns false on a read fault, ending the iteration.
    fn pull_chunk(&mut self) -> bool {
        let read_size = (self.position).min(self.chunk_size as u64) as usize;
        self.position -= read_size as u64;

        let mut buffer = vec![0u8; read_size];
        if let Err(e) = self
            .file
            .seek(SeekFrom::Start(self.position))
            .and_then(|_| self.file.read_exact(&mut buffer))
        {
            tracing::warn!(error = %e, "Reverse read fault; ending iteration early");
            return false;
        }

        buffer.append(&mut self.carry);

        // The fragment before the first '\n' may continue into the previous
        // chunk; it becomes the new carry. Everything after is complete.
        let mut parts = buffer.split(|&b| b == b'\n');
        let first = parts.next().unwrap_or(&[]).to_vec();
        let complete: Vec<&[u8]> = parts.collect();
        for fragment in complete.into_iter().rev() {
            Self::push_line(&mut self.pending, fragment);
        }
        self.carry = first;
        true
    }

    fn push_line(pending: &mut VecDeque<String>, bytes: &[u8]) {
        let text = String::from_utf8_lossy(bytes);
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            pending.push_back(trimmed.to_string());
        }
    }
}

impl Iterator for ReverseLineReader {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            if let Some(line) = self.pending.pop_front() {
                return Some(line);
            }
            if self.finished {
                return None;
            }
            if self.position == 0 {
                // Whatever is left in the carry is the file's first line.
                self.finished = true;
                let carry = std::mem::take(&mut self.carry);
                Self::push_line(&mut self.pending, &carry);
                continue;
            }
            if !self.pull_chunk() {
                self.finished = true;
                self.carry.clear();
            }
        }
    }
}
