//! Tagged-record savestate store
//!
//! A savestate is a flat sequence of records with no header, index, or
//! checksum. Every emulated subsystem writes and reads its own records,
//! keyed by tag, so subsystems stay independent of each other's layout.
//!
//! ## Record layout
//!
//! | Offset | Size     | Field                           |
//! |:-------|:---------|:--------------------------------|
//! | 0      | 28 B     | Tag, NUL-padded (27 chars max)  |
//! | 28     | 4 B      | Payload length, u32 LE          |
//! | 32     | length B | Payload                         |
//!
//! Tags are unique per session by convention only; the format does not
//! enforce it, and lookups return the first match. Lookups scan forward from
//! the current cursor (restores usually request tags in write order, so the
//! next record is the common case), then wrap around once from the start of
//! the file before reporting the tag missing. Misses are counted on the
//! session; a restore is only trusted if the count stays zero.

use log::{info, warn};
use std::error::Error;
use std::fmt::Display;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;



/// Tag field width: 27 characters plus a terminating NUL.
pub const TAG_LEN: usize = 28;

const HEADER_LEN: usize = TAG_LEN + 4;

/// Subsystems that serialize into a savestate session.
pub trait Savable {
    /// Append this subsystem's records. A write failure is fatal for the
    /// whole session.
    fn save_state(&self, state: &mut SaveState) -> Result<(), SaveError>;

    /// Restore from the session's records. Missing tags are counted on the
    /// session rather than reported here; fields keep their current value.
    fn load_state(&mut self, state: &mut SaveState);
}

#[derive(Debug)]
pub enum SaveError {
    Io(io::Error),
    /// Record write attempted on a session opened for reading.
    ReadOnly,
    /// Payload does not fit the record's u32 length field.
    PayloadTooLarge,
}

impl From<io::Error> for SaveError {
    fn from(e: io::Error) -> Self {
        SaveError::Io(e)
    }
}

impl Error for SaveError {}

impl Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveError::Io(err) => write!(f, "IO error: {}", err),
            SaveError::ReadOnly => write!(f, "session is open for reading"),
            SaveError::PayloadTooLarge => write!(f, "payload exceeds the record length field"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Read,
    Write,
}

/// One open savestate file, either reading or writing.
#[derive(Debug)]
pub struct SaveState {
    file: File,
    mode: Mode,
    errors: u32,
}

impl SaveState {
    /// Open a savestate for writing, truncating any existing file.
    pub fn open_write<P: AsRef<Path>>(path: P) -> Result<Self, SaveError> {
        let file = File::create(path)?;
        Ok(Self {
            file,
            mode: Mode::Write,
            errors: 0,
        })
    }

    /// Open an existing savestate for reading.
    pub fn open_read<P: AsRef<Path>>(path: P) -> Result<Self, SaveError> {
        let file = File::open(path)?;
        Ok(Self {
            file,
            mode: Mode::Read,
            errors: 0,
        })
    }

    /// Failed lookups so far. A restore is only valid if this is zero after
    /// every subsystem has loaded.
    pub fn errors(&self) -> u32 {
        self.errors
    }

    /// Append one record. No dedup, no tag validation; tags longer than 27
    /// bytes are truncated, and the payload must fit the u32 length field.
    pub fn write_tag(&mut self, tag: &str, payload: &[u8]) -> Result<(), SaveError> {
        if self.mode != Mode::Write {
            return Err(SaveError::ReadOnly);
        }
        let length = u32::try_from(payload.len()).map_err(|_| SaveError::PayloadTooLarge)?;

        let mut header = [0u8; HEADER_LEN];
        header[..TAG_LEN].copy_from_slice(&tag_bytes(tag));
        header[TAG_LEN..].copy_from_slice(&length.to_le_bytes());

        self.file.write_all(&header)?;
        self.file.write_all(payload)?;
        info!("saved tag '{}' ({} bytes)", tag, payload.len());
        Ok(())
    }

    /// Look up a record by tag and copy its payload into `buf`.
    ///
    /// Copies `min(record_len, buf.len())` bytes and returns the copied
    /// count; a short `buf` truncates the payload, a long one is left
    /// untouched past the record length. The cursor is left at the next
    /// record on a hit. On a miss the error counter is incremented and `buf`
    /// is untouched.
    pub fn read_tag(&mut self, tag: &str, buf: &mut [u8]) -> Option<usize> {
        match self.scan_for(tag, buf) {
            Ok(Some(copied)) => {
                info!("loaded tag '{}'", tag);
                Some(copied)
            }
            Ok(None) | Err(_) => {
                warn!("tag '{}' not found", tag);
                self.errors += 1;
                None
            }
        }
    }

    /// Convenience pair for scalar state.
    pub fn write_u32(&mut self, tag: &str, value: u32) -> Result<(), SaveError> {
        self.write_tag(tag, &value.to_le_bytes())
    }

    pub fn read_u32(&mut self, tag: &str) -> Option<u32> {
        let mut buf = [0u8; 4];
        self.read_tag(tag, &mut buf)?;
        // Bytes past a short record stay zero, so a narrower stored scalar
        // reads back widened rather than garbled.
        Some(u32::from_le_bytes(buf))
    }

    /// Forward scan with skip-by-length, then one wraparound pass from
    /// offset 0 back to where the scan started.
    fn scan_for(&mut self, tag: &str, buf: &mut [u8]) -> io::Result<Option<usize>> {
        if self.mode != Mode::Read {
            return Ok(None);
        }

        let wanted = tag_bytes(tag);
        let initial_pos = self.file.stream_position()?;
        let mut pos = initial_pos;
        let mut from_start = false;

        while !from_start || pos < initial_pos {
            let mut header = [0u8; HEADER_LEN];
            if self.file.read_exact(&mut header).is_err() {
                // End of file (or trailing garbage): wrap around once.
                if from_start {
                    break;
                }
                pos = self.file.seek(SeekFrom::Start(0))?;
                from_start = true;
                continue;
            }

            let length = u32::from_le_bytes([
                header[TAG_LEN],
                header[TAG_LEN + 1],
                header[TAG_LEN + 2],
                header[TAG_LEN + 3],
            ]) as u64;

            if header[..TAG_LEN] == wanted {
                let copied = (buf.len() as u64).min(length) as usize;
                self.file.read_exact(&mut buf[..copied])?;
                if (copied as u64) < length {
                    // Keep the cursor record-aligned even on a truncated copy.
                    self.file.seek(SeekFrom::Current(length as i64 - copied as i64))?;
                }
                return Ok(Some(copied));
            }

            // Not this record: skip the payload without reading it.
            pos = self.file.seek(SeekFrom::Current(length as i64))?;
        }

        Ok(None)
    }
}

/// NUL-padded fixed-width tag field. Over-long tags are truncated the same
/// way on write and read, so they still match themselves.
fn tag_bytes(tag: &str) -> [u8; TAG_LEN] {
    let mut key = [0u8; TAG_LEN];
    let bytes = tag.as_bytes();
    let n = bytes.len().min(TAG_LEN - 1);
    key[..n].copy_from_slice(&bytes[..n]);
    key
}
