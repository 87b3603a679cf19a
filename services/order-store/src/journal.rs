//! Intent journal — append-only match-step log with checksums
//!
//! Before a match step is applied anywhere, its full effect (trade plus
//! both orders' post-step records) is appended here. Replaying the
//! journal re-derives every fill and settlement, which is what makes a
//! match step all-or-nothing without multi-row store transactions.
//!
//! # Binary Format (per entry)
//! ```text
//! [total_len: u32]
//! [sequence:  u64]
//! [timestamp: i64]
//! [event_type_len: u16][event_type: bytes]
//! [payload_len: u32][payload: bytes]
//! [checksum: u32]  // CRC32C over sequence+timestamp+event_type+payload
//! ```

use crc32c::crc32c;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use types::order::Order;
use types::trade::Trade;

/// Event type tag for match-step intents.
pub const MATCH_STEP: &str = "MATCH_STEP";

#[derive(Error, Debug)]
pub enum JournalError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("checksum mismatch at sequence {sequence}")]
    ChecksumMismatch { sequence: u64 },
}

/// The durable record of one match step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchIntent {
    pub trade: Trade,
    /// Resting order after the step
    pub maker: Order,
    /// Incoming order after the step
    pub taker: Order,
}

impl MatchIntent {
    pub fn encode(&self) -> Result<Vec<u8>, JournalError> {
        bincode::serialize(self).map_err(|e| JournalError::Serialization(e.to_string()))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, JournalError> {
        bincode::deserialize(bytes).map_err(|e| JournalError::Serialization(e.to_string()))
    }
}

/// A single journal entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Monotonic sequence number within this journal
    pub sequence: u64,
    /// Unix nanosecond timestamp
    pub timestamp: i64,
    /// Event type tag
    pub event_type: String,
    /// Bincode-serialized payload
    pub payload: Vec<u8>,
    /// CRC32C over (sequence ++ timestamp ++ event_type ++ payload)
    pub checksum: u32,
}

impl JournalEntry {
    /// Create a new entry, computing the CRC32C checksum automatically.
    pub fn new(sequence: u64, timestamp: i64, event_type: String, payload: Vec<u8>) -> Self {
        let checksum = Self::compute_checksum(sequence, timestamp, &event_type, &payload);
        Self {
            sequence,
            timestamp,
            event_type,
            payload,
            checksum,
        }
    }

    fn compute_checksum(sequence: u64, timestamp: i64, event_type: &str, payload: &[u8]) -> u32 {
        let mut buf = Vec::with_capacity(8 + 8 + event_type.len() + payload.len());
        buf.extend_from_slice(&sequence.to_le_bytes());
        buf.extend_from_slice(&timestamp.to_le_bytes());
        buf.extend_from_slice(event_type.as_bytes());
        buf.extend_from_slice(payload);
        crc32c(&buf)
    }

    /// Validate the stored checksum against the recomputed value.
    pub fn verify_checksum(&self) -> bool {
        let expected =
            Self::compute_checksum(self.sequence, self.timestamp, &self.event_type, &self.payload);
        self.checksum == expected
    }

    /// Serialize entry to the binary wire format.
    pub fn to_bytes(&self) -> Vec<u8> {
        let event_type_bytes = self.event_type.as_bytes();
        let event_type_len = event_type_bytes.len() as u16;
        let payload_len = self.payload.len() as u32;

        let body_len: u32 = 8 + 8 + 2 + (event_type_len as u32) + 4 + payload_len + 4;

        let mut buf = Vec::with_capacity(4 + body_len as usize);
        buf.extend_from_slice(&body_len.to_le_bytes());
        buf.extend_from_slice(&self.sequence.to_le_bytes());
        buf.extend_from_slice(&self.timestamp.to_le_bytes());
        buf.extend_from_slice(&event_type_len.to_le_bytes());
        buf.extend_from_slice(event_type_bytes);
        buf.extend_from_slice(&payload_len.to_le_bytes());
        buf.extend_from_slice(&self.payload);
        buf.extend_from_slice(&self.checksum.to_le_bytes());
        buf
    }

    /// Deserialize an entry from the binary wire format.
    ///
    /// Returns `(entry, bytes_consumed)`. Corrupted length fields produce
    /// errors instead of panics.
    pub fn from_bytes(data: &[u8]) -> Result<(Self, usize), JournalError> {
        if data.len() < 4 {
            return Err(JournalError::Serialization(
                "not enough data for length prefix".into(),
            ));
        }

        let body_len = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;

        // Reject absurd lengths (likely corruption)
        if body_len > 100_000_000 {
            return Err(JournalError::Serialization(format!(
                "implausible body length: {body_len}"
            )));
        }

        let total = 4 + body_len;
        if data.len() < total {
            return Err(JournalError::Serialization(format!(
                "incomplete entry: need {} bytes, have {}",
                total,
                data.len()
            )));
        }

        // Minimum body: 8 + 8 + 2 + 0 + 4 + 0 + 4 = 26
        if body_len < 26 {
            return Err(JournalError::Serialization(format!(
                "body too small: {body_len} bytes"
            )));
        }

        let body = &data[4..total];
        let mut pos: usize = 0;

        let sequence = u64::from_le_bytes(body[pos..pos + 8].try_into().unwrap());
        pos += 8;

        let timestamp = i64::from_le_bytes(body[pos..pos + 8].try_into().unwrap());
        pos += 8;

        let event_type_len = u16::from_le_bytes(body[pos..pos + 2].try_into().unwrap()) as usize;
        pos += 2;

        if pos + event_type_len + 4 > body.len() {
            return Err(JournalError::Serialization(
                "event type overruns body".into(),
            ));
        }
        let event_type = String::from_utf8(body[pos..pos + event_type_len].to_vec())
            .map_err(|e| JournalError::Serialization(e.to_string()))?;
        pos += event_type_len;

        let payload_len = u32::from_le_bytes(body[pos..pos + 4].try_into().unwrap()) as usize;
        pos += 4;

        if pos + payload_len + 4 > body.len() {
            return Err(JournalError::Serialization("payload overruns body".into()));
        }
        let payload = body[pos..pos + payload_len].to_vec();
        pos += payload_len;

        let checksum = u32::from_le_bytes(body[pos..pos + 4].try_into().unwrap());

        Ok((
            Self {
                sequence,
                timestamp,
                event_type,
                payload,
                checksum,
            },
            total,
        ))
    }
}

/// Append-only journal writer for one trading pair.
pub struct IntentJournal {
    path: PathBuf,
    writer: BufWriter<File>,
    next_sequence: u64,
}

impl IntentJournal {
    /// Open (or create) the journal file at `path`, appending after any
    /// existing entries.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, JournalError> {
        let path = path.as_ref().to_path_buf();
        // A corrupt journal must fail loudly here, not be appended to.
        let existing = Self::read_all(&path)?;
        let next_sequence = existing.last().map(|e| e.sequence + 1).unwrap_or(1);

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
            next_sequence,
        })
    }

    /// Journal file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a match intent, flushing before returning.
    pub fn append_match_step(
        &mut self,
        intent: &MatchIntent,
        timestamp: i64,
    ) -> Result<u64, JournalError> {
        let payload = intent.encode()?;
        let entry = JournalEntry::new(self.next_sequence, timestamp, MATCH_STEP.to_string(), payload);
        self.writer.write_all(&entry.to_bytes())?;
        self.writer.flush()?;
        self.next_sequence += 1;
        Ok(entry.sequence)
    }

    /// Read every entry in a journal file, verifying checksums.
    pub fn read_all(path: impl AsRef<Path>) -> Result<Vec<JournalEntry>, JournalError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let mut data = Vec::new();
        File::open(path)?.read_to_end(&mut data)?;

        let mut entries = Vec::new();
        let mut pos = 0;
        while pos < data.len() {
            let (entry, consumed) = JournalEntry::from_bytes(&data[pos..])?;
            if !entry.verify_checksum() {
                return Err(JournalError::ChecksumMismatch {
                    sequence: entry.sequence,
                });
            }
            entries.push(entry);
            pos += consumed;
        }
        Ok(entries)
    }

    /// Replay all match intents recorded in a journal file, in order.
    pub fn replay(path: impl AsRef<Path>) -> Result<Vec<MatchIntent>, JournalError> {
        Self::read_all(path)?
            .iter()
            .filter(|e| e.event_type == MATCH_STEP)
            .map(|e| MatchIntent::decode(&e.payload))
            .collect()
    }
}
