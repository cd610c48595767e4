//! Binary score-table format.
//!
//! Format:
//! - Header (32 bytes):
//!   - Magic: "TMM1" (4 bytes)
//!   - Version: u32 LE (4 bytes)
//!   - Entry count: u64 LE (8 bytes)
//!   - Checksum: u64 LE xxhash of data section (8 bytes)
//!   - Reserved: 8 bytes (zeros)
//! - Data section (entry_count × 12 bytes):
//!   - Code: u32 LE (4 bytes)
//!   - Score: f64 LE (8 bytes)
//!
//! Entries are sorted by code.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use morris_core::{ScoreTable, StateCode};
use xxhash_rust::xxh64::xxh64;

const MAGIC: &[u8; 4] = b"TMM1";
const VERSION: u32 = 1;
const HEADER_SIZE: usize = 32;
const ENTRY_SIZE: usize = 12;

fn invalid_data(message: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message.into())
}

fn le_u32(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[..4]);
    u32::from_le_bytes(buf)
}

fn le_u64(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[..8]);
    u64::from_le_bytes(buf)
}

/// Write `table` in binary form. Returns the number of entries written.
pub fn write_table<W: Write>(mut writer: W, table: &ScoreTable) -> io::Result<usize> {
    let entries = table.sorted_entries();
    let count = entries.len();

    let mut data = Vec::with_capacity(count * ENTRY_SIZE);
    for (code, score) in &entries {
        data.extend_from_slice(&code.value().to_le_bytes());
        data.extend_from_slice(&score.to_le_bytes());
    }
    let checksum = xxh64(&data, 0);

    writer.write_all(MAGIC)?;
    writer.write_all(&VERSION.to_le_bytes())?;
    writer.write_all(&(count as u64).to_le_bytes())?;
    writer.write_all(&checksum.to_le_bytes())?;
    writer.write_all(&[0u8; 8])?; // Reserved
    writer.write_all(&data)?;
    writer.flush()?;

    Ok(count)
}

/// Read a binary table, verifying magic, version and checksum.
pub fn read_table<R: Read>(mut reader: R) -> io::Result<ScoreTable> {
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    if &header[0..4] != MAGIC {
        return Err(invalid_data("invalid score table magic"));
    }
    let version = le_u32(&header[4..8]);
    if version != VERSION {
        return Err(invalid_data(format!(
            "unsupported score table version: {}",
            version
        )));
    }
    let count = usize::try_from(le_u64(&header[8..16]))
        .map_err(|_| invalid_data("entry count does not fit in memory"))?;
    let stored_checksum = le_u64(&header[16..24]);

    let len = count
        .checked_mul(ENTRY_SIZE)
        .ok_or_else(|| invalid_data("entry count overflows"))?;
    let mut data = vec![0u8; len];
    reader.read_exact(&mut data)?;

    if xxh64(&data, 0) != stored_checksum {
        return Err(invalid_data("score table checksum mismatch"));
    }

    let mut table = ScoreTable::with_capacity(count);
    for entry in data.chunks_exact(ENTRY_SIZE) {
        let code = le_u32(&entry[0..4]);
        let score = f64::from_bits(le_u64(&entry[4..12]));
        table.insert(StateCode(code), score);
    }
    Ok(table)
}

/// Save `table` to `path`.
pub fn save(path: &Path, table: &ScoreTable) -> io::Result<usize> {
    let file = File::create(path)?;
    write_table(BufWriter::new(file), table)
}

/// Load a table saved with [`save`].
pub fn load(path: &Path) -> io::Result<ScoreTable> {
    let file = File::open(path)?;
    read_table(BufReader::new(file))
}

/// File size for a given number of entries.
pub fn estimate_size(count: usize) -> usize {
    HEADER_SIZE + count * ENTRY_SIZE
}
