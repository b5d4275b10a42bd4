use crate::errors::DbError;
use crate::types::DocumentId;
use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};
use bson::Document as BsonDocument;
use crc32fast::Hasher as Crc32Hasher;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

// len (u32 LE) + crc32 (u32 LE)
const HEADER_LEN: usize = 8;

/// Represents operations that can be logged in the WAL.
/// Document bodies are stored as raw BSON bytes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum Operation {
    Insert { id: DocumentId, data: Vec<u8> },
    Update { id: DocumentId, data: Vec<u8> },
    Delete { id: DocumentId },
}

pub struct Wal {
    file: File,
    path: PathBuf,
}

impl std::fmt::Debug for Wal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wal").field("path", &self.path).finish()
    }
}

impl Wal {
    /// # Errors
    /// Returns `DbError::Io` if the file cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DbError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().read(true).append(true).create(true).open(&path)?;
        Ok(Self { file, path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// # Errors
    /// Returns an error if the record cannot be encoded or written.
    pub fn append(&mut self, op: &Operation) -> Result<(), DbError> {
        let payload = encode_to_vec(op, standard())?;
        let len = u32::try_from(payload.len())
            .map_err(|_| DbError::WalError(format!("record too large: {} bytes", payload.len())))?;
        let mut hasher = Crc32Hasher::new();
        hasher.update(&payload);
        let mut record = Vec::with_capacity(HEADER_LEN + payload.len());
        record.extend_from_slice(&len.to_le_bytes());
        record.extend_from_slice(&hasher.finalize().to_le_bytes());
        record.extend_from_slice(&payload);
        self.file.write_all(&record)?;
        self.file.sync_data()?;
        Ok(())
    }

    /// Read every complete record. A truncated tail (torn write) is cut off the file so
    /// later appends start at a record boundary.
    ///
    /// # Errors
    /// Returns `DbError::WalError` on a checksum mismatch and `DbError::Decode` on a corrupt payload.
    pub fn read_all(&mut self) -> Result<Vec<Operation>, DbError> {
        self.file.seek(SeekFrom::Start(0))?;
        let mut buf = Vec::new();
        self.file.read_to_end(&mut buf)?;
        let mut ops = Vec::new();
        let mut offset = 0usize;
        while offset + HEADER_LEN <= buf.len() {
            let len = read_u32(&buf[offset..offset + 4]) as usize;
            let crc = read_u32(&buf[offset + 4..offset + HEADER_LEN]);
            let start = offset + HEADER_LEN;
            if start + len > buf.len() {
                break;
            }
            let payload = &buf[start..start + len];
            let mut hasher = Crc32Hasher::new();
            hasher.update(payload);
            if hasher.finalize() != crc {
                return Err(DbError::WalError(format!("checksum mismatch at offset {offset}")));
            }
            let (op, _) = decode_from_slice::<Operation, _>(payload, standard())?;
            ops.push(op);
            offset = start + len;
        }
        if offset < buf.len() {
            log::warn!(
                "wal {}: dropping {} trailing bytes at offset {offset}",
                self.path.display(),
                buf.len() - offset
            );
            self.file.set_len(offset as u64)?;
            self.file.sync_data()?;
        }
        Ok(ops)
    }
}

fn read_u32(bytes: &[u8]) -> u32 {
    let mut arr = [0u8; 4];
    arr.copy_from_slice(bytes);
    u32::from_le_bytes(arr)
}

/// # Errors
/// Returns `DbError::WalError` if the document cannot be serialized.
pub fn encode_document(doc: &BsonDocument) -> Result<Vec<u8>, DbError> {
    let mut out = Vec::new();
    doc.to_writer(&mut out).map_err(|e| DbError::WalError(e.to_string()))?;
    Ok(out)
}

/// # Errors
/// Returns `DbError::WalError` if the bytes are not a valid BSON document.
pub fn decode_document(bytes: &[u8]) -> Result<BsonDocument, DbError> {
    BsonDocument::from_reader(bytes).map_err(|e| DbError::WalError(e.to_string()))
}
