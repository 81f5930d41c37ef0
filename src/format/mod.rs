//! Record stream of a decrypted database.
//!
//! The plaintext is a flat sequence of fields:
//! ```text
//! TYPE (2, LE) | LENGTH (4, LE) | VALUE (LENGTH)
//! ```
//! A field of type `0xFFFF` ends the current record. All group records come
//! first, followed by all entry records.

use crate::database::{Entry, Group};
use crate::error::OpenError;
use crate::time::{PACKED_LEN, Timestamp};

pub mod entry;
pub mod group;

/// Field type terminating a record.
pub const END_OF_RECORD: u16 = 0xFFFF;
/// Field type carrying an ignorable comment in both record kinds.
pub const COMMENT: u16 = 0x0000;

const FIELD_HEADER_LEN: usize = 2 + 4;

/// Why a single record could not be read.
pub(crate) type RecordResult<T> = Result<T, String>;

/// One type/length/value field borrowed from the plaintext.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Field<'a> {
    pub kind: u16,
    pub value: &'a [u8],
}

impl<'a> Field<'a> {
    fn fixed<const N: usize>(&self) -> RecordResult<[u8; N]> {
        self.value.try_into().map_err(|_| {
            format!(
                "field {:#06x} must be {} bytes, found {}",
                self.kind,
                N,
                self.value.len()
            )
        })
    }

    pub fn u16(&self) -> RecordResult<u16> {
        self.fixed().map(u16::from_le_bytes)
    }

    pub fn u32(&self) -> RecordResult<u32> {
        self.fixed().map(u32::from_le_bytes)
    }

    pub fn bytes<const N: usize>(&self) -> RecordResult<[u8; N]> {
        self.fixed()
    }

    pub fn timestamp(&self) -> RecordResult<Timestamp> {
        self.fixed::<PACKED_LEN>().map(|b| Timestamp::unpack(&b))
    }

    /// Bytes of a NUL-terminated value; anything after the first NUL is ignored.
    pub fn text(&self) -> &'a [u8] {
        let end = self
            .value
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(self.value.len());
        &self.value[..end]
    }

    /// [`Field::text`] decoded as UTF-8, with invalid sequences replaced.
    pub fn string(&self) -> String {
        String::from_utf8_lossy(self.text()).into_owned()
    }
}

/// Cursor over the field stream.
pub(crate) struct FieldReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> FieldReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn next_field(&mut self) -> RecordResult<Field<'a>> {
        if self.remaining() < FIELD_HEADER_LEN {
            return Err(format!(
                "truncated field header at offset {}",
                self.offset
            ));
        }

        let header = &self.data[self.offset..self.offset + FIELD_HEADER_LEN];
        let kind = u16::from_le_bytes([header[0], header[1]]);
        let len = u32::from_le_bytes([header[2], header[3], header[4], header[5]]) as usize;
        let start = self.offset + FIELD_HEADER_LEN;

        if len > self.data.len() - start {
            return Err(format!(
                "field {kind:#06x} declares {len} bytes but only {} remain",
                self.data.len() - start
            ));
        }

        self.offset = start + len;
        Ok(Field {
            kind,
            value: &self.data[start..start + len],
        })
    }
}

/// Upper bound for pre-allocation; every record holds at least its terminator.
fn capacity_hint(declared: u32, reader: &FieldReader<'_>) -> usize {
    (declared as usize).min(reader.remaining() / FIELD_HEADER_LEN)
}

/// Parses `group_count` groups followed by `entry_count` entries.
///
/// The declared counts bound the loops. If the plaintext ends cleanly on a
/// record boundary before a count is reached, parsing stops early without
/// error; trailing bytes after the last declared record are ignored.
///
/// # Errors
///
/// [`OpenError::MalformedGroupRecord`] or [`OpenError::MalformedEntryRecord`]
/// if a record is truncated, overruns the buffer or has a badly sized field.
pub fn parse_records(
    plaintext: &[u8],
    group_count: u32,
    entry_count: u32,
) -> Result<(Vec<Group>, Vec<Entry>), OpenError> {
    let mut reader = FieldReader::new(plaintext);

    let mut groups = Vec::with_capacity(capacity_hint(group_count, &reader));
    for index in 0..group_count as usize {
        if reader.is_empty() {
            break;
        }
        let group = group::read_group(&mut reader)
            .map_err(|reason| OpenError::MalformedGroupRecord { index, reason })?;
        groups.push(group);
    }

    let mut entries = Vec::with_capacity(capacity_hint(entry_count, &reader));
    for index in 0..entry_count as usize {
        if reader.is_empty() {
            break;
        }
        let entry = entry::read_entry(&mut reader)
            .map_err(|reason| OpenError::MalformedEntryRecord { index, reason })?;
        entries.push(entry);
    }

    if groups.len() != group_count as usize || entries.len() != entry_count as usize {
        tracing::debug!(
            declared_groups = group_count,
            groups = groups.len(),
            declared_entries = entry_count,
            entries = entries.len(),
            "record counts differ from header"
        );
    }
    if !reader.is_empty() {
        tracing::debug!(trailing = reader.remaining(), "ignoring bytes after last record");
    }

    Ok((groups, entries))
}

/// Field encoder used to build record streams in tests.
#[cfg(test)]
pub(crate) fn field(kind: u16, value: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(FIELD_HEADER_LEN + value.len());
    out.extend_from_slice(&kind.to_le_bytes());
    out.extend_from_slice(&(value.len() as u32).to_le_bytes());
    out.extend_from_slice(value);
    out
}
