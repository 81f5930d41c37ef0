//! Entry record fields.

use super::{COMMENT, END_OF_RECORD, FieldReader, RecordResult};
use crate::database::{Attachment, Entry};

pub const UUID: u16 = 0x0001;
pub const GROUP_ID: u16 = 0x0002;
pub const ICON: u16 = 0x0003;
pub const TITLE: u16 = 0x0004;
pub const URL: u16 = 0x0005;
pub const USERNAME: u16 = 0x0006;
pub const PASSWORD: u16 = 0x0007;
pub const NOTES: u16 = 0x0008;
pub const CREATED: u16 = 0x0009;
pub const MODIFIED: u16 = 0x000A;
pub const ACCESSED: u16 = 0x000B;
pub const EXPIRES: u16 = 0x000C;
pub const BINARY_DESC: u16 = 0x000D;
pub const BINARY_DATA: u16 = 0x000E;

/// Reads fields up to and including the record terminator.
pub(crate) fn read_entry(reader: &mut FieldReader<'_>) -> RecordResult<Entry> {
    let mut entry = Entry::default();
    let mut binary_desc = String::new();
    let mut binary_data = Vec::new();

    loop {
        let field = reader.next_field()?;
        match field.kind {
            END_OF_RECORD => break,
            COMMENT => {}
            UUID => entry.uuid = field.bytes()?,
            GROUP_ID => entry.group_id = field.u32()?,
            ICON => entry.icon = field.u32()?,
            TITLE => entry.title = field.string(),
            URL => entry.url = field.string(),
            USERNAME => entry.username = field.string(),
            PASSWORD => entry.password = field.text().to_vec(),
            NOTES => entry.notes = field.text().to_vec(),
            CREATED => entry.times.created = field.timestamp()?,
            MODIFIED => entry.times.modified = field.timestamp()?,
            ACCESSED => entry.times.accessed = field.timestamp()?,
            EXPIRES => entry.times.expires = field.timestamp()?,
            BINARY_DESC => binary_desc = field.string(),
            BINARY_DATA => binary_data = field.value.to_vec(),
            other => tracing::trace!(field = other, "skipping unknown entry field"),
        }
    }

    // Writers emit both attachment fields for every entry, empty when unused.
    if !binary_desc.is_empty() || !binary_data.is_empty() {
        entry.attachment = Some(Attachment {
            description: binary_desc,
            data: binary_data,
        });
    }

    Ok(entry)
}
