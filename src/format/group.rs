//! Group record fields.

use super::{COMMENT, END_OF_RECORD, FieldReader, RecordResult};
use crate::database::Group;

pub const ID: u16 = 0x0001;
pub const NAME: u16 = 0x0002;
pub const CREATED: u16 = 0x0003;
pub const MODIFIED: u16 = 0x0004;
pub const ACCESSED: u16 = 0x0005;
pub const EXPIRES: u16 = 0x0006;
pub const ICON: u16 = 0x0007;
pub const LEVEL: u16 = 0x0008;
pub const FLAGS: u16 = 0x0009;

/// Reads fields up to and including the record terminator.
pub(crate) fn read_group(reader: &mut FieldReader<'_>) -> RecordResult<Group> {
    let mut group = Group::default();

    loop {
        let field = reader.next_field()?;
        match field.kind {
            END_OF_RECORD => return Ok(group),
            COMMENT => {}
            ID => group.id = field.u32()?,
            NAME => group.name = field.string(),
            CREATED => group.times.created = field.timestamp()?,
            MODIFIED => group.times.modified = field.timestamp()?,
            ACCESSED => group.times.accessed = field.timestamp()?,
            EXPIRES => group.times.expires = field.timestamp()?,
            ICON => group.icon = field.u32()?,
            LEVEL => group.level = field.u16()?,
            FLAGS => group.flags = field.u32()?,
            other => tracing::trace!(field = other, "skipping unknown group field"),
        }
    }
}
