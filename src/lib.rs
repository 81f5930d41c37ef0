//! Reader for legacy KeePass 1.x (`.kdb`) password databases.
//!
//! ```no_run
//! let bytes = std::fs::read("passwords.kdb")?;
//! let db = kdb1::open_database(&bytes, b"secret")?;
//! for entry in db.entries() {
//!     println!("{}", entry.title());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod crypto;
mod database;
mod error;
mod format;
pub mod time;

pub use crate::crypto::{Header, TransformParams};
pub use crate::database::{Attachment, Database, Entry, Group, GroupNode, META_INFO_TITLE};
pub use crate::error::{ErrorKind, OpenError};
pub use crate::time::{Timestamp, Times};

/// Decrypts and parses a complete database file.
///
/// Either the whole pipeline succeeds or nothing is returned: header
/// validation, key derivation, decryption with content verification and
/// record parsing run in that order, and the first failure aborts the open.
pub fn open_database(bytes: &[u8], password: &[u8]) -> Result<Database, OpenError> {
    let (header, offset) = Header::from_bytes(bytes)?;
    tracing::debug!(
        version = header.version(),
        groups = header.group_count(),
        entries = header.entry_count(),
        rounds = header.transform().rounds(),
        "header parsed"
    );

    let plaintext = {
        let key = crypto::derive_key(password, header.master_seed(), header.transform())?;
        crypto::decrypt(&key, header.iv(), header.content_hash(), &bytes[offset..])?
    };

    let (groups, entries) =
        format::parse_records(&plaintext, header.group_count(), header.entry_count())?;
    drop(plaintext);

    tracing::debug!(
        groups = groups.len(),
        entries = entries.len(),
        "database opened"
    );

    Ok(Database::new(header, groups, entries))
}

impl Database {
    /// Same as [`open_database`].
    pub fn open(bytes: &[u8], password: &[u8]) -> Result<Self, OpenError> {
        open_database(bytes, password)
    }
}
