use std::fmt;

/// Fieldless classification of [`OpenError`], one per failure condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Format,
    UnsupportedCipher,
    KeyDerivation,
    Decryption,
    Integrity,
    MalformedGroupRecord,
    MalformedEntryRecord,
    Unknown,
}

impl ErrorKind {
    /// Every kind, in declaration order.
    pub const ALL: [ErrorKind; 8] = [
        ErrorKind::Format,
        ErrorKind::UnsupportedCipher,
        ErrorKind::KeyDerivation,
        ErrorKind::Decryption,
        ErrorKind::Integrity,
        ErrorKind::MalformedGroupRecord,
        ErrorKind::MalformedEntryRecord,
        ErrorKind::Unknown,
    ];

    /// Stable identifier, suitable for mapping onto a host error type.
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::Format => "FormatError",
            ErrorKind::UnsupportedCipher => "UnsupportedCipherError",
            ErrorKind::KeyDerivation => "KeyDerivationError",
            ErrorKind::Decryption => "DecryptionError",
            ErrorKind::Integrity => "IntegrityError",
            ErrorKind::MalformedGroupRecord => "MalformedGroupRecord",
            ErrorKind::MalformedEntryRecord => "MalformedEntryRecord",
            ErrorKind::Unknown => "UnknownError",
        }
    }

    /// Generic human readable description of the kind.
    pub fn message(self) -> &'static str {
        match self {
            ErrorKind::Format => "not a supported KeePass 1.x database",
            ErrorKind::UnsupportedCipher => "database cipher is not supported",
            ErrorKind::KeyDerivation => "master key derivation failed",
            ErrorKind::Decryption => "database decryption failed",
            ErrorKind::Integrity => "wrong password or corrupted file",
            ErrorKind::MalformedGroupRecord => "malformed group record",
            ErrorKind::MalformedEntryRecord => "malformed entry record",
            ErrorKind::Unknown => "an unknown error occurred",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Reasons opening a database can fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenError {
    /// Bad signature, unsupported version or a truncated header.
    Format(&'static str),
    /// Cipher flags select something other than AES (raw flags word).
    UnsupportedCipher(u32),
    KeyDerivation,
    /// Body length or PKCS#7 padding is invalid.
    Decryption,
    /// The plaintext hash does not match the header content hash.
    Integrity,
    MalformedGroupRecord { index: usize, reason: String },
    MalformedEntryRecord { index: usize, reason: String },
    Unknown(String),
}

impl OpenError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OpenError::Format(_) => ErrorKind::Format,
            OpenError::UnsupportedCipher(_) => ErrorKind::UnsupportedCipher,
            OpenError::KeyDerivation => ErrorKind::KeyDerivation,
            OpenError::Decryption => ErrorKind::Decryption,
            OpenError::Integrity => ErrorKind::Integrity,
            OpenError::MalformedGroupRecord { .. } => ErrorKind::MalformedGroupRecord,
            OpenError::MalformedEntryRecord { .. } => ErrorKind::MalformedEntryRecord,
            OpenError::Unknown(_) => ErrorKind::Unknown,
        }
    }
}

impl fmt::Display for OpenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpenError::Format(reason) => write!(f, "{}: {reason}", self.kind().message()),
            OpenError::UnsupportedCipher(flags) => {
                write!(f, "{} (flags {flags:#010x})", self.kind().message())
            }
            OpenError::MalformedGroupRecord { index, reason } => {
                write!(f, "malformed group record #{index}: {reason}")
            }
            OpenError::MalformedEntryRecord { index, reason } => {
                write!(f, "malformed entry record #{index}: {reason}")
            }
            OpenError::Unknown(detail) => write!(f, "{}: {detail}", self.kind().message()),
            other => f.write_str(other.kind().message()),
        }
    }
}

impl std::error::Error for OpenError {}
