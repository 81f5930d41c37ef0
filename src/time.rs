//! Packed 5-byte timestamps used by group and entry records.
//!
//! ```text
//! byte:  0         1         2         3         4
//! bits:  rrYYYYYY  YYYYYYMM  MMDDDDDH  HHHHmmmm  mmssssss
//! ```
//!
//! The two `r` bits are reserved. Writers leave them zero, but they are kept
//! so that any field re-packs to the bytes it was read from.
//!
//! Values carry no timezone.

use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;

/// Length of a packed timestamp.
pub const PACKED_LEN: usize = 5;

/// Timestamp decoded field by field.
///
/// Fields are kept as stored so that packing reproduces the original bytes even
/// when they do not form a valid calendar date (zeroed fields are common).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timestamp {
    reserved: u8,
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
}

impl Timestamp {
    /// Reserved "never expires" value, 2999-12-28 23:59:59.
    pub const NEVER: Timestamp = Timestamp {
        reserved: 0,
        year: 2999,
        month: 12,
        day: 28,
        hour: 23,
        minute: 59,
        second: 59,
    };

    /// Builds a timestamp, masking every field to its bit width.
    pub fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            reserved: 0,
            year: year & 0x0FFF,
            month: month & 0x0F,
            day: day & 0x1F,
            hour: hour & 0x1F,
            minute: minute & 0x3F,
            second: second & 0x3F,
        }
    }

    pub fn unpack(bytes: &[u8; PACKED_LEN]) -> Self {
        let b = bytes.map(u16::from);

        Self {
            reserved: (b[0] >> 6) as u8,
            year: ((b[0] & 0x3F) << 6) | (b[1] >> 2),
            month: (((b[1] & 0x03) << 2) | (b[2] >> 6)) as u8,
            day: ((b[2] >> 1) & 0x1F) as u8,
            hour: (((b[2] & 0x01) << 4) | (b[3] >> 4)) as u8,
            minute: (((b[3] & 0x0F) << 2) | (b[4] >> 6)) as u8,
            second: (b[4] & 0x3F) as u8,
        }
    }

    pub fn pack(&self) -> [u8; PACKED_LEN] {
        let year = self.year;
        let (month, day, hour, minute, second) =
            (self.month, self.day, self.hour, self.minute, self.second);

        [
            (self.reserved << 6) | ((year >> 6) & 0x3F) as u8,
            (((year & 0x3F) as u8) << 2) | ((month >> 2) & 0x03),
            ((month & 0x03) << 6) | ((day & 0x1F) << 1) | ((hour >> 4) & 0x01),
            ((hour & 0x0F) << 4) | ((minute >> 2) & 0x0F),
            ((minute & 0x03) << 6) | (second & 0x3F),
        ]
    }

    pub fn is_never(&self) -> bool {
        *self == Self::NEVER
    }

    /// The two reserved high bits of the first byte, normally zero.
    pub fn reserved(&self) -> u8 {
        self.reserved
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn day(&self) -> u8 {
        self.day
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn second(&self) -> u8 {
        self.second
    }

    /// Calendar instant, or `None` for the never sentinel and for fields that
    /// do not name a real date and time.
    pub fn to_datetime(&self) -> Option<NaiveDateTime> {
        if self.is_never() {
            return None;
        }
        NaiveDate::from_ymd_opt(self.year.into(), self.month.into(), self.day.into())?.and_hms_opt(
            self.hour.into(),
            self.minute.into(),
            self.second.into(),
        )
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(value: NaiveDateTime) -> Self {
        use chrono::{Datelike, Timelike};

        Self::new(
            value.year().clamp(0, 0x0FFF) as u16,
            value.month() as u8,
            value.day() as u8,
            value.hour() as u8,
            value.minute() as u8,
            value.second() as u8,
        )
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_never() {
            return f.write_str("never");
        }
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// Creation, modification, access and expiry times of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Times {
    pub created: Timestamp,
    pub modified: Timestamp,
    pub accessed: Timestamp,
    pub expires: Timestamp,
}

impl Default for Times {
    fn default() -> Self {
        let zero = Timestamp::unpack(&[0; PACKED_LEN]);
        Self {
            created: zero,
            modified: zero,
            accessed: zero,
            expires: Timestamp::NEVER,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NEVER_BYTES: [u8; PACKED_LEN] = [0x2E, 0xDF, 0x39, 0x7E, 0xFB];

    #[test]
    fn never_sentinel_matches_format_bytes() {
        assert_eq!(Timestamp::NEVER.pack(), NEVER_BYTES);
        let t = Timestamp::unpack(&NEVER_BYTES);
        assert!(t.is_never());
        assert_eq!(t.pack(), NEVER_BYTES);
        assert_eq!(t.to_string(), "never");
        assert_eq!(t.to_datetime(), None);
    }

    #[test]
    fn unpack_known_date() {
        let t = Timestamp::new(2010, 6, 15, 13, 45, 30);
        let back = Timestamp::unpack(&t.pack());

        assert_eq!(back.year(), 2010);
        assert_eq!(back.month(), 6);
        assert_eq!(back.day(), 15);
        assert_eq!(back.hour(), 13);
        assert_eq!(back.minute(), 45);
        assert_eq!(back.second(), 30);
        assert_eq!(back.to_string(), "2010-06-15 13:45:30");
    }

    #[test]
    fn repack_reproduces_bytes() {
        let samples: [[u8; PACKED_LEN]; 5] = [
            [0x00, 0x00, 0x00, 0x00, 0x00],
            [0x1F, 0x68, 0x9E, 0xDB, 0x5E],
            [0x3F, 0xFF, 0xFF, 0xFF, 0xFF],
            [0x1F, 0x6A, 0x43, 0x00, 0x01],
            NEVER_BYTES,
        ];

        for bytes in samples {
            assert_eq!(Timestamp::unpack(&bytes).pack(), bytes, "{bytes:02x?}");
        }
    }

    #[test]
    fn reserved_bits_survive_repacking() {
        let bytes = [0xDF, 0x68, 0x9E, 0xDB, 0x5E];
        let t = Timestamp::unpack(&bytes);

        assert_eq!(t.reserved(), 0b11);
        assert_eq!(t.year(), Timestamp::unpack(&[0x1F, 0x68, 0x9E, 0xDB, 0x5E]).year());
        assert_eq!(t.pack(), bytes);
        assert!(!t.is_never());
    }

    #[test]
    fn reserved_bits_do_not_match_never() {
        let mut bytes = NEVER_BYTES;
        bytes[0] |= 0x40;
        assert!(!Timestamp::unpack(&bytes).is_never());
    }

    #[test]
    fn zeroed_field_has_no_calendar_value() {
        let t = Timestamp::unpack(&[0; PACKED_LEN]);
        assert_eq!(t.to_datetime(), None);
        assert_eq!(t.to_string(), "0000-00-00 00:00:00");
    }

    #[test]
    fn converts_from_chrono() {
        let dt = NaiveDate::from_ymd_opt(2004, 2, 29)
            .unwrap()
            .and_hms_opt(23, 59, 1)
            .unwrap();
        let t = Timestamp::from(dt);

        assert_eq!(t.to_datetime(), Some(dt));
        assert_eq!(Timestamp::unpack(&t.pack()), t);
    }

    #[test]
    fn default_times_never_expire() {
        assert!(Times::default().expires.is_never());
    }
}
