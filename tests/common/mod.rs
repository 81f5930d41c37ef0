#![allow(dead_code)]

use aes::Aes256;
use cbc::cipher::{BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};
use kdb1::{Header, Timestamp, TransformParams, crypto::derive_key};
use sha2::{Digest, Sha256};

pub const PASSWORD: &str = "abc123";

const END: u16 = 0xFFFF;

fn field(out: &mut Vec<u8>, kind: u16, value: &[u8]) {
    out.extend_from_slice(&kind.to_le_bytes());
    out.extend_from_slice(&(value.len() as u32).to_le_bytes());
    out.extend_from_slice(value);
}

fn text(s: &str) -> Vec<u8> {
    let mut out = s.as_bytes().to_vec();
    out.push(0);
    out
}

pub struct GroupSpec {
    pub id: u32,
    pub name: String,
    pub level: u16,
}

pub struct EntrySpec {
    pub group_id: u32,
    pub title: String,
    pub username: String,
    pub password: String,
}

/// Builds encrypted KeePass 1.x files for tests.
pub struct KdbBuilder {
    groups: Vec<GroupSpec>,
    entries: Vec<EntrySpec>,
    rounds: u32,
    declared: Option<(u32, u32)>,
    extra_plaintext: Vec<u8>,
}

impl KdbBuilder {
    pub fn new() -> Self {
        Self {
            groups: Vec::new(),
            entries: Vec::new(),
            rounds: 50,
            declared: None,
            extra_plaintext: Vec::new(),
        }
    }

    pub fn group(mut self, id: u32, name: &str, level: u16) -> Self {
        self.groups.push(GroupSpec {
            id,
            name: name.to_string(),
            level,
        });
        self
    }

    pub fn entry(mut self, group_id: u32, title: &str) -> Self {
        self.entries.push(EntrySpec {
            group_id,
            title: title.to_string(),
            username: format!("{title}-user"),
            password: format!("{title}-pass"),
        });
        self
    }

    pub fn rounds(mut self, rounds: u32) -> Self {
        self.rounds = rounds;
        self
    }

    /// Overrides the group and entry counts written to the header.
    pub fn declared_counts(mut self, groups: u32, entries: u32) -> Self {
        self.declared = Some((groups, entries));
        self
    }

    /// Appends raw bytes to the record stream before encryption.
    pub fn extra_plaintext(mut self, bytes: &[u8]) -> Self {
        self.extra_plaintext.extend_from_slice(bytes);
        self
    }

    pub fn plaintext(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let stamp = Timestamp::new(2012, 3, 4, 5, 6, 7).pack();

        for g in &self.groups {
            field(&mut out, 0x0001, &g.id.to_le_bytes());
            field(&mut out, 0x0002, &text(&g.name));
            field(&mut out, 0x0003, &stamp);
            field(&mut out, 0x0004, &stamp);
            field(&mut out, 0x0005, &stamp);
            field(&mut out, 0x0006, &Timestamp::NEVER.pack());
            field(&mut out, 0x0007, &1u32.to_le_bytes());
            field(&mut out, 0x0008, &g.level.to_le_bytes());
            field(&mut out, 0x0009, &0u32.to_le_bytes());
            field(&mut out, END, &[]);
        }

        for (i, e) in self.entries.iter().enumerate() {
            field(&mut out, 0x0001, &[i as u8; 16]);
            field(&mut out, 0x0002, &e.group_id.to_le_bytes());
            field(&mut out, 0x0003, &0u32.to_le_bytes());
            field(&mut out, 0x0004, &text(&e.title));
            field(&mut out, 0x0005, &text("https://example.com"));
            field(&mut out, 0x0006, &text(&e.username));
            field(&mut out, 0x0007, &text(&e.password));
            field(&mut out, 0x0008, &text(""));
            field(&mut out, 0x0009, &stamp);
            field(&mut out, 0x000A, &stamp);
            field(&mut out, 0x000B, &stamp);
            field(&mut out, 0x000C, &Timestamp::NEVER.pack());
            field(&mut out, 0x000D, &text(""));
            field(&mut out, 0x000E, &[]);
            field(&mut out, END, &[]);
        }

        out.extend_from_slice(&self.extra_plaintext);
        out
    }

    pub fn build(&self, password: &str) -> Vec<u8> {
        let plaintext = self.plaintext();
        let master_seed = [0x4D; 16];
        let iv = [0x1A; 16];
        let transform = TransformParams::new([0x7E; 32], self.rounds);

        let key = derive_key(password.as_bytes(), &master_seed, &transform).unwrap();
        let body = cbc::Encryptor::<Aes256>::new(key.as_slice().into(), &iv.into())
            .encrypt_padded_vec_mut::<Pkcs7>(&plaintext);

        let mut hash = [0u8; 32];
        hash.copy_from_slice(&Sha256::digest(&plaintext));

        let (groups, entries) = self
            .declared
            .unwrap_or((self.groups.len() as u32, self.entries.len() as u32));
        let header = Header::new(master_seed, iv, groups, entries, hash, transform);

        let mut file = header.to_bytes();
        file.extend_from_slice(&body);
        file
    }
}

/// Two groups ("Test1", "Test2") with one user entry each and a Meta-Info entry.
pub fn sample() -> KdbBuilder {
    KdbBuilder::new()
        .group(1, "Test1", 0)
        .group(2, "Test2", 0)
        .entry(1, "first")
        .entry(2, "second")
        .entry(1, "Meta-Info")
}
