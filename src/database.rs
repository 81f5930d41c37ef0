//! Immutable view of an opened database.

use crate::crypto::Header;
use crate::time::Times;
use zeroize::Zeroize;

/// Title reserved for housekeeping entries that hold no user data.
pub const META_INFO_TITLE: &str = "Meta-Info";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Group {
    pub(crate) id: u32,
    pub(crate) name: String,
    pub(crate) level: u16,
    pub(crate) icon: u32,
    pub(crate) flags: u32,
    pub(crate) times: Times,
}

impl Group {
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Nesting depth; the parent is the nearest preceding group one level up.
    pub fn level(&self) -> u16 {
        self.level
    }

    pub fn icon(&self) -> u32 {
        self.icon
    }

    pub fn flags(&self) -> u32 {
        self.flags
    }

    pub fn times(&self) -> &Times {
        &self.times
    }
}

/// A file attached to an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attachment {
    pub(crate) description: String,
    pub(crate) data: Vec<u8>,
}

impl Attachment {
    /// Usually the original file name.
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

#[derive(Clone, Default, PartialEq, Eq)]
pub struct Entry {
    pub(crate) uuid: [u8; 16],
    pub(crate) group_id: u32,
    pub(crate) icon: u32,
    pub(crate) title: String,
    pub(crate) url: String,
    pub(crate) username: String,
    pub(crate) password: Vec<u8>,
    pub(crate) notes: Vec<u8>,
    pub(crate) times: Times,
    pub(crate) attachment: Option<Attachment>,
}

impl Drop for Entry {
    fn drop(&mut self) {
        self.password.zeroize();
        self.notes.zeroize();
    }
}

impl std::fmt::Debug for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entry")
            .field("uuid", &self.uuid)
            .field("group_id", &self.group_id)
            .field("title", &self.title)
            .field("username", &self.username)
            .field("url", &self.url)
            .field("password", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl Entry {
    pub fn uuid(&self) -> &[u8; 16] {
        &self.uuid
    }

    /// Identifier of the owning [`Group`].
    pub fn group_id(&self) -> u32 {
        self.group_id
    }

    pub fn icon(&self) -> u32 {
        self.icon
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Password exactly as stored, without the terminating NUL.
    pub fn password_bytes(&self) -> &[u8] {
        &self.password
    }

    /// The password as text, or `None` if the stored bytes are not UTF-8.
    pub fn password(&self) -> Option<&str> {
        std::str::from_utf8(&self.password).ok()
    }

    pub fn notes_bytes(&self) -> &[u8] {
        &self.notes
    }

    /// The notes as text, or `None` if the stored bytes are not UTF-8.
    pub fn notes(&self) -> Option<&str> {
        std::str::from_utf8(&self.notes).ok()
    }

    pub fn times(&self) -> &Times {
        &self.times
    }

    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }

    pub fn is_meta_info(&self) -> bool {
        self.title == META_INFO_TITLE
    }
}

/// A group together with its nested groups, derived from levels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupNode<'a> {
    pub group: &'a Group,
    pub children: Vec<GroupNode<'a>>,
}

/// A successfully opened database.
///
/// Groups and entries keep file order. Nothing is mutated after opening, so a
/// `Database` can be shared freely between readers.
#[derive(Debug, Clone)]
pub struct Database {
    header: Header,
    groups: Vec<Group>,
    entries: Vec<Entry>,
}

impl Database {
    pub(crate) fn new(header: Header, groups: Vec<Group>, entries: Vec<Entry>) -> Self {
        Self {
            header,
            groups,
            entries,
        }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// All groups, unfiltered.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn group(&self, id: u32) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    /// User entries; `Meta-Info` records are left out.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|e| !e.is_meta_info())
    }

    /// User entries belonging to group `id`, in file order.
    pub fn entries_for_group(&self, id: u32) -> impl Iterator<Item = &Entry> {
        self.entries().filter(move |e| e.group_id == id)
    }

    /// The housekeeping entries hidden from [`Database::entries`].
    pub fn meta_entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|e| e.is_meta_info())
    }

    /// Index of the parent of the group at `index`: the nearest preceding
    /// group whose level is exactly one less.
    pub fn parent_of(&self, index: usize) -> Option<usize> {
        let level = self.groups.get(index)?.level;
        let parent_level = level.checked_sub(1)?;
        self.groups[..index]
            .iter()
            .rposition(|g| g.level == parent_level)
    }

    /// Groups arranged as a forest. Groups without a parent are roots.
    pub fn group_tree(&self) -> Vec<GroupNode<'_>> {
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); self.groups.len()];
        let mut roots = Vec::new();

        for index in 0..self.groups.len() {
            match self.parent_of(index) {
                Some(parent) => children[parent].push(index),
                None => roots.push(index),
            }
        }

        roots
            .into_iter()
            .map(|index| self.build_node(index, &children))
            .collect()
    }

    fn build_node<'a>(&'a self, index: usize, children: &[Vec<usize>]) -> GroupNode<'a> {
        GroupNode {
            group: &self.groups[index],
            children: children[index]
                .iter()
                .map(|&child| self.build_node(child, children))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::TransformParams;

    fn group(id: u32, name: &str, level: u16) -> Group {
        Group {
            id,
            name: name.to_string(),
            level,
            ..Group::default()
        }
    }

    fn entry(group_id: u32, title: &str) -> Entry {
        let mut e = Entry::default();
        e.group_id = group_id;
        e.title = title.to_string();
        e
    }

    fn database(groups: Vec<Group>, entries: Vec<Entry>) -> Database {
        let header = Header::new(
            [0; 16],
            [0; 16],
            groups.len() as u32,
            entries.len() as u32,
            [0; 32],
            TransformParams::new([0; 32], 0),
        );
        Database::new(header, groups, entries)
    }

    #[test]
    fn meta_info_entries_are_hidden() {
        let db = database(
            vec![group(1, "Internet", 0)],
            vec![entry(1, "Meta-Info"), entry(1, "site"), entry(1, "Meta-Info")],
        );

        let titles: Vec<_> = db.entries().map(Entry::title).collect();
        assert_eq!(titles, ["site"]);
        assert_eq!(db.meta_entries().count(), 2);
        assert_eq!(db.groups().len(), 1);
    }

    #[test]
    fn entries_for_group_keeps_order() {
        let db = database(
            vec![group(1, "a", 0), group(2, "b", 0)],
            vec![
                entry(2, "first"),
                entry(1, "other"),
                entry(2, "Meta-Info"),
                entry(2, "second"),
            ],
        );

        let titles: Vec<_> = db.entries_for_group(2).map(Entry::title).collect();
        assert_eq!(titles, ["first", "second"]);
        assert_eq!(db.entries_for_group(99).count(), 0);
    }

    #[test]
    fn group_lookup_by_id() {
        let db = database(vec![group(5, "five", 0)], vec![]);

        assert_eq!(db.group(5).map(Group::name), Some("five"));
        assert!(db.group(6).is_none());
    }

    #[test]
    fn parent_is_nearest_preceding_group_one_level_up() {
        let db = database(
            vec![
                group(1, "root", 0),
                group(2, "child", 1),
                group(3, "grandchild", 2),
                group(4, "second child", 1),
                group(5, "other root", 0),
            ],
            vec![],
        );

        assert_eq!(db.parent_of(0), None);
        assert_eq!(db.parent_of(1), Some(0));
        assert_eq!(db.parent_of(2), Some(1));
        assert_eq!(db.parent_of(3), Some(0));
        assert_eq!(db.parent_of(4), None);
        assert_eq!(db.parent_of(5), None);
    }

    #[test]
    fn orphaned_level_becomes_root() {
        let db = database(vec![group(1, "deep", 2), group(2, "top", 0)], vec![]);

        assert_eq!(db.parent_of(0), None);
        assert_eq!(db.group_tree().len(), 2);
    }

    #[test]
    fn builds_group_tree() {
        let db = database(
            vec![
                group(1, "Internet", 0),
                group(2, "Mail", 1),
                group(3, "Web", 1),
                group(4, "Banking", 0),
            ],
            vec![],
        );

        let tree = db.group_tree();

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].group.name(), "Internet");
        let names: Vec<_> = tree[0].children.iter().map(|n| n.group.name()).collect();
        assert_eq!(names, ["Mail", "Web"]);
        assert!(tree[1].children.is_empty());
    }

    #[test]
    fn debug_output_hides_password() {
        let mut e = entry(1, "bank");
        e.password = b"s3cret".to_vec();

        let out = format!("{e:?}");
        assert!(!out.contains("s3cret"));
        assert!(out.contains("bank"));
    }

    #[test]
    fn password_text_requires_utf8() {
        let mut e = entry(1, "legacy");
        e.password = vec![b'p', 0xE9, b'w'];

        assert_eq!(e.password(), None);
        assert_eq!(e.password_bytes(), &[b'p', 0xE9, b'w']);

        e.password = "pässword".as_bytes().to_vec();
        assert_eq!(e.password(), Some("pässword"));
    }

    #[test]
    fn database_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Database>();
    }
}
