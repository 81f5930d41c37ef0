use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use kdb1::{Database, Entry, Group, GroupNode};
use serde::Serialize;
use std::borrow::Cow;
use std::path::PathBuf;
use storage::Storage;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod auth;
mod storage;

#[derive(Debug, Parser)]
#[command(name = "kdb1")]
#[command(version, about = "Read-only browser for KeePass 1.x (.kdb) databases.")]
struct Cli {
    /// Path to the .kdb database file
    #[arg(long, short, global = true, value_name = "PATH", env = "KDB1_PATH")]
    file: Option<PathBuf>,

    /// Print machine readable JSON instead of text
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Shows header information about the database
    Info,

    /// Lists all groups in file order
    Groups,

    /// Prints the group hierarchy
    Tree,

    /// Lists entries, optionally restricted to one group
    Entries {
        /// Only list entries of the group with this id
        #[arg(long, short)]
        group: Option<u32>,

        /// Include passwords in the output
        #[arg(long, default_value_t = false)]
        show_passwords: bool,
    },

    /// Shows every field of the entries with the given title
    #[command(arg_required_else_help = true)]
    Show {
        title: String,

        /// Only search the group with this id
        #[arg(long, short)]
        group: Option<u32>,
    },
}

#[derive(Serialize)]
struct InfoView {
    version: String,
    flags: u32,
    groups: usize,
    entries: usize,
    meta_entries: usize,
    declared_groups: u32,
    declared_entries: u32,
    transform_rounds: u32,
}

#[derive(Serialize)]
struct GroupView<'a> {
    id: u32,
    name: &'a str,
    level: u16,
    icon: u32,
    created: String,
    modified: String,
    accessed: String,
    expires: String,
}

impl<'a> From<&'a Group> for GroupView<'a> {
    fn from(g: &'a Group) -> Self {
        let times = g.times();
        Self {
            id: g.id(),
            name: g.name(),
            level: g.level(),
            icon: g.icon(),
            created: times.created.to_string(),
            modified: times.modified.to_string(),
            accessed: times.accessed.to_string(),
            expires: times.expires.to_string(),
        }
    }
}

#[derive(Serialize)]
struct TreeView<'a> {
    #[serde(flatten)]
    group: GroupView<'a>,
    children: Vec<TreeView<'a>>,
}

impl<'a> From<&GroupNode<'a>> for TreeView<'a> {
    fn from(node: &GroupNode<'a>) -> Self {
        Self {
            group: GroupView::from(node.group),
            children: node.children.iter().map(TreeView::from).collect(),
        }
    }
}

#[derive(Serialize)]
struct EntryView<'a> {
    uuid: String,
    group_id: u32,
    title: &'a str,
    username: &'a str,
    url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<Cow<'a, str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<Cow<'a, str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    attachment: Option<&'a str>,
    created: String,
    modified: String,
    accessed: String,
    expires: String,
}

impl<'a> EntryView<'a> {
    fn new(e: &'a Entry, secrets: bool) -> Self {
        let times = e.times();
        Self {
            uuid: e.uuid().iter().map(|b| format!("{:02x}", b)).collect(),
            group_id: e.group_id(),
            title: e.title(),
            username: e.username(),
            url: e.url(),
            password: secrets.then(|| secret_text(e.password_bytes())),
            notes: secrets.then(|| secret_text(e.notes_bytes())),
            attachment: e.attachment().map(|a| a.description()),
            created: times.created.to_string(),
            modified: times.modified.to_string(),
            accessed: times.accessed.to_string(),
            expires: times.expires.to_string(),
        }
    }
}

/// Stored text as-is, or `hex:` followed by the raw bytes when it is not UTF-8.
fn secret_text(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => Cow::Owned(format!(
            "hex:{}",
            bytes.iter().map(|b| format!("{:02x}", b)).collect::<String>()
        )),
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env("KDB1_LOG").unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn resolve_storage(path: Option<PathBuf>) -> Result<Storage> {
    match path {
        Some(p) => Ok(Storage::new(p)),
        None => bail!("no database given; pass --file or set KDB1_PATH"),
    }
}

fn open(path: Option<PathBuf>) -> Result<Database> {
    let storage = resolve_storage(path)?;
    let data = storage.load()?;
    let password = auth::read_password()?;

    let db = kdb1::open_database(&data, password.as_bytes())?;
    drop(password);
    Ok(db)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_tree(node: &GroupNode<'_>, depth: usize) {
    println!("{:indent$}{} [{}]", "", node.group.name(), node.group.id(), indent = depth * 2);
    for child in &node.children {
        print_tree(child, depth + 1);
    }
}

fn print_entries(entries: &[&Entry], show_passwords: bool) {
    if entries.is_empty() {
        println!("No entries.");
        return;
    }

    let title_width = entries
        .iter()
        .map(|e| e.title().len())
        .chain(std::iter::once("Title".len()))
        .max()
        .unwrap_or_default();

    let user_width = entries
        .iter()
        .map(|e| e.username().len())
        .chain(std::iter::once("Username".len()))
        .max()
        .unwrap_or_default();

    if show_passwords {
        println!("{:<title_width$}  {:<user_width$}  Password", "Title", "Username");
        println!("{:-<title_width$}  {:-<user_width$}  --------", "", "");
        for e in entries {
            println!(
                "{:<title_width$}  {:<user_width$}  {}",
                e.title(),
                e.username(),
                secret_text(e.password_bytes())
            );
        }
    } else {
        println!("{:<title_width$}  {:<user_width$}  URL", "Title", "Username");
        println!("{:-<title_width$}  {:-<user_width$}  ---", "", "");
        for e in entries {
            println!("{:<title_width$}  {:<user_width$}  {}", e.title(), e.username(), e.url());
        }
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = Cli::parse();
    let db = open(args.file.clone())?;

    match args.command {
        Commands::Info => {
            let header = db.header();
            let info = InfoView {
                version: format!("{:#010x}", header.version()),
                flags: header.flags(),
                groups: db.groups().len(),
                entries: db.entries().count(),
                meta_entries: db.meta_entries().count(),
                declared_groups: header.group_count(),
                declared_entries: header.entry_count(),
                transform_rounds: header.transform().rounds(),
            };
            if args.json {
                print_json(&info)?;
            } else {
                println!("version:          {}", info.version);
                println!("groups:           {}", info.groups);
                println!("entries:          {}", info.entries);
                println!("meta entries:     {}", info.meta_entries);
                println!("transform rounds: {}", info.transform_rounds);
            }
        }
        Commands::Groups => {
            if args.json {
                let groups: Vec<_> = db.groups().iter().map(GroupView::from).collect();
                print_json(&groups)?;
            } else {
                for g in db.groups() {
                    println!("{:>6}  {:<3} {}", g.id(), g.level(), g.name());
                }
            }
        }
        Commands::Tree => {
            let tree = db.group_tree();
            if args.json {
                let view: Vec<_> = tree.iter().map(TreeView::from).collect();
                print_json(&view)?;
            } else {
                for node in &tree {
                    print_tree(node, 0);
                }
            }
        }
        Commands::Entries {
            group,
            show_passwords,
        } => {
            if let Some(id) = group {
                if db.group(id).is_none() {
                    bail!("no group with id {id}");
                }
            }
            let entries: Vec<&Entry> = match group {
                Some(id) => db.entries_for_group(id).collect(),
                None => db.entries().collect(),
            };
            if args.json {
                let view: Vec<_> = entries
                    .iter()
                    .map(|e| EntryView::new(e, show_passwords))
                    .collect();
                print_json(&view)?;
            } else {
                print_entries(&entries, show_passwords);
            }
        }
        Commands::Show { title, group } => {
            let matches: Vec<&Entry> = db
                .entries()
                .filter(|e| e.title() == title)
                .filter(|e| group.is_none_or(|id| e.group_id() == id))
                .collect();
            if matches.is_empty() {
                bail!("no entry titled '{title}'");
            }
            if args.json {
                let view: Vec<_> = matches.iter().map(|e| EntryView::new(e, true)).collect();
                print_json(&view)?;
            } else {
                for e in matches {
                    let group_name = db.group(e.group_id()).map_or("?", Group::name);
                    println!("Title:    {}", e.title());
                    println!("Group:    {group_name}");
                    println!("Username: {}", e.username());
                    println!("Password: {}", secret_text(e.password_bytes()));
                    println!("URL:      {}", e.url());
                    println!("Notes:    {}", secret_text(e.notes_bytes()));
                    if let Some(a) = e.attachment() {
                        println!("Attached: {} ({} bytes)", a.description(), a.data().len());
                    }
                    println!("Created:  {}", e.times().created);
                    println!("Modified: {}", e.times().modified);
                    println!("Expires:  {}", e.times().expires);
                    println!();
                }
            }
        }
    }

    Ok(())
}
