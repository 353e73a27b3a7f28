//! Headless contact list driven from stdin.
//!
//! Each applied pass prints its edit script and the restored selection.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use clap::Parser;
use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::runtime::Handle;

use listsync::config::Config;
use listsync::logging::init_tracing;
use listsync::{
    change_channel, EditScript, ItemChange, ListHost, ListSurface, MirrorSurface, QueryDebouncer,
    SectionChange, SelectionSource, SelectionState, Store, StoreOptions,
};

#[derive(Parser, Debug)]
#[command(name = "listsync")]
#[command(about = "Interactive demo of a reconciled, sectioned contact list")]
struct Args {
    /// Config file (TOML). Missing file means defaults.
    #[arg(short, long, value_name = "PATH", default_value = "listsync.toml")]
    config: PathBuf,

    /// Override the query debounce delay
    #[arg(long, value_name = "MS")]
    debounce_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
struct Contact {
    name: String,
    online: bool,
}

type Section = &'static str;
type Mirror = MirrorSurface<Section, u32, Contact>;

fn status_section(contact: &Contact) -> Section {
    if contact.online {
        "online"
    } else {
        "offline"
    }
}

/// Prints every script, then keeps the shared mirror in step.
struct PrintingSurface {
    mirror: Arc<Mutex<Mirror>>,
}

impl SelectionSource<u32> for PrintingSurface {
    fn selected(&self) -> SelectionState<u32> {
        self.mirror.lock().selected()
    }
}

impl ListSurface<Section, u32, Contact> for PrintingSurface {
    fn apply(&mut self, script: &EditScript<Section, u32, Contact>) {
        for change in &script.sections {
            match change {
                SectionChange::Remove { id, from } => println!("- section {} (was #{})", id, from),
                SectionChange::Insert { id, to } => println!("+ section {} at #{}", id, to),
                SectionChange::Move { id, from, to } => println!("~ section {} #{} -> #{}", id, from, to),
            }
        }
        for change in &script.items {
            match change {
                ItemChange::Remove { id, from } => println!("- {} from {}[{}]", id, from.section, from.index),
                ItemChange::Insert { id, to, payload } => {
                    println!("+ {} {:?} at {}[{}]", id, payload.name, to.section, to.index)
                }
                ItemChange::Move { id, from, to } => println!(
                    "~ {} {}[{}] -> {}[{}]",
                    id, from.section, from.index, to.section, to.index
                ),
                ItemChange::Update { id, at, payload } => {
                    println!("* {} now {:?} at {}[{}]", id, payload.name, at.section, at.index)
                }
            }
        }
        self.mirror.lock().apply(script);
    }

    fn select(&mut self, selection: &SelectionState<u32>) {
        let mut ids: Vec<u32> = selection.iter().copied().collect();
        ids.sort_unstable();
        println!("selection: {:?}", ids);
        self.mirror.lock().select(selection);
    }
}

#[derive(Debug, PartialEq)]
enum Command {
    Add { id: u32, name: String },
    Rename { id: u32, name: String },
    Status { id: u32, online: bool },
    Remove { id: u32 },
    Select(Vec<u32>),
    Query(String),
    Quit,
}

impl Command {
    fn parse(line: &str) -> anyhow::Result<Option<Self>> {
        let line = line.trim();
        let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();
        let command = match word {
            "" => return Ok(None),
            "add" => {
                let (id, name) = id_and_text(rest)?;
                Self::Add { id, name }
            }
            "rename" => {
                let (id, name) = id_and_text(rest)?;
                Self::Rename { id, name }
            }
            "status" => {
                let (id, state) = id_and_text(rest)?;
                let online = match state.as_str() {
                    "online" => true,
                    "offline" => false,
                    other => bail!("status must be online or offline, got {:?}", other),
                };
                Self::Status { id, online }
            }
            "remove" => Self::Remove { id: parse_id(rest)? },
            "select" => Self::Select(
                rest.split_whitespace()
                    .map(parse_id)
                    .collect::<anyhow::Result<_>>()?,
            ),
            "query" => Self::Query(rest.to_string()),
            "quit" | "exit" => Self::Quit,
            other => bail!("unknown command {:?}", other),
        };
        Ok(Some(command))
    }
}

fn parse_id(text: &str) -> anyhow::Result<u32> {
    text.parse()
        .with_context(|| format!("expected a numeric id, got {:?}", text))
}

fn id_and_text(rest: &str) -> anyhow::Result<(u32, String)> {
    let (id, text) = rest
        .split_once(' ')
        .ok_or_else(|| anyhow!("expected <id> <text>"))?;
    let text = text.trim();
    if text.is_empty() {
        bail!("expected <id> <text>");
    }
    Ok((parse_id(id)?, text.to_string()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing();

    let mut config = Config::load_from(&args.config)?;
    if let Some(delay_ms) = args.debounce_ms {
        config.debounce.delay_ms = delay_ms;
        config.validate()?;
    }
    tracing::info!(
        config = %args.config.display(),
        delay_ms = config.debounce.delay_ms,
        sectioning = ?config.source.sectioning,
        "Starting listsync demo"
    );

    let (sender, receiver) = change_channel();
    let options = StoreOptions::new(status_section)
        .with_filter(|contact: &Contact, text: &str| {
            contact.name.to_lowercase().contains(&text.to_lowercase())
        })
        .with_order(|a: &Contact, b: &Contact| a.name.cmp(&b.name))
        .with_sectioning(config.source.sectioning.sectioning());
    let store: Arc<Store<Section, u32, Contact>> = Arc::new(Store::new(Arc::new(sender), options));

    let mirror = Arc::new(Mutex::new(Mirror::new()));
    let mut surface = PrintingSurface {
        mirror: Arc::clone(&mirror),
    };
    let host: ListHost<Section, u32, Contact> = ListHost::new(receiver, store.clone());
    let mut host_task = tokio::spawn(async move { host.run(&mut surface).await });

    let debouncer = QueryDebouncer::from_config(store.clone(), &config.debounce, Handle::current());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            finished = &mut host_task => {
                finished??;
                return Ok(());
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let command = match Command::parse(&line) {
                    Ok(Some(command)) => command,
                    Ok(None) => continue,
                    Err(error) => {
                        eprintln!("{:#}", error);
                        continue;
                    }
                };
                match command {
                    Command::Add { id, name } => store.upsert(id, Contact { name, online: true }),
                    Command::Rename { id, name } => {
                        if !store.update(&id, |contact| contact.name = name) {
                            eprintln!("no contact {}", id);
                        }
                    }
                    Command::Status { id, online } => {
                        if !store.update(&id, |contact| contact.online = online) {
                            eprintln!("no contact {}", id);
                        }
                    }
                    Command::Remove { id } => {
                        if store.remove(&id).is_none() {
                            eprintln!("no contact {}", id);
                        }
                    }
                    Command::Select(ids) => mirror.lock().set_selection(ids),
                    Command::Query(text) => debouncer.set_query(&text),
                    Command::Quit => break,
                }
            }
        }
    }

    debouncer.cancel();
    host_task.abort();
    Ok(())
}
