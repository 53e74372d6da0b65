use std::{
    env, fs,
    io::{self, Cursor},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow, bail};
use crossterm::{terminal, tty::IsTty};
use serde_json::Value;
use tdoc::{markdown, parse};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use pure_entities::{
    BlockKey, Document, EditorState, EntityData, EntityHandle, EntityManager, Mutability,
    Selection, ansi,
    decorate::CompositeDecorator,
    entities::{COLOR, EntityDescriptor, LINK},
    import,
    theme::Theme,
};

const USAGE: &str = "Usage: pure-entities <file> [--select B:S[-E] | --select B:S-B2:E] \
[--type T] [--merge k=v]... [--set k=v]... [--remove] [--json] [--plain] [--width N]";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DocumentFormat {
    Json,
    Ftml,
    Markdown,
}

impl DocumentFormat {
    fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());
        match ext.as_deref() {
            Some("json") => DocumentFormat::Json,
            Some("md") | Some("markdown") | Some("mkd") | Some("mdown") | Some("mdtxt") => {
                DocumentFormat::Markdown
            }
            _ => DocumentFormat::Ftml,
        }
    }
}

/// Block index and character offset, as given on the command line.
type Position = (usize, usize);

#[derive(Debug, PartialEq)]
enum Mutation {
    Merge(EntityData),
    Set(EntityData),
    Remove,
}

#[derive(Debug)]
struct Options {
    path: PathBuf,
    select: Option<(Position, Position)>,
    entity_type: String,
    mutation: Option<Mutation>,
    json: bool,
    plain: bool,
    width: Option<usize>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
    run()
}

fn run() -> Result<()> {
    let Some(options) = parse_args(env::args().skip(1))? else {
        eprintln!("{USAGE}");
        return Ok(());
    };
    debug!(?options, "parsed arguments");

    let document = load_document(&options.path)?;
    let state = initial_state(document, options.select)?;
    let handle = EntityManager::new(descriptor_for(&options.entity_type)).resolve(&state);

    let summary = describe(&handle, &options.entity_type);
    if options.json {
        eprintln!("{summary}");
    } else {
        println!("{summary}");
    }

    let state = match options.mutation {
        Some(Mutation::Merge(data)) => handle.merge(Some(data)),
        Some(Mutation::Set(data)) => handle.set(Some(data)),
        Some(Mutation::Remove) => handle.remove(),
        None => state,
    };
    if let Some(change) = state.last_change() {
        info!(%change, entities = state.content().entity_count(), "applied mutation");
    }

    if options.json {
        println!("{}", state.content().to_json()?);
        return Ok(());
    }
    print_document(&state, options.plain, options.width)
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Option<Options>> {
    let mut path = None;
    let mut select = None;
    let mut entity_type = LINK.to_string();
    let mut merge = EntityData::new();
    let mut set = EntityData::new();
    let mut remove = false;
    let mut json = false;
    let mut plain = false;
    let mut width = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(None),
            "--select" => {
                let value = args.next().context("--select needs a value")?;
                select = Some(parse_selection(&value)?);
            }
            "--type" => entity_type = args.next().context("--type needs a value")?,
            "--merge" => {
                let (key, value) = parse_field(&args.next().context("--merge needs k=v")?)?;
                merge.insert(key, value);
            }
            "--set" => {
                let (key, value) = parse_field(&args.next().context("--set needs k=v")?)?;
                set.insert(key, value);
            }
            "--remove" => remove = true,
            "--json" => json = true,
            "--plain" => plain = true,
            "--width" => {
                let value = args.next().context("--width needs a value")?;
                width = Some(
                    value
                        .parse()
                        .with_context(|| format!("invalid width {value:?}"))?,
                );
            }
            other if other.starts_with("--") => bail!("unknown option {other}\n{USAGE}"),
            other => {
                if path.replace(PathBuf::from(other)).is_some() {
                    bail!("more than one input file\n{USAGE}");
                }
            }
        }
    }

    let Some(path) = path else {
        return Ok(None);
    };
    let mut mutations = Vec::new();
    if !merge.is_empty() {
        mutations.push(Mutation::Merge(merge));
    }
    if !set.is_empty() {
        mutations.push(Mutation::Set(set));
    }
    if remove {
        mutations.push(Mutation::Remove);
    }
    if mutations.len() > 1 {
        bail!("--merge, --set and --remove cannot be combined");
    }

    Ok(Some(Options {
        path,
        select,
        entity_type,
        mutation: mutations.pop(),
        json,
        plain,
        width,
    }))
}

/// `B:S`, `B:S-E` or `B:S-B2:E`.
fn parse_selection(value: &str) -> Result<(Position, Position)> {
    let (anchor, focus) = match value.split_once('-') {
        Some((anchor, focus)) => (anchor, Some(focus)),
        None => (value, None),
    };
    let anchor = parse_position(anchor)?;
    let focus = match focus {
        None => anchor,
        Some(focus) if focus.contains(':') => parse_position(focus)?,
        Some(offset) => (anchor.0, parse_number(offset)?),
    };
    Ok((anchor, focus))
}

fn parse_position(value: &str) -> Result<Position> {
    let (block, offset) = value
        .split_once(':')
        .with_context(|| format!("expected BLOCK:OFFSET, got {value:?}"))?;
    Ok((parse_number(block)?, parse_number(offset)?))
}

fn parse_number(value: &str) -> Result<usize> {
    value
        .trim()
        .parse()
        .with_context(|| format!("invalid number {value:?}"))
}

/// `key=value`; the value is read as JSON when it parses, as a string
/// otherwise.
fn parse_field(value: &str) -> Result<(String, Value)> {
    let (key, raw) = value
        .split_once('=')
        .with_context(|| format!("expected key=value, got {value:?}"))?;
    let parsed = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), parsed))
}

fn load_document(path: &Path) -> Result<Document> {
    let format = DocumentFormat::from_path(path);
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let document = match format {
        DocumentFormat::Json => Document::from_json(&content)
            .with_context(|| format!("failed to load {}", path.display()))?,
        DocumentFormat::Ftml => {
            let parsed = parse(Cursor::new(content))
                .map_err(|err| anyhow!("failed to parse {}: {err}", path.display()))?;
            import::import_document(&parsed)
        }
        DocumentFormat::Markdown => {
            let parsed = markdown::parse(Cursor::new(content))
                .map_err(|err| anyhow!("failed to parse {}: {err}", path.display()))?;
            import::import_document(&parsed)
        }
    };
    debug!(
        ?format,
        blocks = document.block_count(),
        entities = document.entity_count(),
        "loaded document"
    );
    Ok(document)
}

fn initial_state(document: Document, select: Option<(Position, Position)>) -> Result<EditorState> {
    let Some((anchor, focus)) = select else {
        return Ok(EditorState::from_document(document));
    };
    let anchor = (block_key(&document, anchor.0)?, anchor.1);
    let focus = (block_key(&document, focus.0)?, focus.1);
    let selection: Selection = document.select(anchor, focus);
    document
        .validate_selection(&selection)
        .context("invalid selection")?;
    Ok(EditorState::new(document, selection))
}

fn block_key(document: &Document, index: usize) -> Result<BlockKey> {
    document
        .block_at(index)
        .map(|block| block.key().clone())
        .with_context(|| {
            format!(
                "block {index} out of range (document has {} blocks)",
                document.block_count()
            )
        })
}

fn descriptor_for(entity_type: &str) -> EntityDescriptor {
    match entity_type {
        LINK => EntityDescriptor::link(),
        COLOR => EntityDescriptor::color(),
        other => EntityDescriptor::new(other, Mutability::Mutable),
    }
}

fn describe(handle: &EntityHandle, entity_type: &str) -> String {
    match handle.location() {
        Some(location) => format!(
            "{entity_type} entity {} at {}:{} {}",
            location.entity_key,
            location.block_key,
            location.char_offset,
            Value::Object(location.data.clone())
        ),
        None => format!("no {entity_type} entity in selection"),
    }
}

fn print_document(state: &EditorState, plain: bool, width: Option<usize>) -> Result<()> {
    let stdout = io::stdout();
    let styled = !plain && stdout.is_tty();
    let width = width.or_else(|| {
        styled
            .then(terminal::size)
            .and_then(|size| size.ok())
            .map(|(columns, _)| usize::from(columns))
    });
    let theme = if styled { Theme::new() } else { Theme::plain() };
    let lines = CompositeDecorator::entities().render_document(
        state.content(),
        &theme,
        styled.then(|| state.selection()),
    );

    let mut out = stdout.lock();
    let written = if styled {
        ansi::write_lines(&mut out, &lines, width)
    } else {
        ansi::write_plain(&mut out, &lines, width)
    };
    written.context("failed to write output")
}
