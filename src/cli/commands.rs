use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "binder", about = concat!("binder v", env!("CARGO_PKG_VERSION"), " - one quiet page, kept on your machine"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use this store file instead of the configured one
    #[arg(long, global = true)]
    pub store: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the page (the filtered view while a tag filter is active)
    Show,
    /// Replace or extend the page
    Write(WriteArgs),
    /// Print or replace the quick notes
    Notes(NotesArgs),
    /// Tag a span of the page
    Mark(MarkArgs),
    /// List and manage tags
    Tags(TagsCmd),
    /// Set, toggle or clear the tag filter
    Filter(FilterArgs),
    /// Insert a timestamp into the page
    Stamp(StampArgs),
    /// List focus exercises, or append one's prompt to the page
    Prompt(PromptArgs),
    /// Show or change timestamp settings
    Timestamp(TimestampArgs),
    /// Export the page or the filtered view
    Export(ExportArgs),
    /// Set the 4-character PIN
    Pin(PinArgs),
    /// Lock the binder
    Lock,
    /// Unlock the binder
    Unlock(PinArgs),
    /// Encrypt or open a private share
    Share(ShareCmd),
    /// Word, sentence and reading-time counts for the page
    Stats,
    /// Show or change configuration
    Config(ConfigArgs),
}

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct WriteArgs {
    /// New text (use --file to read it from a file instead)
    pub text: Option<String>,
    /// Read the text from this file
    #[arg(long, conflicts_with = "text")]
    pub file: Option<String>,
    /// Append instead of replacing
    #[arg(long)]
    pub append: bool,
}

#[derive(Args)]
pub struct NotesArgs {
    /// New quick notes (if omitted, prints them)
    pub text: Option<String>,
}

#[derive(Args)]
pub struct MarkArgs {
    /// Tag name (created if it doesn't exist)
    pub tag: String,
    /// Text to tag (first occurrence in the page)
    #[arg(long, conflicts_with = "range", required_unless_present = "range")]
    pub text: Option<String>,
    /// Character range to tag, e.g. 10..24
    #[arg(long)]
    pub range: Option<String>,
    /// Color for a new tag (red, orange, yellow, green, cyan, blue, violet, pink, gray)
    #[arg(long)]
    pub color: Option<String>,
}

#[derive(Args)]
pub struct PromptArgs {
    /// Exercise id (omit to list them)
    pub id: Option<String>,
}

#[derive(Args)]
pub struct StampArgs {
    /// Character offset to insert at (default: end of page)
    #[arg(long)]
    pub at: Option<usize>,
}

#[derive(Args)]
pub struct TimestampArgs {
    /// Include a timestamp line in exports
    #[arg(long, conflicts_with = "disable")]
    pub enable: bool,
    /// Leave timestamps out of exports
    #[arg(long)]
    pub disable: bool,
    /// Format: datetime, date or time
    #[arg(long)]
    pub format: Option<String>,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Format: text, html, print or markdown
    pub format: String,
    /// Export the filtered view instead of the whole page
    #[arg(long)]
    pub filtered: bool,
    /// Write to this file (default: generated name in the current directory)
    #[arg(short, long)]
    pub output: Option<String>,
    /// Print to stdout instead of writing a file
    #[arg(long, conflicts_with = "output")]
    pub stdout: bool,
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct TagsCmd {
    #[command(subcommand)]
    pub action: Option<TagsAction>,
}

#[derive(Subcommand)]
pub enum TagsAction {
    /// List tags with usage counts (default)
    List,
    /// Create a tag (or report the existing one with that name)
    New(TagNewArgs),
    /// Delete a tag and untag its sections
    Rm(TagRefArg),
    /// Show the sections carrying a tag
    Show(TagRefArg),
}

#[derive(Args)]
pub struct TagNewArgs {
    /// Tag name
    pub name: String,
    /// Palette color
    #[arg(long)]
    pub color: Option<String>,
}

#[derive(Args)]
pub struct TagRefArg {
    /// Tag id or name
    pub tag: String,
}

#[derive(Args)]
pub struct FilterArgs {
    /// Tags (id or name) to toggle in the filter
    pub tags: Vec<String>,
    /// Clear the filter
    #[arg(long, conflicts_with = "tags")]
    pub clear: bool,
}

// ---------------------------------------------------------------------------
// Lock and share
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct PinArgs {
    /// 4-character PIN
    pub pin: String,
}

#[derive(Args)]
pub struct ShareCmd {
    #[command(subcommand)]
    pub action: ShareAction,
}

#[derive(Subcommand)]
pub enum ShareAction {
    /// Encrypt the page and quick notes
    Encrypt(ShareEncryptArgs),
    /// Open encrypted data received from someone
    Decrypt(ShareDecryptArgs),
    /// Print a fresh random key
    Key,
}

#[derive(Args)]
pub struct ShareEncryptArgs {
    /// Key to encrypt with (default: a generated one, printed alongside)
    #[arg(long)]
    pub key: Option<String>,
}

#[derive(Args)]
pub struct ShareDecryptArgs {
    /// The encrypted data
    pub data: String,
    /// The key shared with it
    #[arg(long)]
    pub key: String,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ConfigArgs {
    /// Set the store file
    #[arg(long, value_name = "PATH")]
    pub set_store: Option<String>,
    /// Set the autosave delay in milliseconds
    #[arg(long, value_name = "MS", value_parser = clap::value_parser!(u64).range(..=i64::MAX as u64))]
    pub set_delay: Option<u64>,
    /// Set the export title
    #[arg(long, value_name = "TITLE")]
    pub set_title: Option<String>,
}
