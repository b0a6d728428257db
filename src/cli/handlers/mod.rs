mod config;
pub use config::cmd_config;

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::{Local, Utc};

use crate::binder::Binder;
use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::kv_store::FileStore;
use crate::io::state::{self, UiState};
use crate::model::config::BinderConfig;
use crate::model::settings::{ExportFormat, TimestampFormat};
use crate::model::tag::{Tag, TagColor};
use crate::ops::{prompts, share};

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let json = cli.json;
    let store = cli.store.as_deref();

    match cli.command {
        // Commands that never touch the store
        Commands::Config(args) => cmd_config(args, store),
        Commands::Prompt(PromptArgs { id: None }) => cmd_prompt_list(json),
        Commands::Share(ShareCmd {
            action: ShareAction::Key,
        }) => {
            println!("{}", share::generate_share_key());
            Ok(())
        }
        Commands::Share(ShareCmd {
            action: ShareAction::Decrypt(args),
        }) => {
            println!("{}", share::open_share(&args.data, &args.key));
            Ok(())
        }

        cmd => {
            let mut session = Session::open(store)?;
            let result = match cmd {
                Commands::Show => cmd_show(&session, json),
                Commands::Write(args) => cmd_write(&mut session, args),
                Commands::Notes(args) => cmd_notes(&mut session, args),
                Commands::Mark(args) => cmd_mark(&mut session, args, json),
                Commands::Tags(TagsCmd { action }) => match action.unwrap_or(TagsAction::List) {
                    TagsAction::List => cmd_tags_list(&session, json),
                    TagsAction::New(args) => cmd_tags_new(&mut session, args, json),
                    TagsAction::Rm(args) => cmd_tags_rm(&mut session, args),
                    TagsAction::Show(args) => cmd_tags_show(&session, args, json),
                },
                Commands::Filter(args) => cmd_filter(&mut session, args, json),
                Commands::Stamp(args) => cmd_stamp(&mut session, args),
                Commands::Prompt(PromptArgs { id: Some(id) }) => cmd_prompt_use(&mut session, &id),
                Commands::Timestamp(args) => cmd_timestamp(&mut session, args),
                Commands::Export(args) => cmd_export(&session, args),
                Commands::Pin(args) => cmd_pin(&mut session, args),
                Commands::Lock => cmd_lock(&mut session),
                Commands::Unlock(args) => cmd_unlock(&mut session, args),
                Commands::Share(ShareCmd {
                    action: ShareAction::Encrypt(args),
                }) => cmd_share(&session, args),
                Commands::Stats => cmd_stats(&session, json),
                // handled above
                Commands::Config(_) | Commands::Share(_) | Commands::Prompt(_) => Ok(()),
            };
            // A failed command may still have a page edit pending
            session.binder.flush()?;
            result
        }
    }
}

// ---------------------------------------------------------------------------
// Session: one binder over the configured store, plus the view state file
// ---------------------------------------------------------------------------

struct Session {
    binder: Binder<FileStore>,
    config: BinderConfig,
    ui: UiState,
    state_file: PathBuf,
}

impl Session {
    fn open(store_override: Option<&str>) -> Result<Self, Box<dyn std::error::Error>> {
        let config_file = config_io::config_path();
        let (config, _) = config_io::read_config(&config_file)?;
        let store_path = config_io::resolve_store_path(&config, store_override, &config_file);
        log::debug!("using store {}", store_path.display());

        let store = FileStore::open(&store_path)?;
        let mut binder = Binder::open(store, Duration::from_millis(config.autosave.delay_ms));

        let state_file = state::state_path(&store_path);
        let ui = state::read_ui_state(&state_file).unwrap_or_default();
        binder.set_selection(ui.selected_tags.iter().cloned().collect());

        Ok(Session {
            binder,
            config,
            ui,
            state_file,
        })
    }

    /// Remember the current filter for the next invocation
    fn save_ui(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.ui.selected_tags = self.binder.selection().to_vec();
        state::write_ui_state(&self.state_file, &self.ui)?;
        Ok(())
    }

    /// Find a tag by id or name, or fail with a message naming it
    fn tag(&self, id_or_name: &str) -> Result<Tag, Box<dyn std::error::Error>> {
        self.binder
            .resolve_tag(id_or_name)?
            .cloned()
            .ok_or_else(|| format!("tag not found: {}", id_or_name).into())
    }
}

fn parse_color(color: Option<&str>) -> Result<Option<TagColor>, Box<dyn std::error::Error>> {
    match color {
        None => Ok(None),
        Some(s) => TagColor::parse_color(s)
            .map(Some)
            .ok_or_else(|| format!("unknown color: {} (try red, blue, green, ...)", s).into()),
    }
}

/// Parse a character range written `start..end`
fn parse_range(s: &str) -> Result<(usize, usize), String> {
    let (a, b) = s
        .split_once("..")
        .ok_or_else(|| format!("invalid range: {} (expected start..end)", s))?;
    let start = a
        .trim()
        .parse::<usize>()
        .map_err(|_| format!("invalid range start: {}", a))?;
    let end = b
        .trim()
        .parse::<usize>()
        .map_err(|_| format!("invalid range end: {}", b))?;
    if start >= end {
        return Err(format!("empty range: {}", s));
    }
    Ok((start, end))
}

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

fn cmd_show(session: &Session, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let content = session.binder.visible_document()?;
    let filtered = session.binder.selection().is_active();
    if json {
        let out = PageJson { content, filtered };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }
    if filtered {
        let names: Vec<String> = session
            .binder
            .selection()
            .iter()
            .filter_map(|id| session.binder.resolve_tag(id).ok().flatten())
            .map(|t| t.name.clone())
            .collect();
        eprintln!("(filtered by {}; read-only)", names.join(", "));
    }
    print!("{}", content);
    if !content.is_empty() && !content.ends_with('\n') {
        println!();
    }
    Ok(())
}

fn cmd_write(session: &mut Session, args: WriteArgs) -> Result<(), Box<dyn std::error::Error>> {
    let text = match (args.text, args.file) {
        (Some(text), _) => text,
        (None, Some(file)) => fs::read_to_string(&file)
            .map_err(|e| format!("could not read {}: {}", file, e))?,
        (None, None) => return Err("nothing to write: pass TEXT or --file".into()),
    };
    let now = Instant::now();
    if args.append {
        session.binder.append_document(&text, now)?;
    } else {
        session.binder.edit_document(&text, now)?;
    }
    session.binder.flush()?;
    Ok(())
}

fn cmd_notes(session: &mut Session, args: NotesArgs) -> Result<(), Box<dyn std::error::Error>> {
    match args.text {
        Some(text) => session.binder.set_quick_notes(&text)?,
        None => {
            let notes = session.binder.quick_notes()?;
            if !notes.is_empty() {
                println!("{}", notes);
            }
        }
    }
    Ok(())
}

fn cmd_stamp(session: &mut Session, args: StampArgs) -> Result<(), Box<dyn std::error::Error>> {
    let cursor = match args.at {
        Some(at) => at,
        None => session.binder.document()?.chars().count(),
    };
    let after = session
        .binder
        .insert_timestamp(cursor, &Local::now(), Instant::now())?;
    session.binder.flush()?;
    println!("{}", after);
    Ok(())
}

fn cmd_prompt_list(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        let out: Vec<ExerciseJson> = prompts::EXERCISES.iter().map(exercise_to_json).collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for exercise in prompts::EXERCISES {
            println!("{}", format_exercise_line(exercise));
        }
    }
    Ok(())
}

fn cmd_prompt_use(session: &mut Session, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let exercise = session.binder.use_exercise(id, Instant::now())?;
    session.binder.flush()?;
    println!("{}", exercise.prompt);
    Ok(())
}

fn cmd_stats(session: &Session, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let text = session.binder.text_stats()?;
    let tags = session.binder.tag_stats()?;
    if json {
        let out = StatsJson {
            text,
            tags: tag_stats_to_json(&tags),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }
    for line in format_text_stats(&text) {
        println!("{}", line);
    }
    println!();
    for line in format_tag_stats(&tags) {
        println!("{}", line);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tags and sections
// ---------------------------------------------------------------------------

fn cmd_mark(session: &mut Session, args: MarkArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let color = parse_color(args.color.as_deref())?;
    let now = Utc::now();
    let section = match (&args.text, &args.range) {
        (Some(text), _) => session.binder.tag_text(text, &args.tag, color, now)?,
        (None, Some(range)) => {
            let (start, end) = parse_range(range)?;
            session.binder.tag_selection(start, end, &args.tag, color, now)?
        }
        (None, None) => return Err("pass --text or --range".into()),
    };
    let Some(section) = section else {
        return Err("nothing tagged: the selection or tag name is blank".into());
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&section_to_json(&section))?);
    } else {
        let tag = session.tag(&section.tags[0])?;
        println!("tagged {} with {}", section.id, tag.name);
    }
    Ok(())
}

fn cmd_tags_list(session: &Session, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let tags = session.binder.tags()?;
    let stats = session.binder.tag_stats()?;
    if json {
        let out = TagListJson {
            tags: tags
                .iter()
                .map(|t| tag_to_json(t, session.binder.usage_count(&t.id)))
                .collect(),
            stats: tag_stats_to_json(&stats),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }
    if tags.is_empty() {
        println!("no tags yet (try `binder mark <tag> --text <words>`)");
        return Ok(());
    }
    for tag in tags {
        let marker = if session.binder.selection().contains(&tag.id) {
            "* "
        } else {
            "  "
        };
        println!(
            "{}{}",
            marker,
            format_tag_line(tag, session.binder.usage_count(&tag.id))
        );
    }
    println!();
    for line in format_tag_stats(&stats) {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_tags_new(session: &mut Session, args: TagNewArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let color = parse_color(args.color.as_deref())?;
    let tag = session
        .binder
        .create_tag(&args.name, color, Utc::now())?
        .ok_or("tag name cannot be empty")?;
    let usage = session.binder.usage_count(&tag.id);
    if json {
        println!("{}", serde_json::to_string_pretty(&tag_to_json(&tag, usage))?);
    } else {
        println!("{}", format_tag_line(&tag, usage));
    }
    Ok(())
}

fn cmd_tags_rm(session: &mut Session, args: TagRefArg) -> Result<(), Box<dyn std::error::Error>> {
    let tag = session.tag(&args.tag)?;
    let was_filtered = session.binder.selection().contains(&tag.id);
    let usage = session.binder.usage_count(&tag.id);
    session.binder.delete_tag(&tag.id)?;
    if was_filtered {
        session.save_ui()?;
    }
    println!("deleted {} (untagged {} section{})", tag.name, usage, if usage == 1 { "" } else { "s" });
    Ok(())
}

fn cmd_tags_show(session: &Session, args: TagRefArg, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let tag = session.tag(&args.tag)?;
    let sections = session.binder.sections_for_tag(&tag.id)?;
    if json {
        let out = TagDetailJson {
            tag: tag_to_json(&tag, sections.len()),
            sections: sections.iter().copied().map(section_to_json).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }
    println!("{}", format_tag_line(&tag, sections.len()));
    for section in sections {
        for line in format_section_lines(section) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_filter(session: &mut Session, args: FilterArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if args.clear {
        session.binder.clear_filter();
    } else {
        // Resolve everything first so a typo leaves the filter untouched
        let ids = args
            .tags
            .iter()
            .map(|t| session.tag(t).map(|tag| tag.id))
            .collect::<Result<Vec<_>, _>>()?;
        for id in ids {
            session.binder.toggle_filter(&id);
        }
    }
    session.save_ui()?;

    let selected: Vec<Tag> = session
        .binder
        .selection()
        .iter()
        .filter_map(|id| session.binder.resolve_tag(id).ok().flatten().cloned())
        .collect();
    if json {
        let out = FilterJson {
            selected: selected
                .iter()
                .map(|t| tag_to_json(t, session.binder.usage_count(&t.id)))
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if selected.is_empty() {
        println!("filter: off");
    } else {
        let names: Vec<&str> = selected.iter().map(|t| t.name.as_str()).collect();
        println!("filter: {}", names.join(", "));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Timestamps and export
// ---------------------------------------------------------------------------

fn cmd_timestamp(session: &mut Session, args: TimestampArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut settings = session.binder.timestamp_settings();
    let mut changed = false;
    if args.enable || args.disable {
        settings.enabled = args.enable;
        changed = true;
    }
    if let Some(format) = &args.format {
        settings.format = TimestampFormat::parse_format(format)
            .ok_or_else(|| format!("unknown timestamp format: {} (datetime, date or time)", format))?;
        changed = true;
    }
    if changed {
        session.binder.set_timestamp_settings(settings)?;
    }
    println!(
        "timestamps in exports: {}",
        if settings.enabled { "on" } else { "off" }
    );
    println!("format: {}", settings.format);
    Ok(())
}

fn cmd_export(session: &Session, args: ExportArgs) -> Result<(), Box<dyn std::error::Error>> {
    let format = ExportFormat::parse_format(&args.format)
        .ok_or_else(|| format!("unknown export format: {} (text, html, print or markdown)", args.format))?;
    let file = session
        .binder
        .export(format, args.filtered, &session.config.export.title, &Local::now())?;
    if args.stdout {
        print!("{}", file.body);
        return Ok(());
    }
    let path = args.output.unwrap_or(file.file_name);
    fs::write(&path, &file.body).map_err(|e| format!("could not write {}: {}", path, e))?;
    println!("{}", path);
    Ok(())
}

// ---------------------------------------------------------------------------
// Lock and share
// ---------------------------------------------------------------------------

fn cmd_pin(session: &mut Session, args: PinArgs) -> Result<(), Box<dyn std::error::Error>> {
    session.binder.set_pin(&args.pin)?;
    println!("PIN set");
    Ok(())
}

fn cmd_lock(session: &mut Session) -> Result<(), Box<dyn std::error::Error>> {
    session.binder.lock()?;
    println!("locked");
    Ok(())
}

fn cmd_unlock(session: &mut Session, args: PinArgs) -> Result<(), Box<dyn std::error::Error>> {
    session.binder.unlock(&args.pin)?;
    println!("unlocked");
    Ok(())
}

fn cmd_share(session: &Session, args: ShareEncryptArgs) -> Result<(), Box<dyn std::error::Error>> {
    let key = args.key.unwrap_or_else(share::generate_share_key);
    let data = session.binder.share(&key, Utc::now())?;
    println!("{}", data);
    eprintln!("key: {}", key);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::filter::Selection;

    #[test]
    fn parse_range_accepts_start_dot_dot_end() {
        assert_eq!(parse_range("10..24"), Ok((10, 24)));
        assert_eq!(parse_range(" 0 .. 3 "), Ok((0, 3)));
    }

    #[test]
    fn parse_range_rejects_bad_input() {
        assert!(parse_range("10").is_err());
        assert!(parse_range("a..3").is_err());
        assert!(parse_range("5..5").is_err());
        assert!(parse_range("7..2").is_err());
    }

    #[test]
    fn parse_color_names_and_hex() {
        assert_eq!(parse_color(Some("Blue")).unwrap(), Some(TagColor::Blue));
        assert_eq!(parse_color(Some("#ef4444")).unwrap(), Some(TagColor::Red));
        assert_eq!(parse_color(None).unwrap(), None);
        assert!(parse_color(Some("mauve")).is_err());
    }

    #[test]
    fn selection_from_state_file_ids() {
        let ui = UiState {
            selected_tags: vec!["a".into(), "b".into(), "a".into()],
        };
        let sel: Selection = ui.selected_tags.iter().cloned().collect();
        assert_eq!(sel.to_vec(), vec!["a".to_string(), "b".to_string()]);
    }
}
