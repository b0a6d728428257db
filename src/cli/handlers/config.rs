use crate::cli::commands::ConfigArgs;
use crate::io::config_io;

const CONFIG_TOML_TEMPLATE: &str = r##"# binder configuration

[store]
# Where the page, notes and tags are kept.
# Defaults to store.json next to this file.
# path = "/home/me/notes/binder.json"

[autosave]
# Quiet time after the last edit before the page is written
delay_ms = 1000

[export]
title = "One Page Binder Document"
"##;

pub fn cmd_config(args: ConfigArgs, store_override: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let path = config_io::config_path();
    let (_, mut doc) = config_io::read_config(&path)?;

    let editing = args.set_store.is_some() || args.set_delay.is_some() || args.set_title.is_some();
    if editing {
        if !path.exists() {
            doc = CONFIG_TOML_TEMPLATE.parse()?;
        }
        if let Some(store) = &args.set_store {
            config_io::set_store_path(&mut doc, store);
        }
        if let Some(delay) = args.set_delay {
            config_io::set_autosave_delay(&mut doc, delay)?;
        }
        if let Some(title) = &args.set_title {
            if title.trim().is_empty() {
                return Err("export title cannot be empty".into());
            }
            config_io::set_export_title(&mut doc, title);
        }
        config_io::write_config(&path, &doc)?;
        log::info!("updated {}", path.display());
    }

    let (config, _) = config_io::read_config(&path)?;
    let store = config_io::resolve_store_path(&config, store_override, &path);
    println!("config: {}", path.display());
    println!("store: {}", store.display());
    println!("autosave delay: {} ms", config.autosave.delay_ms);
    println!("export title: {}", config.export.title);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::config::BinderConfig;

    #[test]
    fn template_parses_to_defaults() {
        let config: BinderConfig = toml::from_str(CONFIG_TOML_TEMPLATE).unwrap();
        let defaults = BinderConfig::default();
        assert_eq!(config.store.path, None);
        assert_eq!(config.autosave.delay_ms, defaults.autosave.delay_ms);
        assert_eq!(config.export.title, defaults.export.title);
    }

    #[test]
    fn template_edits_keep_comments() {
        let mut doc: toml_edit::DocumentMut = CONFIG_TOML_TEMPLATE.parse().unwrap();
        config_io::set_autosave_delay(&mut doc, 250).unwrap();
        let text = doc.to_string();
        assert!(text.contains("delay_ms = 250"));
        assert!(text.contains("# Quiet time after the last edit"));
    }
}
