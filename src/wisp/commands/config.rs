use crate::commands::{CmdMessage, CmdResult};
use crate::config::WispConfig;
use crate::error::Result;
use std::path::Path;

#[derive(Debug, Clone)]
pub enum ConfigAction {
    ShowAll,
    ShowKey(String),
    Set(String, String),
}

/// Reads or writes the config file only; environment overrides are not persisted.
pub fn run(config_dir: &Path, action: ConfigAction) -> Result<CmdResult> {
    match action {
        ConfigAction::ShowAll => {
            let config = WispConfig::load(config_dir)?;
            Ok(CmdResult::default().with_config(config))
        }
        ConfigAction::ShowKey(key) => {
            let config = WispConfig::load(config_dir)?;
            let message = match config.get(&key) {
                Some(value) => CmdMessage::info(value),
                None => CmdMessage::error(format!("Unknown config key: {}", key)),
            };
            Ok(CmdResult::default().with_message(message))
        }
        ConfigAction::Set(key, value) => {
            let mut config = WispConfig::load(config_dir)?;
            if let Err(e) = config.set(&key, &value) {
                return Ok(CmdResult::default().with_message(CmdMessage::error(e.to_string())));
            }
            config.save(config_dir)?;
            let shown = config.get(&key).unwrap_or(value);
            Ok(CmdResult::default()
                .with_message(CmdMessage::success(format!("{} set to {}", key, shown)))
                .with_config(config))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MessageLevel;

    #[test]
    fn set_persists_and_show_key_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let set = ConfigAction::Set("timeout".into(), "10".into());
        let result = run(dir.path(), set).unwrap();
        assert_eq!(result.messages[0].content, "timeout set to 10");

        let result = run(dir.path(), ConfigAction::ShowKey("timeout".into())).unwrap();
        assert_eq!(result.messages[0].content, "10");
    }

    #[test]
    fn invalid_value_is_reported_and_not_saved() {
        let dir = tempfile::tempdir().unwrap();
        let set = ConfigAction::Set("default-filter".into(), "trending".into());
        let result = run(dir.path(), set).unwrap();
        assert_eq!(result.messages[0].level, MessageLevel::Error);
        assert!(!dir.path().join("config.json").exists());
    }

    #[test]
    fn unknown_key_is_an_error_message() {
        let dir = tempfile::tempdir().unwrap();
        let result = run(dir.path(), ConfigAction::ShowKey("color".into())).unwrap();
        assert!(result.has_errors());
    }

    #[test]
    fn show_all_returns_defaults_without_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = run(dir.path(), ConfigAction::ShowAll).unwrap();
        assert_eq!(result.config, Some(WispConfig::default()));
    }
}
