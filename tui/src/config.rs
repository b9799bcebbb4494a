use anyhow::{anyhow, bail, Context, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Keymap {
    pub quit: String,
    pub help: String,
    pub search: String,
    pub new_root: String,
    pub new_child: String,
    pub edit_title: String,
    pub edit_content: String,
    pub save_edit: String,
    pub toggle_collapse: String,
    pub open_selected: String,
    pub close_tab: String,
    pub next_tab: String,
    pub prev_tab: String,
    pub cursor_up: String,
    pub cursor_down: String,
}

impl Default for Keymap {
    fn default() -> Self {
        Self {
            quit: "q".to_string(),
            help: "?".to_string(),
            search: "/".to_string(),
            new_root: "ctrl-n".to_string(),
            new_child: "n".to_string(),
            edit_title: "t".to_string(),
            edit_content: "e".to_string(),
            save_edit: "ctrl-s".to_string(),
            toggle_collapse: "space".to_string(),
            open_selected: "enter".to_string(),
            close_tab: "ctrl-w".to_string(),
            next_tab: "tab".to_string(),
            prev_tab: "backtab".to_string(),
            cursor_up: "up".to_string(),
            cursor_down: "down".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Config {
    pub log_level: String,
    pub keymap: Keymap,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: grove_core::default_log_level().to_string(),
            keymap: Keymap::default(),
        }
    }
}

/// Read `config.toml`, writing the defaults first if it does not exist yet
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        let config = Config::default();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {}", parent.display()))?;
        }
        let toml = toml::to_string(&config).context("Failed to serialize default config")?;
        fs::write(path, toml)
            .with_context(|| format!("Failed to write default config to {}", path.display()))?;
        return Ok(config);
    }
    read_config(path)
}

/// Read `config.toml` if present, defaults otherwise. Never writes.
pub fn read_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse config file {}", path.display()))
}

/// A parsed key such as `ctrl-w` or `shift-tab`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub fn parse(spec: &str) -> Result<Self> {
        let spec = spec.trim();
        if spec.is_empty() {
            bail!("empty key binding");
        }

        // A lone "-" is the minus key, not a separator.
        let (mods, key) = match spec.rfind('-') {
            Some(pos) if pos + 1 < spec.len() => (&spec[..pos], &spec[pos + 1..]),
            _ => ("", spec),
        };

        let mut modifiers = KeyModifiers::NONE;
        for part in mods.split('-').filter(|p| !p.is_empty()) {
            modifiers |= match part.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => KeyModifiers::CONTROL,
                "alt" => KeyModifiers::ALT,
                "shift" => KeyModifiers::SHIFT,
                other => bail!("unknown modifier `{}` in `{}`", other, spec),
            };
        }

        let code = match key.to_ascii_lowercase().as_str() {
            "enter" | "return" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Esc,
            "tab" if modifiers.contains(KeyModifiers::SHIFT) => KeyCode::BackTab,
            "tab" => KeyCode::Tab,
            "backtab" => KeyCode::BackTab,
            "space" => KeyCode::Char(' '),
            "backspace" => KeyCode::Backspace,
            "delete" | "del" => KeyCode::Delete,
            "insert" | "ins" => KeyCode::Insert,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" => KeyCode::PageUp,
            "pagedown" => KeyCode::PageDown,
            lower => {
                let mut chars = key.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => KeyCode::Char(c),
                    _ => match lower.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
                        Some(n) if (1..=12).contains(&n) => KeyCode::F(n),
                        _ => return Err(anyhow!("unknown key `{}` in `{}`", key, spec)),
                    },
                }
            }
        };

        Ok(Self { code, modifiers })
    }

    /// Whether a terminal key event triggers this binding.
    ///
    /// Shift is ignored for characters and back-tab because terminals report it
    /// inconsistently for those.
    pub fn matches(&self, key: &KeyEvent) -> bool {
        if key.code != self.code {
            return false;
        }
        match self.code {
            KeyCode::Char(_) | KeyCode::BackTab => {
                key.modifiers.difference(KeyModifiers::SHIFT)
                    == self.modifiers.difference(KeyModifiers::SHIFT)
            }
            _ => key.modifiers == self.modifiers,
        }
    }
}

/// Keymap with every entry parsed
#[derive(Debug, Clone)]
pub struct Bindings {
    pub quit: KeyBinding,
    pub help: KeyBinding,
    pub search: KeyBinding,
    pub new_root: KeyBinding,
    pub new_child: KeyBinding,
    pub edit_title: KeyBinding,
    pub edit_content: KeyBinding,
    pub save_edit: KeyBinding,
    pub toggle_collapse: KeyBinding,
    pub open_selected: KeyBinding,
    pub close_tab: KeyBinding,
    pub next_tab: KeyBinding,
    pub prev_tab: KeyBinding,
    pub cursor_up: KeyBinding,
    pub cursor_down: KeyBinding,
}

impl Keymap {
    pub fn compile(&self) -> Result<Bindings> {
        let parse = |name: &str, spec: &str| {
            KeyBinding::parse(spec).with_context(|| format!("invalid binding for `{}`", name))
        };
        Ok(Bindings {
            quit: parse("quit", &self.quit)?,
            help: parse("help", &self.help)?,
            search: parse("search", &self.search)?,
            new_root: parse("new_root", &self.new_root)?,
            new_child: parse("new_child", &self.new_child)?,
            edit_title: parse("edit_title", &self.edit_title)?,
            edit_content: parse("edit_content", &self.edit_content)?,
            save_edit: parse("save_edit", &self.save_edit)?,
            toggle_collapse: parse("toggle_collapse", &self.toggle_collapse)?,
            open_selected: parse("open_selected", &self.open_selected)?,
            close_tab: parse("close_tab", &self.close_tab)?,
            next_tab: parse("next_tab", &self.next_tab)?,
            prev_tab: parse("prev_tab", &self.prev_tab)?,
            cursor_up: parse("cursor_up", &self.cursor_up)?,
            cursor_down: parse("cursor_down", &self.cursor_down)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_parse_bindings() {
        let b = KeyBinding::parse("ctrl-w").unwrap();
        assert_eq!(b.code, KeyCode::Char('w'));
        assert_eq!(b.modifiers, KeyModifiers::CONTROL);

        assert_eq!(KeyBinding::parse("shift-tab").unwrap().code, KeyCode::BackTab);
        assert_eq!(KeyBinding::parse("space").unwrap().code, KeyCode::Char(' '));
        assert_eq!(KeyBinding::parse("-").unwrap().code, KeyCode::Char('-'));
        assert_eq!(KeyBinding::parse("F5").unwrap().code, KeyCode::F(5));
        assert_eq!(
            KeyBinding::parse("ctrl-alt-x").unwrap().modifiers,
            KeyModifiers::CONTROL | KeyModifiers::ALT
        );
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!(KeyBinding::parse("").is_err());
        assert!(KeyBinding::parse("hyper-x").is_err());
        assert!(KeyBinding::parse("ctrl-banana").is_err());
    }

    #[test]
    fn test_matches_ignores_shift_on_chars() {
        let help = KeyBinding::parse("?").unwrap();
        assert!(help.matches(&key(KeyCode::Char('?'), KeyModifiers::SHIFT)));
        assert!(help.matches(&key(KeyCode::Char('?'), KeyModifiers::NONE)));

        let close = KeyBinding::parse("ctrl-w").unwrap();
        assert!(close.matches(&key(KeyCode::Char('w'), KeyModifiers::CONTROL)));
        assert!(!close.matches(&key(KeyCode::Char('w'), KeyModifiers::NONE)));

        let prev = KeyBinding::parse("backtab").unwrap();
        assert!(prev.matches(&key(KeyCode::BackTab, KeyModifiers::SHIFT)));
    }

    #[test]
    fn test_matches_exact_modifiers_for_named_keys() {
        let enter = KeyBinding::parse("enter").unwrap();
        assert!(enter.matches(&key(KeyCode::Enter, KeyModifiers::NONE)));
        assert!(!enter.matches(&key(KeyCode::Enter, KeyModifiers::ALT)));
    }

    #[test]
    fn test_default_keymap_compiles() {
        let bindings = Keymap::default().compile().unwrap();
        assert_eq!(bindings.close_tab.code, KeyCode::Char('w'));
    }

    #[test]
    fn test_load_config_writes_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = load_config(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.keymap.quit, "q");

        let reloaded = load_config(&path).unwrap();
        assert_eq!(reloaded.keymap.search, "/");
    }

    #[test]
    fn test_load_config_creates_parent_dir() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("new").join("dir").join("config.toml");
        load_config(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_read_config_does_not_write() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let config = read_config(&path).unwrap();
        assert_eq!(config.keymap.quit, "q");
        assert!(!path.exists());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "log_level = \"warn\"\n[keymap]\nquit = \"ctrl-q\"\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.keymap.quit, "ctrl-q");
        assert_eq!(config.keymap.help, "?");
    }
}
