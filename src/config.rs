use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use directories::BaseDirs;
use serde::de::Deserializer;
use serde::Deserialize;
use tracing::warn;

use crate::entry::FieldNames;
use crate::loader::Source;

const CONFIG_FILE_NAME: &str = "config.toml";
const APP_NAME: &str = "kotoba";
const DEFAULT_SOURCE: &str = "output.json";
const DEFAULT_DETAILS_URL: &str = "details.html";
const DEFAULT_SAMPLE_SIZE: usize = 15;

#[derive(Debug, Clone)]
pub struct Config {
    /// File the configuration was read from, if any.
    pub config_path: Option<PathBuf>,
    pub source: Source,
    pub details_url: String,
    pub sample_size: usize,
    pub fields: FieldNames,
    pub keys: Keys,
    pub ui: UiConfig,
    pub commands: Commands,
    pub top_bar: TopBarConfig,
}

impl Default for Config {
    fn default() -> Self {
        ConfigFile::default().into_config(None)
    }
}

/// Expand ~ to home directory in paths
fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = home::home_dir() {
            return home.join(stripped);
        }
    }
    path.to_path_buf()
}

/// Parse a source string, expanding `~` for local paths.
pub fn parse_source(raw: &str) -> Source {
    match raw.parse::<Source>() {
        Ok(Source::File(path)) => Source::File(expand_tilde(&path)),
        Ok(other) => other,
        Err(never) => match never {},
    }
}

// =============================================================================
// Top Bar Configuration
// =============================================================================

/// Actions available for top bar buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopBarAction {
    Help,
    Search,
    Open,
    Clear,
}

impl TopBarAction {
    /// Display title for the button
    pub fn title(&self) -> &'static str {
        match self {
            TopBarAction::Help => "HELP",
            TopBarAction::Search => "SEARCH",
            TopBarAction::Open => "OPEN",
            TopBarAction::Clear => "CLEAR",
        }
    }

    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "help" => Some(TopBarAction::Help),
            "search" => Some(TopBarAction::Search),
            "open" | "details" => Some(TopBarAction::Open),
            "clear" => Some(TopBarAction::Clear),
            _ => None,
        }
    }
}

/// A single top bar button
#[derive(Debug, Clone)]
pub struct TopBarButton {
    pub key: String,
    pub action: TopBarAction,
}

impl TopBarButton {
    /// Get the function key number (1-12) or None if invalid
    pub fn function_key_number(&self) -> Option<u8> {
        parse_function_key(&self.key)
    }
}

fn parse_function_key(key: &str) -> Option<u8> {
    let upper = key.trim().to_ascii_uppercase();
    upper
        .strip_prefix('F')
        .and_then(|digits| digits.parse::<u8>().ok())
        .filter(|n| (1..=12).contains(n))
}

#[derive(Debug, Clone)]
pub struct TopBarConfig {
    pub buttons: Vec<TopBarButton>,
}

impl Default for TopBarConfig {
    fn default() -> Self {
        Self {
            buttons: vec![
                TopBarButton { key: "F1".into(), action: TopBarAction::Help },
                TopBarButton { key: "F2".into(), action: TopBarAction::Search },
                TopBarButton { key: "F3".into(), action: TopBarAction::Open },
                TopBarButton { key: "F4".into(), action: TopBarAction::Clear },
            ],
        }
    }
}

// =============================================================================
// UI and commands
// =============================================================================

#[derive(Debug, Clone)]
pub struct UiConfig {
    pub colors: UiColors,
}

#[derive(Debug, Clone)]
pub struct UiColors {
    pub border: RgbColor,
    pub selection_bg: RgbColor,
    pub selection_fg: RgbColor,
    pub separator: RgbColor,
    pub status_fg: RgbColor,
    pub status_bg: RgbColor,
    pub highlight_fg: RgbColor,
    pub highlight_bg: RgbColor,
    pub chip: RgbColor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Debug, Clone, Default)]
pub struct Commands {
    pub copy: Option<CommandExec>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandExec {
    pub program: String,
    pub args: Vec<String>,
}

// =============================================================================
// Key Bindings - Context-aware with multiple bindings per action
// =============================================================================

/// All key bindings organized by context
#[derive(Debug, Clone, Default)]
pub struct Keys {
    /// Keys active everywhere except while typing a query
    pub global: GlobalKeys,
    /// Keys for the search box
    pub search_input: SearchInputKeys,
    /// Keys for the letter bar
    pub alphabet: AlphabetKeys,
    /// Keys for the card list
    pub results: ResultsKeys,
    /// Keys for the details popup
    pub details: DetailsKeys,
}

#[derive(Debug, Clone)]
pub struct GlobalKeys {
    pub quit: Vec<String>,
    pub search: Vec<String>,
    pub help: Vec<String>,
    pub clear: Vec<String>,
    pub focus_next: Vec<String>,
    pub focus_prev: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SearchInputKeys {
    pub cancel: Vec<String>,
    pub confirm: Vec<String>,
    pub next: Vec<String>,
    pub prev: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct AlphabetKeys {
    pub next: Vec<String>,
    pub prev: Vec<String>,
    pub toggle: Vec<String>,
    pub cancel: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ResultsKeys {
    pub next: Vec<String>,
    pub prev: Vec<String>,
    pub page_down: Vec<String>,
    pub page_up: Vec<String>,
    pub first: Vec<String>,
    pub last: Vec<String>,
    pub open: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DetailsKeys {
    pub close: Vec<String>,
    pub copy: Vec<String>,
    pub next: Vec<String>,
    pub prev: Vec<String>,
}

impl Default for GlobalKeys {
    fn default() -> Self {
        Self {
            quit: vec!["q".into()],
            search: vec!["/".into()],
            help: vec!["?".into()],
            clear: vec!["c".into()],
            focus_next: vec!["Tab".into()],
            focus_prev: vec!["Backtab".into()],
        }
    }
}

impl Default for SearchInputKeys {
    fn default() -> Self {
        Self {
            cancel: vec!["Escape".into()],
            confirm: vec!["Enter".into()],
            next: vec!["Down".into()],
            prev: vec!["Up".into()],
        }
    }
}

impl Default for AlphabetKeys {
    fn default() -> Self {
        Self {
            next: vec!["l".into(), "Right".into()],
            prev: vec!["h".into(), "Left".into()],
            toggle: vec!["Enter".into(), "Space".into()],
            cancel: vec!["Escape".into()],
        }
    }
}

impl Default for ResultsKeys {
    fn default() -> Self {
        Self {
            next: vec!["j".into(), "Down".into()],
            prev: vec!["k".into(), "Up".into()],
            page_down: vec!["PageDown".into()],
            page_up: vec!["PageUp".into()],
            first: vec!["g".into(), "Home".into()],
            last: vec!["G".into(), "End".into()],
            open: vec!["Enter".into()],
        }
    }
}

impl Default for DetailsKeys {
    fn default() -> Self {
        Self {
            close: vec!["Escape".into(), "q".into()],
            copy: vec!["y".into(), "Space".into()],
            next: vec!["j".into(), "Down".into()],
            prev: vec!["k".into(), "Up".into()],
        }
    }
}

// =============================================================================
// Serde deserialization types (support both single string and array)
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum KeyBinding {
    Single(String),
    Multiple(Vec<String>),
}

impl KeyBinding {
    fn into_vec(self) -> Vec<String> {
        match self {
            KeyBinding::Single(s) => vec![s],
            KeyBinding::Multiple(v) => v,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct KeysFile {
    global: GlobalKeysFile,
    search_input: SearchInputKeysFile,
    alphabet: AlphabetKeysFile,
    results: ResultsKeysFile,
    details: DetailsKeysFile,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct GlobalKeysFile {
    quit: KeyBinding,
    search: KeyBinding,
    help: KeyBinding,
    clear: KeyBinding,
    focus_next: KeyBinding,
    focus_prev: KeyBinding,
}

impl Default for GlobalKeysFile {
    fn default() -> Self {
        let defaults = GlobalKeys::default();
        Self {
            quit: KeyBinding::Multiple(defaults.quit),
            search: KeyBinding::Multiple(defaults.search),
            help: KeyBinding::Multiple(defaults.help),
            clear: KeyBinding::Multiple(defaults.clear),
            focus_next: KeyBinding::Multiple(defaults.focus_next),
            focus_prev: KeyBinding::Multiple(defaults.focus_prev),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct SearchInputKeysFile {
    cancel: KeyBinding,
    confirm: KeyBinding,
    next: KeyBinding,
    prev: KeyBinding,
}

impl Default for SearchInputKeysFile {
    fn default() -> Self {
        let defaults = SearchInputKeys::default();
        Self {
            cancel: KeyBinding::Multiple(defaults.cancel),
            confirm: KeyBinding::Multiple(defaults.confirm),
            next: KeyBinding::Multiple(defaults.next),
            prev: KeyBinding::Multiple(defaults.prev),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct AlphabetKeysFile {
    next: KeyBinding,
    prev: KeyBinding,
    toggle: KeyBinding,
    cancel: KeyBinding,
}

impl Default for AlphabetKeysFile {
    fn default() -> Self {
        let defaults = AlphabetKeys::default();
        Self {
            next: KeyBinding::Multiple(defaults.next),
            prev: KeyBinding::Multiple(defaults.prev),
            toggle: KeyBinding::Multiple(defaults.toggle),
            cancel: KeyBinding::Multiple(defaults.cancel),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ResultsKeysFile {
    next: KeyBinding,
    prev: KeyBinding,
    page_down: KeyBinding,
    page_up: KeyBinding,
    first: KeyBinding,
    last: KeyBinding,
    open: KeyBinding,
}

impl Default for ResultsKeysFile {
    fn default() -> Self {
        let defaults = ResultsKeys::default();
        Self {
            next: KeyBinding::Multiple(defaults.next),
            prev: KeyBinding::Multiple(defaults.prev),
            page_down: KeyBinding::Multiple(defaults.page_down),
            page_up: KeyBinding::Multiple(defaults.page_up),
            first: KeyBinding::Multiple(defaults.first),
            last: KeyBinding::Multiple(defaults.last),
            open: KeyBinding::Multiple(defaults.open),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct DetailsKeysFile {
    close: KeyBinding,
    copy: KeyBinding,
    next: KeyBinding,
    prev: KeyBinding,
}

impl Default for DetailsKeysFile {
    fn default() -> Self {
        let defaults = DetailsKeys::default();
        Self {
            close: KeyBinding::Multiple(defaults.close),
            copy: KeyBinding::Multiple(defaults.copy),
            next: KeyBinding::Multiple(defaults.next),
            prev: KeyBinding::Multiple(defaults.prev),
        }
    }
}

impl From<KeysFile> for Keys {
    fn from(file: KeysFile) -> Self {
        Self {
            global: GlobalKeys {
                quit: file.global.quit.into_vec(),
                search: file.global.search.into_vec(),
                help: file.global.help.into_vec(),
                clear: file.global.clear.into_vec(),
                focus_next: file.global.focus_next.into_vec(),
                focus_prev: file.global.focus_prev.into_vec(),
            },
            search_input: SearchInputKeys {
                cancel: file.search_input.cancel.into_vec(),
                confirm: file.search_input.confirm.into_vec(),
                next: file.search_input.next.into_vec(),
                prev: file.search_input.prev.into_vec(),
            },
            alphabet: AlphabetKeys {
                next: file.alphabet.next.into_vec(),
                prev: file.alphabet.prev.into_vec(),
                toggle: file.alphabet.toggle.into_vec(),
                cancel: file.alphabet.cancel.into_vec(),
            },
            results: ResultsKeys {
                next: file.results.next.into_vec(),
                prev: file.results.prev.into_vec(),
                page_down: file.results.page_down.into_vec(),
                page_up: file.results.page_up.into_vec(),
                first: file.results.first.into_vec(),
                last: file.results.last.into_vec(),
                open: file.results.open.into_vec(),
            },
            details: DetailsKeys {
                close: file.details.close.into_vec(),
                copy: file.details.copy.into_vec(),
                next: file.details.next.into_vec(),
                prev: file.details.prev.into_vec(),
            },
        }
    }
}

// =============================================================================
// Key binding validation
// =============================================================================

/// Normalize a key binding string to a canonical form for collision detection.
/// Single characters preserve case (since 'G' means Shift+g, different from 'g').
/// Multi-character key names are case-insensitive (Enter, ENTER, enter are the same).
fn normalize_binding(binding: &str) -> String {
    let trimmed = binding.trim();
    if trimmed.chars().count() == 1 {
        trimmed.to_string()
    } else {
        match trimmed.to_ascii_lowercase().as_str() {
            "esc" => "escape".to_string(),
            "shift+tab" => "backtab".to_string(),
            "page_up" => "pageup".to_string(),
            "page_down" => "pagedown".to_string(),
            other => other.to_string(),
        }
    }
}

/// Check for collisions within a single context
fn check_context_collisions(bindings: &[(&str, &[String])], context_name: &str) -> Result<()> {
    let mut seen: HashMap<String, &str> = HashMap::new();

    for (action_name, keys) in bindings {
        for key in *keys {
            let normalized = normalize_binding(key);
            if normalized.is_empty() {
                continue;
            }
            if let Some(existing_action) = seen.get(&normalized) {
                bail!(
                    "key binding collision in [keys.{}]: '{}' is bound to both '{}' and '{}'",
                    context_name,
                    key,
                    existing_action,
                    action_name
                );
            }
            seen.insert(normalized, action_name);
        }
    }

    Ok(())
}

/// Validate all key bindings. Global keys are live in the alphabet and
/// results contexts, so those are checked together with them.
fn validate_key_bindings(keys: &Keys) -> Result<()> {
    let global: [(&str, &[String]); 6] = [
        ("global.quit", &keys.global.quit),
        ("global.search", &keys.global.search),
        ("global.help", &keys.global.help),
        ("global.clear", &keys.global.clear),
        ("global.focus_next", &keys.global.focus_next),
        ("global.focus_prev", &keys.global.focus_prev),
    ];

    check_context_collisions(&global, "global")?;

    check_context_collisions(
        &[
            ("cancel", &keys.search_input.cancel),
            ("confirm", &keys.search_input.confirm),
            ("next", &keys.search_input.next),
            ("prev", &keys.search_input.prev),
            ("global.focus_next", &keys.global.focus_next),
            ("global.focus_prev", &keys.global.focus_prev),
        ],
        "search_input",
    )?;

    let mut alphabet: Vec<(&str, &[String])> = vec![
        ("next", &keys.alphabet.next),
        ("prev", &keys.alphabet.prev),
        ("toggle", &keys.alphabet.toggle),
        ("cancel", &keys.alphabet.cancel),
    ];
    alphabet.extend_from_slice(&global);
    check_context_collisions(&alphabet, "alphabet")?;

    let mut results: Vec<(&str, &[String])> = vec![
        ("next", &keys.results.next),
        ("prev", &keys.results.prev),
        ("page_down", &keys.results.page_down),
        ("page_up", &keys.results.page_up),
        ("first", &keys.results.first),
        ("last", &keys.results.last),
        ("open", &keys.results.open),
    ];
    results.extend_from_slice(&global);
    check_context_collisions(&results, "results")?;

    check_context_collisions(
        &[
            ("close", &keys.details.close),
            ("copy", &keys.details.copy),
            ("next", &keys.details.next),
            ("prev", &keys.details.prev),
        ],
        "details",
    )?;

    Ok(())
}

// =============================================================================
// Config file structure
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ConfigFile {
    source: String,
    details_url: String,
    sample_size: usize,
    fields: FieldsFile,
    keys: KeysFile,
    ui: UiFile,
    commands: CommandsFile,
    top_bar: TopBarFile,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE.to_string(),
            details_url: DEFAULT_DETAILS_URL.to_string(),
            sample_size: DEFAULT_SAMPLE_SIZE,
            fields: FieldsFile::default(),
            keys: KeysFile::default(),
            ui: UiFile::default(),
            commands: CommandsFile::default(),
            top_bar: TopBarFile::default(),
        }
    }
}

impl ConfigFile {
    fn into_config(self, config_path: Option<PathBuf>) -> Config {
        let details_url = match self.details_url.trim() {
            "" => DEFAULT_DETAILS_URL.to_string(),
            url => url.to_string(),
        };

        Config {
            config_path,
            source: parse_source(&self.source),
            details_url,
            sample_size: self.sample_size,
            fields: self.fields.into(),
            keys: self.keys.into(),
            ui: self.ui.into(),
            commands: self.commands.into(),
            top_bar: self.top_bar.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct FieldsFile {
    name: KeyBinding,
    description: String,
    tags: String,
}

impl Default for FieldsFile {
    fn default() -> Self {
        let defaults = FieldNames::default();
        Self {
            name: KeyBinding::Multiple(defaults.name),
            description: defaults.description,
            tags: defaults.tags,
        }
    }
}

impl From<FieldsFile> for FieldNames {
    fn from(file: FieldsFile) -> Self {
        let name: Vec<String> = file
            .name
            .into_vec()
            .into_iter()
            .map(|field| field.trim().to_string())
            .filter(|field| !field.is_empty())
            .collect();
        let defaults = FieldNames::default();
        Self {
            name: if name.is_empty() { defaults.name } else { name },
            description: file.description,
            tags: file.tags,
        }
    }
}

// =============================================================================
// Top Bar File Deserialization
// =============================================================================

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct TopBarFile {
    #[serde(flatten)]
    buttons: HashMap<String, String>,
}

impl From<TopBarFile> for TopBarConfig {
    fn from(file: TopBarFile) -> Self {
        if file.buttons.is_empty() {
            return TopBarConfig::default();
        }

        let mut buttons: Vec<TopBarButton> = Vec::new();

        for (key, action_str) in file.buttons {
            if parse_function_key(&key).is_none() {
                warn!("invalid top_bar key '{}', expected F1-F12", key);
                continue;
            }

            let Some(action) = TopBarAction::from_str(&action_str) else {
                warn!(
                    "invalid top_bar action '{}' for key '{}', expected one of: help, search, open, clear",
                    action_str, key
                );
                continue;
            };

            buttons.push(TopBarButton {
                key: key.trim().to_ascii_uppercase(),
                action,
            });
        }

        buttons.sort_by_key(|b| b.function_key_number().unwrap_or(0));

        if buttons.is_empty() {
            TopBarConfig::default()
        } else {
            TopBarConfig { buttons }
        }
    }
}

// =============================================================================
// Loading
// =============================================================================

fn config_root() -> Result<PathBuf> {
    let base = BaseDirs::new().context("unable to determine base directories")?;
    Ok(base.config_dir().join(APP_NAME))
}

pub fn config_path() -> Result<PathBuf> {
    Ok(config_root()?.join(CONFIG_FILE_NAME))
}

/// Load configuration. An explicit path must exist; the default location is
/// optional and falls back to built-in defaults.
pub fn load(explicit: Option<&Path>) -> Result<Config> {
    let path = match explicit {
        Some(path) => {
            let path = expand_tilde(path);
            if !path.exists() {
                bail!("configuration file not found at {}", path.display());
            }
            path
        }
        None => {
            let path = config_path()?;
            if !path.exists() {
                return Ok(Config::default());
            }
            path
        }
    };

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read configuration file at {}", path.display()))?;

    parse(&raw, Some(path))
}

/// Parse configuration text. `path` is only used for messages.
pub fn parse(raw: &str, path: Option<PathBuf>) -> Result<Config> {
    let label = path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "configuration".to_string());

    let value: toml::Value =
        toml::from_str(raw).with_context(|| format!("failed to parse {} as TOML", label))?;

    warn_unknown_keys(&value);

    let cfg_file: ConfigFile = value
        .try_into()
        .with_context(|| format!("failed to deserialize config from {}", label))?;

    let config = cfg_file.into_config(path);
    validate_key_bindings(&config.keys)?;
    Ok(config)
}

// =============================================================================
// Unknown key warnings
// =============================================================================

fn warn_unknown_keys(value: &toml::Value) {
    let Some(table) = value.as_table() else {
        return;
    };

    warn_unknown_in_table(
        value,
        "",
        &[
            "source",
            "details_url",
            "sample_size",
            "fields",
            "keys",
            "ui",
            "commands",
            "top_bar",
        ],
    );

    if let Some(v) = table.get("fields") {
        warn_unknown_in_table(v, "fields.", &["name", "description", "tags"]);
    }
    if let Some(v) = table.get("commands") {
        warn_unknown_in_table(v, "commands.", &["copy"]);
    }
    if let Some(ui) = table.get("ui") {
        warn_unknown_in_table(ui, "ui.", &["colors"]);
        if let Some(colors) = ui.get("colors") {
            warn_unknown_in_table(
                colors,
                "ui.colors.",
                &[
                    "border",
                    "selection_bg",
                    "selection_fg",
                    "separator",
                    "status_fg",
                    "status_bg",
                    "highlight_fg",
                    "highlight_bg",
                    "chip",
                ],
            );
        }
    }
    if let Some(keys) = table.get("keys") {
        warn_unknown_keys_section(keys);
    }
}

fn warn_unknown_keys_section(value: &toml::Value) {
    let contexts: [(&str, &[&str]); 5] = [
        (
            "global",
            &["quit", "search", "help", "clear", "focus_next", "focus_prev"],
        ),
        ("search_input", &["cancel", "confirm", "next", "prev"]),
        ("alphabet", &["next", "prev", "toggle", "cancel"]),
        (
            "results",
            &["next", "prev", "page_down", "page_up", "first", "last", "open"],
        ),
        ("details", &["close", "copy", "next", "prev"]),
    ];

    let names: Vec<&str> = contexts.iter().map(|(name, _)| *name).collect();
    warn_unknown_in_table(value, "keys.", &names);

    for (name, known) in contexts {
        if let Some(v) = value.get(name) {
            warn_unknown_in_table(v, &format!("keys.{}.", name), known);
        }
    }
}

fn warn_unknown_in_table(value: &toml::Value, prefix: &str, known: &[&str]) {
    let Some(table) = value.as_table() else {
        return;
    };
    let known_set: HashSet<&str> = known.iter().copied().collect();
    for key in table.keys() {
        if !known_set.contains(key.as_str()) {
            warn!("unknown configuration key `{}{}`", prefix, key);
        }
    }
}

// =============================================================================
// UI config types
// =============================================================================

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct UiFile {
    colors: UiColorsFile,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct UiColorsFile {
    border: RgbColor,
    selection_bg: RgbColor,
    selection_fg: RgbColor,
    separator: RgbColor,
    status_fg: RgbColor,
    status_bg: RgbColor,
    highlight_fg: RgbColor,
    highlight_bg: RgbColor,
    chip: RgbColor,
}

impl Default for UiColorsFile {
    fn default() -> Self {
        Self {
            border: RgbColor::new(255, 165, 0),
            selection_bg: RgbColor::new(255, 165, 0),
            selection_fg: RgbColor::new(0, 0, 0),
            separator: RgbColor::new(255, 165, 0),
            status_fg: RgbColor::new(255, 165, 0),
            status_bg: RgbColor::new(0, 0, 0),
            highlight_fg: RgbColor::new(0, 0, 0),
            highlight_bg: RgbColor::new(255, 230, 90),
            chip: RgbColor::new(135, 175, 215),
        }
    }
}

impl From<UiFile> for UiConfig {
    fn from(file: UiFile) -> Self {
        let c = file.colors;
        Self {
            colors: UiColors {
                border: c.border,
                selection_bg: c.selection_bg,
                selection_fg: c.selection_fg,
                separator: c.separator,
                status_fg: c.status_fg,
                status_bg: c.status_bg,
                highlight_fg: c.highlight_fg,
                highlight_bg: c.highlight_bg,
                chip: c.chip,
            },
        }
    }
}

// =============================================================================
// Commands config
// =============================================================================

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct CommandsFile {
    copy: Option<CommandDef>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum CommandDef {
    Simple(String),
    List(Vec<String>),
}

impl From<CommandsFile> for Commands {
    fn from(file: CommandsFile) -> Self {
        Self {
            copy: file.copy.and_then(CommandExec::from_def),
        }
    }
}

impl CommandExec {
    fn from_def(def: CommandDef) -> Option<Self> {
        match def {
            CommandDef::Simple(cmd) => {
                let trimmed = cmd.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(Self {
                        program: trimmed.to_string(),
                        args: Vec::new(),
                    })
                }
            }
            CommandDef::List(mut parts) => {
                if parts.is_empty() {
                    return None;
                }
                let program = parts.remove(0);
                Some(Self {
                    program,
                    args: parts,
                })
            }
        }
    }
}

impl RgbColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl<'de> serde::Deserialize<'de> for RgbColor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Helper {
            Array([u8; 3]),
            Map { r: u8, g: u8, b: u8 },
        }

        let helper = Helper::deserialize(deserializer)?;
        let (r, g, b) = match helper {
            Helper::Array(values) => (values[0], values[1], values[2]),
            Helper::Map { r, g, b } => (r, g, b),
        };
        Ok(RgbColor { r, g, b })
    }
}
