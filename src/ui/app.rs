use std::convert::TryFrom;
use std::io::{stdout, Write};
use std::process::{Command, Stdio};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use rand::rngs::StdRng;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tui_input::backend::crossterm::EventHandler;
use tui_input::Input;
use tui_widgets::popup::PopupState;

use crate::browser::{Browser, LoadStatus, View};
use crate::config::{CommandExec, Config, TopBarAction, TopBarButton, UiColors};
use crate::entry::Entry;
use crate::filter::Letter;
use crate::loader;
use crate::logging;
use crate::render::{self, Card};

use super::draw;
use super::panes::Focus;

const PAGE_SIZE: usize = 5;

/// Help modal state with scroll support
#[derive(Debug, Clone)]
pub struct HelpModal {
    /// Current scroll offset (line index at top of viewport)
    pub scroll: usize,
    /// Total number of content lines
    pub total_lines: usize,
    /// Viewport height (set during rendering)
    pub viewport_height: usize,
}

impl HelpModal {
    pub fn new(total_lines: usize) -> Self {
        Self {
            scroll: 0,
            total_lines,
            viewport_height: 10, // Will be updated during render
        }
    }

    pub fn scroll_down(&mut self, lines: usize) {
        let max_scroll = self.total_lines.saturating_sub(self.viewport_height);
        self.scroll = (self.scroll + lines).min(max_scroll);
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll = self.scroll.saturating_sub(lines);
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll = 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll = self.total_lines.saturating_sub(self.viewport_height);
    }

    pub fn can_scroll_up(&self) -> bool {
        self.scroll > 0
    }

    pub fn can_scroll_down(&self) -> bool {
        self.scroll + self.viewport_height < self.total_lines
    }
}

/// A section in the help modal (e.g., "Global", "Results")
pub struct HelpSection {
    pub title: &'static str,
    pub entries: Vec<HelpEntry>,
}

/// A single help entry (action name + key bindings)
pub struct HelpEntry {
    pub action: &'static str,
    pub keys: String,
}

/// One label/value line of the details popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailsRow {
    pub label: String,
    pub value: String,
}

/// Details popup for one entry: its raw fields followed by the details link.
#[derive(Debug, Clone)]
pub struct DetailsModal {
    pub title: String,
    pub rows: Vec<DetailsRow>,
    pub selected: usize,
}

impl DetailsModal {
    fn new(entry: &Entry, card: &Card) -> Self {
        let mut rows: Vec<DetailsRow> = entry
            .fields
            .iter()
            .map(|(label, value)| DetailsRow {
                label: label.clone(),
                value: value.clone(),
            })
            .collect();
        rows.push(DetailsRow {
            label: "LINK".to_string(),
            value: card.details_url.clone(),
        });
        let selected = rows.len() - 1;
        Self {
            title: entry.name.to_uppercase(),
            rows,
            selected,
        }
    }

    pub fn selected_row(&self) -> Option<&DetailsRow> {
        self.rows.get(self.selected)
    }

    fn select_next(&mut self) {
        if self.selected + 1 < self.rows.len() {
            self.selected += 1;
        }
    }

    fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }
}

pub struct App<'a> {
    config: &'a Config,
    rng: StdRng,
    browser: Browser,
    pub view: View,
    pub focus: Focus,
    pub search_input: Input,
    /// Highlighted position in the letter bar, `A` = 0
    pub letter_cursor: usize,
    /// Selected card in `view.cards`
    pub selected: usize,
    pub status: Option<String>,
    // Popup state for the details dialog (tui-widgets popup)
    pub modal_popup: PopupState,
    pub details_modal: Option<DetailsModal>,
    pub help_modal: Option<HelpModal>,
    // Load runs from the event loop once the loading frame is on screen
    pub pending_load: bool,
}

impl<'a> App<'a> {
    pub fn new(config: &'a Config, rng: StdRng) -> Self {
        let browser = Browser::new(config.details_url.clone());
        let view = browser.view();
        Self {
            config,
            rng,
            browser,
            view,
            focus: Focus::Search,
            search_input: Input::default(),
            letter_cursor: 0,
            selected: 0,
            status: None,
            modal_popup: PopupState::default(),
            details_modal: None,
            help_modal: None,
            pending_load: true,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        let _console = logging::suspend_console();

        enable_raw_mode()?;
        let mut stdout = stdout();
        stdout.execute(EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        let result = self.event_loop(&mut terminal);

        disable_raw_mode()?;
        terminal.backend_mut().execute(LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn event_loop<B>(&mut self, terminal: &mut Terminal<B>) -> Result<()>
    where
        B: ratatui::backend::Backend,
    {
        loop {
            draw::render(terminal, self)?;

            // The loading frame is already drawn; the fetch blocks until done
            if self.pending_load {
                self.pending_load = false;
                self.load();
                continue;
            }

            if event::poll(Duration::from_millis(250))? {
                match event::read()? {
                    Event::Key(key) => {
                        if self.handle_key(key)? {
                            break;
                        }
                    }
                    Event::Resize(_, _) => {}
                    _ => {}
                }
            }
        }
        Ok(())
    }

    /// Fetch the dataset and show either the first-load sample or the error.
    pub fn load(&mut self) {
        let source = &self.config.source;
        let result = loader::load(source, &self.config.fields);
        self.browser.finish_load(
            result,
            &source.to_string(),
            self.config.sample_size,
            &mut self.rng,
        );

        match self.browser.status() {
            LoadStatus::Ready => {
                let total = self.browser.entries().len();
                self.set_status(render::loaded_summary(total));
            }
            LoadStatus::Failed(message) => {
                let message = message.clone();
                self.set_status(message);
            }
            LoadStatus::Loading => {}
        }
        self.refresh_view();
    }

    fn refresh_view(&mut self) {
        self.view = self.browser.view();
        if self.view.cards.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.view.cards.len() {
            self.selected = self.view.cards.len() - 1;
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        // Ctrl+C always quits (hardcoded for safety)
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
        {
            return Ok(true);
        }

        if self.help_modal.is_some() {
            self.handle_help_modal_key(key);
            return Ok(false);
        }

        if self.details_modal.is_some() {
            self.handle_details_modal_key(key)?;
            return Ok(false);
        }

        if let Some(action) = self.top_bar_action_for_key(&key) {
            return self.handle_top_bar_action(action);
        }

        // Focus cycling works in every region, including while typing
        let global = &self.config.keys.global;
        if self.key_matches_any(&key, &global.focus_next) {
            self.focus = self.focus.next();
            return Ok(false);
        }
        if self.key_matches_any(&key, &global.focus_prev) {
            self.focus = self.focus.prev();
            return Ok(false);
        }

        match self.focus {
            Focus::Search => {
                self.handle_search_key(key);
                Ok(false)
            }
            Focus::Alphabet => {
                if self.handle_alphabet_key(key) {
                    return Ok(false);
                }
                self.handle_global_key(key)
            }
            Focus::Results => {
                if self.handle_results_key(key) {
                    return Ok(false);
                }
                self.handle_global_key(key)
            }
        }
    }

    /// Keys shared by the letter bar and the card list. Returns true to quit.
    fn handle_global_key(&mut self, key: KeyEvent) -> Result<bool> {
        let global = &self.config.keys.global;

        if self.key_matches_any(&key, &global.quit) {
            return Ok(true);
        }

        if self.key_matches_any(&key, &global.search) {
            self.focus = Focus::Search;
            return Ok(false);
        }

        if self.key_matches_any(&key, &global.help) {
            self.show_help();
            return Ok(false);
        }

        if self.key_matches_any(&key, &global.clear) {
            self.clear_filters();
            return Ok(false);
        }

        // Typing a letter in the letter bar jumps to it
        let plain = !key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER);
        if matches!(self.focus, Focus::Alphabet) && plain {
            if let KeyCode::Char(c) = key.code {
                if let Ok(letter) = Letter::try_from(c) {
                    self.letter_cursor = letter.index();
                    self.toggle_letter(letter);
                }
            }
        }

        Ok(false)
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        let input_keys = &self.config.keys.search_input;

        // Cancel: move focus to results, keep the query
        if self.key_matches_any(&key, &input_keys.cancel) {
            self.focus = Focus::Results;
            return;
        }

        // Confirm: the search button
        if self.key_matches_any(&key, &input_keys.confirm) {
            self.browser.submit();
            self.browser.set_query(self.search_input.value());
            self.refresh_view();
            self.focus = Focus::Results;
            return;
        }

        // Next/prev: navigate results while typing
        if self.key_matches_any(&key, &input_keys.next) {
            self.move_selection(1);
            return;
        }
        if self.key_matches_any(&key, &input_keys.prev) {
            self.move_selection(-1);
            return;
        }

        // Pass other keys to the input widget
        if let Some(change) = self.search_input.handle_event(&Event::Key(key)) {
            if change.value {
                self.browser.set_query(self.search_input.value());
                self.selected = 0;
                self.refresh_view();
            }
        }
    }

    fn handle_alphabet_key(&mut self, key: KeyEvent) -> bool {
        let keys = &self.config.keys.alphabet;

        if self.key_matches_any(&key, &keys.next) {
            self.letter_cursor = (self.letter_cursor + 1) % Letter::ALL.len();
            return true;
        }
        if self.key_matches_any(&key, &keys.prev) {
            self.letter_cursor = (self.letter_cursor + Letter::ALL.len() - 1) % Letter::ALL.len();
            return true;
        }
        if self.key_matches_any(&key, &keys.toggle) {
            if let Some(letter) = Letter::from_index(self.letter_cursor) {
                self.toggle_letter(letter);
            }
            return true;
        }
        if self.key_matches_any(&key, &keys.cancel) {
            self.focus = Focus::Results;
            return true;
        }
        false
    }

    fn handle_results_key(&mut self, key: KeyEvent) -> bool {
        let keys = &self.config.keys.results;

        if self.key_matches_any(&key, &keys.next) {
            self.move_selection(1);
            return true;
        }
        if self.key_matches_any(&key, &keys.prev) {
            self.move_selection(-1);
            return true;
        }
        if self.key_matches_any(&key, &keys.page_down) {
            self.move_selection(PAGE_SIZE as isize);
            return true;
        }
        if self.key_matches_any(&key, &keys.page_up) {
            self.move_selection(-(PAGE_SIZE as isize));
            return true;
        }
        if self.key_matches_any(&key, &keys.first) {
            self.selected = 0;
            return true;
        }
        if self.key_matches_any(&key, &keys.last) {
            self.selected = self.view.cards.len().saturating_sub(1);
            return true;
        }
        if self.key_matches_any(&key, &keys.open) {
            self.open_details();
            return true;
        }
        false
    }

    fn handle_details_modal_key(&mut self, key: KeyEvent) -> Result<()> {
        let keys = &self.config.keys.details;

        if self.key_matches_any(&key, &keys.close) {
            self.details_modal = None;
            return Ok(());
        }
        if self.key_matches_any(&key, &keys.copy) {
            let value = self
                .details_modal
                .as_ref()
                .and_then(|modal| modal.selected_row())
                .map(|row| row.value.clone())
                .unwrap_or_default();
            return self.copy_value_to_clipboard(&value);
        }

        let next = self.key_matches_any(&key, &keys.next);
        let prev = self.key_matches_any(&key, &keys.prev);
        if let Some(modal) = self.details_modal.as_mut() {
            if next {
                modal.select_next();
            } else if prev {
                modal.select_prev();
            }
        }
        Ok(())
    }

    fn toggle_letter(&mut self, letter: Letter) {
        self.browser.toggle_letter(letter);
        self.search_input.reset();
        self.selected = 0;
        self.refresh_view();
        match self.browser.active_letter() {
            Some(active) => self.set_status(format!("Letter {}", active)),
            None => self.set_status("Letter filter cleared"),
        }
    }

    fn clear_filters(&mut self) {
        self.browser.clear();
        self.search_input.reset();
        self.selected = 0;
        self.refresh_view();
        self.set_status("Filters cleared");
    }

    fn move_selection(&mut self, delta: isize) {
        if self.view.cards.is_empty() {
            return;
        }
        let len = self.view.cards.len() as isize;
        let index = (self.selected as isize + delta).clamp(0, len - 1);
        self.selected = index as usize;
    }

    fn open_details(&mut self) {
        let Some(card) = self.view.cards.get(self.selected) else {
            self.set_status("No entry selected");
            return;
        };
        let Some(entry) = self.browser.entry(card.index) else {
            return;
        };
        let modal = DetailsModal::new(entry, card);
        self.modal_popup = PopupState::default();
        self.details_modal = Some(modal);
    }

    fn copy_value_to_clipboard(&mut self, value: &str) -> Result<()> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.set_status("Nothing to copy");
            return Ok(());
        }

        if let Some(command) = self.config.commands.copy.clone() {
            match self.run_copy_command(&command, trimmed) {
                Ok(_) => self.set_status("Copied!"),
                Err(err) => self.set_status(format!("Copy failed: {}", err)),
            }
        } else {
            self.set_status("Copy command not configured");
        }

        Ok(())
    }

    fn run_copy_command(&self, command: &CommandExec, value: &str) -> Result<()> {
        let mut child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to spawn `{}`", command.program))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(value.as_bytes())?;
        }

        let status = child.wait()?;
        if !status.success() {
            bail!("`{}` exited with {}", command.program, status);
        }

        Ok(())
    }

    fn set_status<S: Into<String>>(&mut self, message: S) {
        self.status = Some(message.into());
    }

    pub fn ui_colors(&self) -> &UiColors {
        &self.config.ui.colors
    }

    pub fn top_bar_buttons(&self) -> &[TopBarButton] {
        &self.config.top_bar.buttons
    }

    pub fn source_label(&self) -> String {
        self.config.source.to_string()
    }

    pub fn active_letter(&self) -> Option<Letter> {
        self.browser.active_letter()
    }

    pub fn applied_query(&self) -> &str {
        self.browser.filter().query()
    }

    pub fn is_sample(&self) -> bool {
        self.browser.is_first_load()
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.browser.status(), LoadStatus::Loading)
    }

    /// Check if the key event matches any of the bindings in the list
    fn key_matches_any(&self, event: &KeyEvent, bindings: &[String]) -> bool {
        bindings.iter().any(|b| self.key_matches_single(event, b))
    }

    /// Check if the key event matches a single binding string
    fn key_matches_single(&self, event: &KeyEvent, binding: &str) -> bool {
        let trimmed = binding.trim();
        if trimmed.is_empty() {
            return false;
        }

        // Disallow Ctrl/Alt/Super modifiers (we don't support them)
        let disallowed = KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER;
        if event.modifiers.intersects(disallowed) {
            return false;
        }

        match trimmed.to_ascii_lowercase().as_str() {
            // Special keys
            "enter" => matches!(event.code, KeyCode::Enter),
            "tab" => matches!(event.code, KeyCode::Tab),
            "backtab" | "shift+tab" => matches!(event.code, KeyCode::BackTab),
            "backspace" => matches!(event.code, KeyCode::Backspace),
            "esc" | "escape" => matches!(event.code, KeyCode::Esc),
            "space" => matches!(event.code, KeyCode::Char(' ')),
            // Arrow keys
            "up" => matches!(event.code, KeyCode::Up),
            "down" => matches!(event.code, KeyCode::Down),
            "left" => matches!(event.code, KeyCode::Left),
            "right" => matches!(event.code, KeyCode::Right),
            // Page navigation
            "pageup" | "page_up" => matches!(event.code, KeyCode::PageUp),
            "pagedown" | "page_down" => matches!(event.code, KeyCode::PageDown),
            "home" => matches!(event.code, KeyCode::Home),
            "end" => matches!(event.code, KeyCode::End),
            // Function keys
            name if name.starts_with('f') && name.len() > 1 => {
                match name[1..].parse::<u8>() {
                    Ok(n) if (1..=12).contains(&n) => event.code == KeyCode::F(n),
                    _ => false,
                }
            }
            // Single character - case-sensitive (g != G, since G requires Shift)
            _ => {
                let mut chars = trimmed.chars();
                if let (Some(first), None) = (chars.next(), chars.next()) {
                    matches!(event.code, KeyCode::Char(c) if c == first)
                } else {
                    false
                }
            }
        }
    }

    // =========================================================================
    // Help Modal
    // =========================================================================

    /// Generate help content from current keybindings configuration
    pub fn help_entries(&self) -> Vec<HelpSection> {
        let keys = &self.config.keys;

        vec![
            HelpSection {
                title: "Global",
                entries: vec![
                    HelpEntry {
                        action: "Quit",
                        keys: keys.global.quit.join(", "),
                    },
                    HelpEntry {
                        action: "Search",
                        keys: keys.global.search.join(", "),
                    },
                    HelpEntry {
                        action: "Help",
                        keys: keys.global.help.join(", "),
                    },
                    HelpEntry {
                        action: "Clear Filters",
                        keys: keys.global.clear.join(", "),
                    },
                    HelpEntry {
                        action: "Next Region",
                        keys: keys.global.focus_next.join(", "),
                    },
                    HelpEntry {
                        action: "Previous Region",
                        keys: keys.global.focus_prev.join(", "),
                    },
                ],
            },
            HelpSection {
                title: "Search Input",
                entries: vec![
                    HelpEntry {
                        action: "Focus Results",
                        keys: keys.search_input.cancel.join(", "),
                    },
                    HelpEntry {
                        action: "Search",
                        keys: keys.search_input.confirm.join(", "),
                    },
                    HelpEntry {
                        action: "Next",
                        keys: keys.search_input.next.join(", "),
                    },
                    HelpEntry {
                        action: "Previous",
                        keys: keys.search_input.prev.join(", "),
                    },
                ],
            },
            HelpSection {
                title: "Letters",
                entries: vec![
                    HelpEntry {
                        action: "Next Letter",
                        keys: keys.alphabet.next.join(", "),
                    },
                    HelpEntry {
                        action: "Previous Letter",
                        keys: keys.alphabet.prev.join(", "),
                    },
                    HelpEntry {
                        action: "Toggle Letter",
                        keys: keys.alphabet.toggle.join(", "),
                    },
                    HelpEntry {
                        action: "Focus Results",
                        keys: keys.alphabet.cancel.join(", "),
                    },
                ],
            },
            HelpSection {
                title: "Results",
                entries: vec![
                    HelpEntry {
                        action: "Next",
                        keys: keys.results.next.join(", "),
                    },
                    HelpEntry {
                        action: "Previous",
                        keys: keys.results.prev.join(", "),
                    },
                    HelpEntry {
                        action: "Page Down",
                        keys: keys.results.page_down.join(", "),
                    },
                    HelpEntry {
                        action: "Page Up",
                        keys: keys.results.page_up.join(", "),
                    },
                    HelpEntry {
                        action: "First",
                        keys: keys.results.first.join(", "),
                    },
                    HelpEntry {
                        action: "Last",
                        keys: keys.results.last.join(", "),
                    },
                    HelpEntry {
                        action: "Open Details",
                        keys: keys.results.open.join(", "),
                    },
                ],
            },
            HelpSection {
                title: "Details",
                entries: vec![
                    HelpEntry {
                        action: "Close",
                        keys: keys.details.close.join(", "),
                    },
                    HelpEntry {
                        action: "Copy",
                        keys: keys.details.copy.join(", "),
                    },
                    HelpEntry {
                        action: "Next Field",
                        keys: keys.details.next.join(", "),
                    },
                    HelpEntry {
                        action: "Previous Field",
                        keys: keys.details.prev.join(", "),
                    },
                ],
            },
        ]
    }

    /// Calculate total number of lines in help content
    fn help_total_lines(&self) -> usize {
        self.help_entries()
            .iter()
            .map(|section| section.entries.len() + 2)
            .sum()
    }

    pub fn show_help(&mut self) {
        let total_lines = self.help_total_lines();
        self.help_modal = Some(HelpModal::new(total_lines));
    }

    fn handle_help_modal_key(&mut self, key: KeyEvent) {
        // Close on Escape or q
        if matches!(key.code, KeyCode::Esc) || matches!(key.code, KeyCode::Char('q')) {
            self.help_modal = None;
            return;
        }

        let Some(modal) = self.help_modal.as_mut() else {
            return;
        };

        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                modal.scroll_down(1);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                modal.scroll_up(1);
            }
            KeyCode::PageDown => {
                let page = modal.viewport_height.saturating_sub(1).max(1);
                modal.scroll_down(page);
            }
            KeyCode::PageUp => {
                let page = modal.viewport_height.saturating_sub(1).max(1);
                modal.scroll_up(page);
            }
            KeyCode::Char('g') | KeyCode::Home => {
                modal.scroll_to_top();
            }
            KeyCode::Char('G') | KeyCode::End => {
                modal.scroll_to_bottom();
            }
            _ => {}
        }
    }

    // =========================================================================
    // Top Bar Actions
    // =========================================================================

    /// Check if a key event matches a top bar button and return its action
    fn top_bar_action_for_key(&self, key: &KeyEvent) -> Option<TopBarAction> {
        self.config
            .top_bar
            .buttons
            .iter()
            .find(|button| {
                button
                    .function_key_number()
                    .map_or(false, |n| key.code == KeyCode::F(n))
            })
            .map(|button| button.action)
    }

    fn handle_top_bar_action(&mut self, action: TopBarAction) -> Result<bool> {
        match action {
            TopBarAction::Help => self.show_help(),
            TopBarAction::Search => self.focus = Focus::Search,
            TopBarAction::Open => self.open_details(),
            TopBarAction::Clear => self.clear_filters(),
        }
        Ok(false)
    }
}
