use anyhow::Result;
use ratatui::backend::Backend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::line::NORMAL as LINE;
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph};
use ratatui::{Frame, Terminal};
// Use Popup from tui-widgets to render modals
use tui_widgets::popup::Popup;

use crate::config::{RgbColor, TopBarButton};
use crate::filter::Letter;
use crate::render::{self, Card, Highlighted};

use super::app::App;
use super::panes::Focus;

const SEARCH_HELP: &str = "Type to filter  Enter: search  Esc: results  Tab: letters";
const ALPHABET_HELP: &str = "h/l: move  Enter: toggle  A-Z: jump  c: clear  Esc: results";
const RESULTS_HELP: &str = "j/k: nav  Enter: details  /: search  c: clear  ?: help  q: quit";
const DETAILS_HELP: &str = "j/k: nav  y/Space: copy  q/Esc: close";
const HELP_MODAL_FOOTER: &str = "j/k: scroll  Esc/q: close";

pub fn render<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    terminal.draw(|frame| draw_frame(frame, app))?;
    Ok(())
}

fn draw_frame(frame: &mut Frame<'_>, app: &mut App) {
    let size = frame.area();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(size);

    draw_header(frame, layout[0], app);
    draw_body(frame, layout[1], app);
    draw_footer(frame, layout[2], app);
    draw_details_modal(frame, size, app);
    draw_help_modal(frame, size, app);
}

fn draw_header(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let buttons = app.top_bar_buttons();
    let total_buttons_width = calculate_buttons_width(buttons);

    // Split area: left for source/filters, right for buttons
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(total_buttons_width),
        ])
        .split(area);

    draw_header_left(frame, chunks[0], app);
    draw_top_bar_buttons(frame, chunks[1], app);
}

fn draw_header_left(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let header_style = header_text_style(app);
    let mut spans: Vec<Span> = vec![Span::styled(
        format!("KOTOBA://{}", app.source_label()),
        header_style,
    )];

    if let Some(letter) = app.active_letter() {
        spans.push(Span::raw("   "));
        spans.push(Span::styled(format!("[{}]", letter), selection_style(app)));
    }

    let query = app.applied_query();
    if !query.is_empty() {
        spans.push(Span::raw("   "));
        spans.push(Span::styled(format!("\"{}\"", query), header_style));
    }

    if app.is_sample() {
        spans.push(Span::raw("   "));
        spans.push(Span::styled("RANDOM", separator_style(app)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn calculate_buttons_width(buttons: &[TopBarButton]) -> u16 {
    if buttons.is_empty() {
        return 0;
    }

    let max_title_len = buttons
        .iter()
        .map(|b| b.action.title().len())
        .max()
        .unwrap_or(0);

    // Format: " F1: TITLE " = 1 (space) + key.len() + 2 (": ") + title + 1 (space)
    // Keys are F1-F12, so 2-3 chars. Use 3 for consistency.
    let button_width = (1 + 3 + 2 + max_title_len + 1) as u16;

    let num_buttons = buttons.len() as u16;
    let separators = num_buttons.saturating_sub(1);
    button_width * num_buttons + separators
}

fn draw_top_bar_buttons(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let buttons = app.top_bar_buttons();
    if buttons.is_empty() || area.width == 0 {
        return;
    }

    let max_title_len = buttons
        .iter()
        .map(|b| b.action.title().len())
        .max()
        .unwrap_or(0);

    let button_content_width = (1 + 3 + 2 + max_title_len + 1) as u16;

    let colors = app.ui_colors();
    let button_style = Style::default()
        .fg(color(colors.selection_fg))
        .bg(color(colors.selection_bg))
        .add_modifier(Modifier::BOLD);

    let mut x = area.x;
    for (idx, button) in buttons.iter().enumerate() {
        if x + button_content_width > area.x + area.width {
            break;
        }

        let text = format!(
            " {}: {:^width$} ",
            button.key,
            button.action.title(),
            width = max_title_len
        );

        let button_area = Rect {
            x,
            y: area.y,
            width: button_content_width,
            height: 1,
        };

        frame.render_widget(
            Paragraph::new(text).style(button_style).alignment(Alignment::Center),
            button_area,
        );

        x += button_content_width;

        if idx < buttons.len() - 1 && x < area.x + area.width {
            let sep_area = Rect {
                x,
                y: area.y,
                width: 1,
                height: 1,
            };
            frame.render_widget(Paragraph::new(" "), sep_area);
            x += 1;
        }
    }
}

fn draw_body(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(area);

    draw_search(frame, chunks[0], app);
    draw_alphabet(frame, chunks[1], app);
    draw_results(frame, chunks[2], app);
}

fn pane_block(app: &App, pane: Focus, title: Line<'static>) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(app, app.focus == pane))
        .title(title)
}

fn draw_search(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let active = app.focus == Focus::Search;
    let title = Line::from(Span::styled(
        format!(" {} ", Focus::Search.title()),
        header_text_style(app),
    ));
    let block = pane_block(app, Focus::Search, title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let label = "QUERY: ";
    let value_style = if active {
        selection_style(app)
    } else {
        Style::default()
    };
    let line = Line::from(vec![
        Span::styled(label, header_text_style(app)),
        Span::styled(app.search_input.value().to_string(), value_style),
    ]);
    frame.render_widget(Paragraph::new(line), inner);

    if active {
        let column = Span::raw(label).width() + app.search_input.visual_cursor();
        let x = inner.x.saturating_add(column as u16);
        frame.set_cursor_position((x, inner.y));
    }
}

fn draw_alphabet(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let active = app.focus == Focus::Alphabet;
    let title = Line::from(Span::styled(
        format!(" {} ", Focus::Alphabet.title()),
        header_text_style(app),
    ));
    let block = pane_block(app, Focus::Alphabet, title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let selected = app.active_letter();
    let mut spans: Vec<Span> = Vec::with_capacity(Letter::ALL.len() * 2);
    for index in 0..Letter::ALL.len() {
        let Some(letter) = Letter::from_index(index) else {
            continue;
        };
        let mut style = if selected == Some(letter) {
            selection_style(app)
        } else {
            Style::default()
        };
        if active && index == app.letter_cursor {
            style = style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
        }
        spans.push(Span::raw(" "));
        spans.push(Span::styled(letter.to_string(), style));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), inner);
}

fn draw_results(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let active = app.focus == Focus::Results;
    let title = Line::from(vec![
        Span::styled(format!(" {} ", Focus::Results.title()), header_text_style(app)),
        Span::styled(format!("{} ", app.view.summary), Style::default()),
    ]);
    let block = pane_block(app, Focus::Results, title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.width == 0 || inner.height == 0 {
        return;
    }

    if app.is_loading() {
        render_centered_words(frame, inner, render::LOADING_SUMMARY);
        return;
    }

    if app.view.is_empty() {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                render::NO_RESULTS,
                header_text_style(app),
            )))
            .alignment(Alignment::Center),
            inner,
        );
        return;
    }

    let width = inner.width as usize;
    let items: Vec<ListItem> = app
        .view
        .cards
        .iter()
        .map(|card| build_card_item(card, app, width))
        .collect();

    let mut state = ListState::default();
    state.select(Some(app.selected));

    let list = List::new(items)
        .highlight_style(if active {
            selection_style(app)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        })
        .highlight_symbol(" ")
        .repeat_highlight_symbol(true);

    frame.render_stateful_widget(list, inner, &mut state);
}

/// Three lines per card: name, description, tag chips. A rule separates cards.
fn build_card_item(card: &Card, app: &App, width: usize) -> ListItem<'static> {
    let mut lines: Vec<Line<'static>> = Vec::with_capacity(4);

    let mut name = highlighted_spans(&card.name, app, Style::default().add_modifier(Modifier::BOLD));
    name.insert(0, Span::raw(" "));
    lines.push(Line::from(name));

    if !card.description.is_empty() {
        lines.push(Line::from(format!("   {}", card.description)));
    }

    if !card.tags.is_empty() {
        let chip_style = Style::default().fg(color(app.ui_colors().chip));
        let mut spans: Vec<Span<'static>> = vec![Span::raw("  ")];
        for tag in &card.tags {
            // Brackets of a matching tag take the highlight colour too
            let bracket_style = if tag.has_match() {
                highlight_style(app)
            } else {
                chip_style
            };
            spans.push(Span::raw(" "));
            spans.push(Span::styled("[", bracket_style));
            spans.extend(highlighted_spans(tag, app, chip_style));
            spans.push(Span::styled("]", bracket_style));
        }
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(Span::styled(
        LINE.horizontal.repeat(width.saturating_sub(2)),
        separator_style(app),
    )));

    ListItem::new(Text::from(lines))
}

fn highlighted_spans(text: &Highlighted, app: &App, base: Style) -> Vec<Span<'static>> {
    text.segments()
        .iter()
        .map(|segment| {
            let style = if segment.matched {
                highlight_style(app)
            } else {
                base
            };
            Span::styled(segment.text.clone(), style)
        })
        .collect()
}

fn draw_details_modal(frame: &mut Frame<'_>, area: Rect, app: &mut App) {
    let Some(modal) = app.details_modal.as_ref() else {
        return;
    };

    // Keep the selected row in view when the record has many fields
    let max_rows = (area.height.saturating_sub(6) as usize).max(1);
    let offset = modal.selected.saturating_sub(max_rows.saturating_sub(1));
    let max_value_width = (area.width.saturating_mul(2) / 3).saturating_sub(4) as usize;

    let label_width = modal
        .rows
        .iter()
        .map(|row| row.label.chars().count() + 1)
        .max()
        .unwrap_or(0);

    let mut lines: Vec<Line> = Vec::new();
    for (idx, row) in modal.rows.iter().enumerate().skip(offset).take(max_rows) {
        let label = format!("{:width$} ", format!("{}:", row.label), width = label_width);
        let value = truncate_value(&row.value, max_value_width.saturating_sub(label_width + 1));
        let (label_style, value_style) = if idx == modal.selected {
            let style = selection_style(app);
            (style, style)
        } else {
            (header_text_style(app), Style::default())
        };
        lines.push(Line::from(vec![
            Span::styled(label, label_style),
            Span::styled(value, value_style),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(DETAILS_HELP));

    let title_line = Line::from(Span::styled(
        format!(" {} ", modal.title),
        header_text_style(app),
    ));
    let popup = Popup::new(Text::from(lines))
        .title(title_line)
        .border_style(border_style(app, true));

    frame.render_stateful_widget_ref(popup, area, &mut app.modal_popup);
}

fn draw_help_modal(frame: &mut Frame<'_>, area: Rect, app: &mut App) {
    if app.help_modal.is_none() {
        return;
    }

    // Calculate modal size: 2/3 width, 80% height
    let width = area.width.saturating_mul(2).saturating_div(3).max(40).min(area.width);
    let height = area.height.saturating_mul(4).saturating_div(5).max(10).min(area.height);

    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    let modal_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, modal_area);

    // Get styles before any mutable borrows
    let header_style = header_text_style(app);
    let border_s = border_style(app, true);

    let sections = app.help_entries();
    let mut lines: Vec<Line> = Vec::new();

    let content_width = width.saturating_sub(4) as usize;
    let action_width = 20usize;

    for (section_idx, section) in sections.iter().enumerate() {
        let header_text = format!(" {} ", section.title);
        let padding_total = content_width.saturating_sub(header_text.len());
        let left_pad = padding_total / 2;
        let right_pad = padding_total - left_pad;
        let header_line = format!(
            "{}{}{}",
            LINE.horizontal.repeat(left_pad),
            header_text,
            LINE.horizontal.repeat(right_pad)
        );
        lines.push(Line::from(Span::styled(header_line, header_style)));

        for entry in &section.entries {
            let action = format!("{:<width$}", entry.action, width = action_width);
            lines.push(Line::from(vec![
                Span::styled(action, Style::default()),
                Span::styled(entry.keys.clone(), header_style),
            ]));
        }

        if section_idx < sections.len() - 1 {
            lines.push(Line::from(""));
        }
    }

    let total_lines = lines.len();
    // borders (2) + footer line (1)
    let inner_height = height.saturating_sub(3) as usize;

    let Some(modal) = app.help_modal.as_mut() else {
        return;
    };
    modal.total_lines = total_lines;
    modal.viewport_height = inner_height;

    let max_scroll = modal.total_lines.saturating_sub(modal.viewport_height);
    if modal.scroll > max_scroll {
        modal.scroll = max_scroll;
    }

    let scroll = modal.scroll;
    let viewport_height = modal.viewport_height;
    let scroll_indicator = match (modal.can_scroll_up(), modal.can_scroll_down()) {
        (true, true) => "▲▼",
        (true, false) => "▲ ",
        (false, true) => " ▼",
        (false, false) => "  ",
    };

    let visible_lines: Vec<Line> = lines
        .into_iter()
        .skip(scroll)
        .take(viewport_height)
        .collect();

    let title = Line::from(vec![
        Span::styled(" HELP ", header_style),
        Span::styled(scroll_indicator, header_style),
    ]);

    let footer = Line::from(Span::styled(
        format!(" {} ", HELP_MODAL_FOOTER),
        header_style,
    ));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_s)
        .title(title)
        .title_bottom(footer)
        .title_alignment(Alignment::Center);

    let inner = block.inner(modal_area);
    frame.render_widget(block, modal_area);
    frame.render_widget(Paragraph::new(visible_lines), inner);
}

fn draw_footer(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let hint = if app.details_modal.is_some() {
        DETAILS_HELP
    } else {
        match app.focus {
            Focus::Search => SEARCH_HELP,
            Focus::Alphabet => ALPHABET_HELP,
            Focus::Results => RESULTS_HELP,
        }
    };
    let message = match &app.status {
        Some(status) => format!("{}  |  {}", status, hint),
        None => hint.to_string(),
    };

    let colors = app.ui_colors();
    let style = Style::default()
        .fg(color(colors.status_fg))
        .bg(color(colors.status_bg));

    let background = Block::default().style(Style::default().bg(color(colors.status_bg)));
    frame.render_widget(background, area);

    frame.render_widget(Paragraph::new(message).style(style), area);
}

fn truncate_value(value: &str, max_chars: usize) -> String {
    let single_line = value.replace('\n', " ");
    if max_chars == 0 || single_line.chars().count() <= max_chars {
        return single_line;
    }
    let mut out: String = single_line.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn selection_style(app: &App) -> Style {
    let colors = app.ui_colors();
    Style::default()
        .fg(color(colors.selection_fg))
        .bg(color(colors.selection_bg))
}

fn highlight_style(app: &App) -> Style {
    let colors = app.ui_colors();
    Style::default()
        .fg(color(colors.highlight_fg))
        .bg(color(colors.highlight_bg))
}

fn border_style(app: &App, active: bool) -> Style {
    let colors = app.ui_colors();
    let style = Style::default().fg(color(colors.border));
    if active {
        style.add_modifier(Modifier::BOLD)
    } else {
        style.add_modifier(Modifier::DIM)
    }
}

fn header_text_style(app: &App) -> Style {
    let colors = app.ui_colors();
    Style::default().fg(color(colors.separator))
}

fn separator_style(app: &App) -> Style {
    let colors = app.ui_colors();
    Style::default().fg(color(colors.separator)).add_modifier(Modifier::DIM)
}

fn render_centered_words(frame: &mut Frame<'_>, area: Rect, text: &str) {
    if area.width == 0 || area.height == 0 {
        return;
    }

    let mut lines: Vec<Line> = text
        .split_whitespace()
        .map(|word| Line::from(word.to_string()))
        .collect();

    if lines.is_empty() {
        return;
    }

    if lines.len() as u16 > area.height {
        lines.truncate(area.height as usize);
    }

    let height = lines.len() as u16;
    let start_y = area.y + (area.height.saturating_sub(height)) / 2;
    let target = Rect {
        x: area.x,
        y: start_y,
        width: area.width,
        height,
    };

    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), target);
}

fn color(rgb: RgbColor) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_value() {
        assert_eq!(truncate_value("short", 10), "short");
        assert_eq!(truncate_value("a\nb", 10), "a b");
        assert_eq!(truncate_value("abcdefghij", 5), "abcd…");
        assert_eq!(truncate_value("abc", 0), "abc");
    }
}
