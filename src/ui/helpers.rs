use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::theme::Theme;

pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

pub(crate) fn list_item_style(selected: bool, theme: &Theme) -> Style {
    if selected {
        Style::default()
            .fg(theme.bg)
            .bg(theme.accent)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.fg)
    }
}

pub(crate) fn themed_block(theme: &Theme) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .style(Style::default().bg(theme.bg_alt))
        .border_style(Style::default().fg(theme.accent))
}

/// Truncates or pads `s` so it occupies exactly `width` terminal columns.
pub(crate) fn fit_width(s: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push_str(&" ".repeat(width - used));
    out
}

/// Display columns taken by the first `chars` characters of `line`, with
/// tabs expanded to four columns.
pub(crate) fn display_col(line: &str, chars: usize) -> usize {
    line.chars()
        .take(chars)
        .map(crate::util::char_cols)
        .sum()
}

/// Lays toolbar labels out left to right, one column apart, dropping the
/// ones that no longer fit in `area`.
pub(crate) fn toolbar_slots<T: Copy>(area: Rect, labels: &[(String, T)]) -> Vec<(Rect, T)> {
    let mut slots = Vec::new();
    let mut x = area.x;
    for (label, action) in labels {
        let w = u16::try_from(label.width() + 2).unwrap_or(u16::MAX);
        if x.saturating_add(w) > area.right() {
            break;
        }
        slots.push((Rect::new(x, area.y, w, 1), *action));
        x = x.saturating_add(w + 1);
    }
    slots
}
