use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Clear, List, ListItem, Paragraph, Wrap};
use unicode_width::UnicodeWidthStr;

use crate::app::App;
use crate::types::PendingAction;

use super::helpers::{centered_rect, display_col, fit_width, list_item_style, themed_block};

/// Draws the suggestion list just below the caret. `caret` is the screen
/// position of the cursor inside the editor.
pub(crate) fn render_suggestions_popup(app: &mut App, frame: &mut Frame<'_>, caret: (u16, u16)) {
    let Some(current) = app.session.suggestions.current.as_ref() else {
        app.rects.suggestions = Rect::default();
        return;
    };
    let theme = app.active_theme().clone();
    let labels: Vec<String> = (0..current.candidates.len())
        .filter_map(|idx| current.label(idx))
        .collect();
    let title = format!("{} suggestions", current.kind.label());
    let label_w = labels.iter().map(|l| l.width()).max().unwrap_or(0);
    let width = (label_w.max(title.width()) + 4) as u16;
    let visible = labels.len().min(App::MAX_SUGGESTIONS_SHOWN);
    let height = visible as u16 + 2;

    let screen = frame.area();
    let x = caret.0.min(screen.width.saturating_sub(width));
    let below = caret.1.saturating_add(1);
    let y = if below.saturating_add(height) <= screen.height {
        below
    } else {
        caret.1.saturating_sub(height)
    };
    let area = Rect::new(x, y, width.min(screen.width), height.min(screen.height));
    app.rects.suggestions = area;
    frame.render_widget(Clear, area);

    let offset = app.suggestions_offset();
    let inner_w = width.saturating_sub(2) as usize;
    let items: Vec<ListItem> = labels
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(idx, label)| {
            let style = list_item_style(idx == app.session.suggestions.index, &theme);
            ListItem::new(Line::from(Span::styled(
                fit_width(&format!(" {label}"), inner_w),
                style,
            )))
        })
        .collect();
    let list = List::new(items).block(themed_block(&theme).title(title));
    frame.render_widget(list, area);
}

pub(crate) fn render_prompt(app: &mut App, frame: &mut Frame<'_>) {
    let Some(prompt) = app.prompt.as_ref() else {
        return;
    };
    let title = prompt.title.clone();
    let value = prompt.value.clone();
    let cursor_pos = prompt.cursor;
    let theme = app.active_theme().clone();
    let area = centered_rect(60, 20, frame.area());
    let area = Rect::new(area.x, area.y, area.width, area.height.min(3));
    app.rects.prompt = area;
    frame.render_widget(Clear, area);
    let cursor_offset = display_col(&value, cursor_pos) as u16;
    let input = Paragraph::new(value).block(
        themed_block(&theme)
            .title(title.as_str())
            .border_style(Style::default().fg(theme.accent))
            .style(Style::default().bg(theme.bg_alt).fg(theme.fg)),
    );
    frame.render_widget(input, area);
    let cursor_x = area.x + 1 + cursor_offset;
    let cursor_y = area.y + 1;
    if cursor_x < area.right() {
        frame.set_cursor_position((cursor_x, cursor_y));
    }
}

fn render_dialog(
    area: Rect,
    title: &str,
    text: String,
    theme: &crate::theme::Theme,
    frame: &mut Frame<'_>,
) {
    frame.render_widget(Clear, area);
    let body = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(theme.fg).bg(theme.bg_alt))
        .block(themed_block(theme).title(title));
    frame.render_widget(body, area);
}

pub(crate) fn render_delete_prompt(app: &mut App, frame: &mut Frame<'_>) {
    let PendingAction::Delete(name) = &app.pending else {
        return;
    };
    let theme = app.active_theme();
    let area = centered_rect(50, 30, frame.area());
    let text = [
        format!("Delete {name}?"),
        String::new(),
        "Enter or Y: Confirm delete".to_string(),
        "Esc or N: Cancel".to_string(),
    ]
    .join("\n");
    render_dialog(area, "Confirm Delete", text, theme, frame);
}
