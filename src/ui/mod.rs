mod helpers;
mod overlays;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};

use crate::app::App;
use crate::preview::compose_document;
use crate::theme::Theme;
use crate::types::{Focus, PendingAction, SearchField};
use helpers::{display_col, fit_width, toolbar_slots};
use overlays::*;

pub(crate) fn draw(app: &mut App, frame: &mut Frame<'_>) {
    let theme = app.active_theme().clone();
    let size = frame.area();
    frame.render_widget(
        Block::default().style(Style::default().bg(theme.bg).fg(theme.fg)),
        size,
    );
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(size);

    draw_toolbar(app, frame, vertical[0], &theme);

    if app.preview_fullscreen {
        app.rects.files = Rect::default();
        app.rects.editor = Rect::default();
        app.rects.search = Rect::default();
        app.rects.preview = vertical[1];
    } else {
        let main = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(App::FILES_PANE_WIDTH),
                Constraint::Min(20),
                Constraint::Percentage(40),
            ])
            .split(vertical[1]);
        app.rects.files = main[0];
        app.rects.preview = main[2];
        if app.session.search.open {
            let column = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(3), Constraint::Min(3)])
                .split(main[1]);
            app.rects.search = column[0];
            app.rects.editor = column[1];
        } else {
            app.rects.search = Rect::default();
            app.rects.editor = main[1];
        }
    }

    let mut caret = None;
    if !app.preview_fullscreen {
        draw_files(app, frame, &theme);
        if app.session.search.open {
            draw_search(app, frame, &theme);
        }
        caret = draw_editor(app, frame, &theme);
    }
    draw_preview(app, frame, &theme);
    draw_status(app, frame, vertical[2], &theme);

    match caret {
        Some(caret) if app.session.suggestions.is_open() => {
            render_suggestions_popup(app, frame, caret);
        }
        _ => app.rects.suggestions = Rect::default(),
    }
    if app.prompt.is_some() {
        render_prompt(app, frame);
    }
    if matches!(app.pending, PendingAction::Delete(_)) {
        render_delete_prompt(app, frame);
    }
}

fn pane_block(title: Line<'static>, focused: bool, theme: &Theme) -> Block<'static> {
    let border = if focused { theme.accent } else { theme.border };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .style(Style::default().bg(theme.bg_alt).fg(theme.fg))
}

fn draw_toolbar(app: &mut App, frame: &mut Frame<'_>, area: Rect, theme: &Theme) {
    let labels = App::toolbar_actions();
    app.rects.toolbar = toolbar_slots(area, &labels);
    let bar = Paragraph::new("").style(Style::default().bg(theme.bg_alt));
    frame.render_widget(bar, area);
    for ((label, _), (rect, _)) in labels.iter().zip(app.rects.toolbar.iter()) {
        let button = Paragraph::new(format!(" {label} ")).style(
            Style::default()
                .fg(theme.fg)
                .bg(theme.selection)
                .add_modifier(Modifier::BOLD),
        );
        frame.render_widget(button, *rect);
    }
}

fn draw_files(app: &mut App, frame: &mut Frame<'_>, theme: &Theme) {
    let area = app.rects.files;
    let inner_w = area.width.saturating_sub(2) as usize;
    let name_w = inner_w.saturating_sub(5);
    let active = app.session.active_file().to_string();
    let deletable: Vec<&str> = app.session.deletable_files().collect();
    let items: Vec<ListItem> = app
        .file_names()
        .iter()
        .map(|name| {
            let is_active = *name == active;
            let marker = if is_active { "▸ " } else { "  " };
            let delete = if deletable.contains(&name.as_str()) {
                " × "
            } else {
                "   "
            };
            let style = if is_active {
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.fg)
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{marker}{}", fit_width(name, name_w)), style),
                Span::styled(delete, Style::default().fg(theme.error)),
            ]))
        })
        .collect();
    let mut state = ListState::default();
    if app.focus == Focus::Files {
        state.select(Some(app.files_selected));
    }
    let list = List::new(items)
        .highlight_style(Style::default().bg(theme.selection))
        .block(pane_block(
            Line::from("Files"),
            app.focus == Focus::Files,
            theme,
        ));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_search(app: &mut App, frame: &mut Frame<'_>, theme: &Theme) {
    let area = app.rects.search;
    let block = pane_block(
        Line::from("Find / Replace"),
        app.focus == Focus::Search,
        theme,
    );
    let inner = block.inner(area);
    frame.render_widget(block, area);
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(inner);
    let search = &app.session.search;
    let fields = [
        ("Find: ", &search.find, SearchField::Find),
        ("Replace: ", &search.replace, SearchField::Replace),
    ];
    for (rect, (label, value, field)) in halves.iter().zip(fields) {
        let active = search.field == field;
        let label_style = if active {
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.fg_muted)
        };
        let line = Line::from(vec![
            Span::styled(label, label_style),
            Span::styled(value.clone(), Style::default().fg(theme.fg)),
        ]);
        frame.render_widget(Paragraph::new(line), *rect);
        if active && app.focus == Focus::Search {
            let x = rect.x + (label.len() + display_col(value, usize::MAX)) as u16;
            if x < rect.right() {
                frame.set_cursor_position((x, rect.y));
            }
        }
    }
}

/// Renders the editor pane and returns the caret's screen position when it
/// is visible.
fn draw_editor(app: &mut App, frame: &mut Frame<'_>, theme: &Theme) -> Option<(u16, u16)> {
    let area = app.rects.editor;
    let kind = app.session.active_kind();
    let title = Line::from(vec![
        Span::styled(
            app.session.active_file().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" [{}]", kind.label()), Style::default().fg(theme.fg_muted)),
    ]);
    frame.render_widget(pane_block(title, app.focus == Focus::Editor, theme), area);
    let inner = Rect::new(
        area.x.saturating_add(1),
        area.y.saturating_add(1),
        area.width.saturating_sub(2),
        area.height.saturating_sub(2),
    );
    frame.render_widget(Clear, inner);

    let lines = app.editor.lines();
    let (cursor_row, cursor_col) = app.editor.cursor();
    let start_row = app.editor_scroll_row.min(lines.len().saturating_sub(1));
    let visible_rows = inner.height as usize;
    let content_w = inner.width.saturating_sub(App::EDITOR_GUTTER_WIDTH) as usize;

    let mut out: Vec<Line> = Vec::with_capacity(visible_rows);
    for row in start_row..(start_row + visible_rows).min(lines.len()) {
        let number_style = if row == cursor_row {
            Style::default().fg(theme.accent)
        } else {
            Style::default().fg(theme.fg_muted)
        };
        let text = lines[row].replace('\t', "    ");
        let bg = if row == cursor_row { theme.bg_alt } else { theme.bg };
        out.push(Line::from(vec![
            Span::styled(format!("{:>5} ", row + 1), number_style),
            Span::styled(fit_width(&text, content_w), Style::default().bg(bg)),
        ]));
    }
    frame.render_widget(
        Paragraph::new(out).style(Style::default().bg(theme.bg).fg(theme.fg)),
        inner,
    );

    if cursor_row < start_row || cursor_row >= start_row + visible_rows {
        return None;
    }
    let col = display_col(&lines[cursor_row], cursor_col).min(content_w.saturating_sub(1));
    let caret = (
        inner.x + App::EDITOR_GUTTER_WIDTH + col as u16,
        inner.y + (cursor_row - start_row) as u16,
    );
    if app.focus == Focus::Editor && app.prompt.is_none() {
        frame.set_cursor_position(caret);
    }
    Some(caret)
}

fn draw_preview(app: &mut App, frame: &mut Frame<'_>, theme: &Theme) {
    let area = app.rects.preview;
    let document = compose_document(app.session.project());
    let max_scroll = document.lines().count().saturating_sub(1);
    app.preview_scroll = app.preview_scroll.min(max_scroll as u16);
    let status = app.session.preview_status();
    let status_style = if status.is_error() {
        Style::default().fg(theme.error)
    } else {
        Style::default().fg(theme.fg_muted)
    };
    let title = Line::from(vec![
        Span::raw(if app.preview_fullscreen {
            "Preview (F11 restore) "
        } else {
            "Preview "
        }),
        Span::styled(status.message(), status_style),
    ]);
    let body = Paragraph::new(document)
        .wrap(Wrap { trim: false })
        .scroll((app.preview_scroll, 0))
        .style(Style::default().fg(theme.fg).bg(theme.bg))
        .block(pane_block(title, false, theme));
    frame.render_widget(body, area);
}

fn draw_status(app: &App, frame: &mut Frame<'_>, area: Rect, theme: &Theme) {
    let preview = app.session.preview_status();
    let preview_style = if preview.is_error() {
        Style::default()
            .fg(theme.error)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.fg_muted)
    };
    let line = Line::from(vec![
        Span::styled(preview.message(), preview_style),
        Span::styled("  |  ", Style::default().fg(theme.border)),
        Span::styled(app.status.clone(), Style::default().fg(theme.fg)),
        Span::styled(
            "   ^N new  ^D delete  ^F find  ^S download  ^B files  ^T theme  ^Q quit",
            Style::default().fg(theme.fg_muted),
        ),
    ]);
    let status = Paragraph::new(line)
        .style(Style::default().bg(theme.bg_alt))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border)),
        );
    frame.render_widget(status, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use tempfile::tempdir;

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn draw_lays_out_panes_and_lists_files() {
        let tmp = tempdir().expect("tempdir");
        let mut app = App::new(tmp.path().join("state"), tmp.path().join("out")).expect("app");
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).expect("terminal");
        terminal.draw(|f| draw(&mut app, f)).expect("draw");

        assert_eq!(app.rects.files.width, App::FILES_PANE_WIDTH);
        assert!(app.rects.editor.width > 0);
        assert!(app.rects.preview.width > 0);
        assert_eq!(app.rects.toolbar.len(), App::toolbar_actions().len());
        let text = buffer_text(&terminal);
        assert!(text.contains("index.html"));
        assert!(text.contains("style.css"));
        assert!(text.contains("Ready."));
    }

    #[test]
    fn fullscreen_gives_preview_the_whole_body() {
        let tmp = tempdir().expect("tempdir");
        let mut app = App::new(tmp.path().join("state"), tmp.path().join("out")).expect("app");
        app.toggle_preview_fullscreen();
        let mut terminal = Terminal::new(TestBackend::new(100, 24)).expect("terminal");
        terminal.draw(|f| draw(&mut app, f)).expect("draw");
        assert_eq!(app.rects.preview.width, 100);
        assert_eq!(app.rects.editor, Rect::default());
    }

    #[test]
    fn suggestion_popup_is_placed_and_clickable_area_recorded() {
        let tmp = tempdir().expect("tempdir");
        let mut app = App::new(tmp.path().join("state"), tmp.path().join("out")).expect("app");
        app.session.edit("<sp".to_string(), 3).expect("edit");
        app.load_editor_from_session();
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).expect("terminal");
        terminal.draw(|f| draw(&mut app, f)).expect("draw");
        assert!(app.rects.suggestions.height >= 3);
        assert!(buffer_text(&terminal).contains("<span>"));
    }
}
