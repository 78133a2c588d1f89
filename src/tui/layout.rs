use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::config::ColorConfig;
use crate::tui::app::{Prompt, TuiApp};

pub fn render(frame: &mut Frame, app: &mut TuiApp, colors: &ColorConfig) {
    if app.maximized {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(10),   // Detail pane (full height)
                Constraint::Length(1), // Status bar
            ])
            .split(frame.area());

        render_detail_pane(frame, app, chunks[0], colors);
        render_status_bar(frame, app, chunks[1], colors);
    } else {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(60), // Items pane
                Constraint::Min(8),         // Detail pane
                Constraint::Length(1),      // Status bar
            ])
            .split(frame.area());

        render_items_pane(frame, app, chunks[0], colors);
        render_detail_pane(frame, app, chunks[1], colors);
        render_status_bar(frame, app, chunks[2], colors);
    }
}

fn render_items_pane(frame: &mut Frame, app: &mut TuiApp, area: Rect, colors: &ColorConfig) {
    let items: Vec<ListItem> = app
        .items
        .iter()
        .map(|item| {
            let marker = if item.favorited { "★" } else { " " };
            let mut spans = vec![
                Span::styled(marker, Style::default().fg(colors.favorite)),
                Span::raw(" "),
                Span::styled(item.display_title(), Style::default().fg(colors.title)),
            ];
            if let Some(domain) = item.domain() {
                spans.push(Span::styled(
                    format!("  {}", domain),
                    Style::default().fg(colors.domain),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let count = app
        .count
        .map(|c| c.to_string())
        .unwrap_or_else(|| "?".to_string());
    let title = format!(
        " {} ({}) [{}/{}] ",
        app.view.title(),
        count,
        (app.item_index + 1).min(app.items.len()),
        app.items.len()
    );

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.active_border));

    if app.items.is_empty() {
        let text = if app.empty {
            "Nothing here yet"
        } else if app.is_refreshing {
            "Synchronizing..."
        } else {
            "Press R to synchronize"
        };
        frame.render_widget(Paragraph::new(text).block(block), area);
        return;
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(colors.selection_bg)
                .fg(colors.selection_fg)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.item_list_state);
}

fn render_detail_pane(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let border_style = if app.maximized {
        Style::default().fg(colors.active_border)
    } else {
        Style::default().fg(colors.inactive_border)
    };

    let content = match app.selected_item() {
        Some(item) => {
            let mut lines = vec![
                Line::from(Span::styled(
                    item.display_title(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    format!("Added: {}", item.added_at.format("%Y-%m-%d %H:%M")),
                    Style::default().fg(colors.date),
                )),
                Line::from(Span::styled(
                    format!("Link: {}", item.url),
                    Style::default().fg(colors.link),
                )),
            ];
            if !item.tags.is_empty() {
                lines.push(Line::from(Span::styled(
                    format!("Tags: {}", item.tags_label()),
                    Style::default().fg(colors.tags),
                )));
            }
            if item.favorited {
                lines.push(Line::from(Span::styled(
                    "★ Favorite",
                    Style::default().fg(colors.favorite),
                )));
            }
            if let Some(excerpt) = &item.excerpt {
                lines.push(Line::from(""));
                lines.extend(excerpt.lines().map(|l| Line::from(l.to_string())));
            }
            Text::from(lines)
        }
        None => Text::from("No item selected"),
    };

    let block = Block::default()
        .title(" Details ")
        .borders(Borders::ALL)
        .border_style(border_style);

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.preview_scroll, 0));

    frame.render_widget(paragraph, area);
}

fn render_status_bar(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let status = match &app.prompt {
        Some(Prompt::ConfirmDelete { title, .. }) => format!("Delete \"{}\"? (y/n)", title),
        Some(Prompt::EditTags { input, .. }) => format!("Tags (comma separated): {}_", input),
        Some(Prompt::AddUrl { input }) => format!("Add url: {}_", input),
        None => match &app.status_message {
            Some(msg) => msg.clone(),
            None if app.maximized => "j/k:Scroll  m:Exit maximize  q:Quit".to_string(),
            None => "j/k:Nav  Tab:View  r:Read  s:Fav  d:Delete  t:Tags  a:Add  o:Open  R:Refresh  q:Quit"
                .to_string(),
        },
    };

    let fg = if app.status_is_error && app.prompt.is_none() {
        colors.error
    } else {
        colors.status_fg
    };

    let paragraph = Paragraph::new(status).style(Style::default().fg(fg).bg(colors.status_bg));

    frame.render_widget(paragraph, area);
}
