//! Rendering for the shell screens

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table, Tabs,
};

use crate::merge::{MergeError, MergedTable};

use super::app::{App, RequestState, display_name};

pub fn draw(frame: &mut Frame, app: &App) {
    match app.screen {
        super::app::Screen::Picker => draw_picker(frame, app),
        super::app::Screen::Results => draw_results(frame, app),
    }
}

fn draw_picker(frame: &mut Frame, app: &App) {
    let [main, filter, footer] = Layout::vertical([
        Constraint::Min(3),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    let [browser, upload] =
        Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)]).areas(main);

    draw_browser(frame, app, browser);
    draw_upload_list(frame, app, upload);

    let filter_line = if app.filter_active || !app.picker.filter.is_empty() {
        Line::from(vec![
            Span::styled("filter: ", Style::default().fg(Color::DarkGray)),
            Span::raw(app.picker.filter.clone()),
            Span::styled(
                if app.filter_active { "▏" } else { "" },
                Style::default().fg(Color::Yellow),
            ),
        ])
    } else {
        Line::from(Span::styled(
            "/ to filter",
            Style::default().fg(Color::DarkGray),
        ))
    };
    frame.render_widget(Paragraph::new(filter_line), filter);

    let help = "enter add/open · tab upload list · backspace up · m merge · q quit";
    draw_footer(frame, app, footer, help);
}

fn draw_browser(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .picker
        .visible()
        .iter()
        .map(|entry| {
            if entry.is_dir {
                ListItem::new(Line::from(Span::styled(
                    format!("{}/", entry.name),
                    Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
                )))
            } else {
                let mark = if app.selected.iter().any(|p| p == &entry.path) {
                    "✓ "
                } else {
                    "  "
                };
                ListItem::new(Line::from(vec![
                    Span::styled(mark, Style::default().fg(Color::Green)),
                    Span::raw(entry.name.clone()),
                    Span::styled(
                        format!("  {}", human_size(entry.size)),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]))
            }
        })
        .collect();

    let border_style = if app.list_focused {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::Cyan)
    };
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(format!(" {} ", app.picker.cwd.display())),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = ListState::default();
    if !app.picker.visible().is_empty() && !app.list_focused {
        state.select(Some(app.picker.cursor));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_upload_list(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .selected
        .iter()
        .map(|path| ListItem::new(display_name(path)))
        .collect();

    let border_style = if app.list_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(format!(" upload list ({}) ", app.selected.len())),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = ListState::default();
    if !app.selected.is_empty() && app.list_focused {
        state.select(Some(app.list_cursor));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_results(frame: &mut Frame, app: &App) {
    let errors = app.file_errors();
    let error_height = if errors.is_empty() {
        0
    } else {
        errors.len().min(5) as u16 + 2
    };

    let [summary, error_area, tabs_area, table_area, footer] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(error_height),
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    let (summary_line, help) = match &app.request {
        Some(RequestState::Done(outcome)) => (
            Line::from(Span::styled(
                format!(
                    "merged {} sheet(s), s saves {}",
                    outcome.tables.len(),
                    outcome.filename
                ),
                Style::default().fg(Color::Green),
            )),
            "←/→ sheet · s save · r reset · q quit",
        ),
        Some(RequestState::Failed(err)) => {
            let color = match err {
                MergeError::NoMergeableData { .. } => Color::Yellow,
                MergeError::Serialize { .. } => Color::Red,
            };
            (
                Line::from(Span::styled(err.to_string(), Style::default().fg(color))),
                "r reset · q quit",
            )
        }
        None => (Line::from(""), "r reset · q quit"),
    };
    frame.render_widget(Paragraph::new(summary_line), summary);

    if !errors.is_empty() {
        let items: Vec<ListItem> = errors
            .iter()
            .map(|e| {
                ListItem::new(Line::from(Span::styled(
                    e.to_string(),
                    Style::default().fg(Color::Red),
                )))
            })
            .collect();
        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" skipped files ({}) ", errors.len())),
        );
        frame.render_widget(list, error_area);
    }

    if let Some(RequestState::Done(outcome)) = &app.request {
        let titles: Vec<String> = outcome.tables.iter().map(|t| t.name.clone()).collect();
        let tabs = Tabs::new(titles)
            .select(app.active_table)
            .highlight_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, tabs_area);

        if let Some(table) = outcome.tables.get(app.active_table) {
            draw_preview(frame, table, app.options.preview_rows, table_area);
        }
    }

    draw_footer(frame, app, footer, help);
}

fn draw_preview(frame: &mut Frame, table: &MergedTable, preview_rows: usize, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(format!(
        " {}: {} row(s), showing {} ",
        table.name,
        table.rows.len(),
        table.preview(preview_rows).len()
    ));

    if table.columns.is_empty() {
        frame.render_widget(
            Paragraph::new("(no columns)")
                .style(Style::default().fg(Color::DarkGray))
                .block(block),
            area,
        );
        return;
    }

    let header = Row::new(table.columns.clone())
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows: Vec<Row> = table
        .preview(preview_rows)
        .iter()
        .map(|row| {
            Row::new(
                row.iter()
                    .map(|value| {
                        if value.is_empty() {
                            Cell::from(Span::styled("·", Style::default().fg(Color::DarkGray)))
                        } else {
                            Cell::from(value.to_string())
                        }
                    })
                    .collect::<Vec<_>>(),
            )
        })
        .collect();
    let widths = vec![Constraint::Fill(1); table.columns.len()];

    frame.render_widget(Table::new(rows, widths).header(header).block(block), area);
}

fn draw_footer(frame: &mut Frame, app: &App, area: Rect, help: &str) {
    let line = match &app.status {
        Some(status) => Line::from(Span::styled(
            status.clone(),
            Style::default().fg(Color::Yellow),
        )),
        None => Line::from(Span::styled(help, Style::default().fg(Color::DarkGray))),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn human_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
