//! Blog Admin TUI - actor-based admin panel for a REST blog backend
//!
//! Architecture:
//! - UI Layer (Ratatui) - synchronous terminal rendering
//! - App Layer - central state machine processing events
//! - Network Layer (Tokio) - async gateway calls

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::*, widgets::*};
use tokio::sync::mpsc;

use blog_admin::app::{Dialog, ListPhase};
use blog_admin::app::state::ComposeDialog;
use blog_admin::constants::APP_NAME;
use blog_admin::messages::ui_events::key_to_ui_event;
use blog_admin::models::FormField;
use blog_admin::ui::{category_color, preview, severity_color, strip_html};
use blog_admin::{
    AppActor, BlogRecord, Config, HttpGateway, NetworkActor, NetworkCommand, NetworkResponse,
    RenderState, UiEvent,
};

/// Terminal cleanup guard
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;

    // Initialize logging to file; the terminal belongs to the UI
    let file_appender = tracing_appender::rolling::never(".", &config.log_file);
    let (non_blocking, _log_guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();

    let gateway = HttpGateway::new(&config)?;
    let backend = gateway.collection_url().to_string();
    tracing::info!(backend = %backend, timeout_secs = ?config.timeout_secs, "Starting");

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let _guard = TerminalGuard;

    let backend_term = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend_term)?;

    // Create channels
    let (ui_tx, ui_rx) = mpsc::unbounded_channel::<UiEvent>();
    let (net_cmd_tx, net_cmd_rx) = mpsc::unbounded_channel::<NetworkCommand>();
    let (net_resp_tx, net_resp_rx) = mpsc::unbounded_channel::<NetworkResponse>();
    let (render_tx, mut render_rx) = mpsc::unbounded_channel::<RenderState>();

    // Spawn network actor
    let network_actor = NetworkActor::new(Arc::new(gateway), net_resp_tx);
    let network_handle = tokio::spawn(network_actor.run(net_cmd_rx));

    // Spawn app actor
    let app_actor = AppActor::new(backend, net_cmd_tx, render_tx);
    let app_handle = tokio::spawn(app_actor.run(ui_rx, net_resp_rx));

    // Run UI loop (synchronous with async polling)
    run_ui_loop(&mut terminal, ui_tx, &mut render_rx).await?;

    // Let in-flight calls be cancelled before the runtime goes away
    let _ = app_handle.await;
    let _ = network_handle.await;

    Ok(())
}

/// Run the synchronous UI rendering loop
async fn run_ui_loop(
    terminal: &mut Terminal<impl Backend>,
    ui_tx: mpsc::UnboundedSender<UiEvent>,
    render_rx: &mut mpsc::UnboundedReceiver<RenderState>,
) -> anyhow::Result<()> {
    let mut current_state = RenderState::default();

    loop {
        // Draw with current state
        terminal.draw(|f| draw_ui(f, &current_state))?;

        // Poll for events with timeout
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if let Some(event) = key_to_ui_event(
                    key,
                    current_state.dialog_kind(),
                    current_state.active_field(),
                ) {
                    let quit = matches!(event, UiEvent::Quit);
                    let _ = ui_tx.send(event);
                    if quit {
                        break;
                    }
                }
            }
        }

        // Check for state updates (non-blocking)
        while let Ok(state) = render_rx.try_recv() {
            current_state = state;
        }
    }

    Ok(())
}

// ============================================================================
// UI Drawing Functions
// ============================================================================

fn draw_ui(f: &mut Frame, state: &RenderState) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Table
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    draw_header(f, state, chunks[0]);

    if state.list.is_loading() && state.records.is_empty() {
        draw_loading(f, chunks[1]);
    } else {
        draw_table(f, state, chunks[1]);
    }

    draw_status_bar(f, state, chunks[2]);

    match &state.dialog {
        Dialog::None => {}
        Dialog::Compose(compose) => draw_compose_popup(f, compose, state.saving, area),
        Dialog::View(record) => draw_view_popup(f, record, area),
        Dialog::ConfirmDelete { title, .. } => draw_confirm_popup(f, title, area),
        Dialog::Help => draw_help_popup(f, area),
    }

    if let Some(notification) = &state.notification {
        draw_notification(f, &notification.message, severity_color(notification.severity), area);
    }
}

fn draw_header(f: &mut Frame, state: &RenderState, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue))
        .title(Span::styled(format!(" {} ", APP_NAME), Style::default().fg(Color::Blue).bold()));

    let line = Line::from(vec![
        Span::styled("Manage your content  ", Style::default().fg(Color::Gray)),
        Span::styled(state.backend.as_str(), Style::default().fg(Color::DarkGray)),
        Span::raw("  "),
        Span::styled("[n] Create New Blog", Style::default().fg(Color::Yellow).bold()),
    ]);

    f.render_widget(Paragraph::new(line).block(block), area);
}

fn draw_loading(f: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("[...]", Style::default().fg(Color::Blue).bold())),
        Line::from(""),
        Line::from(Span::styled(
            "Loading your amazing content...",
            Style::default().fg(Color::Gray),
        )),
    ];
    let paragraph = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(paragraph, area);
}

fn draw_table(f: &mut Frame, state: &RenderState, area: Rect) {
    let status = match &state.list {
        ListPhase::Idle => " (not loaded, r to refresh) ".to_string(),
        ListPhase::Loading { .. } => " (refreshing...) ".to_string(),
        ListPhase::Loaded => String::new(),
        ListPhase::Failed { message } => format!(" (last refresh failed: {}) ", message),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Blogs ({}){}", state.records.len(), status));

    if state.records.is_empty() {
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "No blogs available yet",
                Style::default().fg(Color::Gray).bold(),
            )),
            Line::from(Span::styled(
                "Create your first blog to get started! (press n)",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(block);
        f.render_widget(paragraph, area);
        return;
    }

    let header = Row::new(["Title", "Type", "Content Preview", "Image"])
        .style(Style::default().fg(Color::White).bg(Color::Blue).bold());

    let rows: Vec<Row> = state
        .records
        .iter()
        .enumerate()
        .map(|(i, blog)| {
            let image = if blog.image.is_some() { "[img]" } else { "-" };
            let row = Row::new(vec![
                Cell::from(blog.title.as_str()).style(Style::default().fg(Color::Cyan).bold()),
                Cell::from(blog.kind.as_str()).style(Style::default().fg(category_color(&blog.kind))),
                Cell::from(preview(&blog.content)).style(Style::default().fg(Color::Gray)),
                Cell::from(image),
            ]);
            if i % 2 == 1 {
                row.style(Style::default().bg(Color::Rgb(30, 30, 30)))
            } else {
                row
            }
        })
        .collect();

    let widths = [
        Constraint::Percentage(25),
        Constraint::Length(12),
        Constraint::Min(20),
        Constraint::Length(6),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(Style::default().fg(Color::Yellow).bold().reversed())
        .highlight_symbol("> ");

    let mut table_state = TableState::default().with_selected(Some(state.selected));
    f.render_stateful_widget(table, area, &mut table_state);
}

fn draw_status_bar(f: &mut Frame, state: &RenderState, area: Rect) {
    let status = if state.saving {
        " Saving... "
    } else if state.deleting {
        " Deleting... "
    } else if state.list.is_loading() {
        " Loading... (Ctrl+x cancel) "
    } else {
        match state.dialog {
            Dialog::Compose(_) => " Tab:next field | Ctrl+s:save | Esc:cancel ",
            Dialog::View(_) => " Esc:close ",
            Dialog::ConfirmDelete { .. } => " y:delete | n:keep ",
            _ => " n:new | e:edit | v:view | d:delete | r:refresh | ?:help | q:quit ",
        }
    };

    let bar = Paragraph::new(status).style(Style::default().fg(Color::DarkGray));
    f.render_widget(bar, area);
}

fn draw_compose_popup(f: &mut Frame, compose: &ComposeDialog, saving: bool, area: Rect) {
    let popup_area = centered_rect(70, 80, area);
    f.render_widget(Clear, popup_area);

    let title = match compose.mode.editing_id() {
        Some(_) => " Edit Blog ",
        None => " Create New Blog ",
    };
    let title = if saving { format!("{}(saving...) ", title) } else { title.to_string() };
    let outer = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .style(Style::default().bg(Color::Black));
    let inner = outer.inner(popup_area);
    f.render_widget(outer, popup_area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(3),
        ])
        .split(inner);

    for (field, row) in FormField::ALL.iter().zip(rows.iter()) {
        let focused = *field == compose.field;
        let border = if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let mut label = field.label().to_string();
        if *field == FormField::Title {
            label.push_str(" *");
        }
        let value = compose.form.field(*field);
        let style = if *field == FormField::Type {
            Style::default().fg(category_color(value))
        } else {
            Style::default()
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(format!(" {} ", label));
        let paragraph = Paragraph::new(value).style(style).block(block);
        f.render_widget(paragraph, *row);

        if focused {
            let before = &value[..compose.cursor.min(value.len())];
            let line = before.matches('\n').count() as u16;
            let col = before.rsplit('\n').next().unwrap_or("").chars().count() as u16;
            let max_x = row.x + row.width.saturating_sub(2);
            let max_y = row.y + row.height.saturating_sub(2);
            let x = (row.x + 1 + col).min(max_x);
            let y = (row.y + 1 + line).min(max_y);
            f.set_cursor_position(Position::new(x, y));
        }
    }
}

fn draw_view_popup(f: &mut Frame, record: &BlogRecord, area: Rect) {
    let popup_area = centered_rect(70, 70, area);

    let mut lines = vec![
        Line::from(Span::styled(
            format!(" {} ", record.kind),
            Style::default().fg(Color::Black).bg(category_color(&record.kind)).bold(),
        )),
        Line::from(""),
    ];
    if let Some(image) = &record.image {
        let shown = if image.starts_with("data:") {
            "[embedded image]".to_string()
        } else {
            image.clone()
        };
        lines.push(Line::from(Span::styled(
            format!("Image: {}", shown),
            Style::default().fg(Color::DarkGray),
        )));
        lines.push(Line::from(""));
    }
    lines.push(Line::from("─".repeat(popup_area.width.saturating_sub(2) as usize)));
    for text in strip_html(&record.content).lines() {
        lines.push(Line::from(Span::styled(text.to_string(), Style::default().fg(Color::Gray))));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(format!(" {} ", record.title), Style::default().bold()))
        .title_bottom(Line::from(" Esc: Close ").right_aligned())
        .style(Style::default().bg(Color::Black));

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });

    f.render_widget(Clear, popup_area);
    f.render_widget(paragraph, popup_area);
}

fn draw_confirm_popup(f: &mut Frame, title: &str, area: Rect) {
    let popup_area = centered_rect(40, 20, area);

    let text = vec![
        Line::from(""),
        Line::from("Are you sure?"),
        Line::from(Span::styled(format!("\"{}\" will be deleted.", title), Style::default().fg(Color::Gray))),
        Line::from(""),
        Line::from(Span::styled("y: Delete   n: Cancel", Style::default().fg(Color::Yellow))),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" Delete Blog ")
        .style(Style::default().bg(Color::Black));

    let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(block);

    f.render_widget(Clear, popup_area);
    f.render_widget(paragraph, popup_area);
}

fn draw_help_popup(f: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);

    let help_text = r#"
 BLOG ADMIN - Keyboard Shortcuts

 TABLE
   ↑ / ↓ (k / j)      Select blog
   n                  Create new blog
   e / Enter          Edit selected blog
   v                  View selected blog
   d                  Delete selected blog
   r                  Refresh list
   Ctrl+x             Cancel refresh
   Esc                Dismiss notification

 FORM
   Tab / Shift+Tab    Next / previous field
   Enter              Next field (newline in Content)
   Ctrl+s             Save
   Esc                Cancel

 GENERAL
   ?                  Toggle this help
   q / Ctrl+C         Quit

 Press any key to close...
"#;

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .style(Style::default().bg(Color::Black));

    let help = Paragraph::new(help_text).block(block).wrap(Wrap { trim: false });

    f.render_widget(Clear, popup_area);
    f.render_widget(help, popup_area);
}

fn draw_notification(f: &mut Frame, message: &str, color: Color, area: Rect) {
    let width = (message.chars().count() as u16 + 4).min(area.width);
    let toast = Rect {
        x: area.x,
        y: area.y + area.height.saturating_sub(4),
        width,
        height: 3.min(area.height),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .style(Style::default().bg(Color::Black));
    let paragraph = Paragraph::new(Span::styled(message, Style::default().fg(color).bold())).block(block);

    f.render_widget(Clear, toast);
    f.render_widget(paragraph, toast);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
