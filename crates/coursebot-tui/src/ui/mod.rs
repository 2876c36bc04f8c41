//! TUI rendering

use crate::app::App;
use coursebot_core::{ChatState, Role};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub fn render(frame: &mut Frame, app: &App) {
    let banner_height = if app.chat.error().is_some() { 1 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(banner_height),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_messages(frame, app, chunks[0]);
    render_banner(frame, app, chunks[1]);
    render_input(frame, app, chunks[2]);
    render_status(frame, app, chunks[3]);
}

fn push_entry(lines: &mut Vec<Line<'static>>, role: Role, content: &str) {
    let (label, color) = match role {
        Role::User => ("You", Color::Cyan),
        Role::Assistant => ("RMITbot", Color::Green),
    };
    lines.push(Line::from(Span::styled(
        format!("{}:", label),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )));
    lines.extend(content.lines().map(|line| Line::raw(line.to_string())));
    lines.push(Line::raw(""));
}

/// Conversation lines, including a submitted message not yet moved into the display
fn message_lines(app: &App) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for message in app.chat.display() {
        push_entry(&mut lines, message.role, &message.content);
    }
    if let ChatState::Submitted { text } = app.current_state() {
        push_entry(&mut lines, Role::User, &text);
    }
    lines
}

/// Rows a set of lines occupies once wrapped to `width`
fn wrapped_height(lines: &[Line], width: u16) -> usize {
    let width = width.max(1) as usize;
    lines
        .iter()
        .map(|line| line.width().max(1).div_ceil(width))
        .sum()
}

fn render_messages(frame: &mut Frame, app: &App, area: Rect) {
    let lines = message_lines(app);
    let inner_height = area.height.saturating_sub(2) as usize;
    let total = wrapped_height(&lines, area.width.saturating_sub(2));
    let bottom = total.saturating_sub(inner_height);
    let offset = bottom.saturating_sub(app.scroll_back);

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" RMITbot "))
        .wrap(Wrap { trim: false })
        .scroll((offset.min(u16::MAX as usize) as u16, 0));

    frame.render_widget(paragraph, area);
}

fn render_banner(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(error) = app.chat.error() {
        let banner = Paragraph::new(error).style(
            Style::default()
                .fg(Color::White)
                .bg(Color::Red)
                .add_modifier(Modifier::BOLD),
        );
        frame.render_widget(banner, area);
    }
}

fn render_input(frame: &mut Frame, app: &App, area: Rect) {
    let style = if app.is_busy() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::Yellow)
    };
    let (offset, cursor_x) = input_view(app, area.width.saturating_sub(2));
    let input = Paragraph::new(app.input.as_str())
        .style(style)
        .scroll((0, offset))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Ask about RMIT courses "),
        );

    frame.render_widget(input, area);

    if !app.is_busy() {
        frame.set_cursor_position((area.x + 1 + cursor_x, area.y + 1));
    }
}

/// Horizontal scroll and cursor column for an input box `inner_width` cells wide
fn input_view(app: &App, inner_width: u16) -> (u16, u16) {
    let before: String = app.input.chars().take(app.cursor_pos).collect();
    let column = Span::raw(before).width().min(u16::MAX as usize) as u16;
    let last = inner_width.saturating_sub(1);
    let offset = column.saturating_sub(last);
    (offset, column - offset)
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let status = match app.current_state() {
        ChatState::Idle => "Enter: send | Up/Down: scroll | Esc: quit".to_string(),
        ChatState::Submitted { .. } | ChatState::Answering { .. } => {
            format!("{} Generating advice...", SPINNER[app.tick % SPINNER.len()])
        }
    };

    let paragraph = Paragraph::new(status).style(Style::default().fg(Color::DarkGray));

    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::app;

    fn rendered(app: &App) -> Vec<String> {
        message_lines(app)
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_submitted_message_is_shown_with_spinner() {
        let mut app = app();
        for c in "I like biology".chars() {
            app.insert_char(c);
        }
        app.submit();
        assert!(app.is_busy());

        let lines = rendered(&app);
        let you = lines.iter().position(|l| l == "You:").unwrap();
        assert_eq!(lines[you + 1], "I like biology");
    }

    #[tokio::test]
    async fn test_answered_message_is_not_repeated() {
        let mut app = app();
        for c in "design".chars() {
            app.insert_char(c);
        }
        app.submit();
        app.respond().await;

        let lines = rendered(&app);
        assert_eq!(lines.iter().filter(|l| *l == "You:").count(), 1);
        assert_eq!(lines.iter().filter(|l| *l == "design").count(), 1);
    }

    #[test]
    fn test_cursor_stays_inside_input_box() {
        let mut app = app();
        assert_eq!(input_view(&app, 10), (0, 0));

        for c in "abcdef".chars() {
            app.insert_char(c);
        }
        assert_eq!(input_view(&app, 10), (0, 6));

        for c in "ghijklmnop".chars() {
            app.insert_char(c);
        }
        let (offset, cursor) = input_view(&app, 10);
        assert_eq!(cursor, 9);
        assert_eq!(offset, 7);

        app.cursor_pos = 0;
        assert_eq!(input_view(&app, 10), (0, 0));
    }

    #[test]
    fn test_cursor_counts_wide_characters() {
        let mut app = app();
        for c in "日本".chars() {
            app.insert_char(c);
        }
        assert_eq!(input_view(&app, 20), (0, 4));
    }
}
