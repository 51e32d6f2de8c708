//! Panel rendering
//!
//! Layout (top to bottom):
//! - Header (brand + model)
//! - Source Draft | Enhanced Result, each with char/word stats
//! - Action bar (key hints, busy indicator)
//! - Toast line
//!
//! While locked the unlock modal is drawn over the workspace.

use ratatui::style::Stylize;
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};

use crate::session::PromptStats;
use crate::ui::input::render_help;
use crate::ui::state::App;

const BRAND: &str = "PromptAlchemy";
const TAGLINE: &str = "Transmute your ideas";

/// Render one frame
///
/// Records the enhanced pane's text area on `app` first so scrolling is
/// bounded by what is actually on screen.
pub fn render<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> std::io::Result<()> {
    terminal.draw(|f| {
        app.set_enhanced_viewport(enhanced_text_area(f.area()));
        draw_ui(f, app);
    })?;
    Ok(())
}

struct Areas {
    header: Rect,
    draft: Rect,
    enhanced: Rect,
    action_bar: Rect,
    toast: Rect,
}

fn areas(area: Rect) -> Areas {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);
    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);
    Areas {
        header: chunks[0],
        draft: panes[0],
        enhanced: panes[1],
        action_bar: chunks[2],
        toast: chunks[3],
    }
}

/// Text area inside the enhanced pane's border, for a frame of `area`
pub fn enhanced_text_area(area: Rect) -> Rect {
    Block::default()
        .borders(Borders::ALL)
        .inner(areas(area).enhanced)
}

/// Rows `text` occupies in the enhanced pane when wrapped to `width`
pub fn enhanced_line_count(text: &str, width: u16) -> usize {
    Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .line_count(width)
}

/// Draw the full UI into `f`
pub fn draw_ui(f: &mut Frame, app: &App) {
    let areas = areas(f.area());

    render_header(f, app, areas.header);
    render_draft_pane(f, app, areas.draft);
    render_enhanced_pane(f, app, areas.enhanced);
    render_action_bar(f, app, areas.action_bar);
    render_toast(f, app, areas.toast);

    if app.session.is_locked() {
        render_unlock_modal(f, app, f.area());
    }
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let line = Line::from(vec![
        Span::styled(BRAND, Style::default().fg(Color::Magenta).bold()),
        Span::styled(format!(" — {}", TAGLINE), Style::default().fg(Color::DarkGray)),
        Span::raw("  "),
        Span::styled(format!("[{}]", app.model), Style::default().fg(Color::Cyan)),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn stats_title(stats: PromptStats) -> String {
    format!(" {} chars · {} words ", stats.characters, stats.words)
}

fn render_draft_pane(f: &mut Frame, app: &App, area: Rect) {
    let focused = !app.session.is_locked();
    let border_style = if focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let block = Block::default()
        .title(" Source Draft ")
        .title_bottom(Line::from(stats_title(app.session.draft_stats())).right_aligned())
        .borders(Borders::ALL)
        .border_style(border_style);

    let content = if app.session.draft().is_empty() {
        Paragraph::new(Span::styled(
            "Describe what you want the AI to do...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        // Trailing cursor marker
        let mut text = app.session.draft().to_string();
        if focused {
            text.push('▏');
        }
        Paragraph::new(text)
    };

    f.render_widget(content.block(block).wrap(Wrap { trim: false }), area);
}

fn render_enhanced_pane(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Enhanced Result ")
        .title_bottom(Line::from(stats_title(app.session.enhanced_stats())).right_aligned())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta));

    let content = if app.session.is_enhancing() {
        Paragraph::new(Span::styled(
            "Transmuting...",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
    } else if app.session.enhanced().is_empty() {
        Paragraph::new(Span::styled(
            "Your refined prompt will appear here.",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Paragraph::new(app.session.enhanced()).scroll((app.enhanced_scroll, 0))
    };

    f.render_widget(content.block(block).wrap(Wrap { trim: false }), area);
}

fn render_action_bar(f: &mut Frame, app: &App, area: Rect) {
    let enabled = Style::default().fg(Color::White).bold();
    let disabled = Style::default().fg(Color::DarkGray);

    let mut spans = Vec::new();
    if app.session.is_enhancing() {
        spans.push(Span::styled(
            "[Transmuting...]",
            Style::default().fg(Color::Yellow).bold(),
        ));
    } else {
        spans.push(Span::styled(
            "[^E Enhance]",
            if app.session.can_enhance() { enabled } else { disabled },
        ));
    }
    spans.push(Span::raw(" "));
    spans.push(Span::styled(
        "[^Y Copy]",
        if app.session.can_copy() { enabled } else { disabled },
    ));
    spans.push(Span::raw("  "));
    spans.push(Span::styled(
        render_help(app.session.is_locked()),
        Style::default().fg(Color::DarkGray),
    ));

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_toast(f: &mut Frame, app: &App, area: Rect) {
    let Some(notification) = app.session.notification() else {
        return;
    };
    let (icon, color) = if notification.is_error() {
        ("✗", Color::Red)
    } else {
        ("✓", Color::Green)
    };
    let line = Line::from(vec![
        Span::styled(format!("{} ", icon), Style::default().fg(color).bold()),
        Span::styled(notification.message.as_str(), Style::default().fg(color)),
    ]);
    f.render_widget(Paragraph::new(line).alignment(Alignment::Right), area);
}

fn render_unlock_modal(f: &mut Frame, app: &App, area: Rect) {
    let modal = centered_rect(60, 9, area);
    f.render_widget(Clear, modal);

    let masked: String = "•".repeat(app.key_input.chars().count());
    let lines = vec![
        Line::from(Span::styled(
            "Enter your Gemini API key to unlock the workspace.",
            Style::default().fg(Color::Gray),
        )),
        Line::from(Span::styled(
            "It is kept for this session only.",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Key: ", Style::default().fg(Color::DarkGray)),
            Span::styled(masked, Style::default().fg(Color::Yellow)),
            Span::styled("▏", Style::default().fg(Color::Yellow)),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            render_help(true),
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let block = Block::default()
        .title(" Initialize Alchemy ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta));

    f.render_widget(Paragraph::new(lines).block(block), modal);
}

/// Rect of `width_pct`% width and fixed `height`, centered in `area`
fn centered_rect(width_pct: u16, height: u16, area: Rect) -> Rect {
    let height = height.min(area.height);
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(area.height.saturating_sub(height) / 2),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - width_pct) / 2),
            Constraint::Percentage(width_pct),
            Constraint::Percentage((100 - width_pct) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{EnhanceError, Enhancer};
    use crate::session::{ApiKey, Clipboard, ClipboardError, CredentialStore, Session};
    use async_trait::async_trait;
    use ratatui::backend::TestBackend;
    use std::sync::Arc;

    struct Echo;

    #[async_trait]
    impl Enhancer for Echo {
        async fn enhance(&self, _key: &ApiKey, draft: &str) -> Result<String, EnhanceError> {
            Ok(draft.to_string())
        }

        fn provider_name(&self) -> &str {
            "echo"
        }
    }

    struct NullClipboard;

    impl Clipboard for NullClipboard {
        fn set_text(&mut self, _text: &str) -> Result<(), ClipboardError> {
            Ok(())
        }
    }

    fn app() -> App {
        let session = Session::new(
            CredentialStore::in_memory(),
            Arc::new(Echo),
            Box::new(NullClipboard),
        );
        App::new(session, "test-model")
    }

    fn screen(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        render(&mut terminal, app).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_locked_shows_unlock_modal_with_masked_key() {
        let mut app = app();
        app.key_input = "secret".to_string();
        let text = screen(&mut app);
        assert!(text.contains("Initialize Alchemy"));
        assert!(text.contains("••••••"));
        assert!(!text.contains("secret"));
    }

    #[test]
    fn test_unlocked_shows_both_panes_and_stats() {
        let mut app = app();
        app.session.set_draft("write a poem");
        // Unlock without a runtime: the toast timer just isn't armed
        app.session.submit_credential("abc123");
        let text = screen(&mut app);
        assert!(!text.contains("Initialize Alchemy"));
        assert!(text.contains("Source Draft"));
        assert!(text.contains("Enhanced Result"));
        assert!(text.contains("12 chars · 3 words"));
        assert!(text.contains("Key accepted. Forge ready."));
    }

    #[test]
    fn test_render_records_enhanced_text_area() {
        let mut app = app();
        screen(&mut app);
        // Right half of 100x24, minus borders, header, action bar and toast
        assert_eq!(app.enhanced_viewport(), Rect::new(51, 2, 48, 19));
    }

    #[test]
    fn test_line_count_includes_wrapped_rows() {
        assert_eq!(enhanced_line_count("one\ntwo", 40), 2);
        assert_eq!(enhanced_line_count(&"x".repeat(25), 10), 3);
    }

    #[test]
    fn test_centered_rect_fits_inside_area() {
        let area = Rect::new(0, 0, 100, 24);
        let rect = centered_rect(60, 9, area);
        assert_eq!(rect.height, 9);
        assert!(rect.x > 0 && rect.right() < area.right());
    }
}
