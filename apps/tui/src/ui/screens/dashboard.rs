use crate::app::App;
use crate::ui::widgets::charts::{render_chart_panel, render_chart_tabs};
use crate::ui::widgets::filters::render_filter_sidebar;
use crate::ui::widgets::popup::{centered_rect, ClearWidget};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

const SPINNER_FRAMES: [char; 4] = ['|', '/', '-', '\\'];

pub fn render_dashboard(app: &App, f: &mut Frame<'_>) {
    let main_layout = build_main_layout(f);

    render_title_section(app, f, main_layout[0]);
    render_content_section(app, f, main_layout[1]);
    render_status_section(app, f, main_layout[2]);
    render_shortcuts(f, main_layout[3]);

    if app.show_help {
        render_help_popup(f);
    }
}

fn build_main_layout(f: &Frame<'_>) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title area
            Constraint::Min(12),   // Content area
            Constraint::Length(3), // Status area
            Constraint::Length(1), // Shortcuts hint
        ])
        .split(f.area().inner(Margin::new(2, 1)))
        .to_vec()
}

fn render_title_section(app: &App, f: &mut Frame<'_>, area: Rect) {
    let title_block = Block::default()
        .title("== Market Insight Dashboard ==")
        .title_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let summary = TextLine::from(vec![
        Span::styled(
            format!("Records: {}", app.records.len()),
            Style::default().fg(Color::White),
        ),
        Span::raw("  "),
        Span::styled(
            format!("Fetches: {}", app.fetch_count),
            Style::default().fg(Color::Gray),
        ),
        Span::raw("  "),
        Span::styled(
            format!("Errors: {}", app.error_count),
            Style::default().fg(if app.error_count > 0 {
                Color::Red
            } else {
                Color::Gray
            }),
        ),
    ]);

    let paragraph = Paragraph::new(Text::from(summary))
        .block(title_block)
        .alignment(Alignment::Right);
    f.render_widget(paragraph, area);
}

fn render_content_section(app: &App, f: &mut Frame<'_>, area: Rect) {
    let content = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(area);

    render_filter_sidebar(app, f, content[0]);

    let chart_area = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(8)])
        .split(content[1]);

    render_chart_tabs(app, f, chart_area[0]);
    render_chart_panel(app, f, chart_area[1]);
}

fn render_status_section(app: &App, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title(" Status ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let mut spans = Vec::new();
    if app.fetch_in_flight() {
        let frame = spinner_frame(app.animation_counter);
        spans.push(Span::styled(
            format!("{frame} "),
            Style::default().fg(Color::Yellow),
        ));
    }
    spans.push(Span::styled(
        app.status_message.clone(),
        Style::default().fg(Color::White),
    ));

    let paragraph = Paragraph::new(Text::from(TextLine::from(spans)))
        .block(block)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn render_shortcuts(f: &mut Frame<'_>, area: Rect) {
    let hints = Paragraph::new(
        "↑/↓ filter · ←/→ value · Tab charts · r refetch · x clear · F1 help · q quit",
    )
    .style(Style::default().fg(Color::DarkGray))
    .alignment(Alignment::Center);
    f.render_widget(hints, area);
}

fn render_help_popup(f: &mut Frame<'_>) {
    let area = centered_rect(60, 60, f.area());
    f.render_widget(ClearWidget, area);

    let block = Block::default()
        .title(" Help ")
        .title_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let lines = vec![
        TextLine::from(""),
        help_line("Up / Down", "select a filter"),
        help_line("Left / Right", "cycle the filter through All and its options"),
        help_line("1-9", "jump to a filter row"),
        help_line("Backspace", "clear the selected filter"),
        help_line("x", "clear all filters"),
        help_line("Tab / Shift-Tab", "switch chart tabs"),
        help_line("r", "refetch with the current filters"),
        TextLine::from(""),
        TextLine::from(Span::styled(
            "Every filter change issues one fetch; options always reflect",
            Style::default().fg(Color::Gray),
        )),
        TextLine::from(Span::styled(
            "the latest server response. Failed fetches keep the last data.",
            Style::default().fg(Color::Gray),
        )),
        TextLine::from(""),
        help_line("Esc / F1", "close this help"),
        help_line("q", "quit"),
    ];

    let paragraph = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn help_line<'a>(key: &'a str, action: &'a str) -> TextLine<'a> {
    TextLine::from(vec![
        Span::styled(
            format!("  {key:<16}"),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(action, Style::default().fg(Color::White)),
    ])
}

fn spinner_frame(animation_counter: f64) -> char {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let index = (animation_counter * 2.0) as usize % SPINNER_FRAMES.len();
    SPINNER_FRAMES[index]
}
