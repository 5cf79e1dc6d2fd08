use crate::app::App;
use crate::domain::FilterField;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

/// Nine selection rows, one per filterable attribute. Each offers "All"
/// plus the options derived from the current record set; Left/Right on
/// the highlighted row cycles through them.
pub fn render_filter_sidebar(app: &App, f: &mut Frame<'_>, area: Rect) {
    let title = format!(" Filters ({} active) ", app.filters.active_count());
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    let mut lines = Vec::new();
    for (index, field) in FilterField::ALL.iter().enumerate() {
        let selected = index == app.selected_filter;
        let value = app.filters.get(*field);
        let option_count = app.options.for_field(*field).len();

        let marker = if selected { "▸ " } else { "  " };
        let label_style = if selected {
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        let value_span = if value.is_empty() {
            Span::styled("All", Style::default().fg(Color::DarkGray))
        } else {
            Span::styled(value.to_string(), Style::default().fg(Color::Yellow))
        };

        lines.push(TextLine::from(vec![
            Span::styled(marker, Style::default().fg(Color::Green)),
            Span::styled(format!("{:<9}", field.label()), label_style),
            Span::raw(" "),
            value_span,
            Span::styled(
                format!("  ({option_count})"),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
    }

    lines.push(TextLine::from(""));
    lines.push(TextLine::from(Span::styled(
        "←/→ cycle · ⌫ clear · x clear all",
        Style::default().fg(Color::DarkGray),
    )));

    let paragraph = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, area);
}
