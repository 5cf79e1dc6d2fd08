use crate::aggregate::build_heatmap;
use crate::app::App;
use crate::ui::widgets::charts::truncate;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

const ROW_LABEL_WIDTH: usize = 6;

/// Region (columns) by publication-year (rows) intensity grid. Cell
/// background brightness scales with the intensity sum, echoing the blue
/// ramp of the web rendition.
pub fn render_heatmap(app: &App, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title(" Intensity by Region / Year ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    if app.records.is_empty() {
        let paragraph = Paragraph::new("No records loaded")
            .block(block)
            .alignment(Alignment::Center);
        f.render_widget(paragraph, area);
        return;
    }

    let heatmap = build_heatmap(&app.records);
    let inner = block.inner(area);
    f.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let max_value = heatmap.max_value().max(1.0);
    let usable = usize::from(inner.width).saturating_sub(ROW_LABEL_WIDTH + 1);
    let cell_width = match heatmap.cols.len() {
        0 => return,
        cols => (usable / cols).clamp(4, 12),
    };
    let visible_cols = (usable / cell_width).min(heatmap.cols.len());
    // One line is reserved for the column header.
    let visible_rows = usize::from(inner.height)
        .saturating_sub(1)
        .min(heatmap.rows.len());

    let mut lines = Vec::with_capacity(visible_rows + 1);

    let mut header = vec![Span::raw(" ".repeat(ROW_LABEL_WIDTH + 1))];
    for col in heatmap.cols.iter().take(visible_cols) {
        let label = if col.is_empty() { "(none)" } else { col };
        header.push(Span::styled(
            format!("{:^cell_width$}", truncate(label, cell_width - 1)),
            Style::default().fg(Color::Gray),
        ));
    }
    lines.push(TextLine::from(header));

    for (row_index, year) in heatmap.rows.iter().take(visible_rows).enumerate() {
        let label = if year.is_empty() { "(n/a)" } else { year };
        let mut spans = vec![Span::styled(
            format!("{:>ROW_LABEL_WIDTH$} ", truncate(label, ROW_LABEL_WIDTH)),
            Style::default().fg(Color::Gray),
        )];

        for value in heatmap.matrix[row_index].iter().take(visible_cols) {
            let ratio = value / max_value;
            let text = if *value == 0.0 {
                " ".repeat(cell_width)
            } else {
                format!("{:^cell_width$}", format!("{value:.0}"))
            };
            spans.push(Span::styled(
                text,
                Style::default().fg(Color::White).bg(ramp_color(ratio)),
            ));
        }
        lines.push(TextLine::from(spans));
    }

    let paragraph = Paragraph::new(Text::from(lines)).alignment(Alignment::Left);
    f.render_widget(paragraph, inner);
}

/// Dark-to-bright blue ramp over rgb(66, 86, 244).
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn ramp_color(ratio: f64) -> Color {
    let ratio = ratio.clamp(0.0, 1.0);
    let scale = |channel: f64| (channel * (0.15 + 0.85 * ratio)) as u8;
    Color::Rgb(scale(66.0), scale(86.0), scale(244.0))
}
