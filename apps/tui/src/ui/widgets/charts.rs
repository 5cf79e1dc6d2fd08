use crate::aggregate::{build_category_chart, build_distribution_chart, build_trend_chart};
use crate::app::App;
use crate::ui::widgets::heatmap::render_heatmap;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::canvas::{self, Canvas};
use ratatui::widgets::{
    Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, Paragraph, Tabs,
    Wrap,
};
use ratatui::Frame;

pub const INTENSITY_COLOR: Color = Color::Cyan;
pub const LIKELIHOOD_COLOR: Color = Color::Magenta;
pub const RELEVANCE_COLOR: Color = Color::Yellow;

const PIE_COLORS: [Color; 7] = [
    Color::Cyan,
    Color::Magenta,
    Color::Yellow,
    Color::Green,
    Color::Rgb(66, 86, 244),
    Color::Red,
    Color::LightBlue,
];

pub fn render_chart_tabs(app: &App, f: &mut Frame<'_>, area: Rect) {
    let titles = ["Scores", "Trend"]
        .iter()
        .map(|title| TextLine::from(*title))
        .collect::<Vec<_>>();

    let tabs = Tabs::new(titles)
        .select(app.chart_tab_index)
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .divider(Span::raw("|"));

    f.render_widget(tabs, area);
}

pub fn render_chart_panel(app: &App, f: &mut Frame<'_>, area: Rect) {
    let chart_split = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(area.inner(Margin::new(0, 1)));

    if app.chart_tab_index == 0 {
        render_category_barchart(app, f, chart_split[0]);
        render_sector_piechart(app, f, chart_split[1]);
    } else {
        render_trend_linechart(app, f, chart_split[0]);
        render_heatmap(app, f, chart_split[1]);
    }
}

fn render_empty_state(title: &str, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let paragraph = Paragraph::new("No records loaded")
        .block(block)
        .alignment(Alignment::Center);
    f.render_widget(paragraph, area);
}

/// Grouped bar chart: one group per record (topic label), three bars per
/// group for intensity, likelihood, relevance. Only the groups that fit
/// the panel width are drawn.
pub fn render_category_barchart(app: &App, f: &mut Frame<'_>, area: Rect) {
    if app.records.is_empty() {
        render_empty_state("Scores by Topic", f, area);
        return;
    }

    let category = build_category_chart(&app.records);

    const BAR_WIDTH: u16 = 2;
    const GROUP_WIDTH: u16 = BAR_WIDTH * 3 + 2;
    let capacity = (area.width.saturating_sub(2) / GROUP_WIDTH).max(1) as usize;
    let visible = capacity.min(category.labels.len());

    let groups: Vec<BarGroup<'_>> = (0..visible)
        .map(|index| {
            let label = truncate(&category.labels[index], usize::from(GROUP_WIDTH) - 1);
            let bars = vec![
                score_bar(category.series.intensity[index], INTENSITY_COLOR),
                score_bar(category.series.likelihood[index], LIKELIHOOD_COLOR),
                score_bar(category.series.relevance[index], RELEVANCE_COLOR),
            ];
            BarGroup::default()
                .label(TextLine::from(label))
                .bars(&bars)
        })
        .collect();

    let max_value = category
        .series
        .intensity
        .iter()
        .chain(&category.series.likelihood)
        .chain(&category.series.relevance)
        .fold(0.0_f64, |acc, value| acc.max(*value));

    let title = format!(
        " Scores by Topic ({visible}/{} shown) ",
        category.labels.len()
    );
    let mut chart = BarChart::default()
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .max((max_value.ceil() as u64).max(1))
        .bar_gap(0)
        .group_gap(2)
        .bar_width(BAR_WIDTH);
    for group in groups {
        chart = chart.data(group);
    }

    f.render_widget(chart, area);
}

fn score_bar(value: f64, color: Color) -> Bar<'static> {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let rounded = value.round().max(0.0) as u64;
    Bar::default()
        .value(rounded)
        .style(Style::default().fg(color))
        .value_style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
}

/// Sector distribution as a canvas pie with a counts/percentages legend.
pub fn render_sector_piechart(app: &App, f: &mut Frame<'_>, area: Rect) {
    if app.records.is_empty() {
        render_empty_state("Sector Distribution", f, area);
        return;
    }

    let distribution = build_distribution_chart(&app.records);
    let total = distribution.counts.iter().sum::<u64>().max(1);

    let block = Block::default()
        .title(" Sector Distribution ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let split = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(inner);

    render_pie_canvas(&distribution.counts, total, f, split[0]);
    render_pie_legend(&distribution, total, f, split[1]);
}

fn render_pie_canvas(counts: &[u64], total: u64, f: &mut Frame<'_>, area: Rect) {
    let size = area.width.min(area.height);
    if size == 0 {
        return;
    }
    let square = Rect {
        x: area.x + (area.width - size) / 2,
        y: area.y + (area.height - size) / 2,
        width: size,
        height: size,
    };

    let fractions: Vec<f64> = counts
        .iter()
        .map(|count| *count as f64 / total as f64)
        .collect();

    let canvas = Canvas::default()
        .paint(|ctx| {
            let width = f64::from(square.width);
            let height = f64::from(square.height);
            let center_x = width / 2.0;
            let center_y = height / 2.0;
            let radius = width.min(height) / 2.0 * 0.9;

            // Sweep the full circle in small angular steps, coloring each
            // spoke by the slice it falls into.
            let mut boundaries = Vec::with_capacity(fractions.len());
            let mut accumulated = 0.0;
            for fraction in &fractions {
                accumulated += fraction;
                boundaries.push(accumulated * std::f64::consts::TAU);
            }

            let steps = 360;
            for step in 0..steps {
                let angle = f64::from(step) / f64::from(steps) * std::f64::consts::TAU;
                let slice = boundaries
                    .iter()
                    .position(|end| angle < *end)
                    .unwrap_or(fractions.len().saturating_sub(1));
                let color = PIE_COLORS[slice % PIE_COLORS.len()];

                ctx.draw(&canvas::Line {
                    x1: center_x,
                    y1: center_y,
                    x2: angle.cos().mul_add(radius, center_x),
                    y2: angle.sin().mul_add(radius, center_y),
                    color,
                });
            }
        })
        .x_bounds([0.0, f64::from(square.width)])
        .y_bounds([0.0, f64::from(square.height)]);

    f.render_widget(canvas, square);
}

fn render_pie_legend(
    distribution: &crate::aggregate::DistributionChart,
    total: u64,
    f: &mut Frame<'_>,
    area: Rect,
) {
    let mut lines = vec![
        TextLine::from(Span::styled("Legend", Style::default().fg(Color::Gray))),
        TextLine::from(""),
    ];

    for (index, label) in distribution.labels.iter().enumerate() {
        let count = distribution.counts[index];
        let percent = (count as f64 / total as f64) * 100.0;
        let label = if label.is_empty() { "(none)" } else { label };
        lines.push(TextLine::from(vec![
            Span::styled(
                "■ ",
                Style::default().fg(PIE_COLORS[index % PIE_COLORS.len()]),
            ),
            Span::styled(truncate(label, 14), Style::default().fg(Color::White)),
            Span::styled(
                format!("  {count} ({percent:.1}%)"),
                Style::default().fg(Color::Gray),
            ),
        ]));
    }

    let legend = Paragraph::new(Text::from(lines))
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });
    f.render_widget(legend, area);
}

/// Three-series line chart over the record order. The year axis repeats
/// and may run non-monotonic exactly as the records do; no sorting.
pub fn render_trend_linechart(app: &App, f: &mut Frame<'_>, area: Rect) {
    if app.records.is_empty() {
        render_empty_state("Trend by Publication Year", f, area);
        return;
    }

    let trend = build_trend_chart(&app.records);
    let len = trend.labels.len();

    let to_points = |values: &[f64]| -> Vec<(f64, f64)> {
        values
            .iter()
            .enumerate()
            .map(|(index, value)| (index as f64, *value))
            .collect()
    };
    let intensity = to_points(&trend.series.intensity);
    let likelihood = to_points(&trend.series.likelihood);
    let relevance = to_points(&trend.series.relevance);

    let max_value = trend
        .series
        .intensity
        .iter()
        .chain(&trend.series.likelihood)
        .chain(&trend.series.relevance)
        .fold(0.0_f64, |acc, value| acc.max(*value));

    let datasets = vec![
        Dataset::default()
            .name("Intensity")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(INTENSITY_COLOR))
            .data(&intensity),
        Dataset::default()
            .name("Likelihood")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(LIKELIHOOD_COLOR))
            .data(&likelihood),
        Dataset::default()
            .name("Relevance")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(RELEVANCE_COLOR))
            .data(&relevance),
    ];

    let first = trend.labels.first().cloned().unwrap_or_default();
    let middle = trend.labels.get(len / 2).cloned().unwrap_or_default();
    let last = trend.labels.last().cloned().unwrap_or_default();
    let x_labels = vec![Span::raw(first), Span::raw(middle), Span::raw(last)];
    let y_labels = vec![
        Span::raw("0"),
        Span::raw(format!("{:.0}", max_value / 2.0)),
        Span::raw(format!("{max_value:.0}")),
    ];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .title(" Trend by Publication Year ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .x_axis(
            Axis::default()
                .title("Published")
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, (len.saturating_sub(1)).max(1) as f64])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title("Score")
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, max_value.max(1.0)])
                .labels(y_labels),
        );

    f.render_widget(chart, area);
}

pub fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        value.to_string()
    } else {
        value.chars().take(max.saturating_sub(1)).collect::<String>() + "…"
    }
}
