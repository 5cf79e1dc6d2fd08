use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use ratzilla::ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line as TextLine, Span, Text},
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, Borders, Cell, Chart, Dataset, GraphType,
        Paragraph, Row, Table, Wrap,
    },
    Terminal,
};
use ratzilla::{DomBackend, WebRenderer};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Request, RequestInit, RequestMode, Response};

const API_PATH: &str = "api/data";

const INTENSITY_COLOR: Color = Color::Cyan;
const LIKELIHOOD_COLOR: Color = Color::Magenta;
const RELEVANCE_COLOR: Color = Color::Yellow;

const SECTOR_COLORS: [Color; 7] = [
    Color::Cyan,
    Color::Magenta,
    Color::Yellow,
    Color::Green,
    Color::Rgb(66, 86, 244),
    Color::Red,
    Color::LightBlue,
];

/// Wire names and display labels of the nine filterable attributes.
const FILTER_FIELDS: [(&str, &str); 9] = [
    ("endYear", "End Year"),
    ("topic", "Topic"),
    ("sector", "Sector"),
    ("region", "Region"),
    ("pest", "PEST"),
    ("source", "Source"),
    ("swot", "SWOT"),
    ("country", "Country"),
    ("city", "City"),
];

#[derive(serde::Deserialize, Clone, Default)]
#[serde(default)]
struct InsightRecord {
    #[serde(rename = "endYear")]
    end_year: Option<String>,
    topic: Option<String>,
    sector: Option<String>,
    region: Option<String>,
    pest: Option<String>,
    source: Option<String>,
    swot: Option<String>,
    country: Option<String>,
    city: Option<String>,
    intensity: Option<f64>,
    likelihood: Option<f64>,
    relevance: Option<f64>,
    published: Option<String>,
}

impl InsightRecord {
    fn field(&self, index: usize) -> &str {
        let value = match index {
            0 => &self.end_year,
            1 => &self.topic,
            2 => &self.sector,
            3 => &self.region,
            4 => &self.pest,
            5 => &self.source,
            6 => &self.swot,
            7 => &self.country,
            _ => &self.city,
        };
        value.as_deref().unwrap_or("")
    }

    fn published(&self) -> &str {
        self.published.as_deref().unwrap_or("")
    }

    // Year token: split on ", ", take the second segment.
    fn published_year(&self) -> &str {
        self.published().split(", ").nth(1).unwrap_or("")
    }

    fn intensity(&self) -> f64 {
        self.intensity.unwrap_or(0.0)
    }

    fn likelihood(&self) -> f64 {
        self.likelihood.unwrap_or(0.0)
    }

    fn relevance(&self) -> f64 {
        self.relevance.unwrap_or(0.0)
    }
}

/// Current selection per filter, positionally aligned with FILTER_FIELDS.
/// Empty means "All"; the full set is sent with every fetch.
#[derive(Clone, Default)]
struct Filters([String; 9]);

impl Filters {
    fn query_string(&self) -> String {
        FILTER_FIELDS
            .iter()
            .enumerate()
            .map(|(index, (name, _))| {
                format!("{name}={}", js_sys::encode_uri_component(&self.0[index]))
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    fn active_count(&self) -> usize {
        self.0.iter().filter(|value| !value.is_empty()).count()
    }
}

/// Distinct values in first-seen order, empties kept.
fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for value in values {
        if !seen.iter().any(|existing| existing == value) {
            seen.push(value.to_string());
        }
    }
    seen
}

/// Dropdown options for one filter: distinct non-empty values in the
/// current record set.
fn options_for(records: &[InsightRecord], index: usize) -> Vec<String> {
    let mut options = distinct(records.iter().map(|record| record.field(index)));
    options.retain(|value| !value.is_empty());
    options
}

fn main() -> io::Result<()> {
    let data = Rc::new(RefCell::new(None::<Vec<InsightRecord>>));
    let filters = Rc::new(RefCell::new(Filters::default()));
    let selected = Rc::new(RefCell::new(0_usize));

    // One fetch on mount with the all-empty filter state.
    spawn_local(fetch_records(data.clone(), filters.borrow().clone()));

    let backend = DomBackend::new()?;
    let terminal = Terminal::new(backend)?;

    terminal.on_key_event({
        let data = data.clone();
        let filters = filters.clone();
        let selected = selected.clone();
        move |event| match event.code {
            ratzilla::event::KeyCode::Up => {
                let mut index = selected.borrow_mut();
                *index = (*index + FILTER_FIELDS.len() - 1) % FILTER_FIELDS.len();
            }
            ratzilla::event::KeyCode::Down => {
                let mut index = selected.borrow_mut();
                *index = (*index + 1) % FILTER_FIELDS.len();
            }
            ratzilla::event::KeyCode::Left => {
                cycle_option(&data, &filters, *selected.borrow(), -1);
            }
            ratzilla::event::KeyCode::Right => {
                cycle_option(&data, &filters, *selected.borrow(), 1);
            }
            ratzilla::event::KeyCode::Backspace => {
                let changed = {
                    let mut filters = filters.borrow_mut();
                    let slot = &mut filters.0[*selected.borrow()];
                    let changed = !slot.is_empty();
                    slot.clear();
                    changed
                };
                if changed {
                    spawn_local(fetch_records(data.clone(), filters.borrow().clone()));
                }
            }
            ratzilla::event::KeyCode::Char('x') => {
                *filters.borrow_mut() = Filters::default();
                spawn_local(fetch_records(data.clone(), filters.borrow().clone()));
            }
            ratzilla::event::KeyCode::Char('r') => {
                spawn_local(fetch_records(data.clone(), filters.borrow().clone()));
            }
            ratzilla::event::KeyCode::Char(c @ '1'..='9') => {
                *selected.borrow_mut() = (c as usize) - ('1' as usize);
            }
            _ => {}
        }
    });

    terminal.draw_web(move |f| {
        let area = f.area();
        let block = Block::default()
            .title("Market Insight Dashboard")
            .title_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Gray));
        let inner = block.inner(area).inner(Margin::new(1, 1));
        f.render_widget(block, area);

        let data = data.borrow();
        if let Some(records) = data.as_ref() {
            render_dashboard(records, &filters.borrow(), *selected.borrow(), f, inner);
        } else {
            let paragraph = Paragraph::new(Text::from(TextLine::from("Loading records...")))
                .alignment(Alignment::Center);
            f.render_widget(paragraph, inner);
        }
    });

    Ok(())
}

/// Steps one filter through "All" plus its derived options, then issues
/// exactly one fetch for the change. The in-flight request, if any, keeps
/// running; whichever response lands last wins.
fn cycle_option(
    data: &Rc<RefCell<Option<Vec<InsightRecord>>>>,
    filters: &Rc<RefCell<Filters>>,
    index: usize,
    step: isize,
) {
    let options = data
        .borrow()
        .as_ref()
        .map(|records| options_for(records, index))
        .unwrap_or_default();

    {
        let mut filters = filters.borrow_mut();
        let len = (options.len() + 1) as isize;
        let current = options
            .iter()
            .position(|option| *option == filters.0[index])
            .map_or(0, |position| position + 1) as isize;
        let next = (current + step).rem_euclid(len) as usize;
        filters.0[index] = if next == 0 {
            String::new()
        } else {
            options[next - 1].clone()
        };
    }

    spawn_local(fetch_records(data.clone(), filters.borrow().clone()));
}

fn render_dashboard(
    records: &[InsightRecord],
    filters: &Filters,
    selected: usize,
    f: &mut ratzilla::ratatui::Frame<'_>,
    area: Rect,
) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(16),
            Constraint::Length(13),
        ])
        .split(area);

    render_header(records, filters, f, main_layout[0]);

    let chart_rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(main_layout[1]);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chart_rows[0]);
    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chart_rows[1]);

    render_scores_chart(records, f, top[0]);
    render_sector_chart(records, f, top[1]);
    render_trend_chart(records, f, bottom[0]);
    render_heatmap(records, f, bottom[1]);

    render_filter_table(records, filters, selected, f, main_layout[2]);
}

fn render_header(
    records: &[InsightRecord],
    filters: &Filters,
    f: &mut ratzilla::ratatui::Frame<'_>,
    area: Rect,
) {
    let line = TextLine::from(vec![Span::styled(
        format!(
            "Records: {}  Active filters: {}",
            records.len(),
            filters.active_count()
        ),
        Style::default().fg(Color::White),
    )]);

    let block = Block::default()
        .title("Overview")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(Text::from(line))
        .block(block)
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });

    f.render_widget(paragraph, area);
}

fn empty_panel(title: &str, f: &mut ratzilla::ratatui::Frame<'_>, area: Rect) {
    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));
    let paragraph = Paragraph::new("No records match")
        .block(block)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    f.render_widget(paragraph, area);
}

/// Grouped bars, one group per record: intensity, likelihood, relevance.
fn render_scores_chart(
    records: &[InsightRecord],
    f: &mut ratzilla::ratatui::Frame<'_>,
    area: Rect,
) {
    if records.is_empty() {
        empty_panel("Scores by Topic", f, area);
        return;
    }

    const BAR_WIDTH: u16 = 2;
    const GROUP_WIDTH: u16 = BAR_WIDTH * 3 + 2;
    let capacity = (area.width.saturating_sub(2) / GROUP_WIDTH).max(1) as usize;
    let visible = capacity.min(records.len());

    let groups: Vec<BarGroup<'_>> = records
        .iter()
        .take(visible)
        .map(|record| {
            let label = truncate(record.field(1), usize::from(GROUP_WIDTH) - 1);
            let bars = vec![
                score_bar(record.intensity(), INTENSITY_COLOR),
                score_bar(record.likelihood(), LIKELIHOOD_COLOR),
                score_bar(record.relevance(), RELEVANCE_COLOR),
            ];
            BarGroup::default()
                .label(TextLine::from(label))
                .bars(&bars)
        })
        .collect();

    let max_value = records
        .iter()
        .flat_map(|record| [record.intensity(), record.likelihood(), record.relevance()])
        .fold(0.0_f64, f64::max);

    let mut chart = BarChart::default()
        .block(
            Block::default()
                .title(format!("Scores by Topic ({visible}/{} shown)", records.len()))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Gray)),
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
    Bar::default()
        .value(value.round().max(0.0) as u64)
        .style(Style::default().fg(color))
        .value_style(Style::default().fg(Color::White))
}

/// Sector distribution as horizontal block bars with counts and shares.
fn render_sector_chart(
    records: &[InsightRecord],
    f: &mut ratzilla::ratatui::Frame<'_>,
    area: Rect,
) {
    if records.is_empty() {
        empty_panel("Sector Distribution", f, area);
        return;
    }

    let block = Block::default()
        .title("Sector Distribution")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));
    let inner = block.inner(area);
    f.render_widget(block, area);

    // Distinct sectors keep the empty bucket so counts conserve records.
    let labels = distinct(records.iter().map(|record| record.field(2)));
    let counts: Vec<u64> = labels
        .iter()
        .map(|label| {
            records
                .iter()
                .filter(|record| record.field(2) == label)
                .count() as u64
        })
        .collect();
    let total = counts.iter().sum::<u64>().max(1);
    let max_value = counts.iter().copied().max().unwrap_or(1).max(1);

    let mut lines = Vec::new();
    for (index, label) in labels.iter().enumerate() {
        let count = counts[index];
        let width = inner.width.saturating_sub(22).max(1);
        let ratio = count as f64 / max_value as f64;
        let fill = ((ratio * f64::from(width)).round()).clamp(1.0, f64::from(width)) as usize;
        let percent = (count as f64 / total as f64) * 100.0;
        let display = if label.is_empty() { "(none)" } else { label };

        lines.push(TextLine::from(vec![
            Span::styled(
                format!("{:<12}", truncate(display, 12)),
                Style::default().fg(SECTOR_COLORS[index % SECTOR_COLORS.len()]),
            ),
            Span::styled(
                "█".repeat(fill),
                Style::default().fg(SECTOR_COLORS[index % SECTOR_COLORS.len()]),
            ),
            Span::raw(format!("  {count} ({percent:.1}%)")),
        ]));
    }

    let paragraph = Paragraph::new(Text::from(lines))
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, inner);
}

/// Three score series over the record order; the year axis repeats and
/// may run non-monotonic exactly as the records do.
fn render_trend_chart(
    records: &[InsightRecord],
    f: &mut ratzilla::ratatui::Frame<'_>,
    area: Rect,
) {
    if records.is_empty() {
        empty_panel("Trend by Publication Year", f, area);
        return;
    }

    let to_points = |score: fn(&InsightRecord) -> f64| -> Vec<(f64, f64)> {
        records
            .iter()
            .enumerate()
            .map(|(index, record)| (index as f64, score(record)))
            .collect()
    };
    let intensity = to_points(InsightRecord::intensity);
    let likelihood = to_points(InsightRecord::likelihood);
    let relevance = to_points(InsightRecord::relevance);

    let max_value = records
        .iter()
        .flat_map(|record| [record.intensity(), record.likelihood(), record.relevance()])
        .fold(0.0_f64, f64::max)
        .max(1.0);

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

    let years: Vec<&str> = records.iter().map(InsightRecord::published_year).collect();
    let x_labels = vec![
        Span::raw(years.first().copied().unwrap_or("").to_string()),
        Span::raw(years.get(years.len() / 2).copied().unwrap_or("").to_string()),
        Span::raw(years.last().copied().unwrap_or("").to_string()),
    ];
    let y_labels = vec![
        Span::raw("0"),
        Span::raw(format!("{:.0}", max_value / 2.0)),
        Span::raw(format!("{max_value:.0}")),
    ];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .title("Trend by Publication Year")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Gray)),
        )
        .x_axis(
            Axis::default()
                .title("Published")
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, (records.len().saturating_sub(1)).max(1) as f64])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title("Score")
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, max_value])
                .labels(y_labels),
        );

    f.render_widget(chart, area);
}

/// Region columns by publication-year rows; cells sum intensity over the
/// records whose published string contains the row token.
fn render_heatmap(records: &[InsightRecord], f: &mut ratzilla::ratatui::Frame<'_>, area: Rect) {
    if records.is_empty() {
        empty_panel("Intensity by Region / Year", f, area);
        return;
    }

    let block = Block::default()
        .title("Intensity by Region / Year")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));
    let inner = block.inner(area);
    f.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let cols = distinct(records.iter().map(|record| record.field(3)));
    let rows = distinct(records.iter().map(InsightRecord::published_year));
    let matrix: Vec<Vec<f64>> = rows
        .iter()
        .map(|year| {
            cols.iter()
                .map(|region| {
                    records
                        .iter()
                        .filter(|record| {
                            record.field(3) == region && record.published().contains(year.as_str())
                        })
                        .map(InsightRecord::intensity)
                        .sum()
                })
                .collect()
        })
        .collect();

    let max_value = matrix
        .iter()
        .flatten()
        .copied()
        .fold(0.0_f64, f64::max)
        .max(1.0);

    const ROW_LABEL_WIDTH: usize = 6;
    let usable = usize::from(inner.width).saturating_sub(ROW_LABEL_WIDTH + 1);
    let cell_width = (usable / cols.len().max(1)).clamp(4, 12);
    let visible_cols = (usable / cell_width).min(cols.len());
    let visible_rows = usize::from(inner.height).saturating_sub(1).min(rows.len());

    let mut lines = Vec::with_capacity(visible_rows + 1);
    let mut header = vec![Span::raw(" ".repeat(ROW_LABEL_WIDTH + 1))];
    for col in cols.iter().take(visible_cols) {
        let label = if col.is_empty() { "(none)" } else { col };
        header.push(Span::styled(
            format!("{:^cell_width$}", truncate(label, cell_width - 1)),
            Style::default().fg(Color::Gray),
        ));
    }
    lines.push(TextLine::from(header));

    for (row_index, year) in rows.iter().take(visible_rows).enumerate() {
        let label = if year.is_empty() { "(n/a)" } else { year };
        let mut spans = vec![Span::styled(
            format!("{:>ROW_LABEL_WIDTH$} ", truncate(label, ROW_LABEL_WIDTH)),
            Style::default().fg(Color::Gray),
        )];
        for value in matrix[row_index].iter().take(visible_cols) {
            let ratio = (value / max_value).clamp(0.0, 1.0);
            let scale = |channel: f64| (channel * (0.15 + 0.85 * ratio)) as u8;
            let text = if *value == 0.0 {
                " ".repeat(cell_width)
            } else {
                format!("{:^cell_width$}", format!("{value:.0}"))
            };
            spans.push(Span::styled(
                text,
                Style::default()
                    .fg(Color::White)
                    .bg(Color::Rgb(scale(66.0), scale(86.0), scale(244.0))),
            ));
        }
        lines.push(TextLine::from(spans));
    }

    let paragraph = Paragraph::new(Text::from(lines)).alignment(Alignment::Left);
    f.render_widget(paragraph, inner);
}

fn render_filter_table(
    records: &[InsightRecord],
    filters: &Filters,
    selected: usize,
    f: &mut ratzilla::ratatui::Frame<'_>,
    area: Rect,
) {
    let header = Row::new(vec![
        Cell::from("Filter"),
        Cell::from("Selection"),
        Cell::from("Options"),
    ])
    .style(
        Style::default()
            .fg(Color::Rgb(0, 0, 238))
            .bg(Color::Rgb(200, 200, 200))
            .add_modifier(Modifier::BOLD),
    );

    let rows = FILTER_FIELDS.iter().enumerate().map(|(index, (_, label))| {
        let value = &filters.0[index];
        let display = if value.is_empty() { "All" } else { value };
        let option_count = options_for(records, index).len();

        let style = if index == selected {
            Style::default()
                .fg(Color::White)
                .bg(Color::Rgb(0, 0, 238))
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };

        Row::new(vec![
            Cell::from(*label),
            Cell::from(display.to_string()),
            Cell::from(option_count.to_string()),
        ])
        .style(style)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Length(28),
            Constraint::Length(8),
        ],
    )
    .header(header)
    .column_spacing(1)
    .block(
        Block::default()
            .title("Filters (↑/↓ select, ←/→ cycle, Backspace clear, x reset)")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(table, area);
}

fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        value.to_string()
    } else {
        value.chars().take(max.saturating_sub(1)).collect::<String>() + "…"
    }
}

/// One GET with the full filter state; on any failure the previous data
/// stays on screen and the error goes to the console.
async fn fetch_records(store: Rc<RefCell<Option<Vec<InsightRecord>>>>, filters: Filters) {
    let Some(window) = web_sys::window() else {
        return;
    };

    let opts = RequestInit::new();
    opts.set_method("GET");
    opts.set_mode(RequestMode::SameOrigin);

    let url = format!("{API_PATH}?{}", filters.query_string());
    let Ok(request) = Request::new_with_str_and_init(&url, &opts) else {
        return;
    };

    let Ok(response_value) =
        wasm_bindgen_futures::JsFuture::from(window.fetch_with_request(&request)).await
    else {
        web_sys::console::error_1(&format!("Request failed: {url}").into());
        return;
    };

    let Ok(response) = response_value.dyn_into::<Response>() else {
        web_sys::console::error_1(&"Failed to read response".into());
        return;
    };

    if !response.ok() {
        web_sys::console::error_1(
            &format!("{url} returned status {}", response.status()).into(),
        );
        return;
    }

    let Ok(json_promise) = response.json() else {
        web_sys::console::error_1(&"Failed to read response body".into());
        return;
    };
    let Ok(json) = wasm_bindgen_futures::JsFuture::from(json_promise).await else {
        web_sys::console::error_1(&"Failed to read response body".into());
        return;
    };

    let records = match serde_wasm_bindgen::from_value::<Vec<InsightRecord>>(json) {
        Ok(records) => records,
        Err(error) => {
            web_sys::console::error_1(&format!("Failed to parse records: {error}").into());
            return;
        }
    };

    *store.borrow_mut() = Some(records);
}
