use color_eyre::Result;
use crossterm::event::{self, Event};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::convert::TryFrom;
use std::fmt;
use std::io::Stdout;

use crate::aggregate::{
    build_category_chart, build_distribution_chart, build_heatmap, build_trend_chart,
    CategoryChart, DistributionChart, FilterOptions, Heatmap, TrendChart,
};
use crate::app::{handle_input, App};
use crate::domain::{FilterField, FilterState};
use crate::ui;

// Define states for the fetch lifecycle
#[derive(Clone, Copy, PartialEq, Debug)]
enum FetchState {
    Idle,
    Fetching,
    Success,
    Error,
}

impl fmt::Display for FetchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Fetching => write!(f, "Fetching"),
            Self::Success => write!(f, "Success"),
            Self::Error => write!(f, "Error"),
        }
    }
}

// Define events for the fetch lifecycle
#[derive(Clone, Debug)]
enum FetchEvent {
    StartFetch,
    Success(usize),
    Error(String),
    Reset,
}

impl fmt::Display for FetchEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartFetch => write!(f, "StartFetch"),
            Self::Success(count) => write!(f, "Success({count})"),
            Self::Error(msg) => write!(f, "Error({msg})"),
            Self::Reset => write!(f, "Reset"),
        }
    }
}

// Define a custom error type for state transitions
#[derive(Debug)]
struct StateTransitionError {
    from: FetchState,
    event: FetchEvent,
}

impl fmt::Display for StateTransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid transition from {} with event {}",
            self.from, self.event
        )
    }
}

impl std::error::Error for StateTransitionError {}

// State machine tracking the most recent fetch activity
struct FetchMachine {
    state: FetchState,
}

impl FetchMachine {
    const fn new(initial_state: FetchState) -> Self {
        Self {
            state: initial_state,
        }
    }

    // Process an event and update the state machine and app
    fn process_event(
        &mut self,
        event: &FetchEvent,
        app: &mut App,
    ) -> std::result::Result<(), StateTransitionError> {
        let next_state = NextState::try_from((self.state, event, app))?;
        self.state = next_state.0;
        Ok(())
    }
}

// Helper struct for state transitions
struct NextState(FetchState);

impl NextState {
    const fn new(state: FetchState) -> Self {
        Self(state)
    }
}

impl FetchState {
    const fn next_state(self) -> NextState {
        NextState::new(self)
    }
}

impl TryFrom<(FetchState, &FetchEvent, &mut App)> for NextState {
    type Error = StateTransitionError;

    fn try_from(
        value: (FetchState, &FetchEvent, &mut App),
    ) -> std::result::Result<Self, StateTransitionError> {
        let (current_state, event, app) = value;

        match (current_state, event) {
            // A new fetch may start while an old one is still in flight;
            // in-flight requests are never aborted.
            (_, FetchEvent::StartFetch) => {
                app.status_message = "Fetching records...".to_string();
                Ok(FetchState::Fetching.next_state())
            }
            // Completions may arrive after the machine has already been
            // reset by an earlier response (last-response-wins).
            (FetchState::Fetching | FetchState::Idle, FetchEvent::Success(_)) => {
                Ok(FetchState::Success.next_state())
            }
            (FetchState::Fetching | FetchState::Idle, FetchEvent::Error(error)) => {
                app.apply_fetch_failure(error);
                Ok(FetchState::Error.next_state())
            }
            (FetchState::Success | FetchState::Error, FetchEvent::Reset) => {
                Ok(FetchState::Idle.next_state())
            }
            _ => Err(StateTransitionError {
                from: current_state,
                event: event.clone(),
            }),
        }
    }
}

/// Run the application in headless mode (no UI): one fetch with the
/// initial filter state, then the aggregated snapshot on stdout.
pub async fn run_headless(app: &mut App, json: bool) -> Result<()> {
    app.actions.initialize()?;

    let records = app.actions.fetch_records(&app.filters).await?;
    app.apply_fetch_success(records);

    if json {
        render_headless_json(app)?;
    } else {
        render_headless_stats(app);
    }

    Ok(())
}

fn render_headless_stats(app: &App) {
    let snapshot = build_snapshot(app);

    println!("\nMarket Insight Stats");
    println!("====================");
    println!("Records: {}", snapshot.record_count);
    println!("Active filters: {}", snapshot.filters.active_count());

    println!("\nRecords by Sector:");
    for (sector, count) in snapshot
        .distribution
        .labels
        .iter()
        .zip(&snapshot.distribution.counts)
    {
        let sector = if sector.is_empty() { "(none)" } else { sector };
        println!("- {sector}: {count}");
    }

    println!("\nIntensity by Region and Year:");
    for (year, row) in snapshot.heatmap.rows.iter().zip(&snapshot.heatmap.matrix) {
        let cells = snapshot
            .heatmap
            .cols
            .iter()
            .zip(row)
            .map(|(region, value)| format!("{region}={value}"))
            .collect::<Vec<_>>()
            .join(", ");
        println!("- {year}: {cells}");
    }

    println!("\nFilter options:");
    for field in FilterField::ALL {
        println!(
            "- {}: {}",
            field.label(),
            snapshot.options.for_field(field).len()
        );
    }
}

fn render_headless_json(app: &App) -> Result<()> {
    let snapshot = build_snapshot(app);
    let json = serde_json::to_string_pretty(&snapshot)?;
    println!("{json}");
    Ok(())
}

fn build_snapshot(app: &App) -> DashboardSnapshot {
    DashboardSnapshot {
        generated_at: chrono::Utc::now().to_rfc3339(),
        endpoint: app.actions.endpoint().map(ToString::to_string),
        filters: app.filters.clone(),
        record_count: app.records.len(),
        options: app.options.clone(),
        category: build_category_chart(&app.records),
        distribution: build_distribution_chart(&app.records),
        trend: build_trend_chart(&app.records),
        heatmap: build_heatmap(&app.records),
    }
}

#[derive(serde::Serialize)]
struct DashboardSnapshot {
    generated_at: String,
    endpoint: Option<String>,
    filters: FilterState,
    record_count: usize,
    options: FilterOptions,
    category: CategoryChart,
    distribution: DistributionChart,
    trend: TrendChart,
    heatmap: Heatmap,
}

/// Run the main application event loop
pub async fn run(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    // Configure event poll timeout (ms)
    const EVENT_POLL_TIMEOUT: u64 = 50;

    let mut fetch_machine = FetchMachine::new(FetchState::Idle);

    loop {
        // Update animations
        app.update();

        // Draw the UI with better error context
        if let Err(e) = terminal.draw(|f| ui::ui(app, f)) {
            return Err(color_eyre::eyre::eyre!("Terminal draw error: {e}"));
        }

        // Handle events with improved error context
        if matches!(
            event::poll(std::time::Duration::from_millis(EVENT_POLL_TIMEOUT)),
            Ok(true)
        ) {
            match event::read() {
                Ok(Event::Key(key)) => {
                    handle_input(app, key.code);
                    if !app.running {
                        break;
                    }
                }
                Ok(Event::Resize(_, _)) => {
                    // Force a redraw after resize
                    if terminal.draw(|f| ui::ui(app, f)).is_err() {
                        // Non-fatal redraw error
                    }
                }
                Ok(Event::Mouse(_) | Event::FocusGained | Event::FocusLost | Event::Paste(_))
                | Err(_) => {
                    // Ignore non-key events for now
                }
            }
        }

        // Each pending flag becomes exactly one spawned fetch. No
        // debouncing, no cancellation: an in-flight request keeps running
        // when filters change again.
        if app.pending_fetch {
            app.pending_fetch = false;
            start_fetch(&mut fetch_machine, app);
        }

        drain_finished_fetches(&mut fetch_machine, app).await;
    }
    Ok(())
}

fn start_fetch(fetch_machine: &mut FetchMachine, app: &mut App) {
    let client = match app.actions.client_handle() {
        Ok(client) => client,
        Err(e) => {
            app.status_message = format!("Fetch failed: {e}");
            return;
        }
    };

    if fetch_machine
        .process_event(&FetchEvent::StartFetch, app)
        .is_err()
    {
        return;
    }

    let filters = app.filters.clone();
    app.in_flight
        .push(tokio::spawn(async move { client.fetch_records(&filters).await }));
}

/// Applies completed fetches in arrival order. Responses may land out of
/// request order; the last one applied determines the displayed state.
async fn drain_finished_fetches(fetch_machine: &mut FetchMachine, app: &mut App) {
    if app.in_flight.is_empty() {
        return;
    }

    let mut still_running = Vec::with_capacity(app.in_flight.len());
    let handles = std::mem::take(&mut app.in_flight);

    for handle in handles {
        if !handle.is_finished() {
            still_running.push(handle);
            continue;
        }

        let event = match handle.await {
            Ok(Ok(records)) => {
                let count = records.len();
                app.apply_fetch_success(records);
                FetchEvent::Success(count)
            }
            Ok(Err(e)) => FetchEvent::Error(e.to_string()),
            Err(e) => FetchEvent::Error(format!("fetch task failed: {e}")),
        };

        if fetch_machine.process_event(&event, app).is_err() {
            // Non-fatal state transition error
        }
        if fetch_machine
            .process_event(&FetchEvent::Reset, app)
            .is_err()
        {
            // Non-fatal reset error
        }
    }

    app.in_flight = still_running;
}
