use std::time::Instant;

use tokio::task::JoinHandle;

use crate::aggregate::{derive_options, FilterOptions};
use crate::api::{ApiError, Record};
use crate::app::actions::AppActions;
use crate::domain::{FilterField, FilterState};

pub const CHART_TAB_COUNT: usize = 2;

#[derive(Debug)]
pub struct App {
    pub running: bool,
    pub filters: FilterState,
    pub options: FilterOptions,
    pub records: Vec<Record>,
    pub status_message: String,
    pub show_help: bool,
    pub selected_filter: usize,
    pub chart_tab_index: usize,
    /// Set by any filter change (and once on startup); consumed by the
    /// event loop, which issues exactly one fetch per flag.
    pub pending_fetch: bool,
    pub fetch_count: u64,
    pub error_count: u64,
    pub animation_counter: f64,
    pub last_frame: Instant,
    /// Outstanding fetches. Never aborted: whichever response lands last
    /// determines the displayed state.
    pub in_flight: Vec<JoinHandle<Result<Vec<Record>, ApiError>>>,
    pub actions: AppActions,
}

impl App {
    pub fn new() -> Self {
        Self {
            running: true,
            filters: FilterState::default(),
            options: FilterOptions::default(),
            records: Vec::new(),
            status_message: String::new(),
            show_help: false,
            selected_filter: 0,
            chart_tab_index: 0,
            // One fetch on mount, with the all-empty filter state.
            pending_fetch: true,
            fetch_count: 0,
            error_count: 0,
            animation_counter: 0.0,
            last_frame: Instant::now(),
            in_flight: Vec::new(),
            actions: AppActions::new(),
        }
    }

    pub fn update(&mut self) {
        let now = Instant::now();
        let delta = now.duration_since(self.last_frame);
        self.last_frame = now;

        // Update animation counter (cycles between 0 and 2*PI)
        self.animation_counter += delta.as_secs_f64() * 2.0;
        if self.animation_counter > 2.0 * std::f64::consts::PI {
            self.animation_counter -= 2.0 * std::f64::consts::PI;
        }
    }

    pub fn selected_field(&self) -> FilterField {
        FilterField::from_index(self.selected_filter).unwrap_or(FilterField::EndYear)
    }

    pub fn select_next_filter(&mut self) {
        self.selected_filter = (self.selected_filter + 1) % FilterField::ALL.len();
    }

    pub fn select_prev_filter(&mut self) {
        self.selected_filter =
            (self.selected_filter + FilterField::ALL.len() - 1) % FilterField::ALL.len();
    }

    pub fn next_chart_tab(&mut self) {
        self.chart_tab_index = (self.chart_tab_index + 1) % CHART_TAB_COUNT;
    }

    pub fn prev_chart_tab(&mut self) {
        self.chart_tab_index = (self.chart_tab_index + CHART_TAB_COUNT - 1) % CHART_TAB_COUNT;
    }

    /// The single mutation entry point for the filter selection. Replaces
    /// one entry and flags a refetch, mirroring the one-change-one-fetch
    /// contract.
    pub fn set_filter(&mut self, field: FilterField, value: impl Into<String>) {
        self.filters.set(field, value);
        self.pending_fetch = true;
    }

    /// Steps the selected filter through "All" plus the options derived
    /// from the current record set, wrapping in either direction.
    pub fn cycle_option(&mut self, step: isize) {
        let field = self.selected_field();
        let options = self.options.for_field(field);
        // Position 0 is "All" (the empty selection).
        let len = options.len() + 1;
        let current = options
            .iter()
            .position(|option| option == self.filters.get(field))
            .map_or(0, |index| index + 1);

        let next = (current as isize + step).rem_euclid(len as isize) as usize;
        let value = if next == 0 {
            String::new()
        } else {
            options[next - 1].clone()
        };
        self.set_filter(field, value);
    }

    pub fn clear_selected_filter(&mut self) {
        let field = self.selected_field();
        if !self.filters.get(field).is_empty() {
            self.set_filter(field, "");
        }
    }

    pub fn reset_filters(&mut self) {
        self.filters = FilterState::default();
        self.pending_fetch = true;
    }

    pub fn force_refetch(&mut self) {
        self.pending_fetch = true;
    }

    pub fn fetch_in_flight(&self) -> bool {
        !self.in_flight.is_empty()
    }

    /// Replaces the record set and recomputes the filter options from it.
    /// Options are never merged with previous values: they narrow as the
    /// server-side result set narrows.
    pub fn apply_fetch_success(&mut self, records: Vec<Record>) {
        self.records = records;
        self.options = derive_options(&self.records);
        self.fetch_count += 1;
        self.status_message = format!("Loaded {} records", self.records.len());
    }

    /// Stale-data-on-error: the previous records and options stay on
    /// screen; only the status line and the error counter change.
    pub fn apply_fetch_failure(&mut self, error: &str) {
        self.error_count += 1;
        self.status_message = format!("Fetch failed: {error}");
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_records() -> Vec<Record> {
        vec![
            Record {
                region: Some("Asia".to_string()),
                sector: Some("Energy".to_string()),
                topic: Some("gas".to_string()),
                intensity: Some(5.0),
                published: Some("1, 2015".to_string()),
                ..Record::default()
            },
            Record {
                region: Some("EU".to_string()),
                sector: Some("Energy".to_string()),
                intensity: Some(2.0),
                published: Some("1, 2016".to_string()),
                ..Record::default()
            },
        ]
    }

    #[test]
    fn starts_with_one_pending_fetch_and_empty_filters() {
        let app = App::new();
        assert!(app.pending_fetch);
        assert!(app.filters.is_unfiltered());
        assert!(app.records.is_empty());
    }

    #[test]
    fn filter_change_flags_one_fetch_with_other_params_preserved() {
        let mut app = App::new();
        app.pending_fetch = false;
        app.set_filter(FilterField::Topic, "gas");
        app.pending_fetch = false;

        app.set_filter(FilterField::Region, "Asia");
        assert!(app.pending_fetch);

        let params = app.filters.query_params();
        assert!(params.contains(&("region", "Asia".to_string())));
        assert!(params.contains(&("topic", "gas".to_string())));
        assert!(params.contains(&("sector", String::new())));
    }

    #[test]
    fn success_replaces_records_and_recomputes_options() {
        let mut app = App::new();
        app.apply_fetch_success(sample_records());

        assert_eq!(app.fetch_count, 1);
        assert_eq!(app.records.len(), 2);
        assert_eq!(app.options.regions, vec!["Asia", "EU"]);
        assert_eq!(app.options.sectors, vec!["Energy"]);
        assert_eq!(app.status_message, "Loaded 2 records");
    }

    #[test]
    fn failure_keeps_stale_data_and_logs_once() {
        let mut app = App::new();
        app.apply_fetch_success(sample_records());
        let options_before = app.options.clone();

        app.apply_fetch_failure("connection refused");

        assert_eq!(app.error_count, 1);
        assert_eq!(app.records.len(), 2);
        assert_eq!(app.options, options_before);
        assert_eq!(app.status_message, "Fetch failed: connection refused");
    }

    #[test]
    fn cycling_wraps_through_all_and_each_option() {
        let mut app = App::new();
        app.apply_fetch_success(sample_records());
        app.selected_filter = 3; // Region
        assert_eq!(app.selected_field(), FilterField::Region);

        app.cycle_option(1);
        assert_eq!(app.filters.get(FilterField::Region), "Asia");
        app.cycle_option(1);
        assert_eq!(app.filters.get(FilterField::Region), "EU");
        app.cycle_option(1);
        assert_eq!(app.filters.get(FilterField::Region), "");
        app.cycle_option(-1);
        assert_eq!(app.filters.get(FilterField::Region), "EU");
    }

    #[test]
    fn clearing_an_empty_filter_does_not_flag_a_fetch() {
        let mut app = App::new();
        app.pending_fetch = false;

        app.clear_selected_filter();
        assert!(!app.pending_fetch);

        app.set_filter(FilterField::EndYear, "2027");
        app.pending_fetch = false;
        app.selected_filter = 0;
        app.clear_selected_filter();
        assert!(app.pending_fetch);
        assert!(app.filters.is_unfiltered());
    }
}
