//! Application state and navigation logic.
//!
//! Each view owns its records and filters. Switching views unmounts the
//! current one (its data is dropped) and mounts the next, which issues a
//! fresh fetch tagged with a new generation number. Responses from earlier
//! generations are ignored.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::NaiveDate;

use crate::data::dates::{parse_date, today_kst};
use crate::data::diagnosis::{self, DEFAULT_MACHINES};
use crate::data::{
    timeline, vibration, DateRange, DiagnosisFilter, DiagnosisRecord, DiagnosisRow, FaultType,
    MachineSeries, VibrationFilter, VibrationRecord,
};
use crate::export;
use crate::source::{DataSource, Endpoint, FetchRequest, FetchResponse, Payload};
use crate::ui::Theme;

/// The current view/tab in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Latest diagnosis per machine with expandable history.
    Dashboard,
    /// Fault-type timeline chart per machine.
    Timeline,
    /// Raw vibration measurements.
    Vibration,
}

impl View {
    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Dashboard => View::Timeline,
            View::Timeline => View::Vibration,
            View::Vibration => View::Dashboard,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        match self {
            View::Dashboard => View::Vibration,
            View::Timeline => View::Dashboard,
            View::Vibration => View::Timeline,
        }
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::Timeline => "Timeline",
            View::Vibration => "Vibration",
        }
    }

    /// Lower-case name used for export files and the `--view` flag.
    pub fn slug(&self) -> &'static str {
        match self {
            View::Dashboard => "dashboard",
            View::Timeline => "timeline",
            View::Vibration => "vibration",
        }
    }
}

/// Progress of the mounted view's fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchState {
    Idle,
    Loading { since: Instant },
    Loaded { at: Instant, rejected: usize },
    Failed(String),
}

/// Which bound of the date range is being typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    Start,
    End,
}

/// A toggle in a view's filter bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chip {
    Machine(String),
    Fault(FaultType),
}

/// Startup options shared by every mount.
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// Machines offered on the dashboard, all selected initially.
    pub machines: Vec<String>,
    pub per_group_limit: u32,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            machines: DEFAULT_MACHINES.iter().map(|m| m.to_string()).collect(),
            per_group_limit: 1000,
        }
    }
}

/// Dashboard view state.
#[derive(Debug, Clone)]
pub struct DashboardPage {
    pub records: Vec<DiagnosisRecord>,
    /// Machines shown as chips, in configured order.
    pub offered: Vec<String>,
    pub filter: DiagnosisFilter,
    pub chip_index: usize,
    pub selected: usize,
    /// First row visible in the table as of the last frame.
    pub offset: usize,
}

impl DashboardPage {
    fn new(machines: &[String]) -> Self {
        Self {
            records: Vec::new(),
            offered: machines.to_vec(),
            filter: DiagnosisFilter::with_machines(machines.to_vec()),
            chip_index: 0,
            selected: 0,
            offset: 0,
        }
    }

    pub fn rows(&self) -> Vec<DiagnosisRow<'_>> {
        diagnosis::build_rows(&self.records, &self.filter)
    }

    /// Machine chips followed by one chip per fault type.
    pub fn chips(&self) -> Vec<Chip> {
        self.offered
            .iter()
            .cloned()
            .map(Chip::Machine)
            .chain(FaultType::ALL.iter().copied().map(Chip::Fault))
            .collect()
    }

    pub fn chip_enabled(&self, chip: &Chip) -> bool {
        match chip {
            Chip::Machine(m) => self.filter.includes_machine(m),
            Chip::Fault(f) => self.filter.includes_fault(*f),
        }
    }
}

/// Timeline view state.
#[derive(Debug, Clone)]
pub struct TimelinePage {
    pub records: Vec<DiagnosisRecord>,
    /// Distinct machines in the loaded data, in first-appearance order.
    pub machines: Vec<String>,
    /// Selected machines; order decides series colors.
    pub selected: Vec<String>,
    pub range: DateRange,
    pub chip_index: usize,
}

impl TimelinePage {
    fn new(today: NaiveDate) -> Self {
        Self {
            records: Vec::new(),
            machines: Vec::new(),
            selected: Vec::new(),
            range: DateRange::last_two_days(today),
            chip_index: 0,
        }
    }

    fn load(&mut self, records: Vec<DiagnosisRecord>) {
        self.machines =
            crate::data::distinct_in_order(records.iter().map(|r| r.machine_name.as_str()));
        self.selected = self.machines.clone();
        self.records = records;
    }

    pub fn series(&self) -> Vec<MachineSeries> {
        timeline::build_series(&self.records, &self.selected, &self.range)
    }

    pub fn is_selected(&self, machine: &str) -> bool {
        self.selected.iter().any(|m| m == machine)
    }
}

/// Vibration view state.
#[derive(Debug, Clone, Default)]
pub struct VibrationPage {
    pub records: Vec<VibrationRecord>,
    pub filter: VibrationFilter,
    pub selected: usize,
    /// First row visible in the table as of the last frame.
    pub offset: usize,
}

impl VibrationPage {
    pub fn rows(&self) -> Vec<&VibrationRecord> {
        vibration::filter_rows(&self.records, &self.filter)
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,

    // Data source
    source: Box<dyn DataSource>,
    generation: u64,
    pub fetch_state: FetchState,
    pub options: AppOptions,

    // Per-view state; only the mounted view holds data
    pub dashboard: DashboardPage,
    pub timeline: TimelinePage,
    pub vibration: VibrationPage,

    // Date entry
    pub date_input: Option<DateField>,
    pub input_text: String,

    /// Calendar day used for the default timeline window.
    pub today: NaiveDate,
    clock: Box<dyn Fn() -> NaiveDate>,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App. Nothing is fetched until a view is mounted.
    pub fn new(source: Box<dyn DataSource>, options: AppOptions) -> Self {
        Self::with_clock(source, options, Box::new(today_kst))
    }

    /// Create a new App that reads the current day from `clock`.
    ///
    /// The clock is consulted on every mount and whenever date bounds are
    /// derived from today.
    pub fn with_clock(
        source: Box<dyn DataSource>,
        options: AppOptions,
        clock: Box<dyn Fn() -> NaiveDate>,
    ) -> Self {
        let today = clock();
        Self {
            running: true,
            current_view: View::Dashboard,
            show_help: false,
            source,
            generation: 0,
            fetch_state: FetchState::Idle,
            dashboard: DashboardPage::new(&options.machines),
            timeline: TimelinePage::new(today),
            vibration: VibrationPage::default(),
            options,
            date_input: None,
            input_text: String::new(),
            today,
            clock,
            theme: Theme::auto_detect(),
            status_message: None,
        }
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// Generation of the mounted view.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired (3 seconds).
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < Duration::from_secs(3) {
                return Some(msg);
            }
        }
        None
    }

    fn endpoint_for(&self, view: View) -> Endpoint {
        match view {
            View::Dashboard | View::Timeline => Endpoint::DiagnosisRecent,
            View::Vibration => Endpoint::VibrationRange {
                per_group_limit: self.options.per_group_limit,
            },
        }
    }

    /// Unmount whatever is shown and mount `view` with fresh state and a new fetch.
    pub fn mount(&mut self, view: View) {
        self.generation += 1;
        self.current_view = view;
        self.today = (self.clock)();

        self.dashboard = DashboardPage::new(&self.options.machines);
        self.timeline = TimelinePage::new(self.today);
        self.vibration = VibrationPage::default();
        self.date_input = None;
        self.input_text.clear();

        let endpoint = self.endpoint_for(view);
        tracing::info!(view = view.slug(), generation = self.generation, "mounting view");

        self.fetch_state = FetchState::Loading {
            since: Instant::now(),
        };
        self.source.request(FetchRequest {
            generation: self.generation,
            endpoint,
        });
    }

    /// Switch to a specific view. Re-selecting the current view does nothing.
    pub fn set_view(&mut self, view: View) {
        if view != self.current_view || self.generation == 0 {
            self.mount(view);
        }
    }

    /// Switch to the next view (Dashboard → Timeline → Vibration).
    pub fn next_view(&mut self) {
        self.set_view(self.current_view.next());
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.set_view(self.current_view.prev());
    }

    /// Remount the current view, discarding its state and refetching.
    pub fn reload(&mut self) {
        self.mount(self.current_view);
    }

    /// Drain finished fetches. Returns true if the mounted view changed.
    pub fn poll_source(&mut self) -> bool {
        let mut changed = false;
        while let Some(response) = self.source.poll() {
            if response.generation != self.generation {
                tracing::debug!(
                    stale = response.generation,
                    current = self.generation,
                    "discarding response for unmounted view"
                );
                continue;
            }
            self.apply(response);
            changed = true;
        }
        changed
    }

    fn apply(&mut self, response: FetchResponse) {
        match response.result {
            Ok(payload) => {
                let rejected = payload.rejected();
                match (payload, self.current_view) {
                    (Payload::Diagnoses(v), View::Dashboard) => self.dashboard.records = v.records,
                    (Payload::Diagnoses(v), View::Timeline) => self.timeline.load(v.records),
                    (Payload::Vibrations(v), View::Vibration) => self.vibration.records = v.records,
                    (_, view) => {
                        tracing::warn!(view = view.slug(), endpoint = ?response.endpoint, "payload does not fit view");
                    }
                }
                if rejected > 0 {
                    self.set_status_message(format!("Skipped {} malformed records", rejected));
                }
                self.fetch_state = FetchState::Loaded {
                    at: Instant::now(),
                    rejected,
                };
            }
            Err(e) => {
                self.fetch_state = FetchState::Failed(e.to_string());
            }
        }
    }

    /// Whole seconds spent waiting on the current fetch.
    pub fn loading_seconds(&self) -> Option<u64> {
        match self.fetch_state {
            FetchState::Loading { since } => Some(since.elapsed().as_secs()),
            _ => None,
        }
    }

    // ---- row selection ----

    fn row_count(&self) -> usize {
        match self.current_view {
            View::Dashboard => self.dashboard.rows().len(),
            View::Vibration => self.vibration.rows().len(),
            View::Timeline => 0,
        }
    }

    fn selected_mut(&mut self) -> Option<&mut usize> {
        match self.current_view {
            View::Dashboard => Some(&mut self.dashboard.selected),
            View::Vibration => Some(&mut self.vibration.selected),
            View::Timeline => None,
        }
    }

    fn clamp_selection(&mut self) {
        let max = self.row_count().saturating_sub(1);
        if let Some(selected) = self.selected_mut() {
            *selected = (*selected).min(max);
        }
    }

    /// Move selection down by one row.
    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    /// Move selection up by one row.
    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    /// Move selection down by n rows.
    pub fn select_next_n(&mut self, n: usize) {
        let max = self.row_count().saturating_sub(1);
        if let Some(selected) = self.selected_mut() {
            *selected = (*selected + n).min(max);
        }
    }

    /// Move selection up by n rows.
    pub fn select_prev_n(&mut self, n: usize) {
        if let Some(selected) = self.selected_mut() {
            *selected = selected.saturating_sub(n);
        }
    }

    /// Jump to the first row.
    pub fn select_first(&mut self) {
        if let Some(selected) = self.selected_mut() {
            *selected = 0;
        }
    }

    /// Jump to the last row.
    pub fn select_last(&mut self) {
        let last = self.row_count().saturating_sub(1);
        if let Some(selected) = self.selected_mut() {
            *selected = last;
        }
    }

    /// Select the row shown at `position` on screen, counting from the
    /// first visible row.
    pub fn select_visible_row(&mut self, position: usize) {
        let offset = match self.current_view {
            View::Dashboard => self.dashboard.offset,
            View::Vibration => self.vibration.offset,
            View::Timeline => return,
        };
        self.select_row(offset + position);
    }

    /// Select a row by its index in the table, if it exists.
    pub fn select_row(&mut self, index: usize) {
        if index < self.row_count() {
            if let Some(selected) = self.selected_mut() {
                *selected = index;
            }
        }
    }

    // ---- filter chips ----

    fn chip_count(&self) -> usize {
        match self.current_view {
            View::Dashboard => self.dashboard.chips().len(),
            View::Timeline => self.timeline.machines.len(),
            View::Vibration => 0,
        }
    }

    /// Move the filter-bar cursor, wrapping at either end.
    pub fn move_chip(&mut self, delta: isize) {
        let count = self.chip_count();
        if count == 0 {
            return;
        }
        let index = match self.current_view {
            View::Dashboard => &mut self.dashboard.chip_index,
            View::Timeline => &mut self.timeline.chip_index,
            View::Vibration => return,
        };
        *index = (*index as isize + delta).rem_euclid(count as isize) as usize;
    }

    /// Toggle the chip under the cursor.
    pub fn toggle_chip(&mut self) {
        match self.current_view {
            View::Dashboard => {
                let Some(chip) = self.dashboard.chips().get(self.dashboard.chip_index).cloned()
                else {
                    return;
                };
                match chip {
                    Chip::Machine(m) => self.dashboard.filter.toggle_machine(&m),
                    Chip::Fault(f) => self.dashboard.filter.toggle_fault_type(f),
                }
                self.clamp_selection();
            }
            View::Timeline => {
                let Some(machine) = self.timeline.machines.get(self.timeline.chip_index).cloned()
                else {
                    return;
                };
                timeline::toggle_selection(&mut self.timeline.selected, &machine);
            }
            View::Vibration => {}
        }
    }

    /// Expand or collapse the machine of the selected row.
    ///
    /// Only a machine's latest row toggles it.
    pub fn toggle_expand(&mut self) {
        if self.current_view != View::Dashboard {
            return;
        }
        let machine = self
            .dashboard
            .rows()
            .get(self.dashboard.selected)
            .filter(|row| row.is_latest())
            .map(|row| row.record.machine_name.clone());
        if let Some(machine) = machine {
            self.dashboard.filter.toggle_expanded(&machine);
            self.clamp_selection();
        }
    }

    /// Step the vibration machine selection through ALL and each machine.
    pub fn cycle_machine_filter(&mut self) {
        if self.current_view != View::Vibration {
            return;
        }
        let choices = vibration::machine_choices(&self.vibration.records);
        self.vibration.filter.machine = self.vibration.filter.machine.cycle(&choices);
        self.clamp_selection();
    }

    /// Step the vibration sensor selection through ALL and each sensor.
    pub fn cycle_sensor_filter(&mut self) {
        if self.current_view != View::Vibration {
            return;
        }
        let choices = vibration::sensor_choices(&self.vibration.records);
        self.vibration.filter.sensor = self.vibration.filter.sensor.cycle(&choices);
        self.clamp_selection();
    }

    // ---- date range ----

    /// Date range of the current view, if it has one.
    pub fn date_range(&self) -> Option<&DateRange> {
        match self.current_view {
            View::Dashboard => Some(&self.dashboard.filter.range),
            View::Timeline => Some(&self.timeline.range),
            View::Vibration => None,
        }
    }

    fn date_range_mut(&mut self) -> Option<&mut DateRange> {
        match self.current_view {
            View::Dashboard => Some(&mut self.dashboard.filter.range),
            View::Timeline => Some(&mut self.timeline.range),
            View::Vibration => None,
        }
    }

    /// Move one bound of the date range by `days`.
    pub fn shift_date(&mut self, field: DateField, days: i64) {
        self.today = (self.clock)();
        let today = self.today;
        if let Some(range) = self.date_range_mut() {
            match field {
                DateField::Start => range.shift_start(days, today),
                DateField::End => range.shift_end(days, today),
            }
        }
        self.clamp_selection();
    }

    /// Reset the date range: unbounded on the dashboard, the last two days on the timeline.
    pub fn clear_dates(&mut self) {
        match self.current_view {
            View::Dashboard => self.dashboard.filter.range = DateRange::unbounded(),
            View::Timeline => {
                self.today = (self.clock)();
                self.timeline.range = DateRange::last_two_days(self.today);
            }
            View::Vibration => return,
        }
        self.clamp_selection();
    }

    /// Start typing a date bound, prefilled with its current value.
    pub fn start_date_input(&mut self, field: DateField) {
        let Some(range) = self.date_range() else {
            return;
        };
        let current = match field {
            DateField::Start => range.start,
            DateField::End => range.end,
        };
        self.input_text = current.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default();
        self.date_input = Some(field);
    }

    /// Append a character to the date being typed.
    pub fn input_push(&mut self, c: char) {
        if c.is_ascii_digit() || c == '-' {
            self.input_text.push(c);
        }
    }

    /// Remove the last character of the date being typed.
    pub fn input_pop(&mut self) {
        self.input_text.pop();
    }

    /// Abandon date entry.
    pub fn cancel_date_input(&mut self) {
        self.date_input = None;
        self.input_text.clear();
    }

    /// Apply the typed date.
    ///
    /// An empty entry clears the bound on the dashboard; the timeline always
    /// keeps both bounds.
    pub fn commit_date_input(&mut self) {
        let Some(field) = self.date_input.take() else {
            return;
        };
        let text = std::mem::take(&mut self.input_text);

        let value = if text.trim().is_empty() {
            if self.current_view == View::Timeline {
                self.set_status_message("Timeline needs both dates".to_string());
                return;
            }
            None
        } else {
            match parse_date(&text) {
                Ok(date) => Some(date),
                Err(e) => {
                    self.set_status_message(e.to_string());
                    return;
                }
            }
        };

        if let Some(range) = self.date_range_mut() {
            match field {
                DateField::Start => range.start = value,
                DateField::End => range.end = value,
            }
        }
        self.clamp_selection();
    }

    // ---- misc ----

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// File name used by the in-app export of the current view.
    pub fn export_file_name(&self) -> String {
        format!("{}_export.json", self.current_view.slug())
    }

    /// Export the current view's derived rows to a JSON file.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        if !matches!(self.fetch_state, FetchState::Loaded { .. }) {
            anyhow::bail!("No data to export");
        }

        let value = match self.current_view {
            View::Dashboard => {
                export::dashboard_report(&self.dashboard.rows(), &self.dashboard.filter)
            }
            View::Timeline => export::timeline_report(&self.timeline.series(), &self.timeline.range),
            View::Vibration => {
                export::vibration_report(&self.vibration.rows(), &self.vibration.filter)
            }
        };

        export::write_json(path, &value)
    }
}
