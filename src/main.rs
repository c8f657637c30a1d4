// Binary includes library modules - some public API items are only for library consumers
#![allow(unused)]

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Terminal,
};

mod app;
mod config;
mod data;
mod error;
mod events;
mod export;
mod logging;
mod source;
mod ui;

use app::{App, AppOptions, View};
use crate::config::Settings;
use source::{fetch_blocking, DataSource, Endpoint, FileSource, HttpSource, Payload};

/// Initial view selectable from the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum StartView {
    Dashboard,
    Timeline,
    Vibration,
}

impl From<StartView> for View {
    fn from(view: StartView) -> Self {
        match view {
            StartView::Dashboard => View::Dashboard,
            StartView::Timeline => View::Timeline,
            StartView::Vibration => View::Vibration,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "vibration-doctor")]
#[command(about = "Terminal dashboard for machine-vibration diagnosis results")]
struct Args {
    /// Base URL of the diagnosis API
    #[arg(short, long, conflicts_with = "dir")]
    api: Option<String>,

    /// Read diagnosis.json / vibration.json from a directory instead of the API
    #[arg(short, long, conflicts_with = "api")]
    dir: Option<PathBuf>,

    /// TOML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Records per group requested by the vibration view
    #[arg(long)]
    per_group_limit: Option<u32>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// View shown at startup
    #[arg(long, value_enum, default_value = "dashboard")]
    view: StartView,

    /// Export all views to a JSON file and exit
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Tracing output file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(ref api) = args.api {
        settings.api.base_url = api.clone();
    }
    if let Some(limit) = args.per_group_limit {
        settings.api.per_group_limit = limit;
    }
    if let Some(timeout) = args.timeout {
        settings.api.timeout_secs = timeout;
    }
    if let Some(ref log_file) = args.log_file {
        settings.log.file = log_file.clone();
    }

    logging::init_tracing(&settings.log)?;
    tracing::info!(?settings, "starting");

    // Build a tokio runtime for HTTP fetches; it lives until the TUI exits
    let rt = tokio::runtime::Runtime::new()?;
    let timeout = Duration::from_secs(settings.api.timeout_secs);

    let mut source: Box<dyn DataSource> = match args.dir {
        Some(ref dir) => Box::new(FileSource::new(dir)),
        None => Box::new(
            HttpSource::new(&settings.api.base_url, timeout, rt.handle().clone())
                .context("Failed to build HTTP client")?,
        ),
    };

    let options = AppOptions {
        machines: settings.dashboard.machines.clone(),
        per_group_limit: settings.api.per_group_limit,
    };

    // Handle export mode (non-interactive)
    if let Some(export_path) = args.export {
        // Leave a second of slack over the client's own timeout
        let wait = timeout + Duration::from_secs(1);
        return export_to_file(source.as_mut(), &options, &export_path, wait);
    }

    run_tui(source, options, args.view.into())
}

/// Run the TUI with the given data source
fn run_tui(source: Box<dyn DataSource>, options: AppOptions, view: View) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    // Create app and mount the first view
    let mut app = App::new(source, options);
    app.set_view(view);

    // Run the main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 70;
    const MIN_HEIGHT: u16 = 14;

    while app.running {
        app.poll_source();

        // Draw UI
        terminal.draw(|frame| {
            let area = frame.area();

            // Check for minimum terminal size
            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                let centered =
                    ratatui::layout::Rect::new(0, (area.height / 2).saturating_sub(2), area.width, 5)
                        .intersection(area);
                frame.render_widget(paragraph, centered);
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Length(1), // Tabs
                Constraint::Min(8),    // Content
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            ui::common::render_header(frame, app, chunks[0]);
            ui::common::render_tabs(frame, app, chunks[1]);

            match app.current_view {
                View::Dashboard => ui::dashboard::render(frame, app, chunks[2]),
                View::Timeline => ui::timeline::render(frame, app, chunks[2]),
                View::Vibration => ui::vibration::render(frame, app, chunks[2]),
            }

            ui::common::render_status_bar(frame, app, chunks[3]);

            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        // Poll for events with a short timeout
        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => {
                    // Rows start after header (1) + tabs (1) + filter bar (3) + table border and header (2)
                    events::handle_mouse_event(app, mouse, 6);
                }
                Event::Resize(_, _) => {
                    // Terminal will redraw on next iteration
                }
                _ => {}
            }
        }
    }

    Ok(())
}

/// Fetch both datasets and export every view with its initial filters.
fn export_to_file(
    source: &mut dyn DataSource,
    options: &AppOptions,
    export_path: &Path,
    wait: Duration,
) -> Result<()> {
    let diagnoses = match fetch_blocking(source, Endpoint::DiagnosisRecent, 1, wait)
        .context("Failed to fetch diagnoses")?
    {
        Payload::Diagnoses(v) => v.records,
        Payload::Vibrations(_) => anyhow::bail!("Diagnosis endpoint returned vibration data"),
    };

    let endpoint = Endpoint::VibrationRange {
        per_group_limit: options.per_group_limit,
    };
    let vibrations = match fetch_blocking(source, endpoint, 2, wait)
        .context("Failed to fetch vibration data")?
    {
        Payload::Vibrations(v) => v.records,
        Payload::Diagnoses(_) => anyhow::bail!("Vibration endpoint returned diagnoses"),
    };

    let report = export::full_report(
        &diagnoses,
        &vibrations,
        &options.machines,
        data::dates::today_kst(),
    );
    export::write_json(export_path, &report)?;

    tracing::info!(path = %export_path.display(), "exported report");
    println!("Exported report to: {}", export_path.display());
    Ok(())
}
