// Library crate: public API items may not be used by the binary
#![allow(unused)]

//! # vibration-doctor
//!
//! A terminal dashboard for machine-vibration diagnosis results.
//!
//! This crate fetches diagnosis records and raw vibration measurements from
//! an HTTP API (or a directory of saved responses) and presents them in
//! three views: the latest diagnosis per machine with expandable history,
//! a per-machine fault timeline with change points highlighted, and a
//! filterable table of vibration scores.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐ │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal│ │
//! │  │ (state) │    │(transform)    │(rendering)   │         │ │
//! │  └────┬────┘    └──────────┘    └─────────┘    └─────────┘ │
//! │       │ FetchRequest / FetchResponse                        │
//! │       ▼                                                     │
//! │  ┌─────────┐                                                │
//! │  │ source  │◀── HttpSource | FileSource                     │
//! │  │ (input) │                                                │
//! │  └─────────┘                                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: Application state, view mounting, and user interaction logic
//! - **[`source`]**: Data source abstraction ([`DataSource`] trait) with an HTTP
//!   implementation and a directory-backed one for offline use
//! - **[`data`]**: Record types and the pure transforms behind each view
//! - **[`ui`]**: Terminal rendering using ratatui - tables, charts, and theme support
//! - **[`config`]**, **[`logging`]**, **[`export`]**: settings, tracing setup, JSON export
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Talk to the diagnosis API
//! vibration-doctor --api http://10.0.0.5:8000
//!
//! # Browse saved responses offline
//! vibration-doctor --dir ./snapshots
//!
//! # Write all three views to JSON and exit
//! vibration-doctor --dir ./snapshots --export report.json
//! ```
//!
//! ### As a library with file source
//!
//! ```
//! use vibration_doctor::{App, AppOptions, FileSource};
//!
//! let source = Box::new(FileSource::new("snapshots"));
//! let app = App::new(source, AppOptions::default());
//! ```
//!
//! ### As a library with HTTP source
//!
//! ```no_run
//! use std::time::Duration;
//! use vibration_doctor::{App, AppOptions, HttpSource};
//!
//! # tokio_test::block_on(async {
//! let handle = tokio::runtime::Handle::current();
//! let source = HttpSource::new("http://127.0.0.1:8000", Duration::from_secs(30), handle).unwrap();
//! let app = App::new(Box::new(source), AppOptions::default());
//! # });
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod events;
pub mod export;
pub mod logging;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::{App, AppOptions, View};
pub use data::{DiagnosisRecord, FaultType, VibrationRecord};
pub use error::FetchError;
pub use source::{DataSource, Endpoint, FileSource, HttpSource};
