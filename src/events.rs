use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::app::{App, DateField, View};

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    // If a date is being typed, keys edit it
    if app.date_input.is_some() {
        handle_date_input(app, key);
        return;
    }

    match key.code {
        // Quit
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),

        // View switching
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.prev_view();
            } else {
                app.next_view();
            }
        }
        KeyCode::BackTab => app.prev_view(),

        // Direct view access
        KeyCode::Char('1') => app.set_view(View::Dashboard),
        KeyCode::Char('2') => app.set_view(View::Timeline),
        KeyCode::Char('3') => app.set_view(View::Vibration),

        // Rows
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::PageUp => app.select_prev_n(10),
        KeyCode::PageDown => app.select_next_n(10),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),

        // Filter chips
        KeyCode::Left | KeyCode::Char('h') => app.move_chip(-1),
        KeyCode::Right | KeyCode::Char('l') => app.move_chip(1),
        KeyCode::Char(' ') => app.toggle_chip(),

        // Expand/collapse machine history
        KeyCode::Enter => app.toggle_expand(),

        // Vibration selections
        KeyCode::Char('m') => app.cycle_machine_filter(),
        KeyCode::Char('n') => app.cycle_sensor_filter(),

        // Date range
        KeyCode::Char('[') => app.shift_date(DateField::Start, -1),
        KeyCode::Char(']') => app.shift_date(DateField::Start, 1),
        KeyCode::Char('{') => app.shift_date(DateField::End, -1),
        KeyCode::Char('}') => app.shift_date(DateField::End, 1),
        KeyCode::Char('d') => app.start_date_input(DateField::Start),
        KeyCode::Char('D') => app.start_date_input(DateField::End),
        KeyCode::Char('x') => app.clear_dates(),

        // Reload
        KeyCode::Char('r') => app.reload(),

        // Help
        KeyCode::Char('?') => app.toggle_help(),

        // Export
        KeyCode::Char('e') => {
            let export_path = PathBuf::from(app.export_file_name());
            match app.export_state(&export_path) {
                Ok(()) => {
                    app.set_status_message(format!("Exported to {}", export_path.display()));
                }
                Err(e) => {
                    app.set_status_message(format!("Export failed: {}", e));
                }
            }
        }

        _ => {}
    }
}

/// Handle key input while a date is being typed
fn handle_date_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.commit_date_input(),
        KeyCode::Esc => app.cancel_date_input(),
        KeyCode::Backspace => app.input_pop(),
        KeyCode::Char(c) => app.input_push(c),
        _ => {}
    }
}

/// Handle mouse events
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent, content_start_row: u16) {
    match mouse.kind {
        // Scroll wheel
        MouseEventKind::ScrollUp => {
            app.select_prev();
        }
        MouseEventKind::ScrollDown => {
            app.select_next();
        }

        MouseEventKind::Down(MouseButton::Left) => {
            let clicked_row = mouse.row;

            // Rows start below the filter bar and the table header
            if clicked_row > content_start_row {
                let item_row = (clicked_row - content_start_row - 1) as usize;
                app.select_visible_row(item_row);
            }

            // Tab bar is row 1, after the header
            if clicked_row == 1 {
                let col = mouse.column;
                // Approximate tab positions: Dashboard (0-14), Timeline (15-28), Vibration (29-44)
                if col < 15 {
                    app.set_view(View::Dashboard);
                } else if col < 29 {
                    app.set_view(View::Timeline);
                } else if col < 45 {
                    app.set_view(View::Vibration);
                }
            }
        }

        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppOptions;
    use crate::source::FileSource;
    use crossterm::event::{KeyEventKind, KeyEventState, KeyModifiers};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn app_with_data() -> (tempfile::TempDir, App) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("diagnosis.json"),
            r#"[
                {"machine_name": "g1", "detected_at": "2025-06-10T09:00:00+09:00", "fault_type": 0},
                {"machine_name": "g1", "detected_at": "2025-06-09T09:00:00+09:00", "fault_type": 3},
                {"machine_name": "g2", "detected_at": "2025-06-10T08:00:00+09:00", "fault_type": 1}
            ]"#,
        )
        .unwrap();
        let mut app = App::new(Box::new(FileSource::new(dir.path())), AppOptions::default());
        app.set_view(View::Dashboard);
        app.poll_source();
        (dir, app)
    }

    #[test]
    fn test_quit_and_view_keys() {
        let (_dir, mut app) = app_with_data();

        handle_key_event(&mut app, key(KeyCode::Char('3')));
        assert_eq!(app.current_view, View::Vibration);
        handle_key_event(&mut app, key(KeyCode::Tab));
        assert_eq!(app.current_view, View::Dashboard);
        handle_key_event(&mut app, key(KeyCode::BackTab));
        assert_eq!(app.current_view, View::Vibration);

        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(!app.running);
    }

    #[test]
    fn test_help_swallows_next_key() {
        let (_dir, mut app) = app_with_data();

        handle_key_event(&mut app, key(KeyCode::Char('?')));
        assert!(app.show_help);
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(!app.show_help);
        assert!(app.running);
    }

    #[test]
    fn test_enter_expands_and_date_input_captures_keys() {
        let (_dir, mut app) = app_with_data();

        handle_key_event(&mut app, key(KeyCode::Enter));
        assert_eq!(app.dashboard.rows().len(), 3);

        handle_key_event(&mut app, key(KeyCode::Char('d')));
        assert_eq!(app.date_input, Some(DateField::Start));
        // 'q' is ignored while typing rather than quitting
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(app.running);
        handle_key_event(&mut app, key(KeyCode::Esc));
        assert!(app.date_input.is_none());
    }

    #[test]
    fn test_mouse_selects_rows_and_tabs() {
        let (_dir, mut app) = app_with_data();

        handle_mouse_event(&mut app, click(5, 8), 6);
        assert_eq!(app.dashboard.selected, 1);

        // Past the last row leaves the selection alone
        handle_mouse_event(&mut app, click(5, 20), 6);
        assert_eq!(app.dashboard.selected, 1);

        handle_mouse_event(&mut app, click(20, 1), 6);
        assert_eq!(app.current_view, View::Timeline);
    }

    #[test]
    fn test_mouse_click_accounts_for_scrolled_table() {
        let dir = tempfile::tempdir().unwrap();
        let records: Vec<String> = (0..40)
            .map(|i| {
                format!(
                    r#"{{"machine_name": "g1", "sensor_no": {}, "collected_at": "2025-06-10T09:00:00",
                        "measured_time": 1.0, "normal": 0.9, "unbalance": 0.05, "looseness": 0.03,
                        "unbalance_looseness": 0.02}}"#,
                    i
                )
            })
            .collect();
        std::fs::write(
            dir.path().join("vibration.json"),
            format!("[{}]", records.join(",")),
        )
        .unwrap();

        let mut app = App::new(Box::new(FileSource::new(dir.path())), AppOptions::default());
        app.set_view(View::Vibration);
        app.poll_source();

        // Table scrolled so row 25 is at the top
        app.vibration.offset = 25;
        handle_mouse_event(&mut app, click(5, 9), 6);
        assert_eq!(app.vibration.selected, 27);

        // Clicking below the last row leaves the selection alone
        handle_mouse_event(&mut app, click(5, 30), 6);
        assert_eq!(app.vibration.selected, 27);
    }
}
