pub mod action;
pub mod state;
pub mod view;

use crate::cache::DayCache;
use crate::calendar::CalendarSystem;
use crate::client::OrthoClient;
use crate::config::Config;
use crate::hymns::HymnPlayer;
use crate::tui::action::{Action, AppEvent};
use crate::tui::state::{AppState, Focus, Page};
use crate::tui::view::draw;
use anyhow::Result;
use chrono::NaiveDate;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind,
        MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{io, time::Duration};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{error, info, warn};

const VOLUME_STEP: f32 = 0.05;

pub async fn run(config: Config, calendar: CalendarSystem, today: NaiveDate) -> Result<()> {
    let client = OrthoClient::new(&config)?;
    let cache = if config.offline_cache {
        DayCache::default_location()
    } else {
        None
    };
    let client = client.with_cache(cache);
    let hymns = HymnPlayer::from_config(&config.hymns);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app_state = AppState::new(calendar, today, hymns);
    let (action_tx, mut action_rx) = mpsc::channel(10);
    let (event_tx, mut event_rx) = mpsc::channel(10);

    // Worker: one request at a time, replies tagged with what was asked for.
    tokio::spawn(async move {
        while let Some(action) = action_rx.recv().await {
            match action {
                Action::Quit => break,
                Action::LoadDay { calendar, date } => {
                    let status = format!("Fetching {} ({} calendar)...", date, calendar);
                    let _ = event_tx.send(AppEvent::Status(status)).await;
                    let result = client
                        .load_day(calendar, date)
                        .await
                        .map(Box::new)
                        .map_err(|e| {
                            error!("Loading {} {} failed: {}", calendar, date, e);
                            e.to_string()
                        });
                    let _ = event_tx
                        .send(AppEvent::DayLoaded {
                            calendar,
                            date,
                            result,
                        })
                        .await;
                }
            }
        }
    });

    let mut pending = PendingLoad::default();
    pending.request(calendar, today);

    // UI Loop
    loop {
        terminal.draw(|f| draw(f, &mut app_state))?;

        apply_events(&mut app_state, &mut event_rx);
        pending.flush(&action_tx);

        if let Err(e) = app_state.hymns.tick() {
            app_state.message = format!("Hymn player: {}", e);
        }

        if crossterm::event::poll(Duration::from_millis(50))? {
            let event = event::read()?;
            let mut reload = false;

            match event {
                Event::Mouse(mouse_event) => match mouse_event.kind {
                    MouseEventKind::ScrollDown => app_state.next(),
                    MouseEventKind::ScrollUp => app_state.previous(),
                    _ => {}
                },

                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => {
                        let _ = action_tx.try_send(Action::Quit);
                        break;
                    }
                    KeyCode::Tab => app_state.toggle_focus(),

                    // Calendar
                    KeyCode::Char('[') => app_state.previous_month(),
                    KeyCode::Char(']') => app_state.next_month(),
                    KeyCode::Char('c') => {
                        app_state.toggle_calendar();
                        reload = true;
                    }
                    KeyCode::Char('t') => reload = app_state.go_today(),
                    KeyCode::Char('r') => app_state.toggle_page(),

                    // Navigation
                    KeyCode::Left | KeyCode::Char('h') if app_state.focus == Focus::Calendar => {
                        app_state.move_cursor(-1)
                    }
                    KeyCode::Right | KeyCode::Char('l') if app_state.focus == Focus::Calendar => {
                        app_state.move_cursor(1)
                    }
                    KeyCode::Up | KeyCode::Char('k') => match app_state.focus {
                        Focus::Calendar => app_state.move_cursor(-7),
                        Focus::Day => app_state.previous(),
                    },
                    KeyCode::Down | KeyCode::Char('j') => match app_state.focus {
                        Focus::Calendar => app_state.move_cursor(7),
                        Focus::Day => app_state.next(),
                    },
                    KeyCode::PageDown => app_state.jump_forward(10),
                    KeyCode::PageUp => app_state.jump_backward(10),
                    KeyCode::Enter => match app_state.focus {
                        Focus::Calendar => {
                            reload = app_state.select_cursor();
                            if app_state.page == Page::Prayers {
                                app_state.toggle_page();
                            }
                            app_state.focus = Focus::Day;
                        }
                        Focus::Day => app_state.toggle_selected(),
                    },
                    KeyCode::Char(' ') => app_state.toggle_selected(),

                    // Hymns
                    KeyCode::Char('m') => report(&mut app_state, |h| h.primary()),
                    KeyCode::Char('p') => report(&mut app_state, |h| h.toggle_pause()),
                    KeyCode::Char('n') => report(&mut app_state, |h| h.next()),
                    KeyCode::Char('N') => report(&mut app_state, |h| h.previous()),
                    KeyCode::Char('l') => {
                        let on = app_state.hymns.toggle_loop();
                        app_state.message =
                            format!("Loop {}.", if on { "enabled" } else { "disabled" });
                    }
                    KeyCode::Char('+') | KeyCode::Char('=') => {
                        let v = app_state.hymns.adjust_volume(VOLUME_STEP);
                        app_state.message = format!("Volume {}%", (v * 100.0).round() as u32);
                    }
                    KeyCode::Char('-') => {
                        let v = app_state.hymns.adjust_volume(-VOLUME_STEP);
                        app_state.message = format!("Volume {}%", (v * 100.0).round() as u32);
                    }
                    _ => {}
                },
                _ => {}
            }

            if reload {
                app_state.begin_loading();
                pending.request(app_state.view.calendar, app_state.view.selected());
                pending.flush(&action_tx);
            }
        }
    }

    app_state.hymns.stop();
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    Ok(())
}

/// The newest day request not yet handed to the worker.
#[derive(Debug, Default)]
pub struct PendingLoad(Option<(CalendarSystem, NaiveDate)>);

impl PendingLoad {
    /// Replaces any request still waiting.
    pub fn request(&mut self, calendar: CalendarSystem, date: NaiveDate) {
        self.0 = Some((calendar, date));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    /// Never blocks the UI: a full queue keeps the request for the next frame.
    pub fn flush(&mut self, action_tx: &mpsc::Sender<Action>) {
        let Some((calendar, date)) = self.0.take() else {
            return;
        };
        match action_tx.try_send(Action::LoadDay { calendar, date }) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => self.0 = Some((calendar, date)),
            Err(TrySendError::Closed(_)) => warn!("Worker is gone, dropping {} {}", calendar, date),
        }
    }
}

/// Applies every event the worker has queued since the last frame.
pub fn apply_events(state: &mut AppState, event_rx: &mut mpsc::Receiver<AppEvent>) {
    while let Ok(event) = event_rx.try_recv() {
        match event {
            AppEvent::DayLoaded {
                calendar,
                date,
                result,
            } => {
                // The user may have moved on while this was in flight.
                if state.is_current(calendar, date) {
                    match result {
                        Ok(loaded) => state.set_day(loaded.view, loaded.warning),
                        Err(msg) => state.set_error(&msg),
                    }
                } else {
                    info!("Dropping stale reply for {} {}", calendar, date);
                }
            }
            AppEvent::Status(msg) => {
                if state.loading {
                    state.message = msg;
                }
            }
        }
    }
}

fn report(state: &mut AppState, f: impl FnOnce(&mut HymnPlayer) -> Result<()>) {
    if let Err(e) = f(&mut state.hymns) {
        state.message = format!("Hymn player: {}", e);
    } else if let Some(playing) = state.hymns.now_playing() {
        state.message = playing;
    }
}
