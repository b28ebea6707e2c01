use std::{
    io, thread,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use cinetui_core::{
    api::{ApiClient, ApiError},
    booking::{BookingFlow, FlowError, FlowPhase, MAX_SEATS, MIN_SEATS},
    config::AppConfig,
    lookup::{self, LookupOrigin, LookupOutcome},
    models::{BookingReceipt, Movie, Ticket},
    pricing,
    store::TicketStore,
};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use tokio::{spawn, sync::mpsc};
use tracing::{debug, error, info, warn};

const TICK_RATE: Duration = Duration::from_millis(250);
const STATUS_TTL: Duration = Duration::from_secs(4);
const MAX_SEARCH_LEN: usize = 16;

#[derive(Debug, Clone)]
struct Theme {
    primary_fg: Color,
    accent: Color,
    muted: Color,
    success: Color,
    warning: Color,
    danger: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_fg: Color::White,
            accent: Color::Cyan,
            muted: Color::DarkGray,
            success: Color::Green,
            warning: Color::Yellow,
            danger: Color::Red,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Browse,
    Search,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModalField {
    Slots,
    Seats,
    Type,
    Name,
}

impl ModalField {
    fn next(self) -> Self {
        match self {
            ModalField::Slots => ModalField::Seats,
            ModalField::Seats => ModalField::Type,
            ModalField::Type => ModalField::Name,
            ModalField::Name => ModalField::Slots,
        }
    }

    fn prev(self) -> Self {
        match self {
            ModalField::Slots => ModalField::Name,
            ModalField::Seats => ModalField::Slots,
            ModalField::Type => ModalField::Seats,
            ModalField::Name => ModalField::Type,
        }
    }
}

enum AppEvent {
    Input(Event),
    Tick,
    MoviesLoaded(Result<Vec<Movie>, ApiError>),
    BookingFinished(Result<String, ApiError>),
    TicketFetched {
        origin: LookupOrigin,
        result: Result<Ticket, ApiError>,
    },
    CancelFinished {
        ticket_id: String,
        result: Result<String, ApiError>,
    },
}

/// High-level application state for the booking TUI.
pub struct CineApp {
    config: AppConfig,
    client: ApiClient,
    store: TicketStore,
    state: UiState,
    flow: BookingFlow,
    modal_field: ModalField,
    modal_slot_cursor: usize,
    receipt: Option<BookingReceipt>,
    last_ticket: Option<Ticket>,
    search_result: Option<Ticket>,
    cancel_prompt: Option<String>,
    pending_movies: bool,
    pending_cancel: bool,
    event_tx: Option<mpsc::Sender<AppEvent>>,
    theme: Theme,
}

impl CineApp {
    pub fn new(config: AppConfig, client: ApiClient, store: TicketStore) -> Self {
        Self {
            config,
            client,
            store,
            state: UiState::default(),
            flow: BookingFlow::new(),
            modal_field: ModalField::Slots,
            modal_slot_cursor: 0,
            receipt: None,
            last_ticket: None,
            search_result: None,
            cancel_prompt: None,
            pending_movies: false,
            pending_cancel: false,
            event_tx: None,
            theme: Theme::default(),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx.clone());
        self.event_tx = Some(event_tx);

        self.state.set_status("Loading movies…".to_string());
        self.start_movie_refresh();
        if let Some(id) = self.store.get() {
            info!(ticket_id = %id, "restoring last booking");
            self.start_ticket_lookup(id, LookupOrigin::Persisted);
        }

        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.state.should_quit {
                break;
            }
            let maybe_event = event_rx.recv().await;
            if !self.process_app_event(maybe_event) {
                break;
            }
            if self.state.should_quit {
                break;
            }
        }

        restore_terminal(&mut terminal)?;
        self.event_tx = None;
        Ok(())
    }

    fn process_app_event(&mut self, maybe_event: Option<AppEvent>) -> bool {
        match maybe_event {
            Some(AppEvent::Input(event)) => {
                if let Err(err) = self.handle_input(event) {
                    self.state.set_status(format!("Error: {err}"));
                }
                true
            }
            Some(AppEvent::Tick) => {
                self.handle_tick();
                true
            }
            Some(AppEvent::MoviesLoaded(result)) => {
                self.on_movies_loaded(result);
                true
            }
            Some(AppEvent::BookingFinished(result)) => {
                self.on_booking_finished(result);
                true
            }
            Some(AppEvent::TicketFetched { origin, result }) => {
                self.on_ticket_fetched(origin, result);
                true
            }
            Some(AppEvent::CancelFinished { ticket_id, result }) => {
                self.on_cancel_finished(ticket_id, result);
                true
            }
            None => false,
        }
    }

    fn handle_tick(&mut self) {
        if self.state.mode == Mode::Search {
            self.state
                .set_status(format!("Ticket ID: {}▏", self.state.search_input));
        } else {
            self.state.expire_status();
        }
    }

    // ------------------------------------------------------------------
    // Event outcomes
    // ------------------------------------------------------------------

    fn on_movies_loaded(&mut self, result: Result<Vec<Movie>, ApiError>) {
        self.pending_movies = false;
        match result {
            Ok(movies) => {
                info!(total = movies.len(), "movie list refreshed");
                self.state.set_movies(movies);
                self.state
                    .set_status(format!("Loaded {} movies", self.state.listed.len()));
            }
            Err(err) => {
                error!(%err, "movie list refresh failed");
                self.state
                    .set_status(format!("Failed to load movies: {err}"));
            }
        }
    }

    fn on_booking_finished(&mut self, result: Result<String, ApiError>) {
        match result {
            Ok(ticket_id) => {
                info!(%ticket_id, "booking confirmed");
                if let Err(err) = self.store.set(&ticket_id) {
                    warn!("failed to persist last ticket: {err:#}");
                }
                self.receipt = self
                    .flow
                    .complete_submit()
                    .map(|session| session.into_receipt(ticket_id.clone()));
                self.state
                    .set_status("Booking confirmed! Ticket saved.".to_string());
                // The last-booking panel and the seat counts both changed.
                self.start_ticket_lookup(ticket_id, LookupOrigin::Persisted);
                self.start_movie_refresh();
            }
            Err(err) => {
                warn!(%err, "booking failed");
                self.flow.fail_submit();
                self.state.set_status(format!("Booking failed: {err}"));
            }
        }
    }

    fn on_ticket_fetched(&mut self, origin: LookupOrigin, result: Result<Ticket, ApiError>) {
        if let Err(err) = &result {
            debug!(?origin, %err, "ticket lookup failed");
        }
        match lookup::resolve(origin, result) {
            LookupOutcome::Show(ticket) => match origin {
                LookupOrigin::Persisted => {
                    self.last_ticket = Some(ticket);
                }
                LookupOrigin::UserEntered => {
                    self.state
                        .set_status(format!("Found ticket {}", ticket.ticket_id));
                    self.search_result = Some(ticket);
                }
            },
            LookupOutcome::ReportError(message) => {
                self.search_result = None;
                self.state.set_status(message);
            }
            LookupOutcome::SilentEmpty => {
                self.last_ticket = None;
            }
        }
    }

    fn on_cancel_finished(&mut self, ticket_id: String, result: Result<String, ApiError>) {
        self.pending_cancel = false;
        match result {
            Ok(message) => {
                info!(%ticket_id, "ticket cancelled");
                match self.store.clear_if_matches(&ticket_id) {
                    Ok(true) => debug!("cleared persisted last-ticket pointer"),
                    Ok(false) => {}
                    Err(err) => warn!("failed to clear last-ticket pointer: {err:#}"),
                }
                if self
                    .last_ticket
                    .as_ref()
                    .is_some_and(|ticket| ticket.ticket_id.eq_ignore_ascii_case(&ticket_id))
                {
                    self.last_ticket = None;
                }
                if self
                    .search_result
                    .as_ref()
                    .is_some_and(|ticket| ticket.ticket_id.eq_ignore_ascii_case(&ticket_id))
                {
                    self.search_result = None;
                }
                self.state.set_status(message);
                // Cancellation frees seats; refresh the catalogue once.
                self.start_movie_refresh();
            }
            Err(err) => {
                warn!(%ticket_id, %err, "cancellation failed");
                self.state.set_status(format!("Cancellation failed: {err}"));
            }
        }
    }

    // ------------------------------------------------------------------
    // Input handling
    // ------------------------------------------------------------------

    fn handle_input(&mut self, event: Event) -> Result<()> {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Resize(_, _) => Ok(()),
            Event::Mouse(_) => Ok(()),
            Event::FocusGained | Event::FocusLost | Event::Paste(_) => Ok(()),
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            self.state.should_quit = true;
            return Ok(());
        }
        if self.cancel_prompt.is_some() {
            return self.handle_cancel_prompt_key(key);
        }
        if self.receipt.is_some() {
            return self.handle_receipt_key(key);
        }
        if self.flow.is_open() {
            return self.handle_modal_key(key);
        }
        match self.state.mode {
            Mode::Search => self.handle_search_key(key),
            Mode::Browse => self.handle_browse_key(key),
        }
    }

    fn handle_browse_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.state.should_quit = true;
            }
            KeyCode::Char('j') | KeyCode::Down => self.state.move_cursor(1),
            KeyCode::Char('k') | KeyCode::Up => self.state.move_cursor(-1),
            KeyCode::Enter | KeyCode::Char('b') => self.open_booking(),
            KeyCode::Char('r') => {
                self.state.set_status("Refreshing movies…".to_string());
                self.start_movie_refresh();
            }
            KeyCode::Char('p') => {
                let by_popularity = self.state.toggle_order();
                self.state.set_status(
                    if by_popularity {
                        "Sorted by tickets sold"
                    } else {
                        "Catalogue order"
                    }
                    .to_string(),
                );
            }
            KeyCode::Char('/') | KeyCode::Char('s') => {
                self.state.mode = Mode::Search;
                self.state.search_input.clear();
                self.state.set_status("Ticket ID: ▏".to_string());
            }
            KeyCode::Char('c') => self.open_cancel_prompt(),
            _ => {}
        }
        Ok(())
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => {
                self.state.mode = Mode::Browse;
                self.state.set_status("Search cancelled".to_string());
            }
            KeyCode::Enter => {
                let id = self.state.search_input.trim().to_string();
                self.state.mode = Mode::Browse;
                if id.is_empty() {
                    self.state.set_status("Enter a ticket ID first".to_string());
                } else {
                    self.state.set_status(format!("Looking up {id}…"));
                    self.start_ticket_lookup(id, LookupOrigin::UserEntered);
                }
            }
            KeyCode::Backspace => {
                self.state.search_input.pop();
            }
            KeyCode::Char(ch)
                if ch.is_ascii_alphanumeric()
                    && self.state.search_input.len() < MAX_SEARCH_LEN =>
            {
                self.state.search_input.push(ch.to_ascii_uppercase());
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_modal_key(&mut self, key: KeyEvent) -> Result<()> {
        if self.flow.phase() == FlowPhase::Submitting {
            // The in-flight submission must resolve first; Esc included.
            if key.code == KeyCode::Esc {
                self.state.set_status("Submission in progress…".to_string());
            }
            return Ok(());
        }
        match key.code {
            KeyCode::Esc => {
                if self.flow.close() {
                    self.state.set_status("Booking cancelled".to_string());
                }
            }
            KeyCode::Tab => self.modal_field = self.modal_field.next(),
            KeyCode::BackTab => self.modal_field = self.modal_field.prev(),
            KeyCode::Enter => {
                if self.modal_field == ModalField::Slots {
                    self.select_highlighted_slot();
                } else {
                    self.submit_booking();
                }
            }
            _ => self.handle_modal_field_key(key),
        }
        Ok(())
    }

    fn handle_modal_field_key(&mut self, key: KeyEvent) {
        match self.modal_field {
            ModalField::Slots => match key.code {
                KeyCode::Char('j') | KeyCode::Down => self.move_slot_cursor(1),
                KeyCode::Char('k') | KeyCode::Up => self.move_slot_cursor(-1),
                KeyCode::Char(' ') => self.select_highlighted_slot(),
                _ => {}
            },
            ModalField::Seats => match key.code {
                KeyCode::Char('+') | KeyCode::Right | KeyCode::Char('l') => {
                    let _ = self.flow.adjust_seats(1);
                }
                KeyCode::Char('-') | KeyCode::Left | KeyCode::Char('h') => {
                    let _ = self.flow.adjust_seats(-1);
                }
                KeyCode::Char(ch) if ch.is_ascii_digit() => {
                    let seats = if ch == '0' {
                        i64::from(MAX_SEATS)
                    } else {
                        i64::from(ch as u8 - b'0')
                    };
                    let _ = self.flow.set_seats(seats);
                }
                _ => {}
            },
            ModalField::Type => match key.code {
                KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right | KeyCode::Char('v') => {
                    let _ = self.flow.toggle_ticket_type();
                }
                _ => {}
            },
            ModalField::Name => match key.code {
                KeyCode::Backspace => {
                    let _ = self.flow.pop_name_char();
                }
                KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    let _ = self.flow.push_name_char(ch);
                }
                _ => {}
            },
        }
    }

    fn handle_cancel_prompt_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                if let Some(ticket_id) = self.cancel_prompt.take() {
                    self.start_cancel(ticket_id);
                }
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.cancel_prompt = None;
                self.state.set_status("Cancellation aborted".to_string());
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_receipt_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Enter | KeyCode::Esc | KeyCode::Char('q') => {
                self.receipt = None;
            }
            _ => {}
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Flow triggers
    // ------------------------------------------------------------------

    fn open_booking(&mut self) {
        let Some(movie) = self.state.current_movie() else {
            self.state.set_status("No movie selected".to_string());
            return;
        };
        let movie_id = movie.id;
        let name = movie.name.clone();
        match self.flow.open(movie_id, &self.state.listed) {
            Ok(()) => {
                self.modal_field = ModalField::Slots;
                self.modal_slot_cursor = 0;
                self.state.set_status(format!("Booking {name}"));
            }
            Err(FlowError::NoShowtimes) => {
                self.state.set_status(format!("No showtimes for {name}"));
            }
            Err(err) => self.state.set_status(format!("Error: {err}")),
        }
    }

    fn open_cancel_prompt(&mut self) {
        let target = self.search_result.as_ref().or(self.last_ticket.as_ref());
        match target {
            Some(ticket) => {
                self.cancel_prompt = Some(ticket.ticket_id.clone());
            }
            None => {
                self.state
                    .set_status("No ticket on screen to cancel".to_string());
            }
        }
    }

    fn move_slot_cursor(&mut self, delta: isize) {
        let Some(session) = self.flow.session() else {
            return;
        };
        let len = session.movie.slots.len();
        if len == 0 {
            return;
        }
        let mut idx = self.modal_slot_cursor as isize + delta;
        if idx < 0 {
            idx = 0;
        } else if idx >= len as isize {
            idx = len as isize - 1;
        }
        self.modal_slot_cursor = idx as usize;
    }

    fn select_highlighted_slot(&mut self) {
        let Some(session) = self.flow.session() else {
            return;
        };
        let labels = session.movie.slot_labels();
        let Some(label) = labels.get(self.modal_slot_cursor).cloned() else {
            return;
        };
        let available = session.movie.slots.get(&label).map(|slot| slot.available);
        match self.flow.select_slot(&label) {
            Ok(()) => {
                let note = available
                    .map(|seats| format!(" ({seats} seats left)"))
                    .unwrap_or_default();
                self.state.set_status(format!("Selected {label}{note}"));
            }
            Err(err) => self.state.set_status(format!("Error: {err}")),
        }
    }

    fn submit_booking(&mut self) {
        if !self.flow.can_submit() {
            self.state
                .set_status("Fill in a name and pick a showtime first".to_string());
            return;
        }
        let request = match self.flow.begin_submit() {
            Ok(request) => request,
            Err(err) => {
                self.state.set_status(format!("Error: {err}"));
                return;
            }
        };
        let Some(sender) = self.event_tx.clone() else {
            error!("event channel unavailable");
            self.flow.fail_submit();
            return;
        };
        info!(
            movie_id = request.movie_id,
            slot = %request.slot,
            seats = request.seats,
            "submitting booking"
        );
        self.state
            .set_status(format!("Booking {} seat(s)…", request.seats));
        let client = self.client.clone();
        spawn(async move {
            let result = client.create_booking(&request).await;
            let _ = sender.send(AppEvent::BookingFinished(result)).await;
        });
    }

    fn start_movie_refresh(&mut self) {
        if self.pending_movies {
            return;
        }
        let Some(sender) = self.event_tx.clone() else {
            return;
        };
        self.pending_movies = true;
        let client = self.client.clone();
        spawn(async move {
            let result = client.list_movies().await;
            let _ = sender.send(AppEvent::MoviesLoaded(result)).await;
        });
    }

    fn start_ticket_lookup(&mut self, id: String, origin: LookupOrigin) {
        let Some(sender) = self.event_tx.clone() else {
            return;
        };
        let client = self.client.clone();
        spawn(async move {
            let result = client.get_ticket(&id).await;
            let _ = sender
                .send(AppEvent::TicketFetched { origin, result })
                .await;
        });
    }

    fn start_cancel(&mut self, ticket_id: String) {
        if self.pending_cancel {
            self.state
                .set_status("A cancellation is already in flight".to_string());
            return;
        }
        let Some(sender) = self.event_tx.clone() else {
            return;
        };
        self.pending_cancel = true;
        self.state.set_status(format!("Cancelling {ticket_id}…"));
        let client = self.client.clone();
        spawn(async move {
            let result = client.cancel_ticket(&ticket_id).await;
            let _ = sender
                .send(AppEvent::CancelFinished { ticket_id, result })
                .await;
        });
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    fn draw(&mut self, frame: &mut Frame) {
        self.draw_browse(frame);
        if self.flow.is_open() {
            self.render_booking_modal(frame);
        }
        if self.receipt.is_some() {
            self.render_confirmation(frame);
        }
        if self.cancel_prompt.is_some() {
            self.render_cancel_prompt(frame);
        }
    }

    fn draw_browse(&mut self, frame: &mut Frame) {
        let size = frame.size();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(3),
            ])
            .split(size);

        self.render_title(frame, chunks[0]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(chunks[1]);

        self.state.list_height = body[0].height.saturating_sub(2) as usize;
        self.render_movie_list(frame, body[0]);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(body[1]);
        self.render_movie_details(frame, right[0]);
        self.render_ticket_panel(frame, right[1]);

        self.render_status(frame, chunks[2]);
    }

    fn render_title(&self, frame: &mut Frame, area: Rect) {
        let title = Paragraph::new(Line::from(vec![
            Span::styled(
                "CineTUI",
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "  ·  movies, showtimes and tickets",
                Style::default().fg(self.theme.muted),
            ),
        ]))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
        frame.render_widget(title, area);
    }

    fn render_movie_list(&self, frame: &mut Frame, area: Rect) {
        let height = area.height.saturating_sub(2) as usize;
        let mut lines: Vec<Line> = Vec::new();
        if self.state.listed.is_empty() {
            lines.push(Line::from(Span::styled(
                if self.pending_movies {
                    "Loading…"
                } else {
                    "No movies available"
                },
                Style::default().fg(self.theme.muted),
            )));
        }
        for (offset_idx, movie) in self.state.visible_movies(height).iter().enumerate() {
            let idx = self.state.offset + offset_idx;
            let selected = idx == self.state.cursor;
            let pointer = if selected { "▶ " } else { "  " };
            let name_style = if selected {
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.theme.primary_fg)
            };
            let mut spans = vec![
                Span::styled(pointer.to_string(), Style::default().fg(self.theme.accent)),
                Span::styled(movie.name.clone(), name_style),
            ];
            if let Some(rating) = movie.rating {
                spans.push(Span::styled(
                    format!("  ★{rating}"),
                    Style::default().fg(self.theme.warning),
                ));
            }
            if self.state.sort_by_popularity {
                spans.push(Span::styled(
                    format!("  {} sold", movie.tickets_sold),
                    Style::default().fg(self.theme.muted),
                ));
            }
            if !movie.has_slots() {
                spans.push(Span::styled(
                    "  no shows".to_string(),
                    Style::default().fg(self.theme.danger),
                ));
            }
            lines.push(Line::from(spans));
        }

        let title = if self.state.sort_by_popularity {
            "Movies (by popularity)"
        } else {
            "Movies"
        };
        let list = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(list, area);
    }

    fn render_movie_details(&self, frame: &mut Frame, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        if let Some(movie) = self.state.current_movie() {
            lines.push(Line::from(Span::styled(
                movie.name.clone(),
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            )));
            if let Some(genre) = &movie.genre {
                lines.push(Line::from(format!("Genre: {genre}")));
            }
            if let Some(rating) = movie.rating {
                lines.push(Line::from(format!("Rating: ★ {rating}")));
            }
            lines.push(Line::from(format!("Tickets sold: {}", movie.tickets_sold)));
            lines.push(Line::from(""));
            if movie.has_slots() {
                lines.push(Line::from(Span::styled(
                    "Showtimes",
                    Style::default().add_modifier(Modifier::UNDERLINED),
                )));
                for label in movie.slot_labels() {
                    let availability = movie
                        .slots
                        .get(&label)
                        .map(|slot| format!("{}/{} seats free", slot.available, slot.total))
                        .unwrap_or_default();
                    lines.push(Line::from(vec![
                        Span::raw(format!("  {label}  ")),
                        Span::styled(availability, Style::default().fg(self.theme.muted)),
                    ]));
                }
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    "Press Enter to book",
                    Style::default().fg(self.theme.success),
                )));
            } else {
                lines.push(Line::from(Span::styled(
                    "No showtimes scheduled",
                    Style::default().fg(self.theme.danger),
                )));
            }
        } else {
            lines.push(Line::from(Span::styled(
                "Select a movie",
                Style::default().fg(self.theme.muted),
            )));
        }

        let details = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Details"))
            .wrap(Wrap { trim: true });
        frame.render_widget(details, area);
    }

    fn render_ticket_panel(&self, frame: &mut Frame, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        if let Some(ticket) = &self.search_result {
            lines.push(Line::from(Span::styled(
                "Search result",
                Style::default().add_modifier(Modifier::UNDERLINED),
            )));
            lines.extend(self.ticket_lines(ticket));
            lines.push(Line::from(""));
        }
        match &self.last_ticket {
            Some(ticket) => {
                lines.push(Line::from(Span::styled(
                    "Last booking",
                    Style::default().add_modifier(Modifier::UNDERLINED),
                )));
                lines.extend(self.ticket_lines(ticket));
            }
            None => {
                if self.search_result.is_none() {
                    lines.push(Line::from(Span::styled(
                        "No recent booking",
                        Style::default().fg(self.theme.muted),
                    )));
                }
            }
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "/ find a ticket by ID · c cancel the shown ticket",
            Style::default().fg(self.theme.muted),
        )));

        let panel = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("My Booking"))
            .wrap(Wrap { trim: true });
        frame.render_widget(panel, area);
    }

    fn ticket_lines(&self, ticket: &Ticket) -> Vec<Line<'static>> {
        let mut lines = vec![
            Line::from(vec![
                Span::raw("Ticket ".to_string()),
                Span::styled(
                    ticket.ticket_id.clone(),
                    Style::default()
                        .fg(self.theme.success)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(format!("{} · {}", ticket.movie_name, ticket.slot)),
            Line::from(format!(
                "{} seat(s) · {}",
                ticket.seats, ticket.booking_type
            )),
        ];
        if let Some(name) = &ticket.customer_name {
            lines.push(Line::from(format!("Booked by {name}")));
        }
        if let Some(booked_at) = &ticket.booked_at {
            lines.push(Line::from(Span::styled(
                format!("Booked at {booked_at}"),
                Style::default().fg(self.theme.muted),
            )));
        }
        lines
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let status = Paragraph::new(Line::from(self.state.status.clone())).block(
            Block::default()
                .borders(Borders::ALL)
                .title("q quit · r refresh · p sort · Enter book · / lookup · c cancel"),
        );
        frame.render_widget(status, area);
    }

    fn render_booking_modal(&mut self, frame: &mut Frame) {
        let Some(session) = self.flow.session() else {
            return;
        };
        let submitting = self.flow.phase() == FlowPhase::Submitting;
        let labels = session.movie.slot_labels();
        if self.modal_slot_cursor >= labels.len() && !labels.is_empty() {
            self.modal_slot_cursor = labels.len() - 1;
        }
        let quote = pricing::quote(self.config.base_price, session.seats, session.ticket_type);
        let symbol = &self.config.currency_symbol;

        let focus_style = Style::default()
            .fg(self.theme.accent)
            .add_modifier(Modifier::BOLD);
        let label_style = |field: ModalField| {
            if self.modal_field == field && !submitting {
                focus_style
            } else {
                Style::default().fg(self.theme.primary_fg)
            }
        };

        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(Span::styled(
            "Showtime",
            label_style(ModalField::Slots),
        )));
        for (idx, label) in labels.iter().enumerate() {
            let pointer =
                if idx == self.modal_slot_cursor && self.modal_field == ModalField::Slots {
                    Span::styled("▶ ", Style::default().fg(self.theme.accent))
                } else {
                    Span::raw("  ")
                };
            let marker = if session.slot.as_deref() == Some(label.as_str()) {
                Span::styled("[x] ", Style::default().fg(self.theme.success))
            } else {
                Span::raw("[ ] ")
            };
            let availability = session
                .movie
                .slots
                .get(label)
                .map(|slot| format!("  {} left", slot.available))
                .unwrap_or_default();
            lines.push(Line::from(vec![
                pointer,
                marker,
                Span::raw(label.clone()),
                Span::styled(availability, Style::default().fg(self.theme.muted)),
            ]));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Seats   ", label_style(ModalField::Seats)),
            Span::raw(format!("◂ {} ▸", session.seats)),
            Span::styled(
                format!("  ({MIN_SEATS}–{MAX_SEATS})"),
                Style::default().fg(self.theme.muted),
            ),
        ]));
        lines.push(Line::from(vec![
            Span::styled("Type    ", label_style(ModalField::Type)),
            Span::raw(session.ticket_type.display_label().to_string()),
            Span::styled("  (space toggles)", Style::default().fg(self.theme.muted)),
        ]));
        lines.push(Line::from(vec![
            Span::styled("Name    ", label_style(ModalField::Name)),
            Span::raw(session.guest_name.clone()),
            Span::styled("▏", Style::default().fg(self.theme.muted)),
        ]));
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::raw(format!(
                "{symbol}{} per seat · total ",
                quote.per_seat_display()
            )),
            Span::styled(
                format!("{symbol}{}", quote.total_display()),
                Style::default()
                    .fg(self.theme.success)
                    .add_modifier(Modifier::BOLD),
            ),
        ]));
        lines.push(Line::from(""));
        if submitting {
            lines.push(Line::from(Span::styled(
                "Submitting…",
                Style::default().fg(self.theme.warning),
            )));
        } else if self.flow.can_submit() {
            lines.push(Line::from(Span::styled(
                "Enter submit · Tab fields · Esc close",
                Style::default().fg(self.theme.muted),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Pick a showtime and enter a name · Esc close",
                Style::default().fg(self.theme.muted),
            )));
        }

        let area = frame.size();
        let width = 52.min(area.width.saturating_sub(2));
        let height = (lines.len() as u16 + 2).min(area.height.saturating_sub(2));
        let popup = centered_rect(width, height, area);
        frame.render_widget(Clear, popup);
        let modal = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("Book — {}", session.movie.name)),
            )
            .wrap(Wrap { trim: false });
        frame.render_widget(modal, popup);
    }

    fn render_confirmation(&self, frame: &mut Frame) {
        let Some(receipt) = &self.receipt else {
            return;
        };
        let lines = vec![
            Line::from(Span::styled(
                "Booking confirmed!",
                Style::default()
                    .fg(self.theme.success)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(vec![
                Span::raw("Ticket ID  "),
                Span::styled(
                    receipt.ticket_id.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(format!("Movie      {}", receipt.movie_name)),
            Line::from(format!("Showtime   {}", receipt.slot)),
            Line::from(format!("Seats      {}", receipt.seats)),
            Line::from(format!(
                "Type       {}",
                receipt.ticket_type.display_label()
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Saved as your last booking · Enter close",
                Style::default().fg(self.theme.muted),
            )),
        ];
        let area = frame.size();
        let popup = centered_rect(
            46.min(area.width.saturating_sub(2)),
            (lines.len() as u16 + 2).min(area.height.saturating_sub(2)),
            area,
        );
        frame.render_widget(Clear, popup);
        let panel = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Confirmation"),
        );
        frame.render_widget(panel, popup);
    }

    fn render_cancel_prompt(&self, frame: &mut Frame) {
        let Some(ticket_id) = &self.cancel_prompt else {
            return;
        };
        let lines = vec![
            Line::from(format!("Cancel ticket {ticket_id}?")),
            Line::from(Span::styled(
                "This cannot be undone.",
                Style::default().fg(self.theme.danger),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "y confirm · n keep the ticket",
                Style::default().fg(self.theme.muted),
            )),
        ];
        let area = frame.size();
        let popup = centered_rect(
            40.min(area.width.saturating_sub(2)),
            6.min(area.height.saturating_sub(2)),
            area,
        );
        frame.render_widget(Clear, popup);
        let prompt = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Cancel"))
            .alignment(Alignment::Center);
        frame.render_widget(prompt, popup);
    }
}

struct UiState {
    all_movies: Vec<Movie>,
    listed: Vec<Movie>,
    cursor: usize,
    offset: usize,
    list_height: usize,
    sort_by_popularity: bool,
    status: String,
    status_set_at: Option<Instant>,
    mode: Mode,
    search_input: String,
    should_quit: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            all_movies: Vec::new(),
            listed: Vec::new(),
            cursor: 0,
            offset: 0,
            list_height: 1,
            sort_by_popularity: false,
            status: "Ready".to_string(),
            status_set_at: None,
            mode: Mode::Browse,
            search_input: String::new(),
            should_quit: false,
        }
    }
}

impl UiState {
    /// Replaces the catalogue wholesale; an open booking session keeps
    /// its own movie clone, so stale selections stay valid.
    fn set_movies(&mut self, movies: Vec<Movie>) {
        self.all_movies = movies;
        self.apply_order();
    }

    fn apply_order(&mut self) {
        self.listed = self.all_movies.clone();
        if self.sort_by_popularity {
            self.listed
                .sort_by(|a, b| b.tickets_sold.cmp(&a.tickets_sold).then(a.id.cmp(&b.id)));
        }
        self.clamp_cursor();
    }

    fn toggle_order(&mut self) -> bool {
        self.sort_by_popularity = !self.sort_by_popularity;
        self.cursor = 0;
        self.offset = 0;
        self.apply_order();
        self.sort_by_popularity
    }

    fn move_cursor(&mut self, delta: isize) {
        if self.listed.is_empty() {
            return;
        }
        let len = self.listed.len() as isize;
        let mut idx = self.cursor as isize + delta;
        if idx < 0 {
            idx = 0;
        } else if idx >= len {
            idx = len - 1;
        }
        self.cursor = idx as usize;
        self.ensure_cursor_visible();
    }

    fn visible_movies(&self, height: usize) -> &[Movie] {
        if self.listed.is_empty() {
            return &[];
        }
        let end = (self.offset + height).min(self.listed.len());
        &self.listed[self.offset..end]
    }

    fn current_movie(&self) -> Option<&Movie> {
        self.listed.get(self.cursor)
    }

    fn set_status(&mut self, message: String) {
        self.status = message;
        self.status_set_at = Some(Instant::now());
    }

    /// Status messages behave like transient toasts: they expire back
    /// to the idle prompt after a few seconds.
    fn expire_status(&mut self) {
        if let Some(set_at) = self.status_set_at {
            if set_at.elapsed() >= STATUS_TTL {
                self.status = "Ready".to_string();
                self.status_set_at = None;
            }
        }
    }

    fn clamp_cursor(&mut self) {
        if self.listed.is_empty() {
            self.cursor = 0;
            self.offset = 0;
        } else if self.cursor >= self.listed.len() {
            self.cursor = self.listed.len() - 1;
        }
        self.ensure_cursor_visible();
    }

    fn ensure_cursor_visible(&mut self) {
        if self.listed.is_empty() || self.list_height == 0 {
            self.offset = 0;
            return;
        }
        let height = self.list_height;
        let max_offset = self.listed.len().saturating_sub(height);

        if self.cursor < self.offset {
            self.offset = self.cursor;
        } else if self.cursor >= self.offset + height {
            self.offset = self.cursor + 1 - height;
        }

        if self.offset > max_offset {
            self.offset = max_offset;
        }
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width - width) / 2;
    let y = area.y + (area.height - height) / 2;
    Rect {
        x,
        y,
        width,
        height,
    }
}
