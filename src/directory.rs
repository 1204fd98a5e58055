use std::sync::mpsc::{self, Receiver, Sender};

use arboard::Clipboard;
use ratatui::crossterm::event::KeyEvent;
use tracing::{debug, error, info, info_span, trace};
use tracing_error::SpanTrace;

use crate::advocate::{Advocate, SortKey, SortOrder};
use crate::advocate_table::{
    AdvocateTable, AdvocateTableEvents, SortControl, change_sort_key, change_sort_order,
};
use crate::domain::{AdvocatesError, AppConfig, HELP_TEXT, Message};
use crate::inputter::{InputResult, Inputter};
use crate::loader;

const PAGE_SIZE: usize = 10;

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, PartialEq)]
pub enum Status {
    READY,
    QUITTING,
}

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    TABLE,
    POPUP,
    PROMPT,
}

/// Outcome of one background fetch.
struct Fetched {
    generation: u64,
    result: Result<Vec<Advocate>, AdvocatesError>,
}

/// Owns everything the advocate table displays and reacts to its callbacks.
pub struct Directory {
    config: AppConfig,
    pub status: Status,
    modus: Modus,
    records: Vec<Advocate>,
    is_loading: bool,
    refreshing: bool,
    error: Option<String>,
    sort_key: SortKey,
    sort_order: SortOrder,
    focus: SortControl,
    cursor: usize,
    generation: u64,
    sender: Sender<Fetched>,
    receiver: Receiver<Fetched>,
    clipboard: Option<Clipboard>,
    input: Inputter,
    last_input: InputResult,
    status_message: String,
}

impl Directory {
    pub fn init(config: &AppConfig) -> Self {
        let (sender, receiver) = mpsc::channel();
        let mut directory = Self {
            config: config.clone(),
            status: Status::READY,
            modus: Modus::TABLE,
            records: Vec::new(),
            is_loading: true,
            refreshing: false,
            error: None,
            sort_key: config.sort_key,
            sort_order: config.sort_order,
            focus: SortControl::default(),
            cursor: 0,
            generation: 0,
            sender,
            receiver,
            clipboard: None,
            input: Inputter::default(),
            last_input: InputResult::default(),
            status_message: "Started advocates!".to_string(),
        };
        directory.fetch();
        directory
    }

    /// Props for the advocate table as of now.
    pub fn table(&self) -> AdvocateTable<'_> {
        AdvocateTable::new(
            &self.records,
            self.error.as_deref(),
            self.sort_key,
            self.sort_order,
        )
        .is_loading(self.is_loading)
        .refreshing(self.refreshing)
        .focus(self.focus)
        .phone_formatter(self.config.phone_formatter)
        .selected((!self.records.is_empty()).then_some(self.cursor))
    }

    pub fn title(&self) -> String {
        format!(
            "{} · sorted by {} {}",
            self.config.data_path.display(),
            self.sort_key.value(),
            self.sort_order.value()
        )
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn show_help(&self) -> Option<&'static str> {
        (self.modus == Modus::POPUP).then_some(HELP_TEXT)
    }

    /// The order prompt, while it is open.
    pub fn prompt(&self) -> Option<&InputResult> {
        (self.modus == Modus::PROMPT).then_some(&self.last_input)
    }

    pub fn raw_keyevents(&self) -> bool {
        self.modus == Modus::PROMPT
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    /// Starts loading advocates with the current sort selection.
    ///
    /// Earlier fetches still running are superseded: their results are dropped.
    pub fn fetch(&mut self) {
        self.generation += 1;
        if self.records.is_empty() {
            self.is_loading = true;
        } else {
            self.refreshing = true;
        }

        let generation = self.generation;
        let path = self.config.data_path.clone();
        let (key, order) = (self.sort_key, self.sort_order);
        let sender = self.sender.clone();
        debug!("Fetch #{generation}: {} {}", key.value(), order.value());

        rayon::spawn(move || {
            let span = info_span!("fetch", generation, key = key.value(), order = order.value());
            let _guard = span.enter();
            let result = loader::fetch_advocates(&path, key, order);
            if let Err(e) = &result {
                error!("Fetching advocates failed: {e}\n{}", SpanTrace::capture());
            }
            // The receiver is gone once the directory is dropped.
            let _ = sender.send(Fetched { generation, result });
        });
    }

    /// Applies finished fetches. Returns true if anything changed.
    pub fn poll_fetch(&mut self) -> bool {
        let mut changed = false;
        while let Ok(fetched) = self.receiver.try_recv() {
            changed |= self.apply(fetched);
        }
        changed
    }

    fn apply(&mut self, fetched: Fetched) -> bool {
        if fetched.generation != self.generation {
            trace!(
                "Dropping fetch #{} (current #{})",
                fetched.generation, self.generation
            );
            return false;
        }
        self.is_loading = false;
        self.refreshing = false;
        match fetched.result {
            Ok(records) => {
                info!("Fetch #{} returned {} advocates", fetched.generation, records.len());
                self.set_status_message(format!("{} advocates", records.len()));
                self.records = records;
                self.error = None;
                self.cursor = std::cmp::min(self.cursor, self.records.len().saturating_sub(1));
            }
            Err(e) => {
                self.error = Some(e.to_string());
                self.set_status_message("Fetching advocates failed");
            }
        }
        true
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
    }

    pub fn update(&mut self, message: Option<Message>) -> Result<(), AdvocatesError> {
        self.poll_fetch();

        if let Some(msg) = message {
            match self.modus {
                Modus::TABLE => match msg {
                    Message::Quit => self.quit(),
                    Message::Retry if self.error.is_some() => self.on_retry(),
                    Message::ToggleFocus => self.focus = self.focus.toggle(),
                    Message::PreviousOption | Message::NextOption => self.cycle_focused_option(),
                    Message::EnterOrder => self.enter_prompt(),
                    Message::MoveUp => self.move_cursor_up(1),
                    Message::MoveDown => self.move_cursor_down(1),
                    Message::MovePageUp => self.move_cursor_up(PAGE_SIZE),
                    Message::MovePageDown => self.move_cursor_down(PAGE_SIZE),
                    Message::MoveBeginning => self.cursor = 0,
                    Message::MoveEnd => self.cursor = self.records.len().saturating_sub(1),
                    Message::CopyRow => self.copy_row(),
                    Message::Help => self.modus = Modus::POPUP,
                    _ => (),
                },
                Modus::POPUP => match msg {
                    Message::Quit => self.quit(),
                    Message::Exit | Message::Help => self.modus = Modus::TABLE,
                    _ => (),
                },
                Modus::PROMPT => {
                    if let Message::RawKey(key) = msg {
                        self.raw_input(key)
                    }
                }
            }
        }
        Ok(())
    }

    // -------------------- Control handling functions ---------------------- //

    /// Controls only react once the table is on screen.
    fn controls_visible(&self) -> bool {
        self.error.is_none() && !self.is_loading
    }

    fn cycle_focused_option(&mut self) {
        if !self.controls_visible() {
            return;
        }
        match self.focus {
            SortControl::Key => {
                if SortControl::Key.is_enabled(self.refreshing) {
                    let key = self.sort_key.other();
                    change_sort_key(self, key);
                } else {
                    trace!("Sort key selector is disabled while sorting");
                }
            }
            SortControl::Order => {
                let raw = self.sort_order.other().value();
                change_sort_order(self, raw);
            }
        }
    }

    fn enter_prompt(&mut self) {
        if !self.controls_visible() {
            return;
        }
        trace!("Entering order prompt ...");
        self.modus = Modus::PROMPT;
        self.focus = SortControl::Order;
        self.input.clear();
        self.last_input = self.input.get();
    }

    fn raw_input(&mut self, key: KeyEvent) {
        self.last_input = self.input.read(key);
        if self.last_input.finished {
            self.modus = Modus::TABLE;
            if !self.last_input.canceled {
                let raw = self.last_input.input.clone();
                change_sort_order(self, &raw);
            }
        }
    }

    fn move_cursor_up(&mut self, size: usize) {
        self.cursor = self.cursor.saturating_sub(size);
    }

    fn move_cursor_down(&mut self, size: usize) {
        let last = self.records.len().saturating_sub(1);
        self.cursor = std::cmp::min(self.cursor + size, last);
    }

    fn selected_row(&self) -> Option<String> {
        self.table().rows().nth(self.cursor).map(|row| {
            let specialties = row
                .badges
                .iter()
                .map(|b| b.label)
                .collect::<Vec<_>>()
                .join(", ");
            [
                row.first_name,
                row.last_name,
                row.city,
                row.degree,
                specialties.as_str(),
                row.years_of_experience.as_str(),
                row.phone_number.as_str(),
            ]
            .join("\t")
        })
    }

    fn copy_row(&mut self) {
        let Some(row) = self.selected_row() else {
            return;
        };
        trace!("Row content: {}", row);

        if self.clipboard.is_none() {
            match Clipboard::new() {
                Ok(clipboard) => self.clipboard = Some(clipboard),
                Err(e) => {
                    debug!("Clipboard unavailable: {:?}", e);
                    self.set_status_message("Clipboard unavailable");
                    return;
                }
            }
        }
        if let Some(clipboard) = self.clipboard.as_mut() {
            match clipboard.set_text(row) {
                Ok(_) => self.set_status_message("Copied advocate to clipboard."),
                Err(e) => {
                    debug!("Error copying to clipboard: {:?}", e);
                    self.set_status_message("Copying to clipboard failed");
                }
            }
        }
    }
}

impl AdvocateTableEvents for Directory {
    fn on_retry(&mut self) {
        info!("Retrying ...");
        self.error = None;
        self.fetch();
    }

    fn set_sort_key(&mut self, key: SortKey) {
        self.sort_key = key;
    }

    fn set_sort_order(&mut self, order: SortOrder) {
        self.sort_order = order;
        // The order is a fetch dependency of its own
        self.fetch();
    }

    fn on_sort_changed(&mut self) {
        self.fetch();
    }
}
