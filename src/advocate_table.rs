//! Sortable advocate table.
//!
//! The table is a pure function of its props: it holds no state of its own
//! and forwards every interaction to the caller through
//! [`AdvocateTableEvents`].

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    symbols::border,
    text::{Line, Span},
    widgets::{Block, Cell, Clear, Paragraph, Row, StatefulWidget, Table, TableState, Widget},
};
use tracing::trace;

use crate::advocate::{Advocate, SortKey, SortOrder};
use crate::feedback::{ErrorMessage, TableSkeleton};
use crate::formatters::format_phone_number;

pub const HEADERS: [&str; 7] = [
    "First Name",
    "Last Name",
    "City",
    "Degree",
    "Specialties",
    "Years of Experience",
    "Phone Number",
];

const COLUMN_WIDTHS: [Constraint; 7] = [
    Constraint::Length(12),
    Constraint::Length(12),
    Constraint::Length(14),
    Constraint::Length(8),
    Constraint::Fill(1),
    Constraint::Length(19),
    Constraint::Length(17),
];

const CONTROLS_HEIGHT: u16 = 3;
const SPINNER: &str = "⠋";
const OVERLAY_WIDTH: u16 = 20;
const OVERLAY_HEIGHT: u16 = 3;

/// Callbacks owned by whoever renders the table.
pub trait AdvocateTableEvents {
    fn on_retry(&mut self);
    fn set_sort_key(&mut self, key: SortKey);
    fn set_sort_order(&mut self, order: SortOrder);
    fn on_sort_changed(&mut self);
}

/// Sort key selector changed: store the key, then ask for a re-sort.
pub fn change_sort_key<E: AdvocateTableEvents + ?Sized>(events: &mut E, key: SortKey) {
    trace!("Sort key selected: {}", key.value());
    events.set_sort_key(key);
    events.on_sort_changed();
}

/// Sort order selector changed. Anything but `asc` or `desc` is dropped.
///
/// Unlike [`change_sort_key`] this does not call `on_sort_changed`.
pub fn change_sort_order<E: AdvocateTableEvents + ?Sized>(events: &mut E, raw: &str) -> bool {
    match SortOrder::parse(raw) {
        Some(order) => {
            trace!("Sort order selected: {}", order.value());
            events.set_sort_order(order);
            true
        }
        None => {
            trace!("Ignoring sort order {raw:?}");
            false
        }
    }
}

/// The two selectors of the sort panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortControl {
    #[default]
    Key,
    Order,
}

impl SortControl {
    pub fn toggle(self) -> SortControl {
        match self {
            SortControl::Key => SortControl::Order,
            SortControl::Order => SortControl::Key,
        }
    }

    /// Only the key selector is disabled while a re-sort is in flight.
    pub fn is_enabled(self, refreshing: bool) -> bool {
        match self {
            SortControl::Key => !refreshing,
            SortControl::Order => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState<'a> {
    Error(&'a str),
    Loading,
    Ready,
}

impl<'a> RenderState<'a> {
    /// An error wins over loading; an empty error counts as no error.
    pub fn resolve(error: Option<&'a str>, is_loading: bool) -> RenderState<'a> {
        match error {
            Some(message) if !message.is_empty() => RenderState::Error(message),
            _ if is_loading => RenderState::Loading,
            _ => RenderState::Ready,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge<'a> {
    pub key: String,
    pub label: &'a str,
}

/// One badge per specialty, in the given order and without dedup.
pub fn badges(advocate: &Advocate) -> impl Iterator<Item = Badge<'_>> + Clone {
    advocate
        .specialties
        .iter()
        .enumerate()
        .map(move |(index, specialty)| Badge {
            key: format!("{}-{}-{}", advocate.id, specialty, index),
            label: specialty.as_str(),
        })
}

/// Display projection of one advocate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvocateRow<'a> {
    pub key: String,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub city: &'a str,
    pub degree: &'a str,
    pub badges: Vec<Badge<'a>>,
    pub years_of_experience: String,
    pub phone_number: String,
}

impl<'a> AdvocateRow<'a> {
    pub fn project(index: usize, advocate: &'a Advocate, format_phone: fn(&str) -> String) -> Self {
        AdvocateRow {
            key: format!("advocate-{}-{}", advocate.id, index),
            first_name: &advocate.first_name,
            last_name: &advocate.last_name,
            city: &advocate.city,
            degree: &advocate.degree,
            badges: badges(advocate).collect(),
            years_of_experience: advocate.years_of_experience.to_string(),
            phone_number: format_phone(&advocate.phone_number),
        }
    }

    fn to_row(&self) -> Row<'a> {
        let mut badge_spans = Vec::with_capacity(self.badges.len() * 2);
        for badge in &self.badges {
            badge_spans.push(Span::styled(
                format!(" {} ", badge.label),
                Style::default()
                    .fg(Color::White)
                    .bg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ));
            badge_spans.push(Span::raw(" "));
        }
        Row::new(vec![
            Cell::from(self.first_name),
            Cell::from(self.last_name),
            Cell::from(self.city),
            Cell::from(self.degree),
            Cell::from(Line::from(badge_spans)),
            Cell::from(self.years_of_experience.clone()),
            Cell::from(self.phone_number.clone()),
        ])
    }
}

#[derive(Clone, Copy)]
pub struct AdvocateTable<'a> {
    records: &'a [Advocate],
    is_loading: bool,
    refreshing: bool,
    error: Option<&'a str>,
    sort_key: SortKey,
    sort_order: SortOrder,
    focus: SortControl,
    selected: Option<usize>,
    phone_formatter: fn(&str) -> String,
}

impl<'a> AdvocateTable<'a> {
    pub fn new(
        records: &'a [Advocate],
        error: Option<&'a str>,
        sort_key: SortKey,
        sort_order: SortOrder,
    ) -> Self {
        Self {
            records,
            is_loading: false,
            refreshing: false,
            error,
            sort_key,
            sort_order,
            focus: SortControl::default(),
            selected: None,
            phone_formatter: format_phone_number,
        }
    }

    pub fn is_loading(mut self, is_loading: bool) -> Self {
        self.is_loading = is_loading;
        self
    }

    /// A re-sort is in flight while the current rows stay on screen.
    pub fn refreshing(mut self, refreshing: bool) -> Self {
        self.refreshing = refreshing;
        self
    }

    pub fn focus(mut self, focus: SortControl) -> Self {
        self.focus = focus;
        self
    }

    pub fn selected(mut self, selected: Option<usize>) -> Self {
        self.selected = selected;
        self
    }

    pub fn phone_formatter(mut self, phone_formatter: fn(&str) -> String) -> Self {
        self.phone_formatter = phone_formatter;
        self
    }

    pub fn state(&self) -> RenderState<'a> {
        RenderState::resolve(self.error, self.is_loading)
    }

    pub fn rows(&self) -> impl Iterator<Item = AdvocateRow<'a>> + '_ {
        self.records
            .iter()
            .enumerate()
            .map(|(index, advocate)| AdvocateRow::project(index, advocate, self.phone_formatter))
    }

    fn render_ready(&self, area: Rect, buf: &mut Buffer) {
        let [controls_area, table_area] =
            Layout::vertical([Constraint::Length(CONTROLS_HEIGHT), Constraint::Min(0)])
                .areas(area);
        self.render_controls(controls_area, buf);
        self.render_table(table_area, buf);
        if self.refreshing {
            render_overlay(table_area, buf);
        }
    }

    fn render_controls(&self, area: Rect, buf: &mut Buffer) {
        let key = selector(
            self.sort_key.label(),
            self.focus == SortControl::Key,
            SortControl::Key.is_enabled(self.refreshing),
        );
        let order = selector(
            self.sort_order.label(),
            self.focus == SortControl::Order,
            SortControl::Order.is_enabled(self.refreshing),
        );
        let line = Line::from(vec![
            "Sort By: ".bold(),
            key,
            "   ".into(),
            "Order: ".bold(),
            order,
        ]);
        Paragraph::new(line)
            .block(
                Block::bordered()
                    .border_set(border::PLAIN)
                    .border_style(Style::default().fg(Color::DarkGray)),
            )
            .render(area, buf);
    }

    fn render_table(&self, area: Rect, buf: &mut Buffer) {
        let header = Row::new(HEADERS.map(|h| Cell::from(h.bold())))
            .style(Style::default().bg(Color::DarkGray));
        let rows = self.rows().map(|row| row.to_row()).collect::<Vec<_>>();
        let title = Line::from(format!(" Advocates ({}) ", self.records.len()).bold());

        let table = Table::new(rows, COLUMN_WIDTHS)
            .header(header)
            .block(Block::bordered().title(title.centered()).border_set(border::THICK))
            .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

        let mut state = TableState::default().with_selected(self.selected);
        StatefulWidget::render(table, area, buf, &mut state);
    }
}

impl Widget for AdvocateTable<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state() {
            RenderState::Error(error) => ErrorMessage { error }.render(area, buf),
            RenderState::Loading => TableSkeleton.render(area, buf),
            RenderState::Ready => self.render_ready(area, buf),
        }
    }
}

fn selector(label: &str, focused: bool, enabled: bool) -> Span<'static> {
    let mut style = Style::default();
    if focused {
        style = style.add_modifier(Modifier::REVERSED);
    }
    if !enabled {
        style = style.fg(Color::DarkGray).add_modifier(Modifier::DIM);
    }
    Span::styled(format!("[ {label} ▾ ]"), style)
}

fn render_overlay(area: Rect, buf: &mut Buffer) {
    buf.set_style(area, Style::default().add_modifier(Modifier::DIM));

    let popup = centered_rect(OVERLAY_WIDTH, OVERLAY_HEIGHT, area);
    Clear.render(popup, buf);
    Paragraph::new(Line::from(vec![SPINNER.green().bold(), " Sorting ...".into()]))
        .centered()
        .block(Block::bordered().border_set(border::ROUNDED))
        .render(popup, buf);
}

pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advocate::sample;

    const WIDTH: u16 = 140;
    const HEIGHT: u16 = 14;

    fn render(table: AdvocateTable) -> Buffer {
        let area = Rect::new(0, 0, WIDTH, HEIGHT);
        let mut buf = Buffer::empty(area);
        table.render(area, &mut buf);
        buf
    }

    fn lines(buf: &Buffer) -> Vec<String> {
        buf.content
            .chunks(buf.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect()
    }

    fn screen(table: AdvocateTable) -> String {
        lines(&render(table)).join("\n")
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl AdvocateTableEvents for Recorder {
        fn on_retry(&mut self) {
            self.calls.push("on_retry".into());
        }

        fn set_sort_key(&mut self, key: SortKey) {
            self.calls.push(format!("set_sort_key({})", key.value()));
        }

        fn set_sort_order(&mut self, order: SortOrder) {
            self.calls.push(format!("set_sort_order({})", order.value()));
        }

        fn on_sort_changed(&mut self) {
            self.calls.push("on_sort_changed".into());
        }
    }

    #[test]
    fn error_hides_table_even_while_loading() {
        let records = vec![sample(1, "Ann", "Lee")];
        let table = AdvocateTable::new(&records, Some("Network down"), SortKey::FirstName, SortOrder::Asc)
            .is_loading(true);

        assert_eq!(table.state(), RenderState::Error("Network down"));
        let out = screen(table);
        assert!(out.contains("Network down"));
        assert!(out.contains("Retry"));
        assert!(!out.contains("Sort By"));
        assert!(!out.contains("First Name"));
        assert!(!out.contains("Ann"));
    }

    #[test]
    fn loading_shows_skeleton_only() {
        let records = vec![sample(1, "Ann", "Lee")];
        let table =
            AdvocateTable::new(&records, None, SortKey::FirstName, SortOrder::Asc).is_loading(true);

        assert_eq!(table.state(), RenderState::Loading);
        let out = screen(table);
        assert!(out.contains("Loading advocates"));
        assert!(!out.contains("Sort By"));
        assert!(!out.contains("Ann"));
    }

    #[test]
    fn empty_error_counts_as_absent() {
        assert_eq!(RenderState::resolve(Some(""), false), RenderState::Ready);
        assert_eq!(RenderState::resolve(Some(""), true), RenderState::Loading);
        assert_eq!(RenderState::resolve(None, false), RenderState::Ready);
    }

    #[test]
    fn renders_single_advocate_row() {
        let records = vec![sample(1, "Ann", "Lee")];
        let out = screen(AdvocateTable::new(&records, None, SortKey::FirstName, SortOrder::Asc));

        assert!(out.contains("Sort By"));
        assert!(out.contains("[ First Name ▾ ]"));
        assert!(out.contains("[ Ascending ▾ ]"));
        for header in HEADERS {
            assert!(out.contains(header), "missing header {header}");
        }

        let row = out
            .lines()
            .find(|l| l.contains("Ann"))
            .expect("row for Ann");
        for cell in ["Ann", "Lee", "Austin", "MD", " Cardiology ", "5", "(555) 123-4567"] {
            assert!(row.contains(cell), "missing {cell:?} in {row:?}");
        }
    }

    #[test]
    fn rows_follow_input_order() {
        let records = vec![
            sample(3, "Cyd", "Zed"),
            sample(1, "Abe", "Young"),
            sample(2, "Bo", "Xu"),
        ];
        let table = AdvocateTable::new(&records, None, SortKey::LastName, SortOrder::Desc);

        let keys: Vec<String> = table.rows().map(|r| r.key).collect();
        assert_eq!(keys, vec!["advocate-3-0", "advocate-1-1", "advocate-2-2"]);

        let out = lines(&render(table));
        let position = |name: &str| out.iter().position(|l| l.contains(name)).unwrap();
        assert!(position("Cyd") < position("Abe"));
        assert!(position("Abe") < position("Bo "));
    }

    #[test]
    fn row_projection_fills_every_cell() {
        let advocate = sample(7, "Ann", "Lee");
        let row = AdvocateRow::project(0, &advocate, format_phone_number);
        assert_eq!(row.first_name, "Ann");
        assert_eq!(row.last_name, "Lee");
        assert_eq!(row.city, "Austin");
        assert_eq!(row.degree, "MD");
        assert_eq!(row.badges.len(), 1);
        assert_eq!(row.years_of_experience, "5");
        assert_eq!(row.phone_number, "(555) 123-4567");
    }

    #[test]
    fn phone_goes_through_the_supplied_formatter() {
        fn shout(raw: &str) -> String {
            format!("tel:{raw}")
        }
        let records = vec![sample(1, "Ann", "Lee")];
        let table = AdvocateTable::new(&records, None, SortKey::FirstName, SortOrder::Asc)
            .phone_formatter(shout);
        assert_eq!(table.rows().next().unwrap().phone_number, "tel:5551234567");
        assert!(screen(table).contains("tel:5551234567"));
    }

    #[test]
    fn badges_keep_order_and_duplicates() {
        let mut advocate = sample(9, "Ann", "Lee");
        advocate.specialties = vec!["Sleep".into(), "Diet".into(), "Sleep".into()];

        let iter = badges(&advocate);
        let first: Vec<Badge> = iter.clone().collect();
        let second: Vec<Badge> = iter.collect();
        assert_eq!(first, second);
        assert_eq!(
            first.iter().map(|b| b.label).collect::<Vec<_>>(),
            vec!["Sleep", "Diet", "Sleep"]
        );
        assert_eq!(first[0].key, "9-Sleep-0");
        assert_eq!(first[2].key, "9-Sleep-2");
    }

    #[test]
    fn rendering_is_idempotent() {
        let records = vec![sample(1, "Ann", "Lee"), sample(2, "Bea", "Zhou")];
        let table = AdvocateTable::new(&records, None, SortKey::LastName, SortOrder::Desc)
            .focus(SortControl::Order)
            .selected(Some(1));
        assert_eq!(render(table), render(table));
    }

    #[test]
    fn invalid_sort_order_is_ignored() {
        let mut events = Recorder::default();
        assert!(!change_sort_order(&mut events, "xyz"));
        assert!(events.calls.is_empty());
    }

    #[test]
    fn valid_sort_order_does_not_notify() {
        let mut events = Recorder::default();
        assert!(change_sort_order(&mut events, "desc"));
        assert_eq!(events.calls, vec!["set_sort_order(desc)"]);
    }

    #[test]
    fn sort_key_change_sets_then_notifies() {
        let mut events = Recorder::default();
        change_sort_key(&mut events, SortKey::LastName);
        assert_eq!(events.calls, vec!["set_sort_key(lastName)", "on_sort_changed"]);
    }

    #[test]
    fn refreshing_keeps_rows_under_overlay() {
        let records = vec![sample(1, "Ann", "Lee")];
        let table = AdvocateTable::new(&records, None, SortKey::FirstName, SortOrder::Asc)
            .refreshing(true);

        assert_eq!(table.state(), RenderState::Ready);
        let out = screen(table);
        assert!(out.contains("Sorting ..."));
        assert!(out.contains("Ann"));
        assert!(!SortControl::Key.is_enabled(true));
        assert!(SortControl::Order.is_enabled(true));
        assert!(SortControl::Key.is_enabled(false));
    }

    /// Style of the first cell of `needle` on screen row `y`.
    fn style_at(buf: &Buffer, y: u16, needle: &str) -> (Color, Modifier) {
        let line = &lines(buf)[y as usize];
        let byte = line.find(needle).expect("selector on screen");
        let x = line[..byte].chars().count() as u16;
        let cell = buf.cell((x, y)).expect("cell inside buffer");
        (cell.fg, cell.modifier)
    }

    #[test]
    fn key_selector_is_drawn_disabled_while_refreshing() {
        let records = vec![sample(1, "Ann", "Lee")];
        let table = AdvocateTable::new(&records, None, SortKey::FirstName, SortOrder::Asc)
            .focus(SortControl::Order);

        let idle = render(table);
        let busy = render(table.refreshing(true));

        let (fg, modifier) = style_at(&busy, 1, "[ First Name");
        assert_eq!(fg, Color::DarkGray);
        assert!(modifier.contains(Modifier::DIM));

        let (fg, modifier) = style_at(&idle, 1, "[ First Name");
        assert_ne!(fg, Color::DarkGray);
        assert!(!modifier.contains(Modifier::DIM));

        assert_eq!(
            style_at(&busy, 1, "[ Ascending"),
            style_at(&idle, 1, "[ Ascending")
        );
        let (_, modifier) = style_at(&busy, 1, "[ Ascending");
        assert!(modifier.contains(Modifier::REVERSED));
        assert!(!modifier.contains(Modifier::DIM));
    }

    #[test]
    fn focus_toggles_between_selectors() {
        assert_eq!(SortControl::Key.toggle(), SortControl::Order);
        assert_eq!(SortControl::Order.toggle(), SortControl::Key);
    }
}
