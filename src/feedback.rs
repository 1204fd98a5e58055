use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Margin, Rect},
    style::{Color, Style, Stylize},
    symbols::border,
    text::{Line, Text},
    widgets::{Block, Paragraph, Widget, Wrap},
};

const SKELETON_ROWS: usize = 5;
const SKELETON_BAR: &str = "░";

/// Placeholder shown while the first batch of advocates is loading.
pub struct TableSkeleton;

impl Widget for TableSkeleton {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered()
            .title(Line::from(" Loading advocates ... ".bold()).centered())
            .border_set(border::PLAIN)
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(area);
        block.render(area, buf);

        let width = inner.width.saturating_sub(2) as usize;
        let mut lines = vec![Line::from(SKELETON_BAR.repeat(width)).fg(Color::Gray)];
        for row in 0..SKELETON_ROWS {
            // Alternate bar lengths so the rows read as separate records
            let len = if row % 2 == 0 { width } else { width * 3 / 4 };
            lines.push(Line::from(""));
            lines.push(Line::from(SKELETON_BAR.repeat(len)).fg(Color::DarkGray));
        }
        Paragraph::new(lines).render(inner.inner(Margin::new(1, 1)), buf);
    }
}

/// Error placeholder with the message and a retry hint.
pub struct ErrorMessage<'a> {
    pub error: &'a str,
}

impl Widget for ErrorMessage<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered()
            .title(Line::from(" Something went wrong ".bold()).centered())
            .border_set(border::THICK)
            .border_style(Style::default().fg(Color::Red));
        let inner = block.inner(area);
        block.render(area, buf);

        let [message_area, retry_area] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(inner);

        Paragraph::new(Text::from(self.error).fg(Color::Red))
            .centered()
            .wrap(Wrap { trim: true })
            .render(message_area, buf);

        Line::from(vec![" Retry ".into(), "<R>".blue().bold()])
            .centered()
            .render(retry_area, buf);
    }
}
