use ratatui::{
    Frame,
    layout::{Constraint, Layout, Position, Rect},
    style::{Color, Style, Stylize},
    symbols::border,
    text::Line,
    widgets::{Block, Clear, Paragraph},
};

use crate::advocate_table::centered_rect;
use crate::directory::Directory;

pub const TITLE_HEIGHT: u16 = 1;
pub const CMDLINE_HEIGHT: u16 = 1;
const ORDER_PROMPT: &str = "order: ";
const HELP_WIDTH: u16 = 48;
const HELP_HEIGHT: u16 = 14;

pub fn draw(directory: &Directory, frame: &mut Frame) {
    let [title_area, table_area, cmdline_area] = Layout::vertical([
        Constraint::Length(TITLE_HEIGHT),
        Constraint::Min(0),
        Constraint::Length(CMDLINE_HEIGHT),
    ])
    .areas(frame.area());

    frame.render_widget(
        Line::from(vec![" Advocates ".bold().green(), directory.title().into()]),
        title_area,
    );
    frame.render_widget(directory.table(), table_area);
    draw_cmdline(directory, frame, cmdline_area);

    if let Some(help) = directory.show_help() {
        draw_popup(frame, help, table_area);
    }
}

fn draw_cmdline(directory: &Directory, frame: &mut Frame, area: Rect) {
    match directory.prompt() {
        Some(input) => {
            let line = Line::from(vec![ORDER_PROMPT.bold().yellow(), input.input.clone().into()]);
            frame.render_widget(line, area);
            let x = area.x + ORDER_PROMPT.len() as u16 + input.cursor_pos as u16;
            frame.set_cursor_position(Position::new(x.min(area.right().saturating_sub(1)), area.y));
        }
        None => {
            let line = Line::from(vec![
                directory.status_message().to_string().into(),
                "  ".into(),
                "<?>".blue().bold(),
                " help ".into(),
                "<Q>".blue().bold(),
                " quit".into(),
            ]);
            frame.render_widget(line, area);
        }
    }
}

fn draw_popup(frame: &mut Frame, text: &str, area: Rect) {
    let popup = centered_rect(HELP_WIDTH, HELP_HEIGHT, area);
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(text).block(
            Block::bordered()
                .title(Line::from(" Help ".bold()).centered())
                .title_bottom(Line::from(" <Esc> close ").centered())
                .border_set(border::THICK)
                .border_style(Style::default().fg(Color::Blue)),
        ),
        popup,
    );
}

#[cfg(test)]
mod tests {
    use ratatui::{Terminal, backend::TestBackend};

    use super::*;
    use crate::domain::{AppConfig, Message};

    #[test]
    fn help_popup_is_drawn_over_the_table() {
        let mut directory = Directory::init(&AppConfig::new("missing.csv".into()));
        directory.update(Some(Message::Help)).unwrap();

        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        terminal.draw(|f| draw(&directory, f)).unwrap();

        let buffer = terminal.backend().buffer();
        let screen = buffer
            .content
            .iter()
            .map(|c| c.symbol())
            .collect::<String>();
        assert!(screen.contains("Advocates"));
        assert!(screen.contains("Help"));
        assert!(screen.contains("copy the selected advocate"));
    }
}
