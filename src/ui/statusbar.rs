use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Loading,
    Ready(String),
    Failed(String),
}

pub struct StatusBar {
    pub status: Status,
}

impl StatusBar {
    pub fn new() -> Self {
        Self {
            status: Status::Loading,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let (marker, color, message) = match &self.status {
            Status::Loading => ("◌", Color::Yellow, "Loading…".to_string()),
            Status::Ready(msg) => ("●", Color::Green, msg.clone()),
            Status::Failed(msg) => ("●", Color::Red, msg.clone()),
        };

        let text = Line::from(vec![
            Span::styled(format!("{} ", marker), Style::default().fg(color)),
            Span::styled(message, Style::default().fg(Color::White)),
            Span::raw(" | "),
            Span::styled("Q", Style::default().fg(Color::Yellow)),
            Span::raw(":Quit "),
            Span::styled("↑↓", Style::default().fg(Color::Yellow)),
            Span::raw(":Nav "),
            Span::styled("←→", Style::default().fg(Color::Yellow)),
            Span::raw(":Adjust "),
            Span::styled("Space", Style::default().fg(Color::Yellow)),
            Span::raw(":Select "),
            Span::styled("M", Style::default().fg(Color::Yellow)),
            Span::raw(":Mode"),
        ]);

        let para = Paragraph::new(text).block(Block::default());
        frame.render_widget(para, area);
    }
}
