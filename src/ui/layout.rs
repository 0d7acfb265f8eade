use crate::config::AppConfig;
use crate::error::DashboardError;
use crate::pipeline::RenderResult;
use crate::ui::{CandleChart, LineChartView, Sidebar, StatusBar};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub const TITLE: &str = "US Tech Stock Prices";

pub struct LayoutManager {
    pub sidebar: Sidebar,
    pub statusbar: StatusBar,
}

impl LayoutManager {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            sidebar: Sidebar::from_config(config),
            statusbar: StatusBar::new(),
        }
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        view: Option<&Result<RenderResult, DashboardError>>,
        area: Rect,
    ) {
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(1),
            ])
            .split(area);

        let title = Paragraph::new(Line::from(Span::styled(
            TITLE,
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );
        frame.render_widget(title, main_chunks[0]);

        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(30), Constraint::Min(40)])
            .split(main_chunks[1]);

        self.sidebar.render(frame, content_chunks[0]);
        self.render_view(frame, view, content_chunks[1]);
        self.statusbar.render(frame, main_chunks[2]);
    }

    fn render_view(
        &self,
        frame: &mut Frame,
        view: Option<&Result<RenderResult, DashboardError>>,
        area: Rect,
    ) {
        match view {
            None => {}
            Some(Ok(RenderResult::Lines {
                series,
                table,
                selected,
                price_range,
            })) => LineChartView {
                days: self.sidebar.days,
                series,
                table,
                selected,
                price_range: *price_range,
            }
            .render(frame, area),
            Some(Ok(RenderResult::Candles {
                name,
                symbol,
                candles,
                price_range,
            })) => CandleChart {
                name,
                symbol,
                candles,
                price_range: *price_range,
            }
            .render(frame, area),
            Some(Err(err)) => {
                let message = Paragraph::new(Line::from(Span::styled(
                    err.to_string(),
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )))
                .wrap(Wrap { trim: true })
                .block(
                    Block::default()
                        .title("Error")
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::Red)),
                );
                frame.render_widget(message, area);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(view: Option<&Result<RenderResult, DashboardError>>) -> String {
        let layout = LayoutManager::new(&AppConfig::default());
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal
            .draw(|f| layout.render(f, view, f.area()))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn shows_title_and_settings_before_first_result() {
        let text = draw(None);
        assert!(text.contains(TITLE));
        assert!(text.contains("Settings"));
        assert!(text.contains("[x] google"));
    }

    #[test]
    fn errors_are_shown_in_place_of_the_chart() {
        let text = draw(Some(&Err(DashboardError::NoSelection)));
        assert!(text.contains("select at least one company"));
    }
}
