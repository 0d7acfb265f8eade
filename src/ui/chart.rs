use crate::data::{CandleDirection, CandleRow};
use crate::pipeline::PriceRange;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub const UP_COLOR: Color = Color::Rgb(0x06, 0x98, 0x2d);
pub const DOWN_COLOR: Color = Color::Rgb(0xae, 0x13, 0x25);
const LABEL_WIDTH: u16 = 13;

pub fn candle_color(candle: &CandleRow) -> Color {
    match candle.direction() {
        CandleDirection::Up => UP_COLOR,
        CandleDirection::Down => DOWN_COLOR,
    }
}

/// Candlestick view of one company with the Y axis pinned to the price range.
pub struct CandleChart<'a> {
    pub name: &'a str,
    pub symbol: &'a str,
    pub candles: &'a [CandleRow],
    pub price_range: PriceRange,
}

impl CandleChart<'_> {
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(3),
            ])
            .split(area);

        let title = format!("{} ({}) candlestick", self.name, self.symbol);
        let title_block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        frame.render_widget(title_block, vertical[0]);

        self.render_candlesticks(frame, vertical[1]);
        self.render_stats(frame, vertical[2]);
    }

    fn render_candlesticks(&self, frame: &mut Frame, area: Rect) {
        if self.candles.is_empty() || area.width < 20 || area.height < 5 {
            return;
        }

        let [min_price, max_price] = self.price_range.bounds();
        let price_span = (max_price - min_price).max(0.0001);
        let chart_width = area.width.saturating_sub(LABEL_WIDTH);
        let chart_height = area.height.saturating_sub(2);

        let inner = Rect {
            x: area.x + LABEL_WIDTH,
            y: area.y + 1,
            width: chart_width,
            height: chart_height,
        };

        // Oldest candles fall off the left edge when the window is narrower
        // than the number of trading days.
        let visible = self.candles.len().min(chart_width as usize);
        let shown = &self.candles[self.candles.len() - visible..];
        let candle_width = (chart_width as usize / visible.max(1)).max(1);

        let row_of = |price: f64| -> u16 {
            let clamped = price.clamp(min_price, max_price);
            inner.y + ((max_price - clamped) / price_span * (chart_height - 1) as f64) as u16
        };

        for (idx, candle) in shown.iter().enumerate() {
            if candle.high < min_price || candle.low > max_price {
                continue;
            }

            let x = inner.x + (idx * candle_width) as u16 + candle_width as u16 / 2;
            if x >= inner.x + inner.width {
                break;
            }

            let color = candle_color(candle);
            let high_y = row_of(candle.high);
            let low_y = row_of(candle.low);
            let open_y = row_of(candle.open);
            let close_y = row_of(candle.close);
            let body_top = open_y.min(close_y);
            let body_bottom = open_y.max(close_y);

            for y in high_y..=low_y {
                let cell = &mut frame.buffer_mut()[(x, y)];
                cell.set_char('│').set_fg(color);
            }
            for y in body_top..=body_bottom {
                let cell = &mut frame.buffer_mut()[(x, y)];
                cell.set_char('█').set_fg(color);
            }
        }

        let label_count = 5.min(chart_height as usize / 2).max(1);
        for i in 0..=label_count {
            let y = inner.y + ((i as u16) * chart_height.saturating_sub(1) / label_count as u16);
            let price = max_price - (i as f64 / label_count as f64) * price_span;
            let label = format!("{:>11.2}", price);

            for (j, ch) in label.chars().enumerate() {
                let x_pos = area.x + j as u16;
                if x_pos < area.x + LABEL_WIDTH && y < area.y + area.height {
                    let cell = &mut frame.buffer_mut()[(x_pos, y)];
                    cell.set_char(ch).set_fg(Color::Gray);
                }
            }
        }

        if let (Some(first), Some(last)) = (shown.first(), shown.last()) {
            let axis = Line::from(vec![
                Span::styled(first.date.format("%d %b %Y").to_string(), Style::default().fg(Color::Gray)),
                Span::raw(" … "),
                Span::styled(last.date.format("%d %b %Y").to_string(), Style::default().fg(Color::Gray)),
            ]);
            frame.render_widget(
                Paragraph::new(axis),
                Rect {
                    x: inner.x,
                    y: area.y + area.height - 1,
                    width: inner.width,
                    height: 1,
                },
            );
        }
    }

    fn render_stats(&self, frame: &mut Frame, area: Rect) {
        let Some(latest) = self.candles.last() else {
            return;
        };
        let first_open = self.candles.first().map(|c| c.open).unwrap_or(latest.open);
        let change = latest.close - first_open;
        let change_pct = if first_open != 0.0 {
            (change / first_open) * 100.0
        } else {
            0.0
        };
        let change_color = if change >= 0.0 { UP_COLOR } else { DOWN_COLOR };

        let stats_text = Line::from(vec![
            Span::styled(
                format!("{}  ", latest.date.format("%Y-%m-%d")),
                Style::default().fg(Color::Gray),
            ),
            Span::styled("Open: ", Style::default().fg(Color::Gray)),
            Span::styled(format!("{:.2}  ", latest.open), Style::default().fg(Color::White)),
            Span::styled("High: ", Style::default().fg(Color::Gray)),
            Span::styled(format!("{:.2}  ", latest.high), Style::default().fg(UP_COLOR)),
            Span::styled("Low: ", Style::default().fg(Color::Gray)),
            Span::styled(format!("{:.2}  ", latest.low), Style::default().fg(DOWN_COLOR)),
            Span::styled("Close: ", Style::default().fg(Color::Gray)),
            Span::styled(format!("{:.2}  ", latest.close), Style::default().fg(Color::White)),
            Span::styled("Chg: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{:+.2} ({:+.2}%)", change, change_pct),
                Style::default().fg(change_color).add_modifier(Modifier::BOLD),
            ),
        ]);

        let stats_block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Blue));
        frame.render_widget(Paragraph::new(stats_text).block(stats_block), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ratatui::{backend::TestBackend, Terminal};

    fn candle(day: u32, open: f64, close: f64) -> CandleRow {
        CandleRow {
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            open,
            high: open.max(close) + 1.0,
            low: open.min(close) - 1.0,
            close,
        }
    }

    #[test]
    fn colours_follow_direction() {
        assert_eq!(candle_color(&candle(4, 10.0, 10.0)), UP_COLOR);
        assert_eq!(candle_color(&candle(4, 10.0, 12.0)), UP_COLOR);
        assert_eq!(candle_color(&candle(4, 12.0, 10.0)), DOWN_COLOR);
    }

    #[test]
    fn renders_bodies_and_latest_stats() {
        let candles = vec![candle(4, 100.0, 120.0), candle(5, 120.0, 110.0)];
        let chart = CandleChart {
            name: "apple",
            symbol: "AAPL",
            candles: &candles,
            price_range: PriceRange::new(0.0, 200.0),
        };
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| chart.render(f, f.area())).unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("apple (AAPL) candlestick"));
        assert!(text.contains("Close: 110.00"));
        assert!(buffer.content().iter().any(|c| c.symbol() == "█" && c.fg == UP_COLOR));
        assert!(buffer.content().iter().any(|c| c.symbol() == "█" && c.fg == DOWN_COLOR));
    }

    #[test]
    fn candles_outside_the_range_are_not_drawn() {
        let candles = vec![candle(4, 400.0, 420.0)];
        let chart = CandleChart {
            name: "meta",
            symbol: "META",
            candles: &candles,
            price_range: PriceRange::new(0.0, 100.0),
        };
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| chart.render(f, f.area())).unwrap();
        assert!(!terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .any(|c| c.symbol() == "█"));
    }
}
