use crate::config::{AppConfig, PRICE_CEILING};
use crate::pipeline::{ChartMode, PriceRange, RenderParams, Selection, MAX_DAYS, MIN_DAYS};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const PRICE_STEP: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Days,
    PriceMin,
    PriceMax,
    Mode,
    Companies,
}

impl Control {
    fn all() -> [Control; 5] {
        [
            Control::Days,
            Control::PriceMin,
            Control::PriceMax,
            Control::Mode,
            Control::Companies,
        ]
    }

    fn index(self) -> usize {
        Control::all().iter().position(|c| *c == self).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Quit,
    Changed,
    Moved,
    Ignored,
}

/// Parameter widgets. Every value change produces new render parameters.
pub struct Sidebar {
    pub days: u32,
    pub price_range: PriceRange,
    pub mode: ChartMode,
    pub companies: Vec<String>,
    pub candlestick_company: String,
    pub names: Vec<String>,
    pub focus: Control,
    pub cursor: usize,
}

impl Sidebar {
    pub fn from_config(config: &AppConfig) -> Self {
        let names: Vec<String> = config.instruments.iter().map(|i| i.name.clone()).collect();
        let cursor = names
            .iter()
            .position(|n| n == &config.candlestick_company)
            .unwrap_or(0);
        Self {
            days: config.days,
            price_range: config.price_range,
            mode: config.mode,
            companies: config.companies.clone(),
            candlestick_company: config.candlestick_company.clone(),
            names,
            focus: Control::Days,
            cursor,
        }
    }

    pub fn store(&self, config: &mut AppConfig) {
        config.days = self.days;
        config.price_range = self.price_range;
        config.mode = self.mode;
        config.companies = self.companies.clone();
        config.candlestick_company = self.candlestick_company.clone();
    }

    pub fn params(&self) -> RenderParams {
        let selection = match self.mode {
            ChartMode::MultiLine => Selection::Companies(self.companies.clone()),
            ChartMode::Candlestick => Selection::Company(self.candlestick_company.clone()),
        };
        RenderParams {
            day_count: self.days,
            price_range: self.price_range,
            selection,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> KeyOutcome {
        if key.kind != KeyEventKind::Press {
            return KeyOutcome::Ignored;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => KeyOutcome::Quit,
            KeyCode::Char('m') => {
                self.mode = self.mode.toggled();
                KeyOutcome::Changed
            }
            KeyCode::Up => self.move_focus(-1),
            KeyCode::Down | KeyCode::Tab => self.move_focus(1),
            KeyCode::Left | KeyCode::Char('-') => self.adjust(-1),
            KeyCode::Right | KeyCode::Char('+') => self.adjust(1),
            KeyCode::Char(' ') | KeyCode::Enter => self.toggle_company(),
            _ => KeyOutcome::Ignored,
        }
    }

    fn move_focus(&mut self, step: i32) -> KeyOutcome {
        if self.focus == Control::Companies {
            let last = self.names.len().saturating_sub(1);
            if step > 0 && self.cursor < last {
                self.cursor += 1;
                return KeyOutcome::Moved;
            }
            if step < 0 && self.cursor > 0 {
                self.cursor -= 1;
                return KeyOutcome::Moved;
            }
        }

        let controls = Control::all();
        let idx = self.focus.index() as i32 + step;
        let idx = idx.rem_euclid(controls.len() as i32) as usize;
        self.focus = controls[idx];
        KeyOutcome::Moved
    }

    fn adjust(&mut self, step: i32) -> KeyOutcome {
        match self.focus {
            Control::Days => {
                let days = (self.days as i64 + step as i64).clamp(MIN_DAYS as i64, MAX_DAYS as i64);
                self.set_if_changed_days(days as u32)
            }
            Control::PriceMin => {
                // loaded settings may hold min > max
                let min = (self.price_range.min + step as f64 * PRICE_STEP)
                    .min(self.price_range.max)
                    .max(0.0);
                self.set_if_changed_range(PriceRange::new(min, self.price_range.max))
            }
            Control::PriceMax => {
                let max = (self.price_range.max + step as f64 * PRICE_STEP)
                    .max(self.price_range.min)
                    .min(PRICE_CEILING);
                self.set_if_changed_range(PriceRange::new(self.price_range.min, max))
            }
            Control::Mode => {
                self.mode = self.mode.toggled();
                KeyOutcome::Changed
            }
            Control::Companies => KeyOutcome::Ignored,
        }
    }

    fn set_if_changed_days(&mut self, days: u32) -> KeyOutcome {
        if days == self.days {
            return KeyOutcome::Ignored;
        }
        self.days = days;
        KeyOutcome::Changed
    }

    fn set_if_changed_range(&mut self, range: PriceRange) -> KeyOutcome {
        if range == self.price_range {
            return KeyOutcome::Ignored;
        }
        self.price_range = range;
        KeyOutcome::Changed
    }

    fn toggle_company(&mut self) -> KeyOutcome {
        if self.focus != Control::Companies {
            return KeyOutcome::Ignored;
        }
        let Some(name) = self.names.get(self.cursor).cloned() else {
            return KeyOutcome::Ignored;
        };

        match self.mode {
            ChartMode::MultiLine => {
                if let Some(pos) = self.companies.iter().position(|c| c == &name) {
                    self.companies.remove(pos);
                } else {
                    self.companies.push(name);
                }
                KeyOutcome::Changed
            }
            ChartMode::Candlestick => {
                if self.candlestick_company == name {
                    return KeyOutcome::Ignored;
                }
                self.candlestick_company = name;
                KeyOutcome::Changed
            }
        }
    }

    fn style_for(&self, control: Control) -> Style {
        if self.focus == control {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title("Settings")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let heading = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
        let mut lines = vec![
            Line::from(Span::styled("Days shown", heading)),
            Line::from(vec![
                Span::styled(format!("◀ {:>3} ▶", self.days), self.style_for(Control::Days)),
                Span::styled(
                    format!("  ({MIN_DAYS}-{MAX_DAYS})"),
                    Style::default().fg(Color::Gray),
                ),
            ]),
            Line::from(slider(self.days, MAX_DAYS, inner.width)),
            Line::raw(""),
            Line::from(Span::styled("Price range (USD)", heading)),
            Line::from(vec![
                Span::styled(
                    format!("min {:>7.2}", self.price_range.min),
                    self.style_for(Control::PriceMin),
                ),
            ]),
            Line::from(vec![
                Span::styled(
                    format!("max {:>7.2}", self.price_range.max),
                    self.style_for(Control::PriceMax),
                ),
            ]),
            Line::raw(""),
            Line::from(Span::styled("Chart", heading)),
        ];

        for mode in [ChartMode::MultiLine, ChartMode::Candlestick] {
            let mark = if mode == self.mode { "(•)" } else { "( )" };
            lines.push(Line::from(Span::styled(
                format!("{mark} {}", mode.label()),
                self.style_for(Control::Mode),
            )));
        }

        lines.push(Line::raw(""));
        let companies_heading = match self.mode {
            ChartMode::MultiLine => "Companies (space toggles)",
            ChartMode::Candlestick => "Company (enter selects)",
        };
        lines.push(Line::from(Span::styled(companies_heading, heading)));

        for (idx, name) in self.names.iter().enumerate() {
            let checked = match self.mode {
                ChartMode::MultiLine => self.companies.contains(name),
                ChartMode::Candlestick => &self.candlestick_company == name,
            };
            let mark = match (self.mode, checked) {
                (ChartMode::MultiLine, true) => "[x]",
                (ChartMode::MultiLine, false) => "[ ]",
                (ChartMode::Candlestick, true) => "(•)",
                (ChartMode::Candlestick, false) => "( )",
            };
            let style = if self.focus == Control::Companies && idx == self.cursor {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            } else if checked {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default().fg(Color::White)
            };
            lines.push(Line::from(Span::styled(format!("{mark} {name}"), style)));
        }

        frame.render_widget(Paragraph::new(lines), inner);
    }
}

fn slider(value: u32, max: u32, width: u16) -> Span<'static> {
    let width = width.saturating_sub(2).max(1) as usize;
    let filled = (value as usize * width / max.max(1) as usize).min(width);
    Span::styled(
        format!("{}{}", "━".repeat(filled), "─".repeat(width - filled)),
        Style::default().fg(Color::Blue),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn sidebar() -> Sidebar {
        Sidebar::from_config(&AppConfig::default())
    }

    #[test]
    fn days_slider_stays_within_bounds() {
        let mut bar = sidebar();
        bar.days = 100;
        assert_eq!(bar.handle_key(key(KeyCode::Right)), KeyOutcome::Ignored);
        assert_eq!(bar.handle_key(key(KeyCode::Left)), KeyOutcome::Changed);
        assert_eq!(bar.days, 99);

        bar.days = 1;
        assert_eq!(bar.handle_key(key(KeyCode::Left)), KeyOutcome::Ignored);
        assert_eq!(bar.days, 1);
    }

    #[test]
    fn price_handles_cannot_cross() {
        let mut bar = sidebar();
        bar.price_range = PriceRange::new(100.0, 105.0);
        bar.focus = Control::PriceMin;
        bar.handle_key(key(KeyCode::Right));
        assert_eq!(bar.price_range, PriceRange::new(105.0, 105.0));

        bar.focus = Control::PriceMax;
        bar.handle_key(key(KeyCode::Right));
        assert_eq!(bar.price_range.max, 115.0);
    }

    #[test]
    fn toggling_companies_builds_the_selection() {
        let mut bar = sidebar();
        bar.companies.clear();
        bar.focus = Control::Companies;
        bar.cursor = 1;
        assert_eq!(bar.handle_key(key(KeyCode::Char(' '))), KeyOutcome::Changed);
        assert_eq!(bar.params().selection, Selection::Companies(vec!["meta".into()]));

        bar.handle_key(key(KeyCode::Char(' ')));
        assert_eq!(bar.params().selection, Selection::Companies(Vec::new()));
    }

    #[test]
    fn candlestick_mode_selects_one_company() {
        let mut bar = sidebar();
        bar.handle_key(key(KeyCode::Char('m')));
        bar.focus = Control::Companies;
        bar.cursor = 4;
        bar.handle_key(key(KeyCode::Enter));
        assert_eq!(bar.params().selection, Selection::Company("netflix".into()));
        assert_eq!(bar.params().mode(), ChartMode::Candlestick);
    }

    #[test]
    fn focus_walks_the_company_list_before_wrapping() {
        let mut bar = sidebar();
        bar.focus = Control::Mode;
        bar.handle_key(key(KeyCode::Down));
        assert_eq!(bar.focus, Control::Companies);
        bar.cursor = 0;
        for _ in 0..5 {
            bar.handle_key(key(KeyCode::Down));
        }
        assert_eq!(bar.cursor, 5);
        bar.handle_key(key(KeyCode::Down));
        assert_eq!(bar.focus, Control::Days);
    }

    #[test]
    fn store_writes_back_into_config() {
        let mut bar = sidebar();
        bar.days = 45;
        bar.mode = ChartMode::Candlestick;
        let mut cfg = AppConfig::default();
        bar.store(&mut cfg);
        assert_eq!(cfg.days, 45);
        assert_eq!(cfg.mode, ChartMode::Candlestick);
    }

    #[test]
    fn quit_keys() {
        let mut bar = sidebar();
        assert_eq!(bar.handle_key(key(KeyCode::Char('q'))), KeyOutcome::Quit);
        assert_eq!(bar.handle_key(key(KeyCode::Esc)), KeyOutcome::Quit);
    }
}
