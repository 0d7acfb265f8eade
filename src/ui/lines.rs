use crate::data::{CloseMatrix, LongFormRow};
use crate::pipeline::PriceRange;
use chrono::{Datelike, NaiveDate};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Cell, Chart, Dataset, GraphType, Row, Table},
    Frame,
};

const PALETTE: [Color; 6] = [
    Color::Cyan,
    Color::Yellow,
    Color::Magenta,
    Color::Green,
    Color::LightRed,
    Color::LightBlue,
];
const NAME_WIDTH: u16 = 12;
const PRICE_WIDTH: u16 = 9;

/// How many of the latest dates fit beside the name column.
fn visible_dates(total: usize, width: u16) -> usize {
    let room = width.saturating_sub(2 + NAME_WIDTH) / (PRICE_WIDTH + 1);
    total.min(usize::from(room).max(1))
}

fn table_title(shown: usize, total: usize) -> String {
    if shown < total {
        format!("Closing prices (USD), latest {shown} of {total} dates")
    } else {
        "Closing prices (USD)".to_string()
    }
}

fn x_of(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

/// Plot points per company in the order the companies were selected.
/// Missing prices leave a gap in the points; the rows themselves keep them.
pub fn series_points(series: &[LongFormRow], selected: &[String]) -> Vec<(String, Vec<(f64, f64)>)> {
    selected
        .iter()
        .map(|name| {
            let points = series
                .iter()
                .filter(|row| &row.name == name)
                .filter_map(|row| row.price.map(|p| (x_of(row.date), p)))
                .collect();
            (name.clone(), points)
        })
        .collect()
}

pub struct LineChartView<'a> {
    pub days: u32,
    pub series: &'a [LongFormRow],
    pub table: &'a CloseMatrix,
    pub selected: &'a [String],
    pub price_range: PriceRange,
}

impl LineChartView<'_> {
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let table_height = (self.table.rows().len() as u16 + 3).min(area.height / 2);
        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(10), Constraint::Length(table_height)])
            .split(area);

        self.render_chart(frame, vertical[0]);
        self.render_table(frame, vertical[1]);
    }

    fn render_chart(&self, frame: &mut Frame, area: Rect) {
        let points = series_points(self.series, self.selected);

        let datasets: Vec<Dataset> = points
            .iter()
            .enumerate()
            .map(|(idx, (name, data))| {
                Dataset::default()
                    .name(name.as_str())
                    .marker(symbols::Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(PALETTE[idx % PALETTE.len()]))
                    .data(data)
            })
            .collect();

        let first = self.series.iter().map(|r| r.date).min();
        let last = self.series.iter().map(|r| r.date).max();
        let x_bounds = match (first, last) {
            (Some(a), Some(b)) if a < b => [x_of(a), x_of(b)],
            (Some(a), _) => [x_of(a) - 1.0, x_of(a) + 1.0],
            _ => [0.0, 1.0],
        };
        let x_labels: Vec<Span> = match (first, last) {
            (Some(a), Some(b)) => vec![
                Span::raw(a.format("%d %b %Y").to_string()),
                Span::raw(b.format("%d %b %Y").to_string()),
            ],
            _ => Vec::new(),
        };

        let [min, max] = self.price_range.bounds();
        let y_bounds = if max > min { [min, max] } else { [min - 1.0, max + 1.0] };
        let y_labels = vec![
            Span::styled(format!("{min:.2}"), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!("{:.2}", (min + max) / 2.0)),
            Span::styled(format!("{max:.2}"), Style::default().add_modifier(Modifier::BOLD)),
        ];

        let chart = Chart::new(datasets)
            .block(
                Block::default()
                    .title(format!("Closing prices (USD), last {} days", self.days))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .x_axis(
                Axis::default()
                    .title("Date")
                    .style(Style::default().fg(Color::Gray))
                    .labels(x_labels)
                    .labels_alignment(Alignment::Left)
                    .bounds(x_bounds),
            )
            .y_axis(
                Axis::default()
                    .title("USD")
                    .style(Style::default().fg(Color::Gray))
                    .labels(y_labels)
                    .bounds(y_bounds),
            );
        frame.render_widget(chart, area);
    }

    fn render_table(&self, frame: &mut Frame, area: Rect) {
        let dates = self.table.dates();
        let shown = visible_dates(dates.len(), area.width);
        let start = dates.len() - shown;

        let header = Row::new(
            std::iter::once(Cell::from("Name")).chain(
                dates[start..]
                    .iter()
                    .map(|d| Cell::from(d.format("%m-%d").to_string())),
            ),
        )
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));

        let rows: Vec<Row> = self
            .table
            .rows()
            .iter()
            .map(|row| {
                Row::new(
                    std::iter::once(Cell::from(row.name.clone())).chain(
                        row.values[start..].iter().map(|v| match v {
                            Some(price) => Cell::from(format!("{price:.2}")),
                            None => Cell::from("-"),
                        }),
                    ),
                )
            })
            .collect();

        let widths = std::iter::once(Constraint::Length(NAME_WIDTH))
            .chain(std::iter::repeat(Constraint::Length(PRICE_WIDTH)).take(shown));

        let table = Table::new(rows, widths).header(header).block(
            Block::default()
                .title(table_title(shown, dates.len()))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue)),
        );
        frame.render_widget(table, area);
    }
}
