use crate::config::{save_config, AppConfig};
use crate::data::{DataFetcher, InstrumentSet};
use crate::error::DashboardError;
use crate::pipeline::{self, RenderResult};
use crate::ui::{KeyOutcome, LayoutManager, Status};
use color_eyre::Result;
use crossterm::event::{self, Event, KeyEvent};
use ratatui::{backend::Backend, Terminal};
use std::path::PathBuf;

/// Terminal host. Re-runs the whole pipeline after every parameter change;
/// the fetcher's cache keeps repeated inputs off the network.
pub struct App {
    config: AppConfig,
    config_path: PathBuf,
    instruments: InstrumentSet,
    fetcher: DataFetcher,
    layout: LayoutManager,
    view: Option<Result<RenderResult, DashboardError>>,
}

impl App {
    pub fn new(config: AppConfig, config_path: PathBuf, fetcher: DataFetcher) -> Result<Self> {
        let instruments = InstrumentSet::new(config.instruments.clone())?;
        Ok(Self {
            layout: LayoutManager::new(&config),
            config,
            config_path,
            instruments,
            fetcher,
            view: None,
        })
    }

    pub async fn run(mut self) -> Result<()> {
        let mut terminal = ratatui::init();
        let result = self.event_loop(&mut terminal).await;
        ratatui::restore();

        self.layout.sidebar.store(&mut self.config);
        if let Err(err) = save_config(&self.config_path, &self.config) {
            tracing::warn!(path = %self.config_path.display(), error = %err, "could not save settings");
        }
        result
    }

    async fn event_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        self.refresh(terminal).await?;
        loop {
            match event::read()? {
                Event::Key(key) => {
                    if !self.on_key(terminal, key).await? {
                        return Ok(());
                    }
                }
                Event::Resize(..) => self.draw(terminal)?,
                _ => {}
            }
        }
    }

    /// Returns `false` once the user asks to quit.
    async fn on_key<B: Backend>(&mut self, terminal: &mut Terminal<B>, key: KeyEvent) -> Result<bool> {
        match self.layout.sidebar.handle_key(key) {
            KeyOutcome::Quit => return Ok(false),
            KeyOutcome::Changed => self.refresh(terminal).await?,
            KeyOutcome::Moved => self.draw(terminal)?,
            KeyOutcome::Ignored => {}
        }
        Ok(true)
    }

    async fn refresh<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        self.layout.statusbar.status = Status::Loading;
        self.draw(terminal)?;

        let params = self.layout.sidebar.params();
        let outcome = pipeline::render(&self.fetcher, &self.instruments, &params).await;

        self.layout.statusbar.status = match &outcome {
            Ok(result) => Status::Ready(summary(result)),
            Err(err) => {
                tracing::warn!(error = %err, "render pass abandoned");
                Status::Failed(err.to_string())
            }
        };
        self.view = Some(outcome);
        self.draw(terminal)
    }

    fn draw<B: Backend>(&self, terminal: &mut Terminal<B>) -> Result<()> {
        terminal.draw(|frame| self.layout.render(frame, self.view.as_ref(), frame.area()))?;
        Ok(())
    }
}

fn summary(result: &RenderResult) -> String {
    match result {
        RenderResult::Lines { selected, table, .. } => format!(
            "{} companies, {} trading days",
            selected.len(),
            table.dates().len()
        ),
        RenderResult::Candles { symbol, candles, .. } => {
            format!("{symbol}: {} candles", candles.len())
        }
    }
}
