//! Newline-delimited JSON events for scripted front ends and `--simulate`.
//!
//! Every line is one object with an `"event"` tag. Tick events are only
//! written when something happened (an action, submit progress, or a zone
//! change) so a steady tone does not flood the stream.

use crate::clock::Millis;
use crate::date::{CalendarDate, DateSelection};
use crate::runtime::DateRenderer;
use crate::session::{SessionState, TickReport};
use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent<'a> {
    Started {
        at: Millis,
        source: &'a str,
        selection: DateSelection,
    },
    Tick(&'a TickReport),
    /// Repaint-driven progress refresh.
    Progress { at: Millis, progress: f32 },
    Submitted { date: CalendarDate },
    Cancelled,
    Error { message: String },
}

pub struct JsonEventRenderer<W: Write> {
    out: W,
    source: String,
    last_progress: Option<f32>,
}

impl<W: Write> JsonEventRenderer<W> {
    /// `source` names the audio input (device name, or `simulate`).
    pub fn new(out: W, source: impl Into<String>) -> Self {
        Self {
            out,
            source: source.into(),
            last_progress: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn emit(&mut self, event: &SessionEvent<'_>) -> Result<()> {
        serde_json::to_writer(&mut self.out, event).context("failed to encode event")?;
        writeln!(self.out).context("failed to write event")?;
        self.out.flush().context("failed to flush events")?;
        Ok(())
    }
}

impl<W: Write> DateRenderer for JsonEventRenderer<W> {
    fn started(&mut self, selection: &DateSelection, now: Millis) -> Result<()> {
        let source = self.source.clone();
        self.emit(&SessionEvent::Started {
            at: now,
            source: &source,
            selection: *selection,
        })
    }

    fn tick(&mut self, report: &TickReport) -> Result<()> {
        if report.action.is_none() && report.progress.is_none() && !report.zone_changed {
            return Ok(());
        }
        self.last_progress = report.progress;
        self.emit(&SessionEvent::Tick(report))
    }

    fn repaint(&mut self, progress: Option<f32>, now: Millis) -> Result<()> {
        if progress == self.last_progress {
            return Ok(());
        }
        self.last_progress = progress;
        match progress {
            Some(progress) => self.emit(&SessionEvent::Progress { at: now, progress }),
            None => Ok(()),
        }
    }

    fn finished(&mut self, state: SessionState) -> Result<()> {
        match state {
            SessionState::Submitted { date } => self.emit(&SessionEvent::Submitted { date }),
            SessionState::Cancelled => self.emit(&SessionEvent::Cancelled),
            SessionState::Listening => Ok(()),
        }
    }

    fn failed(&mut self, err: &anyhow::Error) -> Result<()> {
        self.emit(&SessionEvent::Error {
            message: format!("{err:#}"),
        })
    }
}
