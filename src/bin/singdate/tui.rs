//! Full-screen `ratatui` renderer for live sessions.

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Gauge, Paragraph},
    Frame, Terminal,
};
use singdate::clock::Millis;
use singdate::date::{DateField, DateSelection};
use singdate::dwell::Action;
use singdate::log_debug;
use singdate::pitch::{note_name, Zone};
use singdate::runtime::DateRenderer;
use singdate::terminal_restore::TerminalRestoreGuard;
use singdate::{SessionState, TickReport};
use std::io::{self, Stdout};
use std::time::Duration;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// What the screen shows; updated by ticks and repaints, drawn as a whole.
#[derive(Debug, Clone)]
struct ViewState {
    source: String,
    selection: DateSelection,
    smoothed_hz: Option<f32>,
    zone: Option<Zone>,
    progress: Option<f32>,
    last_action: Option<Action>,
}

pub struct TerminalRenderer {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    guard: TerminalRestoreGuard,
    view: ViewState,
}

impl TerminalRenderer {
    pub fn new(source: &str, selection: DateSelection) -> Result<Self> {
        let mut stdout = io::stdout();
        let guard = TerminalRestoreGuard::enter(&mut stdout)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self {
            terminal,
            guard,
            view: ViewState {
                source: source.to_string(),
                selection,
                smoothed_hz: None,
                zone: None,
                progress: None,
                last_action: None,
            },
        })
    }

    fn redraw(&mut self) -> Result<()> {
        let view = &self.view;
        self.terminal.draw(|frame| draw(frame, view))?;
        Ok(())
    }
}

impl DateRenderer for TerminalRenderer {
    fn started(&mut self, selection: &DateSelection, _now: Millis) -> Result<()> {
        self.view.selection = *selection;
        self.redraw()
    }

    fn tick(&mut self, report: &TickReport) -> Result<()> {
        self.view.selection = report.selection;
        self.view.smoothed_hz = report.zone.and(report.smoothed_hz);
        self.view.zone = report.zone;
        self.view.progress = report.progress;
        if report.action.is_some() {
            self.view.last_action = report.action;
        }
        self.redraw()
    }

    fn repaint(&mut self, progress: Option<f32>, _now: Millis) -> Result<()> {
        self.view.progress = progress;
        self.redraw()
    }

    fn finished(&mut self, _state: SessionState) -> Result<()> {
        self.guard.restore();
        Ok(())
    }

    fn failed(&mut self, _err: &anyhow::Error) -> Result<()> {
        self.guard.restore();
        Ok(())
    }

    fn cancel_requested(&mut self) -> Result<bool> {
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) if is_cancel_key(key) => {
                    log_debug(&format!("cancel key: {:?}", key.code));
                    return Ok(true);
                }
                Event::Resize(_, _) => self.redraw()?,
                _ => {}
            }
        }
        Ok(false)
    }
}

fn is_cancel_key(key: KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

fn draw(frame: &mut Frame<'_>, view: &ViewState) {
    let outer = Block::default()
        .title(format!(" SingDate · {} ", view.source))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded);
    let area = outer.inner(frame.size());
    frame.render_widget(outer, frame.size());

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    frame.render_widget(date_widget(&view.selection), rows[0]);
    frame.render_widget(Paragraph::new(pitch_line(view)), rows[2]);
    frame.render_widget(Paragraph::new(zone_line(view.zone)), rows[3]);
    render_progress(frame, rows[4], view.progress);
    if let Some(action) = view.last_action {
        frame.render_widget(
            Paragraph::new(format!("Last action: {}", action.label().replace('_', " ")))
                .style(Style::default().fg(Color::Gray)),
            rows[5],
        );
    }
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("Low", Style::default().fg(Color::Cyan)),
            Span::raw(" −  "),
            Span::styled("Mid", Style::default().fg(Color::Green)),
            Span::raw(" +  "),
            Span::styled("High", Style::default().fg(Color::Yellow)),
            Span::raw(" next field  "),
            Span::styled("Top", Style::default().fg(Color::Magenta)),
            Span::raw(" hold to submit   Esc/q quit"),
        ]))
        .style(Style::default().fg(Color::DarkGray)),
        rows[6],
    );
}

fn date_widget(selection: &DateSelection) -> Paragraph<'static> {
    let month = MONTHS
        .get(usize::from(selection.month.saturating_sub(1)))
        .copied()
        .unwrap_or("???");
    let field = |field: DateField, text: String| {
        let style = if selection.focused == field {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        Span::styled(format!(" {text} "), style)
    };
    Paragraph::new(Line::from(vec![
        field(DateField::Day, format!("{:02}", selection.day)),
        Span::raw(" "),
        field(DateField::Month, month.to_string()),
        Span::raw(" "),
        field(DateField::Year, format!("{:04}", selection.year)),
    ]))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::BOTTOM))
}

fn pitch_line(view: &ViewState) -> Line<'static> {
    match view.smoothed_hz {
        Some(hz) => {
            let note = note_name(hz).unwrap_or_default();
            Line::from(format!("Pitch {hz:6.1} Hz  {note}"))
        }
        None => Line::from(Span::styled(
            "Pitch   ---   (sing to begin)",
            Style::default().fg(Color::DarkGray),
        )),
    }
}

fn zone_line(active: Option<Zone>) -> Line<'static> {
    let mut spans = vec![Span::raw("Zone  ")];
    for zone in [Zone::Low, Zone::Mid, Zone::High, Zone::Submit] {
        let style = if active == Some(zone) {
            Style::default()
                .fg(Color::Black)
                .bg(zone_color(zone))
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(zone_color(zone))
        };
        spans.push(Span::styled(format!(" {:^8} ", zone.label()), style));
    }
    Line::from(spans)
}

fn zone_color(zone: Zone) -> Color {
    match zone {
        Zone::Low => Color::Cyan,
        Zone::Mid => Color::Green,
        Zone::High => Color::Yellow,
        Zone::Submit => Color::Magenta,
    }
}

fn render_progress(frame: &mut Frame<'_>, area: Rect, progress: Option<f32>) {
    let ratio = f64::from(progress.unwrap_or(0.0)).clamp(0.0, 1.0);
    let gauge = Gauge::default()
        .block(Block::default().title(" submit ").borders(Borders::ALL))
        .gauge_style(Style::default().fg(Color::Magenta))
        .ratio(ratio)
        .label(if progress.is_some() {
            format!("{:.0}%", ratio * 100.0)
        } else {
            "hold the top zone".to_string()
        });
    frame.render_widget(gauge, area);
}
