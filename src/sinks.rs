//! Terminal implementations of the UI and notification sinks.

use std::fmt::Display;
use std::io::{Stdout, Write};

use crossterm::style::{Color, Stylize};
use tracing::{debug, info, warn};

use usagebar_core::indicator::IndicatorColor;
use usagebar_core::sinks::{NotificationSink, UiSink, UiUpdate};
use usagebar_core::{Notification, Urgency};

/// Prints one status line per update (stdout unless given another writer)
pub struct TerminalUi<W = Stdout> {
    out: W,
    last_line: Option<String>,
}

impl TerminalUi {
    pub fn new() -> Self {
        Self::with_writer(std::io::stdout())
    }
}

impl Default for TerminalUi {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> TerminalUi<W> {
    pub fn with_writer(out: W) -> Self {
        Self {
            out,
            last_line: None,
        }
    }
}

impl<W: Write + Send + 'static> UiSink for TerminalUi<W> {
    fn update(&mut self, update: &UiUpdate) {
        let line = status_line(update);
        // Identical consecutive lines add nothing
        if self.last_line.as_deref() == Some(line.as_str()) {
            return;
        }

        let (r, g, b) = update.intent.color.rgb();
        let badge = format!("({}) {:>4}", update.intent.glyph, update.label)
            .with(Color::Rgb { r, g, b })
            .bold();
        if let Err(e) = write_block(&mut self.out, format_args!("{}  {}", badge, line)) {
            debug!(error = %e, "Failed to write status line");
        }

        self.last_line = Some(line);
    }
}

/// Plain (uncolored) part of the status line
fn status_line(update: &UiUpdate) -> String {
    let updated = update
        .last_updated
        .map(|at| {
            at.with_timezone(&chrono::Local)
                .format("%H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| "never".to_string());
    format!("{}  |  {}  [{}]", update.menu_5h, update.menu_7d, updated)
}

/// Shows notifications as highlighted terminal banners and log records
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn notify(&mut self, notification: &Notification) {
        match notification.urgency {
            Urgency::Critical => warn!(
                title = %notification.title,
                icon = notification.icon_hint,
                "{}",
                notification.body.replace('\n', " - ")
            ),
            Urgency::Normal | Urgency::Low => info!(
                title = %notification.title,
                icon = notification.icon_hint,
                "{}",
                notification.body.replace('\n', " - ")
            ),
        }

        let color = match notification.urgency {
            Urgency::Critical => IndicatorColor::Red,
            Urgency::Normal => IndicatorColor::Yellow,
            Urgency::Low => IndicatorColor::Gray,
        };
        let (r, g, b) = color.rgb();
        let title = notification.title.as_str().with(Color::Rgb { r, g, b }).bold();
        let banner = format!("\n{}\n{}\n", title, notification.body);
        if let Err(e) = write_block(&mut std::io::stdout().lock(), banner) {
            debug!(error = %e, "Failed to write notification banner");
        }
    }
}

/// Write one line and flush
fn write_block<W: Write>(out: &mut W, text: impl Display) -> std::io::Result<()> {
    writeln!(out, "{}", text)?;
    out.flush()
}
