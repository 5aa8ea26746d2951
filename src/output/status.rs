//! Status report rendering

use super::colored::{LineStyle, Painter};
use super::formatter::{Column, RowData, TableFormat};
use crate::models::{ProbeResult, StatusReport};
use std::time::Duration;

pub const MARK_TIME_LAG: &str = "(*)";
pub const MARK_UNKNOWN_ARCHIVE: &str = "(?)";
pub const MARK_SEQNO_LAG: &str = "(!)";

const HEADERS: [&str; 11] = [
    "LS",
    "IP",
    "PORT",
    "Status",
    "Connect",
    "Request",
    "Ping",
    "Version",
    "Time",
    "Last block seqno",
    "Archive depth",
];

/// Per-row marks derived from the whole report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowMarks {
    pub time_lag: bool,
    pub seqno_lag: bool,
    pub archive_unknown: bool,
}

impl RowMarks {
    fn style(&self, reachable: bool) -> LineStyle {
        if !reachable || self.seqno_lag {
            LineStyle::Error
        } else if self.time_lag || self.archive_unknown {
            LineStyle::Warning
        } else {
            LineStyle::Normal
        }
    }
}

/// Maxima across all reachable servers that lag is measured against
#[derive(Debug, Clone, Copy, Default)]
struct Maxima {
    time: Option<u32>,
    seqno: Option<u32>,
}

impl Maxima {
    fn of(report: &StatusReport) -> Self {
        Self {
            time: report.iter().filter_map(|r| r.details.time).filter(|t| *t > 0).max(),
            seqno: report.iter().filter_map(|r| r.details.last_seqno).max(),
        }
    }

    fn marks(&self, result: &ProbeResult) -> RowMarks {
        let details = &result.details;
        RowMarks {
            time_lag: matches!((details.time, self.time), (Some(t), Some(max)) if t < max),
            seqno_lag: matches!((details.last_seqno, self.seqno), (Some(s), Some(max)) if s < max),
            archive_unknown: details.archive_depth.as_ref().is_some_and(|d| d.is_unknown()),
        }
    }
}

/// Renders a [`StatusReport`] as a table followed by a legend of the marks used
#[derive(Debug, Clone)]
pub struct StatusReporter {
    painter: Painter,
}

impl StatusReporter {
    pub fn new(enable_color: bool) -> Self {
        Self { painter: Painter::new(enable_color) }
    }

    /// Marks for every row, in report order
    pub fn marks(&self, report: &StatusReport) -> Vec<RowMarks> {
        let maxima = Maxima::of(report);
        report.iter().map(|r| maxima.marks(r)).collect()
    }

    /// One table row per result, in report order. Does no I/O.
    pub fn render(&self, report: &StatusReport) -> String {
        let marks = self.marks(report);
        let rows: Vec<RowData> = report
            .iter()
            .zip(&marks)
            .enumerate()
            .map(|(index, (result, marks))| Self::row(index, result, marks))
            .collect();

        let format = TableFormat::new(
            HEADERS
                .iter()
                .map(|h| if *h == "PORT" { Column::right(h) } else { Column::left(h) })
                .collect(),
        );
        let (header, lines) = format.layout(&rows);

        let mut output = String::new();
        output.push_str(&self.painter.paint(&header, LineStyle::Header));
        output.push('\n');
        for ((line, marks), result) in lines.iter().zip(&marks).zip(report.iter()) {
            output.push_str(&self.painter.paint(line, marks.style(result.reachable)));
            output.push('\n');
        }

        let legend = self.render_legend(&marks);
        if !legend.is_empty() {
            output.push('\n');
            output.push_str(&legend);
        }

        output
    }

    fn row(index: usize, result: &ProbeResult, marks: &RowMarks) -> RowData {
        let details = &result.details;

        let status = match result.error {
            None if result.reachable => "reachable".to_string(),
            Some(kind) => format!("unreachable ({})", kind),
            None => "unreachable".to_string(),
        };

        let time = details.time.map(|t| annotate(t.to_string(), marks.time_lag, MARK_TIME_LAG));
        let seqno = details
            .last_seqno
            .map(|s| annotate(s.to_string(), marks.seqno_lag, MARK_SEQNO_LAG));

        vec![
            index.to_string(),
            result.endpoint.host.clone(),
            result.endpoint.port.to_string(),
            status,
            format_millis(result.latency),
            format_millis(details.request),
            format_millis(details.ping),
            details.version.map(|v| v.to_string()).unwrap_or_else(dash),
            time.unwrap_or_else(dash),
            seqno.unwrap_or_else(dash),
            details
                .archive_depth
                .as_ref()
                .map(|d| d.to_string())
                .unwrap_or_else(dash),
        ]
    }

    /// Legend rows for the marks that occur, empty when none do
    pub fn render_legend(&self, marks: &[RowMarks]) -> String {
        let mut entries = Vec::new();
        if marks.iter().any(|m| m.time_lag) {
            entries.push((MARK_TIME_LAG, "LS time is behind maximum time across LS", LineStyle::Warning));
        }
        if marks.iter().any(|m| m.archive_unknown) {
            entries.push((MARK_UNKNOWN_ARCHIVE, "Failed to determine archive depth for this LS", LineStyle::Warning));
        }
        if marks.iter().any(|m| m.seqno_lag) {
            entries.push((MARK_SEQNO_LAG, "Masterchain seqno is behind maximum across LS", LineStyle::Error));
        }

        if entries.is_empty() {
            return String::new();
        }

        let rows: Vec<RowData> = entries
            .iter()
            .map(|(mark, description, _)| vec![mark.to_string(), description.to_string()])
            .collect();
        let format = TableFormat::new(vec![Column::left("Mark"), Column::left("Description")]);
        let (header, lines) = format.layout(&rows);

        let mut output = self.painter.paint(&header, LineStyle::Header);
        output.push('\n');
        for (line, (_, _, style)) in lines.iter().zip(&entries) {
            output.push_str(&self.painter.paint(line, *style));
            output.push('\n');
        }
        output
    }

    pub fn running_banner(&self) -> String {
        self.painter
            .paint("Command status running, this may take some time...", LineStyle::Warning)
    }

    pub fn interrupted_banner(&self) -> String {
        self.painter.paint("Interrupted by user", LineStyle::Error)
    }

    pub fn completed_banner(&self, elapsed: Duration) -> String {
        self.painter.paint(
            &format!("Command status completed in {}", format_elapsed(elapsed)),
            LineStyle::Success,
        )
    }

    /// `N of M lite-servers reachable`
    pub fn reachability_summary(&self, report: &StatusReport) -> String {
        let line = format!("{} of {} lite-servers reachable", report.reachable_count(), report.len());
        if report.unreachable_count() == 0 {
            self.painter.paint(&line, LineStyle::Success)
        } else {
            self.painter.muted(&line)
        }
    }
}

fn dash() -> String {
    "-".to_string()
}

fn annotate(value: String, marked: bool, mark: &str) -> String {
    if marked {
        format!("{} {}", value, mark)
    } else {
        value
    }
}

fn format_millis(duration: Option<Duration>) -> String {
    match duration {
        Some(d) => format!("{} ms", d.as_millis()),
        None => dash(),
    }
}

/// `Nms` below one second, otherwise `Hh Mm Ss` without leading zero units
pub fn format_elapsed(elapsed: Duration) -> String {
    if elapsed < Duration::from_secs(1) {
        return format!("{}ms", elapsed.as_millis());
    }

    let total = elapsed.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
