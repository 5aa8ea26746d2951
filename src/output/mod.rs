//! Output formatting and display
//!
//! Table layout is plain text; colors are applied per line afterwards so
//! column widths never count escape codes.

mod colored;
mod formatter;
mod status;

pub use colored::{ColorScheme, LineStyle, Painter};
pub use formatter::{Alignment, Column, RowData, TableFormat};
pub use status::{format_elapsed, RowMarks, StatusReporter};
pub use status::{MARK_SEQNO_LAG, MARK_TIME_LAG, MARK_UNKNOWN_ARCHIVE};
