//! Terminal presentation shared by both test calls.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::fmt::Write as _;

use crate::telephony::{Call, Recording};

pub const CLOSING_BANNER: &str = "===== Test ended =====";

fn seconds(value: Option<u32>) -> String {
    value.map_or_else(|| "-".to_string(), |secs| format!("{}s", secs))
}

pub fn status_line(call: &Call) -> String {
    format!("status: {}, duration: {}", call.status, seconds(call.duration))
}

/// Summary of the final call snapshot. Timestamps are only shown when asked.
pub fn format_call_summary(call: &Call, with_times: bool) -> String {
    let mut out = String::from("Call result:\n");
    let _ = writeln!(out, "  Status: {}", call.status);
    if with_times {
        let time = |value: Option<chrono::DateTime<chrono::Utc>>| {
            value.map_or_else(|| "-".to_string(), |dt| dt.to_rfc3339())
        };
        let _ = writeln!(out, "  Start time: {}", time(call.start_time));
        let _ = writeln!(out, "  End time: {}", time(call.end_time));
    }
    let _ = write!(out, "  Duration: {}", seconds(call.duration));
    out
}

pub fn format_recording(recording: &Recording, api_base_url: &str) -> String {
    format!(
        "Recording:\n  SID: {}\n  Duration: {}\n  URL: {}",
        recording.sid,
        seconds(recording.duration),
        recording.media_url(api_base_url)
    )
}

pub fn poll_line(attempt: u32, max_attempts: u32, call: &Call) -> String {
    format!("[{}/{}] {}", attempt, max_attempts, status_line(call))
}

/// Spinner on stdout that follows the call while polling. Hidden when stdout
/// is not a terminal.
pub fn create_status_spinner() -> ProgressBar {
    let pb = ProgressBar::with_draw_target(None, ProgressDrawTarget::stdout());
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed}] {msg}") {
        pb.set_style(style);
    }
    pb.set_message("waiting for first status...");
    pb
}

/// Prints one poll result above the spinner, or as a plain stdout line when
/// the spinner is hidden.
pub fn report_progress(pb: &ProgressBar, line: String) {
    if pb.is_hidden() {
        println!("{}", line);
    } else {
        pb.println(&line);
        pb.set_message(line);
    }
}
