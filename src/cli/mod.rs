use tracing_subscriber::EnvFilter;

pub mod args;
pub mod att_dtmf;
pub mod playback;
pub mod report;

pub use args::{AttDtmfCli, PlaybackCli};
pub use att_dtmf::{handle_att_dtmf_command, run_att_dtmf_test};
pub use playback::{handle_playback_command, run_playback_test};

/// Logs go to stderr so stdout carries only the call report.
pub fn init_tracing(verbose: bool) {
    let log_level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}
