//! Plays the tone audio into a live call to check it survives the line.

use anyhow::{Context, Result};
use tracing::error;

use crate::cli::args::PlaybackCli;
use crate::cli::report::{
    create_status_spinner, format_call_summary, poll_line, report_progress, status_line,
    CLOSING_BANNER,
};
use crate::config::TelephonyConfig;
use crate::session::{fetch_report, poll_until_terminal, submit_call, CallReport, PollPolicy, SessionError};
use crate::telephony::{CallRequest, TelephonyProvider, TwilioClient};
use crate::twiml::{playback_document, Prompts, DEFAULT_TONE_URL};

pub const CALL_TIMEOUT_SECS: u32 = 60;

pub async fn handle_playback_command(args: PlaybackCli) -> Result<()> {
    let Some(phone) = args.phone.as_deref() else {
        print_usage();
        anyhow::bail!("no phone number given");
    };

    let config = TelephonyConfig::load().context("Cannot start the playback test")?;
    let client = TwilioClient::new(&config);
    println!("Twilio client initialized");

    let audio_url = args.audio_url.as_deref().unwrap_or(DEFAULT_TONE_URL);

    println!("\n===== DTMF audio playback test =====");
    println!("Target number: {}", phone);
    println!("DTMF audio URL: {}", audio_url);

    if let Err(err) = run_playback_test(&client, &config, phone, audio_url).await {
        error!("Playback test failed: {}", err);
        println!("\nError: {:#}", anyhow::Error::new(err));
    }

    println!("\n{}", CLOSING_BANNER);
    Ok(())
}

pub async fn run_playback_test<P>(
    provider: &P,
    config: &TelephonyConfig,
    phone: &str,
    audio_url: &str,
) -> Result<CallReport, SessionError>
where
    P: TelephonyProvider + ?Sized,
{
    let request = CallRequest {
        to: phone.to_string(),
        from: config.from_number.clone(),
        twiml: playback_document(audio_url, &Prompts::default()),
        timeout_secs: CALL_TIMEOUT_SECS,
    };

    let call = submit_call(provider, &request).await?;
    println!("Call started: SID={}", call.sid);

    println!("Monitoring call progress...");
    let pb = create_status_spinner();
    let outcome = poll_until_terminal(provider, &call.sid, PollPolicy::PLAYBACK, |attempt, snapshot| {
        report_progress(&pb, poll_line(attempt, PollPolicy::PLAYBACK.max_attempts, snapshot));
    })
    .await;
    pb.finish_and_clear();
    if let Some(last) = outcome?.last {
        println!("Last status: {}", status_line(&last));
    }

    let report = fetch_report(provider, &call.sid, false).await?;
    println!("\n{}", format_call_summary(&report.call, false));

    Ok(report)
}

fn print_usage() {
    println!("Usage: dtmf-playback-test PHONE [DTMF_AUDIO_URL]");
    println!("Example: dtmf-playback-test +821033650654");
    println!("         dtmf-playback-test +821033650654 http://example.com/dtmf4.wav");
}
