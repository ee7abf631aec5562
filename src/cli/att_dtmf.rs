//! Collect-call IVR test through AT&T USADirect.
//!
//! The call is placed to the tester's own verified number; the collect-call
//! service is dialed from inside the TwiML and the normalized destination is
//! only ever keyed in as DTMF.

use anyhow::{Context, Result};
use tracing::{error, info};

use crate::cli::args::AttDtmfCli;
use crate::cli::report::{
    create_status_spinner, format_call_summary, format_recording, poll_line, report_progress,
    status_line, CLOSING_BANNER,
};
use crate::config::TelephonyConfig;
use crate::phone::Destination;
use crate::session::{fetch_report, poll_until_terminal, submit_call, CallReport, PollPolicy, SessionError};
use crate::telephony::{CallRequest, TelephonyProvider, TwilioClient};
use crate::twiml::{collect_call_document, ATT_COLLECT_ACCESS_NUMBER, DEFAULT_TONE_URL};

/// Destination used when none is given on the command line.
pub const DEFAULT_DESTINATION: &str = "01033650654";
/// Verified number the call actually rings.
pub const TEST_CALLER_NUMBER: &str = "+821033650654";
pub const CALL_TIMEOUT_SECS: u32 = 180;

const SERVICE_DISPLAY_NUMBER: &str = "1-800-822-8256";

pub async fn handle_att_dtmf_command(args: AttDtmfCli) -> Result<()> {
    if args.phone.is_none() {
        print_usage();
    }

    let config = TelephonyConfig::load().context("Cannot start the collect-call test")?;
    let client = TwilioClient::new(&config);
    println!("Twilio client initialized");

    let destination = Destination::parse(args.phone.as_deref().unwrap_or(DEFAULT_DESTINATION));
    let audio_url = args.audio_url.as_deref().unwrap_or(DEFAULT_TONE_URL);

    println!(
        "\n===== AT&T collect-call DTMF audio test: {} =====",
        destination.display
    );

    if let Err(err) = run_att_dtmf_test(&client, &config, &destination, audio_url).await {
        error!("Collect-call test failed: {}", err);
        println!("\nError: {:?}", anyhow::Error::new(err));
    }

    println!("\n{}", CLOSING_BANNER);
    Ok(())
}

/// Places the collect-call test, waits for it to end and prints the result
/// with links to every recording.
pub async fn run_att_dtmf_test<P>(
    provider: &P,
    config: &TelephonyConfig,
    destination: &Destination,
    audio_url: &str,
) -> Result<CallReport, SessionError>
where
    P: TelephonyProvider + ?Sized,
{
    println!(
        "Connecting to the AT&T collect-call service ({}).",
        SERVICE_DISPLAY_NUMBER
    );
    println!(
        "Playing DTMF 4 audio ({}) to select the collect-call menu.",
        audio_url
    );
    println!("Then keying in {}.", destination.display);

    let request = CallRequest {
        to: TEST_CALLER_NUMBER.to_string(),
        from: config.from_number.clone(),
        twiml: collect_call_document(ATT_COLLECT_ACCESS_NUMBER, audio_url, &destination.dial),
        timeout_secs: CALL_TIMEOUT_SECS,
    };
    info!(
        "Collect-call test for {} will enter {}",
        destination.display,
        destination.dtmf_digits()
    );

    let call = submit_call(provider, &request).await?;
    println!("Call started: SID={}", call.sid);
    println!("The whole call is being recorded.");

    println!("\nMonitoring call progress...");
    let pb = create_status_spinner();
    let outcome = poll_until_terminal(provider, &call.sid, PollPolicy::COLLECT_CALL, |attempt, snapshot| {
        report_progress(&pb, poll_line(attempt, PollPolicy::COLLECT_CALL.max_attempts, snapshot));
    })
    .await;
    pb.finish_and_clear();
    let outcome = outcome?;

    if let Some(last) = &outcome.last {
        println!("Last status: {}", status_line(last));
    }
    if !outcome.reached_terminal {
        println!(
            "Call did not finish within {}s; reporting current state.",
            PollPolicy::COLLECT_CALL.budget().as_secs()
        );
    }

    let report = fetch_report(provider, &call.sid, true).await?;
    println!("\n{}", format_call_summary(&report.call, true));
    for recording in &report.recordings {
        println!("\n{}", format_recording(recording, &config.api_base_url));
    }

    println!("\nTest complete.");
    println!("Listen to the recording to check whether the AT&T IVR recognized the DTMF audio.");

    Ok(report)
}

fn print_usage() {
    println!("Usage: att-dtmf-test [PHONE] [DTMF_AUDIO_URL]");
    println!("Example: att-dtmf-test 01033650654");
    println!("         att-dtmf-test 821033650654 http://example.com/dtmf4.wav");
    println!("The 82 country code and a leading + are optional.");
    println!("No number given, using {}.", DEFAULT_DESTINATION);
}
