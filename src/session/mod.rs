//! Lifecycle of a single test call: submit, poll until it ends, report.

use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::telephony::{Call, CallRequest, ProviderError, Recording, TelephonyProvider};

pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to create call")]
    Submission(#[source] ProviderError),
    #[error("failed to poll status of call {call_sid}")]
    Polling {
        call_sid: String,
        #[source]
        source: ProviderError,
    },
    #[error("failed to fetch results of call {call_sid}")]
    Reporting {
        call_sid: String,
        #[source]
        source: ProviderError,
    },
}

/// How often and how long to wait for a call to finish.
///
/// The attempt cap is a hard stop: once reached the loop exits whatever the
/// last status was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl PollPolicy {
    /// Collect-call test: 36 checks, about three minutes.
    pub const COLLECT_CALL: Self = Self {
        interval: POLL_INTERVAL,
        max_attempts: 36,
    };

    /// Playback test: 12 checks, about one minute.
    pub const PLAYBACK: Self = Self {
        interval: POLL_INTERVAL,
        max_attempts: 12,
    };

    pub fn budget(&self) -> Duration {
        self.interval * self.max_attempts
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PollOutcome {
    /// Last snapshot fetched, `None` only when the cap is zero.
    pub last: Option<Call>,
    pub attempts: u32,
    pub reached_terminal: bool,
}

/// Final state of the call plus whatever it recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct CallReport {
    pub call: Call,
    pub recordings: Vec<Recording>,
}

pub async fn submit_call<P>(provider: &P, request: &CallRequest) -> Result<Call, SessionError>
where
    P: TelephonyProvider + ?Sized,
{
    provider
        .create_call(request)
        .await
        .map_err(SessionError::Submission)
}

/// Sleeps, fetches, repeats. Stops on the first terminal status or after
/// `policy.max_attempts` fetches. `on_update` sees every snapshot.
pub async fn poll_until_terminal<P, F>(
    provider: &P,
    call_sid: &str,
    policy: PollPolicy,
    mut on_update: F,
) -> Result<PollOutcome, SessionError>
where
    P: TelephonyProvider + ?Sized,
    F: FnMut(u32, &Call),
{
    let mut last = None;

    for attempt in 1..=policy.max_attempts {
        sleep(policy.interval).await;

        let call = provider
            .fetch_call(call_sid)
            .await
            .map_err(|source| SessionError::Polling {
                call_sid: call_sid.to_string(),
                source,
            })?;

        debug!(
            "Poll {}/{} for {}: status={}, duration={:?}",
            attempt, policy.max_attempts, call_sid, call.status, call.duration
        );
        on_update(attempt, &call);

        if call.status.is_terminal() {
            info!("Call {} reached {} after {} poll(s)", call_sid, call.status, attempt);
            return Ok(PollOutcome {
                last: Some(call),
                attempts: attempt,
                reached_terminal: true,
            });
        }
        last = Some(call);
    }

    warn!(
        "Call {} still not finished after {:?}; giving up",
        call_sid,
        policy.budget()
    );
    Ok(PollOutcome {
        last,
        attempts: policy.max_attempts,
        reached_terminal: false,
    })
}

/// One last fetch of the call, plus its recordings when asked.
pub async fn fetch_report<P>(
    provider: &P,
    call_sid: &str,
    include_recordings: bool,
) -> Result<CallReport, SessionError>
where
    P: TelephonyProvider + ?Sized,
{
    let reporting = |source| SessionError::Reporting {
        call_sid: call_sid.to_string(),
        source,
    };

    let call = provider.fetch_call(call_sid).await.map_err(reporting)?;
    let recordings = if include_recordings {
        provider.list_recordings(call_sid).await.map_err(reporting)?
    } else {
        Vec::new()
    };

    Ok(CallReport { call, recordings })
}
