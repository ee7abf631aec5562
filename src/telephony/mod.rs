use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt;
use thiserror::Error;

pub mod twilio;

pub use twilio::TwilioClient;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request to telephony provider failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("telephony provider returned HTTP {status}: {message}")]
    Api {
        status: u16,
        code: Option<i64>,
        message: String,
    },
    #[error("failed to decode telephony provider response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Lifecycle state of a call as reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CallStatus {
    Queued,
    Ringing,
    InProgress,
    Completed,
    Failed,
    Busy,
    NoAnswer,
    Canceled,
    #[serde(other)]
    Unknown,
}

impl CallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Ringing => "ringing",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Busy => "busy",
            Self::NoAnswer => "no-answer",
            Self::Canceled => "canceled",
            Self::Unknown => "unknown",
        }
    }

    /// Statuses that end polling. `canceled` is deliberately absent: a
    /// canceled call keeps being polled until the attempt cap.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Failed | Self::Busy | Self::NoAnswer
        )
    }
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider-side call resource. Only the SID is ours; everything else is a
/// snapshot from the last fetch.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Call {
    pub sid: String,
    pub status: CallStatus,
    #[serde(default, deserialize_with = "de::optional_seconds")]
    pub duration: Option<u32>,
    #[serde(default, deserialize_with = "de::optional_rfc2822")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de::optional_rfc2822")]
    pub end_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Recording {
    pub sid: String,
    #[serde(default, deserialize_with = "de::optional_seconds")]
    pub duration: Option<u32>,
    /// API-relative resource path, e.g. `/2010-04-01/Accounts/AC../Recordings/RE...json`.
    pub uri: String,
}

impl Recording {
    /// Downloadable media URL: the API host plus the resource URI without
    /// its `.json` suffix.
    pub fn media_url(&self, api_base_url: &str) -> String {
        format!(
            "{}{}",
            api_base_url.trim_end_matches('/'),
            self.uri.replace(".json", "")
        )
    }
}

/// Parameters for placing an outbound call with inline TwiML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    pub to: String,
    /// Omitted from the request when unset; the provider then rejects it.
    pub from: Option<String>,
    pub twiml: String,
    /// Seconds to let the call ring before giving up.
    pub timeout_secs: u32,
}

/// The three provider operations the test calls rely on.
#[async_trait]
pub trait TelephonyProvider: Send + Sync {
    async fn create_call(&self, request: &CallRequest) -> Result<Call, ProviderError>;

    async fn fetch_call(&self, call_sid: &str) -> Result<Call, ProviderError>;

    async fn list_recordings(&self, call_sid: &str) -> Result<Vec<Recording>, ProviderError>;
}

mod de {
    use chrono::{DateTime, Utc};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Seconds {
        Number(i64),
        Text(String),
    }

    /// Twilio reports durations as strings (`"42"`), uses `null` until the
    /// call ends and `"-1"` while a recording is still processing. Both of
    /// the latter map to `None`.
    pub fn optional_seconds<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = match Option::<Seconds>::deserialize(deserializer)? {
            None => return Ok(None),
            Some(Seconds::Number(value)) => value,
            Some(Seconds::Text(text)) if text.trim().is_empty() => return Ok(None),
            Some(Seconds::Text(text)) => text.trim().parse::<i64>().map_err(D::Error::custom)?,
        };

        if value < 0 {
            return Ok(None);
        }
        u32::try_from(value).map(Some).map_err(D::Error::custom)
    }

    pub fn optional_rfc2822<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(text) if text.trim().is_empty() => Ok(None),
            Some(text) => DateTime::parse_from_rfc2822(text.trim())
                .map(|dt| Some(dt.with_timezone(&Utc)))
                .map_err(D::Error::custom),
        }
    }
}
