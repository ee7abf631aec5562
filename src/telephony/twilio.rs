use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, error, info};

use super::{Call, CallRequest, ProviderError, Recording, TelephonyProvider};
use crate::config::TelephonyConfig;

const API_VERSION: &str = "2010-04-01";

/// Error body Twilio returns alongside non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    code: Option<i64>,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RecordingPage {
    recordings: Vec<Recording>,
    /// API-relative path of the next page, `null` on the last one.
    #[serde(default)]
    next_page_uri: Option<String>,
}

/// Twilio REST client covering call creation, call lookup and recording
/// listing.
pub struct TwilioClient {
    client: reqwest::Client,
    account_sid: String,
    auth_token: String,
    base_url: String,
}

impl TwilioClient {
    pub fn new(config: &TelephonyConfig) -> Self {
        info!(
            "Initialized Twilio client for account {} at {}",
            config.account_sid, config.api_base_url
        );

        Self {
            client: reqwest::Client::new(),
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn account_url(&self, resource: &str) -> String {
        format!(
            "{}/{}/Accounts/{}/{}",
            self.base_url, API_VERSION, self.account_sid, resource
        )
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ProviderError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!("Twilio request failed with status {}: {}", status, body);
            return Err(api_error(status.as_u16(), &body));
        }

        Ok(serde_json::from_str(&body)?)
    }
}

fn api_error(status: u16, body: &str) -> ProviderError {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(parsed) => ProviderError::Api {
            status,
            code: parsed.code,
            message: parsed.message,
        },
        Err(_) => ProviderError::Api {
            status,
            code: None,
            message: body.trim().to_string(),
        },
    }
}

#[async_trait]
impl TelephonyProvider for TwilioClient {
    async fn create_call(&self, request: &CallRequest) -> Result<Call, ProviderError> {
        debug!("Creating call to {} from {:?}", request.to, request.from);
        let timeout = request.timeout_secs.to_string();

        let mut form = vec![("To", request.to.as_str())];
        if let Some(from) = request.from.as_deref() {
            form.push(("From", from));
        }
        form.push(("Twiml", request.twiml.as_str()));
        form.push(("Timeout", timeout.as_str()));

        let response = self
            .client
            .post(self.account_url("Calls.json"))
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&form)
            .send()
            .await?;

        let call: Call = Self::read_json(response).await?;
        info!("Created call {} ({})", call.sid, call.status);
        Ok(call)
    }

    async fn fetch_call(&self, call_sid: &str) -> Result<Call, ProviderError> {
        let response = self
            .client
            .get(self.account_url(&format!("Calls/{}.json", call_sid)))
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .send()
            .await?;

        Self::read_json(response).await
    }

    /// Follows `next_page_uri` until the last page.
    async fn list_recordings(&self, call_sid: &str) -> Result<Vec<Recording>, ProviderError> {
        let response = self
            .client
            .get(self.account_url("Recordings.json"))
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .query(&[("CallSid", call_sid)])
            .send()
            .await?;
        let mut page: RecordingPage = Self::read_json(response).await?;
        let mut recordings = std::mem::take(&mut page.recordings);

        while let Some(next) = page.next_page_uri.take() {
            debug!("Fetching next recordings page for {}: {}", call_sid, next);
            let response = self
                .client
                .get(format!("{}{}", self.base_url, next))
                .basic_auth(&self.account_sid, Some(&self.auth_token))
                .send()
                .await?;
            page = Self::read_json(response).await?;
            recordings.append(&mut page.recordings);
        }

        debug!("Call {} has {} recording(s)", call_sid, recordings.len());
        Ok(recordings)
    }
}
