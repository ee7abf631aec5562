#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use tonecall::config::TelephonyConfig;
use tonecall::telephony::{Call, CallRequest, CallStatus, ProviderError, Recording, TelephonyProvider};

pub const CALL_SID: &str = "CA0123456789";

pub fn test_config() -> TelephonyConfig {
    TelephonyConfig {
        account_sid: "AC123".to_string(),
        auth_token: "token".to_string(),
        from_number: Some("+15005550006".to_string()),
        api_base_url: "https://api.twilio.com".to_string(),
    }
}

pub fn api_error(message: &str) -> ProviderError {
    ProviderError::Api {
        status: 500,
        code: None,
        message: message.to_string(),
    }
}

/// Provider double that replays a fixed list of statuses, one per fetch, and
/// repeats the last one once the list runs out.
pub struct ScriptedProvider {
    statuses: Mutex<VecDeque<CallStatus>>,
    last_status: Mutex<CallStatus>,
    pub fail_create: bool,
    pub fail_fetch_at: Option<u32>,
    pub fail_recordings: bool,
    pub recordings: Vec<Recording>,
    pub requests: Mutex<Vec<CallRequest>>,
    pub fetches: AtomicU32,
    pub recording_lookups: AtomicU32,
}

impl ScriptedProvider {
    pub fn new(statuses: &[CallStatus]) -> Self {
        Self {
            statuses: Mutex::new(statuses.iter().copied().collect()),
            last_status: Mutex::new(CallStatus::Queued),
            fail_create: false,
            fail_fetch_at: None,
            fail_recordings: false,
            recordings: Vec::new(),
            requests: Mutex::new(Vec::new()),
            fetches: AtomicU32::new(0),
            recording_lookups: AtomicU32::new(0),
        }
    }

    pub fn fetch_count(&self) -> u32 {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn recording_lookup_count(&self) -> u32 {
        self.recording_lookups.load(Ordering::SeqCst)
    }

    pub fn sent_requests(&self) -> Vec<CallRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn snapshot(status: CallStatus) -> Call {
        Call {
            sid: CALL_SID.to_string(),
            status,
            duration: status.is_terminal().then_some(42),
            start_time: None,
            end_time: None,
        }
    }
}

#[async_trait]
impl TelephonyProvider for ScriptedProvider {
    async fn create_call(&self, request: &CallRequest) -> Result<Call, ProviderError> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail_create {
            return Err(api_error("create rejected"));
        }
        Ok(Self::snapshot(CallStatus::Queued))
    }

    async fn fetch_call(&self, call_sid: &str) -> Result<Call, ProviderError> {
        assert_eq!(call_sid, CALL_SID);
        let count = self.fetches.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_fetch_at == Some(count) {
            return Err(api_error("fetch rejected"));
        }

        let mut last = self.last_status.lock().unwrap();
        if let Some(next) = self.statuses.lock().unwrap().pop_front() {
            *last = next;
        }
        Ok(Self::snapshot(*last))
    }

    async fn list_recordings(&self, call_sid: &str) -> Result<Vec<Recording>, ProviderError> {
        assert_eq!(call_sid, CALL_SID);
        self.recording_lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail_recordings {
            return Err(api_error("recordings rejected"));
        }
        Ok(self.recordings.clone())
    }
}
