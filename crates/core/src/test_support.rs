//! In-process fakes for the upstream seams, shared by the unit tests of this crate.

use crate::clock::Clock;
use crate::upstream::{
    CatalogEntry, Generation, GenerationRequest, ModelSource, TextGenerator, UpstreamError,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Clock that only moves when told to.
pub(crate) struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub(crate) fn new() -> Self {
        Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()),
        }
    }

    pub(crate) fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

pub(crate) fn entry(id: &str, display_name: &str) -> CatalogEntry {
    CatalogEntry {
        name: format!("models/{id}"),
        display_name: display_name.to_string(),
        description: format!("{display_name} description"),
        supported_generation_methods: vec!["generateContent".into(), "countTokens".into()],
    }
}

/// Model source returning a swappable listing and counting calls.
pub(crate) struct FakeModelSource {
    entries: Mutex<Result<Vec<CatalogEntry>, String>>,
    calls: AtomicUsize,
}

impl FakeModelSource {
    pub(crate) fn new(entries: Vec<CatalogEntry>) -> Self {
        Self {
            entries: Mutex::new(Ok(entries)),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn failing(message: &str) -> Self {
        Self {
            entries: Mutex::new(Err(message.to_string())),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn set_entries(&self, entries: Vec<CatalogEntry>) {
        *self.entries.lock().unwrap() = Ok(entries);
    }

    pub(crate) fn set_failure(&self, message: &str) {
        *self.entries.lock().unwrap() = Err(message.to_string());
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelSource for FakeModelSource {
    async fn list_models(&self) -> Result<Vec<CatalogEntry>, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.entries
            .lock()
            .unwrap()
            .clone()
            .map_err(UpstreamError::Transport)
    }
}

/// Model source that never answers.
pub(crate) struct HangingModelSource;

#[async_trait]
impl ModelSource for HangingModelSource {
    async fn list_models(&self) -> Result<Vec<CatalogEntry>, UpstreamError> {
        std::future::pending().await
    }
}

/// Text generator replaying a canned outcome and recording requests.
pub(crate) struct FakeGenerator {
    outcome: Mutex<Option<Result<Generation, UpstreamError>>>,
    hang: bool,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl FakeGenerator {
    pub(crate) fn text(text: &str) -> Self {
        Self::with(Ok(Generation::Text(text.to_string())))
    }

    pub(crate) fn blocked(reason: &str) -> Self {
        Self::with(Ok(Generation::Blocked {
            reason: reason.to_string(),
        }))
    }

    pub(crate) fn failing(err: UpstreamError) -> Self {
        Self::with(Err(err))
    }

    pub(crate) fn hanging() -> Self {
        Self {
            outcome: Mutex::new(None),
            hang: true,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn with(outcome: Result<Generation, UpstreamError>) -> Self {
        Self {
            outcome: Mutex::new(Some(outcome)),
            hang: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub(crate) fn last_request(&self) -> Option<GenerationRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<Generation, UpstreamError> {
        self.requests.lock().unwrap().push(request.clone());
        if self.hang {
            return std::future::pending().await;
        }
        self.outcome
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(UpstreamError::Transport("fake already used".into())))
    }
}
