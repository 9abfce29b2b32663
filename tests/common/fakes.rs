use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use ui_testgen::browser::dom_model::{PageSnapshot, RawElement};
use ui_testgen::browser::error::BrowserError;
use ui_testgen::browser::session::BrowserDriver;
use ui_testgen::generator::retry::RetryPolicy;
use ui_testgen::model::backend::{ModelBackend, ModelError, ModelRequest};
use ui_testgen::model::mock::MockBackend;
use ui_testgen::pipeline::runner::Pipeline;

pub const TWO_ROW_TABLE: &str = "\
| Priority | Scenario | Test Case | Expected Result |
|----------|----------|-----------|-----------------|
| High | Login with valid credentials | Enter correct user/pass and submit | User is logged in |
| Low | Toggle remember-me | Check the box and submit | Session persists |
";

/// Retry policy that never sleeps.
pub fn instant_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy::new(max_attempts, Duration::ZERO)
}

// =========================================================================
// Model backends
// =========================================================================

/// Replays queued answers in order; answers 503 once the queue is empty.
pub struct ScriptedBackend {
    answers: Mutex<VecDeque<Result<String, ModelError>>>,
    calls: AtomicUsize,
    requests: Mutex<Vec<ModelRequest>>,
}

impl ScriptedBackend {
    pub fn new(answers: Vec<Result<String, ModelError>>) -> Arc<Self> {
        Arc::new(Self {
            answers: Mutex::new(answers.into()),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn always_failing() -> Arc<Self> {
        Self::new(vec![])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl ModelBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    fn generate(&self, request: &ModelRequest) -> Result<String, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        self.answers.lock().unwrap().pop_front().unwrap_or_else(|| {
            Err(ModelError::Api {
                status: 503,
                body: "unavailable".into(),
            })
        })
    }
}

// =========================================================================
// Browser
// =========================================================================

pub struct FakeDriver {
    pub snapshot: Option<PageSnapshot>,
    pub calls: AtomicUsize,
}

impl FakeDriver {
    pub fn returning(snapshot: PageSnapshot) -> Self {
        Self {
            snapshot: Some(snapshot),
            calls: AtomicUsize::new(0),
        }
    }

    /// Every snapshot fails the way an unreachable host does.
    pub fn failing() -> Self {
        Self {
            snapshot: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl BrowserDriver for FakeDriver {
    fn snapshot(&self, _url: &str) -> Result<PageSnapshot, BrowserError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.snapshot
            .clone()
            .ok_or_else(|| BrowserError::SessionProtocol {
                command: "navigate".into(),
                error: "net::ERR_NAME_NOT_RESOLVED".into(),
            })
    }
}

pub fn element() -> RawElement {
    RawElement::default()
}

pub fn login_page() -> PageSnapshot {
    PageSnapshot {
        text_inputs: vec![
            RawElement {
                tag: "input".into(),
                input_type: Some("email".into()),
                placeholder: Some("Email Address".into()),
                name: Some("email".into()),
                ..element()
            },
            RawElement {
                tag: "input".into(),
                input_type: Some("password".into()),
                name: Some("password".into()),
                ..element()
            },
        ],
        buttons: vec![RawElement {
            tag: "button".into(),
            text: Some("Sign in".into()),
            ..element()
        }],
        checkboxes: vec![RawElement {
            tag: "input".into(),
            input_type: Some("checkbox".into()),
            name: Some("remember".into()),
            ..element()
        }],
        ..PageSnapshot::default()
    }
}

// =========================================================================
// Pipelines
// =========================================================================

pub fn mock_pipeline(driver: FakeDriver) -> Pipeline {
    Pipeline::with_backend(Arc::new(MockBackend), Box::new(driver), 5, instant_retry(2))
}

pub fn pipeline_with(backend: Arc<dyn ModelBackend>, driver: FakeDriver) -> Pipeline {
    Pipeline::with_backend(backend, Box::new(driver), 5, instant_retry(2))
}
