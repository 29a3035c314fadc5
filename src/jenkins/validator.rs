use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, warn};
use regex::Regex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use super::links;
use super::status::BUILDING_ICON;
use crate::error::{Result, WidgetError};
use crate::host::{FieldValidator, Host, Localizer, Request, SelectionContext, Transport, ValidationSink};
use crate::model::PARAMETER_JOB;

/// Rule raised when the name does not follow the project key convention.
pub const RULE_JOB_NAME: &str = "validation-job-name";
/// Rule raised when a job with the same name already exists.
pub const RULE_ALREADY_EXIST: &str = "already-exist";
/// Feedback icon shown while the existence check runs.
pub const CHECKING_ICON: &str = BUILDING_ICON;

/// Validation state of the job name field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FieldState {
    #[default]
    Unchecked,
    Checking,
    Valid,
    Invalid,
}

/// The field state, with the generation of the last validation that touched it.
#[derive(Debug, Default)]
struct FieldTracker {
    state: FieldState,
    generation: u64,
}

/// Immediate result of a validation, plus the pending existence check.
#[derive(Debug)]
pub struct Validation {
    pub accepted: bool,
    pub check: Option<JoinHandle<FieldState>>,
}

/// Validates the name of a job created by a new subscription.
///
/// The name must be the project key, or the key followed by `-` and lower
/// case alphanumerics. A name passing that check is accepted right away and
/// its existence on the selected node is then looked up asynchronously; the
/// lookup result is published to the validation sink when it arrives.
#[derive(Clone)]
pub struct JobNameValidator {
    pkey: String,
    pattern: Regex,
    transport: Arc<dyn Transport>,
    messages: Arc<dyn Localizer>,
    validation: Arc<dyn ValidationSink>,
    selection: Arc<dyn SelectionContext>,
    tracker: Arc<Mutex<FieldTracker>>,
}

impl JobNameValidator {
    pub fn new(
        pkey: &str,
        transport: Arc<dyn Transport>,
        messages: Arc<dyn Localizer>,
        validation: Arc<dyn ValidationSink>,
        selection: Arc<dyn SelectionContext>,
    ) -> Result<Self> {
        let pkey_pattern = regex::escape(pkey);
        let pattern = Regex::new(&format!("^(?:{pkey_pattern}|{pkey_pattern}-[a-z0-9]*)$"))
            .map_err(|e| WidgetError::Config(format!("Invalid project key {pkey}: {e}")))?;

        Ok(Self {
            pkey: pkey.to_string(),
            pattern,
            transport,
            messages,
            validation,
            selection,
            tracker: Arc::default(),
        })
    }

    pub fn from_host(pkey: &str, host: &Host) -> Result<Self> {
        Self::new(
            pkey,
            host.transport.clone(),
            host.messages.clone(),
            host.validation.clone(),
            host.selection.clone(),
        )
    }

    pub fn matches_pattern(&self, job_name: &str) -> bool {
        self.pattern.is_match(job_name)
    }

    pub fn state(&self) -> FieldState {
        self.lock().state
    }

    fn lock(&self) -> MutexGuard<'_, FieldTracker> {
        self.tracker.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Moves the field to `state` and supersedes every pending check.
    fn transition(&self, state: FieldState) -> u64 {
        let mut tracker = self.lock();
        tracker.generation += 1;
        tracker.state = state;
        tracker.generation
    }

    /// Runs the pattern check, then starts the existence check on the Tokio runtime.
    pub fn validate_name(&self, job_name: &str) -> Validation {
        self.validation.reset(PARAMETER_JOB);

        if !self.matches_pattern(job_name) {
            self.transition(FieldState::Invalid);
            self.validation
                .add_error(PARAMETER_JOB, RULE_JOB_NAME, &[self.pkey.clone()]);
            return Validation {
                accepted: false,
                check: None,
            };
        }

        let Some(node) = self.selection.selected_node() else {
            warn!("No node selected, skipping the existence check of job {job_name}");
            self.transition(FieldState::Unchecked);
            return Validation {
                accepted: true,
                check: None,
            };
        };

        let Ok(runtime) = Handle::try_current() else {
            warn!("No async runtime, skipping the existence check of job {job_name}");
            self.transition(FieldState::Unchecked);
            return Validation {
                accepted: true,
                check: None,
            };
        };

        let generation = self.transition(FieldState::Checking);
        self.validation.add_message(PARAMETER_JOB, CHECKING_ICON);
        let check = self
            .clone()
            .check_existence(node, job_name.to_string(), generation);

        Validation {
            accepted: true,
            check: Some(runtime.spawn(check)),
        }
    }

    async fn check_existence(self, node: String, job_name: String, generation: u64) -> FieldState {
        let lookup = self
            .transport
            .send(Request::get(links::job_lookup(&node, &job_name)).quiet())
            .await;

        let mut tracker = self.lock();
        if tracker.generation != generation {
            debug!("Discarding superseded existence check of job {job_name}");
            return tracker.state;
        }

        match lookup {
            Ok(_) => {
                tracker.state = FieldState::Invalid;
                self.validation.add_error(
                    PARAMETER_JOB,
                    RULE_ALREADY_EXIST,
                    &[self.messages.text(PARAMETER_JOB), job_name],
                );
            }
            Err(e) => {
                // Any failure means the name is available
                if !e.is_not_found() {
                    debug!("Existence check of job {job_name} failed: {e}");
                }
                tracker.state = FieldState::Valid;
                self.validation.add_success(PARAMETER_JOB);
            }
        }
        tracker.state
    }
}

impl FieldValidator for JobNameValidator {
    fn validate(&self, value: &str) -> bool {
        self.validate_name(value).accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{FieldFeedback, FieldValidations, FixedSelection, HttpTransport, MessageCatalog};
    use futures::future::BoxFuture;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use tokio::sync::oneshot;

    const NODE: &str = "service:build:jenkins:bpr";

    /// Answers lookups from a list of existing jobs; gated paths wait for the test.
    #[derive(Default)]
    struct FakeJenkins {
        existing: Vec<String>,
        gates: tokio::sync::Mutex<HashMap<String, oneshot::Receiver<()>>>,
        paths: Mutex<Vec<String>>,
    }

    impl Transport for FakeJenkins {
        fn send(&self, request: Request) -> BoxFuture<'_, crate::error::Result<Value>> {
            self.paths.lock().unwrap().push(request.path.clone());
            Box::pin(async move {
                let gate = self.gates.lock().await.remove(&request.path);
                if let Some(gate) = gate {
                    let _ = gate.await;
                }
                let name = request.path.rsplit('/').next().unwrap_or_default();
                if self.existing.iter().any(|existing| existing == name) {
                    Ok(json!({ "id": name, "status": "blue" }))
                } else {
                    Err(WidgetError::Api {
                        status: 404,
                        message: String::new(),
                    })
                }
            })
        }
    }

    fn validator(
        transport: Arc<dyn Transport>,
        node: Option<&str>,
    ) -> (JobNameValidator, Arc<FieldValidations>) {
        let sink = Arc::new(FieldValidations::default());
        let validator = JobNameValidator::new(
            "proj",
            transport,
            Arc::new(MessageCatalog::default()),
            sink.clone(),
            Arc::new(FixedSelection(node.map(str::to_string))),
        )
        .unwrap();
        (validator, sink)
    }

    fn existing(names: &[&str]) -> Arc<FakeJenkins> {
        Arc::new(FakeJenkins {
            existing: names.iter().map(|n| n.to_string()).collect(),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_pattern_accepts_key_and_suffix() {
        let (validator, _) = validator(existing(&[]), Some(NODE));
        assert!(validator.matches_pattern("proj"));
        assert!(validator.matches_pattern("proj-abc123"));
        assert!(validator.matches_pattern("proj-"));
    }

    #[tokio::test]
    async fn test_pattern_rejections() {
        let jenkins = existing(&[]);
        let (validator, sink) = validator(jenkins.clone(), Some(NODE));

        for name in ["Proj", "proj_x", "other", "proj-ABC", "xproj", "proj-a/b"] {
            let validation = validator.validate_name(name);
            assert!(!validation.accepted, "{name}");
            assert!(validation.check.is_none());
            assert_eq!(
                sink.get(PARAMETER_JOB),
                Some(FieldFeedback::Error {
                    rule: RULE_JOB_NAME.into(),
                    parameters: vec!["proj".into()],
                })
            );
            assert_eq!(validator.state(), FieldState::Invalid);
        }
        assert!(jenkins.paths.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_pattern_escapes_project_key() {
        let (validator, _) = {
            let sink = Arc::new(FieldValidations::default());
            let validator = JobNameValidator::new(
                "a.b",
                existing(&[]),
                Arc::new(MessageCatalog::default()),
                sink.clone(),
                Arc::new(FixedSelection::default()),
            )
            .unwrap();
            (validator, sink)
        };
        assert!(validator.matches_pattern("a.b-x"));
        assert!(!validator.matches_pattern("axb-x"));
    }

    #[tokio::test]
    async fn test_existing_job_is_rejected() {
        let (validator, sink) = validator(existing(&["proj-app"]), Some(NODE));

        let validation = validator.validate_name("proj-app");
        assert!(validation.accepted);
        assert_eq!(
            sink.get(PARAMETER_JOB),
            Some(FieldFeedback::Message {
                icon: CHECKING_ICON.into()
            })
        );

        let state = validation.check.unwrap().await.unwrap();
        assert_eq!(state, FieldState::Invalid);
        assert_eq!(
            sink.get(PARAMETER_JOB),
            Some(FieldFeedback::Error {
                rule: RULE_ALREADY_EXIST.into(),
                parameters: vec!["Job".into(), "proj-app".into()],
            })
        );
    }

    #[tokio::test]
    async fn test_missing_job_is_valid() {
        let jenkins = existing(&["proj-other"]);
        let (validator, sink) = validator(jenkins.clone(), Some(NODE));

        let validation = validator.validate_name("proj-new");
        assert!(validation.accepted);
        assert_eq!(validation.check.unwrap().await.unwrap(), FieldState::Valid);
        assert_eq!(sink.get(PARAMETER_JOB), Some(FieldFeedback::Success));
        assert_eq!(
            *jenkins.paths.lock().unwrap(),
            ["service/build/jenkins/service:build:jenkins:bpr/job/proj-new"]
        );
    }

    #[tokio::test]
    async fn test_checking_state_until_lookup_answers() {
        let jenkins = existing(&[]);
        let (release, gate) = oneshot::channel();
        jenkins.gates.lock().await.insert(
            "service/build/jenkins/service:build:jenkins:bpr/job/proj".into(),
            gate,
        );
        let (validator, _) = validator(jenkins, Some(NODE));

        let validation = validator.validate_name("proj");
        assert_eq!(validator.state(), FieldState::Checking);

        release.send(()).unwrap();
        assert_eq!(validation.check.unwrap().await.unwrap(), FieldState::Valid);
        assert_eq!(validator.state(), FieldState::Valid);
    }

    #[tokio::test]
    async fn test_superseded_check_is_discarded() {
        let jenkins = existing(&["proj-old"]);
        let (release, gate) = oneshot::channel();
        jenkins.gates.lock().await.insert(
            "service/build/jenkins/service:build:jenkins:bpr/job/proj-old".into(),
            gate,
        );
        let (validator, sink) = validator(jenkins, Some(NODE));

        let first = validator.validate_name("proj-old");
        let second = validator.validate_name("proj-new");
        assert_eq!(second.check.unwrap().await.unwrap(), FieldState::Valid);

        // The older lookup answers last: the field keeps the newer result
        release.send(()).unwrap();
        assert_eq!(first.check.unwrap().await.unwrap(), FieldState::Valid);
        assert_eq!(sink.get(PARAMETER_JOB), Some(FieldFeedback::Success));
    }

    #[tokio::test]
    async fn test_no_selected_node_skips_lookup() {
        let jenkins = existing(&[]);
        let (validator, sink) = validator(jenkins.clone(), None);

        assert!(validator.validate("proj-app"));
        assert_eq!(validator.state(), FieldState::Unchecked);
        assert!(sink.get(PARAMETER_JOB).is_none());
        assert!(jenkins.paths.lock().unwrap().is_empty());
    }

    #[test]
    fn test_without_runtime_only_pattern_applies() {
        let (validator, _) = validator(existing(&[]), Some(NODE));
        let validation = validator.validate_name("proj-app");
        assert!(validation.accepted);
        assert!(validation.check.is_none());
        assert!(!validator.validate("bad name"));
    }

    #[tokio::test]
    async fn test_lookup_over_http() {
        let mut server = mockito::Server::new_async().await;
        let found = server
            .mock("GET", "/rest/service/build/jenkins/service:build:jenkins:bpr/job/proj-app")
            .with_status(200)
            .with_body(r#"{"id": "proj-app", "status": "blue"}"#)
            .create_async()
            .await;
        let missing = server
            .mock("GET", "/rest/service/build/jenkins/service:build:jenkins:bpr/job/proj-new")
            .with_status(404)
            .create_async()
            .await;

        let transport = Arc::new(HttpTransport::new(&format!("{}/rest/", server.url())).unwrap());
        let (validator, sink) = validator(transport, Some(NODE));

        let state = validator.validate_name("proj-app").check.unwrap().await.unwrap();
        assert_eq!(state, FieldState::Invalid);
        found.assert_async().await;

        let state = validator.validate_name("proj-new").check.unwrap().await.unwrap();
        assert_eq!(state, FieldState::Valid);
        assert_eq!(sink.get(PARAMETER_JOB), Some(FieldFeedback::Success));
        missing.assert_async().await;
    }
}
