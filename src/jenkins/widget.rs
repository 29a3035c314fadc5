use std::collections::{HashMap, HashSet};
use std::fmt::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use indexmap::IndexMap;
use log::{debug, info};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use super::branches::{self, BranchView, Projection};
use super::links;
use super::status::StatusView;
use super::trigger::{BuildControl, BuildTrigger, ControlState, TriggerOutcome};
use super::validator::JobNameValidator;
use crate::error::Result;
use crate::host::{escape_html, ClickTarget, ControlKey, FieldValidator, Host};
use crate::model::{
    Job, Subscription, SubscriptionId, PARAMETER_JOB, PARAMETER_TEMPLATE_JOB, PARAMETER_URL,
};

/// Namespaced click event of the build controls.
pub const BUILD_EVENT: &str = "click.service-build-jenkins-build";
/// Class of the build controls.
pub const BUILD_SELECTOR: &str = ".service-build-jenkins-build";

const HELP_KEY: &str = "service:build:help";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// The subscription creates a new job from a template
    Create,
    /// The subscription links an existing job
    #[default]
    Link,
}

/// Parameter form of a subscription being created or linked.
#[derive(Default)]
pub struct SubscriptionConfiguration {
    pub mode: Mode,
    /// Field to lookup REST path, for parameters picked from a remote list
    pub lookups: IndexMap<String, String>,
    pub validators: IndexMap<String, Arc<dyn FieldValidator>>,
}

impl SubscriptionConfiguration {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn register_lookup(&mut self, field: &str, path: &str) {
        self.lookups.insert(field.to_string(), path.to_string());
    }
}

/// Details panel content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailsFeatures {
    pub html: String,
    /// False when branches carry their own build controls
    pub build_enabled: bool,
}

/// The Jenkins build job widget of the console.
pub struct JenkinsWidget {
    host: Host,
    pkey: String,
    trigger: BuildTrigger,
    controls: Mutex<HashMap<ControlKey, Arc<BuildControl>>>,
    initialized: AtomicBool,
}

impl JenkinsWidget {
    /// Creates the widget for the project identified by `pkey`.
    pub fn new(host: Host, pkey: impl Into<String>) -> Arc<Self> {
        let trigger = BuildTrigger::new(
            host.transport.clone(),
            host.messages.clone(),
            host.notifier.clone(),
        );
        Arc::new(Self {
            host,
            pkey: pkey.into(),
            trigger,
            controls: Mutex::default(),
            initialized: AtomicBool::new(false),
        })
    }

    /// Wires the build click handler on the view. Safe to call more than once.
    pub fn initialize(self: &Arc<Self>) {
        if self.initialized.swap(true, Ordering::SeqCst) {
            debug!("Build handler already bound");
            return;
        }

        let widget = Arc::downgrade(self);
        self.host.view.on_click(
            BUILD_EVENT,
            BUILD_SELECTOR,
            Arc::new(move |target: ClickTarget| {
                if let Some(widget) = widget.upgrade() {
                    widget.on_build_click(target);
                }
            }),
        );
    }

    /// Activates the clicked control on the Tokio runtime.
    ///
    /// Returns `None` when no runtime is available to run the request.
    pub fn on_build_click(&self, target: ClickTarget) -> Option<JoinHandle<TriggerOutcome>> {
        let Ok(runtime) = Handle::try_current() else {
            log::warn!("No async runtime, ignoring build of {:?}", target.key);
            return None;
        };

        let control = self.control(&target.key);
        let trigger = self.trigger.clone();
        Some(runtime.spawn(async move {
            trigger
                .activate(&control, target.job_name.as_deref())
                .await
        }))
    }

    /// The control bound to `key`, created Idle on first use.
    pub fn control(&self, key: &ControlKey) -> Arc<BuildControl> {
        self.lock_controls()
            .entry(key.clone())
            .or_insert_with(|| Arc::new(BuildControl::new(key.clone())))
            .clone()
    }

    pub fn control_state(&self, key: &ControlKey) -> ControlState {
        self.lock_controls()
            .get(key)
            .map(|control| control.state())
            .unwrap_or_default()
    }

    fn lock_controls(&self) -> MutexGuard<'_, HashMap<ControlKey, Arc<BuildControl>>> {
        self.controls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Suspends the job-level control while branches carry their own.
    fn sync_job_control(&self, subscription: &Subscription) -> bool {
        let multi_branch = subscription.job().is_some_and(Job::is_multi_branch);
        if subscription.job().is_some() {
            self.control(&ControlKey::job(subscription.id))
                .set_suspended(multi_branch);
        }
        multi_branch
    }

    /// Drops idle branch controls that the latest projection no longer shows.
    fn prune_branch_controls(&self, subscription: SubscriptionId, projection: &Projection) {
        let live: HashSet<&ControlKey> = match projection {
            Projection::Pending => return,
            Projection::Single(_) => HashSet::new(),
            Projection::Branches(branches) => branches.iter().map(|b| &b.control).collect(),
        };
        self.lock_controls().retain(|key, control| {
            let stale = key.subscription == subscription
                && key.branch.is_some()
                && !live.contains(key)
                && !control.is_requesting();
            if stale {
                debug!("Dropping build control {key:?}");
            }
            !stale
        });
    }

    /// Job name of the subscription row.
    pub fn render_key(&self, subscription: &Subscription) -> String {
        self.host.renderer.render_key(subscription, PARAMETER_JOB)
    }

    /// Link to the job, build button and help link of the subscription row.
    pub fn render_features(&self, subscription: &Subscription) -> String {
        let renderer = &self.host.renderer;
        let mut html = renderer.render_service_link(
            "home",
            &self.job_url(subscription),
            PARAMETER_JOB,
            None,
            r#" target="_blank""#,
        );
        if !self.sync_job_control(subscription) {
            html.push_str(&self.build_button(None));
        }
        html.push_str(&renderer.render_help_link(&subscription.parameters, HELP_KEY));
        html
    }

    /// Job name and display name carousel of the details panel.
    pub fn render_details_key(&self, subscription: &Subscription) -> String {
        let name = subscription
            .job()
            .and_then(|job| job.name.as_deref())
            .or_else(|| subscription.job_name())
            .map(escape_html)
            .unwrap_or_default();
        let pairs = [
            (PARAMETER_JOB.to_string(), self.render_key(subscription)),
            ("name".to_string(), name),
        ];
        self.host.renderer.generate_carousel(subscription, &pairs, 1)
    }

    /// Status of the job, or the status tree of its branches.
    pub fn render_details_features(&self, subscription: &Subscription) -> DetailsFeatures {
        let base_url = subscription.parameter(PARAMETER_URL).unwrap_or_default();
        let projection = branches::project(subscription, base_url, self.host.messages.as_ref());
        let build_enabled = projection.build_enabled();
        self.sync_job_control(subscription);
        self.prune_branch_controls(subscription.id, &projection);

        let html = match &projection {
            Projection::Pending => String::new(),
            Projection::Single(view) => {
                self.control(&view.control);
                status_icon(&view.status)
            }
            Projection::Branches(branches) => self.branch_list(branches),
        };

        DetailsFeatures {
            html,
            build_enabled,
        }
    }

    /// Registers the remote lookups of the form and, when creating, the job name validator.
    pub fn configure_subscription_parameters(
        &self,
        configuration: &mut SubscriptionConfiguration,
    ) -> Result<()> {
        if configuration.mode == Mode::Create {
            configuration.register_lookup(PARAMETER_TEMPLATE_JOB, links::TEMPLATE_LOOKUP_PATH);
            let validator = JobNameValidator::from_host(&self.pkey, &self.host)?;
            configuration
                .validators
                .insert(PARAMETER_JOB.to_string(), Arc::new(validator));
            info!("Job name validation installed for project {}", self.pkey);
        } else {
            configuration.register_lookup(PARAMETER_JOB, links::JOB_LOOKUP_PATH);
        }
        Ok(())
    }

    fn job_url(&self, subscription: &Subscription) -> String {
        let base_url = subscription.parameter(PARAMETER_URL).unwrap_or_default();
        let job = subscription.job_name().unwrap_or_default();
        links::job_url(base_url, job)
    }

    fn build_button(&self, branch: Option<&str>) -> String {
        let data = branch
            .map(|id| format!(r#" data-branch="{}""#, escape_html(id)))
            .unwrap_or_default();
        format!(
            r#"<button class="service-build-jenkins-build btn-link"{data}><i class="fas fa-play" data-toggle="tooltip" title="{}"></i></button>"#,
            escape_html(&self.host.messages.text("service:build:jenkins:build"))
        )
    }

    fn branch_list(&self, branches: &[BranchView]) -> String {
        let mut html = String::from(r#"<ul class="list-unstyled service-build-jenkins-branches">"#);
        for branch in branches {
            self.control(&branch.control);
            let kind = if branch.pull_request { "fas fa-code-branch" } else { "fas fa-stream" };
            let _ = write!(
                html,
                r#"<li>{}<a href="{}" target="_blank" data-toggle="tooltip" title="{}"><i class="{kind}"></i> {}</a>{}</li>"#,
                status_icon(&branch.status),
                escape_html(&branch.url),
                escape_html(&branch.tooltip),
                escape_html(&branch.label),
                self.build_button(Some(&branch.id)),
            );
        }
        html.push_str("</ul>");
        html
    }
}

fn status_icon(status: &StatusView) -> String {
    format!(
        r#"<i data-toggle="tooltip" title="{}" class="{}"></i>"#,
        escape_html(&status.title),
        status.class()
    )
}
