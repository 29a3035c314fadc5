use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, info};

use super::links;
use crate::host::{ControlKey, Localizer, Notifier, Request, Transport};

/// Visual state of a build control.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlState {
    pub disabled: bool,
    /// Flashing indicator while the request is in flight
    pub busy: bool,
}

impl ControlState {
    pub fn is_idle(&self) -> bool {
        !self.disabled
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// The build request was accepted
    Triggered,
    /// The request failed, the transport already reported it
    Failed,
    /// The control was requesting or suspended, nothing was sent
    Ignored,
}

#[derive(Debug, Default)]
struct Activity {
    requesting: bool,
    /// Set while the control is superseded, e.g. by per-branch controls
    suspended: bool,
}

/// A build button: Idle -> Requesting -> Idle.
#[derive(Debug)]
pub struct BuildControl {
    key: ControlKey,
    activity: Mutex<Activity>,
}

impl BuildControl {
    pub fn new(key: ControlKey) -> Self {
        Self {
            key,
            activity: Mutex::default(),
        }
    }

    pub fn key(&self) -> &ControlKey {
        &self.key
    }

    pub fn state(&self) -> ControlState {
        let activity = self.lock();
        ControlState {
            disabled: activity.requesting || activity.suspended,
            busy: activity.requesting,
        }
    }

    pub fn is_requesting(&self) -> bool {
        self.lock().requesting
    }

    /// Disables the control until resumed. An in-flight request is not affected.
    pub fn set_suspended(&self, suspended: bool) {
        let mut activity = self.lock();
        if activity.suspended != suspended {
            debug!("Build control {:?} suspended: {suspended}", self.key);
            activity.suspended = suspended;
        }
    }

    fn lock(&self) -> MutexGuard<'_, Activity> {
        self.activity.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Enters Requesting, unless the control is requesting or suspended.
    ///
    /// The returned guard ends the request when dropped.
    fn begin(&self) -> Option<RequestingGuard<'_>> {
        let mut activity = self.lock();
        if activity.requesting || activity.suspended {
            return None;
        }
        activity.requesting = true;
        Some(RequestingGuard { control: self })
    }
}

struct RequestingGuard<'a> {
    control: &'a BuildControl,
}

impl Drop for RequestingGuard<'_> {
    fn drop(&mut self) {
        self.control.lock().requesting = false;
        debug!("Build control {:?} request done", self.control.key);
    }
}

/// Launches builds and reports their acceptance to the operator.
#[derive(Clone)]
pub struct BuildTrigger {
    transport: Arc<dyn Transport>,
    messages: Arc<dyn Localizer>,
    notifier: Arc<dyn Notifier>,
}

impl BuildTrigger {
    pub fn new(
        transport: Arc<dyn Transport>,
        messages: Arc<dyn Localizer>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            transport,
            messages,
            notifier,
        }
    }

    /// Requests a build of the job configured on the control's subscription.
    ///
    /// The success notification names `job_name`, or the subscription
    /// identifier when the job is unknown. Failures are not reported here:
    /// the transport's error handler does it.
    pub async fn activate(&self, control: &BuildControl, job_name: Option<&str>) -> TriggerOutcome {
        let Some(_requesting) = control.begin() else {
            debug!("Build control {:?} is disabled", control.key);
            return TriggerOutcome::Ignored;
        };

        let key = &control.key;
        let path = links::build_path(key.subscription);
        info!("Launching build of subscription {}", key.subscription);

        match self.transport.send(Request::post(path)).await {
            Ok(_) => {
                let subscription = key.subscription.to_string();
                let name = job_name.unwrap_or(subscription.as_str());
                if let Some(message) = self.messages.format("jenkins-build-job-success", name) {
                    self.notifier.notify(&message);
                }
                TriggerOutcome::Triggered
            }
            Err(e) => {
                debug!("Build of subscription {} failed: {e}", key.subscription);
                TriggerOutcome::Failed
            }
        }
    }
}
