use serde::Serialize;

use super::links;
use super::status::{StatusStyles, StatusView};
use crate::host::{ControlKey, Localizer};
use crate::model::{Job, Subscription};

/// Status of a plain job, built from the top-level build control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SingleView {
    pub status: StatusView,
    pub control: ControlKey,
}

/// One entry of a multi-branch job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchView {
    pub id: String,
    pub label: String,
    pub url: String,
    pub tooltip: String,
    pub pull_request: bool,
    pub status: StatusView,
    pub control: ControlKey,
}

/// What the details panel shows for a subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "view", rename_all = "kebab-case")]
pub enum Projection {
    /// The host has not loaded the job yet
    Pending,
    Single(SingleView),
    /// Server order, each branch carrying its own build control
    Branches(Vec<BranchView>),
}

impl Projection {
    /// Whether the top-level build control of the row is usable.
    pub fn build_enabled(&self) -> bool {
        matches!(self, Self::Single(_))
    }
}

/// Projects the job of a subscription into a single status or a branch list.
pub fn project(subscription: &Subscription, base_url: &str, messages: &dyn Localizer) -> Projection {
    let styles = &StatusStyles::JENKINS;
    let Some(job) = subscription.job() else {
        return Projection::Pending;
    };

    if !job.is_multi_branch() {
        return Projection::Single(SingleView {
            status: styles.map(&job.status, job.building, messages),
            control: ControlKey::job(subscription.id),
        });
    }

    Projection::Branches(
        job.branches()
            .iter()
            .map(|branch| project_branch(styles, subscription, job, branch, base_url, messages))
            .collect(),
    )
}

fn project_branch(
    styles: &StatusStyles,
    subscription: &Subscription,
    parent: &Job,
    branch: &Job,
    base_url: &str,
    messages: &dyn Localizer,
) -> BranchView {
    BranchView {
        id: branch.id.clone(),
        label: links::branch_name(&parent.id, &branch.id).to_string(),
        url: links::branch_url(base_url, &parent.id, branch),
        tooltip: tooltip(branch, messages),
        pull_request: branch.pull_request_branch,
        status: styles.map(&branch.status, branch.building, messages),
        control: ControlKey::branch(subscription.id, branch.id.clone()),
    }
}

fn tooltip(branch: &Job, messages: &dyn Localizer) -> String {
    let kind = if branch.pull_request_branch {
        messages.text("service:build:jenkins:pull-request")
    } else {
        messages.text("service:build:jenkins:branch")
    };
    match branch.name.as_deref() {
        Some(name) if name != branch.id => format!("{kind}: {} ({name})", branch.id),
        _ => format!("{kind}: {}", branch.id),
    }
}
