use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Jenkins job name (or path for jobs nested in folders).
pub const PARAMETER_JOB: &str = "service:build:jenkins:job";
/// Jenkins instance base URL.
pub const PARAMETER_URL: &str = "service:build:jenkins:url";
/// Job used as a template when the subscription creates the job.
pub const PARAMETER_TEMPLATE_JOB: &str = "service:build:jenkins:template-job";

/// Status reported when Jenkins does not provide any color.
pub const UNKNOWN_STATUS: &str = "disabled";

const BUILDING_SUFFIX: &str = "_anime";

pub type SubscriptionId = u64;

/// A configured binding between a host project and a Jenkins job.
///
/// Supplied by the host on each render cycle and never mutated here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    #[serde(default)]
    pub parameters: IndexMap<String, String>,
    /// Filled asynchronously by the host once the job status has been fetched
    #[serde(default)]
    pub data: Option<SubscriptionData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubscriptionData {
    #[serde(default)]
    pub job: Option<Job>,
}

impl Subscription {
    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(String::as_str)
    }

    /// The configured job name, if any.
    pub fn job_name(&self) -> Option<&str> {
        self.parameter(PARAMETER_JOB)
    }

    /// The server-reported job, absent until the host's first load.
    pub fn job(&self) -> Option<&Job> {
        self.data.as_ref().and_then(|data| data.job.as_ref())
    }
}

/// Server-reported build status of a job or of one of its branches.
///
/// Payloads carrying a raw Jenkins `color` instead of a `status` are decoded
/// with [`Job::from_color`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "JobPayload")]
pub struct Job {
    /// Slash-delimited full name, `parent/child` for branches
    pub id: String,
    /// Display name
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: String,
    pub building: bool,
    pub pull_request_branch: bool,
    /// Branches of a multi-branch job, in server order
    pub jobs: Option<Vec<Job>>,
    #[serde(with = "chrono::serde::ts_milliseconds_option")]
    pub last_build: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobPayload {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    building: bool,
    #[serde(default)]
    pull_request_branch: bool,
    #[serde(default)]
    jobs: Option<Vec<Job>>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    last_build: Option<DateTime<Utc>>,
}

impl From<JobPayload> for Job {
    fn from(payload: JobPayload) -> Self {
        let decoded = match payload.status {
            Some(status) => Job::new(payload.id, status),
            None => Job::from_color(payload.id, payload.color.as_deref()),
        };
        Self {
            name: payload.name,
            description: payload.description,
            building: decoded.building || payload.building,
            pull_request_branch: payload.pull_request_branch,
            jobs: payload.jobs,
            last_build: payload.last_build,
            ..decoded
        }
    }
}

impl Job {
    pub fn new(id: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            description: None,
            status: status.into(),
            building: false,
            pull_request_branch: false,
            jobs: None,
            last_build: None,
        }
    }

    /// Builds a job from a raw Jenkins `color` value.
    ///
    /// Jenkins reports a running build with an `_anime` suffix (`blue_anime`),
    /// and no color at all for jobs that were never built.
    pub fn from_color(id: impl Into<String>, color: Option<&str>) -> Self {
        let color = color.map(str::trim).filter(|c| !c.is_empty());
        let (status, building) = match color {
            Some(color) => match color.strip_suffix(BUILDING_SUFFIX) {
                Some(status) => (status, true),
                None => (color, false),
            },
            None => (UNKNOWN_STATUS, false),
        };
        Self {
            building,
            ..Self::new(id, status)
        }
    }

    /// Branches, empty when the job is a plain job.
    pub fn branches(&self) -> &[Job] {
        self.jobs.as_deref().unwrap_or_default()
    }

    pub fn is_multi_branch(&self) -> bool {
        !self.branches().is_empty()
    }
}
