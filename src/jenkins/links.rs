use crate::model::{Job, SubscriptionId};

/// Root of the widget's REST service, relative to the console REST base.
pub const SERVICE_PATH: &str = "service/build/jenkins/";

/// Lookup root for existing jobs.
pub const JOB_LOOKUP_PATH: &str = SERVICE_PATH;

/// Lookup root for template jobs.
pub const TEMPLATE_LOOKUP_PATH: &str = "service/build/jenkins/template/";

/// Percent-encodes every `/`-separated segment of a job full name and joins
/// them with Jenkins' `/job/` folder separator.
///
/// `team/app` becomes `team/job/app`.
pub fn job_path(id: &str) -> String {
    id.split('/')
        .map(urlencoding::encode)
        .collect::<Vec<_>>()
        .join("/job/")
}

/// Web page of a job, e.g. <https://ci.sample.org/job/team/job/app>
pub fn job_url(base_url: &str, id: &str) -> String {
    format!("{}/job/{}", base_url.trim_end_matches('/'), job_path(id))
}

/// Name of a branch relative to its parent job.
///
/// Jenkins already escapes slashes inside branch names (`feature%2Fx`), so
/// this is the remainder after the parent's full name, or the last segment.
pub fn branch_name<'a>(parent_id: &str, branch_id: &'a str) -> &'a str {
    branch_id
        .strip_prefix(parent_id)
        .and_then(|rest| rest.strip_prefix('/'))
        .filter(|rest| !rest.is_empty())
        .unwrap_or_else(|| branch_id.rsplit('/').next().unwrap_or(branch_id))
}

/// Web page of a branch of a multi-branch job.
///
/// Pull request branches live under the `change-requests` view.
pub fn branch_url(base_url: &str, parent_id: &str, branch: &Job) -> String {
    let name = urlencoding::encode(branch_name(parent_id, &branch.id));
    let parent = job_url(base_url, parent_id);
    if branch.pull_request_branch {
        format!("{parent}/view/change-requests/job/{name}/")
    } else {
        format!("{parent}/job/{name}/")
    }
}

/// REST path checking whether a job exists on a node.
pub fn job_lookup(node: &str, name: &str) -> String {
    format!("{SERVICE_PATH}{node}/job/{}", urlencoding::encode(name))
}

/// REST path launching the build of the job configured on a subscription.
pub fn build_path(subscription: SubscriptionId) -> String {
    format!("{SERVICE_PATH}build/{subscription}")
}
