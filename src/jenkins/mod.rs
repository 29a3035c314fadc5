//! Jenkins build job widget: status mapping, branch tree, build trigger and
//! job name validation.

pub mod branches;
pub mod links;
pub mod status;
pub mod trigger;
pub mod validator;
mod widget;

pub use branches::{project, BranchView, Projection, SingleView};
pub use status::{map_status, StatusStyles, StatusView};
pub use trigger::{BuildControl, BuildTrigger, ControlState, TriggerOutcome};
pub use validator::{FieldState, JobNameValidator, Validation};
pub use widget::{
    DetailsFeatures, JenkinsWidget, Mode, SubscriptionConfiguration, BUILD_EVENT, BUILD_SELECTOR,
};
