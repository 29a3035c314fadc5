//! Capabilities the widget consumes from the host console.
//!
//! The widget never reaches into the host directly: rendering helpers,
//! localized messages, the form validation pipeline, the REST transport and
//! the currently selected node are all injected through these traits.

mod console;
mod http;
mod messages;
mod render;
mod validation;

use std::sync::Arc;

use futures::future::BoxFuture;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::model::{Subscription, SubscriptionId};

pub use console::{ConsoleNotifier, FixedSelection, HandlerRegistry};
pub use http::HttpTransport;
pub use messages::MessageCatalog;
pub use render::{escape_html, HtmlRenderer};
pub use validation::{FieldFeedback, FieldValidations};

/// Renders the host's generic HTML fragments.
pub trait Renderer: Send + Sync {
    /// Renders the value of a subscription parameter as the row key.
    fn render_key(&self, subscription: &Subscription, parameter: &str) -> String;

    /// Renders an icon link to an external page.
    fn render_service_link(
        &self,
        icon: &str,
        url: &str,
        tooltip_key: &str,
        text: Option<&str>,
        attributes: &str,
    ) -> String;

    /// Renders the help link configured for the service, empty when there is none.
    fn render_help_link(&self, parameters: &IndexMap<String, String>, key: &str) -> String;

    /// Renders a carousel of `(message key, html value)` pairs, starting on `index`.
    fn generate_carousel(
        &self,
        subscription: &Subscription,
        pairs: &[(String, String)],
        index: usize,
    ) -> String;
}

/// Localized message lookup with `{{this}}` single-parameter templating.
pub trait Localizer: Send + Sync {
    fn message(&self, key: &str) -> Option<String>;

    /// Message with its `{{this}}` placeholder replaced by `argument`.
    fn format(&self, key: &str, argument: &str) -> Option<String> {
        self.message(key)
            .map(|template| template.replace("{{this}}", argument))
    }

    /// Message with `{{[i]}}` replaced by the i-th parameter and `{{this}}` by the first one.
    fn format_parameters(&self, key: &str, parameters: &[String]) -> Option<String> {
        let mut message = self.message(key)?;
        for (index, parameter) in parameters.iter().enumerate() {
            message = message.replace(&format!("{{{{[{index}]}}}}"), parameter);
        }
        if let Some(first) = parameters.first() {
            message = message.replace("{{this}}", first);
        }
        Some(message)
    }

    /// Message or the key itself when no translation exists.
    fn text(&self, key: &str) -> String {
        self.message(key).unwrap_or_else(|| key.to_string())
    }
}

/// The form validation pipeline, keyed by input field.
pub trait ValidationSink: Send + Sync {
    fn reset(&self, field: &str);
    fn add_error(&self, field: &str, rule: &str, parameters: &[String]);
    fn add_success(&self, field: &str);
    /// Transient feedback rendered as an icon next to the field.
    fn add_message(&self, field: &str, icon: &str);
}

/// A single outstanding validator installed on a form field.
pub trait FieldValidator: Send + Sync {
    /// Immediate validation gate, asynchronous phases update the sink later.
    fn validate(&self, value: &str) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A call against a path rooted at the host's REST base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub path: String,
    /// When false, failures are not surfaced by the shared error handler
    pub report_errors: bool,
}

impl Request {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            report_errors: true,
        }
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            report_errors: true,
        }
    }

    /// Keeps failures away from the shared error handler.
    pub fn quiet(mut self) -> Self {
        self.report_errors = false;
        self
    }
}

/// Asynchronous JSON transport. Non-2xx answers are errors.
pub trait Transport: Send + Sync {
    fn send(&self, request: Request) -> BoxFuture<'_, Result<Value>>;
}

/// Accessor to the organizational node currently selected in the console.
pub trait SelectionContext: Send + Sync {
    fn selected_node(&self) -> Option<String>;
}

/// Operator notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
    fn error(&self, message: &str);
}

/// Identifies one build control: the subscription row, or one branch of it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ControlKey {
    pub subscription: SubscriptionId,
    pub branch: Option<String>,
}

impl ControlKey {
    pub fn job(subscription: SubscriptionId) -> Self {
        Self {
            subscription,
            branch: None,
        }
    }

    pub fn branch(subscription: SubscriptionId, branch: impl Into<String>) -> Self {
        Self {
            subscription,
            branch: Some(branch.into()),
        }
    }
}

/// A click on a build control, with the row data the host holds for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickTarget {
    pub key: ControlKey,
    /// Job parameter of the clicked row, when the host knows it
    pub job_name: Option<String>,
}

pub type ClickHandler = Arc<dyn Fn(ClickTarget) + Send + Sync>;

/// Delegated event wiring scoped to the widget's view.
pub trait ViewEvents: Send + Sync {
    fn on_click(&self, namespace: &str, selector: &str, handler: ClickHandler);
}

/// The full set of host capabilities handed to the widget at construction.
#[derive(Clone)]
pub struct Host {
    pub renderer: Arc<dyn Renderer>,
    pub messages: Arc<dyn Localizer>,
    pub validation: Arc<dyn ValidationSink>,
    pub transport: Arc<dyn Transport>,
    pub selection: Arc<dyn SelectionContext>,
    pub notifier: Arc<dyn Notifier>,
    pub view: Arc<dyn ViewEvents>,
}
