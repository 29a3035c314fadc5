use std::sync::Arc;

use futures::future::BoxFuture;
use log::{debug, error};
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde_json::Value;
use url::Url;

use super::{Method, Notifier, Request, Transport};
use crate::error::{Result, WidgetError};

/// REST transport rooted at the console's API base URL.
///
/// Failing requests that are not marked quiet are reported to the notifier,
/// the same way the console's global error handler intercepts AJAX failures.
pub struct HttpTransport {
    client: Client,
    rest_url: Url,
    credentials: Option<(String, String)>,
    notifier: Option<Arc<dyn Notifier>>,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("jenkins-widget/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| WidgetError::Config(format!("Failed to create HTTP client: {e}")))?;

        // Url::join drops the last segment of a base without trailing slash
        let base = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let rest_url = Url::parse(&base)
            .map_err(|e| WidgetError::Config(format!("Invalid REST base URL: {e}")))?;

        Ok(Self {
            client,
            rest_url,
            credentials: None,
            notifier: None,
        })
    }

    pub fn with_basic_auth(mut self, user: impl Into<String>, token: impl Into<String>) -> Self {
        self.credentials = Some((user.into(), token.into()));
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Helper to build authenticated requests
    fn auth_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some((user, token)) = &self.credentials {
            request.basic_auth(user, Some(token))
        } else {
            request
        }
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.rest_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| WidgetError::Config(format!("Invalid request path {path}: {e}")))
    }

    async fn execute(&self, request: &Request) -> Result<Value> {
        let url = self.url(&request.path)?;
        debug!("{:?} {url}", request.method);

        let builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
        };
        let response = self
            .auth_request(builder)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(WidgetError::Api {
                status: status.as_u16(),
                message,
            });
        }

        // Some endpoints answer 204 or an empty 200
        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: Request) -> BoxFuture<'_, Result<Value>> {
        Box::pin(async move {
            let result = self.execute(&request).await;
            if let Err(e) = &result {
                if request.report_errors {
                    error!("Request {} failed: {e}", request.path);
                    if let Some(notifier) = &self.notifier {
                        notifier.error(&e.to_string());
                    }
                } else {
                    debug!("Request {} failed: {e}", request.path);
                }
            }
            result
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingNotifier {
        errors: Mutex<Vec<String>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, _message: &str) {}

        fn error(&self, message: &str) {
            self.errors.lock().unwrap().push(message.to_string());
        }
    }

    #[test]
    fn test_invalid_base_url() {
        let result = HttpTransport::new("not a url");
        assert!(matches!(result, Err(WidgetError::Config(_))));
    }

    #[test]
    fn test_url_keeps_base_path() {
        let transport = HttpTransport::new("https://console.sample.org/ligoj/rest").unwrap();
        let url = transport.url("service/build/jenkins/build/3").unwrap();
        assert_eq!(
            url.as_str(),
            "https://console.sample.org/ligoj/rest/service/build/jenkins/build/3"
        );
    }

    #[tokio::test]
    async fn test_get_json() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/service/build/jenkins/node/job/proj-app")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": "proj-app", "status": "blue"}"#)
            .create_async()
            .await;

        let transport = HttpTransport::new(&format!("{}/rest", server.url())).unwrap();
        let value = transport
            .send(Request::get("service/build/jenkins/node/job/proj-app"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(value["status"], "blue");
    }

    #[tokio::test]
    async fn test_post_empty_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/service/build/jenkins/build/12")
            .match_header("authorization", mockito::Matcher::Regex("^Basic ".into()))
            .with_status(204)
            .create_async()
            .await;

        let transport = HttpTransport::new(&server.url())
            .unwrap()
            .with_basic_auth("admin", "secret");
        let value = transport
            .send(Request::post("service/build/jenkins/build/12"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(value.is_null());
    }

    #[tokio::test]
    async fn test_error_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/service/build/jenkins/build/12")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let notifier = Arc::new(RecordingNotifier::default());
        let transport = HttpTransport::new(&server.url())
            .unwrap()
            .with_notifier(notifier.clone());
        let result = transport
            .send(Request::post("service/build/jenkins/build/12"))
            .await;

        assert!(matches!(result, Err(WidgetError::Api { status: 500, .. })));
        assert_eq!(notifier.errors.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_quiet_error_is_not_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/service/build/jenkins/node/job/proj-x")
            .with_status(404)
            .create_async()
            .await;

        let notifier = Arc::new(RecordingNotifier::default());
        let transport = HttpTransport::new(&server.url())
            .unwrap()
            .with_notifier(notifier.clone());
        let result = transport
            .send(Request::get("service/build/jenkins/node/job/proj-x").quiet())
            .await;

        assert!(result.unwrap_err().is_not_found());
        assert!(notifier.errors.lock().unwrap().is_empty());
    }
}
