use std::fmt::Write;
use std::sync::Arc;

use indexmap::IndexMap;

use super::{Localizer, Renderer};
use crate::model::Subscription;

/// Escapes text for HTML content and double-quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Plain HTML implementation of the console rendering helpers.
pub struct HtmlRenderer {
    messages: Arc<dyn Localizer>,
}

impl HtmlRenderer {
    pub fn new(messages: Arc<dyn Localizer>) -> Self {
        Self { messages }
    }
}

impl Renderer for HtmlRenderer {
    fn render_key(&self, subscription: &Subscription, parameter: &str) -> String {
        subscription
            .parameter(parameter)
            .map(escape_html)
            .unwrap_or_default()
    }

    fn render_service_link(
        &self,
        icon: &str,
        url: &str,
        tooltip_key: &str,
        text: Option<&str>,
        attributes: &str,
    ) -> String {
        format!(
            r#"<a href="{}" data-toggle="tooltip" title="{}"{attributes}><i class="fas fa-{icon}"></i>{}</a>"#,
            escape_html(url),
            escape_html(&self.messages.text(tooltip_key)),
            text.map(|t| format!(" {}", escape_html(t))).unwrap_or_default(),
        )
    }

    fn render_help_link(&self, parameters: &IndexMap<String, String>, key: &str) -> String {
        let Some(url) = parameters.get(key) else {
            return String::new();
        };
        self.render_service_link("question-circle", url, key, None, r#" target="_blank""#)
    }

    fn generate_carousel(
        &self,
        subscription: &Subscription,
        pairs: &[(String, String)],
        index: usize,
    ) -> String {
        let active = index.min(pairs.len().saturating_sub(1));
        let mut html = format!(
            r#"<div id="carousel-{}" class="carousel slide" data-interval="false"><div class="carousel-inner">"#,
            subscription.id
        );
        for (i, (key, value)) in pairs.iter().enumerate() {
            let _ = write!(
                html,
                r#"<div class="item{}"><span class="details-label">{}</span>: {value}</div>"#,
                if i == active { " active" } else { "" },
                escape_html(&self.messages.text(key)),
            );
        }
        html.push_str("</div></div>");
        html
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MessageCatalog;

    fn renderer() -> HtmlRenderer {
        HtmlRenderer::new(Arc::new(MessageCatalog::default()))
    }

    fn subscription() -> Subscription {
        let mut subscription = Subscription {
            id: 7,
            ..Default::default()
        };
        subscription
            .parameters
            .insert("service:build:jenkins:job".into(), "proj-<app>".into());
        subscription
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_render_key_escapes_value() {
        let html = renderer().render_key(&subscription(), "service:build:jenkins:job");
        assert_eq!(html, "proj-&lt;app&gt;");
    }

    #[test]
    fn test_render_key_missing_parameter() {
        let html = renderer().render_key(&subscription(), "service:build:jenkins:url");
        assert!(html.is_empty());
    }

    #[test]
    fn test_service_link() {
        let html = renderer().render_service_link(
            "home",
            "https://ci.sample.org/job/app",
            "service:build:jenkins:job",
            None,
            r#" target="_blank""#,
        );
        assert_eq!(
            html,
            r#"<a href="https://ci.sample.org/job/app" data-toggle="tooltip" title="Job" target="_blank"><i class="fas fa-home"></i></a>"#
        );
    }

    #[test]
    fn test_help_link_absent() {
        let html = renderer().render_help_link(&IndexMap::new(), "service:build:help");
        assert!(html.is_empty());
    }

    #[test]
    fn test_help_link_present() {
        let mut parameters = IndexMap::new();
        parameters.insert("service:build:help".to_string(), "https://wiki".to_string());
        let html = renderer().render_help_link(&parameters, "service:build:help");
        assert!(html.contains(r#"href="https://wiki""#));
        assert!(html.contains("fa-question-circle"));
    }

    #[test]
    fn test_carousel_marks_active_item() {
        let pairs = vec![
            ("service:build:jenkins:job".to_string(), "proj-app".to_string()),
            ("name".to_string(), "Application".to_string()),
        ];
        let html = renderer().generate_carousel(&subscription(), &pairs, 1);
        assert!(html.starts_with(r#"<div id="carousel-7""#));
        assert!(html.contains(r#"<div class="item"><span class="details-label">Job</span>: proj-app</div>"#));
        assert!(html.contains(r#"<div class="item active"><span class="details-label">Name</span>: Application</div>"#));
    }
}
