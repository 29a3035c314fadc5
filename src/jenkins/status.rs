use serde::Serialize;

use crate::host::Localizer;

/// Icon shown while a build is running, whatever the status.
pub const BUILDING_ICON: &str = "fas fa-sync-alt fa-spin";

/// Display classes of a job status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusView {
    pub color_class: String,
    pub icon_class: String,
    pub title: String,
}

impl StatusView {
    /// Combined `class` attribute value.
    pub fn class(&self) -> String {
        format!("{} {}", self.color_class, self.icon_class)
    }
}

/// Immutable status to presentation tables.
#[derive(Debug, Clone, Copy)]
pub struct StatusStyles {
    pub colors: &'static [(&'static str, &'static str)],
    pub icons: &'static [(&'static str, &'static str)],
    pub default_color: &'static str,
    pub default_icon: &'static str,
    pub building_icon: &'static str,
}

impl StatusStyles {
    /// Jenkins ball colors.
    pub const JENKINS: Self = Self {
        colors: &[
            ("blue", "text-success"),
            ("red", "text-danger"),
            ("disabled", "text-muted"),
            ("yellow", "text-warning"),
        ],
        icons: &[
            ("blue", "fas fa-circle"),
            ("red", "fas fa-exclamation-circle"),
            ("disabled", "fas fa-ban"),
            ("yellow", "fas fa-exclamation-triangle"),
        ],
        default_color: "text-muted",
        default_icon: "fas fa-circle",
        building_icon: BUILDING_ICON,
    };

    pub fn color(&self, status: &str) -> &'static str {
        lookup(self.colors, status).unwrap_or(self.default_color)
    }

    pub fn icon(&self, status: &str, building: bool) -> &'static str {
        if building {
            return self.building_icon;
        }
        lookup(self.icons, status).unwrap_or(self.default_icon)
    }

    /// Never fails: unknown statuses get the muted defaults and their raw name as title.
    pub fn map(&self, status: &str, building: bool, messages: &dyn Localizer) -> StatusView {
        let label = messages
            .message(&format!("service:build:jenkins:status-{status}"))
            .unwrap_or_else(|| status.to_string());
        let title = if building {
            format!("{label} ({})", messages.text("service:build:jenkins:building"))
        } else {
            label
        };

        StatusView {
            color_class: self.color(status).to_string(),
            icon_class: self.icon(status, building).to_string(),
            title,
        }
    }
}

impl Default for StatusStyles {
    fn default() -> Self {
        Self::JENKINS
    }
}

fn lookup(table: &[(&'static str, &'static str)], status: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(key, _)| *key == status)
        .map(|(_, value)| *value)
}

/// Maps a status with the Jenkins tables.
pub fn map_status(status: &str, building: bool, messages: &dyn Localizer) -> StatusView {
    StatusStyles::JENKINS.map(status, building, messages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MessageCatalog;

    const KNOWN: [&str; 4] = ["blue", "red", "yellow", "disabled"];

    #[test]
    fn test_known_statuses_have_classes() {
        let messages = MessageCatalog::default();
        for status in KNOWN {
            for building in [true, false] {
                let view = map_status(status, building, &messages);
                assert!(!view.color_class.is_empty());
                assert!(!view.icon_class.is_empty());
                assert_eq!(view.icon_class == BUILDING_ICON, building, "{status}");
            }
        }
    }

    #[test]
    fn test_color_table() {
        let messages = MessageCatalog::default();
        assert_eq!(map_status("blue", false, &messages).color_class, "text-success");
        assert_eq!(map_status("red", false, &messages).color_class, "text-danger");
        assert_eq!(map_status("yellow", false, &messages).color_class, "text-warning");
        assert_eq!(map_status("disabled", false, &messages).color_class, "text-muted");
    }

    #[test]
    fn test_unknown_status_degrades() {
        let messages = MessageCatalog::default();
        let view = map_status("aborted", false, &messages);
        assert_eq!(view.color_class, "text-muted");
        assert_eq!(view.icon_class, "fas fa-circle");
        assert_eq!(view.title, "aborted");
    }

    #[test]
    fn test_unknown_status_building() {
        let messages = MessageCatalog::default();
        let view = map_status("notbuilt", true, &messages);
        assert_eq!(view.color_class, "text-muted");
        assert_eq!(view.icon_class, BUILDING_ICON);
        assert_eq!(view.title, "notbuilt (Building)");
    }

    #[test]
    fn test_failure_while_building() {
        let messages = MessageCatalog::default();
        let view = map_status("red", true, &messages);
        assert!(view.title.contains("Failure"));
        assert!(view.title.contains("(Building)"));
        assert_eq!(view.icon_class, BUILDING_ICON);
        assert_ne!(view.icon_class, "fas fa-exclamation-circle");
        assert_eq!(view.class(), "text-danger fas fa-sync-alt fa-spin");
    }

    #[test]
    fn test_localized_title() {
        let messages = MessageCatalog::for_locale("fr");
        assert_eq!(map_status("yellow", false, &messages).title, "Instable");
        assert_eq!(
            map_status("blue", true, &messages).title,
            "Succès (En construction)"
        );
    }
}
