use std::collections::HashMap;

use super::Localizer;

const ENGLISH: &[(&str, &str)] = &[
    ("name", "Name"),
    ("service:build:jenkins:job", "Job"),
    (
        "service:build:jenkins:job-description",
        "Job name. You type name or display name to search it",
    ),
    ("service:build:jenkins:url", "URL"),
    ("service:build:jenkins:user", "User"),
    ("service:build:jenkins:api-token", "API Token"),
    ("service:build:jenkins:build", "Build"),
    ("service:build:jenkins:branch", "Branch"),
    ("service:build:jenkins:pull-request", "Pull Request"),
    ("service:build:jenkins:status-blue", "Success"),
    ("service:build:jenkins:status-yellow", "Unstable"),
    ("service:build:jenkins:status-disabled", "Unknown"),
    ("service:build:jenkins:status-red", "Failure"),
    ("service:build:jenkins:building", "Building"),
    ("service:build:jenkins:template-job", "Template job"),
    (
        "service:build:jenkins:template-job-description",
        "Name of job used as a template to create the new job",
    ),
    ("jenkins-build-job-success", "Launching the job {{this}} succeed"),
    ("error.jenkins-job", "Job not found"),
    ("error.jenkins-connection", "Unreachable server"),
    ("error.jenkins-login", "Authentication failed"),
    ("error.jenkins-rights", "No right to read jobs"),
    ("already-exist", "{{[0]}} \"{{[1]}}\" already exists"),
    (
        "validation-job-name",
        "Must start with {{this}}-, contain only lower case characters, without special characters",
    ),
];

const FRENCH: &[(&str, &str)] = &[
    ("name", "Nom"),
    ("service:build:jenkins:job", "Tâche"),
    (
        "service:build:jenkins:job-description",
        "Nom de la tâche. Il est possible de saisir le nom ou la description",
    ),
    ("service:build:jenkins:url", "URL"),
    ("service:build:jenkins:user", "Utilisateur"),
    ("service:build:jenkins:api-token", "Clé API"),
    ("service:build:jenkins:build", "Construire"),
    ("service:build:jenkins:branch", "Branche"),
    ("service:build:jenkins:pull-request", "Pull Request"),
    ("service:build:jenkins:status-blue", "Succès"),
    ("service:build:jenkins:status-yellow", "Instable"),
    ("service:build:jenkins:status-disabled", "Inconnu"),
    ("service:build:jenkins:status-red", "Echec"),
    ("service:build:jenkins:building", "En construction"),
    ("service:build:jenkins:template-job", "Modèle de tâche"),
    (
        "service:build:jenkins:template-job-description",
        "Nom de la tâche qui sert de modèle pour créer la nouvelle tâche",
    ),
    ("jenkins-build-job-success", "Lancement du job {{this}} effectué"),
    ("error.jenkins-job", "Tâche non trouvée"),
    ("error.jenkins-connection", "Serveur inatteignable"),
    ("error.jenkins-login", "Echec de l'authentification"),
    ("error.jenkins-rights", "Droits insuffisants pour accéder aux tâches"),
    ("already-exist", "{{[0]}} \"{{[1]}}\" existe déjà"),
    (
        "validation-job-name",
        "Doit commencer par {{this}}-, ne contenir que des caractères minuscules, sans caractères spéciaux",
    ),
];

/// Bundled message tables of the widget.
///
/// Lookups go to the requested locale first, then to the English root table.
#[derive(Debug, Clone)]
pub struct MessageCatalog {
    locale: String,
    entries: HashMap<&'static str, &'static str>,
}

impl MessageCatalog {
    /// Catalog for a locale tag such as `fr` or `fr-FR`. Unknown locales get English.
    pub fn for_locale(locale: &str) -> Self {
        let mut entries: HashMap<_, _> = ENGLISH.iter().copied().collect();
        let language = locale
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        if language == "fr" {
            entries.extend(FRENCH.iter().copied());
        }

        Self {
            locale: language,
            entries,
        }
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self::for_locale("en")
    }
}

impl Localizer for MessageCatalog {
    fn message(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|message| (*message).to_string())
    }
}
