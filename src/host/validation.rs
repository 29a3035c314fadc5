use std::collections::HashMap;
use std::sync::Mutex;

use log::debug;

use super::ValidationSink;

/// Latest feedback published for a form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldFeedback {
    Error { rule: String, parameters: Vec<String> },
    Success,
    Message { icon: String },
}

/// In-memory validation pipeline: keeps the last feedback of each field.
#[derive(Debug, Default)]
pub struct FieldValidations {
    fields: Mutex<HashMap<String, FieldFeedback>>,
}

impl FieldValidations {
    pub fn get(&self, field: &str) -> Option<FieldFeedback> {
        self.lock().get(field).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, FieldFeedback>> {
        self.fields
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn publish(&self, field: &str, feedback: FieldFeedback) {
        debug!("Field {field}: {feedback:?}");
        self.lock().insert(field.to_string(), feedback);
    }
}

impl ValidationSink for FieldValidations {
    fn reset(&self, field: &str) {
        self.lock().remove(field);
    }

    fn add_error(&self, field: &str, rule: &str, parameters: &[String]) {
        self.publish(
            field,
            FieldFeedback::Error {
                rule: rule.to_string(),
                parameters: parameters.to_vec(),
            },
        );
    }

    fn add_success(&self, field: &str) {
        self.publish(field, FieldFeedback::Success);
    }

    fn add_message(&self, field: &str, icon: &str) {
        self.publish(
            field,
            FieldFeedback::Message {
                icon: icon.to_string(),
            },
        );
    }
}
