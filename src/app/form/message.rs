use crate::config::MessageSettings;

use super::schema::Errors;

/// User-facing texts shown after a submission.
#[derive(Debug, Clone)]
pub struct Messages {
    success_prefix: String,
    error_prefix: String,
    generic_error: String,
    connectivity_error: String,
}

impl Messages {
    pub fn confirmation(&self, username: Option<&str>) -> String {
        match username {
            Some(name) => format!("{} {}", self.success_prefix, name),
            None => self.success_prefix.clone(),
        }
    }

    pub fn rejection(&self, errors: Option<&Errors>) -> String {
        let detail = errors
            .and_then(Errors::compose)
            .unwrap_or_else(|| self.generic_error.clone());
        format!("{} {}", self.error_prefix, detail)
    }

    pub fn connectivity(&self) -> &str {
        &self.connectivity_error
    }
}

impl From<MessageSettings> for Messages {
    fn from(settings: MessageSettings) -> Self {
        Self {
            success_prefix: settings.success_prefix,
            error_prefix: settings.error_prefix,
            generic_error: settings.generic_error,
            connectivity_error: settings.connectivity_error,
        }
    }
}
