use std::collections::HashMap;

use crate::{
    config::{InterceptorSettings, SuccessPolicy},
    domain::form::{FormElement, FormId},
};

#[derive(Debug, Clone, Default)]
pub struct FormConfig {
    /// Overrides the form's own `action` attribute.
    pub action: Option<String>,
    pub on_success: SuccessPolicy,
}

/// How a matched form is to be submitted.
#[derive(Debug, Clone, Copy)]
pub struct Registration<'a> {
    pub action: Option<&'a str>,
    pub on_success: &'a SuccessPolicy,
}

/// Forms opted into interception, resolved once at startup.
///
/// A form is matched by its id first; failing that, carrying the marker class
/// opts it in with the default configuration.
#[derive(Debug, Clone)]
pub struct FormRegistry {
    forms: HashMap<FormId, FormConfig>,
    marker_class: String,
    fallback: FormConfig,
}

impl FormRegistry {
    pub fn new(marker_class: impl Into<String>) -> Self {
        Self {
            forms: HashMap::new(),
            marker_class: marker_class.into(),
            fallback: FormConfig::default(),
        }
    }

    pub fn register(mut self, id: FormId, config: FormConfig) -> Self {
        self.forms.insert(id, config);
        self
    }

    pub fn resolve<'a>(&'a self, form: &'a FormElement) -> Option<Registration<'a>> {
        let config = form
            .id
            .as_deref()
            .and_then(|id| self.forms.get(id))
            .or_else(|| form.has_class(&self.marker_class).then_some(&self.fallback))?;

        Some(Registration {
            action: config.action.as_deref().or(form.action.as_deref()),
            on_success: &config.on_success,
        })
    }
}

impl TryFrom<&InterceptorSettings> for FormRegistry {
    type Error = String;

    fn try_from(settings: &InterceptorSettings) -> Result<Self, Self::Error> {
        settings
            .forms
            .iter()
            .try_fold(Self::new(settings.marker_class.as_str()), |registry, form| {
                let id = FormId::try_from(form.id.clone())?;
                Ok(registry.register(
                    id,
                    FormConfig {
                        action: form.action.clone(),
                        on_success: form.on_success.clone(),
                    },
                ))
            })
    }
}
