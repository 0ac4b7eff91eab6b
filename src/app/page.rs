use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
};

use reqwest::Url;

use super::error::PageError;

/// The host surface the interceptor and the feed renderer act upon.
pub trait Page: Send + Sync {
    fn location(&self) -> &Url;
    fn alert(&self, message: &str);
    fn navigate(&self, location: &str);
    fn reload(&self);
    fn has_element(&self, id: &str) -> bool;
    fn append_html(&self, container_id: &str, html: String) -> Result<(), PageError>;
}

/// User-visible side effects, in the order they happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Alert(String),
    Navigate(String),
    Reload,
}

/// In-memory page: containers hold appended HTML fragments, effects are recorded.
pub struct Document {
    location: Url,
    containers: Mutex<HashMap<String, Vec<String>>>,
    effects: Mutex<Vec<Effect>>,
}

impl Document {
    pub fn new(location: Url) -> Self {
        Self {
            location,
            containers: Mutex::new(HashMap::new()),
            effects: Mutex::new(Vec::new()),
        }
    }

    pub fn with_container(self, id: impl Into<String>) -> Self {
        self.containers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.into(), Vec::new());
        self
    }

    /// Fragments appended to `id` so far, `None` if there is no such container.
    pub fn children(&self, id: &str) -> Option<Vec<String>> {
        self.containers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    pub fn effects(&self) -> Vec<Effect> {
        self.effects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, effect: Effect) {
        self.effects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(effect);
    }
}

impl Page for Document {
    fn location(&self) -> &Url {
        &self.location
    }

    fn alert(&self, message: &str) {
        tracing::info!(text = message, "alert");
        self.record(Effect::Alert(message.to_owned()));
    }

    fn navigate(&self, location: &str) {
        tracing::info!(location, "navigating");
        self.record(Effect::Navigate(location.to_owned()));
    }

    fn reload(&self) {
        tracing::info!("reloading");
        self.record(Effect::Reload);
    }

    fn has_element(&self, id: &str) -> bool {
        self.containers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(id)
    }

    fn append_html(&self, container_id: &str, html: String) -> Result<(), PageError> {
        self.containers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(container_id)
            .ok_or_else(|| PageError::MissingElement(container_id.to_owned()))?
            .push(html);
        Ok(())
    }
}
