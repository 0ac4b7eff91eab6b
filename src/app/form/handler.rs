use std::{
    collections::HashSet,
    sync::{Mutex, PoisonError},
};

use reqwest::{multipart, Url};
use uuid::Uuid;

use super::{
    message::Messages,
    registry::{FormRegistry, Registration},
    schema::SubmitResponse,
};
use crate::{
    app::{error::SubmitError, page::Page},
    backend::BackendClient,
    config::SuccessPolicy,
    domain::form::{FieldValue, FormElement, SubmitEvent},
};

/// What happened to a submit event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Not ours: native submission goes ahead.
    PassThrough,
    /// Native submission cancelled, handled here.
    Intercepted(Outcome),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Succeeded {
        message: String,
        navigation: Navigation,
    },
    Rejected {
        message: String,
    },
    Failed {
        message: String,
    },
    /// The same form was still waiting for a reply.
    Suppressed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Redirect(String),
    Reload,
}

pub struct FormInterceptor {
    client: BackendClient,
    registry: FormRegistry,
    messages: Messages,
    in_flight: Option<InFlight>,
}

impl FormInterceptor {
    pub fn new(
        client: BackendClient,
        registry: FormRegistry,
        messages: Messages,
        prevent_double_submit: bool,
    ) -> Self {
        Self {
            client,
            registry,
            messages,
            in_flight: prevent_double_submit.then(InFlight::default),
        }
    }

    pub async fn on_submit(&self, page: &dyn Page, event: &SubmitEvent) -> Disposition {
        let form = &event.target;
        match self.registry.resolve(form) {
            Some(registration) => {
                Disposition::Intercepted(self.intercept(page, form, registration).await)
            }
            None => {
                tracing::trace!(form = ?form.id, "form is not registered, passing through");
                Disposition::PassThrough
            }
        }
    }

    #[tracing::instrument(
        name = "Intercepting form submission",
        skip_all,
        fields(
            submission_id = %Uuid::new_v4(),
            form = form.id.as_deref().unwrap_or("-"),
            action = tracing::field::Empty,
        )
    )]
    async fn intercept(
        &self,
        page: &dyn Page,
        form: &FormElement,
        registration: Registration<'_>,
    ) -> Outcome {
        let url = match resolve_action(page.location(), registration.action) {
            Ok(url) => url,
            Err(e) => return self.fail(page, e),
        };
        tracing::Span::current().record("action", tracing::field::display(&url));

        // Only forms with an id are guarded.
        let guard = self.in_flight.as_ref().zip(form.id.clone());
        let _permit = match guard.map(|(in_flight, id)| in_flight.acquire(id)) {
            Some(None) => {
                tracing::warn!("submission already in flight, ignoring");
                return Outcome::Suppressed;
            }
            permit => permit.flatten(),
        };

        match self.submit(page.location(), url, form).await {
            Ok(response) => self.settle(page, registration.on_success, response),
            Err(e) => self.fail(page, e),
        }
    }

    async fn submit(
        &self,
        location: &Url,
        url: Url,
        form: &FormElement,
    ) -> Result<SubmitResponse, SubmitError> {
        let payload = build_payload(form)?;
        let body = self.client.post_form(url, location, payload).await?;
        Ok(SubmitResponse::from_slice(&body)?)
    }

    fn settle(
        &self,
        page: &dyn Page,
        on_success: &SuccessPolicy,
        response: SubmitResponse,
    ) -> Outcome {
        match response {
            SubmitResponse::Accepted {
                username,
                redirect_url,
            } => {
                let message = self.messages.confirmation(username.as_deref());
                let navigation = match on_success {
                    SuccessPolicy::Redirect(to) => Navigation::Redirect(to.clone()),
                    SuccessPolicy::Reload => Navigation::Reload,
                    SuccessPolicy::Follow(fallback) => {
                        Navigation::Redirect(redirect_url.unwrap_or_else(|| fallback.clone()))
                    }
                };
                tracing::info!(?navigation, "submission accepted");

                page.alert(&message);
                match &navigation {
                    Navigation::Redirect(to) => page.navigate(to),
                    Navigation::Reload => page.reload(),
                }
                Outcome::Succeeded {
                    message,
                    navigation,
                }
            }
            SubmitResponse::Rejected { errors } => {
                let message = self.messages.rejection(errors.as_ref());
                tracing::info!(?errors, "submission rejected");

                page.alert(&message);
                Outcome::Rejected { message }
            }
        }
    }

    fn fail(&self, page: &dyn Page, error: SubmitError) -> Outcome {
        tracing::error!(error = ?error, "submission failed");

        let message = self.messages.connectivity().to_owned();
        page.alert(&message);
        Outcome::Failed { message }
    }
}

/// Resolves `action` against the page location; no action posts to the page itself.
fn resolve_action(location: &Url, action: Option<&str>) -> Result<Url, SubmitError> {
    match action.filter(|a| !a.is_empty()) {
        Some(action) => location
            .join(action)
            .map_err(|_| SubmitError::InvalidAction(action.to_owned())),
        None => Ok(location.clone()),
    }
}

fn build_payload(form: &FormElement) -> Result<multipart::Form, SubmitError> {
    form.named_fields()
        .try_fold(multipart::Form::new(), |payload, (name, value)| {
            let payload = match value {
                FieldValue::Text(text) => payload.text(name.clone(), text.clone()),
                FieldValue::File {
                    file_name,
                    mime,
                    bytes,
                } => {
                    let mut part = multipart::Part::bytes(bytes.clone()).file_name(file_name.clone());
                    if let Some(mime) = mime {
                        part = part
                            .mime_str(mime)
                            .map_err(|source| SubmitError::InvalidField {
                                field: name.clone(),
                                source,
                            })?;
                    }
                    payload.part(name.clone(), part)
                }
            };
            Ok(payload)
        })
}

/// Keys of forms currently waiting for a reply.
#[derive(Default)]
struct InFlight(Mutex<HashSet<String>>);

impl InFlight {
    fn acquire(&self, key: String) -> Option<InFlightPermit<'_>> {
        let mut keys = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        if !keys.insert(key.clone()) {
            return None;
        }
        Some(InFlightPermit { owner: self, key })
    }
}

struct InFlightPermit<'a> {
    owner: &'a InFlight,
    key: String,
}

impl Drop for InFlightPermit<'_> {
    fn drop(&mut self) {
        self.owner
            .0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}
