use anyhow::{anyhow, Context};
use reqwest::Url;

use crate::{backend::BackendClient, config::Settings, domain::form::SubmitEvent};

pub mod error;
pub mod feed;
pub mod form;
pub mod page;

use self::{
    feed::FeedRenderer,
    form::{registry::FormRegistry, Disposition, FormInterceptor},
    page::Page,
};

/// Both page components, wired to one backend client.
pub struct App {
    client: BackendClient,
    interceptor: FormInterceptor,
    feed: FeedRenderer,
}

impl App {
    pub fn with(config: Settings) -> anyhow::Result<Self> {
        let base_url =
            Url::parse(&config.backend.base_url).context("The backend base URL should be valid.")?;
        let feed_url = base_url
            .join(&config.feed.path)
            .context("The feed path should be a valid URL path.")?;

        let client = BackendClient::new(
            base_url,
            config.backend.csrf_cookie.clone(),
            config.backend.timeout(),
        )
        .context("Failed to build the HTTP client.")?;

        let registry = FormRegistry::try_from(&config.interceptor)
            .map_err(|e| anyhow!(e))
            .context("The registered forms should be valid.")?;
        tracing::debug!(
            marker_class = %config.interceptor.marker_class,
            forms = config.interceptor.forms.len(),
            "form registry built"
        );

        let interceptor = FormInterceptor::new(
            client.clone(),
            registry,
            config.messages.into(),
            config.interceptor.prevent_double_submit,
        );
        let feed = FeedRenderer::new(client.clone(), feed_url, config.feed.container_id);

        Ok(Self {
            client,
            interceptor,
            feed,
        })
    }

    pub fn client(&self) -> &BackendClient {
        &self.client
    }

    pub async fn on_submit(&self, page: &dyn Page, event: &SubmitEvent) -> Disposition {
        self.interceptor.on_submit(page, event).await
    }

    pub async fn on_load(&self, page: &dyn Page) -> usize {
        self.feed.on_load(page).await
    }

    pub fn feed(&self) -> &FeedRenderer {
        &self.feed
    }
}
