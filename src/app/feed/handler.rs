use askama::Template;
use reqwest::Url;

use super::schema::{FeedResponse, Post};
use crate::{
    app::{
        error::{FeedError, PageError},
        page::Page,
    },
    backend::BackendClient,
};

/// One feed card; every field is HTML-escaped.
#[derive(Template)]
#[template(path = "feed_card.html")]
struct FeedCard<'a> {
    post: &'a Post,
}

pub fn render_card(post: &Post) -> Result<String, askama::Error> {
    FeedCard { post }.render()
}

pub struct FeedRenderer {
    client: BackendClient,
    url: Url,
    container_id: String,
}

impl FeedRenderer {
    pub fn new(client: BackendClient, url: Url, container_id: String) -> Self {
        Self {
            client,
            url,
            container_id,
        }
    }

    /// Page load hook: renders the feed and returns the number of cards appended.
    ///
    /// Failures are logged, never propagated.
    pub async fn on_load(&self, page: &dyn Page) -> usize {
        match self.render_feed(page).await {
            Ok(count) => count,
            Err(e) => {
                tracing::error!(error = ?e, "failed to render the feed");
                0
            }
        }
    }

    #[tracing::instrument(name = "Rendering feed", skip_all, fields(container = %self.container_id))]
    pub async fn render_feed(&self, page: &dyn Page) -> Result<usize, FeedError> {
        if !page.has_element(&self.container_id) {
            return Err(PageError::MissingElement(self.container_id.clone()).into());
        }

        let body = self.client.get(self.url.clone()).await?;
        let feed: FeedResponse = serde_json::from_slice(&body)?;

        let cards = feed
            .posts
            .iter()
            .map(render_card)
            .collect::<Result<Vec<_>, _>>()?;
        let count = cards.len();
        for card in cards {
            page.append_html(&self.container_id, card)?;
        }

        tracing::info!(count, "feed rendered");
        Ok(count)
    }
}
