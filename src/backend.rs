use std::{sync::Arc, time::Duration};

use reqwest::{
    cookie::{CookieStore, Jar},
    multipart, Client, Url,
};

use crate::domain::csrf::CsrfToken;

pub const CSRF_HEADER: &str = "X-CSRFToken";

/// HTTP access to the backend, sharing one cookie store between requests.
#[derive(Clone)]
pub struct BackendClient {
    http_client: Client,
    cookies: Arc<Jar>,
    base_url: Url,
    csrf_cookie: String,
}

impl BackendClient {
    pub fn new(base_url: Url, csrf_cookie: String, timeout: Duration) -> Result<Self, reqwest::Error> {
        let cookies = Arc::new(Jar::default());
        let http_client = Client::builder()
            .cookie_provider(Arc::clone(&cookies))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http_client,
            cookies,
            base_url,
            csrf_cookie,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Cookie store used by every request; `Set-Cookie` replies land here too.
    pub fn cookies(&self) -> &Arc<Jar> {
        &self.cookies
    }

    /// Reads the CSRF token that would accompany a request to `url`, right now.
    pub fn csrf_token(&self, url: &Url) -> Option<CsrfToken> {
        let header = self.cookies.cookies(url)?;
        let header = header.to_str().ok()?;
        CsrfToken::from_cookie_header(header, &self.csrf_cookie)
    }

    /// POSTs a multipart form and returns the raw reply body, whatever the status.
    ///
    /// The CSRF token comes from the cookies of `page`, the page hosting the form,
    /// wherever the form posts to.
    #[tracing::instrument(
        name = "Posting form to the backend",
        skip(self, url, page, form),
        fields(url = %url)
    )]
    pub async fn post_form(
        &self,
        url: Url,
        page: &Url,
        form: multipart::Form,
    ) -> Result<Vec<u8>, reqwest::Error> {
        let token = self.csrf_token(page);
        if token.is_none() {
            tracing::warn!(cookie = %self.csrf_cookie, "no CSRF token available, sending an empty header");
        }

        let response = self
            .http_client
            .post(url)
            .header(CSRF_HEADER, token.as_ref().map(CsrfToken::expose).unwrap_or_default())
            .multipart(form)
            .send()
            .await?;

        tracing::debug!(status = %response.status(), "backend replied");
        Ok(response.bytes().await?.to_vec())
    }

    #[tracing::instrument(name = "Fetching from the backend", skip(self, url), fields(url = %url))]
    pub async fn get(&self, url: Url) -> Result<Vec<u8>, reqwest::Error> {
        let response = self.http_client.get(url).send().await?;

        tracing::debug!(status = %response.status(), "backend replied");
        Ok(response.bytes().await?.to_vec())
    }
}
