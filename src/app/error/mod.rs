/// Failures of a single intercepted submission.
///
/// None of these reach the host: the interceptor logs them and shows the
/// connectivity message instead.
#[derive(thiserror::Error, Debug)]
pub enum SubmitError {
    #[error("the form action `{0}` is not a valid URL")]
    InvalidAction(String),
    #[error("the form field `{field}` could not be encoded")]
    InvalidField {
        field: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to reach the backend")]
    Transport(#[from] reqwest::Error),
    #[error("the backend replied with a body that is not JSON")]
    Decode(#[from] serde_json::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum FeedError {
    #[error("failed to fetch the feed")]
    Transport(#[from] reqwest::Error),
    #[error("the feed is malformed")]
    Decode(#[from] serde_json::Error),
    #[error("failed to render a feed card")]
    Render(#[from] askama::Error),
    #[error(transparent)]
    Page(#[from] PageError),
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum PageError {
    #[error("no element with id `{0}` on the page")]
    MissingElement(String),
}
