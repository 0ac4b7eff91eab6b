use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct FeedResponse {
    pub posts: Vec<Post>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Post {
    pub title: String,
    pub user: String,
    pub likes: u64,
    pub comments: u64,
}
