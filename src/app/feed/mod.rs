pub mod handler;
pub mod schema;

pub use handler::FeedRenderer;
