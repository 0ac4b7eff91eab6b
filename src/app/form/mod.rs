pub mod handler;
pub mod message;
pub mod registry;
pub mod schema;

pub use handler::{Disposition, FormInterceptor, Navigation, Outcome};
