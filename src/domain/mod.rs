pub mod csrf;
pub mod form;
