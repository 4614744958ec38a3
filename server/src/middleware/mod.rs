//! Actix middleware.

pub mod slash;
pub mod trace;

pub use slash::TrailingSlash;
pub use trace::Trace;
