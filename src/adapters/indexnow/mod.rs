//! IndexNow notification adapter

pub mod dispatcher;

pub use dispatcher::{DispatchReport, EndpointResult, NotificationDispatcher};
