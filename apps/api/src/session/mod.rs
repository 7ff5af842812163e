// Session/collection controller and its HTTP handlers.

pub mod context;
pub mod controller;
pub mod handlers;

pub use context::SessionContext;
pub use controller::{SessionController, SessionError, SessionView, Step};
