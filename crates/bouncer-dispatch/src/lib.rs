//! Command routing and handlers for the bouncer bot.

pub mod dispatcher;
pub mod router;

pub use dispatcher::Dispatcher;
pub use router::{route, Command};
