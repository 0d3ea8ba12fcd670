//! Request extractors shared by the routes.

pub mod actor;

pub use actor::{ACTOR_HEADER, ActorId};
