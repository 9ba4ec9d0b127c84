//! Network layer - executes gateway calls off the UI thread
//!
//! The Network actor receives CRUD commands and sends back responses.

pub mod actor;

pub use actor::NetworkActor;
