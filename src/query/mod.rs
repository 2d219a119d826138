//! Keyed response caching and status-driven polling shared by the library
//! and analysis controllers.

pub mod cache;
pub mod poller;

pub use cache::QueryCache;
pub use poller::{PollStep, Poller};
