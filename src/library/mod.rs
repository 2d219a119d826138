#[cfg(feature = "desktop")]
pub mod commands;
pub mod comparisons;
pub mod controller;
pub mod state;

pub use comparisons::ComparisonsController;
pub use controller::{LibraryController, SelectionUpdate};
pub use state::{LibrarySnapshot, LibraryStore, Selection, SelectionChange, MAX_SELECTION, MIN_COMPARE};
