//! SQLite-backed persistence for the Lingua desktop app: translation
//! history and the user's phrasebook, one database file per concern under
//! the app data dir.

pub mod history;
pub mod phrasebook;

pub use history::HistoryItem;
pub use phrasebook::PhrasebookItem;
