pub mod document;
pub mod lock;
pub mod recovery;
pub mod settings;
pub mod store_io;
pub mod watcher;
