pub mod backend;
pub mod store;
pub mod weather;

pub use backend::BackendClient;
pub use store::{FileStore, KeyValueStore, MemoryStore, StateStore};
pub use weather::WeatherProvider;
