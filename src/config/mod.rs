mod loader;
mod vocabulary;

pub use loader::{ActionConfig, ClientConfig, Config};
pub use vocabulary::Vocabulary;
