pub mod local;

pub use local::{IndexedUnit, LocalRetriever, LocalVectorStore};
