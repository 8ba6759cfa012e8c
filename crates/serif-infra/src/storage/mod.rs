//! Object storage backends for uploaded media.

mod fs;
mod memory;

pub use fs::FsObjectStore;
pub use memory::InMemoryObjectStore;
