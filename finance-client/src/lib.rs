mod client;
pub mod domain;
mod error;
pub mod memory;
pub mod stores;
#[cfg(test)]
mod test_server;

pub use client::*;
pub use error::*;
pub use memory::MemoryBackend;
pub use stores::*;
