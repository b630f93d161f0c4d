mod category;
mod entry;

pub use category::*;
pub use entry::*;
