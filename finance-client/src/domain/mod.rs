mod amount;
mod category;
mod entry;
mod ids;

pub use amount::*;
pub use category::*;
pub use entry::*;
pub use ids::*;
