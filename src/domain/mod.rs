mod count;
mod triggers;

pub use count::*;
pub use triggers::*;
