mod pagination;
mod sorting;

pub use pagination::*;
pub use sorting::*;
