mod dictionary;
mod schema;
mod session;

#[cfg(test)]
pub(crate) mod fixtures;

pub use dictionary::*;
pub use schema::*;
pub use session::*;
