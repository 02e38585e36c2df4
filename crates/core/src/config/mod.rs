pub mod schema;
pub mod sources;
pub mod validation;

pub use schema::*;
pub use sources::*;
pub use validation::*;
