pub mod fixtures;
pub mod upstream;

pub use fixtures::*;
pub use upstream::*;
