//! Safe SQL builder for the document tables: identifiers quoted, values as parameters.

mod builder;
pub mod params;
pub use builder::*;
pub use params::*;
