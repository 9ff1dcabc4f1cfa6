pub mod builtin;
pub mod definition;
pub mod loader;
pub mod registry;
pub mod schema;

pub use definition::{BlankFill, ComboBoxSpec, ProfileDefinition, ProfileTier};
pub use loader::{ProfileLoadError, ProfileLoader};
pub use registry::ProfileRegistry;
pub use schema::{Validatable, ValidationError};
