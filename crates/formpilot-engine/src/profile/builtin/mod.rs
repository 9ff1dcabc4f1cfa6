use crate::profile::registry::ProfileRegistry;

pub mod greenhouse_calendly;

/// Register all built-in profiles into the registry.
pub fn register_all(registry: &mut ProfileRegistry) {
    registry.register(greenhouse_calendly::definition());
}
