use super::definition::{ProfileDefinition, ProfileTier};
use crate::dispatch::DispatchError;
use std::collections::HashMap;

/// Profiles indexed by id, keeping the highest-priority definition per id.
#[derive(Debug, Default)]
pub struct ProfileRegistry {
    profiles: HashMap<String, ProfileDefinition>,
}

impl ProfileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the built-in profiles.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        super::builtin::register_all(&mut registry);
        registry
    }

    /// Register a profile definition.
    /// Returns false if it was ignored because an existing one outranks it.
    pub fn register(&mut self, definition: ProfileDefinition) -> bool {
        if let Some(existing) = self.profiles.get(&definition.id)
            && !Self::is_higher_priority(definition.tier, existing.tier)
        {
            return false;
        }
        self.profiles.insert(definition.id.clone(), definition);
        true
    }

    pub fn get(&self, id: &str) -> Option<&ProfileDefinition> {
        self.profiles.get(id)
    }

    pub fn resolve(&self, id: &str) -> Result<&ProfileDefinition, DispatchError> {
        self.get(id)
            .ok_or_else(|| DispatchError::UnknownProfile(id.to_string()))
    }

    /// All profiles, sorted by id.
    pub fn list(&self) -> Vec<&ProfileDefinition> {
        let mut profiles: Vec<_> = self.profiles.values().collect();
        profiles.sort_by(|a, b| a.id.cmp(&b.id));
        profiles
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Priority order: Loaded > BuiltIn. Same-tier replacements are allowed.
    fn is_higher_priority(new_tier: ProfileTier, old_tier: ProfileTier) -> bool {
        match (new_tier, old_tier) {
            (ProfileTier::Loaded, ProfileTier::BuiltIn) => true,
            (a, b) if a == b => true,
            _ => false,
        }
    }
}
