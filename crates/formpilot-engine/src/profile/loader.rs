use super::definition::{ProfileDefinition, ProfileTier};
use super::registry::ProfileRegistry;
use super::schema::{Validatable, ValidationError};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ProfileLoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Glob pattern error: {0}")]
    Pattern(#[from] glob::PatternError),
    #[error("Glob iteration error: {0}")]
    Glob(#[from] glob::GlobError),
    #[error("Invalid profile: {0}")]
    Invalid(#[from] ValidationError),
}

const PATTERNS: [&str; 2] = ["**/*.yaml", "**/*.yml"];

pub struct ProfileLoader;

impl ProfileLoader {
    /// Read one profile file. The result is always tagged [`ProfileTier::Loaded`].
    pub async fn load_file(path: &Path) -> Result<ProfileDefinition, ProfileLoadError> {
        let content = tokio::fs::read_to_string(path).await?;
        let mut profile: ProfileDefinition = serde_yaml::from_str(&content)?;
        profile.validate()?;
        profile.tier = ProfileTier::Loaded;
        Ok(profile)
    }

    /// Load every profile under `dir`. Files that fail to read, parse or
    /// validate are skipped with a warning; a missing directory yields nothing.
    pub async fn load_dir(dir: &Path) -> Result<Vec<ProfileDefinition>, ProfileLoadError> {
        let mut profiles = Vec::new();
        for file in Self::profile_files(dir)? {
            match Self::load_file(&file).await {
                Ok(profile) => {
                    debug!("Loaded profile {} from {:?}", profile.id, file);
                    profiles.push(profile);
                }
                Err(e) => warn!("Skipping profile {:?}: {}", file, e),
            }
        }
        Ok(profiles)
    }

    /// Load every directory into the registry. Returns how many profiles registered.
    pub async fn load_into(
        dirs: &[PathBuf],
        registry: &mut ProfileRegistry,
    ) -> Result<usize, ProfileLoadError> {
        let mut count = 0;
        for dir in dirs {
            for profile in Self::load_dir(dir).await? {
                if registry.register(profile) {
                    count += 1;
                }
            }
        }
        Ok(count)
    }

    fn profile_files(dir: &Path) -> Result<Vec<PathBuf>, ProfileLoadError> {
        let mut files = Vec::new();
        for pattern in PATTERNS {
            let full_pattern = dir.join(pattern);
            let pattern_str = full_pattern.to_str().ok_or(glob::PatternError {
                pos: 0,
                msg: "Invalid UTF-8 path",
            })?;

            for entry in glob::glob(pattern_str)? {
                match entry {
                    Ok(path) if path.is_file() => files.push(path),
                    Ok(_) => {}
                    Err(e) => warn!("Skipping unreadable entry: {}", e),
                }
            }
        }
        files.sort();
        Ok(files)
    }
}
