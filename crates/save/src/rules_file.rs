//! Loading the rule repository from disk.

use std::fs;
use std::path::Path;

use bevy::log::info;

use track::pipeline::ActiveRules;
use track::rules::{RuleLoadError, RuleRepository};

/// Read and validate a rule repository JSON file.
pub fn read_rules(path: &Path) -> Result<RuleRepository, RuleLoadError> {
    let json = fs::read_to_string(path).map_err(|e| RuleLoadError::Unreadable {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let repository = RuleRepository::from_json_str(&json)?;
    info!(
        "loaded {} rule(s) from {} (version {})",
        repository.len(),
        path.display(),
        repository.version()
    );
    Ok(repository)
}

/// The session rules for `path`: the file's repository, or the reason it
/// cannot be used. Requests fail at the rules stage in the latter case.
pub fn active_rules_from_file(path: &Path) -> ActiveRules {
    match read_rules(path) {
        Ok(repository) => ActiveRules::from_repository(repository),
        Err(e) => ActiveRules::from_error(e),
    }
}
