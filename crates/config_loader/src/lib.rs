//! # Config Loader
//!
//! Load plan parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON plan files
//! - Validate plan legality
//! - Produce a `LoadPlan`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let plan = ConfigLoader::load_from_path(Path::new("plan.toml")).unwrap();
//! println!("Target: {}", plan.target.url);
//! ```

mod parser;
mod validator;

pub use contracts::LoadPlan;
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::Path;

/// Load plan loader
///
/// Provides static methods to load a plan from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load a plan from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<LoadPlan, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load a plan from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(content: &str, format: ConfigFormat) -> Result<LoadPlan, ContractError> {
        Self::parse_and_validate(content, format)
    }

    /// Serialize LoadPlan to TOML string
    pub fn to_toml(plan: &LoadPlan) -> Result<String, ContractError> {
        toml::to_string_pretty(plan)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize LoadPlan to JSON string
    pub fn to_json(plan: &LoadPlan) -> Result<String, ContractError> {
        serde_json::to_string_pretty(plan)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer plan format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    /// Read plan file content
    fn read_file(path: &Path) -> Result<String, ContractError> {
        Ok(std::fs::read_to_string(path)?)
    }

    /// Parse and validate plan content
    fn parse_and_validate(content: &str, format: ConfigFormat) -> Result<LoadPlan, ContractError> {
        let plan = parser::parse(content, format)?;
        validator::validate(&plan)?;
        Ok(plan)
    }
}
