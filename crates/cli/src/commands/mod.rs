//! Command implementations and the input plumbing they share.

pub mod check;
pub mod config_cmd;
pub mod diff;
pub mod inspect;
pub mod merge;
pub mod normalize;
pub mod subtract;

use std::io::Read;
use std::path::Path;

use rolescope_algebra::{Address, Create2Params, NormalizeOptions};
use rolescope_config::RolescopeConfig;
use rolescope_core::{Condition, RawCondition};

pub type CommandResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Load the configuration from `path`, or from the default location.
pub fn load_config(path: Option<&Path>) -> CommandResult<RolescopeConfig> {
    let config = match path {
        Some(path) => RolescopeConfig::load_with_env(path)?,
        None => RolescopeConfig::load()?,
    };
    Ok(config)
}

/// Normalization options from the `[normalize]` section.
pub fn normalize_options(config: &RolescopeConfig) -> NormalizeOptions {
    NormalizeOptions {
        push_down: config.normalize.push_down,
    }
}

/// CREATE2 parameters from the `[addressing]` section.
pub fn create2_params(config: &RolescopeConfig) -> CommandResult<Create2Params> {
    Ok(Create2Params {
        deployer: Address::from_bytes(config.addressing.deployer_bytes()?),
        salt: config.addressing.salt_bytes()?,
    })
}

/// Read a file, or stdin when `path` is `-`.
pub fn read_source(path: &Path) -> CommandResult<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {e}", path.display()).into())
}

/// Parse a condition tree from raw JSON, dropping empty fields first.
pub fn parse_condition(json: &str) -> CommandResult<Condition> {
    let raw = RawCondition::from_json(json)?.clean();
    Ok(Condition::try_from(raw)?)
}

pub fn load_condition(path: &Path) -> CommandResult<Condition> {
    let json = read_source(path)?;
    parse_condition(&json).map_err(|e| format!("{}: {e}", path.display()).into())
}

/// Pretty JSON in the raw interchange form.
pub fn to_json(condition: &Condition) -> CommandResult<String> {
    Ok(serde_json::to_string_pretty(condition)?)
}
