//! `rolescope config` — Show the effective configuration.

use std::path::{Path, PathBuf};

use rolescope_config::RolescopeConfig;

pub fn show(config: &RolescopeConfig, path: Option<&Path>) {
    let path = source_path(path);
    if path.exists() {
        println!("# {}", path.display());
    } else {
        println!("# {} (not found, defaults)", path.display());
    }
    print!("{}", config.to_toml());
}

fn source_path(path: Option<&Path>) -> PathBuf {
    path.map(Path::to_path_buf)
        .unwrap_or_else(|| RolescopeConfig::config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_path_is_valid() {
        let path = source_path(None);
        assert!(path.to_str().unwrap().contains(".rolescope"));
        assert!(path.ends_with("config.toml"));
    }

    #[test]
    fn explicit_path_wins() {
        let path = source_path(Some(Path::new("/etc/rolescope.toml")));
        assert_eq!(path, PathBuf::from("/etc/rolescope.toml"));
    }
}
