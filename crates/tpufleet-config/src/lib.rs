pub mod error;

pub use error::*;

use std::path::{Path, PathBuf};

/// 設定ファイルを直接指定する環境変数
pub const CONFIG_ENV_VAR: &str = "TPUFLEET_CONFIG";

/// 探索するファイル名（優先順）
const CANDIDATES: [&str; 4] = ["tpufleet.local.kdl", "tpufleet.kdl", "tpus.yaml", "tpus.yml"];

/// 設定ファイルを探す
///
/// 以下の優先順位で検索:
/// 1. 明示的なパス（--config）
/// 2. 環境変数 TPUFLEET_CONFIG
/// 3. カレントディレクトリ: tpufleet.local.kdl, tpufleet.kdl, tpus.yaml, tpus.yml
/// 4. ./config/ ディレクトリ内: 同様の順序
/// 5. ~/.config/tpufleet/tpufleet.kdl (グローバル設定)
pub fn find_config_file(explicit: Option<&Path>) -> Result<PathBuf> {
    // 1. 明示的な指定は存在しなければエラー（黙って他を探さない）
    if let Some(path) = explicit {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        return Err(ConfigError::ExplicitPathNotFound(
            path.display().to_string(),
        ));
    }

    // 2. 環境変数で直接指定
    if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
    }

    let current_dir = std::env::current_dir()?;

    // 3. カレントディレクトリで検索
    if let Some(path) = find_in(&current_dir) {
        return Ok(path);
    }

    // 4. ./config/ ディレクトリで検索
    let config_subdir = current_dir.join("config");
    if config_subdir.is_dir()
        && let Some(path) = find_in(&config_subdir)
    {
        return Ok(path);
    }

    // 5. グローバル設定ファイル
    if let Some(config_dir) = dirs::config_dir() {
        let global_config = config_dir.join("tpufleet").join("tpufleet.kdl");
        if global_config.exists() {
            return Ok(global_config);
        }
    }

    Err(ConfigError::ConfigFileNotFound)
}

fn find_in(dir: &Path) -> Option<PathBuf> {
    CANDIDATES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    /// カレントディレクトリを一時的に移動し、終わったら戻す
    fn in_dir<T>(dir: &Path, f: impl FnOnce() -> T) -> T {
        let original_dir = std::env::current_dir().unwrap();
        std::env::set_current_dir(dir).unwrap();
        let result = f();
        std::env::set_current_dir(original_dir).unwrap();
        result
    }

    #[test]
    #[serial]
    fn test_find_config_file_in_current_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("tpufleet.kdl"), "// test").unwrap();

        let result = in_dir(temp_dir.path(), || find_config_file(None)).unwrap();
        assert!(result.ends_with("tpufleet.kdl"));
    }

    #[test]
    #[serial]
    fn test_find_config_file_local_priority() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("tpufleet.kdl"), "// shared").unwrap();
        fs::write(temp_dir.path().join("tpufleet.local.kdl"), "// local").unwrap();
        fs::write(temp_dir.path().join("tpus.yaml"), "v2: {}").unwrap();

        let result = in_dir(temp_dir.path(), || find_config_file(None)).unwrap();

        // tpufleet.local.kdl が優先される
        assert!(result.ends_with("tpufleet.local.kdl"));
    }

    #[test]
    #[serial]
    fn test_find_config_file_yaml() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("tpus.yaml"), "v2: {}").unwrap();

        let result = in_dir(temp_dir.path(), || find_config_file(None)).unwrap();
        assert!(result.ends_with("tpus.yaml"));
    }

    #[test]
    #[serial]
    fn test_find_config_file_in_config_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_dir = temp_dir.path().join("config");
        fs::create_dir(&config_dir).unwrap();
        fs::write(config_dir.join("tpus.yaml"), "v2: {}").unwrap();

        let result = in_dir(temp_dir.path(), || find_config_file(None)).unwrap();
        assert!(result.ends_with("config/tpus.yaml"));
    }

    #[test]
    #[serial]
    fn test_find_config_file_env_var() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("custom.kdl");
        fs::write(&config_path, "// custom").unwrap();

        unsafe {
            std::env::set_var(CONFIG_ENV_VAR, config_path.to_str().unwrap());
        }

        let result = find_config_file(None).unwrap();
        assert_eq!(result, config_path);

        unsafe {
            std::env::remove_var(CONFIG_ENV_VAR);
        }
    }

    #[test]
    #[serial]
    fn test_explicit_path_wins() {
        let temp_dir = tempfile::tempdir().unwrap();
        let explicit = temp_dir.path().join("other.kdl");
        fs::write(&explicit, "// explicit").unwrap();
        fs::write(temp_dir.path().join("tpufleet.kdl"), "// test").unwrap();

        let result = in_dir(temp_dir.path(), || find_config_file(Some(&explicit))).unwrap();
        assert_eq!(result, explicit);
    }

    #[test]
    fn test_explicit_path_missing() {
        let result = find_config_file(Some(Path::new("/nonexistent/tpufleet.kdl")));
        assert!(matches!(result, Err(ConfigError::ExplicitPathNotFound(_))));
    }

    #[test]
    #[serial]
    fn test_find_config_file_not_found() {
        let temp_dir = tempfile::tempdir().unwrap();

        let result = in_dir(temp_dir.path(), || find_config_file(None));

        // グローバル設定が無い環境では見つからない
        if let Err(e) = result {
            assert!(matches!(e, ConfigError::ConfigFileNotFound));
        }
    }
}
