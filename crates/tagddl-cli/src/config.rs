use std::path::Path;

use tagddl_generate::GenerateOptions;
use tagddl_generate::output::write_bytes_atomic;

use crate::CliResult;

/// Read generation options from a TOML file, writing the defaults there
/// first when the file does not exist yet.
pub fn load_or_create_options(path: &Path) -> CliResult<GenerateOptions> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let options: GenerateOptions = toml::from_str(&content)?;
        return Ok(options);
    }

    let options = GenerateOptions::default();
    save_options(path, &options)?;
    tracing::info!(event = "config_created", path = %path.display());
    Ok(options)
}

pub fn save_options(path: &Path, options: &GenerateOptions) -> CliResult<()> {
    let encoded = toml::to_string_pretty(options)?;
    write_bytes_atomic(path, encoded.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_config_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("tagddl_config_{}", uuid::Uuid::new_v4()))
            .join("tagddl.toml")
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let path = temp_config_path();
        let options = load_or_create_options(&path).expect("create options");
        assert_eq!(options, GenerateOptions::default());

        let written = std::fs::read_to_string(&path).expect("config written");
        assert!(written.contains("owner = \"postgres\""));
        assert!(written.contains("drop_statements = true"));

        let _ = std::fs::remove_dir_all(path.parent().expect("parent dir"));
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let path = temp_config_path();
        std::fs::create_dir_all(path.parent().expect("parent dir")).expect("create dir");
        std::fs::write(&path, "owner = \"app\"\ntable_inserts = true\nuse_tab = true\n")
            .expect("write config");

        let options = load_or_create_options(&path).expect("load options");
        assert_eq!(options.owner, "app");
        assert!(options.table_inserts);
        assert!(options.use_tab);
        assert_eq!(options.encoding, "UTF8");
        assert_eq!(options.trigger, "trigger");

        let _ = std::fs::remove_dir_all(path.parent().expect("parent dir"));
    }

    #[test]
    fn malformed_file_is_rejected() {
        let path = temp_config_path();
        std::fs::create_dir_all(path.parent().expect("parent dir")).expect("create dir");
        std::fs::write(&path, "indent_spaces = \"four\"\n").expect("write config");

        assert!(load_or_create_options(&path).is_err());

        let _ = std::fs::remove_dir_all(path.parent().expect("parent dir"));
    }
}
