//! Integration tests for config

#[cfg(test)]
mod tests {
    use crumbs_config::*;
    use crumbs_hash::HashAlgorithm;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Mutex to ensure env var tests don't run concurrently
    static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

    #[tokio::test]
    async fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[matching]
manifest_file = "package.json"
default_root = "packages"
all_exact_matches = true
hash_algorithm = "blake3"

[engine]
parallel = false
parallel_threshold = 16

[registry]
url = "https://registry.example.com"
        "#
        )
        .unwrap();

        let config = Config::load_from_file(temp_file.path()).await.unwrap();
        assert_eq!(config.matching.default_root, "packages");
        assert!(config.matching.all_exact_matches);
        assert_eq!(config.matching.hash_algorithm, HashAlgorithm::Blake3);
        assert!(!config.engine.parallel);
        assert_eq!(config.engine.parallel_threshold, 16);
        assert_eq!(config.registry.url, "https://registry.example.com");
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = Config::load_or_default(Some(&dir.path().join("absent.toml")))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crumbs_errors::Error::Config(crumbs_errors::ConfigError::NotFound { .. })
        ));
    }

    #[test]
    fn test_merge_env() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();

        std::env::remove_var("CRUMBS_STRICT_ROOT");
        std::env::remove_var("CRUMBS_MANIFEST_FILE");

        std::env::set_var("CRUMBS_STRICT_ROOT", "true");
        std::env::set_var("CRUMBS_MANIFEST_FILE", "deno.json");

        let mut config = Config::default();
        config.merge_env().unwrap();

        assert!(config.matching.strict_root);
        assert_eq!(config.matching.manifest_file, "deno.json");

        std::env::remove_var("CRUMBS_STRICT_ROOT");
        std::env::remove_var("CRUMBS_MANIFEST_FILE");
    }

    #[test]
    fn test_invalid_env_value() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();

        std::env::remove_var("CRUMBS_PARALLEL");
        std::env::set_var("CRUMBS_PARALLEL", "sometimes");

        let mut config = Config::default();
        let result = config.merge_env();
        assert!(result.is_err());

        std::env::remove_var("CRUMBS_PARALLEL");
    }
}
