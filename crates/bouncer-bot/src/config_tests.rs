#[cfg(test)]
mod tests {
    use crate::config::{Config, ReadEnv};
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    struct InMemoryEnv(HashMap<&'static str, &'static str>);

    impl InMemoryEnv {
        fn new(pairs: &[(&'static str, &'static str)]) -> Self {
            Self(pairs.iter().cloned().collect())
        }
    }

    impl ReadEnv for InMemoryEnv {
        fn var(&self, key: &str) -> Option<String> {
            self.0.get(key).map(|v| v.to_string())
        }
    }

    fn write_toml(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    // ── from_file ─────────────────────────────────────────────────────────────

    #[test]
    fn test_from_file_minimal() {
        let toml = r#"
[discord]
bot_token = "BOT-TOKEN-123"
"#;
        let f = write_toml(toml);
        let cfg = Config::from_file(f.path().to_str().unwrap()).unwrap();
        assert_eq!(cfg.discord.bot_token, "BOT-TOKEN-123");
    }

    #[test]
    fn test_from_file_missing_returns_error() {
        let result = Config::from_file("/nonexistent/path/config.toml");
        assert!(result.is_err());
        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("Failed to read config file"));
    }

    #[test]
    fn test_from_file_invalid_toml_returns_error() {
        let f = write_toml("this is not valid toml !!!");
        let result = Config::from_file(f.path().to_str().unwrap());
        assert!(result.is_err());
        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("Failed to parse config file"));
    }

    // ── from_env ──────────────────────────────────────────────────────────────

    #[test]
    fn test_from_env_missing_token_returns_error() {
        let env = InMemoryEnv::new(&[]);
        let result = Config::from_env_impl(&env);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_env_reads_token() {
        let env = InMemoryEnv::new(&[("DISCORD_BOT_TOKEN", "env-token-abc")]);
        let cfg = Config::from_env_impl(&env).unwrap();
        assert_eq!(cfg.discord.bot_token, "env-token-abc");
    }
}
