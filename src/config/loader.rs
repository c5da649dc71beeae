//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::AppConfig;
use super::secret::secret_string;
use crate::domain::errors::SitemapperError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (`${VAR}` syntax)
/// 3. Parses the TOML into [`AppConfig`]
/// 4. Applies environment variable overrides (`SITEMAPPER_*` prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsing fails, a referenced
/// environment variable is unset, or validation fails.
pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(SitemapperError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        SitemapperError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: AppConfig = toml::from_str(&contents)
        .map_err(|e| SitemapperError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config);

    config.validate()?;

    Ok(config)
}

/// Substitutes environment variables in the format `${VAR_NAME}`
///
/// Comment lines are left untouched. Missing variables are collected and
/// reported together.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("static regex");
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        let trimmed = line.trim_start();

        if trimmed.starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{var_name}}}");
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(SitemapperError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the `SITEMAPPER_*` prefix
///
/// Variables follow the pattern `SITEMAPPER_<SECTION>_<KEY>`, for example
/// `SITEMAPPER_SEARCH_BASE_URL` or `SITEMAPPER_STORE_BUCKET`.
fn apply_env_overrides(config: &mut AppConfig) {
    if let Ok(val) = std::env::var("SITEMAPPER_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("SITEMAPPER_APPLICATION_DRY_RUN") {
        config.application.dry_run = val.parse().unwrap_or(false);
    }

    if let Ok(val) = std::env::var("SITEMAPPER_SEARCH_BASE_URL") {
        config.search.base_url = val;
    }
    if let Ok(val) = std::env::var("SITEMAPPER_SEARCH_USERNAME") {
        config.search.username = Some(val);
    }
    if let Ok(val) = std::env::var("SITEMAPPER_SEARCH_PASSWORD") {
        config.search.password = Some(secret_string(val));
    }
    if let Ok(val) = std::env::var("SITEMAPPER_SEARCH_SCAN_PAGE_SIZE") {
        if let Ok(size) = val.parse() {
            config.search.scan.page_size = size;
        }
    }

    if let Ok(val) = std::env::var("SITEMAPPER_STORE_BUCKET") {
        config.store.bucket = val;
    }
    if let Ok(val) = std::env::var("SITEMAPPER_STORE_PREFIX") {
        config.store.prefix = val;
    }
    if let Ok(val) = std::env::var("SITEMAPPER_STORE_REGION") {
        config.store.region = val;
    }
    if let Ok(val) = std::env::var("SITEMAPPER_STORE_ENDPOINT_URL") {
        config.store.endpoint_url = Some(val);
    }
    if let Ok(val) = std::env::var("SITEMAPPER_STORE_ACCESS_KEY_ID") {
        config.store.access_key_id = Some(val);
    }
    if let Ok(val) = std::env::var("SITEMAPPER_STORE_SECRET_ACCESS_KEY") {
        config.store.secret_access_key = Some(secret_string(val));
    }

    if let Ok(val) = std::env::var("SITEMAPPER_NOTIFY_HOST") {
        config.notify.host = val;
    }
    if let Ok(val) = std::env::var("SITEMAPPER_NOTIFY_API_KEY") {
        config.notify.api_key = Some(secret_string(val));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL_TOML: &str = r#"
[search]
base_url = "https://search.example.com"

[sitemap]
indices = ["jobs_idx"]
site_base_url = "https://www.example.com"

[store]
bucket = "sitemaps"

[notify]
enabled = false
"#;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_minimal_config() {
        let file = write_config(MINIMAL_TOML);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.search.base_url, "https://search.example.com");
        assert_eq!(config.sitemap.indices, vec!["jobs_idx"]);
        assert_eq!(config.store.prefix, "public/");
        assert_eq!(config.search.scan.page_size, 5000);
    }

    #[test]
    fn test_missing_file() {
        let result = load_config("/nonexistent/sitemapper.toml");
        assert!(matches!(
            result,
            Err(SitemapperError::Configuration(msg)) if msg.contains("not found")
        ));
    }

    #[test]
    fn test_env_substitution() {
        std::env::set_var("SITEMAPPER_TEST_BUCKET_SUBST", "from-env");
        let toml = MINIMAL_TOML.replace(
            "bucket = \"sitemaps\"",
            "bucket = \"${SITEMAPPER_TEST_BUCKET_SUBST}\"",
        );
        let file = write_config(&toml);
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.store.bucket, "from-env");
        std::env::remove_var("SITEMAPPER_TEST_BUCKET_SUBST");
    }

    #[test]
    fn test_missing_env_var_reported() {
        let toml = MINIMAL_TOML.replace(
            "bucket = \"sitemaps\"",
            "bucket = \"${SITEMAPPER_TEST_UNSET_VAR}\"",
        );
        let file = write_config(&toml);
        let result = load_config(file.path());
        assert!(matches!(
            result,
            Err(SitemapperError::Configuration(msg))
                if msg.contains("SITEMAPPER_TEST_UNSET_VAR")
        ));
    }

    #[test]
    fn test_substitution_skips_comments() {
        let toml = format!("# bucket = \"${{SITEMAPPER_TEST_COMMENT_VAR}}\"\n{MINIMAL_TOML}");
        let file = write_config(&toml);
        assert!(load_config(file.path()).is_ok());
    }

    #[test]
    fn test_invalid_toml_rejected() {
        let file = write_config("this = is = not toml");
        assert!(load_config(file.path()).is_err());
    }
}
