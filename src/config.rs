use anyhow::Result;
use std::env;

use crate::s3::key::normalize_prefix;

/// Resolved configuration for one upload run.
///
/// Values come from the environment (and a `.env` file when present); CLI
/// flags override individual fields before validation.
#[derive(Debug, Clone)]
pub struct Config {
    pub region: String,
    pub profile: Option<String>,
    pub bucket: String,
    /// Prefix under which objects are stored; empty means the bucket root.
    pub context_path: String,
    /// Default source paths used when the CLI supplies none.
    pub sources: Vec<String>,
    /// Remove existing objects under the context path before uploading.
    pub cleanup: bool,
    /// Overwrite objects that already exist at the destination key.
    pub overwrite: bool,
    /// Custom S3-compatible endpoint URL.
    pub endpoint: Option<String>,
    /// Path-style addressing, required by providers like MinIO.
    pub force_path_style: bool,
}

impl Config {
    /// Load configuration from environment variables and a `.env` file.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok(); // Load .env file if it exists

        let region = env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string());
        let profile = env::var("AWS_PROFILE").ok().filter(|p| !p.trim().is_empty());
        let bucket = env::var("S3_BUCKET").unwrap_or_default().trim().to_string();
        let context_path = normalize_prefix(&env::var("S3_CONTEXT_PATH").unwrap_or_default());
        let sources = split_sources(&env::var("S3_SOURCES").unwrap_or_default());
        let endpoint = env::var("S3_ENDPOINT").ok().filter(|e| !e.trim().is_empty());

        let cleanup = parse_bool_env("S3_CLEANUP")?.unwrap_or(false);
        let overwrite = parse_bool_env("S3_OVERWRITE")?.unwrap_or(true);
        let force_path_style = parse_bool_env("S3_FORCE_PATH_STYLE")?.unwrap_or(false);

        Ok(Self {
            region,
            profile,
            bucket,
            context_path,
            sources,
            cleanup,
            overwrite,
            endpoint,
            force_path_style,
        })
    }

    /// Ensure the configuration is complete and well-formed. Called after
    /// CLI overrides have been applied.
    pub fn validate(&self) -> Result<()> {
        Self::validate_region(&self.region)?;
        Self::validate_bucket_name(&self.bucket)?;
        Self::validate_context_path(&self.context_path)?;
        Ok(())
    }

    /// Validate AWS region format
    fn validate_region(region: &str) -> Result<()> {
        if region.is_empty() {
            anyhow::bail!("region cannot be empty");
        }

        // Basic validation - ensure it looks like a region (contains a dash)
        if !region.contains('-') {
            anyhow::bail!(
                "region '{}' doesn't look like a valid region (e.g., us-west-2, eu-west-1)",
                region
            );
        }

        Ok(())
    }

    /// Validate S3 bucket name according to AWS rules
    fn validate_bucket_name(bucket: &str) -> Result<()> {
        if bucket.is_empty() {
            anyhow::bail!("bucket is required (set S3_BUCKET or pass --bucket)");
        }

        if bucket.len() < 3 || bucket.len() > 63 {
            anyhow::bail!(
                "bucket '{}' must be between 3 and 63 characters (got {})",
                bucket,
                bucket.len()
            );
        }

        let first = bucket.chars().next().unwrap();
        let last = bucket.chars().last().unwrap();
        if !first.is_ascii_lowercase() && !first.is_ascii_digit() {
            anyhow::bail!("bucket '{}' must start with a lowercase letter or number", bucket);
        }
        if !last.is_ascii_lowercase() && !last.is_ascii_digit() {
            anyhow::bail!("bucket '{}' must end with a lowercase letter or number", bucket);
        }

        for c in bucket.chars() {
            if !c.is_ascii_lowercase() && !c.is_ascii_digit() && c != '-' && c != '.' {
                anyhow::bail!(
                    "bucket '{}' contains invalid character '{}'. Only lowercase letters, numbers, hyphens, and periods are allowed",
                    bucket,
                    c
                );
            }
        }

        if bucket.contains("..") {
            anyhow::bail!("bucket '{}' cannot contain consecutive periods", bucket);
        }

        // IP address format is not allowed
        if bucket
            .split('.')
            .all(|part| part.parse::<u8>().is_ok() && !part.is_empty())
        {
            anyhow::bail!("bucket '{}' cannot be formatted as an IP address", bucket);
        }

        Ok(())
    }

    /// Validate the context path (already normalized; empty is fine)
    fn validate_context_path(path: &str) -> Result<()> {
        if path.is_empty() {
            return Ok(());
        }

        if path.contains("//") {
            anyhow::bail!("context path '{}' contains consecutive slashes (not allowed)", path);
        }

        if path.split('/').any(|segment| segment == "..") {
            anyhow::bail!("context path '{}' contains '..' (not allowed)", path);
        }

        Ok(())
    }
}

fn split_sources(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|entry| entry.trim())
        .filter(|entry| !entry.is_empty())
        .map(|entry| entry.to_string())
        .collect()
}

/// Parse a boolean environment variable; unset or blank means `None`.
fn parse_bool_env(name: &str) -> Result<Option<bool>> {
    let Ok(raw) = env::var(name) else {
        return Ok(None);
    };
    let value = raw.trim().to_ascii_lowercase();
    if value.is_empty() {
        return Ok(None);
    }
    match value.as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        _ => anyhow::bail!("{} must be a boolean, got '{}'", name, raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_name_validation() {
        // Valid bucket names
        assert!(Config::validate_bucket_name("my-bucket").is_ok());
        assert!(Config::validate_bucket_name("my.bucket.123").is_ok());
        assert!(Config::validate_bucket_name("abc").is_ok());
        assert!(Config::validate_bucket_name("my-bucket-name-123").is_ok());

        // Invalid bucket names
        assert!(Config::validate_bucket_name("ab").is_err()); // Too short
        assert!(Config::validate_bucket_name(&"a".repeat(64)).is_err()); // Too long
        assert!(Config::validate_bucket_name("MY-BUCKET").is_err()); // Uppercase
        assert!(Config::validate_bucket_name("my_bucket").is_err()); // Underscore
        assert!(Config::validate_bucket_name("-mybucket").is_err()); // Starts with dash
        assert!(Config::validate_bucket_name("mybucket-").is_err()); // Ends with dash
        assert!(Config::validate_bucket_name("my..bucket").is_err()); // Consecutive periods
        assert!(Config::validate_bucket_name("192.168.1.1").is_err()); // IP address format
        assert!(Config::validate_bucket_name("").is_err()); // Empty
    }

    #[test]
    fn test_region_validation() {
        assert!(Config::validate_region("us-west-2").is_ok());
        assert!(Config::validate_region("eu-west-1").is_ok());

        assert!(Config::validate_region("").is_err()); // Empty
        assert!(Config::validate_region("uswest2").is_err()); // No dash
    }

    #[test]
    fn test_context_path_validation() {
        assert!(Config::validate_context_path("").is_ok());
        assert!(Config::validate_context_path("uploads").is_ok());
        assert!(Config::validate_context_path("uploads/videos").is_ok());

        assert!(Config::validate_context_path("uploads//videos").is_err());
        assert!(Config::validate_context_path("../uploads").is_err());
        assert!(Config::validate_context_path("a/../b").is_err());
    }

    #[test]
    fn test_from_env_defaults() {
        // from_env owns the .env load; with nothing configured the
        // defaults apply and the region falls back to us-east-1.
        let config = Config::from_env().unwrap();
        assert!(!config.cleanup);
        assert!(config.overwrite);
        assert!(!config.force_path_style);
        assert!(!config.region.is_empty());
    }

    #[test]
    fn test_split_sources() {
        assert_eq!(
            split_sources("dist, build/out ,"),
            vec!["dist".to_string(), "build/out".to_string()]
        );
        assert!(split_sources("").is_empty());
        assert!(split_sources(" , ,").is_empty());
    }
}
