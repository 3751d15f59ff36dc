use std::path::PathBuf;

use url::Url;

use crate::error::AppError;

pub const DEFAULT_QUARTER: &str = "AUT2020";
pub const SCHEDULE_BASE_URL: &str = "https://www.washington.edu/students/timeschd/";
pub const DEFAULT_CATALOG_URL: &str = "http://www.washington.edu/students/crscat/";
pub const DEFAULT_LEVEL_LIMIT: u32 = 499;
pub const DEFAULT_JSON_PATH: &str = "data.json";
pub const DEFAULT_CSV_PATH: &str = "data.csv";

/// Highest level a three-digit course number can express.
const MAX_LEVEL: u32 = 999;

/// Configuration for a crawl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlConfig {
    /// Schedule root; department links are resolved against it
    pub root_url: String,
    /// Course catalog root; department links are resolved against it
    pub catalog_url: String,
    /// Courses above this level end a department's scan
    pub level_limit: u32,
    pub json_path: PathBuf,
    pub csv_path: PathBuf,
    /// Abort the crawl on the first department failure instead of skipping it
    pub strict: bool,
}

impl CrawlConfig {
    /// Configuration for a given quarter code, e.g. `"WIN2021"`.
    pub fn for_quarter(quarter: &str) -> Self {
        Self {
            root_url: format!("{SCHEDULE_BASE_URL}{quarter}/"),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        check_base_url("root_url", &self.root_url)?;
        check_base_url("catalog_url", &self.catalog_url)?;
        if self.level_limit > MAX_LEVEL {
            return Err(AppError::ConfigError(format!(
                "Invalid level limit {}: must be at most {MAX_LEVEL}",
                self.level_limit
            )));
        }
        Ok(())
    }

    /// Schedule page URL for a department link.
    pub fn schedule_url(&self, link: &str) -> Result<String, AppError> {
        join(&self.root_url, link)
    }

    /// Catalog page URL for a department link.
    pub fn catalog_url_for(&self, link: &str) -> Result<String, AppError> {
        join(&self.catalog_url, link)
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            root_url: format!("{SCHEDULE_BASE_URL}{DEFAULT_QUARTER}/"),
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            level_limit: DEFAULT_LEVEL_LIMIT,
            json_path: PathBuf::from(DEFAULT_JSON_PATH),
            csv_path: PathBuf::from(DEFAULT_CSV_PATH),
            strict: false,
        }
    }
}

fn check_base_url(field: &str, raw: &str) -> Result<(), AppError> {
    let url = Url::parse(raw)
        .map_err(|e| AppError::ConfigError(format!("Invalid {field} '{raw}': {e}")))?;
    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(AppError::ConfigError(format!(
                "Invalid {field} '{raw}': scheme '{scheme}' is not http/https"
            )));
        }
    }
    if !raw.ends_with('/') {
        return Err(AppError::ConfigError(format!(
            "Invalid {field} '{raw}': must end with '/'"
        )));
    }
    Ok(())
}

fn join(base: &str, link: &str) -> Result<String, AppError> {
    let base = Url::parse(base)
        .map_err(|e| AppError::ConfigError(format!("Invalid base URL '{base}': {e}")))?;
    base.join(link)
        .map(String::from)
        .map_err(|e| AppError::ParseError(format!("Invalid link '{link}': {e}")))
}
