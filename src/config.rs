// config.rs
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "https://api.airtable.com/v0";
pub const DEFAULT_TABLE: &str = "Reins";
pub const DEFAULT_VIEWS: &str = "viwGridView,Grid view,-";
pub const DEFAULT_PROBE_SIZE: u32 = 10;
pub const DEFAULT_PAGE_SIZE: u32 = 100;
pub const DEFAULT_MAX_PAGES: usize = 50;
pub const DEFAULT_PAGE_DELAY_MS: u64 = 200;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 4;
pub const DEFAULT_RETRY_BASE_MS: u64 = 500;
pub const DEFAULT_TIMEOUT_SECS: u64 = 45;
pub const DEFAULT_MIN_TITLE_LEN: usize = 6;

/// Upstream hard limit on records per request.
const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{key} has an invalid value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Latitude/longitude rectangle a coordinate must fall inside (inclusive).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lng_min: f64,
    pub lng_max: f64,
}

impl BoundingBox {
    /// Japan, roughly Okinawa to Hokkaido.
    pub const TARGET_REGION: BoundingBox = BoundingBox {
        lat_min: 24.0,
        lat_max: 46.0,
        lng_min: 123.0,
        lng_max: 146.0,
    };

    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        (self.lat_min..=self.lat_max).contains(&lat) && (self.lng_min..=self.lng_max).contains(&lng)
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::TARGET_REGION
    }
}

/// Knobs that only affect record normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeSettings {
    pub bounds: BoundingBox,
    pub min_title_len: usize,
}

impl Default for NormalizeSettings {
    fn default() -> Self {
        Self {
            bounds: BoundingBox::TARGET_REGION,
            min_title_len: DEFAULT_MIN_TITLE_LEN,
        }
    }
}

/// Knobs that only affect paging and retries.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchSettings {
    pub page_size: u32,
    pub max_pages: usize,
    pub page_delay: Duration,
    pub max_attempts: u32,
    pub retry_base: Duration,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
            page_delay: Duration::from_millis(DEFAULT_PAGE_DELAY_MS),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_base: Duration::from_millis(DEFAULT_RETRY_BASE_MS),
        }
    }
}

/// Everything the pipeline needs, read once at start-up.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub api_url: String,
    pub api_token: String,
    pub base_id: String,
    pub table: String,
    /// Ordered candidates; `None` means "let the upstream pick its default view".
    pub views: Vec<Option<String>>,
    pub probe_size: u32,
    pub request_timeout: Duration,
    pub keep_partial: bool,
    pub fetch: FetchSettings,
    pub normalize: NormalizeSettings,
}

impl IngestConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_token = get("LISTINGS_API_TOKEN").ok_or(ConfigError::Missing("LISTINGS_API_TOKEN"))?;
        let base_id = get("LISTINGS_BASE_ID").ok_or(ConfigError::Missing("LISTINGS_BASE_ID"))?;
        let table = get("LISTINGS_TABLE").unwrap_or_else(|| DEFAULT_TABLE.to_string());
        let api_url = get("LISTINGS_API_URL")
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        if url::Url::parse(&api_url).is_err() {
            return Err(ConfigError::Invalid {
                key: "LISTINGS_API_URL",
                value: api_url,
                reason: "not an absolute URL".into(),
            });
        }

        // Read raw so an explicitly empty entry survives as the default-view sentinel.
        let views_raw = lookup("LISTINGS_VIEWS").unwrap_or_else(|| DEFAULT_VIEWS.to_string());
        let views = parse_views(&views_raw);

        let page_size: u32 = parse_or("LISTINGS_PAGE_SIZE", get("LISTINGS_PAGE_SIZE"), DEFAULT_PAGE_SIZE)?;
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(invalid("LISTINGS_PAGE_SIZE", page_size, "must be between 1 and 100"));
        }

        let probe_size: u32 = parse_or("LISTINGS_PROBE_SIZE", get("LISTINGS_PROBE_SIZE"), DEFAULT_PROBE_SIZE)?;
        if probe_size == 0 || probe_size > MAX_PAGE_SIZE {
            return Err(invalid("LISTINGS_PROBE_SIZE", probe_size, "must be between 1 and 100"));
        }

        let max_pages: usize = parse_or("LISTINGS_MAX_PAGES", get("LISTINGS_MAX_PAGES"), DEFAULT_MAX_PAGES)?;
        if max_pages == 0 {
            return Err(invalid("LISTINGS_MAX_PAGES", max_pages, "must be at least 1"));
        }

        let max_attempts: u32 = parse_or("LISTINGS_MAX_ATTEMPTS", get("LISTINGS_MAX_ATTEMPTS"), DEFAULT_MAX_ATTEMPTS)?;
        if max_attempts == 0 {
            return Err(invalid("LISTINGS_MAX_ATTEMPTS", max_attempts, "must be at least 1"));
        }

        let page_delay_ms: u64 =
            parse_or("LISTINGS_PAGE_DELAY_MS", get("LISTINGS_PAGE_DELAY_MS"), DEFAULT_PAGE_DELAY_MS)?;
        let retry_base_ms: u64 =
            parse_or("LISTINGS_RETRY_BASE_MS", get("LISTINGS_RETRY_BASE_MS"), DEFAULT_RETRY_BASE_MS)?;
        let timeout_secs: u64 = parse_or("LISTINGS_TIMEOUT_SECS", get("LISTINGS_TIMEOUT_SECS"), DEFAULT_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(invalid("LISTINGS_TIMEOUT_SECS", timeout_secs, "must be at least 1"));
        }

        let min_title_len: usize =
            parse_or("LISTINGS_MIN_TITLE_LEN", get("LISTINGS_MIN_TITLE_LEN"), DEFAULT_MIN_TITLE_LEN)?;
        if min_title_len == 0 {
            return Err(invalid("LISTINGS_MIN_TITLE_LEN", min_title_len, "must be at least 1"));
        }

        let bounds = match get("LISTINGS_BBOX") {
            Some(raw) => parse_bbox(&raw)?,
            None => BoundingBox::TARGET_REGION,
        };

        let keep_partial = match get("LISTINGS_KEEP_PARTIAL") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| invalid("LISTINGS_KEEP_PARTIAL", raw, "expected true/false"))?,
            None => false,
        };

        Ok(Self {
            api_url,
            api_token,
            base_id,
            table,
            views,
            probe_size,
            request_timeout: Duration::from_secs(timeout_secs),
            keep_partial,
            fetch: FetchSettings {
                page_size,
                max_pages,
                page_delay: Duration::from_millis(page_delay_ms),
                max_attempts,
                retry_base: Duration::from_millis(retry_base_ms),
            },
            normalize: NormalizeSettings {
                bounds,
                min_title_len,
            },
        })
    }
}

fn invalid(key: &'static str, value: impl ToString, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_or<T: std::str::FromStr>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        Some(v) => v.parse().map_err(|_| invalid(key, v, "not a number")),
        None => Ok(default),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// `"a,b,,-"` -> `[Some(a), Some(b), None]`. Repeats are dropped, first position wins.
/// An empty list still probes the default view.
pub fn parse_views(raw: &str) -> Vec<Option<String>> {
    let mut views: Vec<Option<String>> = Vec::new();
    for v in raw.split(',').map(str::trim) {
        let view = match v {
            "" | "-" => None,
            other => Some(other.to_string()),
        };
        if !views.contains(&view) {
            views.push(view);
        }
    }

    if views.is_empty() {
        views.push(None);
    }
    views
}

fn parse_bbox(raw: &str) -> Result<BoundingBox, ConfigError> {
    let parts: Result<Vec<f64>, _> = raw.split(',').map(|p| p.trim().parse::<f64>()).collect();
    let parts = parts.map_err(|_| invalid("LISTINGS_BBOX", raw, "expected four numbers"))?;

    let [lat_min, lat_max, lng_min, lng_max] = parts[..] else {
        return Err(invalid("LISTINGS_BBOX", raw, "expected lat_min,lat_max,lng_min,lng_max"));
    };

    if !(lat_min < lat_max && lng_min < lng_max) {
        return Err(invalid("LISTINGS_BBOX", raw, "minimums must be below maximums"));
    }

    Ok(BoundingBox {
        lat_min,
        lat_max,
        lng_min,
        lng_max,
    })
}
