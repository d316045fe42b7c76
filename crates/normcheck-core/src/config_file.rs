use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const DEFAULT_GROBID_URL: &str = "http://localhost:8070";
pub const DEFAULT_GROBID_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_REPORTS_DIR: &str = "archivos_temp";
pub const DEFAULT_MAX_UPLOAD_MB: u32 = 50;

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub grobid: Option<GrobidConfig>,
    pub server: Option<ServerConfig>,
    pub parsing: Option<ParsingOverrides>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GrobidConfig {
    pub url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub reports_dir: Option<String>,
    pub max_upload_mb: Option<u32>,
}

/// Additions to the built-in parsing word lists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsingOverrides {
    pub extra_heading_tokens: Option<Vec<String>>,
    pub extra_trailing_markers: Option<Vec<String>>,
    pub extra_narrative_prefixes: Option<Vec<String>>,
    pub classifier_sample: Option<usize>,
}

impl ConfigFile {
    pub fn grobid_url(&self) -> Option<&str> {
        self.grobid.as_ref().and_then(|g| g.url.as_deref())
    }

    pub fn grobid_timeout_secs(&self) -> u64 {
        self.grobid
            .as_ref()
            .and_then(|g| g.timeout_secs)
            .unwrap_or(DEFAULT_GROBID_TIMEOUT_SECS)
    }
}

/// Platform config directory path: `<config_dir>/normcheck/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("normcheck").join("config.toml"))
}

/// Load config by cascading CWD `.normcheck.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".normcheck.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparseable config file");
            None
        }
    }
}

fn pick<T>(overlay: Option<T>, base: Option<T>) -> Option<T> {
    overlay.or(base)
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let bg = base.grobid.unwrap_or_default();
    let og = overlay.grobid.unwrap_or_default();
    let bs = base.server.unwrap_or_default();
    let os = overlay.server.unwrap_or_default();
    let bp = base.parsing.unwrap_or_default();
    let op = overlay.parsing.unwrap_or_default();

    ConfigFile {
        grobid: Some(GrobidConfig {
            url: pick(og.url, bg.url),
            timeout_secs: pick(og.timeout_secs, bg.timeout_secs),
        }),
        server: Some(ServerConfig {
            host: pick(os.host, bs.host),
            port: pick(os.port, bs.port),
            reports_dir: pick(os.reports_dir, bs.reports_dir),
            max_upload_mb: pick(os.max_upload_mb, bs.max_upload_mb),
        }),
        parsing: Some(ParsingOverrides {
            extra_heading_tokens: pick(op.extra_heading_tokens, bp.extra_heading_tokens),
            extra_trailing_markers: pick(op.extra_trailing_markers, bp.extra_trailing_markers),
            extra_narrative_prefixes: pick(
                op.extra_narrative_prefixes,
                bp.extra_narrative_prefixes,
            ),
            classifier_sample: pick(op.classifier_sample, bp.classifier_sample),
        }),
    }
}
