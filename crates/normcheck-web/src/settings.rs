use std::path::PathBuf;
use std::time::Duration;

use normcheck_core::config_file::{
    ConfigFile, DEFAULT_GROBID_URL, DEFAULT_HOST, DEFAULT_MAX_UPLOAD_MB, DEFAULT_PORT,
    DEFAULT_REPORTS_DIR,
};

/// Resolved server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub reports_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub grobid_url: String,
    pub grobid_timeout: Duration,
}

impl ServerSettings {
    /// Environment variables > config file > defaults.
    ///
    /// `env` is the variable lookup, `std::env::var(..).ok()` in production.
    pub fn resolve(file: &ConfigFile, env: impl Fn(&str) -> Option<String>) -> Self {
        let server = file.server.clone().unwrap_or_default();

        let host = env("NORMCHECK_HOST")
            .or(server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = env("NORMCHECK_PORT")
            .and_then(|v| v.parse().ok())
            .or(server.port)
            .unwrap_or(DEFAULT_PORT);
        let reports_dir = env("NORMCHECK_REPORTS_DIR")
            .or(server.reports_dir)
            .unwrap_or_else(|| DEFAULT_REPORTS_DIR.to_string());
        let max_upload_mb = server.max_upload_mb.unwrap_or(DEFAULT_MAX_UPLOAD_MB);

        let grobid_url = env("GROBID_URL")
            .or_else(|| file.grobid_url().map(str::to_string))
            .unwrap_or_else(|| DEFAULT_GROBID_URL.to_string());
        let grobid_timeout = env("GROBID_TIMEOUT")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(|| file.grobid_timeout_secs());

        Self {
            host,
            port,
            reports_dir: PathBuf::from(reports_dir),
            max_upload_bytes: max_upload_mb as usize * 1024 * 1024,
            grobid_url,
            grobid_timeout: Duration::from_secs(grobid_timeout),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use normcheck_core::config_file::{GrobidConfig, ServerConfig};

    #[test]
    fn defaults_without_file_or_env() {
        let s = ServerSettings::resolve(&ConfigFile::default(), |_| None);
        assert_eq!(s.bind_addr(), "127.0.0.1:8000");
        assert_eq!(s.reports_dir, PathBuf::from("archivos_temp"));
        assert_eq!(s.grobid_url, "http://localhost:8070");
        assert_eq!(s.grobid_timeout, Duration::from_secs(30));
        assert_eq!(s.max_upload_bytes, 50 * 1024 * 1024);
    }

    #[test]
    fn env_overrides_file() {
        let file = ConfigFile {
            server: Some(ServerConfig {
                port: Some(9000),
                reports_dir: Some("/srv/reportes".into()),
                ..Default::default()
            }),
            grobid: Some(GrobidConfig {
                url: Some("http://file-grobid:8070".into()),
                timeout_secs: Some(90),
            }),
            ..Default::default()
        };
        let s = ServerSettings::resolve(&file, |key| match key {
            "NORMCHECK_PORT" => Some("9100".into()),
            "GROBID_URL" => Some("http://env-grobid:8070".into()),
            _ => None,
        });
        assert_eq!(s.port, 9100);
        assert_eq!(s.reports_dir, PathBuf::from("/srv/reportes"));
        assert_eq!(s.grobid_url, "http://env-grobid:8070");
        assert_eq!(s.grobid_timeout, Duration::from_secs(90));
    }

    #[test]
    fn unparseable_env_port_falls_through() {
        let s = ServerSettings::resolve(&ConfigFile::default(), |key| {
            (key == "NORMCHECK_PORT").then(|| "ocho mil".to_string())
        });
        assert_eq!(s.port, DEFAULT_PORT);
    }
}
