//! Access log lines
//!
//! One entry per request on either listener, rendered as nginx-style
//! `combined` or `common`, one JSON object per line, or a `$variable` pattern.

use chrono::Local;
use std::time::Duration;

const CLF_TIME: &str = "%d/%b/%Y:%H:%M:%S %z";

#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    /// `viewer` or `manager`
    pub surface: &'static str,
    /// Peer IP without the port
    pub remote_addr: String,
    pub time: chrono::DateTime<Local>,
    pub method: String,
    pub path: String,
    /// Raw query string, e.g. the resolve endpoint's `part_number=...`
    pub query: Option<String>,
    pub http_version: String,
    pub status: u16,
    pub body_bytes: usize,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    /// Time from request start to response, in microseconds
    pub request_time_us: u64,
}

impl AccessLogEntry {
    /// Entry stamped now; status and sizes are filled in after the response
    pub fn new(surface: &'static str, remote_addr: String, method: String, path: String) -> Self {
        Self {
            surface,
            remote_addr,
            time: Local::now(),
            method,
            path,
            query: None,
            http_version: "1.1".to_string(),
            status: 200,
            body_bytes: 0,
            referer: None,
            user_agent: None,
            request_time_us: 0,
        }
    }

    /// Render with a named format, or treat `format` as a `$variable` pattern
    pub fn format(&self, format: &str) -> String {
        match format {
            "combined" => self.format_combined(),
            "common" => self.format_common(),
            "json" => self.format_json(),
            custom => self.format_custom(custom),
        }
    }

    fn request_uri(&self) -> String {
        match &self.query {
            Some(q) => format!("{}?{q}", self.path),
            None => self.path.clone(),
        }
    }

    /// `$remote_addr - - [$time_local] "$request" $status $body_bytes_sent`
    fn format_common(&self) -> String {
        format!(
            "{} - - [{}] \"{} {} HTTP/{}\" {} {}",
            self.remote_addr,
            self.time.format(CLF_TIME),
            self.method,
            self.request_uri(),
            self.http_version,
            self.status,
            self.body_bytes,
        )
    }

    /// Common format plus `"$http_referer" "$http_user_agent"`
    fn format_combined(&self) -> String {
        format!(
            "{} \"{}\" \"{}\"",
            self.format_common(),
            self.referer.as_deref().unwrap_or("-"),
            self.user_agent.as_deref().unwrap_or("-"),
        )
    }

    fn format_json(&self) -> String {
        serde_json::json!({
            "surface": self.surface,
            "remote_addr": self.remote_addr,
            "time": self.time.to_rfc3339(),
            "method": self.method,
            "path": self.path,
            "query": self.query,
            "http_version": self.http_version,
            "status": self.status,
            "body_bytes": self.body_bytes,
            "referer": self.referer,
            "user_agent": self.user_agent,
            "request_time_us": self.request_time_us,
        })
        .to_string()
    }

    /// `$surface`, `$remote_addr`, `$time_local`, `$time_iso8601`, `$request`,
    /// `$request_method`, `$request_uri`, `$status`, `$body_bytes_sent`,
    /// `$http_referer`, `$http_user_agent` and `$request_time` (seconds)
    fn format_custom(&self, pattern: &str) -> String {
        let request_uri = self.request_uri();
        let request_line = format!("{} {request_uri} HTTP/{}", self.method, self.http_version);
        let request_time = Duration::from_micros(self.request_time_us).as_secs_f64();

        // Longer names first: $request_time, $request_method and $request_uri
        // all start with $request
        let substitutions: [(&str, String); 12] = [
            ("$surface", self.surface.to_string()),
            ("$remote_addr", self.remote_addr.clone()),
            ("$time_local", self.time.format(CLF_TIME).to_string()),
            ("$time_iso8601", self.time.to_rfc3339()),
            ("$request_time", format!("{request_time:.3}")),
            ("$request_method", self.method.clone()),
            ("$request_uri", request_uri),
            ("$request", request_line),
            ("$status", self.status.to_string()),
            ("$body_bytes_sent", self.body_bytes.to_string()),
            ("$http_referer", self.referer.clone().unwrap_or_else(|| "-".into())),
            ("$http_user_agent", self.user_agent.clone().unwrap_or_else(|| "-".into())),
        ];

        substitutions
            .iter()
            .fold(pattern.to_string(), |acc, (var, value)| acc.replace(var, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_entry() -> AccessLogEntry {
        let mut entry = AccessLogEntry::new(
            "viewer",
            "127.0.0.1".to_string(),
            "GET".to_string(),
            "/lightup".to_string(),
        );
        entry.query = Some("part_number=SPX3819M5-3.3".to_string());
        entry.status = 200;
        entry.body_bytes = 412;
        entry.referer = Some("http://127.0.0.1:5000/".to_string());
        entry.user_agent = Some("Mozilla/5.0".to_string());
        entry.request_time_us = 1600;
        entry
    }

    #[test]
    fn test_format_combined() {
        let log = lookup_entry().format("combined");
        assert!(log.starts_with("127.0.0.1 - - ["));
        assert!(log.contains("\"GET /lightup?part_number=SPX3819M5-3.3 HTTP/1.1\" 200 412"));
        assert!(log.ends_with("\"http://127.0.0.1:5000/\" \"Mozilla/5.0\""));
    }

    #[test]
    fn test_format_common() {
        let log = lookup_entry().format("common");
        assert!(log.contains("\"GET /lightup?part_number=SPX3819M5-3.3 HTTP/1.1\" 200 412"));
        assert!(!log.contains("Mozilla"));
    }

    #[test]
    fn test_format_json() {
        let log = lookup_entry().format("json");
        let value: serde_json::Value = serde_json::from_str(&log).unwrap();
        assert_eq!(value["surface"], "viewer");
        assert_eq!(value["path"], "/lightup");
        assert_eq!(value["status"], 200);
        assert_eq!(value["body_bytes"], 412);
    }

    #[test]
    fn test_format_custom() {
        let log = lookup_entry().format("$surface $request_method $request_uri $status $request_time");
        assert_eq!(
            log,
            "viewer GET /lightup?part_number=SPX3819M5-3.3 200 0.002"
        );
    }

    #[test]
    fn test_format_custom_request_line() {
        let mut entry = lookup_entry();
        entry.query = None;
        assert_eq!(entry.format("[$request]"), "[GET /lightup HTTP/1.1]");
    }
}
