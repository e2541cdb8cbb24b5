//! Image provider client.
//!
//! [`ImageProvider`] is the seam the rest of spacesnap talks to;
//! [`ApodClient`] implements it against NASA's APOD HTTP API:
//!
//! ```text
//! GET <endpoint>?api_key=<key>[&date=YYYY-MM-DD]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use reqwest::blocking::{Client, Response};
use reqwest::Url;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::explore::format_date;
use crate::record::ImageRecord;

/// User agent sent with every request.
pub const USER_AGENT: &str = concat!("spacesnap/", env!("CARGO_PKG_VERSION"));

/// Image file extensions kept when naming downloads.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "tif", "tiff"];

/// A source of dated pictures.
pub trait ImageProvider {
    /// Fetch today's picture.
    ///
    /// # Errors
    ///
    /// Returns a fetch error if the provider cannot be reached or refuses.
    fn fetch_today(&self) -> Result<ImageRecord>;

    /// Fetch the picture for `date`.
    ///
    /// # Errors
    ///
    /// Returns a fetch error if the provider cannot be reached or refuses.
    fn fetch_for_date(&self, date: NaiveDate) -> Result<ImageRecord>;

    /// Save the image behind `record` into `dir`, returning the file path.
    ///
    /// # Errors
    ///
    /// Returns a fetch error for non-image records or failed requests, and
    /// an I/O error if the file cannot be written.
    fn download_image(&self, record: &ImageRecord, dir: &Path) -> Result<PathBuf>;
}

/// Blocking client for the APOD endpoint.
#[derive(Debug)]
pub struct ApodClient {
    http: Client,
    endpoint: Url,
    api_key: String,
}

impl ApodClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if no API key is configured or the HTTP client
    /// cannot be built.
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config.api_key()?;
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout())
            .build()?;
        Self::with_client(http, &config.api.endpoint, api_key)
    }

    /// Create a client around an existing `reqwest` client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigValidation`] if `endpoint` is not a URL.
    pub fn with_client(http: Client, endpoint: &str, api_key: impl Into<String>) -> Result<Self> {
        let endpoint = Url::parse(endpoint).map_err(|e| Error::ConfigValidation {
            message: format!("invalid api.endpoint '{endpoint}': {e}"),
        })?;
        Ok(Self {
            http,
            endpoint,
            api_key: api_key.into(),
        })
    }

    /// Build the request URL for today (`None`) or a given date.
    #[must_use]
    pub fn request_url(&self, date: Option<NaiveDate>) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("api_key", &self.api_key);
            if let Some(date) = date {
                query.append_pair("date", &format_date(date));
            }
        }
        url
    }

    fn fetch(&self, date: Option<NaiveDate>) -> Result<ImageRecord> {
        let url = self.request_url(date);
        debug!(
            "Requesting picture for {}",
            date.map_or_else(|| "today".to_string(), format_date)
        );

        let response = check_status(self.http.get(url).send()?)?;
        let record: ImageRecord = response.json()?;
        info!("Fetched \"{}\" ({})", record.title, record.date);
        Ok(record)
    }
}

impl ImageProvider for ApodClient {
    fn fetch_today(&self) -> Result<ImageRecord> {
        self.fetch(None)
    }

    fn fetch_for_date(&self, date: NaiveDate) -> Result<ImageRecord> {
        self.fetch(Some(date))
    }

    fn download_image(&self, record: &ImageRecord, dir: &Path) -> Result<PathBuf> {
        if !record.is_image() {
            return Err(Error::UnsupportedMedia {
                date: record.date.clone(),
                media_type: record.media_type.clone().unwrap_or_default(),
            });
        }

        debug!("Downloading {}", record.url);
        let response = check_status(self.http.get(&record.url).send()?)?;
        let bytes = response.bytes()?;

        if !dir.exists() {
            fs::create_dir_all(dir).map_err(|source| Error::DirectoryCreate {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let path = dir.join(download_file_name(record));
        fs::write(&path, &bytes)?;
        info!("Saved {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }
}

/// Turn a non-success response into [`Error::FetchStatus`].
fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    let message = provider_message(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    });
    Err(Error::fetch_status(status.as_u16(), message))
}

/// Pull the human-readable message out of a provider error body.
///
/// The APOD service answers bad dates with `{"code": 400, "msg": "..."}`
/// and the API gateway answers key problems with
/// `{"error": {"code": "...", "message": "..."}}`.
fn provider_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("msg")
        .or_else(|| value.get("error").and_then(|e| e.get("message")))
        .or_else(|| value.get("error"))
        .and_then(serde_json::Value::as_str)
        .map(str::to_string)
}

/// `APOD_<date>.<ext>`, keeping the extension of the image URL when it is
/// a known image type.
#[must_use]
pub fn download_file_name(record: &ImageRecord) -> String {
    let extension = Url::parse(&record.url)
        .ok()
        .and_then(|url| {
            Path::new(url.path())
                .extension()
                .and_then(|ext| ext.to_str())
                .map(str::to_ascii_lowercase)
        })
        .filter(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or_else(|| "jpg".to_string());
    format!("APOD_{}.{extension}", record.date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::sample_record;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};
    use tempfile::TempDir;

    /// Answer one HTTP request with a canned response; the handle yields the
    /// request line that was received.
    fn serve_once(status: &str, content_type: &str, body: &[u8]) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let status = status.to_string();
        let content_type = content_type.to_string();
        let body = body.to_vec();

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if line == "\r\n" || line.is_empty() {
                    break;
                }
            }
            write!(
                stream,
                "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            )
            .unwrap();
            stream.write_all(&body).unwrap();
            stream.flush().unwrap();
            request_line
        });

        (format!("http://{addr}/planetary/apod"), handle)
    }

    fn client_for(endpoint: &str) -> ApodClient {
        let http = Client::builder().no_proxy().build().unwrap();
        ApodClient::with_client(http, endpoint, "TEST_KEY").unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_request_url_today() {
        let client = client_for("https://api.nasa.gov/planetary/apod");
        let url = client.request_url(None);
        assert_eq!(
            url.as_str(),
            "https://api.nasa.gov/planetary/apod?api_key=TEST_KEY"
        );
    }

    #[test]
    fn test_request_url_with_date() {
        let client = client_for("https://api.nasa.gov/planetary/apod");
        let url = client.request_url(Some(date("2024-01-01")));
        assert_eq!(
            url.as_str(),
            "https://api.nasa.gov/planetary/apod?api_key=TEST_KEY&date=2024-01-01"
        );
    }

    #[test]
    fn test_with_client_rejects_bad_endpoint() {
        let err = ApodClient::with_client(Client::new(), "not a url", "k").unwrap_err();
        assert!(matches!(err, Error::ConfigValidation { .. }));
    }

    #[test]
    fn test_new_requires_api_key() {
        let err = ApodClient::new(&Config::default()).unwrap_err();
        assert!(matches!(err, Error::MissingApiKey { .. }));
    }

    #[test]
    fn test_fetch_for_date_success() {
        let body = br#"{"date":"2024-01-01","title":"T","url":"http://x/img.jpg","explanation":"E","copyright":"C"}"#;
        let (endpoint, server) = serve_once("200 OK", "application/json", body);

        let record = client_for(&endpoint).fetch_for_date(date("2024-01-01")).unwrap();
        let request_line = server.join().unwrap();

        assert_eq!(record.title, "T");
        assert_eq!(record.credit(), Some("C"));
        assert!(request_line.contains("date=2024-01-01"));
        assert!(request_line.contains("api_key=TEST_KEY"));
    }

    #[test]
    fn test_fetch_today_omits_date() {
        let body = br#"{"date":"2024-01-01","title":"T","url":"u","explanation":"E"}"#;
        let (endpoint, server) = serve_once("200 OK", "application/json", body);

        client_for(&endpoint).fetch_today().unwrap();
        let request_line = server.join().unwrap();

        assert!(!request_line.contains("date="));
    }

    #[test]
    fn test_fetch_status_uses_provider_msg() {
        let body = br#"{"code":400,"msg":"Date must be between Jun 16, 1995 and today.","service_version":"v1"}"#;
        let (endpoint, server) = serve_once("400 Bad Request", "application/json", body);

        let err = client_for(&endpoint).fetch_for_date(date("2024-01-01")).unwrap_err();
        server.join().unwrap();

        assert!(err.is_fetch_error());
        match err {
            Error::FetchStatus { status, message } => {
                assert_eq!(status, 400);
                assert!(message.starts_with("Date must be between"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_fetch_status_uses_gateway_message() {
        let body = br#"{"error":{"code":"API_KEY_INVALID","message":"An invalid api_key was supplied."}}"#;
        let (endpoint, server) = serve_once("403 Forbidden", "application/json", body);

        let err = client_for(&endpoint).fetch_today().unwrap_err();
        server.join().unwrap();

        assert!(matches!(
            err,
            Error::FetchStatus { status: 403, ref message } if message.contains("invalid api_key")
        ));
    }

    #[test]
    fn test_fetch_status_without_json_body() {
        let (endpoint, server) = serve_once("502 Bad Gateway", "text/html", b"<html></html>");

        let err = client_for(&endpoint).fetch_today().unwrap_err();
        server.join().unwrap();

        assert!(matches!(
            err,
            Error::FetchStatus { status: 502, ref message } if message == "Bad Gateway"
        ));
    }

    #[test]
    fn test_fetch_malformed_body_is_fetch_error() {
        let (endpoint, server) = serve_once("200 OK", "application/json", b"{\"title\": 1}");

        let err = client_for(&endpoint).fetch_today().unwrap_err();
        server.join().unwrap();

        assert!(err.is_fetch_error());
    }

    #[test]
    fn test_fetch_unreachable_is_fetch_error() {
        // Bind and drop to get a port nothing listens on.
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let client = client_for(&format!("http://127.0.0.1:{port}/apod"));

        let err = client.fetch_today().unwrap_err();
        assert!(matches!(err, Error::Fetch(_)));
    }

    #[test]
    fn test_download_image_writes_file() {
        let (url, server) = serve_once("200 OK", "image/png", b"\x89PNG fake");
        let dir = TempDir::new().unwrap();
        let mut record = sample_record("2024-01-01");
        record.url = format!("{url}/picture.png");

        let path = client_for(&url).download_image(&record, dir.path()).unwrap();
        server.join().unwrap();

        assert_eq!(path, dir.path().join("APOD_2024-01-01.png"));
        assert_eq!(fs::read(&path).unwrap(), b"\x89PNG fake");
    }

    #[test]
    fn test_download_refuses_video() {
        let dir = TempDir::new().unwrap();
        let mut record = sample_record("2024-01-01");
        record.media_type = Some("video".to_string());

        let err = client_for("http://127.0.0.1:9/apod")
            .download_image(&record, dir.path())
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedMedia { .. }));
    }

    #[test]
    fn test_download_file_name() {
        let mut record = sample_record("2024-01-01");
        record.url = "https://apod.nasa.gov/apod/image/2401/Pic.JPEG".to_string();
        assert_eq!(download_file_name(&record), "APOD_2024-01-01.jpeg");

        record.url = "https://www.youtube.com/embed/abc?rel=0".to_string();
        assert_eq!(download_file_name(&record), "APOD_2024-01-01.jpg");

        record.url = "not a url".to_string();
        assert_eq!(download_file_name(&record), "APOD_2024-01-01.jpg");
    }

    #[test]
    fn test_provider_message_variants() {
        assert_eq!(
            provider_message(r#"{"msg":"bad date"}"#).as_deref(),
            Some("bad date")
        );
        assert_eq!(
            provider_message(r#"{"error":{"message":"bad key"}}"#).as_deref(),
            Some("bad key")
        );
        assert_eq!(
            provider_message(r#"{"error":"plain"}"#).as_deref(),
            Some("plain")
        );
        assert!(provider_message("<html>").is_none());
    }
}
