//! Blocking HTTP transport.
//!
//! Uses the curl crate (libcurl easy interface). Every request reads the whole
//! body into memory; callers decide what a non-2xx status means via
//! [`HttpResponse::error_for_status`].

use anyhow::{Context, Result};
use std::str;
use std::time::Duration;

use crate::config::Settings;
use crate::error::ScrapeError;

/// A fully read HTTP response.
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: u32,
    /// Header lines of the final response (after redirects), in arrival order.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// First header named `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Fails with [`ScrapeError::Http`] unless the status is 2xx.
    pub fn error_for_status(self, url: &str) -> Result<Self, ScrapeError> {
        if (200..300).contains(&self.status) {
            Ok(self)
        } else {
            Err(ScrapeError::Http {
                url: url.to_string(),
                status: self.status,
            })
        }
    }

    /// Body as UTF-8 text.
    pub fn text(&self, url: &str) -> Result<&str, ScrapeError> {
        str::from_utf8(&self.body).map_err(|_| ScrapeError::Body {
            url: url.to_string(),
        })
    }
}

/// Transport seam between the pipeline stages and the network.
pub trait Fetch {
    fn get(&self, url: &str) -> Result<HttpResponse>;

    /// POST `fields` as `application/x-www-form-urlencoded`.
    fn post_form(&self, url: &str, fields: &[(&str, String)]) -> Result<HttpResponse>;
}

/// Encode form fields in order, e.g. `appid=0&p=1`.
pub fn encode_form(fields: &[(&str, String)]) -> String {
    let mut form = url::form_urlencoded::Serializer::new(String::new());
    for (name, value) in fields {
        form.append_pair(name, value);
    }
    form.finish()
}

/// libcurl-backed [`Fetch`]. One easy handle per request.
#[derive(Debug, Clone, Default)]
pub struct CurlFetcher {
    user_agent: Option<String>,
    connect_timeout: Option<Duration>,
    timeout: Option<Duration>,
}

impl CurlFetcher {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            user_agent: settings.user_agent.clone(),
            connect_timeout: settings.connect_timeout_secs.map(Duration::from_secs),
            timeout: settings.timeout_secs.map(Duration::from_secs),
        }
    }

    fn easy(&self, url: &str) -> Result<curl::easy::Easy> {
        let mut easy = curl::easy::Easy::new();
        easy.url(url).context("invalid URL")?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        if let Some(ua) = &self.user_agent {
            easy.useragent(ua)?;
        }
        if let Some(t) = self.connect_timeout {
            easy.connect_timeout(t)?;
        }
        if let Some(t) = self.timeout {
            easy.timeout(t)?;
        }
        Ok(easy)
    }

    fn perform(&self, mut easy: curl::easy::Easy, method: &str, url: &str) -> Result<HttpResponse> {
        let mut headers: Vec<(String, String)> = Vec::new();
        let mut body: Vec<u8> = Vec::new();

        {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    let line = s.trim_end();
                    // A new status line starts the next response of a redirect chain.
                    if line.starts_with("HTTP/") {
                        headers.clear();
                    } else if let Some(h) = parse_header_line(line) {
                        headers.push(h);
                    }
                }
                true
            })?;
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer
                .perform()
                .map_err(ScrapeError::Transport)
                .with_context(|| format!("{} {} failed", method, url))?;
        }

        let status = easy.response_code().context("no response code")?;
        tracing::debug!(method, url, status, bytes = body.len(), "request finished");
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

impl Fetch for CurlFetcher {
    fn get(&self, url: &str) -> Result<HttpResponse> {
        let easy = self.easy(url)?;
        self.perform(easy, "GET", url)
    }

    fn post_form(&self, url: &str, fields: &[(&str, String)]) -> Result<HttpResponse> {
        let mut easy = self.easy(url)?;
        let form = encode_form(fields);
        easy.post(true)?;
        easy.post_fields_copy(form.as_bytes())?;
        self.perform(easy, "POST", url)
    }
}

/// Split a raw `Name: value` header line. Empty and malformed lines yield None.
fn parse_header_line(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let (name, value) = line.split_once(':')?;
    Some((name.trim().to_string(), value.trim().to_string()))
}
