//! Minimal HTTP/1.1 server imitating the community site and its CDN for integration tests.
//!
//! Routes:
//! - `POST /id/<user>/screenshots/screenshots` serves listing page `p` (1-based) from the form body;
//! - `GET /sharedfiles/filedetails/?id=<id>` serves a detail page with asset and app anchors;
//! - `GET /akamaihd/ugc/<id>/` serves the image bytes with a Content-Disposition header.
//!
//! Anything else is a 404.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Shot {
    pub id: String,
    pub app: String,
    pub content_disposition: String,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct Site {
    pub username: String,
    /// Listing bodies, page 1 first. Pages past the end are served empty.
    pub pages: Vec<String>,
    pub shots: Vec<Shot>,
}

/// Running server; `requests` records `METHOD path` for every request served.
pub struct Server {
    pub base_url: String,
    pub requests: Arc<Mutex<Vec<String>>>,
}

/// Starts a server in a background thread. Runs until the process exits.
pub fn start(site: Site) -> Server {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let base_url = format!("http://127.0.0.1:{}", port);
    let site = Arc::new(site);
    let requests = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&requests);
    let base = base_url.clone();
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let site = Arc::clone(&site);
            let log = Arc::clone(&log);
            let base = base.clone();
            thread::spawn(move || handle(stream, &site, &base, &log));
        }
    });
    Server { base_url, requests }
}

/// Listing body with click handlers for `ids`; `last` appends the end marker.
pub fn listing_page(ids: &[&str], last: bool) -> String {
    let mut html = String::from("<div class=\"imageWallRow\">\n");
    for id in ids {
        html.push_str(&format!(
            "<a href=\"#\" onclick=\"OnScreenshotClicked( {} ); return false;\"><img/></a>\n",
            id
        ));
    }
    html.push_str("</div>\n");
    if last {
        html.push_str("<div id=\"EndOfInfiniteContent\"></div>\n");
    }
    html
}

struct Request {
    method: String,
    target: String,
    body: String,
}

fn handle(mut stream: TcpStream, site: &Site, base: &str, log: &Mutex<Vec<String>>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let Some(req) = read_request(&mut stream) else {
        return;
    };
    log.lock()
        .unwrap()
        .push(format!("{} {}", req.method, req.target));

    let listing = format!("/id/{}/screenshots/screenshots", site.username);
    if req.method == "POST" && req.target == listing {
        let page = form_value(&req.body, "p")
            .and_then(|p| p.parse::<usize>().ok())
            .unwrap_or(0);
        let body = page
            .checked_sub(1)
            .and_then(|i| site.pages.get(i))
            .cloned()
            .unwrap_or_default();
        respond(&mut stream, "200 OK", &[("Content-Type", "text/html")], body.as_bytes());
        return;
    }

    if req.method == "GET" {
        if let Some(id) = req.target.strip_prefix("/sharedfiles/filedetails/?id=") {
            if let Some(shot) = site.shots.iter().find(|s| s.id == id) {
                let html = format!(
                    "<div class=\"apphub_HeaderTop\">\
                     <a href=\"https://steamcommunity.com/app/480\">{}</a></div>\n\
                     <div class=\"actualmediactn\">\
                     <a href=\"{}/akamaihd/ugc/{}/\" target=\"_blank\"><img/></a></div>\n",
                    shot.app, base, shot.id
                );
                respond(&mut stream, "200 OK", &[("Content-Type", "text/html")], html.as_bytes());
                return;
            }
        }
        if let Some(rest) = req.target.strip_prefix("/akamaihd/ugc/") {
            let id = rest.trim_end_matches('/');
            if let Some(shot) = site.shots.iter().find(|s| s.id == id) {
                respond(
                    &mut stream,
                    "200 OK",
                    &[
                        ("Content-Type", "image/png"),
                        ("Content-Disposition", shot.content_disposition.as_str()),
                    ],
                    &shot.body,
                );
                return;
            }
        }
    }

    respond(&mut stream, "404 Not Found", &[], b"not found");
}

fn respond(stream: &mut TcpStream, status: &str, headers: &[(&str, &str)], body: &[u8]) {
    let mut head = format!("HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n", status, body.len());
    for (k, v) in headers {
        head.push_str(&format!("{}: {}\r\n", k, v));
    }
    head.push_str("\r\n");
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
}

/// Reads the request head and, for bodies with Content-Length, the full body.
fn read_request(stream: &mut TcpStream) -> Option<Request> {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    let head_end = loop {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buf[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = std::str::from_utf8(&data[..head_end]).ok()?.to_string();
    let mut lines = head.lines();
    let mut parts = lines.next()?.split_whitespace();
    let method = parts.next()?.to_string();
    let target = parts.next()?.to_string();
    let headers: HashMap<String, String> = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .get("content-length")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0);
    if headers
        .get("expect")
        .is_some_and(|v| v.eq_ignore_ascii_case("100-continue"))
    {
        let _ = stream.write_all(b"HTTP/1.1 100 Continue\r\n\r\n");
    }
    while data.len() < head_end + content_length {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);
    }
    let body = String::from_utf8_lossy(&data[head_end..]).into_owned();
    Some(Request {
        method,
        target,
        body,
    })
}

fn form_value<'a>(body: &'a str, key: &str) -> Option<&'a str> {
    body.split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v)
}
