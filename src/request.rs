//! Incoming HTTP request type.

use bytes::Bytes;
use http::{HeaderMap, Method, Uri, Version};

/// An incoming HTTP request, with its body fully read and the peer address
/// attached.
pub struct Request {
    pub(crate) method: Method,
    pub(crate) uri: Uri,
    pub(crate) request_uri: String,
    pub(crate) version: Version,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Bytes,
    pub(crate) remote_addr: String,
}

impl Request {
    /// Wraps an `http::Request` together with the peer address it came from
    /// (e.g. `"127.0.0.1:5000"` or `"[::1]:5000"`).
    ///
    /// ```rust
    /// use accesslog::Request;
    /// use bytes::Bytes;
    ///
    /// let req = http::Request::builder()
    ///     .uri("/ping")
    ///     .body(Bytes::new())
    ///     .unwrap();
    /// let req = Request::new(req, "127.0.0.1:5000");
    /// assert_eq!(req.remote_ip(), "127.0.0.1");
    /// ```
    pub fn new(req: http::Request<Bytes>, remote_addr: impl Into<String>) -> Self {
        let (parts, body) = req.into_parts();
        Self {
            request_uri: request_target(&parts.uri, parts.version),
            method: parts.method,
            uri: parts.uri,
            version: parts.version,
            headers: parts.headers,
            body,
            remote_addr: remote_addr.into(),
        }
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn uri(&self) -> &Uri { &self.uri }
    pub fn version(&self) -> Version { self.version }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }
    pub fn remote_addr(&self) -> &str { &self.remote_addr }

    /// The request target exactly as the client sent it, e.g. `/search?q=rust`.
    pub fn request_uri(&self) -> &str { &self.request_uri }

    /// Case-insensitive header lookup. Values that are not visible ASCII are
    /// treated as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// `Referer` header, or `""`.
    pub fn referer(&self) -> &str {
        self.header("referer").unwrap_or("")
    }

    /// `User-Agent` header, or `""`.
    pub fn user_agent(&self) -> &str {
        self.header("user-agent").unwrap_or("")
    }

    /// Protocol string as it appears on the request line.
    pub fn proto(&self) -> &'static str {
        match self.version {
            Version::HTTP_09 => "HTTP/0.9",
            Version::HTTP_10 => "HTTP/1.0",
            Version::HTTP_2  => "HTTP/2.0",
            Version::HTTP_3  => "HTTP/3.0",
            _                => "HTTP/1.1",
        }
    }

    /// Host part of the peer address. Empty when the address carries no port
    /// or cannot be split.
    pub fn remote_ip(&self) -> &str {
        split_host(&self.remote_addr)
    }

    /// Username from the URL user-info (`http://alice@host/`), if non-empty.
    ///
    /// Origin-form request targets (`/path`) never carry one.
    pub fn username(&self) -> Option<&str> {
        let (userinfo, _) = self.uri.authority()?.as_str().rsplit_once('@')?;
        let name = userinfo.split_once(':').map_or(userinfo, |(name, _)| name);
        (!name.is_empty()).then_some(name)
    }
}

/// The request target as it appeared on the request line.
///
/// HTTP/2 and HTTP/3 have no request line; hyper rebuilds an absolute URI
/// from the `:scheme`, `:authority` and `:path` pseudo-headers, so only the
/// `:path` part is the target. HTTP/1.x keeps what the client sent, including
/// absolute-form.
fn request_target(uri: &Uri, version: Version) -> String {
    match version {
        Version::HTTP_2 | Version::HTTP_3 => uri
            .path_and_query()
            .map_or_else(|| "/".to_owned(), |pq| pq.as_str().to_owned()),
        _ => uri.to_string(),
    }
}

/// Splits `host:port`, `[host]:port` or `[v6%zone]:port` and returns the host.
///
/// Anything else (no port, stray brackets, an unbracketed IPv6 literal) yields
/// `""` so callers can render a placeholder instead of failing.
fn split_host(addr: &str) -> &str {
    if let Some(rest) = addr.strip_prefix('[') {
        return match rest.split_once("]:") {
            Some((host, port)) if !host.contains(['[', ']']) && !port.contains([':', '[', ']']) => host,
            _ => "",
        };
    }

    match addr.rsplit_once(':') {
        Some((host, _)) if !host.contains([':', '[', ']']) => host,
        _ => "",
    }
}
