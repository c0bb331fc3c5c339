//! Backend URL resolution.
//!
//! One base URL configures everything: REST commands are joined onto it and
//! the state stream lives at `ws(s)://<same host>/ws`.

use url::Url;

use crate::constants::STREAM_PATH;

#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    #[error("invalid backend URL: {0}")]
    Parse(#[from] url::ParseError),
    #[error("unsupported URL scheme {0:?} (expected http or https)")]
    UnsupportedScheme(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
    http: Url,
    stream: Url,
}

impl Endpoints {
    pub fn from_base(base: &str) -> Result<Self, EndpointError> {
        let mut http = Url::parse(base)?;
        let stream_scheme = match http.scheme() {
            "http" => "ws",
            "https" => "wss",
            other => return Err(EndpointError::UnsupportedScheme(other.to_string())),
        };

        // Keep any path prefix when joining relative paths.
        if !http.path().ends_with('/') {
            let path = format!("{}/", http.path());
            http.set_path(&path);
        }

        let mut stream = http.join(STREAM_PATH)?;
        stream
            .set_scheme(stream_scheme)
            .map_err(|()| EndpointError::UnsupportedScheme(stream_scheme.to_string()))?;

        Ok(Self { http, stream })
    }

    pub fn http_base(&self) -> &Url {
        &self.http
    }

    pub fn stream_url(&self) -> &Url {
        &self.stream
    }

    /// Resolve a REST path like `/api/system/state`.
    pub fn command_url(&self, path: &str) -> Result<Url, EndpointError> {
        Ok(self.http.join(path.trim_start_matches('/'))?)
    }
}
