//! package
//!
//! Downloading a release package to record its content hash.
//!
//! The catalog entry may carry the SHA-256 of the package at its download
//! URL so clients can verify what they fetch. The bytes are hashed in
//! memory and discarded.

use sha2::{Digest, Sha256};
use thiserror::Error;

/// Errors from fetching a package.
#[derive(Debug, Error)]
pub enum PackageError {
    #[error("failed to download '{url}': {message}")]
    Download { url: String, message: String },

    #[error("download of '{url}' returned HTTP {status}")]
    Status { url: String, status: u16 },
}

/// A downloaded package's digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDigest {
    /// Lowercase hex SHA-256
    pub sha256: String,
    /// Size in bytes
    pub size: usize,
}

/// Lowercase hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Download `url` and hash the body.
pub async fn fetch_digest(
    client: &reqwest::Client,
    url: &str,
) -> Result<PackageDigest, PackageError> {
    let download_err = |e: reqwest::Error| PackageError::Download {
        url: url.to_string(),
        message: e.to_string(),
    };

    let response = client.get(url).send().await.map_err(download_err)?;
    let status = response.status();
    if !status.is_success() {
        return Err(PackageError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.bytes().await.map_err(download_err)?;
    Ok(PackageDigest {
        sha256: sha256_hex(&body),
        size: body.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn known_digest() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[tokio::test]
    async fn hashes_downloaded_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/releases/mod.zip"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"abc".to_vec()))
            .mount(&server)
            .await;

        let digest = fetch_digest(
            &reqwest::Client::new(),
            &format!("{}/releases/mod.zip", server.uri()),
        )
        .await
        .unwrap();

        assert_eq!(digest.sha256, sha256_hex(b"abc"));
        assert_eq!(digest.size, 3);
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = fetch_digest(&reqwest::Client::new(), &format!("{}/gone.zip", server.uri()))
            .await
            .unwrap_err();

        assert!(matches!(err, PackageError::Status { status: 404, .. }));
    }
}
