//! S3 `PutObject` signed with AWS Signature Version 4.

use super::{ImageStore, MediaError};
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::Url;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const SERVICE: &str = "s3";

/// Bucket location and credentials.
#[derive(Clone)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    /// S3-compatible endpoint (MinIO, R2, ...). Uses path-style addressing.
    pub endpoint: Option<String>,
}

impl fmt::Debug for S3Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Config")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Images written to an S3 bucket.
#[derive(Debug, Clone)]
pub struct S3ImageStore {
    config: S3Config,
    client: reqwest::Client,
}

/// Where an object lives: the request URL, the `Host` header and the
/// canonical URI that goes into the signature.
struct ObjectLocation {
    url: String,
    host: String,
    canonical_uri: String,
}

impl S3ImageStore {
    pub fn new(config: S3Config) -> Result<Self, MediaError> {
        for (name, value) in [
            ("bucket", &config.bucket),
            ("region", &config.region),
            ("access key id", &config.access_key_id),
            ("secret access key", &config.secret_access_key),
        ] {
            if value.trim().is_empty() {
                return Err(MediaError::Config(format!("missing S3 {}", name)));
            }
        }
        Ok(Self {
            config,
            client: reqwest::Client::new(),
        })
    }

    fn locate(&self, key: &str) -> Result<ObjectLocation, MediaError> {
        let encoded_key = uri_encode(key, false);
        match &self.config.endpoint {
            None => {
                let host = format!("{}.s3.{}.amazonaws.com", self.config.bucket, self.config.region);
                let canonical_uri = format!("/{}", encoded_key);
                Ok(ObjectLocation {
                    url: format!("https://{}{}", host, canonical_uri),
                    host,
                    canonical_uri,
                })
            }
            Some(endpoint) => {
                let base = endpoint.trim_end_matches('/');
                let parsed = Url::parse(base)
                    .map_err(|e| MediaError::Config(format!("invalid S3 endpoint {}: {}", base, e)))?;
                let host_name = parsed
                    .host_str()
                    .ok_or_else(|| MediaError::Config(format!("S3 endpoint has no host: {}", base)))?;
                let host = match parsed.port() {
                    Some(port) => format!("{}:{}", host_name, port),
                    None => host_name.to_string(),
                };
                let canonical_uri = format!("/{}/{}", uri_encode(&self.config.bucket, false), encoded_key);
                Ok(ObjectLocation {
                    url: format!("{}{}", base, canonical_uri),
                    host,
                    canonical_uri,
                })
            }
        }
    }
}

#[async_trait]
impl ImageStore for S3ImageStore {
    async fn put(&self, key: &str, content_type: &str, bytes: Vec<u8>) -> Result<String, MediaError> {
        let location = self.locate(key)?;
        let amz_date = chrono::Utc::now().format("%Y%m%dT%H%M%SZ").to_string();
        let payload_hash = hex::encode(Sha256::digest(&bytes));

        let mut headers = BTreeMap::new();
        headers.insert("content-type".to_string(), content_type.to_string());
        headers.insert("host".to_string(), location.host.clone());
        headers.insert("x-amz-content-sha256".to_string(), payload_hash.clone());
        headers.insert("x-amz-date".to_string(), amz_date.clone());

        let signer = Signer {
            access_key_id: &self.config.access_key_id,
            secret_access_key: &self.config.secret_access_key,
            region: &self.config.region,
            service: SERVICE,
        };
        let authorization =
            signer.authorization("PUT", &location.canonical_uri, &headers, &payload_hash, &amz_date)?;

        tracing::debug!(url = %location.url, size = bytes.len(), "Uploading object");
        let response = self
            .client
            .put(&location.url)
            .header("content-type", content_type)
            .header("x-amz-content-sha256", &payload_hash)
            .header("x-amz-date", &amz_date)
            .header("authorization", authorization)
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MediaError::Upstream {
                status: status.as_u16(),
                body,
            });
        }
        Ok(location.url)
    }

    fn backend(&self) -> &'static str {
        "s3"
    }
}

/// Signature V4 request signer for one service and region.
struct Signer<'a> {
    access_key_id: &'a str,
    secret_access_key: &'a str,
    region: &'a str,
    service: &'a str,
}

impl Signer<'_> {
    /// The `Authorization` header value. `headers` must use lowercase names
    /// and include every header that will be sent signed; the query string
    /// is empty.
    fn authorization(
        &self,
        method: &str,
        canonical_uri: &str,
        headers: &BTreeMap<String, String>,
        payload_hash: &str,
        amz_date: &str,
    ) -> Result<String, MediaError> {
        let date = amz_date
            .get(..8)
            .ok_or_else(|| MediaError::Config(format!("malformed timestamp: {}", amz_date)))?;

        let canonical_headers: String = headers
            .iter()
            .map(|(name, value)| format!("{}:{}\n", name, value.trim()))
            .collect();
        let signed_headers = headers.keys().map(String::as_str).collect::<Vec<_>>().join(";");

        let canonical_request = format!(
            "{}\n{}\n\n{}\n{}\n{}",
            method, canonical_uri, canonical_headers, signed_headers, payload_hash
        );

        let scope = format!("{}/{}/{}/aws4_request", date, self.region, self.service);
        let string_to_sign = format!(
            "{}\n{}\n{}\n{}",
            ALGORITHM,
            amz_date,
            scope,
            hex::encode(Sha256::digest(canonical_request.as_bytes()))
        );

        let key = signing_key(self.secret_access_key, date, self.region, self.service)?;
        let signature = hex::encode(hmac_sha256(&key, string_to_sign.as_bytes())?);

        Ok(format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            ALGORITHM, self.access_key_id, scope, signed_headers, signature
        ))
    }
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, MediaError> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|e| MediaError::Config(e.to_string()))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn signing_key(secret: &str, date: &str, region: &str, service: &str) -> Result<Vec<u8>, MediaError> {
    let k_date = hmac_sha256(format!("AWS4{}", secret).as_bytes(), date.as_bytes())?;
    let k_region = hmac_sha256(&k_date, region.as_bytes())?;
    let k_service = hmac_sha256(&k_region, service.as_bytes())?;
    hmac_sha256(&k_service, b"aws4_request")
}

/// Percent-encode everything except unreserved characters. `/` is kept
/// when `keep_slash` is set.
fn uri_encode(input: &str, keep_slash: bool) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => out.push(byte as char),
            b'/' if keep_slash => out.push('/'),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
