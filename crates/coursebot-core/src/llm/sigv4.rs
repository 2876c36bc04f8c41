//! AWS Signature Version 4 request signing
//!
//! Only what the Bedrock runtime needs: header-based signing of a single
//! request with an optional session token.

use crate::error::{CourseBotError, Result};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Credentials and scope used to sign a request
#[derive(Debug, Clone)]
pub struct SigningParams<'a> {
    pub access_key_id: &'a str,
    pub secret_key: &'a str,
    pub session_token: Option<&'a str>,
    pub region: &'a str,
    pub service: &'a str,
    pub time: DateTime<Utc>,
}

/// Request parts covered by the signature
#[derive(Debug, Clone)]
pub struct SignableRequest<'a> {
    pub method: &'a str,
    /// Path as sent on the wire (segments already percent-encoded)
    pub path: &'a str,
    /// Canonical (sorted, encoded) query string, empty if none
    pub query: &'a str,
    pub headers: Vec<(String, String)>,
    pub body: &'a [u8],
}

/// Headers to attach to the outgoing request
pub type SignedHeaders = Vec<(&'static str, String)>;

/// Sign a request, returning the headers to add to it
pub fn sign(params: &SigningParams<'_>, request: &SignableRequest<'_>) -> Result<SignedHeaders> {
    let amz_date = params.time.format("%Y%m%dT%H%M%SZ").to_string();
    let date = params.time.format("%Y%m%d").to_string();

    let mut added: SignedHeaders = vec![("x-amz-date", amz_date.clone())];
    if let Some(token) = params.session_token {
        added.push(("x-amz-security-token", token.to_string()));
    }

    let mut headers: Vec<(String, String)> = request
        .headers
        .iter()
        .map(|(name, value)| (name.to_ascii_lowercase(), value.trim().to_string()))
        .chain(added.iter().map(|(n, v)| (n.to_string(), v.clone())))
        .collect();
    headers.sort_by(|a, b| a.0.cmp(&b.0));

    let canonical_headers: String = headers
        .iter()
        .map(|(name, value)| format!("{}:{}\n", name, value))
        .collect();
    let signed_headers = headers
        .iter()
        .map(|(name, _)| name.as_str())
        .collect::<Vec<_>>()
        .join(";");

    let canonical_request = format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        request.method,
        canonical_uri(request.path),
        request.query,
        canonical_headers,
        signed_headers,
        sha256_hex(request.body)
    );

    let scope = format!(
        "{}/{}/{}/aws4_request",
        date, params.region, params.service
    );
    let string_to_sign = format!(
        "{}\n{}\n{}\n{}",
        ALGORITHM,
        amz_date,
        scope,
        sha256_hex(canonical_request.as_bytes())
    );

    let key = signing_key(params.secret_key, &date, params.region, params.service)?;
    let signature = hex(&hmac_sha256(&key, string_to_sign.as_bytes())?);

    added.push((
        "authorization",
        format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            ALGORITHM, params.access_key_id, scope, signed_headers, signature
        ),
    ));
    Ok(added)
}

/// Derive the per-day, per-region, per-service signing key
pub fn signing_key(secret_key: &str, date: &str, region: &str, service: &str) -> Result<Vec<u8>> {
    let k_date = hmac_sha256(format!("AWS4{}", secret_key).as_bytes(), date.as_bytes())?;
    let k_region = hmac_sha256(&k_date, region.as_bytes())?;
    let k_service = hmac_sha256(&k_region, service.as_bytes())?;
    hmac_sha256(&k_service, b"aws4_request")
}

/// Percent-encode per RFC 3986 unreserved set
pub fn uri_encode(input: &str, encode_slash: bool) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            b'/' if !encode_slash => out.push('/'),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// Non-S3 services sign the wire path encoded a second time
fn canonical_uri(path: &str) -> String {
    if path.is_empty() {
        return "/".to_string();
    }
    path.split('/')
        .map(|segment| uri_encode(segment, true))
        .collect::<Vec<_>>()
        .join("/")
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| CourseBotError::ExternalError(format!("HMAC key error: {}", e)))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const EXAMPLE_SECRET: &str = "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY";

    #[test]
    fn test_signing_key_matches_published_example() {
        let key = signing_key(EXAMPLE_SECRET, "20150830", "us-east-1", "iam").unwrap();
        assert_eq!(
            hex(&key),
            "c4afb1cc5771d871763a393e44b703571b55cc28424d1a5e86da6ed3c154a4b9"
        );
    }

    #[test]
    fn test_signature_matches_published_example() {
        let params = SigningParams {
            access_key_id: "AKIDEXAMPLE",
            secret_key: EXAMPLE_SECRET,
            session_token: None,
            region: "us-east-1",
            service: "iam",
            time: Utc.with_ymd_and_hms(2015, 8, 30, 12, 36, 0).unwrap(),
        };
        let request = SignableRequest {
            method: "GET",
            path: "/",
            query: "Action=ListUsers&Version=2010-05-08",
            headers: vec![
                (
                    "Content-Type".to_string(),
                    "application/x-www-form-urlencoded; charset=utf-8".to_string(),
                ),
                ("Host".to_string(), "iam.amazonaws.com".to_string()),
            ],
            body: b"",
        };

        let headers = sign(&params, &request).unwrap();
        let auth = headers
            .iter()
            .find(|(name, _)| *name == "authorization")
            .map(|(_, v)| v.clone())
            .unwrap();

        assert_eq!(
            auth,
            "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/iam/aws4_request, \
             SignedHeaders=content-type;host;x-amz-date, \
             Signature=5d672d79c15b13162d9279b0855cfba6789a8edb4c82c400e06b5924a6f2b5d7"
        );
        assert!(headers
            .iter()
            .any(|(name, value)| *name == "x-amz-date" && value == "20150830T123600Z"));
    }

    #[test]
    fn test_session_token_is_signed() {
        let params = SigningParams {
            access_key_id: "AKID",
            secret_key: "secret",
            session_token: Some("token"),
            region: "ap-southeast-2",
            service: "bedrock",
            time: Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
        };
        let request = SignableRequest {
            method: "POST",
            path: "/model/m/invoke",
            query: "",
            headers: vec![("host".to_string(), "example.com".to_string())],
            body: b"{}",
        };
        let headers = sign(&params, &request).unwrap();
        assert!(headers
            .iter()
            .any(|(name, value)| *name == "x-amz-security-token" && value == "token"));
        let auth = &headers.last().unwrap().1;
        assert!(auth.contains("SignedHeaders=host;x-amz-date;x-amz-security-token"));
    }

    #[test]
    fn test_uri_encoding() {
        assert_eq!(
            uri_encode("anthropic.claude-v2:1", true),
            "anthropic.claude-v2%3A1"
        );
        assert_eq!(uri_encode("a/b c", false), "a/b%20c");
        assert_eq!(
            canonical_uri("/model/anthropic.claude-v2%3A1/invoke"),
            "/model/anthropic.claude-v2%253A1/invoke"
        );
    }
}
