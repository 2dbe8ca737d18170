//! OAuth 1.0a request signing (HMAC-SHA1) for the status-post sink.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rand::distr::Alphanumeric;
use rand::Rng;
use sha1::Sha1;

use skywatch_core::config::SinkConfig;

use crate::traits::NotifyError;

type HmacSha1 = Hmac<Sha1>;

/// RFC 3986 unreserved characters stay literal; everything else escapes.
const STRICT_ENCODE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

fn encode(text: &str) -> String {
    utf8_percent_encode(text, STRICT_ENCODE).to_string()
}

/// Signs requests with the consumer and access-token credential pair.
#[derive(Debug, Clone)]
pub struct Oauth1Signer {
    consumer_key: String,
    consumer_secret: String,
    access_token: String,
    access_token_secret: String,
}

impl Oauth1Signer {
    pub fn new(sink: &SinkConfig) -> Self {
        Self {
            consumer_key: sink.consumer_key.clone(),
            consumer_secret: sink.consumer_secret.clone(),
            access_token: sink.access_token.clone(),
            access_token_secret: sink.access_token_secret.clone(),
        }
    }

    /// Build the `Authorization` header for one request, with a fresh
    /// nonce and the current time.
    pub fn authorization_header(&self, method: &str, url: &str) -> Result<String, NotifyError> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let nonce: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();
        self.header_at(method, url, timestamp, &nonce, &[])
    }

    /// Deterministic variant: timestamp, nonce, and any extra request
    /// parameters supplied by the caller.
    fn header_at(
        &self,
        method: &str,
        url: &str,
        timestamp: u64,
        nonce: &str,
        extra_params: &[(&str, &str)],
    ) -> Result<String, NotifyError> {
        let timestamp = timestamp.to_string();
        let oauth_params = [
            ("oauth_consumer_key", self.consumer_key.as_str()),
            ("oauth_nonce", nonce),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", timestamp.as_str()),
            ("oauth_token", self.access_token.as_str()),
            ("oauth_version", "1.0"),
        ];

        let mut params: Vec<(&str, &str)> = oauth_params.to_vec();
        params.extend_from_slice(extra_params);
        let signature = self.sign(&signature_base_string(method, url, &params))?;

        let mut header_params: Vec<(&str, &str)> = oauth_params.to_vec();
        header_params.push(("oauth_signature", signature.as_str()));
        header_params.sort();

        let rendered: Vec<String> = header_params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", k, encode(v)))
            .collect();
        Ok(format!("OAuth {}", rendered.join(", ")))
    }

    fn sign(&self, base: &str) -> Result<String, NotifyError> {
        let key = format!(
            "{}&{}",
            encode(&self.consumer_secret),
            encode(&self.access_token_secret)
        );
        let mut mac = HmacSha1::new_from_slice(key.as_bytes())
            .map_err(|e| NotifyError::Config(format!("signing key rejected: {e}")))?;
        mac.update(base.as_bytes());
        Ok(BASE64.encode(mac.finalize().into_bytes()))
    }
}

/// RFC 5849 §3.4.1: method, encoded URL, and the encoded-then-sorted
/// parameter string, joined with `&`.
fn signature_base_string(method: &str, url: &str, params: &[(&str, &str)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (encode(k), encode(v)))
        .collect();
    encoded.sort();
    let param_string: String = encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    format!(
        "{}&{}&{}",
        method.to_uppercase(),
        encode(url),
        encode(&param_string)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The worked example from the platform's request-signing docs.
    fn example_signer() -> Oauth1Signer {
        Oauth1Signer {
            consumer_key: "xvz1evFS4wEEPTGEFPHBog".to_string(),
            consumer_secret: "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw".to_string(),
            access_token: "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb".to_string(),
            access_token_secret: "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE".to_string(),
        }
    }

    const EXAMPLE_NONCE: &str = "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg";
    const EXAMPLE_TIMESTAMP: u64 = 1318622958;

    #[test]
    fn strict_encoding_escapes_reserved_characters() {
        assert_eq!(encode("Ladies + Gentlemen"), "Ladies%20%2B%20Gentlemen");
        assert_eq!(encode("An encoded string!"), "An%20encoded%20string%21");
        assert_eq!(encode("Dogs, Cats & Mice"), "Dogs%2C%20Cats%20%26%20Mice");
        assert_eq!(encode("unreserved-._~stays"), "unreserved-._~stays");
    }

    #[test]
    fn base_string_sorts_encoded_parameters() {
        let base = signature_base_string(
            "post",
            "https://example.com/send",
            &[("b", "2"), ("a", "1")],
        );
        assert_eq!(base, "POST&https%3A%2F%2Fexample.com%2Fsend&a%3D1%26b%3D2");
    }

    #[test]
    fn signature_matches_published_example() {
        let signer = example_signer();
        let params = [
            ("include_entities", "true"),
            ("status", "Hello Ladies + Gentlemen, a signed OAuth request!"),
        ];
        let base = signature_base_string(
            "POST",
            "https://api.twitter.com/1.1/statuses/update.json",
            &{
                let mut all = vec![
                    ("oauth_consumer_key", signer.consumer_key.as_str()),
                    ("oauth_nonce", EXAMPLE_NONCE),
                    ("oauth_signature_method", "HMAC-SHA1"),
                    ("oauth_timestamp", "1318622958"),
                    ("oauth_token", signer.access_token.as_str()),
                    ("oauth_version", "1.0"),
                ];
                all.extend_from_slice(&params);
                all
            },
        );
        assert_eq!(signer.sign(&base).unwrap(), "hCtSmYh+iHYCEqBWrE7C7hYmtUk=");
    }

    #[test]
    fn header_lists_sorted_oauth_fields() {
        let signer = example_signer();
        let header = signer
            .header_at(
                "POST",
                "https://api.twitter.com/2/tweets",
                EXAMPLE_TIMESTAMP,
                EXAMPLE_NONCE,
                &[],
            )
            .unwrap();

        assert!(header.starts_with("OAuth oauth_consumer_key=\"xvz1evFS4wEEPTGEFPHBog\""));
        let fields: Vec<&str> = header["OAuth ".len()..]
            .split(", ")
            .map(|f| f.split('=').next().unwrap())
            .collect();
        let mut sorted = fields.clone();
        sorted.sort();
        assert_eq!(fields, sorted);
        assert!(header.contains("oauth_signature_method=\"HMAC-SHA1\""));
        assert!(header.contains("oauth_timestamp=\"1318622958\""));
        assert!(header.contains("oauth_version=\"1.0\""));
        assert!(header.contains("oauth_signature=\""));
    }

    #[test]
    fn header_values_are_percent_encoded() {
        let mut signer = example_signer();
        signer.access_token = "token/with+specials".to_string();
        let header = signer
            .header_at(
                "POST",
                "https://example.com/send",
                EXAMPLE_TIMESTAMP,
                EXAMPLE_NONCE,
                &[],
            )
            .unwrap();
        assert!(header.contains("oauth_token=\"token%2Fwith%2Bspecials\""));
    }
}
