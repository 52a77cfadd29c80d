//! AbuseIPDB reputation lookup client.
//!
//! One blocking GET per call against the `/api/v2/check` endpoint. The
//! client reports failures as errors; the decision to swallow them and keep
//! enriching belongs to the driver (`enrich`), which also owns the memo
//! that guarantees at most one call per distinct IP value.

use anyhow::{Context, anyhow};
use serde::Deserialize;

use crate::config::Config;
use crate::errors::{EnricherError, Result};

/// What the reputation service knows about one IP. Each field is
/// independently optional in the upstream response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reputation {
    pub country_code: Option<String>,
    pub abuse_confidence_score: Option<f64>,
}

/// Seam for the enrichment driver; tests substitute an in-process fake.
pub trait ReputationLookup {
    fn lookup(&self, ip: &str) -> Result<Reputation>;
}

/// Response envelope: `{"data": {"countryCode": ..., "abuseConfidenceScore": ...}}`.
#[derive(Debug, Deserialize, Default)]
struct CheckEnvelope {
    #[serde(default)]
    data: CheckData,
}

#[derive(Debug, Deserialize, Default)]
struct CheckData {
    #[serde(rename = "countryCode")]
    country_code: Option<String>,
    #[serde(rename = "abuseConfidenceScore")]
    abuse_confidence_score: Option<f64>,
}

/// Blocking client for the AbuseIPDB check endpoint.
pub struct AbuseIpDbClient {
    http: reqwest::blocking::Client,
    api_key: String,
    endpoint: String,
    max_age_days: u32,
}

impl AbuseIpDbClient {
    pub fn new(api_key: &str, config: &Config) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.http_timeout)
            .user_agent(concat!("ipenricher/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                EnricherError::configuration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            http,
            api_key: api_key.to_string(),
            endpoint: config.endpoint.clone(),
            max_age_days: config.max_age_days,
        })
    }

    /// One GET, body parsed into the response envelope. Non-2xx statuses and
    /// undecodable bodies are errors here.
    fn check(&self, ip: &str) -> anyhow::Result<Reputation> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("ipAddress", ip),
                ("maxAgeInDays", &self.max_age_days.to_string()),
            ])
            .header("Accept", "application/json")
            .header("Key", &self.api_key)
            .send()
            .with_context(|| format!("request to {} failed", self.endpoint))?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("reputation service returned {status}"));
        }

        let envelope: CheckEnvelope = response
            .json()
            .context("response body was not the expected JSON envelope")?;

        Ok(Reputation {
            country_code: envelope.data.country_code,
            abuse_confidence_score: envelope.data.abuse_confidence_score,
        })
    }

}

impl ReputationLookup for AbuseIpDbClient {
    fn lookup(&self, ip: &str) -> Result<Reputation> {
        self.check(ip)
            .map_err(|e| EnricherError::lookup(ip, format!("{e:#}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_parses_full_body() {
        let body = r#"{"data":{"ipAddress":"1.1.1.1","countryCode":"AU","abuseConfidenceScore":10,"totalReports":3}}"#;
        let envelope: CheckEnvelope = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.data.country_code.as_deref(), Some("AU"));
        assert_eq!(envelope.data.abuse_confidence_score, Some(10.0));
    }

    #[test]
    fn envelope_fields_are_independently_optional() {
        let envelope: CheckEnvelope =
            serde_json::from_str(r#"{"data":{"countryCode":"US"}}"#).unwrap();
        assert_eq!(envelope.data.country_code.as_deref(), Some("US"));
        assert_eq!(envelope.data.abuse_confidence_score, None);

        let envelope: CheckEnvelope = serde_json::from_str(r#"{"data":{}}"#).unwrap();
        assert_eq!(envelope.data.country_code, None);

        let envelope: CheckEnvelope = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(envelope.data.country_code, None);
    }

    #[test]
    fn client_construction_uses_config() {
        let config = Config::default();
        let client = AbuseIpDbClient::new("test-key", &config).unwrap();
        assert_eq!(client.endpoint, crate::config::DEFAULT_ENDPOINT);
        assert_eq!(client.max_age_days, 90);
    }
}
