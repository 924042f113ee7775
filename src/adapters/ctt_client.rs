use crate::domain::model::{EnrichmentResult, NOT_AVAILABLE};
use crate::domain::ports::{ConfigProvider, FetchError, PostalCodeLookup};
use crate::domain::postal_code::NormalizedPostalCode;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://www.cttcodigopostal.pt";

/// The service answers with either a list of matches or a single object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CttPayload {
    Many(Vec<Value>),
    One(Map<String, Value>),
    Other(Value),
}

#[derive(Debug, Deserialize)]
struct CttEntry {
    concelho: Option<String>,
    distrito: Option<String>,
}

/// HTTP client for the CTT postal code API.
pub struct CttClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl CttClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::new(
            config.api_base_url(),
            config.api_key(),
            config.request_timeout(),
        )
    }

    fn request_url(&self, postal_code: &NormalizedPostalCode) -> String {
        format!("{}/api/v1/{}/{}", self.base_url, self.api_key, postal_code)
    }

    fn redacted_url(&self, postal_code: &NormalizedPostalCode) -> String {
        format!("{}/api/v1/***/{}", self.base_url, postal_code)
    }
}

#[async_trait]
impl PostalCodeLookup for CttClient {
    async fn fetch(
        &self,
        postal_code: &NormalizedPostalCode,
    ) -> std::result::Result<EnrichmentResult, FetchError> {
        tracing::info!("🌐 Querying API for postal code {}", postal_code);
        tracing::debug!("GET {}", self.redacted_url(postal_code));

        let response = self
            .client
            .get(self.request_url(postal_code))
            .send()
            .await
            .inspect_err(|e| tracing::error!("Request for {} failed: {}", postal_code, e))?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::error!(
                "API responded with status {} for postal code {}",
                status,
                postal_code
            );
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        tracing::info!("API payload for {}: {}", postal_code, body.trim());

        decode_payload(postal_code, &body)
    }
}

/// Turns a 200 response body into a result, accepting both list and object shapes.
pub fn decode_payload(
    postal_code: &NormalizedPostalCode,
    body: &str,
) -> std::result::Result<EnrichmentResult, FetchError> {
    if body.trim().is_empty() {
        return Err(FetchError::Empty);
    }

    let entry = match serde_json::from_str::<CttPayload>(body)? {
        CttPayload::Many(items) => match items.into_iter().next() {
            None => return Err(FetchError::Empty),
            Some(Value::Object(map)) => map,
            Some(other) => return Err(unexpected(other)),
        },
        CttPayload::One(map) if map.is_empty() => return Err(FetchError::Empty),
        CttPayload::One(map) => map,
        CttPayload::Other(Value::Null) => return Err(FetchError::Empty),
        CttPayload::Other(other) => return Err(unexpected(other)),
    };

    let entry: CttEntry = serde_json::from_value(Value::Object(entry.clone()))
        .map_err(|_| unexpected(Value::Object(entry)))?;

    Ok(EnrichmentResult {
        postal_code: postal_code.clone(),
        municipality: entry.concelho.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        district: entry.distrito.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
    })
}

fn unexpected(value: Value) -> FetchError {
    FetchError::UnexpectedFormat {
        payload: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lisbon() -> NormalizedPostalCode {
        NormalizedPostalCode::parse("1000-000").unwrap()
    }

    #[test]
    fn test_first_element_of_list_is_used() {
        let body = r#"[
            {"concelho": "Lisboa", "distrito": "Lisboa", "morada": "Rua A"},
            {"concelho": "Outro", "distrito": "Outro"}
        ]"#;

        let result = decode_payload(&lisbon(), body).unwrap();

        assert_eq!(result.postal_code, lisbon());
        assert_eq!(result.municipality, "Lisboa");
        assert_eq!(result.district, "Lisboa");
    }

    #[test]
    fn test_bare_object_is_accepted() {
        let body = r#"{"concelho": "Leiria", "distrito": "Leiria"}"#;
        let result = decode_payload(&lisbon(), body).unwrap();
        assert_eq!(result.municipality, "Leiria");
    }

    #[test]
    fn test_missing_or_null_fields_default_to_not_available() {
        let result = decode_payload(&lisbon(), r#"[{"distrito": "Lisboa"}]"#).unwrap();
        assert_eq!(result.municipality, NOT_AVAILABLE);
        assert_eq!(result.district, "Lisboa");

        let result = decode_payload(&lisbon(), r#"[{"concelho": null}]"#).unwrap();
        assert_eq!(result.municipality, NOT_AVAILABLE);
        assert_eq!(result.district, NOT_AVAILABLE);
    }

    #[test]
    fn test_empty_payloads() {
        for body in ["", "  \n", "[]", "{}", "null"] {
            let err = decode_payload(&lisbon(), body).unwrap_err();
            assert!(err.is_empty(), "body {:?} gave {:?}", body, err);
        }
    }

    #[test]
    fn test_non_object_payloads_are_unexpected() {
        for body in [r#"["1000-000"]"#, "42", r#""text""#, r#"[{"concelho": 7}]"#] {
            let err = decode_payload(&lisbon(), body).unwrap_err();
            assert!(
                matches!(err, FetchError::UnexpectedFormat { .. }),
                "body {:?} gave {:?}",
                body,
                err
            );
        }
    }

    #[test]
    fn test_invalid_json_is_decode_error() {
        let err = decode_payload(&lisbon(), "<html>oops</html>").unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[test]
    fn test_request_url_embeds_key_and_code() {
        let client = CttClient::new("https://api.test/", "KEY", Duration::from_secs(5)).unwrap();
        assert_eq!(
            client.request_url(&lisbon()),
            "https://api.test/api/v1/KEY/1000-000"
        );
        assert!(!client.redacted_url(&lisbon()).contains("KEY"));
    }
}
