use crate::config::ProviderConfig;
use crate::error::QaError;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub(crate) fn build_client(config: &ProviderConfig) -> Result<Client, QaError> {
    Ok(Client::builder().timeout(config.request_timeout).build()?)
}

/// POSTs `body` to `{api_base}/{relative}` and decodes the JSON reply.
///
/// Non-2xx replies become [`QaError::Provider`] with the status and body text.
pub(crate) async fn post_json<B, R>(
    client: &Client,
    config: &ProviderConfig,
    relative: &str,
    body: &B,
) -> Result<R, QaError>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let endpoint = config.endpoint(relative)?;
    let response = json_request(client, config, &endpoint, body).send().await?;
    let status = response.status();
    if !status.is_success() {
        let details = response.text().await.unwrap_or_default();
        return Err(QaError::provider(
            endpoint.as_str(),
            format!("{status}: {}", details.trim()),
        ));
    }

    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn json_request<B>(
    client: &Client,
    config: &ProviderConfig,
    endpoint: &url::Url,
    body: &B,
) -> RequestBuilder
where
    B: Serialize + ?Sized,
{
    let request = client.post(endpoint.clone()).json(body);
    match &config.api_key {
        Some(api_key) => request.bearer_auth(api_key),
        None => request,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
    use serde_json::json;

    #[test]
    fn json_request_sets_one_content_type_and_bearer_token() -> Result<(), QaError> {
        let config = ProviderConfig {
            api_key: Some("sk-test".to_string()),
            ..ProviderConfig::default()
        };
        let client = build_client(&config)?;
        let endpoint = config.endpoint("embeddings")?;

        let body = json!({ "input": ["a"] });
        let request = json_request(&client, &config, &endpoint, &body).build()?;

        let content_types = request.headers().get_all(CONTENT_TYPE).iter().collect::<Vec<_>>();
        assert_eq!(content_types, vec!["application/json"]);
        assert_eq!(
            request.headers().get(AUTHORIZATION).map(|value| value.as_bytes()),
            Some(&b"Bearer sk-test"[..])
        );
        assert_eq!(request.url().path(), "/v1/embeddings");
        Ok(())
    }

    #[test]
    fn json_request_without_key_sends_no_authorization() -> Result<(), QaError> {
        let config = ProviderConfig {
            api_key: None,
            ..ProviderConfig::default()
        };
        let client = build_client(&config)?;
        let endpoint = config.endpoint("chat/completions")?;

        let request = json_request(&client, &config, &endpoint, &json!({})).build()?;
        assert!(request.headers().get(AUTHORIZATION).is_none());
        Ok(())
    }
}
