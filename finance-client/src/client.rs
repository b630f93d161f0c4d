use reqwest::{Client, Method, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::StoreError;

/// Body of a 422 response.
#[derive(Debug, Deserialize)]
struct ValidationBody {
    errors: Vec<String>,
}

/// Thin JSON-over-HTTP wrapper shared by the HTTP stores.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// `base_url` may carry a path prefix; resource paths are joined below it.
    pub fn new(base_url: &str) -> Result<Self, StoreError> {
        let base_url = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))
            .map_err(|e| StoreError::Transport(format!("Invalid API URL {base_url}: {e}")))?;

        let client = Client::builder()
            .build()
            .map_err(|e| StoreError::Transport(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, StoreError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| StoreError::Transport(format!("Failed to build URL for path {path}: {e}")))
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response, StoreError> {
        let url = self.endpoint(path)?;
        let call_name = format!("{} {}", method, url.path());
        debug!(call = %call_name, "sending request");

        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            warn!(call = %call_name, error = %e, "request did not complete");
            StoreError::Transport(format!("Failed to call {call_name}: {e}"))
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!(call = %call_name, %status, "request failed");
        Err(classify_failure(status, &body, &call_name))
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, StoreError> {
        let response = self.send::<()>(Method::GET, path, None).await?;
        parse_json(response, path).await
    }

    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, StoreError> {
        let response = self.send(Method::POST, path, Some(body)).await?;
        parse_json(response, path).await
    }

    /// PUT whose response body, if any, is ignored.
    pub async fn put_without_response<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), StoreError> {
        let response = self.send(Method::PUT, path, Some(body)).await?;
        let _ = response.bytes().await;
        Ok(())
    }

    pub async fn delete(&self, path: &str) -> Result<(), StoreError> {
        let response = self.send::<()>(Method::DELETE, path, None).await?;
        let _ = response.bytes().await;
        Ok(())
    }
}

async fn parse_json<T: DeserializeOwned>(response: Response, path: &str) -> Result<T, StoreError> {
    response
        .json::<T>()
        .await
        .map_err(|e| StoreError::Parsing(format!("Failed to parse {path} response: {e}")))
}

/// Maps a non-success status onto the store error taxonomy.
///
/// Only 422 carries meaning in its body; every other status is opaque.
pub(crate) fn classify_failure(status: StatusCode, body: &str, call_name: &str) -> StoreError {
    match status {
        StatusCode::UNPROCESSABLE_ENTITY => match serde_json::from_str::<ValidationBody>(body) {
            Ok(parsed) => StoreError::Validation(parsed.errors),
            Err(e) => StoreError::Parsing(format!(
                "{call_name} returned 422 without a readable error list: {e}"
            )),
        },
        StatusCode::NOT_FOUND => StoreError::NotFound(call_name.to_string()),
        other => StoreError::Transport(format!("{call_name} returned {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_paths_below_base_url() {
        let client = ApiClient::new("http://localhost:3000").unwrap();
        assert_eq!(
            client.endpoint("api/entries/4").unwrap().as_str(),
            "http://localhost:3000/api/entries/4"
        );

        let prefixed = ApiClient::new("https://example.com/finance/").unwrap();
        assert_eq!(
            prefixed.endpoint("/api/categories").unwrap().as_str(),
            "https://example.com/finance/api/categories"
        );
    }

    #[test]
    fn rejects_invalid_base_url() {
        assert!(matches!(
            ApiClient::new("not a url"),
            Err(StoreError::Transport(_))
        ));
    }

    #[test]
    fn unprocessable_entity_yields_server_messages() {
        let error = classify_failure(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"errors": ["amount is required"]}"#,
            "POST /api/entries",
        );
        assert_eq!(
            error,
            StoreError::Validation(vec!["amount is required".to_string()])
        );
    }

    #[test]
    fn unreadable_unprocessable_entity_is_not_a_validation_failure() {
        let error = classify_failure(
            StatusCode::UNPROCESSABLE_ENTITY,
            "<html>oops</html>",
            "POST /api/entries",
        );
        assert!(matches!(error, StoreError::Parsing(_)));
    }

    #[test]
    fn other_statuses_are_opaque() {
        assert_eq!(
            classify_failure(StatusCode::NOT_FOUND, "", "GET /api/entries/9"),
            StoreError::NotFound("GET /api/entries/9".to_string())
        );
        assert!(matches!(
            classify_failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                r#"{"errors": ["ignored"]}"#,
                "PUT /api/entries/1"
            ),
            StoreError::Transport(_)
        ));
    }
}
