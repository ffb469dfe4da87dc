//! Translation data served over HTTP in the static layout.

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::source::{
    DataSource,
    SourceError,
};
use super::{
    MANIFEST_FILE,
    data_file_path,
};
use crate::types::LanguageCode;
use crate::value::TranslationMap;

/// Source fetching `codes.json` and `data/<code>.json` relative to a base URL.
#[derive(Debug, Clone)]
pub struct NetworkSource {
    /// Identifier for removal and logs.
    name: String,
    /// Base URL without a trailing slash.
    base_url: String,
    /// Shared HTTP client.
    client: reqwest::Client,
    /// Merge policy flag.
    overrides: bool,
}

impl NetworkSource {
    /// Source with a default HTTP client.
    #[must_use]
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self::with_client(name, base_url, reqwest::Client::new())
    }

    /// Uses a caller-configured client (timeouts, headers, proxies).
    #[must_use]
    pub fn with_client(
        name: impl Into<String>,
        base_url: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { name: name.into(), base_url, client, overrides: false }
    }

    /// Lets this source replace entries of earlier sources.
    #[must_use]
    pub const fn with_override(mut self, overrides: bool) -> Self {
        self.overrides = overrides;
        self
    }

    /// GETs `relative` under the base URL and decodes the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, relative: &str) -> Result<T, SourceError> {
        let url = format!("{}/{relative}", self.base_url);
        tracing::debug!(source = %self.name, %url, "Fetching translation data");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status { status: status.as_u16(), url });
        }
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl DataSource for NetworkSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn overrides(&self) -> bool {
        self.overrides
    }

    async fn supported_codes(&self) -> Result<Vec<LanguageCode>, SourceError> {
        self.get_json(MANIFEST_FILE).await
    }

    async fn data(&self, code: &LanguageCode) -> Result<TranslationMap, SourceError> {
        self.get_json(&data_file_path(code)).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use wiremock::matchers::{
        method,
        path,
    };
    use wiremock::{
        Mock,
        MockServer,
        ResponseTemplate,
    };

    use super::*;
    use crate::value::{
        ConditionSet,
        TranslationValue,
    };

    async fn server_with_layout() -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/i18n/codes.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"["en","vi"]"#))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/i18n/data/vi.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"Hi":"Chào","Apples":{"param":"n","conditions":{"_":"@n quả táo"}}}"#,
            ))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/i18n/data/en.json"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal error"))
            .mount(&mock_server)
            .await;

        mock_server
    }

    #[tokio::test]
    async fn fetches_manifest_and_data() {
        let mock_server = server_with_layout().await;
        let source = NetworkSource::new("remote", format!("{}/i18n/", mock_server.uri()));

        let codes = source.supported_codes().await.unwrap();
        let vi = source.data(&"vi".into()).await.unwrap();

        assert_eq!(codes, vec![LanguageCode::from("en"), LanguageCode::from("vi")]);
        assert_eq!(vi["Hi"], TranslationValue::from("Chào"));
        assert_eq!(
            vi["Apples"],
            TranslationValue::from(ConditionSet::new("n").branch("_", "@n quả táo"))
        );
    }

    #[tokio::test]
    async fn http_error_status_is_reported() {
        let mock_server = server_with_layout().await;
        let source = NetworkSource::new("remote", format!("{}/i18n", mock_server.uri()));

        let result = source.data(&"en".into()).await;

        assert!(matches!(result, Err(SourceError::Status { status: 500, .. })));
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/codes.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;
        let source = NetworkSource::new("remote", mock_server.uri());

        let result = source.supported_codes().await;

        assert!(matches!(result, Err(SourceError::Http(e)) if e.is_decode()));
    }

    #[tokio::test]
    async fn unknown_path_is_reported() {
        let mock_server = MockServer::start().await;
        let source = NetworkSource::new("remote", mock_server.uri());

        let result = source.supported_codes().await;

        assert!(matches!(result, Err(SourceError::Status { status: 404, .. })));
    }
}
