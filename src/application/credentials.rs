//! Provider credentials.
//!
//! With a server-side API key every request shares one provider. Without
//! one, each request must carry `Authorization: Bearer <key>` and gets a
//! provider built from that key.

use secrecy::SecretString;
use std::fmt;
use std::sync::Arc;

use crate::domain::dispatch::{CommandError, NormalizedRequest};
use crate::ports::{AssistantProvider, ProviderError};

/// Builds a provider from a caller-supplied API key.
pub type ProviderFactory =
    Arc<dyn Fn(SecretString) -> Result<Arc<dyn AssistantProvider>, ProviderError> + Send + Sync>;

/// Where AI handlers get their provider from.
#[derive(Clone)]
pub enum ProviderSource {
    /// Configured key; one provider for every request.
    Shared(Arc<dyn AssistantProvider>),
    /// No configured key; one provider per request from the bearer token.
    PerRequest(ProviderFactory),
}

impl fmt::Debug for ProviderSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderSource::Shared(provider) => f
                .debug_tuple("Shared")
                .field(&provider.provider_name())
                .finish(),
            ProviderSource::PerRequest(_) => f.write_str("PerRequest"),
        }
    }
}

impl ProviderSource {
    pub fn shared(provider: Arc<dyn AssistantProvider>) -> Self {
        Self::Shared(provider)
    }

    pub fn per_request<F>(factory: F) -> Self
    where
        F: Fn(SecretString) -> Result<Arc<dyn AssistantProvider>, ProviderError>
            + Send
            + Sync
            + 'static,
    {
        Self::PerRequest(Arc::new(factory))
    }

    /// Resolves the provider for one request.
    ///
    /// # Errors
    ///
    /// - typed 401 `"Missing API key"` when no `Authorization` header is sent
    /// - typed 401 `"Wrong API key"` when the header carries no token
    /// - `CommandError::Unexpected` when the provider cannot be built
    pub fn resolve(
        &self,
        request: &NormalizedRequest,
    ) -> Result<Arc<dyn AssistantProvider>, CommandError> {
        match self {
            ProviderSource::Shared(provider) => Ok(provider.clone()),
            ProviderSource::PerRequest(factory) => {
                let key = bearer_token(request.headers().authorization())?;
                factory(key).map_err(CommandError::unexpected)
            }
        }
    }
}

/// Second space-separated part of the `Authorization` header.
fn bearer_token(header: Option<&str>) -> Result<SecretString, CommandError> {
    let header = header.ok_or_else(|| CommandError::unauthorized("Missing API key"))?;

    header
        .split(' ')
        .nth(1)
        .filter(|token| !token.is_empty())
        .map(|token| SecretString::new(token.to_string()))
        .ok_or_else(|| CommandError::unauthorized("Wrong API key"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockAssistantProvider;
    use crate::domain::dispatch::HttpMethod;
    use secrecy::ExposeSecret;
    use std::sync::Mutex;

    fn request(authorization: Option<&str>) -> NormalizedRequest {
        let mut builder = NormalizedRequest::builder(HttpMethod::Post, "/thread");
        if let Some(value) = authorization {
            builder = builder.header("Authorization", value);
        }
        builder.build().unwrap()
    }

    fn recording_source(seen: Arc<Mutex<Vec<String>>>) -> ProviderSource {
        ProviderSource::per_request(move |key: SecretString| {
            seen.lock().unwrap().push(key.expose_secret().clone());
            Ok(Arc::new(MockAssistantProvider::new()) as Arc<dyn AssistantProvider>)
        })
    }

    #[test]
    fn shared_provider_ignores_headers() {
        let source = ProviderSource::shared(Arc::new(MockAssistantProvider::new()));
        assert!(source.resolve(&request(None)).is_ok());
    }

    #[test]
    fn per_request_uses_bearer_token() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let source = recording_source(seen.clone());

        source.resolve(&request(Some("Bearer sk-test"))).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec!["sk-test".to_string()]);
    }

    #[test]
    fn missing_header_is_401() {
        let source = recording_source(Arc::new(Mutex::new(Vec::new())));
        let err = source.resolve(&request(None)).err().unwrap();
        assert_eq!(err, CommandError::unauthorized("Missing API key"));
    }

    #[test]
    fn header_without_token_is_401() {
        let source = recording_source(Arc::new(Mutex::new(Vec::new())));
        let err = source.resolve(&request(Some("Bearer"))).err().unwrap();
        assert_eq!(err, CommandError::unauthorized("Wrong API key"));
    }

    #[test]
    fn factory_failure_is_unexpected() {
        let source = ProviderSource::per_request(|_| Err(ProviderError::network("no tls")));
        let err = source.resolve(&request(Some("Bearer k"))).err().unwrap();
        assert_eq!(err.status_code(), 500);
        assert!(err.should_report());
    }
}
