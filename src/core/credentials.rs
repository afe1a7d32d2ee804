//! Google Cloud credential handling shared by the STT and TTS adapters.
//!
//! Tokens come from Application Default Credentials: the service-account
//! file named by `GOOGLE_APPLICATION_CREDENTIALS` (verified present at
//! startup), falling back to whatever ADC source gcp_auth resolves.

use std::sync::Arc;

use gcp_auth::TokenProvider;

/// OAuth scope covering both Speech-to-Text and Text-to-Speech
const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// Token source for the Google-backed adapters.
///
/// Cloneable and cheap to share; token caching and refresh is handled by
/// the underlying provider.
#[derive(Clone)]
pub struct GoogleAuthClient {
    inner: AuthSource,
}

#[derive(Clone)]
enum AuthSource {
    Provider(Arc<dyn TokenProvider>),
    /// Fixed token, used by tests to avoid touching real credentials
    Static(String),
}

impl GoogleAuthClient {
    /// Resolve Application Default Credentials.
    ///
    /// Fails when no usable credential source exists, which the caller
    /// treats as a fatal startup error.
    pub async fn new() -> Result<Self, gcp_auth::Error> {
        let provider = gcp_auth::provider().await?;
        Ok(Self {
            inner: AuthSource::Provider(provider),
        })
    }

    /// Build a client that always returns `token` (test use)
    pub fn with_static_token(token: impl Into<String>) -> Self {
        Self {
            inner: AuthSource::Static(token.into()),
        }
    }

    /// Fetch a bearer token for the cloud-platform scope
    pub async fn bearer_token(&self) -> Result<String, gcp_auth::Error> {
        match &self.inner {
            AuthSource::Provider(provider) => {
                let token = provider.token(&[CLOUD_PLATFORM_SCOPE]).await?;
                Ok(token.as_str().to_string())
            }
            AuthSource::Static(token) => Ok(token.clone()),
        }
    }
}

impl std::fmt::Debug for GoogleAuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print token material
        match self.inner {
            AuthSource::Provider(_) => f.write_str("GoogleAuthClient(adc)"),
            AuthSource::Static(_) => f.write_str("GoogleAuthClient(static)"),
        }
    }
}
