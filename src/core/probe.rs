//! Object size lookup with a `HEAD` request against the gateway.

use async_trait::async_trait;
use futures::future::{Either, select};
use gloo_net::http::{Method, RequestBuilder};
use gloo_timers::future::TimeoutFuture;

use scoop_core::{SdkError, SizeProbe};

use crate::config::PROBE_TIMEOUT_MS;
use crate::core::error::FetchError;

/// [`SizeProbe`] reading the `content-length` header of the object URL.
#[derive(Clone, Copy, Debug, Default)]
pub struct GatewayProbe;

async fn head_content_length(url: &str) -> Result<Option<u64>, FetchError> {
    let response = RequestBuilder::new(url)
        .method(Method::HEAD)
        .send()
        .await
        .map_err(|e| FetchError::NetworkError(e.to_string()))?;

    if !response.ok() {
        return Err(FetchError::HttpError(response.status()));
    }

    Ok(response
        .headers()
        .get("content-length")
        .and_then(|len| len.trim().parse().ok()))
}

#[async_trait(?Send)]
impl SizeProbe for GatewayProbe {
    async fn content_length(&self, url: &str) -> Result<Option<u64>, SdkError> {
        let request = Box::pin(head_content_length(url));
        let timeout = Box::pin(TimeoutFuture::new(PROBE_TIMEOUT_MS));

        match select(request, timeout).await {
            Either::Left((result, _)) => result.map_err(SdkError::from),
            Either::Right(_) => Err(FetchError::Timeout.into()),
        }
    }
}
