use relay_parser::Message;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Url;
use tracing::{debug, instrument};

use crate::config::{RelayConfig, API_KEY_HEADER};
use crate::error::{DispatchError, RelayError};
use crate::models::ResponseBody;

/// Sends each message as one POST to the fixed endpoint.
///
/// The credential and content type are installed once as default headers of
/// the shared client. Cloning is cheap and every clone targets the same URL
/// with the same headers.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    client: reqwest::Client,
    url: Url,
}

impl Dispatcher {
    pub fn new(config: &RelayConfig) -> Result<Self, RelayError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut api_key = HeaderValue::from_str(config.credential.expose())
            .map_err(|e| RelayError::Config(format!("invalid API key header value: {e}")))?;
        api_key.set_sensitive(true);
        headers.insert(API_KEY_HEADER, api_key);

        // No timeout and no redirects: the transport's own behaviour decides.
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(RelayError::Client)?;

        Ok(Self {
            client,
            url: config.endpoint.url()?,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Issue one request and collect its full body. The status code is not
    /// inspected; any body the transport delivers counts as completed.
    #[instrument(skip(self, message), fields(url = %self.url))]
    pub async fn dispatch(&self, message: Message) -> Result<ResponseBody, DispatchError> {
        let body = message.to_json_bytes()?;
        debug!("Sending {} byte request", body.len());

        let mut response = self
            .client
            .post(self.url.clone())
            .body(body)
            .send()
            .await
            .map_err(DispatchError::from_transport)?;

        debug!("Response status {}", response.status());

        let mut buffer = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(DispatchError::from_transport)?
        {
            buffer.extend_from_slice(&chunk);
        }

        debug!("Received {} byte response", buffer.len());
        Ok(ResponseBody::new(buffer))
    }
}
