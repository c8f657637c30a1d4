//! HTTP data source backed by the diagnostic API.
//!
//! Each request is fetched in its own tokio task; the finished response is
//! queued on a channel that the UI thread drains with `poll()`.

use std::time::Duration;

use reqwest::Client;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use super::{decode, DataSource, Endpoint, FetchRequest, FetchResponse, Payload};
use crate::error::FetchError;

/// A data source that issues one HTTP GET per request.
///
/// There is no retry and no cancellation; stale answers are filtered by
/// generation on the receiving side.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use vibration_doctor::source::HttpSource;
///
/// # tokio_test::block_on(async {
/// let source = HttpSource::new(
///     "http://127.0.0.1:8000",
///     Duration::from_secs(30),
///     tokio::runtime::Handle::current(),
/// )?;
/// # Ok::<_, vibration_doctor::FetchError>(())
/// # });
/// ```
#[derive(Debug)]
pub struct HttpSource {
    client: Client,
    base_url: String,
    runtime: Handle,
    sender: mpsc::Sender<FetchResponse>,
    receiver: mpsc::Receiver<FetchResponse>,
    description: String,
}

impl HttpSource {
    /// Create a source for the API at `base_url`.
    ///
    /// Requests are spawned on `runtime`, which must outlive the source.
    pub fn new(base_url: &str, timeout: Duration, runtime: Handle) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.trim_end_matches('/').to_string();
        let (sender, receiver) = mpsc::channel(16);

        Ok(Self {
            description: format!("http: {}", base_url),
            client,
            base_url,
            runtime,
            sender,
            receiver,
        })
    }

    /// Full URL for an endpoint.
    pub fn url(&self, endpoint: Endpoint) -> String {
        format!("{}/{}", self.base_url, endpoint.path())
    }
}

async fn fetch(client: &Client, url: &str, endpoint: Endpoint) -> Result<Payload, FetchError> {
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        return Err(FetchError::Status(response.status().as_u16()));
    }

    let body = response.bytes().await?;
    decode(endpoint, &body)
}

impl DataSource for HttpSource {
    fn request(&mut self, request: FetchRequest) {
        let client = self.client.clone();
        let url = self.url(request.endpoint);
        let sender = self.sender.clone();

        tracing::debug!(%url, generation = request.generation, "fetching");

        self.runtime.spawn(async move {
            let result = fetch(&client, &url, request.endpoint).await;
            match &result {
                Ok(payload) => {
                    tracing::info!(%url, records = payload.len(), "fetched");
                }
                Err(e) => {
                    tracing::error!(%url, error = %e, "fetch failed");
                }
            }

            let response = FetchResponse {
                generation: request.generation,
                endpoint: request.endpoint,
                result,
            };
            if sender.send(response).await.is_err() {
                tracing::debug!("source dropped before response arrived");
            }
        });
    }

    fn poll(&mut self) -> Option<FetchResponse> {
        self.receiver.try_recv().ok()
    }

    fn description(&self) -> &str {
        &self.description
    }
}
