//! HTTP client for the Overpass API.

use std::time::Duration;

use reqwest::Client;
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

use super::{parse, RawBundle};

pub const DEFAULT_ENDPOINT: &str = "https://overpass-api.de/api/interpreter";

/// Walkable, deliverable road classes; footways and service roads carry no
/// letterboxes of their own.
const HIGHWAY_CLASSES: &str =
    "primary|secondary|tertiary|unclassified|residential|living_street|pedestrian";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid Overpass endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
    #[error("building HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("Overpass request failed after {attempts} attempts: {source}")]
    Exhausted {
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },
    #[error("malformed Overpass response: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Overpass client with fixed-delay retry.
///
/// Queries are slow on the public instances, so the HTTP timeout is generous
/// and failures are retried a few times before giving up.
pub struct OverpassClient {
    client: Client,
    endpoint: Url,
    attempts: u32,
    retry_delay: Duration,
}

impl OverpassClient {
    pub fn new(endpoint: &str) -> Result<Self, FetchError> {
        let endpoint = Url::parse(endpoint)?;
        let client = Client::builder()
            .user_agent(concat!("paperroute/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self {
            client,
            endpoint,
            attempts: 3,
            retry_delay: Duration::from_secs(5),
        })
    }

    /// Fetch street fragments and address points for the postal codes
    pub async fn fetch_bundle(&self, codes: &[String]) -> Result<RawBundle, FetchError> {
        info!("Fetching streets for postal codes {:?}", codes);
        let response = self.fetch(&street_query(codes)).await?;
        let fragments = parse::street_fragments(response);

        info!("Fetching addresses for postal codes {:?}", codes);
        let response = self.fetch(&address_query(codes)).await?;
        let addresses = parse::address_points(response);

        info!(
            "Fetched {} street fragments and {} address points",
            fragments.len(),
            addresses.len()
        );

        Ok(RawBundle {
            fragments,
            addresses,
        })
    }

    async fn fetch(&self, query: &str) -> Result<parse::OverpassResponse, FetchError> {
        let mut attempt = 0;
        loop {
            attempt += 1;

            let result = self
                .client
                .post(self.endpoint.clone())
                .form(&[("data", query)])
                .send()
                .await
                .and_then(|response| response.error_for_status());

            match result {
                Ok(response) => return response.json().await.map_err(FetchError::Decode),
                Err(e) => {
                    warn!(
                        "Overpass request failed (attempt {}/{}): {}",
                        attempt, self.attempts, e
                    );
                    if attempt >= self.attempts {
                        return Err(FetchError::Exhausted {
                            attempts: attempt,
                            source: e,
                        });
                    }
                    tokio::time::sleep(self.retry_delay).await;
                }
            }
        }
    }
}

fn area_clause(codes: &[String]) -> String {
    let areas: String = codes
        .iter()
        .map(|code| format!("area[\"postal_code\"=\"{}\"];", code))
        .collect();
    format!("({})->.a;", areas)
}

fn street_query(codes: &[String]) -> String {
    format!(
        "[out:json][timeout:90];{}way[\"highway\"~\"{}\"][\"name\"](area.a);out geom;",
        area_clause(codes),
        HIGHWAY_CLASSES
    )
}

fn address_query(codes: &[String]) -> String {
    format!(
        "[out:json][timeout:90];{}nwr[\"addr:housenumber\"](area.a);out center;",
        area_clause(codes)
    )
}
