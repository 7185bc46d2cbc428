//! Typed client for the donor, request and availability resources.

use reqwest::Client;
use url::Url;

use super::{ClientError, parse_echo, parse_response};
use crate::objects::{
    Donor, DonorRegistration, NewOrganRequest, OrganAvailability, OrganRequest, Page,
    RequestQuery,
};

/// Typed HTTP client for the organ bank backend.
///
/// Plain request/response: no retries and no caching. Callers decide what a
/// failure means for them.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: Client,
    base_url: Url,
}

impl GatewayClient {
    /// Create a new `GatewayClient`.
    ///
    /// * `base_url` – root URL of the backend (e.g. `http://localhost:8081`).
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }

    /// Replace the default `reqwest::Client` with a custom one (e.g. to
    /// configure timeouts or a proxy).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `GET /api/availability` – organ availability as known to the backend.
    pub async fn availability(&self) -> Result<Vec<OrganAvailability>, ClientError> {
        self.get_json("/api/availability").await
    }

    /// `GET /api/donors` – all registered donors.
    pub async fn donors(&self) -> Result<Vec<Donor>, ClientError> {
        self.get_json("/api/donors").await
    }

    /// `GET /api/requests` – all hospital requests.
    pub async fn requests(&self) -> Result<Vec<OrganRequest>, ClientError> {
        self.get_json("/api/requests").await
    }

    /// `GET /api/donors/valid-organs` – organ names the backend accepts on a
    /// donor registration.
    pub async fn valid_organs(&self) -> Result<Vec<String>, ClientError> {
        self.get_json("/api/donors/valid-organs").await
    }

    /// `POST /api/donors/register` – register a new donor.
    ///
    /// Returns the stored donor when the backend echoes it back.
    pub async fn register_donor(
        &self,
        registration: &DonorRegistration,
    ) -> Result<Option<Donor>, ClientError> {
        let url = self.base_url.join("/api/donors/register")?;

        let resp = self.http.post(url).json(registration).send().await?;

        parse_echo(resp).await
    }

    /// `POST /api/requests` – send a hospital organ request.
    ///
    /// Returns the stored request when the backend echoes it back.
    pub async fn submit_request(
        &self,
        request: &NewOrganRequest,
    ) -> Result<Option<OrganRequest>, ClientError> {
        let url = self.base_url.join("/api/requests")?;

        let resp = self.http.post(url).json(request).send().await?;

        parse_echo(resp).await
    }

    /// Browse requests page by page, optionally filtered by hospital, organ
    /// or status. See [`RequestQuery::endpoint`] for the endpoint selection.
    pub async fn browse_requests(
        &self,
        query: &RequestQuery,
    ) -> Result<Page<OrganRequest>, ClientError> {
        let (path, params) = query.endpoint();
        let url = self.base_url.join(path)?;

        let resp = self.http.get(url).query(&params).send().await?;

        parse_response(resp).await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, ClientError> {
        let url = self.base_url.join(path)?;

        let resp = self.http.get(url).send().await?;

        parse_response(resp).await
    }
}
