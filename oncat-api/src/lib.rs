pub mod endpoints;
mod error;
mod macros;
pub mod repositories;

pub use crate::error::OncatApiError;
use repositories::*;
use tower_api_client::{Client as ApiClient, Request as ApiRequest};

pub const DEFAULT_BASE_URL: &str = "https://oncat.ornl.gov";

pub struct Client {
    inner: ApiClient,
}

impl Client {
    pub fn new(base_url: &str, access_token: &str) -> Self {
        Self {
            inner: ApiClient::new(base_url.trim_end_matches('/')).bearer_auth(access_token),
        }
    }

    pub async fn send<R>(&self, request: R) -> Result<R::Response, OncatApiError>
    where
        R: ApiRequest,
    {
        self.inner.send(request).await.map_err(From::from)
    }
}

pub struct Request;

impl Request {
    pub fn facilities() -> FacilityRepository {
        FacilityRepository::new()
    }

    pub fn instruments() -> InstrumentRepository {
        InstrumentRepository::new()
    }
}
