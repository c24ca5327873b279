use super::FacilityId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use tower_api_client::{Request, RequestData};

// Common

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub id: FacilityId,
    /// Missing names decode as empty, so a listing still proves the token works
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub resource_type: Option<String>,
    /// Fields ONCat adds that this crate does not model
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// Requests

/// GET /api/facilities. Cheap enough to double as an authenticated ping.
#[derive(Default, Debug, Clone, Serialize)]
pub struct ListFacilities {}

impl ListFacilities {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Request for ListFacilities {
    type Data = Self;
    type Response = Vec<Facility>;

    fn endpoint(&self) -> Cow<'_, str> {
        "/api/facilities".into()
    }

    fn data(&self) -> RequestData<&Self> {
        RequestData::Empty
    }
}
