use super::FacilityId;
use crate::macros::setter;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use tower_api_client::{Request, RequestData};

// Common

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub facility: Option<FacilityId>,
    #[serde(rename = "type", default)]
    pub resource_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// Requests

#[derive(Default, Debug, Clone, Serialize)]
pub struct ListInstruments {
    #[serde(skip_serializing_if = "Option::is_none")]
    facility: Option<FacilityId>,
}

impl ListInstruments {
    pub fn new() -> Self {
        Self::default()
    }

    setter!(opt facility: FacilityId);
}

impl Request for ListInstruments {
    type Data = Self;
    type Response = Vec<Instrument>;

    fn endpoint(&self) -> Cow<'_, str> {
        "/api/instruments".into()
    }

    fn data(&self) -> RequestData<&Self> {
        if self.facility.is_some() {
            RequestData::Query(self)
        } else {
            RequestData::Empty
        }
    }
}
