use crate::endpoints::{facilities::ListFacilities, instruments::ListInstruments};

pub struct FacilityRepository;

impl FacilityRepository {
    pub fn new() -> Self {
        Self {}
    }

    pub fn list(&self) -> ListFacilities {
        ListFacilities::default()
    }
}

pub struct InstrumentRepository;

impl InstrumentRepository {
    pub fn new() -> Self {
        Self {}
    }

    pub fn list(&self) -> ListInstruments {
        ListInstruments::default()
    }
}
