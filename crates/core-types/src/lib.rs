pub mod enums;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::SortOrder;
pub use structs::{
    CandidateRecord, CountryFilter, CountryRecord, CountrySummary, GdpLeader, NewCountry,
    RefreshSummary, UpdateCountry,
};
