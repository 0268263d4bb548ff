//! Shared schema, category code tables and typed row records for the
//! sequencing-sample registry.

#![deny(
    future_incompatible,
    nonstandard_style,
    rust_2018_compatibility,
    rust_2018_idioms,
    unused
)]

pub mod codes;
pub mod columns;
pub mod errors;
pub mod record;

pub use codes::{
    cancer_type_code, hospital_research_center_code, sequencing_type_code, tissue_type_code,
    NORMAL_TISSUE_CODE, NORMAL_TISSUE_TYPE,
};
pub use columns::{schema_headers, Column, IMPORT_SCHEMA, REGISTRY_SCHEMA};
pub use errors::{UnknownCategory, ValidationError};
pub use record::{ImportRecord, SampleRecord};
