use thiserror::Error;

/// A required field of an incoming record is blank. Aborts the whole import
/// batch; the registry is left untouched.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Lab Sample ID \"{lab_sample_id}\": \"{field}\" is empty.")]
pub struct ValidationError {
    pub lab_sample_id: String,
    pub field: String,
}

/// A categorical value has no entry in the fixed code tables, so no sample
/// ID can be encoded for it.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown {field} \"{value}\": no code mapping")]
pub struct UnknownCategory {
    pub field: &'static str,
    pub value: String,
}
