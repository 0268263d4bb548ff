//! Fixed category → code tables used to encode sample IDs. These must match
//! the institutional conventions exactly; an unmapped value is an error, not
//! a passthrough.

use crate::errors::UnknownCategory;

/// Tissue type string marking a normal (non-tumor) sample.
pub const NORMAL_TISSUE_TYPE: &str = "Normal";

/// Tissue sub-code of a normal sample inside an encoded ID.
pub const NORMAL_TISSUE_CODE: &str = "01";

/// Hospital research center → 3-digit institution code.
pub fn hospital_research_center_code(value: &str) -> Result<&'static str, UnknownCategory> {
    match value {
        "台北榮總" | "Taipei Veterans General Hospital" => Ok("001"),
        "宜蘭附醫" | "National Yang Ming Chiao Tung University Hospital" => Ok("002"),
        _ => Err(UnknownCategory {
            field: "Hospital Research Center",
            value: value.to_string(),
        }),
    }
}

/// Cancer type → 2-digit code.
pub fn cancer_type_code(value: &str) -> Result<&'static str, UnknownCategory> {
    match value {
        "HNSCC" => Ok("01"),
        _ => Err(UnknownCategory {
            field: "Cancer Type",
            value: value.to_string(),
        }),
    }
}

/// Tissue type → 2-digit code.
pub fn tissue_type_code(value: &str) -> Result<&'static str, UnknownCategory> {
    match value {
        "Normal" | "Adjacent Normal" => Ok("01"),
        "Tumor" | "Primary" | "Primary Tumor" => Ok("02"),
        "Precancer" => Ok("03"),
        "Recurrent" | "Recurrent Tumor" => Ok("07"),
        _ => Err(UnknownCategory {
            field: "Tissue Type",
            value: value.to_string(),
        }),
    }
}

/// Sequencing type → 1-letter assay code.
pub fn sequencing_type_code(value: &str) -> Result<&'static str, UnknownCategory> {
    match value {
        "WES" | "Exome Sequencing" | "Whole Exome Sequencing" => Ok("E"),
        "RNA-seq" => Ok("R"),
        _ => Err(UnknownCategory {
            field: "Sequencing Type",
            value: value.to_string(),
        }),
    }
}
