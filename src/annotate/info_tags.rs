//! Annotation from tags embedded in the INFO column.
//!
//! Pre-annotated VCF files carry `RISK`, `CLNSIG`, `GENE`, `DISEASE` and `IMPACT` entries.  The
//! risk and clinical significance are recognized by substring, the remaining keys by exact key
//! match on the `;`-separated entries.

use super::{Annotation, Pathogenicity, RiskTier};
use crate::vcf::VariantRecord;

/// Placeholder for absent disease and impact tags.
const UNKNOWN: &str = "Unknown";

/// Risk tier from the `RISK` tag.
fn risk_tier(info: &str) -> RiskTier {
    if info.contains("RISK=HIGH") {
        RiskTier::High
    } else if info.contains("RISK=MEDIUM") {
        RiskTier::Medium
    } else {
        RiskTier::Low
    }
}

/// Pathogenicity and clinical significance text from the `CLNSIG` tag.
fn clinical_significance(info: &str) -> Option<(Pathogenicity, &'static str)> {
    if info.contains("CLNSIG=Pathogenic") {
        Some((Pathogenicity::Pathogenic, "Pathogenic"))
    } else if info.contains("CLNSIG=Likely_pathogenic") {
        Some((Pathogenicity::LikelyPathogenic, "Likely_pathogenic"))
    } else if info.contains("CLNSIG=VUS") || info.contains("CLNSIG=Uncertain") {
        Some((Pathogenicity::UncertainSignificance, "VUS"))
    } else if info.contains("CLNSIG=Benign") || info.contains("CLNSIG=Likely_benign") {
        Some((Pathogenicity::Benign, "Benign"))
    } else {
        None
    }
}

/// Value of the INFO entry `key`, if present.
fn info_value<'a>(info: &'a str, key: &str) -> Option<&'a str> {
    info.split(';').find_map(|entry| {
        entry
            .strip_prefix(key)
            .and_then(|rest| rest.strip_prefix('='))
    })
}

/// Annotate a record from its INFO column.
pub fn annotate_record(record: &VariantRecord) -> Annotation {
    let info = record.info.as_str();
    let mut result = Annotation {
        disease_risk: risk_tier(info),
        ..Default::default()
    };

    if let Some((pathogenicity, text)) = clinical_significance(info) {
        result.pathogenicity = pathogenicity;
        result.clinical_significance = text.to_string();
    }
    if let Some(gene) = info_value(info, "GENE") {
        result.gene = gene.to_string();
    }
    result.disease = Some(info_value(info, "DISEASE").unwrap_or(UNKNOWN).to_string());
    result.impact = Some(info_value(info, "IMPACT").unwrap_or(UNKNOWN).to_string());

    result
}
