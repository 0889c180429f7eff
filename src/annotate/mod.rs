//! Annotation of variant records with gene, risk tier and pathogenicity.
//!
//! Two annotation sources exist, see [`AnnotationSource`].  A pipeline uses exactly one of them
//! for all records of an analysis.

use parse_display::{Display, FromStr};

use crate::vcf::VariantRecord;

pub mod info_tags;
pub mod regions;

/// Disease risk tier of a variant or gene region.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Display,
    FromStr,
    serde::Serialize,
    serde::Deserialize,
    utoipa::ToSchema,
)]
pub enum RiskTier {
    #[default]
    Low,
    Medium,
    High,
}

/// Pathogenicity label of a variant.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Display,
    FromStr,
    serde::Serialize,
    serde::Deserialize,
    utoipa::ToSchema,
)]
pub enum Pathogenicity {
    Pathogenic,
    #[display("Likely Pathogenic")]
    #[serde(rename = "Likely Pathogenic")]
    LikelyPathogenic,
    #[display("Uncertain Significance")]
    #[serde(rename = "Uncertain Significance")]
    UncertainSignificance,
    #[default]
    Benign,
}

/// Select where annotations come from.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    strum::Display,
    serde::Serialize,
    serde::Deserialize,
    clap::ValueEnum,
    utoipa::ToSchema,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum AnnotationSource {
    /// Static table of gene regions, with quality gate.
    #[default]
    RegionTable,
    /// `RISK`, `CLNSIG`, `GENE`, `DISEASE` and `IMPACT` tags of the INFO column.
    InfoTags,
}

/// Annotation attached to one variant record.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct Annotation {
    /// Gene symbol, empty if none.
    pub gene: String,
    /// Disease risk tier.
    pub disease_risk: RiskTier,
    /// Pathogenicity label.
    pub pathogenicity: Pathogenicity,
    /// Clinical significance text.
    pub clinical_significance: String,
    /// Associated disease, only filled by the INFO tag source.
    pub disease: Option<String>,
    /// Putative impact, only filled by the INFO tag source.
    pub impact: Option<String>,
}

impl Default for Annotation {
    fn default() -> Self {
        Self {
            gene: String::new(),
            disease_risk: RiskTier::Low,
            pathogenicity: Pathogenicity::Benign,
            clinical_significance: String::from("Unknown"),
            disease: None,
            impact: None,
        }
    }
}

/// A variant record together with its annotation.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct AnnotatedVariant {
    #[serde(flatten)]
    pub record: VariantRecord,
    #[serde(flatten)]
    pub annotation: Annotation,
}

impl AnnotationSource {
    /// Annotate a single record.
    pub fn annotate_record(&self, record: &VariantRecord) -> Annotation {
        match self {
            AnnotationSource::RegionTable => regions::annotate_record(record),
            AnnotationSource::InfoTags => info_tags::annotate_record(record),
        }
    }

    /// Annotate all records, preserving their order.
    pub fn annotate(&self, records: &[VariantRecord]) -> Vec<AnnotatedVariant> {
        let result: Vec<_> = records
            .iter()
            .map(|record| AnnotatedVariant {
                record: record.clone(),
                annotation: self.annotate_record(record),
            })
            .collect();
        tracing::info!(
            "Annotated {} variants from {} ({} matched a gene)",
            result.len(),
            self,
            result.iter().filter(|v| !v.annotation.gene.is_empty()).count()
        );
        result
    }
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::vcf::VcfContent;

    #[test]
    fn risk_tier_display_and_from_str() -> Result<(), anyhow::Error> {
        assert_eq!(format!("{}", RiskTier::High), "High");
        assert_eq!(RiskTier::from_str("Medium")?, RiskTier::Medium);
        assert!(RiskTier::Low < RiskTier::Medium && RiskTier::Medium < RiskTier::High);

        Ok(())
    }

    #[test]
    fn pathogenicity_display() {
        assert_eq!(format!("{}", Pathogenicity::Pathogenic), "Pathogenic");
        assert_eq!(
            format!("{}", Pathogenicity::LikelyPathogenic),
            "Likely Pathogenic"
        );
        assert_eq!(
            format!("{}", Pathogenicity::UncertainSignificance),
            "Uncertain Significance"
        );
        assert_eq!(format!("{}", Pathogenicity::Benign), "Benign");
    }

    #[test]
    fn annotation_source_display() {
        assert_eq!(format!("{}", AnnotationSource::RegionTable), "region-table");
        assert_eq!(format!("{}", AnnotationSource::InfoTags), "info-tags");
    }

    #[rstest::rstest]
    #[case(AnnotationSource::RegionTable)]
    #[case(AnnotationSource::InfoTags)]
    fn annotate_preserves_length_and_order(
        #[case] source: AnnotationSource,
    ) -> Result<(), anyhow::Error> {
        let records = VcfContent::from_path("tests/data/vcf/small.vcf")?.records;
        let annotated = source.annotate(&records);

        assert_eq!(annotated.len(), records.len());
        for (record, variant) in records.iter().zip(annotated.iter()) {
            assert_eq!(record, &variant.record);
        }

        Ok(())
    }

    #[rstest::rstest]
    #[case(AnnotationSource::RegionTable)]
    #[case(AnnotationSource::InfoTags)]
    fn annotate_is_idempotent(#[case] source: AnnotationSource) -> Result<(), anyhow::Error> {
        let records = VcfContent::from_path("tests/data/vcf/info_tags.vcf")?.records;
        let first = source.annotate(&records);
        let again: Vec<_> = first.iter().map(|v| v.record.clone()).collect();
        let second = source.annotate(&again);

        assert_eq!(first, second);

        Ok(())
    }

    #[test]
    fn annotated_variant_serializes_flat() -> Result<(), anyhow::Error> {
        let records = VcfContent::from_path("tests/data/vcf/small.vcf")?.records;
        let annotated = AnnotationSource::RegionTable.annotate(&records[..1]);
        let value = serde_json::to_value(&annotated[0])?;

        assert_eq!(value["chromosome"], "17");
        assert_eq!(value["gene"], "BRCA1");
        assert_eq!(value["disease_risk"], "High");
        assert_eq!(value["pathogenicity"], "Pathogenic");
        assert!(value.get("impact").is_none());

        Ok(())
    }
}
