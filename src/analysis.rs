//! Analysis records and their status machine.

use chrono::{DateTime, Utc};

use crate::annotate::{AnnotatedVariant, Pathogenicity};
use crate::score::{FeatureVector, Prediction, RiskClass};

/// Number of variants kept on a completed analysis.
pub const MAX_VARIANT_DETAILS: usize = 10;

/// Lifecycle status of an analysis.
///
/// Transitions only move forward: pending to processing, and processing to either completed or
/// failed.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    strum::Display,
    strum::EnumString,
    serde::Serialize,
    serde::Deserialize,
    utoipa::ToSchema,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
}

impl AnalysisStatus {
    /// Whether moving from `self` to `next` is allowed.
    pub fn can_transition_to(self, next: AnalysisStatus) -> bool {
        use AnalysisStatus::*;
        matches!(
            (self, next),
            (Pending, Processing) | (Processing, Completed) | (Processing, Failed)
        )
    }

    /// Whether no further transition is possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, AnalysisStatus::Completed | AnalysisStatus::Failed)
    }
}

/// Rejected status transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid status transition from {from} to {to}")]
pub struct InvalidTransition {
    pub from: AnalysisStatus,
    pub to: AnalysisStatus,
}

/// One analysis of an uploaded VCF file.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct AnalysisResult {
    /// UUID v4 identifier.
    pub id: String,
    /// Identifier of the user that created the analysis.
    pub owner: String,
    /// Name of the uploaded file.
    pub filename: String,
    /// Current status.
    pub status: AnalysisStatus,
    /// Number of parsed variants.
    pub total_variants: usize,
    pub high_risk_variants: usize,
    pub medium_risk_variants: usize,
    pub low_risk_variants: usize,
    pub pathogenic_variants: usize,
    pub likely_pathogenic_variants: usize,
    pub vus_variants: usize,
    pub benign_variants: usize,
    /// Mean quality of the variants that have one.
    pub avg_quality: Option<f64>,
    /// Risk probability, set on completion.
    pub risk_probability: Option<f64>,
    /// Risk classification, set on completion.
    pub risk_classification: Option<RiskClass>,
    /// The first annotated variants, at most `MAX_VARIANT_DETAILS`.
    pub variants: Vec<AnnotatedVariant>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Reason of failure.
    pub error_message: Option<String>,
}

impl AnalysisResult {
    /// Create a pending analysis with a fresh identifier.
    pub fn new(owner: &str, filename: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            owner: owner.to_string(),
            filename: filename.to_string(),
            status: AnalysisStatus::Pending,
            total_variants: 0,
            high_risk_variants: 0,
            medium_risk_variants: 0,
            low_risk_variants: 0,
            pathogenic_variants: 0,
            likely_pathogenic_variants: 0,
            vus_variants: 0,
            benign_variants: 0,
            avg_quality: None,
            risk_probability: None,
            risk_classification: None,
            variants: Vec::new(),
            created_at: Utc::now(),
            completed_at: None,
            error_message: None,
        }
    }

    fn transition(&mut self, to: AnalysisStatus) -> Result<(), InvalidTransition> {
        if !self.status.can_transition_to(to) {
            return Err(InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }

    /// Move from pending to processing.
    pub fn start(&mut self) -> Result<(), InvalidTransition> {
        self.transition(AnalysisStatus::Processing)
    }

    /// Move from processing to completed and store the outcome.
    pub fn complete(
        &mut self,
        variants: &[AnnotatedVariant],
        features: &FeatureVector,
        prediction: &Prediction,
    ) -> Result<(), InvalidTransition> {
        self.transition(AnalysisStatus::Completed)?;

        self.total_variants = features.total;
        self.high_risk_variants = features.high;
        self.medium_risk_variants = features.medium;
        self.low_risk_variants = features.low;
        self.pathogenic_variants = features.pathogenic;
        let count = |p: Pathogenicity| {
            variants
                .iter()
                .filter(|v| v.annotation.pathogenicity == p)
                .count()
        };
        self.likely_pathogenic_variants = count(Pathogenicity::LikelyPathogenic);
        self.vus_variants = count(Pathogenicity::UncertainSignificance);
        self.benign_variants = count(Pathogenicity::Benign);
        self.avg_quality = features.avg_quality;
        self.risk_probability = Some(prediction.probability);
        self.risk_classification = Some(prediction.classification);
        self.variants = variants.iter().take(MAX_VARIANT_DETAILS).cloned().collect();
        self.completed_at = Some(Utc::now());
        self.error_message = None;

        Ok(())
    }

    /// Move from processing to failed, recording `message`.
    pub fn fail(&mut self, message: &str) -> Result<(), InvalidTransition> {
        self.transition(AnalysisStatus::Failed)?;
        self.error_message = Some(message.to_string());
        self.completed_at = Some(Utc::now());
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::annotate::AnnotationSource;
    use crate::score::{Noise, ScoringModel};
    use crate::vcf::VcfContent;

    #[rstest::rstest]
    #[case(AnalysisStatus::Pending, AnalysisStatus::Processing, true)]
    #[case(AnalysisStatus::Processing, AnalysisStatus::Completed, true)]
    #[case(AnalysisStatus::Processing, AnalysisStatus::Failed, true)]
    #[case(AnalysisStatus::Pending, AnalysisStatus::Completed, false)]
    #[case(AnalysisStatus::Pending, AnalysisStatus::Failed, false)]
    #[case(AnalysisStatus::Processing, AnalysisStatus::Pending, false)]
    #[case(AnalysisStatus::Completed, AnalysisStatus::Processing, false)]
    #[case(AnalysisStatus::Completed, AnalysisStatus::Failed, false)]
    #[case(AnalysisStatus::Failed, AnalysisStatus::Completed, false)]
    #[case(AnalysisStatus::Processing, AnalysisStatus::Processing, false)]
    fn transitions(
        #[case] from: AnalysisStatus,
        #[case] to: AnalysisStatus,
        #[case] allowed: bool,
    ) {
        assert_eq!(from.can_transition_to(to), allowed);
    }

    #[test]
    fn new_is_pending() {
        let analysis = AnalysisResult::new("alice", "sample.vcf");

        assert_eq!(analysis.status, AnalysisStatus::Pending);
        assert_eq!(analysis.id.len(), 36);
        assert!(uuid::Uuid::parse_str(&analysis.id).is_ok());
        assert_eq!(analysis.risk_probability, None);
        assert_ne!(analysis.id, AnalysisResult::new("alice", "sample.vcf").id);
    }

    #[test]
    fn complete_fills_counts() -> Result<(), anyhow::Error> {
        let records = VcfContent::from_path("tests/data/vcf/small.vcf")?.records;
        let variants = AnnotationSource::RegionTable.annotate(&records);
        let features = FeatureVector::from_variants(&variants);
        let prediction = ScoringModel::Linear.predict(&features, &Noise::None);

        let mut analysis = AnalysisResult::new("alice", "small.vcf");
        analysis.start()?;
        analysis.complete(&variants, &features, &prediction)?;

        assert_eq!(analysis.status, AnalysisStatus::Completed);
        assert_eq!(analysis.total_variants, 6);
        assert_eq!(analysis.pathogenic_variants, 2);
        assert_eq!(analysis.likely_pathogenic_variants, 1);
        assert_eq!(analysis.vus_variants, 0);
        assert_eq!(analysis.benign_variants, 3);
        assert_eq!(analysis.risk_probability, Some(prediction.probability));
        assert_eq!(analysis.variants.len(), 6);
        assert!(analysis.completed_at.is_some());

        Ok(())
    }

    #[test]
    fn complete_caps_variant_details() -> Result<(), anyhow::Error> {
        let text: String = (1..=25)
            .map(|pos| format!("1\t{}\t.\tA\tC\t30\tPASS\t.\n", pos))
            .collect();
        let records = VcfContent::from_text(&text)?.records;
        let variants = AnnotationSource::RegionTable.annotate(&records);
        let features = FeatureVector::from_variants(&variants);
        let prediction = ScoringModel::Linear.predict(&features, &Noise::None);

        let mut analysis = AnalysisResult::new("alice", "many.vcf");
        analysis.start()?;
        analysis.complete(&variants, &features, &prediction)?;

        assert_eq!(analysis.variants.len(), MAX_VARIANT_DETAILS);
        assert_eq!(analysis.variants[9].record.position, 10);

        Ok(())
    }

    #[test]
    fn illegal_transition_leaves_record_untouched() -> Result<(), anyhow::Error> {
        let mut analysis = AnalysisResult::new("alice", "sample.vcf");
        let before = analysis.clone();

        let err = analysis.fail("boom").unwrap_err();
        assert_eq!(
            err,
            InvalidTransition {
                from: AnalysisStatus::Pending,
                to: AnalysisStatus::Failed
            }
        );
        assert_eq!(err.to_string(), "invalid status transition from pending to failed");
        assert_eq!(analysis, before);

        analysis.start()?;
        analysis.fail("boom")?;
        assert!(analysis.status.is_terminal());
        assert!(analysis.start().is_err());
        assert_eq!(analysis.error_message.as_deref(), Some("boom"));

        Ok(())
    }

    #[test]
    fn serialization_skips_absent_fields() -> Result<(), anyhow::Error> {
        let analysis = AnalysisResult::new("alice", "sample.vcf");
        let value = serde_json::to_value(&analysis)?;

        assert_eq!(value["status"], "pending");
        assert!(value.get("risk_probability").is_none());
        assert!(value.get("error_message").is_none());

        let back: AnalysisResult = serde_json::from_value(value)?;
        assert_eq!(back, analysis);

        Ok(())
    }
}
