//! The parse, annotate and score pipeline for one analysis.

use std::io::BufRead;

use crate::analysis::{AnalysisResult, InvalidTransition};
use crate::annotate::{AnnotatedVariant, AnnotationSource};
use crate::score::{FeatureVector, Noise, Prediction, ScoringModel};
use crate::storage::{AnalysisStore, StoreError};
use crate::vcf;

/// Configuration of a `Pipeline`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, derive_builder::Builder, serde::Serialize,
)]
#[builder(pattern = "immutable")]
pub struct Config {
    /// Where annotations come from.
    #[builder(default)]
    pub annotation_source: AnnotationSource,
    /// Scoring formula.
    #[builder(default)]
    pub scoring_model: ScoringModel,
    /// Perturbation of the score, none by default.
    #[builder(default)]
    pub noise: Noise,
}

/// Everything computed from one VCF file.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    /// All annotated variants in file order.
    pub variants: Vec<AnnotatedVariant>,
    pub features: FeatureVector,
    pub prediction: Prediction,
}

/// Runs the stages sequentially with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: Config,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Parse, annotate and score the VCF text from `reader`.
    ///
    /// # Errors
    ///
    /// If the input cannot be read or contains no variant records.
    pub fn run<R: BufRead>(&self, reader: R) -> Result<PipelineOutput, anyhow::Error> {
        let records = vcf::preprocess(reader)?;
        let variants = self.config.annotation_source.annotate(&records);
        let features = FeatureVector::from_variants(&variants);
        tracing::debug!("features = {:?}", &features);
        let prediction = self
            .config
            .scoring_model
            .predict(&features, &self.config.noise);
        tracing::info!(
            "Risk {} with probability {:.2} ({} model)",
            prediction.classification,
            prediction.probability,
            self.config.scoring_model
        );

        Ok(PipelineOutput {
            variants,
            features,
            prediction,
        })
    }

    /// Move a processing `analysis` to completed or failed according to `output`.
    fn finish(
        analysis: &mut AnalysisResult,
        output: &Result<PipelineOutput, anyhow::Error>,
    ) -> Result<(), InvalidTransition> {
        match output {
            Ok(output) => analysis.complete(&output.variants, &output.features, &output.prediction),
            Err(e) => analysis.fail(&e.to_string()),
        }
    }

    /// Drive a pending `analysis` to a terminal status without a store.
    ///
    /// Pipeline failures are recorded on the analysis, not returned.
    pub fn analyze<R: BufRead>(
        &self,
        analysis: &mut AnalysisResult,
        reader: R,
    ) -> Result<(), InvalidTransition> {
        analysis.start()?;
        let output = self.run(reader);
        Self::finish(analysis, &output)
    }

    /// Process the uploaded `data` of the stored analysis `id` of `owner`.
    ///
    /// The analysis is marked processing in `store` before the pipeline runs and updated to
    /// completed or failed afterwards.  The returned error only concerns the store.
    pub fn process(
        &self,
        store: &dyn AnalysisStore,
        owner: &str,
        id: &str,
        data: &[u8],
    ) -> Result<AnalysisResult, StoreError> {
        tracing::info!("Starting pipeline for analysis {}", id);
        let before = std::time::Instant::now();
        store.update(owner, id, &mut |analysis| Ok(analysis.start()?))?;

        let output = self.run(data);
        let analysis = store.update(owner, id, &mut |analysis| {
            Ok(Self::finish(analysis, &output)?)
        })?;

        match &analysis.error_message {
            Some(message) => tracing::warn!("Analysis {} failed: {}", id, message),
            None => tracing::info!(
                "Analysis {} completed in {:?}",
                id,
                before.elapsed()
            ),
        }
        Ok(analysis)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::analysis::AnalysisStatus;
    use crate::score::RiskClass;
    use crate::storage::memory::InMemoryStore;

    #[test]
    fn config_builder_defaults() -> Result<(), anyhow::Error> {
        let config = ConfigBuilder::default().build()?;
        assert_eq!(config, Config::default());
        assert_eq!(config.annotation_source, AnnotationSource::RegionTable);
        assert_eq!(config.scoring_model, ScoringModel::Linear);
        assert_eq!(config.noise, Noise::None);

        Ok(())
    }

    #[test]
    fn run_brca1_scenario() -> Result<(), anyhow::Error> {
        let text = "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n\
                    17\t43100000\t.\tA\tG\t30\tPASS\t.\n";
        let output = Pipeline::default().run(text.as_bytes())?;

        assert_eq!(output.variants.len(), 1);
        assert_eq!(output.variants[0].annotation.gene, "BRCA1");
        // (4 + 5 + 3.5) / 25 = 0.5
        assert_eq!(output.prediction.probability, 0.5);
        assert_eq!(output.prediction.classification, RiskClass::Medium);

        Ok(())
    }

    #[test]
    fn run_missing_quality_scenario() -> Result<(), anyhow::Error> {
        let text = "17\t43100000\t.\tA\tG\t.\tPASS\t.\n";
        let output = Pipeline::default().run(text.as_bytes())?;

        assert_eq!(output.variants[0].record.quality, None);
        assert_eq!(output.variants[0].annotation.gene, "");
        assert_eq!(output.features.avg_quality, None);
        assert_eq!(output.prediction.probability, 0.05);

        Ok(())
    }

    #[test]
    fn run_with_info_tags() -> Result<(), anyhow::Error> {
        let config = ConfigBuilder::default()
            .annotation_source(AnnotationSource::InfoTags)
            .scoring_model(ScoringModel::TierDistribution)
            .build()?;
        let data = std::fs::read("tests/data/vcf/info_tags.vcf")?;
        let output = Pipeline::new(config).run(data.as_slice())?;

        // (1 + 0.5 + 3 * 0.1) / 5 * 0.7 = 0.252
        assert_eq!(output.features.high, 1);
        assert_eq!(output.features.medium, 1);
        assert_eq!(output.prediction.probability, 0.25);
        assert_eq!(output.prediction.classification, RiskClass::Low);

        Ok(())
    }

    #[test]
    fn run_is_reproducible_with_seeded_noise() -> Result<(), anyhow::Error> {
        let config = ConfigBuilder::default()
            .noise(Noise::Uniform {
                amplitude: 0.1,
                seed: 13,
            })
            .build()?;
        let data = std::fs::read("tests/data/vcf/small.vcf")?;
        let pipeline = Pipeline::new(config);

        assert_eq!(
            pipeline.run(data.as_slice())?,
            pipeline.run(data.as_slice())?
        );

        Ok(())
    }

    #[test]
    fn run_rejects_empty_input() {
        let err = Pipeline::default()
            .run("##fileformat=VCFv4.2\n".as_bytes())
            .unwrap_err();
        assert_eq!(err.to_string(), "no variants found in VCF file");
    }

    #[test]
    fn analyze_without_store() -> Result<(), anyhow::Error> {
        let data = std::fs::read("tests/data/vcf/small.vcf")?;
        let mut analysis = AnalysisResult::new("cli", "small.vcf");
        Pipeline::default().analyze(&mut analysis, data.as_slice())?;

        assert_eq!(analysis.status, AnalysisStatus::Completed);
        assert_eq!(analysis.total_variants, 6);

        Ok(())
    }

    #[test]
    fn process_completes() -> Result<(), anyhow::Error> {
        let store = InMemoryStore::default();
        let analysis = AnalysisResult::new("alice", "small.vcf");
        store.put(&analysis)?;

        let data = std::fs::read("tests/data/vcf/small.vcf")?;
        let processed = Pipeline::default().process(&store, "alice", &analysis.id, &data)?;

        assert_eq!(processed.status, AnalysisStatus::Completed);
        assert_eq!(processed.total_variants, 6);
        assert_eq!(processed.high_risk_variants, 2);
        assert!(processed.risk_probability.is_some());
        assert_eq!(store.get("alice", &analysis.id)?, processed);

        Ok(())
    }

    #[rstest::rstest]
    #[case::header_only(
        &b"##fileformat=VCFv4.2\n#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n"[..],
        "no variants found in VCF file"
    )]
    #[case::not_utf8(&[0xff, 0xfe, 0x00, 0x01][..], "failed to read VCF file")]
    fn process_fails(#[case] data: &[u8], #[case] message: &str) -> Result<(), anyhow::Error> {
        let store = InMemoryStore::default();
        let analysis = AnalysisResult::new("alice", "bad.vcf");
        store.put(&analysis)?;

        let processed = Pipeline::default().process(&store, "alice", &analysis.id, data)?;

        assert_eq!(processed.status, AnalysisStatus::Failed);
        assert!(processed
            .error_message
            .as_deref()
            .unwrap_or_default()
            .starts_with(message));
        assert_eq!(processed.risk_probability, None);

        Ok(())
    }

    #[test]
    #[tracing_test::traced_test]
    fn process_logs_failure() {
        let store = InMemoryStore::default();
        let analysis = AnalysisResult::new("alice", "empty.vcf");
        store.put(&analysis).unwrap();

        Pipeline::default()
            .process(&store, "alice", &analysis.id, b"##fileformat=VCFv4.2\n")
            .unwrap();

        assert!(logs_contain("failed: no variants found in VCF file"));
    }

    #[test]
    fn process_twice_is_rejected() -> Result<(), anyhow::Error> {
        let store = InMemoryStore::default();
        let analysis = AnalysisResult::new("alice", "small.vcf");
        store.put(&analysis)?;
        let data = std::fs::read("tests/data/vcf/small.vcf")?;
        let pipeline = Pipeline::default();
        let first = pipeline.process(&store, "alice", &analysis.id, &data)?;

        let res = pipeline.process(&store, "alice", &analysis.id, &data);
        assert!(matches!(res, Err(StoreError::InvalidTransition(_))));
        assert_eq!(store.get("alice", &analysis.id)?, first);

        Ok(())
    }
}
