use criterion::{criterion_group, criterion_main, BatchSize, Criterion};

use genomeguard::annotate::AnnotationSource;
use genomeguard::pipeline::{ConfigBuilder, Pipeline};
use genomeguard::score::ScoringModel;

/// Build a synthetic VCF with `n` records spread over the annotated regions.
fn synthetic_vcf(n: usize) -> String {
    let sites = [
        ("17", 43_044_300, "GENE=BRCA1;CLNSIG=Pathogenic;RISK=HIGH"),
        ("13", 32_315_500, "GENE=BRCA2;CLNSIG=Likely_pathogenic;RISK=HIGH"),
        ("19", 44_908_700, "GENE=APOE;CLNSIG=Uncertain_significance;RISK=MEDIUM"),
        ("1", 1_000_000, "CLNSIG=Benign;RISK=LOW"),
    ];
    let mut vcf =
        String::from("##fileformat=VCFv4.2\n#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n");
    for i in 0..n {
        let (chrom, pos, info) = sites[i % sites.len()];
        vcf.push_str(&format!(
            "{}\t{}\t.\tA\tG\t{}\tPASS\t{}\n",
            chrom,
            pos + i,
            20 + i % 40,
            info
        ));
    }
    vcf
}

fn pipeline_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");

    let vcf = synthetic_vcf(10_000);
    for (name, source, model) in [
        ("regions_linear", AnnotationSource::RegionTable, ScoringModel::Linear),
        (
            "info_tags_tier_distribution",
            AnnotationSource::InfoTags,
            ScoringModel::TierDistribution,
        ),
    ] {
        let pipeline = Pipeline::new(
            ConfigBuilder::default()
                .annotation_source(source)
                .scoring_model(model)
                .build()
                .unwrap(),
        );
        group.bench_function(name, |b| {
            b.iter_batched(
                || vcf.as_bytes(),
                |data| pipeline.run(data).unwrap(),
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(benches, pipeline_run);
criterion_main!(benches);
