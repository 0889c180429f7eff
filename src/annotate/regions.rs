//! Static table of disease gene regions and the position based annotation.
//!
//! Coordinates are 1-based, inclusive and refer to GRCh38.

use itertools::Itertools;

use super::{Annotation, Pathogenicity, RiskTier};
use crate::vcf::VariantRecord;

/// Records need a quality strictly above this value to be annotated from the table.
pub const QUALITY_THRESHOLD: f64 = 20.0;

/// A gene region with its associated diseases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneRegion {
    /// Gene symbol.
    pub gene: &'static str,
    /// Chromosome name without `chr` prefix.
    pub chromosome: &'static str,
    /// First position of the region.
    pub start: u64,
    /// Last position of the region.
    pub end: u64,
    /// Associated diseases.
    pub diseases: &'static [&'static str],
    /// Risk tier of variants in the region.
    pub risk: RiskTier,
}

impl GeneRegion {
    const fn new(
        gene: &'static str,
        chromosome: &'static str,
        start: u64,
        end: u64,
        diseases: &'static [&'static str],
        risk: RiskTier,
    ) -> Self {
        Self {
            gene,
            chromosome,
            start,
            end,
            diseases,
            risk,
        }
    }

    /// Whether the region covers the given position.
    pub fn contains(&self, chromosome: &str, position: u64) -> bool {
        self.chromosome == chromosome && self.start <= position && position <= self.end
    }

    /// The annotation for a variant falling into this region.
    pub fn annotation(&self) -> Annotation {
        Annotation {
            gene: self.gene.to_string(),
            disease_risk: self.risk,
            pathogenicity: if self.risk == RiskTier::High {
                Pathogenicity::Pathogenic
            } else {
                Pathogenicity::LikelyPathogenic
            },
            clinical_significance: self.diseases.iter().join(", "),
            disease: None,
            impact: None,
        }
    }
}

use super::RiskTier::{High, Low, Medium};

/// The gene regions, in lookup order.
#[rustfmt::skip]
pub static GENE_REGIONS: &[GeneRegion] = &[
    // chromosome 1
    GeneRegion::new("MTHFR", "1", 11_845_780, 11_867_680, &["Homocystinuria", "Cardiovascular Disease"], Medium),
    GeneRegion::new("MUTYH", "1", 45_794_855, 45_806_148, &["Colorectal Cancer"], High),
    GeneRegion::new("MPZ", "1", 161_222_797, 161_229_300, &["Charcot-Marie-Tooth Disease"], High),
    // chromosome 2
    GeneRegion::new("MSH2", "2", 47_403_067, 47_710_367, &["Lynch Syndrome", "Colorectal Cancer"], High),
    GeneRegion::new("MSH6", "2", 47_789_652, 47_810_099, &["Lynch Syndrome"], High),
    GeneRegion::new("APOB", "2", 21_224_301, 21_266_945, &["Familial Hypercholesterolemia"], Medium),
    // chromosome 3
    GeneRegion::new("MLH1", "3", 37_034_840, 37_092_337, &["Lynch Syndrome", "Colorectal Cancer"], High),
    GeneRegion::new("VHL", "3", 10_183_318, 10_195_354, &["Von Hippel-Lindau Syndrome"], High),
    GeneRegion::new("FANCD2", "3", 10_051_871, 10_143_872, &["Fanconi Anemia"], High),
    // chromosome 4
    GeneRegion::new("FGFR3", "4", 1_793_306, 1_808_872, &["Achondroplasia", "Bladder Cancer"], Medium),
    GeneRegion::new("HTT", "4", 3_074_876, 3_243_960, &["Huntington Disease"], High),
    // chromosome 5
    GeneRegion::new("APC", "5", 112_707_498, 112_846_239, &["Familial Adenomatous Polyposis", "Colorectal Cancer"], High),
    GeneRegion::new("MSH3", "5", 79_950_416, 80_174_502, &["Colorectal Cancer"], Medium),
    // chromosome 6
    GeneRegion::new("HFE", "6", 26_087_509, 26_098_343, &["Hemochromatosis"], Medium),
    GeneRegion::new("HLA-B", "6", 31_321_649, 31_324_989, &["Autoimmune Disorders"], Low),
    // chromosome 7
    GeneRegion::new("CFTR", "7", 117_480_025, 117_668_665, &["Cystic Fibrosis"], High),
    GeneRegion::new("BRAF", "7", 140_719_327, 140_924_929, &["Melanoma", "Colorectal Cancer"], High),
    GeneRegion::new("MET", "7", 116_672_196, 116_798_386, &["Papillary Renal Carcinoma"], Medium),
    // chromosome 8
    GeneRegion::new("MYC", "8", 127_735_434, 127_742_951, &["Burkitt Lymphoma", "Various Cancers"], High),
    // chromosome 9
    GeneRegion::new("CDKN2A", "9", 21_967_751, 21_995_301, &["Melanoma", "Pancreatic Cancer"], High),
    // chromosome 10
    GeneRegion::new("PTEN", "10", 87_863_113, 87_971_930, &["Cowden Syndrome", "Various Cancers"], High),
    GeneRegion::new("RET", "10", 43_077_027, 43_130_531, &["Thyroid Cancer", "MEN2"], High),
    // chromosome 11
    GeneRegion::new("HBB", "11", 5_225_463, 5_229_395, &["Sickle Cell Disease", "Thalassemia"], High),
    GeneRegion::new("ATM", "11", 108_222_484, 108_369_102, &["Ataxia-Telangiectasia", "Breast Cancer"], High),
    GeneRegion::new("MEN1", "11", 64_570_985, 64_578_765, &["Multiple Endocrine Neoplasia"], High),
    // chromosome 12
    GeneRegion::new("KRAS", "12", 25_205_246, 25_250_936, &["Colorectal Cancer", "Lung Cancer"], High),
    GeneRegion::new("VWF", "12", 6_093_537, 6_273_740, &["Von Willebrand Disease"], Medium),
    // chromosome 13
    GeneRegion::new("BRCA2", "13", 32_315_086, 32_400_266, &["Breast Cancer", "Ovarian Cancer", "Prostate Cancer"], High),
    GeneRegion::new("RB1", "13", 48_303_751, 48_481_890, &["Retinoblastoma"], High),
    // chromosome 14
    GeneRegion::new("SERPINA1", "14", 94_376_868, 94_390_692, &["Alpha-1 Antitrypsin Deficiency"], Medium),
    // chromosome 15
    GeneRegion::new("FBN1", "15", 48_408_313, 48_645_709, &["Marfan Syndrome"], High),
    // chromosome 16
    GeneRegion::new("PKD1", "16", 2_088_708, 2_135_898, &["Polycystic Kidney Disease"], High),
    GeneRegion::new("CDH1", "16", 68_737_289, 68_835_630, &["Gastric Cancer", "Breast Cancer"], High),
    // chromosome 17
    GeneRegion::new("BRCA1", "17", 43_044_295, 43_125_483, &["Breast Cancer", "Ovarian Cancer"], High),
    GeneRegion::new("TP53", "17", 7_661_779, 7_687_550, &["Li-Fraumeni Syndrome", "Various Cancers"], High),
    GeneRegion::new("NF1", "17", 31_094_927, 31_377_677, &["Neurofibromatosis Type 1"], High),
    GeneRegion::new("RARA", "17", 40_309_152, 40_357_643, &["Acute Promyelocytic Leukemia"], High),
    // chromosome 18
    GeneRegion::new("SMAD4", "18", 51_028_394, 51_085_045, &["Juvenile Polyposis", "Pancreatic Cancer"], High),
    // chromosome 19
    GeneRegion::new("APOE", "19", 44_905_791, 44_909_395, &["Alzheimer Disease", "Cardiovascular Disease"], Medium),
    GeneRegion::new("LDLR", "19", 11_200_038, 11_244_505, &["Familial Hypercholesterolemia"], High),
    GeneRegion::new("NOTCH3", "19", 15_159_041, 15_311_763, &["CADASIL"], Medium),
    // chromosome 20
    GeneRegion::new("JAK2", "20", 31_003_499, 31_084_094, &["Myeloproliferative Disorders"], Medium),
    // chromosome 21
    GeneRegion::new("APP", "21", 25_880_550, 26_171_128, &["Alzheimer Disease"], Medium),
    // chromosome 22
    GeneRegion::new("NF2", "22", 29_999_545, 30_094_589, &["Neurofibromatosis Type 2"], High),
    // chromosome X
    GeneRegion::new("DMD", "X", 31_119_220, 33_339_388, &["Duchenne Muscular Dystrophy"], High),
    GeneRegion::new("F8", "X", 154_064_063, 154_250_998, &["Hemophilia A"], High),
    GeneRegion::new("F9", "X", 139_530_557, 139_563_458, &["Hemophilia B"], High),
    GeneRegion::new("FMR1", "X", 147_910_000, 147_950_000, &["Fragile X Syndrome"], High),
];

/// First region in `regions` that covers the position.
pub fn find_region_in<'a>(
    regions: &'a [GeneRegion],
    chromosome: &str,
    position: u64,
) -> Option<&'a GeneRegion> {
    regions
        .iter()
        .find(|region| region.contains(chromosome, position))
}

/// First region in `GENE_REGIONS` that covers the position.
pub fn find_region(chromosome: &str, position: u64) -> Option<&'static GeneRegion> {
    find_region_in(GENE_REGIONS, chromosome, position)
}

/// Annotate a record from the region table.
///
/// Records failing the quality gate or outside of all regions get the default annotation.
pub fn annotate_record(record: &VariantRecord) -> Annotation {
    match record.quality {
        Some(quality) if quality > QUALITY_THRESHOLD => {
            find_region(&record.chromosome, record.position)
                .map(GeneRegion::annotation)
                .unwrap_or_default()
        }
        _ => Annotation::default(),
    }
}
