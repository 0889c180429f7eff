//! Structured summaries and plain text reports of analyses.

use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::analysis::{AnalysisResult, AnalysisStatus};
use crate::annotate::AnnotatedVariant;
use crate::common::percentage;
use crate::score::RiskClass;

/// Placeholder for missing risk fields.
const NOT_AVAILABLE: &str = "N/A";
/// Placeholder for missing annotation fields.
const UNKNOWN: &str = "Unknown";
/// Width of the section rules.
const RULE_WIDTH: usize = 66;

/// A count together with its share of all variants.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct Share {
    pub count: usize,
    /// Percentage of all variants, rounded to one decimal.
    pub percentage: f64,
}

impl Share {
    fn new(count: usize, total: usize) -> Self {
        Self {
            count,
            percentage: (percentage(count, total) * 10.0).round() / 10.0,
        }
    }
}

/// One variant of the listing.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct VariantSummary {
    pub chromosome: String,
    pub position: u64,
    pub variant_id: String,
    /// Gene symbol, `Unknown` if none.
    pub gene: String,
    pub reference: String,
    pub alternative: String,
    pub risk: String,
    pub clinical_significance: String,
    pub disease: String,
    pub impact: String,
}

impl From<&AnnotatedVariant> for VariantSummary {
    fn from(variant: &AnnotatedVariant) -> Self {
        let record = &variant.record;
        let annotation = &variant.annotation;
        let or_unknown = |value: &str| {
            if value.is_empty() {
                UNKNOWN.to_string()
            } else {
                value.to_string()
            }
        };
        Self {
            chromosome: record.chromosome.clone(),
            position: record.position,
            variant_id: or_unknown(&record.id),
            gene: or_unknown(&annotation.gene),
            reference: or_unknown(&record.reference),
            alternative: or_unknown(&record.alternative),
            risk: annotation.disease_risk.to_string(),
            clinical_significance: or_unknown(&annotation.clinical_significance),
            disease: or_unknown(annotation.disease.as_deref().unwrap_or_default())
                .replace('_', " "),
            impact: or_unknown(annotation.impact.as_deref().unwrap_or_default()),
        }
    }
}

/// Structured summary of an analysis.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct Summary {
    pub analysis_id: String,
    pub owner: String,
    pub filename: String,
    pub status: AnalysisStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub risk_classification: Option<RiskClass>,
    pub risk_probability: Option<f64>,
    pub total_variants: usize,
    pub high_risk: Share,
    pub medium_risk: Share,
    pub low_risk: Share,
    pub pathogenic: Share,
    pub likely_pathogenic: Share,
    pub vus: Share,
    pub benign: Share,
    /// Pathogenic and likely pathogenic together.
    pub pathogenic_or_likely: Share,
    /// Headline of the interpretation, absent before completion.
    pub interpretation: Option<String>,
    pub error_message: Option<String>,
    pub variants: Vec<VariantSummary>,
}

impl Summary {
    /// Summarize `analysis`.
    ///
    /// Risk fields are only reported for completed analyses.
    pub fn from_analysis(analysis: &AnalysisResult) -> Self {
        let total = analysis.total_variants;
        let (risk_classification, risk_probability) = match analysis.status {
            AnalysisStatus::Completed => (analysis.risk_classification, analysis.risk_probability),
            _ => (None, None),
        };
        Self {
            analysis_id: analysis.id.clone(),
            owner: analysis.owner.clone(),
            filename: analysis.filename.clone(),
            status: analysis.status,
            created_at: analysis.created_at,
            completed_at: analysis.completed_at,
            risk_classification,
            risk_probability,
            total_variants: total,
            high_risk: Share::new(analysis.high_risk_variants, total),
            medium_risk: Share::new(analysis.medium_risk_variants, total),
            low_risk: Share::new(analysis.low_risk_variants, total),
            pathogenic: Share::new(analysis.pathogenic_variants, total),
            likely_pathogenic: Share::new(analysis.likely_pathogenic_variants, total),
            vus: Share::new(analysis.vus_variants, total),
            benign: Share::new(analysis.benign_variants, total),
            pathogenic_or_likely: Share::new(
                analysis.pathogenic_variants + analysis.likely_pathogenic_variants,
                total,
            ),
            interpretation: risk_classification
                .map(|class| Interpretation::for_class(class).headline.to_string()),
            error_message: analysis.error_message.clone(),
            variants: analysis.variants.iter().map(VariantSummary::from).collect(),
        }
    }
}

/// Fixed interpretation text of a risk class.
struct Interpretation {
    headline: &'static str,
    body: &'static str,
    advice: &'static [&'static str],
}

static HIGH: Interpretation = Interpretation {
    headline: "HIGH RISK DETECTED",
    body: "The analyzed variants indicate an elevated likelihood of certain health conditions.\n\
           This is not a diagnosis, but the risk factors found may warrant:",
    advice: &[
        "Regular health monitoring",
        "Preventive screening programs",
        "Consultation with a genetic counselor",
        "Discussion with your healthcare provider",
    ],
};

static MEDIUM: Interpretation = Interpretation {
    headline: "MODERATE RISK DETECTED",
    body: "The analyzed variants indicate moderate risk factors for certain conditions.\n\
           Consider:",
    advice: &[
        "Regular health check-ups",
        "Discussing the findings with your healthcare provider",
        "Periodic reassessment as needed",
    ],
};

static LOW: Interpretation = Interpretation {
    headline: "LOW RISK DETECTED",
    body: "The analyzed variants indicate low risk factors for the covered conditions.\n\
           Recommendations:",
    advice: &[
        "Continue routine health check-ups",
        "Stay informed about your family health history",
    ],
};

impl Interpretation {
    fn for_class(class: RiskClass) -> &'static Interpretation {
        match class {
            RiskClass::High => &HIGH,
            RiskClass::Medium => &MEDIUM,
            RiskClass::Low => &LOW,
        }
    }
}

const DISCLAIMER: &str = "\
This report is for informational and research purposes only. It is not a
substitute for professional medical advice, diagnosis or treatment. The risk
score is a heuristic computed from a fixed gene region table and does not
account for environmental factors or variants outside the covered regions.";

/// Name of the report download.
pub fn report_filename(analysis_id: &str, date: DateTime<Utc>) -> String {
    let prefix: String = analysis_id.chars().take(8).collect();
    format!(
        "GenomeGuard_Report_{}_{}.txt",
        prefix,
        date.format("%Y%m%d")
    )
}

fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

fn section(out: &mut String, title: &str) -> std::fmt::Result {
    writeln!(out)?;
    writeln!(out, "{}", title)?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))
}

fn share_line(out: &mut String, label: &str, share: &Share) -> std::fmt::Result {
    writeln!(
        out,
        "  {:<40} {} ({:.1}%)",
        format!("{}:", label),
        share.count,
        share.percentage
    )
}

fn write_report(
    out: &mut String,
    summary: &Summary,
    report_date: DateTime<Utc>,
) -> std::fmt::Result {
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(out, "{:^width$}", "GENOMEGUARD GENOMIC ANALYSIS REPORT", width = RULE_WIDTH)?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;

    section(out, "OWNER")?;
    writeln!(out, "Owner ID:          {}", summary.owner)?;
    writeln!(out, "Report Date:       {}", format_timestamp(&report_date))?;

    section(out, "ANALYSIS SUMMARY")?;
    writeln!(out, "Analysis ID:       {}", summary.analysis_id)?;
    writeln!(out, "File Name:         {}", summary.filename)?;
    writeln!(out, "Analysis Date:     {}", format_timestamp(&summary.created_at))?;
    writeln!(out, "Status:            {}", summary.status.to_string().to_uppercase())?;
    if let Some(message) = &summary.error_message {
        writeln!(out, "Error:             {}", message)?;
    }

    section(out, "RISK ASSESSMENT")?;
    let risk = (summary.risk_classification, summary.risk_probability);
    let (level, probability, score) = match risk {
        (Some(class), Some(p)) => (
            class.to_string().to_uppercase(),
            format!("{:.1}%", p * 100.0),
            format!("{:.2} / 1.00", p),
        ),
        _ => (
            NOT_AVAILABLE.to_string(),
            NOT_AVAILABLE.to_string(),
            NOT_AVAILABLE.to_string(),
        ),
    };
    writeln!(out, "Overall Risk Level:  {}", level)?;
    writeln!(out, "Risk Probability:    {}", probability)?;
    writeln!(out, "Risk Score:          {}", score)?;

    section(out, "VARIANT STATISTICS")?;
    writeln!(out, "Total Variants Analyzed: {}", summary.total_variants)?;
    writeln!(out)?;
    writeln!(out, "Risk Level Distribution:")?;
    share_line(out, "High Risk Variants", &summary.high_risk)?;
    share_line(out, "Medium Risk Variants", &summary.medium_risk)?;
    share_line(out, "Low Risk Variants", &summary.low_risk)?;
    writeln!(out)?;
    writeln!(out, "Clinical Significance Distribution:")?;
    share_line(out, "Pathogenic Variants", &summary.pathogenic)?;
    share_line(out, "Likely Pathogenic Variants", &summary.likely_pathogenic)?;
    share_line(out, "Variants of Uncertain Significance", &summary.vus)?;
    share_line(out, "Benign Variants", &summary.benign)?;
    writeln!(out)?;
    share_line(
        out,
        "Pathogenic + Likely Pathogenic",
        &summary.pathogenic_or_likely,
    )?;

    section(out, "RISK INTERPRETATION")?;
    match summary.risk_classification {
        Some(class) => {
            let interpretation = Interpretation::for_class(class);
            writeln!(out, "{}", interpretation.headline)?;
            writeln!(out, "{}", interpretation.body)?;
            for advice in interpretation.advice {
                writeln!(out, "  - {}", advice)?;
            }
        }
        None => writeln!(
            out,
            "No interpretation is available for an analysis with status {}.",
            summary.status
        )?,
    }

    if !summary.variants.is_empty() {
        section(out, "TOP VARIANTS")?;
        for (i, variant) in summary.variants.iter().enumerate() {
            writeln!(out)?;
            writeln!(out, "Variant #{}", i + 1)?;
            writeln!(out, "  Chromosome:            {}", variant.chromosome)?;
            writeln!(out, "  Position:              {}", variant.position)?;
            writeln!(out, "  Variant ID:            {}", variant.variant_id)?;
            writeln!(out, "  Gene:                  {}", variant.gene)?;
            writeln!(out, "  Reference Allele:      {}", variant.reference)?;
            writeln!(out, "  Alternate Allele:      {}", variant.alternative)?;
            writeln!(out, "  Risk Level:            {}", variant.risk)?;
            writeln!(out, "  Clinical Significance: {}", variant.clinical_significance)?;
            writeln!(out, "  Associated Disease:    {}", variant.disease)?;
            writeln!(out, "  Impact:                {}", variant.impact)?;
        }
    }

    section(out, "DISCLAIMER")?;
    writeln!(out, "{}", DISCLAIMER)?;
    writeln!(out)?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(
        out,
        "Generated by GenomeGuard {}",
        crate::common::version()
    )?;
    writeln!(out, "Report ID: {}", summary.analysis_id)?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))
}

/// Render the plain text report of `analysis`, dated `report_date`.
pub fn render_text(
    analysis: &AnalysisResult,
    report_date: DateTime<Utc>,
) -> Result<String, anyhow::Error> {
    let summary = Summary::from_analysis(analysis);
    let mut out = String::new();
    write_report(&mut out, &summary, report_date)
        .map_err(|e| anyhow::anyhow!("could not render report: {}", e))?;
    Ok(out)
}
