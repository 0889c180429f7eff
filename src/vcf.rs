//! Lenient parsing of VCF text into variant records.
//!
//! Only the fixed columns and the `GT` value of the first sample are extracted.  Lines that do
//! not look like records are dropped rather than reported, so that a single malformed line does
//! not spoil an upload.

use std::io::BufRead;
use std::path::Path;

use thousands::Separable;

use crate::common::{io::std::open_read_maybe_gz, strip_chr};

/// Minimal number of TAB-separated fields of a record line (`CHROM` to `INFO`).
pub const MIN_FIELDS: usize = 8;

/// One record line of a VCF file.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct VariantRecord {
    /// Chromosome name without `chr` prefix.
    pub chromosome: String,
    /// 1-based position, `0` if the `POS` column did not parse.
    pub position: u64,
    /// Content of the `ID` column.
    pub id: String,
    /// Reference allele.
    pub reference: String,
    /// First alternate allele, empty for `.`.
    pub alternative: String,
    /// Phred-scaled quality, absent for `.` or unparsable values.
    pub quality: Option<f64>,
    /// Filter status, `PASS` for `.`.
    pub filter: String,
    /// Raw `INFO` column.
    pub info: String,
    /// Genotype of the first sample with `/` separators.
    pub genotype: Option<String>,
}

impl VariantRecord {
    /// Parse a single record line, `None` if it has fewer than `MIN_FIELDS` fields.
    ///
    /// Surrounding whitespace is removed before the line is split.
    pub fn from_line(line: &str) -> Option<Self> {
        let fields: Vec<&str> = line.trim().split('\t').collect();
        if fields.len() < MIN_FIELDS {
            return None;
        }

        let alternative = match fields[4] {
            "." => String::new(),
            alts => alts.split(',').next().unwrap_or_default().to_string(),
        };
        let filter = match fields[6] {
            "." => String::from("PASS"),
            filter => filter.to_string(),
        };

        Some(Self {
            chromosome: strip_chr(fields[0]).to_string(),
            position: parse_position(fields[1]),
            id: fields[2].to_string(),
            reference: fields[3].to_string(),
            alternative,
            quality: fields[5].parse::<f64>().ok().filter(|q| q.is_finite()),
            filter,
            info: fields[7].to_string(),
            genotype: genotype(&fields),
        })
    }
}

/// Parse the `POS` column, `0` unless it consists of ASCII digits only.
fn parse_position(value: &str) -> u64 {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return 0;
    }
    value.parse().unwrap_or(0)
}

/// Extract the `GT` value of the first sample, if any.
fn genotype(fields: &[&str]) -> Option<String> {
    let format = fields.get(8)?;
    let sample = fields.get(9)?;
    let gt_idx = format.split(':').position(|key| key == "GT")?;
    sample
        .split(':')
        .nth(gt_idx)
        .map(|gt| gt.replace('|', "/"))
}

/// The parsed content of a VCF file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VcfContent {
    /// Sample names from the `#CHROM` header line.
    pub samples: Vec<String>,
    /// Records in file order.
    pub records: Vec<VariantRecord>,
}

impl VcfContent {
    /// Parse VCF text from a reader.
    ///
    /// I/O errors are propagated; malformed record lines are dropped.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, anyhow::Error> {
        let mut result = Self::default();
        let mut dropped = 0usize;

        for line in reader.lines() {
            let line = line?;
            let line = line.trim();
            if line.starts_with("##") {
                continue;
            } else if line.starts_with("#CHROM") {
                result.samples = line.split('\t').skip(9).map(str::to_string).collect();
                continue;
            } else if line.is_empty() {
                continue;
            }

            match VariantRecord::from_line(line) {
                Some(record) => result.records.push(record),
                None => dropped += 1,
            }
        }

        if dropped > 0 {
            tracing::debug!("Dropped {} malformed VCF lines", dropped);
        }
        Ok(result)
    }

    /// Parse VCF text held in memory.
    pub fn from_text(text: &str) -> Result<Self, anyhow::Error> {
        Self::from_reader(text.as_bytes())
    }

    /// Parse a plain or gzip-compressed VCF file.
    pub fn from_path<P>(path: P) -> Result<Self, anyhow::Error>
    where
        P: AsRef<Path>,
    {
        let reader = open_read_maybe_gz(path.as_ref()).map_err(|e| {
            anyhow::anyhow!("could not open VCF file {}: {}", path.as_ref().display(), e)
        })?;
        Self::from_reader(reader)
    }
}

/// Parse the VCF text and require at least one variant record.
///
/// This is the preprocessing step of the pipeline: an unreadable input or an input without any
/// records is an error, never an empty success.
pub fn preprocess<R: BufRead>(reader: R) -> Result<Vec<VariantRecord>, anyhow::Error> {
    let content = VcfContent::from_reader(reader)
        .map_err(|e| anyhow::anyhow!("failed to read VCF file: {}", e))?;
    if content.records.is_empty() {
        anyhow::bail!("no variants found in VCF file");
    }
    tracing::info!(
        "Parsed {} variants",
        content.records.len().separate_with_commas()
    );
    Ok(content.records)
}
