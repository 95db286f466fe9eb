// src/models.rs
use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::{ClientError, Result};

/// The reference chromosome set accepted by the prediction API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Chromosome {
    #[serde(rename = "chr1")]
    Chr1,
    #[serde(rename = "chr2")]
    Chr2,
    #[serde(rename = "chr3")]
    Chr3,
    #[serde(rename = "chr4")]
    Chr4,
    #[serde(rename = "chr5")]
    Chr5,
    #[serde(rename = "chr6")]
    Chr6,
    #[serde(rename = "chr7")]
    Chr7,
    #[serde(rename = "chr8")]
    Chr8,
    #[serde(rename = "chr9")]
    Chr9,
    #[serde(rename = "chr10")]
    Chr10,
    #[serde(rename = "chr11")]
    Chr11,
    #[serde(rename = "chr12")]
    Chr12,
    #[serde(rename = "chr13")]
    Chr13,
    #[serde(rename = "chr14")]
    Chr14,
    #[serde(rename = "chr15")]
    Chr15,
    #[serde(rename = "chr16")]
    Chr16,
    #[serde(rename = "chr17")]
    Chr17,
    #[serde(rename = "chr18")]
    Chr18,
    #[serde(rename = "chr19")]
    Chr19,
    #[serde(rename = "chr20")]
    Chr20,
    #[serde(rename = "chr21")]
    Chr21,
    #[serde(rename = "chr22")]
    Chr22,
    #[serde(rename = "chrX")]
    ChrX,
    #[serde(rename = "chrY")]
    ChrY,
}

impl Chromosome {
    pub const ALL: [Chromosome; 24] = [
        Chromosome::Chr1,
        Chromosome::Chr2,
        Chromosome::Chr3,
        Chromosome::Chr4,
        Chromosome::Chr5,
        Chromosome::Chr6,
        Chromosome::Chr7,
        Chromosome::Chr8,
        Chromosome::Chr9,
        Chromosome::Chr10,
        Chromosome::Chr11,
        Chromosome::Chr12,
        Chromosome::Chr13,
        Chromosome::Chr14,
        Chromosome::Chr15,
        Chromosome::Chr16,
        Chromosome::Chr17,
        Chromosome::Chr18,
        Chromosome::Chr19,
        Chromosome::Chr20,
        Chromosome::Chr21,
        Chromosome::Chr22,
        Chromosome::ChrX,
        Chromosome::ChrY,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Chromosome::Chr1 => "chr1",
            Chromosome::Chr2 => "chr2",
            Chromosome::Chr3 => "chr3",
            Chromosome::Chr4 => "chr4",
            Chromosome::Chr5 => "chr5",
            Chromosome::Chr6 => "chr6",
            Chromosome::Chr7 => "chr7",
            Chromosome::Chr8 => "chr8",
            Chromosome::Chr9 => "chr9",
            Chromosome::Chr10 => "chr10",
            Chromosome::Chr11 => "chr11",
            Chromosome::Chr12 => "chr12",
            Chromosome::Chr13 => "chr13",
            Chromosome::Chr14 => "chr14",
            Chromosome::Chr15 => "chr15",
            Chromosome::Chr16 => "chr16",
            Chromosome::Chr17 => "chr17",
            Chromosome::Chr18 => "chr18",
            Chromosome::Chr19 => "chr19",
            Chromosome::Chr20 => "chr20",
            Chromosome::Chr21 => "chr21",
            Chromosome::Chr22 => "chr22",
            Chromosome::ChrX => "chrX",
            Chromosome::ChrY => "chrY",
        }
    }
}

impl fmt::Display for Chromosome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Chromosome {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        Chromosome::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| {
                ClientError::InvalidInput(format!(
                    "unknown chromosome '{}' (expected chr1..chr22, chrX or chrY)",
                    s
                ))
            })
    }
}

/// Assay/prediction categories offered by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutputType {
    Atac,
    Cage,
    Dnase,
    RnaSeq,
    ChipHistone,
    ChipTf,
    SpliceSites,
    SpliceSiteUsage,
    SpliceJunctions,
    ContactMaps,
    Procap,
}

impl OutputType {
    pub const ALL: [OutputType; 11] = [
        OutputType::Atac,
        OutputType::Cage,
        OutputType::Dnase,
        OutputType::RnaSeq,
        OutputType::ChipHistone,
        OutputType::ChipTf,
        OutputType::SpliceSites,
        OutputType::SpliceSiteUsage,
        OutputType::SpliceJunctions,
        OutputType::ContactMaps,
        OutputType::Procap,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputType::Atac => "ATAC",
            OutputType::Cage => "CAGE",
            OutputType::Dnase => "DNASE",
            OutputType::RnaSeq => "RNA_SEQ",
            OutputType::ChipHistone => "CHIP_HISTONE",
            OutputType::ChipTf => "CHIP_TF",
            OutputType::SpliceSites => "SPLICE_SITES",
            OutputType::SpliceSiteUsage => "SPLICE_SITE_USAGE",
            OutputType::SpliceJunctions => "SPLICE_JUNCTIONS",
            OutputType::ContactMaps => "CONTACT_MAPS",
            OutputType::Procap => "PROCAP",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            OutputType::Atac => "ATAC-seq chromatin accessibility",
            OutputType::Cage => "CAGE transcription start sites",
            OutputType::Dnase => "DNase-seq chromatin accessibility",
            OutputType::RnaSeq => "RNA sequencing gene expression",
            OutputType::ChipHistone => "ChIP-seq histone modifications",
            OutputType::ChipTf => "ChIP-seq transcription factors",
            OutputType::SpliceSites => "Splice site predictions",
            OutputType::SpliceSiteUsage => "Splice site usage",
            OutputType::SpliceJunctions => "Splice junctions",
            OutputType::ContactMaps => "3D chromatin contacts",
            OutputType::Procap => "PRO-cap nascent transcription",
        }
    }
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputType {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        let upper = s.to_uppercase();
        OutputType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == upper)
            .ok_or_else(|| ClientError::InvalidInput(format!("unknown output type '{}'", s)))
    }
}

/// A genomic coordinate range on a named chromosome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub chromosome: Chromosome,
    pub start: u64,
    pub end: u64,
}

impl Interval {
    pub fn new(chromosome: Chromosome, start: u64, end: u64) -> Self {
        Self {
            chromosome,
            start,
            end,
        }
    }

    pub fn width(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_valid(&self) -> bool {
        self.start > 0 && self.end > self.start
    }

    pub fn validate(&self) -> Result<()> {
        if self.start == 0 {
            return Err(ClientError::InvalidInput(
                "interval start must be greater than zero".to_string(),
            ));
        }
        if self.end <= self.start {
            return Err(ClientError::InvalidInput(format!(
                "interval end ({}) must be greater than start ({})",
                self.end, self.start
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.chromosome, self.start, self.end)
    }
}

impl FromStr for Interval {
    type Err = ClientError;

    /// Parses an interval literal of the form `chr19:40991281-41018398`.
    fn from_str(s: &str) -> Result<Self> {
        let re = Regex::new(r"^([A-Za-z0-9]+):(\d+)-(\d+)$").unwrap();
        let caps = re.captures(s.trim()).ok_or_else(|| {
            ClientError::InvalidInput(format!(
                "could not parse interval '{}' (expected chrN:start-end)",
                s
            ))
        })?;
        let chromosome = caps[1].parse::<Chromosome>()?;
        let start = caps[2]
            .parse::<u64>()
            .map_err(|_| ClientError::InvalidInput(format!("bad interval start in '{}'", s)))?;
        let end = caps[3]
            .parse::<u64>()
            .map_err(|_| ClientError::InvalidInput(format!("bad interval end in '{}'", s)))?;
        let interval = Interval::new(chromosome, start, end);
        interval.validate()?;
        Ok(interval)
    }
}

pub const MAX_ALLELE_LEN: usize = 100;

/// A substitution at a genomic position. Alleles are normalized to
/// uppercase on construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub chromosome: Chromosome,
    pub position: u64,
    #[serde(rename = "ref")]
    pub ref_allele: String,
    #[serde(rename = "alt")]
    pub alt_allele: String,
}

impl Variant {
    pub fn new(chromosome: Chromosome, position: u64, ref_allele: &str, alt_allele: &str) -> Self {
        Self {
            chromosome,
            position,
            ref_allele: ref_allele.to_uppercase(),
            alt_allele: alt_allele.to_uppercase(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    pub fn validate(&self) -> Result<()> {
        if self.position == 0 {
            return Err(ClientError::InvalidInput(
                "variant position must be greater than zero".to_string(),
            ));
        }
        for (label, allele) in [("ref", &self.ref_allele), ("alt", &self.alt_allele)] {
            if allele.is_empty() {
                return Err(ClientError::InvalidInput(format!(
                    "{} allele must not be empty",
                    label
                )));
            }
            if allele.len() > MAX_ALLELE_LEN {
                return Err(ClientError::InvalidInput(format!(
                    "{} allele exceeds {} characters",
                    label, MAX_ALLELE_LEN
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} {}>{}",
            self.chromosome, self.position, self.ref_allele, self.alt_allele
        )
    }
}

impl FromStr for Variant {
    type Err = ClientError;

    /// Parses a variant literal of the form `chr22:36201698:A>C`.
    fn from_str(s: &str) -> Result<Self> {
        let re = Regex::new(r"^([A-Za-z0-9]+):(\d+):([A-Za-z]+)>([A-Za-z]+)$").unwrap();
        let caps = re.captures(s.trim()).ok_or_else(|| {
            ClientError::InvalidInput(format!(
                "could not parse variant '{}' (expected chrN:pos:REF>ALT)",
                s
            ))
        })?;
        let chromosome = caps[1].parse::<Chromosome>()?;
        let position = caps[2]
            .parse::<u64>()
            .map_err(|_| ClientError::InvalidInput(format!("bad variant position in '{}'", s)))?;
        let variant = Variant::new(chromosome, position, &caps[3], &caps[4]);
        variant.validate()?;
        Ok(variant)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermKind {
    Tissue,
    CellLine,
}

impl fmt::Display for TermKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TermKind::Tissue => f.write_str("tissue"),
            TermKind::CellLine => f.write_str("cell line"),
        }
    }
}

/// A controlled-vocabulary tissue or cell line identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OntologyTerm {
    pub name: String,
    pub code: String,
    #[serde(rename = "type")]
    pub kind: TermKind,
}

impl OntologyTerm {
    /// Resolves a code against the built-in reference list; unknown codes
    /// pass through as bare terms (the server validates them).
    pub fn from_code(code: &str) -> OntologyTerm {
        reference_terms()
            .into_iter()
            .find(|t| t.code == code)
            .unwrap_or_else(|| OntologyTerm {
                name: code.to_string(),
                code: code.to_string(),
                kind: TermKind::Tissue,
            })
    }
}

/// Built-in fallback for the server's ontology term vocabulary.
pub fn reference_terms() -> Vec<OntologyTerm> {
    const TERMS: &[(&str, &str, TermKind)] = &[
        ("brain", "UBERON:0000955", TermKind::Tissue),
        ("lung", "UBERON:0002048", TermKind::Tissue),
        ("liver", "UBERON:0002107", TermKind::Tissue),
        ("heart", "UBERON:0000948", TermKind::Tissue),
        ("blood", "UBERON:0000178", TermKind::Tissue),
        ("kidney", "UBERON:0002113", TermKind::Tissue),
        ("pancreas", "UBERON:0001264", TermKind::Tissue),
        ("skeletal muscle", "UBERON:0001134", TermKind::Tissue),
        ("skin of body", "UBERON:0002097", TermKind::Tissue),
        ("spleen", "UBERON:0002106", TermKind::Tissue),
        ("HepG2", "EFO:0001187", TermKind::CellLine),
        ("K562", "EFO:0002067", TermKind::CellLine),
        ("GM12878", "EFO:0002784", TermKind::CellLine),
        ("HCT116", "EFO:0001232", TermKind::CellLine),
    ];
    TERMS
        .iter()
        .map(|(name, code, kind)| OntologyTerm {
            name: (*name).to_string(),
            code: (*code).to_string(),
            kind: *kind,
        })
        .collect()
}

/// Case-insensitive substring search over term names and codes, matching the
/// server's metadata filter.
pub fn search_reference_terms(query: &str) -> Vec<OntologyTerm> {
    let needle = query.to_lowercase();
    reference_terms()
        .into_iter()
        .filter(|t| {
            t.name.to_lowercase().contains(&needle) || t.code.to_lowercase().contains(&needle)
        })
        .collect()
}

pub const MAX_ONTOLOGY_TERMS: usize = 5;

/// An ordered selection of at most five distinct ontology terms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OntologySelection {
    terms: Vec<OntologyTerm>,
}

impl OntologySelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a selection from codes, erroring past the cap.
    pub fn from_codes<I, S>(codes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selection = OntologySelection::new();
        for code in codes {
            let term = OntologyTerm::from_code(code.as_ref());
            if selection.contains(&term.code) {
                continue;
            }
            if !selection.add(term) {
                return Err(ClientError::InvalidInput(format!(
                    "at most {} ontology terms may be selected",
                    MAX_ONTOLOGY_TERMS
                )));
            }
        }
        Ok(selection)
    }

    /// Adds a term, preserving insertion order. Returns false when the term
    /// is already selected or the cap is reached.
    pub fn add(&mut self, term: OntologyTerm) -> bool {
        if self.contains(&term.code) || self.terms.len() >= MAX_ONTOLOGY_TERMS {
            return false;
        }
        self.terms.push(term);
        true
    }

    pub fn remove(&mut self, code: &str) {
        self.terms.retain(|t| t.code != code);
    }

    pub fn contains(&self, code: &str) -> bool {
        self.terms.iter().any(|t| t.code == code)
    }

    pub fn codes(&self) -> Vec<String> {
        self.terms.iter().map(|t| t.code.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OntologyTerm> {
        self.terms.iter()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

// --- Request payloads ---

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct IntervalPredictRequest {
    pub chromosome: Chromosome,
    pub start: u64,
    pub end: u64,
    pub output_types: Vec<OutputType>,
    pub ontology_terms: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VariantPredictRequest {
    pub chromosome: Chromosome,
    pub position: u64,
    #[serde(rename = "ref")]
    pub ref_allele: String,
    #[serde(rename = "alt")]
    pub alt_allele: String,
    pub output_types: Vec<OutputType>,
    pub ontology_terms: Vec<String>,
}

/// Scoring never carries ontology terms.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScoreVariantRequest {
    pub chromosome: Chromosome,
    pub position: u64,
    #[serde(rename = "ref")]
    pub ref_allele: String,
    #[serde(rename = "alt")]
    pub alt_allele: String,
    pub output_types: Vec<OutputType>,
}

// --- Response bodies ---

#[derive(Debug, Clone, Deserialize)]
pub struct OutputTypeInfo {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputTypesResponse {
    pub output_types: Vec<OutputTypeInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OntologyTermsResponse {
    pub terms: Vec<OntologyTerm>,
}

/// Server-side view of the predicted region; `sequence_length` is the model
/// window name (e.g. `128KB`) and is rendered verbatim.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IntervalInfo {
    pub chromosome: Chromosome,
    pub start: u64,
    pub end: u64,
    pub width: u64,
    pub sequence_length: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictResponse {
    pub plot_urls: Vec<String>,
    pub interval: IntervalInfo,
    #[serde(default)]
    pub variant: Option<Variant>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VariantScore {
    pub gene_name: String,
    #[serde(default)]
    pub gene_id: String,
    #[serde(default)]
    pub strand: String,
    #[serde(default)]
    pub ontology_term: String,
    pub biosample_name: String,
    pub raw_score: f64,
    pub quantile_score: f64,
    pub output_type: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaginationInfo {
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoreResponse {
    pub variant: Variant,
    pub scores: Vec<VariantScore>,
    #[serde(default)]
    pub pagination: Option<PaginationInfo>,
}
