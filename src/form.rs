// src/form.rs
use std::fmt;
use std::str::FromStr;

use crate::errors::{ClientError, Result};
use crate::models::{
    Chromosome, Interval, IntervalPredictRequest, OntologySelection, OutputType,
    ScoreVariantRequest, Variant, VariantPredictRequest,
};

/// The three request kinds the client can submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Predict,
    Variant,
    Score,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Predict => f.write_str("predict"),
            Mode::Variant => f.write_str("variant"),
            Mode::Score => f.write_str("score"),
        }
    }
}

impl FromStr for Mode {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "predict" => Ok(Mode::Predict),
            "variant" => Ok(Mode::Variant),
            "score" => Ok(Mode::Score),
            other => Err(ClientError::InvalidInput(format!(
                "unknown mode '{}' (expected predict, variant or score)",
                other
            ))),
        }
    }
}

/// A built request payload, one shape per mode.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestPayload {
    Interval(IntervalPredictRequest),
    Variant(VariantPredictRequest),
    Score(ScoreVariantRequest),
}

/// Everything the user has dialed in: mode, coordinates, output types and
/// the ontology selection. Requests are built fresh from this on each
/// submit and never persisted.
#[derive(Debug, Clone)]
pub struct FormState {
    pub mode: Mode,
    pub interval: Interval,
    pub variant: Variant,
    pub output_types: Vec<OutputType>,
    pub ontology: OntologySelection,
}

impl Default for FormState {
    /// The seeded example region and variant the original client starts
    /// with.
    fn default() -> Self {
        Self {
            mode: Mode::Predict,
            interval: Interval::new(Chromosome::Chr19, 40_991_281, 41_018_398),
            variant: Variant::new(Chromosome::Chr22, 36_201_698, "A", "C"),
            output_types: vec![OutputType::RnaSeq],
            ontology: OntologySelection::new(),
        }
    }
}

impl FormState {
    /// The submit gate: output types must be selected, and the coordinates
    /// for the current mode must satisfy their invariants. Submission is
    /// disabled (not errored post-hoc) while this is false.
    pub fn can_submit(&self) -> bool {
        if self.output_types.is_empty() {
            return false;
        }
        match self.mode {
            Mode::Predict => self.interval.is_valid(),
            Mode::Variant | Mode::Score => self.variant.is_valid(),
        }
    }

    /// Builds the payload for the current mode, or explains why the gate
    /// fails.
    pub fn build_request(&self) -> Result<RequestPayload> {
        if self.output_types.is_empty() {
            return Err(ClientError::InvalidInput(
                "select at least one output type".to_string(),
            ));
        }
        match self.mode {
            Mode::Predict => {
                self.interval.validate()?;
                Ok(RequestPayload::Interval(build_interval_request(
                    &self.interval,
                    &self.output_types,
                    &self.ontology,
                )))
            }
            Mode::Variant => {
                self.variant.validate()?;
                Ok(RequestPayload::Variant(build_variant_request(
                    &self.variant,
                    &self.output_types,
                    &self.ontology,
                )))
            }
            Mode::Score => {
                self.variant.validate()?;
                Ok(RequestPayload::Score(build_score_request(
                    &self.variant,
                    &self.output_types,
                )))
            }
        }
    }
}

pub fn build_interval_request(
    interval: &Interval,
    output_types: &[OutputType],
    ontology: &OntologySelection,
) -> IntervalPredictRequest {
    IntervalPredictRequest {
        chromosome: interval.chromosome,
        start: interval.start,
        end: interval.end,
        output_types: output_types.to_vec(),
        ontology_terms: ontology.codes(),
    }
}

pub fn build_variant_request(
    variant: &Variant,
    output_types: &[OutputType],
    ontology: &OntologySelection,
) -> VariantPredictRequest {
    VariantPredictRequest {
        chromosome: variant.chromosome,
        position: variant.position,
        ref_allele: variant.ref_allele.clone(),
        alt_allele: variant.alt_allele.clone(),
        output_types: output_types.to_vec(),
        ontology_terms: ontology.codes(),
    }
}

/// Ontology terms are never sent for scoring.
pub fn build_score_request(variant: &Variant, output_types: &[OutputType]) -> ScoreVariantRequest {
    ScoreVariantRequest {
        chromosome: variant.chromosome,
        position: variant.position,
        ref_allele: variant.ref_allele.clone(),
        alt_allele: variant.alt_allele.clone(),
        output_types: output_types.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OntologyTerm;

    fn form_with_terms(codes: &[&str]) -> FormState {
        let mut form = FormState::default();
        for code in codes {
            form.ontology.add(OntologyTerm::from_code(code));
        }
        form
    }

    #[test]
    fn test_predict_payload_carries_interval_and_selection_order() {
        let mut form = form_with_terms(&["UBERON:0002048", "UBERON:0000955"]);
        form.output_types = vec![OutputType::RnaSeq, OutputType::Dnase];

        let payload = form.build_request().unwrap();
        let RequestPayload::Interval(req) = payload else {
            panic!("expected interval payload");
        };
        assert_eq!(req.chromosome, Chromosome::Chr19);
        assert_eq!(req.start, 40_991_281);
        assert_eq!(req.end, 41_018_398);
        assert_eq!(req.output_types, vec![OutputType::RnaSeq, OutputType::Dnase]);
        assert_eq!(
            req.ontology_terms,
            vec!["UBERON:0002048".to_string(), "UBERON:0000955".to_string()]
        );
    }

    #[test]
    fn test_variant_payload_always_has_ontology_terms_field() {
        let mut form = FormState::default();
        form.mode = Mode::Variant;

        let RequestPayload::Variant(req) = form.build_request().unwrap() else {
            panic!("expected variant payload");
        };
        assert!(req.ontology_terms.is_empty());
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("ontology_terms").is_some());
    }

    #[test]
    fn test_score_payload_never_has_ontology_terms() {
        let mut form = form_with_terms(&["UBERON:0002048"]);
        form.mode = Mode::Score;

        let RequestPayload::Score(req) = form.build_request().unwrap() else {
            panic!("expected score payload");
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("ontology_terms").is_none());
        assert!(json.get("page").is_none());
        assert_eq!(json["ref"], "A");
        assert_eq!(json["alt"], "C");
    }

    #[test]
    fn test_empty_output_types_blocks_every_mode() {
        for mode in [Mode::Predict, Mode::Variant, Mode::Score] {
            let mut form = FormState::default();
            form.mode = mode;
            form.output_types.clear();
            assert!(!form.can_submit());
            assert!(form.build_request().is_err());
        }
    }

    #[test]
    fn test_gate_checks_coordinates_for_current_mode_only() {
        let mut form = FormState::default();
        form.interval.end = form.interval.start; // invalid interval

        form.mode = Mode::Predict;
        assert!(!form.can_submit());

        // variant/score modes do not look at the interval
        form.mode = Mode::Variant;
        assert!(form.can_submit());
        form.mode = Mode::Score;
        assert!(form.can_submit());

        form.variant.ref_allele.clear();
        assert!(!form.can_submit());
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("Predict".parse::<Mode>().unwrap(), Mode::Predict);
        assert_eq!("score".parse::<Mode>().unwrap(), Mode::Score);
        assert!("intervals".parse::<Mode>().is_err());
    }
}
