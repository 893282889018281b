//! Labeling job manifest records and annotation payloads.
//!
//! A manifest record looks like
//! `{"source-ref": <doc uri>, "metadata": {"labels": [...]}, "<job>": {"annotation-ref": <uri>}}`
//! where `<job>` is the labeling job name. The annotation payload it points to
//! is `{"Entities": [{"Type": <query>, "Text": <truth>}, ...]}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
  #[error("Manifest record {index} is missing '{field}'")]
  MissingField { index: usize, field: String },

  #[error("Manifest record {index} has an invalid '{field}': {message}")]
  InvalidField {
    index: usize,
    field: String,
    message: String,
  },
}

/// One decoded manifest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRecord {
  /// Document URI the labels apply to
  pub source_ref: String,
  /// Queries labeled on this document, in manifest order
  pub labels: Vec<String>,
  /// URI of the per-document annotation payload. Only required when the
  /// record carries labels.
  pub annotation_ref: Option<String>,
}

impl LabelRecord {
  /// Extract a record from a decoded manifest value.
  ///
  /// `index` is the position of the value in the manifest and is only used
  /// for error messages.
  pub fn from_value(value: &Value, job_name: &str, index: usize) -> Result<Self, ManifestError> {
    let source_ref = value
      .get("source-ref")
      .and_then(Value::as_str)
      .ok_or_else(|| ManifestError::MissingField {
        index,
        field: "source-ref".to_string(),
      })?
      .to_string();

    let raw_labels = value
      .pointer("/metadata/labels")
      .ok_or_else(|| ManifestError::MissingField {
        index,
        field: "metadata.labels".to_string(),
      })?
      .as_array()
      .ok_or_else(|| ManifestError::InvalidField {
        index,
        field: "metadata.labels".to_string(),
        message: "expected an array".to_string(),
      })?;

    let labels = raw_labels
      .iter()
      .map(|label| {
        label.as_str().map(str::to_string).ok_or_else(|| ManifestError::InvalidField {
          index,
          field: "metadata.labels".to_string(),
          message: format!("expected string labels, got {}", label),
        })
      })
      .collect::<Result<Vec<_>, _>>()?;

    let annotation_ref = value
      .get(job_name)
      .and_then(|job| job.get("annotation-ref"))
      .and_then(Value::as_str)
      .map(str::to_string);

    if annotation_ref.is_none() && !labels.is_empty() {
      return Err(ManifestError::MissingField {
        index,
        field: format!("{}.annotation-ref", job_name),
      });
    }

    Ok(Self {
      source_ref,
      labels,
      annotation_ref,
    })
  }

  /// Extract every record from a decoded manifest.
  pub fn from_manifest(values: &[Value], job_name: &str) -> Result<Vec<Self>, ManifestError> {
    values
      .iter()
      .enumerate()
      .map(|(index, value)| Self::from_value(value, job_name, index))
      .collect()
  }
}

/// A labeled entity inside an annotation payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationEntity {
  #[serde(rename = "Type")]
  pub entity_type: String,
  #[serde(rename = "Text", default)]
  pub text: Option<String>,
}

/// Per-document annotation payload written by the labeling workforce.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
  #[serde(rename = "Entities", default)]
  pub entities: Vec<AnnotationEntity>,
}

impl Annotation {
  pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
    serde_json::from_value(value)
  }

  /// Text of the first entity whose type is `query`.
  pub fn truth_for(&self, query: &str) -> Option<&str> {
    self
      .entities
      .iter()
      .find(|entity| entity.entity_type == query)
      .and_then(|entity| entity.text.as_deref())
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  const JOB: &str = "invoice-labeling";

  #[test]
  fn test_record_from_value() {
    let value = json!({
      "source-ref": "s3://docs/a.pdf",
      "metadata": {"labels": ["Company", "Total"]},
      "invoice-labeling": {"annotation-ref": "s3://out/annotations/a.json"},
    });

    let record = LabelRecord::from_value(&value, JOB, 0).unwrap();

    assert_eq!(record.source_ref, "s3://docs/a.pdf");
    assert_eq!(record.labels, vec!["Company", "Total"]);
    assert_eq!(record.annotation_ref.as_deref(), Some("s3://out/annotations/a.json"));
  }

  #[test]
  fn test_record_without_labels_needs_no_annotation() {
    let value = json!({"source-ref": "s3://docs/a.pdf", "metadata": {"labels": []}});

    let record = LabelRecord::from_value(&value, JOB, 0).unwrap();

    assert!(record.labels.is_empty());
    assert!(record.annotation_ref.is_none());
  }

  #[test]
  fn test_record_missing_fields() {
    let no_source = json!({"metadata": {"labels": []}});
    let err = LabelRecord::from_value(&no_source, JOB, 4).unwrap_err();
    assert!(matches!(err, ManifestError::MissingField { index: 4, ref field } if field == "source-ref"));

    let no_labels = json!({"source-ref": "s3://docs/a.pdf"});
    let err = LabelRecord::from_value(&no_labels, JOB, 0).unwrap_err();
    assert!(matches!(err, ManifestError::MissingField { ref field, .. } if field == "metadata.labels"));

    let no_annotation = json!({"source-ref": "s3://docs/a.pdf", "metadata": {"labels": ["Q"]}});
    let err = LabelRecord::from_value(&no_annotation, JOB, 0).unwrap_err();
    assert!(matches!(err, ManifestError::MissingField { ref field, .. } if field == "invoice-labeling.annotation-ref"));
  }

  #[test]
  fn test_record_rejects_non_string_labels() {
    let value = json!({"source-ref": "s3://docs/a.pdf", "metadata": {"labels": ["Q", 3]}});
    let err = LabelRecord::from_value(&value, JOB, 0).unwrap_err();
    assert!(matches!(err, ManifestError::InvalidField { .. }));
  }

  #[test]
  fn test_annotation_truth_for_first_match() {
    let annotation = Annotation::from_value(json!({
      "Entities": [
        {"Type": "Total", "Text": "$10.00", "BeginOffset": 3},
        {"Type": "Company", "Text": "Acme Corp"},
        {"Type": "Company", "Text": "Other Inc"},
      ]
    }))
    .unwrap();

    assert_eq!(annotation.truth_for("Company"), Some("Acme Corp"));
    assert_eq!(annotation.truth_for("Total"), Some("$10.00"));
    assert_eq!(annotation.truth_for("Date"), None);
  }

  #[test]
  fn test_annotation_without_entities() {
    let annotation = Annotation::from_value(json!({})).unwrap();
    assert!(annotation.entities.is_empty());
    assert_eq!(annotation.truth_for("Company"), None);
  }
}
