//! Where ground truth comes from: the labeling job service and object storage.

use gtscore_core::{Annotation, LabelRecord, LabelingConfig, S3Uri, config::DEFAULT_MANIFEST_PATH};
use services::{LabelingJobs, ObjectStore};
use tracing::debug;

use crate::Result;

/// Labeling job and object storage clients used to load ground truth.
pub struct GroundTruthSource<'a> {
  labeling: &'a dyn LabelingJobs,
  store: &'a dyn ObjectStore,
  manifest_path: String,
}

impl<'a> GroundTruthSource<'a> {
  pub fn new(labeling: &'a dyn LabelingJobs, store: &'a dyn ObjectStore) -> Self {
    Self {
      labeling,
      store,
      manifest_path: DEFAULT_MANIFEST_PATH.to_string(),
    }
  }

  /// Use the manifest path from the `[labeling]` config section
  pub fn with_config(mut self, config: &LabelingConfig) -> Self {
    self.manifest_path = config.manifest_path.clone();
    self
  }

  /// `<job output path>/<job name>/<manifest path>`
  pub async fn manifest_location(&self, job_name: &str) -> Result<S3Uri> {
    let output_path = self.labeling.output_path(job_name).await?;
    let suffix = format!("{}/{}", job_name, self.manifest_path.trim_start_matches('/'));
    let location = S3Uri::join(&output_path, &suffix)?;
    debug!(
      job_name,
      labeling = self.labeling.name(),
      output_path = %output_path,
      manifest = %location,
      "Resolved manifest location"
    );
    Ok(location)
  }

  /// Download and decode every record of a job's output manifest
  pub async fn load_records(&self, job_name: &str) -> Result<Vec<LabelRecord>> {
    let manifest = self.manifest_location(job_name).await?;
    let values = self.store.get_stacked_json(&manifest).await?;
    let records = LabelRecord::from_manifest(&values, job_name)?;
    debug!(store = self.store.name(), manifest = %manifest, records = records.len(), "Decoded manifest");
    Ok(records)
  }

  /// Download the annotation payload of a record.
  ///
  /// Records without an annotation reference (only possible when they carry
  /// no labels) have an empty annotation.
  pub async fn load_annotation(&self, record: &LabelRecord) -> Result<Annotation> {
    let Some(annotation_ref) = &record.annotation_ref else {
      return Ok(Annotation::default());
    };
    let location = S3Uri::parse(annotation_ref)?;
    let value = self.store.get_json(&location).await?;
    Ok(Annotation::from_value(value)?)
  }
}
