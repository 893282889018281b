//! AWS backends: SageMaker Ground Truth, S3 and Textract.
//!
//! Credentials and region come from the SDK default chain, optionally
//! overridden by the `[aws]` config section.

use async_trait::async_trait;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_s3::config::Region;
use aws_sdk_textract::types::{Document, FeatureType, QueriesConfig, Query, S3Object};
use gtscore_core::{AwsConfig, S3Uri};
use tracing::{debug, trace};

use crate::{
  AnalysisRequest, AnalysisResponse, DocumentAnalysis, LabelingJobs, ObjectStore, ResponseBlock, Result, ServiceError,
};

/// SageMaker, S3 and Textract clients sharing one SDK config
#[derive(Debug, Clone)]
pub struct AwsServices {
  s3: aws_sdk_s3::Client,
  sagemaker: aws_sdk_sagemaker::Client,
  textract: aws_sdk_textract::Client,
}

impl AwsServices {
  /// Load the SDK config (applying region/profile overrides) and build clients
  pub async fn from_config(config: &AwsConfig) -> Self {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = &config.region {
      loader = loader.region(Region::new(region.clone()));
    }
    if let Some(profile) = &config.profile {
      loader = loader.profile_name(profile);
    }

    let shared = loader.load().await;
    debug!(region = ?shared.region(), "Loaded AWS config");
    Self::from_shared(&shared)
  }

  pub fn from_shared(shared: &SdkConfig) -> Self {
    Self {
      s3: aws_sdk_s3::Client::new(shared),
      sagemaker: aws_sdk_sagemaker::Client::new(shared),
      textract: aws_sdk_textract::Client::new(shared),
    }
  }
}

#[async_trait]
impl LabelingJobs for AwsServices {
  fn name(&self) -> &str {
    "sagemaker"
  }

  async fn output_path(&self, job_name: &str) -> Result<String> {
    debug!(job_name, "Describing labeling job");

    let output = self
      .sagemaker
      .describe_labeling_job()
      .labeling_job_name(job_name)
      .send()
      .await
      .map_err(|e| ServiceError::Labeling {
        job_name: job_name.to_string(),
        message: aws_sdk_sagemaker::error::DisplayErrorContext(&e).to_string(),
      })?;

    // Accessor optionality differs between SDK releases; normalize to Option.
    let output_config: Option<&aws_sdk_sagemaker::types::LabelingJobOutputConfig> = output.output_config().into();
    let path: Option<&str> = output_config.and_then(|c| c.s3_output_path().into());

    match path {
      Some(path) if !path.is_empty() => Ok(path.to_string()),
      _ => Err(ServiceError::MissingOutputPath {
        job_name: job_name.to_string(),
      }),
    }
  }
}

#[async_trait]
impl ObjectStore for AwsServices {
  fn name(&self) -> &str {
    "s3"
  }

  async fn get_object(&self, location: &S3Uri) -> Result<Vec<u8>> {
    trace!(uri = %location, "Downloading object");

    let storage_error = |message: String| ServiceError::Storage {
      uri: location.to_string(),
      message,
    };

    let output = self
      .s3
      .get_object()
      .bucket(location.bucket())
      .key(location.key())
      .send()
      .await
      .map_err(|e| storage_error(aws_sdk_s3::error::DisplayErrorContext(&e).to_string()))?;

    let body = output.body.collect().await.map_err(|e| storage_error(e.to_string()))?;
    let bytes = body.into_bytes().to_vec();

    debug!(uri = %location, bytes = bytes.len(), "Downloaded object");
    Ok(bytes)
  }
}

#[async_trait]
impl DocumentAnalysis for AwsServices {
  fn name(&self) -> &str {
    "textract"
  }

  async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisResponse> {
    debug!(document = %request.document, alias = %request.alias, "Analyzing document");

    let query = Query::builder()
      .text(&request.query_text)
      .alias(&request.alias)
      .build()
      .map_err(|e| ServiceError::InvalidRequest(e.to_string()))?;
    let queries = QueriesConfig::builder()
      .queries(query)
      .build()
      .map_err(|e| ServiceError::InvalidRequest(e.to_string()))?;
    let document = Document::builder()
      .s3_object(
        S3Object::builder()
          .bucket(request.document.bucket())
          .name(request.document.key())
          .build(),
      )
      .build();

    let output = self
      .textract
      .analyze_document()
      .document(document)
      .feature_types(FeatureType::Queries)
      .queries_config(queries)
      .send()
      .await
      .map_err(|e| ServiceError::Analysis {
        document: request.document.to_string(),
        message: aws_sdk_textract::error::DisplayErrorContext(&e).to_string(),
      })?;

    let blocks: Vec<ResponseBlock> = output
      .blocks
      .unwrap_or_default()
      .into_iter()
      .map(|block| ResponseBlock {
        block_type: block.block_type.map(|t| t.as_str().to_string()).unwrap_or_default(),
        text: block.text,
        confidence: block.confidence,
      })
      .collect();

    trace!(document = %request.document, blocks = blocks.len(), "Analysis complete");
    Ok(AnalysisResponse { blocks })
  }
}
