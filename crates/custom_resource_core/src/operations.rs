use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Provisioning operations a custom resource can request through its
/// `Resource` property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationKind {
    CopyTemplate,
    CopySampleDocuments,
    CwLogRetention,
    GenUuid,
    AnonymousMetric,
    CopyModelInfo,
    Webconfig,
    CopyWebUi,
    UpdateBucketPolicy,
    UseCasePolicy,
    AdminPolicy,
    DeleteResourceAssociations,
    GetCompatibleAzs,
    GenDomainPrefix,
    GetModelResourceArns,
}

impl OperationKind {
    pub const ALL: [OperationKind; 15] = [
        Self::CopyTemplate,
        Self::CopySampleDocuments,
        Self::CwLogRetention,
        Self::GenUuid,
        Self::AnonymousMetric,
        Self::CopyModelInfo,
        Self::Webconfig,
        Self::CopyWebUi,
        Self::UpdateBucketPolicy,
        Self::UseCasePolicy,
        Self::AdminPolicy,
        Self::DeleteResourceAssociations,
        Self::GetCompatibleAzs,
        Self::GenDomainPrefix,
        Self::GetModelResourceArns,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::CopyTemplate => "COPY_TEMPLATE",
            Self::CopySampleDocuments => "COPY_SAMPLE_DOCUMENTS",
            Self::CwLogRetention => "CW_LOG_RETENTION",
            Self::GenUuid => "GEN_UUID",
            Self::AnonymousMetric => "ANONYMOUS_METRIC",
            Self::CopyModelInfo => "COPY_MODEL_INFO",
            Self::Webconfig => "WEBCONFIG",
            Self::CopyWebUi => "COPY_WEB_UI",
            Self::UpdateBucketPolicy => "UPDATE_BUCKET_POLICY",
            Self::UseCasePolicy => "USE_CASE_POLICY",
            Self::AdminPolicy => "ADMIN_POLICY",
            Self::DeleteResourceAssociations => "DELETE_RESOURCE_ASSOCIATIONS",
            Self::GetCompatibleAzs => "GET_COMPATIBLE_AZS",
            Self::GenDomainPrefix => "GEN_DOMAIN_PREFIX",
            Self::GetModelResourceArns => "GET_MODEL_RESOURCE_ARNS",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown operation '{name}'")]
pub struct UnknownOperation {
    pub name: String,
}

impl FromStr for OperationKind {
    type Err = UnknownOperation;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| UnknownOperation {
                name: value.to_string(),
            })
    }
}
