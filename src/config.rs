//! AWS connection settings.
//!
//! Region and profile are optional; anything left unset falls through to the
//! SDK's default provider chain (`AWS_REGION`, `AWS_PROFILE`, shared config
//! files, instance metadata).

#![warn(clippy::all, rust_2018_idioms)]

use aws_config::{BehaviorVersion, SdkConfig};
use aws_types::region::Region;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwsSettings {
    pub region: Option<String>,
    pub profile: Option<String>,
}

impl AwsSettings {
    pub fn new(region: Option<String>, profile: Option<String>) -> Self {
        Self { region, profile }
    }

    /// Load an SDK config honouring the explicit overrides
    pub async fn load_sdk_config(&self) -> SdkConfig {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());

        if let Some(region) = &self.region {
            trace_debug!("Using AWS region override: {}", region);
            loader = loader.region(Region::new(region.clone()));
        }

        if let Some(profile) = &self.profile {
            trace_debug!("Using AWS profile override: {}", profile);
            loader = loader.profile_name(profile);
        }

        loader.load().await
    }
}
