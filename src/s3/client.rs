use anyhow::Result;
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;

use crate::config::Config;

/// Build an S3 client from the resolved configuration.
///
/// Custom endpoints (MinIO and other S3-compatible providers) switch on
/// path-style addressing when requested.
pub async fn build_client(config: &Config) -> Result<Client> {
    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(aws_config::Region::new(config.region.clone()));

    if let Some(profile) = &config.profile {
        loader = loader.profile_name(profile);
    }

    let sdk_config = loader.load().await;

    let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
    if let Some(endpoint) = &config.endpoint {
        builder = builder.endpoint_url(endpoint);
    }
    if config.force_path_style {
        builder = builder.force_path_style(true);
    }

    Ok(Client::from_conf(builder.build()))
}
