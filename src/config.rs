use crate::cli::Args;
use crate::error::Error;
use aws_config::profile::profile_file::ProfileFiles;
use aws_config::retry::RetryConfig;
use aws_config::BehaviorVersion;
use aws_types::os_shim_internal::{Env, Fs};
use aws_types::region::Region;
use aws_types::SdkConfig;
use tracing::debug;

/// The function to invoke: its name or ARN and an optional version or alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionTarget {
    pub name: String,
    pub qualifier: Option<String>,
}

/// Validated command line settings.
#[derive(Debug, Clone)]
pub struct Config {
    pub target: FunctionTarget,
    /// `-` for stdin, a file path otherwise
    pub input_path: String,
    /// `-` for stdout, a file path otherwise
    pub output_path: String,
    /// Overrides for the standard AWS credentials and region chain
    pub profile: Option<String>,
    pub region: Option<String>,
}

impl Config {
    /// Builds the config from parsed flags.
    /// Fails with a usage error if no function name was given.
    pub fn from_args(args: Args) -> Result<Self, Error> {
        if args.function.is_empty() {
            return Err(Error::MissingFunction);
        }

        // an empty qualifier is the same as none, the API rejects ""
        let qualifier = args.qualifier.filter(|v| !v.is_empty());

        Ok(Self {
            target: FunctionTarget {
                name: args.function,
                qualifier,
            },
            input_path: args.input,
            output_path: args.output,
            profile: args.profile,
            region: args.region,
        })
    }

    /// Resolves AWS credentials and region from the environment, profiles and instance metadata,
    /// applying the `--profile` and `--region` overrides.
    /// Retries are disabled, every call is attempted exactly once.
    /// Fails if the profile does not exist or no region could be found because every Lambda call needs one.
    pub async fn load_sdk_config(&self) -> Result<SdkConfig, Error> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest()).retry_config(RetryConfig::disabled());

        if let Some(profile) = &self.profile {
            check_profile(profile, &ProfileFiles::default()).await?;
            loader = loader.profile_name(profile);
        }

        if let Some(region) = &self.region {
            loader = loader.region(Region::new(region.clone()));
        }

        let sdk_config = loader.load().await;

        match sdk_config.region() {
            Some(region) => debug!("Region: {region}"),
            None => {
                return Err(Error::Config(
                    "no AWS region configured. Use --region, AWS_REGION or a profile with a region".to_string(),
                ))
            }
        }

        Ok(sdk_config)
    }
}

/// Fails if `profile` is not defined in any of the shared config and credentials files.
async fn check_profile(profile: &str, files: &ProfileFiles) -> Result<(), Error> {
    let profiles = aws_config::profile::load(&Fs::real(), &Env::real(), files, None)
        .await
        .map_err(|e| Error::Config(format!("reading AWS profiles: {e}")))?;

    match profiles.get_profile(profile) {
        Some(_) => Ok(()),
        None => Err(Error::Config(format!("AWS profile {profile} not found"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(function: &str) -> Args {
        Args {
            function: function.to_string(),
            input: "-".to_string(),
            output: "-".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn empty_function_is_a_usage_error() {
        assert!(matches!(Config::from_args(args("")), Err(Error::MissingFunction)));
    }

    #[test]
    fn keeps_function_and_paths() {
        let config = Config::from_args(args("my-lambda")).unwrap();
        assert_eq!(config.target.name, "my-lambda");
        assert_eq!(config.input_path, "-");
        assert_eq!(config.output_path, "-");
    }

    #[test]
    fn empty_qualifier_is_dropped() {
        let mut a = args("my-lambda");
        a.qualifier = Some(String::new());
        assert!(Config::from_args(a).unwrap().target.qualifier.is_none());

        let mut a = args("my-lambda");
        a.qualifier = Some("prod".to_string());
        assert_eq!(Config::from_args(a).unwrap().target.qualifier.as_deref(), Some("prod"));
    }

    #[tokio::test]
    async fn region_override_is_applied() {
        let mut a = args("my-lambda");
        a.region = Some("ap-southeast-2".to_string());
        let sdk_config = Config::from_args(a).unwrap().load_sdk_config().await.unwrap();
        assert_eq!(sdk_config.region().map(|r| r.to_string()), Some("ap-southeast-2".to_string()));
    }

    #[tokio::test]
    async fn invocation_is_attempted_once() {
        let mut a = args("my-lambda");
        a.region = Some("us-east-1".to_string());
        let sdk_config = Config::from_args(a).unwrap().load_sdk_config().await.unwrap();
        assert_eq!(sdk_config.retry_config().map(|r| r.max_attempts()), Some(1));
    }

    fn profile_files(contents: &str) -> (tempfile::TempDir, ProfileFiles) {
        use aws_config::profile::profile_file::ProfileFileKind;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config");
        std::fs::write(&path, contents).unwrap();

        let files = ProfileFiles::builder()
            .include_default_config_file(false)
            .include_default_credentials_file(false)
            .with_file(ProfileFileKind::Config, path)
            .build();
        (dir, files)
    }

    #[tokio::test]
    async fn known_profile_is_accepted() {
        let (_dir, files) = profile_files("[profile dev]\nregion = eu-west-1\n\n[default]\nregion = us-east-1\n");
        check_profile("dev", &files).await.unwrap();
        check_profile("default", &files).await.unwrap();
    }

    #[tokio::test]
    async fn unknown_profile_is_a_config_error() {
        let (_dir, files) = profile_files("[profile dev]\nregion = eu-west-1\n");
        let err = check_profile("nope", &files).await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(err.to_string(), "loading config: AWS profile nope not found");
    }
}
