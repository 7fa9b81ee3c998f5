use clap::Parser;

/// Invokes a deployed Lambda function synchronously.
/// The payload is read from the input, the function output is written to the output
/// and the tail of the execution log is printed to stderr.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "lambda-invoke", version, about)]
pub struct Args {
    /// Lambda function name or ARN
    #[arg(short = 'f', long = "function", default_value = "")]
    pub function: String,

    /// Input file path. Default - is stdin
    #[arg(short = 'i', long = "input", default_value = "-")]
    pub input: String,

    /// Output file path. Default - is stdout
    #[arg(short = 'o', long = "output", default_value = "-")]
    pub output: String,

    /// Version or alias of the function, e.g. $LATEST or prod
    #[arg(short = 'q', long = "qualifier")]
    pub qualifier: Option<String>,

    /// AWS profile name, overrides AWS_PROFILE
    #[arg(long = "profile")]
    pub profile: Option<String>,

    /// AWS region, overrides AWS_REGION and the profile region
    #[arg(long = "region")]
    pub region: Option<String>,
}
