//! Invokes a deployed AWS Lambda function, forwards the payload from a file or stdin
//! and prints the function output and the tail of its execution log.

use crate::cli::Args;
use crate::config::Config;
use crate::error::Error;
use crate::invoke::LambdaInvoker;
use crate::log_tail::InlineTailOnly;
use crate::report::Diagnostics;
use crate::run::{Outcome, Session};
use crate::streams::{Input, Output};

pub mod cli;
pub mod config;
pub mod error;
pub mod invoke;
pub mod log_tail;
pub mod report;
pub mod run;
pub mod streams;

/// Runs the whole tool for the given flags: opens the streams, loads the AWS config
/// and invokes the function once.
/// The function name is checked before anything else, so a usage error never touches the network.
pub async fn execute(args: Args) -> Result<Outcome, Error> {
    let config = Config::from_args(args)?;

    let input = Input::open(&config.input_path)?;
    let output = Output::open(&config.output_path)?;

    let sdk_config = config.load_sdk_config().await?;
    let invoker = LambdaInvoker::new(&sdk_config);

    let mut session = Session {
        input,
        output,
        diagnostics: Diagnostics::stderr(),
    };

    run::run(&invoker, &InlineTailOnly, &config.target, &mut session).await
}
