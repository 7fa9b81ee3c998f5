use crate::config::FunctionTarget;
use crate::error::Error;
use crate::invoke::{InvocationRequest, Invoker};
use crate::log_tail::{self, ExtendedLogFetcher, LogWindow};
use crate::report::Diagnostics;
use crate::streams::{Input, Output};
use chrono::{DateTime, Local, TimeDelta, Utc};
use std::io::Write;
use tracing::{debug, info};

/// Status the process exits with when the function ran, but reported an error.
pub const FUNCTION_ERROR_EXIT_CODE: u8 = 2;

/// How a completed invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The function returned normally
    Success,
    /// The function ran and failed, e.g. `Unhandled`
    FunctionError(String),
}

impl Outcome {
    pub fn exit_code(&self) -> u8 {
        match self {
            Outcome::Success => 0,
            Outcome::FunctionError(_) => FUNCTION_ERROR_EXIT_CODE,
        }
    }
}

/// The streams of a single run.
pub struct Session<W: Write> {
    pub input: Input,
    pub output: Output,
    pub diagnostics: Diagnostics<W>,
}

/// Reads the payload, invokes the function once, prints its log and writes its output.
/// Any failure along the way aborts the run. Nothing is written to the output
/// unless the function logs were found.
pub async fn run<I, F, W>(
    invoker: &I,
    log_fetcher: &F,
    target: &FunctionTarget,
    session: &mut Session<W>,
) -> Result<Outcome, Error>
where
    I: Invoker,
    F: ExtendedLogFetcher,
    W: Write,
{
    let Session {
        input,
        output,
        diagnostics,
    } = session;

    if input.is_interactive() {
        diagnostics.advise("Reading input from stdin. Press Ctrl+D when input is complete.")?;
    }

    let payload = input.read_all()?;
    debug!("Read {}B of input", payload.len());

    let started = Utc::now();
    diagnostics.advise(&format!(
        "Invoking Lambda function {} now ({})",
        target.name,
        Local::now().format("%b %e %H:%M:%S")
    ))?;

    let response = invoker
        .invoke(InvocationRequest {
            target: target.clone(),
            payload,
        })
        .await?;
    let finished = Utc::now();

    log_payload(&response.payload);

    let tail = log_tail::decode(response.log_result.as_deref())?;
    let logs = match log_tail::function_logs(&tail) {
        Some(v) => v.to_vec(),
        None => {
            info!("No START marker in {}B of log tail", tail.len());
            log_fetcher
                .fetch(&log_window(
                    target,
                    response.request_id.clone(),
                    response.server_time,
                    started,
                    finished,
                ))
                .await?
        }
    };

    diagnostics.advise("Function logs:")?;
    diagnostics.text(&logs)?;

    if output.is_interactive() {
        diagnostics.advise("Function output:")?;
    }
    output.write_payload(&response.payload)?;

    // Lambda sends an empty header value in some cases, which is the same as no error
    match response.function_error.filter(|v| !v.is_empty()) {
        Some(function_error) => {
            diagnostics.advise("Function error:")?;
            diagnostics.text(function_error.as_bytes())?;
            Ok(Outcome::FunctionError(function_error))
        }
        None => Ok(Outcome::Success),
    }
}

/// Builds the time window of the invocation.
/// The end is the server time plus a second if the response had a `Date` header,
/// the start is the end less the locally measured duration. Local times are used otherwise.
fn log_window(
    target: &FunctionTarget,
    request_id: Option<String>,
    server_time: Option<DateTime<Utc>>,
    started: DateTime<Utc>,
    finished: DateTime<Utc>,
) -> LogWindow {
    let (started, finished) = match server_time {
        Some(server_time) => {
            let elapsed = finished - started;
            let end = server_time + TimeDelta::seconds(1);
            (end - elapsed, end)
        }
        None => (started, finished),
    };

    LogWindow {
        function: target.name.clone(),
        request_id,
        started,
        finished,
    }
}

/// Logs the function response at debug level, as text if possible or as hex otherwise.
fn log_payload(payload: &[u8]) {
    match std::str::from_utf8(payload) {
        Ok(v) => debug!("Lambda response:\n{v}"),
        Err(e) => debug!("Non-UTF-8 response from Lambda. {:?}\n{}", e, hex::encode(payload)),
    }
}
