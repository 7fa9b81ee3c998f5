use crate::config::FunctionTarget;
use crate::error::Error;
use aws_sdk_lambda::config::interceptors::BeforeDeserializationInterceptorContextRef;
use aws_sdk_lambda::config::{ConfigBag, Intercept, RuntimeComponents};
use aws_sdk_lambda::error::{BoxError, DisplayErrorContext};
use aws_sdk_lambda::operation::RequestId;
use aws_sdk_lambda::primitives::Blob;
use aws_sdk_lambda::types::LogType;
use aws_sdk_lambda::Client as LambdaClient;
use aws_types::SdkConfig;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// A single synchronous invocation, as sent to Lambda.
#[derive(Debug, Clone)]
pub struct InvocationRequest {
    pub target: FunctionTarget,
    pub payload: Vec<u8>,
}

/// The parts of the Lambda response this tool cares about.
#[derive(Debug, Clone, Default)]
pub struct InvocationResponse {
    /// Whatever the function returned, not necessarily valid UTF-8
    pub payload: Vec<u8>,
    /// Set by Lambda if the function itself failed, e.g. `Unhandled`
    pub function_error: Option<String>,
    /// Base64 encoded tail of the execution log, truncated by Lambda to the last 4KB
    pub log_result: Option<String>,
    /// Lambda request ID from the response metadata
    pub request_id: Option<String>,
    /// Server time from the `Date` header of the response, second precision
    pub server_time: Option<DateTime<Utc>>,
}

/// Something that can run a function and wait for its response.
pub trait Invoker {
    fn invoke(&self, request: InvocationRequest) -> impl Future<Output = Result<InvocationResponse, Error>>;
}

/// Invokes functions deployed to AWS with the `RequestResponse` invocation type
/// and asks for the log tail to be included in the response.
#[derive(Clone, Debug)]
pub struct LambdaInvoker {
    client: LambdaClient,
}

impl LambdaInvoker {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: LambdaClient::new(sdk_config),
        }
    }
}

impl Invoker for LambdaInvoker {
    async fn invoke(&self, request: InvocationRequest) -> Result<InvocationResponse, Error> {
        let InvocationRequest { target, payload } = request;

        debug!(
            "Invoking {}, qualifier: {:?}, payload: {}B",
            target.name,
            target.qualifier,
            payload.len()
        );

        let server_time = ServerTime::default();

        // a single attempt, the SDK config has retries disabled
        let output = match self
            .client
            .invoke()
            .function_name(&target.name)
            .set_qualifier(target.qualifier.clone())
            .payload(Blob::new(payload))
            .log_type(LogType::Tail)
            .customize()
            .interceptor(server_time.clone())
            .send()
            .await
        {
            Ok(v) => v,
            Err(e) => {
                debug!("Invocation error: {}", DisplayErrorContext(&e));
                return Err(Error::Invoke {
                    function: target.name,
                    details: error_chain(&e),
                });
            }
        };

        let request_id = output.request_id().map(|v| v.to_owned());
        info!(
            "Lambda responded with {}, request ID: {:?}, version: {:?}",
            output.status_code, request_id, output.executed_version
        );

        Ok(InvocationResponse {
            payload: output.payload.map(|v| v.into_inner()).unwrap_or_default(),
            function_error: output.function_error,
            log_result: output.log_result,
            request_id,
            server_time: server_time.get(),
        })
    }
}

/// Captures the `Date` header of the HTTP response, which the parsed output does not expose.
#[derive(Clone, Debug, Default)]
struct ServerTime(Arc<Mutex<Option<DateTime<Utc>>>>);

impl ServerTime {
    fn get(&self) -> Option<DateTime<Utc>> {
        self.0.lock().ok().and_then(|v| *v)
    }
}

impl Intercept for ServerTime {
    fn name(&self) -> &'static str {
        "ServerTime"
    }

    fn read_before_deserialization(
        &self,
        context: &BeforeDeserializationInterceptorContextRef<'_>,
        _runtime_components: &RuntimeComponents,
        _cfg: &mut ConfigBag,
    ) -> Result<(), BoxError> {
        let server_time = context.response().headers().get("date").and_then(parse_http_date);

        if let Ok(mut w) = self.0.lock() {
            *w = server_time;
        } else {
            warn!("Poisoned server time lock. It's a bug");
        }

        Ok(())
    }
}

/// Parses an HTTP date, e.g. `Tue, 11 Jun 2024 01:02:03 GMT`.
fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value).ok().map(|v| v.with_timezone(&Utc))
}

/// Renders an error with all its sources, skipping messages that are already part of the text.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut chain = err.to_string();
    let mut source = err.source();

    while let Some(e) = source {
        let msg = e.to_string();
        if !chain.contains(&msg) {
            chain.push_str(": ");
            chain.push_str(&msg);
        }
        source = e.source();
    }

    chain
}
