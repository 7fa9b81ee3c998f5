use crate::error::Error;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use std::future::Future;

/// Lambda starts the log entry of every invocation with this line.
pub const START_MARKER: &[u8] = b"START RequestId";

/// Decodes the base64 log tail returned with the invocation response.
/// A response without a tail is treated as an empty tail.
pub fn decode(log_result: Option<&str>) -> Result<Vec<u8>, Error> {
    match log_result {
        Some(v) => Ok(BASE64.decode(v)?),
        None => Ok(Vec::new()),
    }
}

/// Returns the log from the first `START RequestId` onwards or None if the marker is not there,
/// which happens when the log is longer than what fits into the tail.
/// Anything before the marker, e.g. INIT_START or extension output, is dropped.
pub fn function_logs(log_tail: &[u8]) -> Option<&[u8]> {
    log_tail
        .windows(START_MARKER.len())
        .position(|w| w == START_MARKER)
        .map(|idx| &log_tail[idx..])
}

/// Identifies the invocation whose logs could not be found in the tail.
#[derive(Debug, Clone)]
pub struct LogWindow {
    pub function: String,
    /// Lambda request ID from the response metadata, if there was one
    pub request_id: Option<String>,
    /// When the invocation started, derived from `finished` and the locally measured duration
    pub started: DateTime<Utc>,
    /// Server time of the response plus a second, or the local time if the response had no `Date` header
    pub finished: DateTime<Utc>,
}

/// Gets the full invocation log from somewhere other than the inline tail, e.g. CloudWatch.
pub trait ExtendedLogFetcher {
    fn fetch(&self, window: &LogWindow) -> impl Future<Output = Result<Vec<u8>, Error>>;
}

/// Only the inline tail is supported, so logs that did not fit into it are an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineTailOnly;

impl ExtendedLogFetcher for InlineTailOnly {
    async fn fetch(&self, _window: &LogWindow) -> Result<Vec<u8>, Error> {
        Err(Error::LogsTooLarge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TAIL: &str = "INIT_START Runtime Version: provided:al2023.v75\n\
        START RequestId: abc-123 Version: $LATEST\n\
        INFO Handler invoked\n\
        END RequestId: abc-123\n\
        REPORT RequestId: abc-123\tDuration: 1.23 ms\n";

    #[test]
    fn logs_start_at_the_marker() {
        let decoded = decode(Some(BASE64.encode(TAIL).as_str())).unwrap();
        let logs = function_logs(&decoded).unwrap();
        assert!(logs.starts_with(b"START RequestId: abc-123"));
        assert!(logs.ends_with(b"Duration: 1.23 ms\n"));
        assert_eq!(logs, &TAIL.as_bytes()[TAIL.find("START").unwrap()..]);
    }

    #[test]
    fn marker_at_the_very_start() {
        let logs = function_logs(b"START RequestId: x\nEND").unwrap();
        assert_eq!(logs, b"START RequestId: x\nEND");
    }

    #[test]
    fn no_marker() {
        let tail = b"2024-06-11T01:02:03Z abc-123 INFO ...the end of a very long log\nEND RequestId: abc-123\n";
        assert!(function_logs(tail).is_none());
        assert!(function_logs(b"").is_none());
        assert!(function_logs(b"START").is_none());
    }

    #[test]
    fn missing_tail_is_empty() {
        assert!(decode(None).unwrap().is_empty());
    }

    #[test]
    fn malformed_base64() {
        let err = decode(Some("U1RBUlQgUmVxdWVzdElk!!")).unwrap_err();
        assert!(matches!(err, Error::LogTail(_)));
        assert!(err.to_string().starts_with("err base64 decoding log tail"));
    }

    #[tokio::test]
    async fn inline_tail_only_refuses_to_fetch() {
        let window = LogWindow {
            function: "my-lambda".to_string(),
            request_id: Some("abc-123".to_string()),
            started: Utc::now(),
            finished: Utc::now(),
        };
        let err = InlineTailOnly.fetch(&window).await.unwrap_err();
        assert_eq!(err.to_string(), "fetching of 4KB+ logs not implemented yet");
    }
}
