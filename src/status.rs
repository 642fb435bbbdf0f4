//! Turns a status location or a raw status document into an [`Execution`].
//!
//! A failure here means the document could not be obtained or understood. It
//! never means the remote job failed; that is reported through the returned
//! execution's status.

use std::time::Duration;

use tokio::time::sleep;
use tracing::debug;

use crate::wps::{Execution, Fetcher, WpsError, parse_status_document};

/// Where a status document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// A status-location URL to fetch.
    Url(String),
    /// An already fetched payload of unknown encoding.
    RawBytes(Vec<u8>),
    /// An already decoded payload.
    RawText(String),
}

impl Source {
    /// Pick a source from an optional URL and an optional payload.
    ///
    /// A non-empty payload wins over the URL. Empty values count as absent,
    /// and with nothing left the call fails with `InvalidArgument`. A payload
    /// that is valid UTF-8 is taken as text.
    pub fn from_parts(url: Option<String>, response: Option<Vec<u8>>) -> Result<Self, WpsError> {
        if let Some(bytes) = response.filter(|b| !b.is_empty()) {
            return Ok(match String::from_utf8(bytes) {
                Ok(text) => Source::RawText(text),
                Err(e) => Source::RawBytes(e.into_bytes()),
            });
        }
        match url.filter(|u| !u.trim().is_empty()) {
            Some(url) => Ok(Source::Url(url)),
            None => Err(WpsError::InvalidArgument(
                "a status-location url or a response document is required".into(),
            )),
        }
    }
}

/// Reads and interprets status documents.
pub struct StatusChecker<F> {
    fetcher: F,
    settle_delay: Duration,
}

impl<F: Fetcher> StatusChecker<F> {
    /// `settle_delay` is slept after every check that finds the job still
    /// pending, which paces a poller calling this in a loop.
    pub fn new(fetcher: F, settle_delay: Duration) -> Self {
        Self {
            fetcher,
            settle_delay,
        }
    }

    pub async fn check_status(&self, source: Source) -> Result<Execution, WpsError> {
        let (location, xml) = match source {
            Source::Url(url) if url.trim().is_empty() => {
                return Err(WpsError::InvalidArgument(
                    "status-location url is empty".into(),
                ));
            }
            Source::Url(url) => {
                debug!(%url, "using status location");
                let bytes = self.fetcher.fetch(&url).await?;
                (Some(url), decode_lossy(&bytes))
            }
            Source::RawBytes(bytes) => {
                debug!("using response document");
                (None, decode_lossy(&bytes))
            }
            Source::RawText(text) => {
                debug!("using response document");
                (None, text)
            }
        };
        debug!(len = xml.len(), "decoded status document");

        let document = parse_status_document(&xml)?;
        let location = location
            .or_else(|| document.status_location.clone())
            .unwrap_or_default();
        let execution = Execution::new(location, document);

        if !execution.is_complete() && !self.settle_delay.is_zero() {
            sleep(self.settle_delay).await;
        }
        Ok(execution)
    }
}

// Invalid sequences become U+FFFD instead of failing the whole document.
fn decode_lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wps::JobStatus;
    use crate::wps::fixtures::{self, Reply, ScriptedFetcher};
    use tokio::time::Instant;

    const LOCATION: &str = "http://wps.local/outputs/status-1.xml";

    fn checker(replies: Vec<Reply>) -> StatusChecker<ScriptedFetcher> {
        StatusChecker::new(ScriptedFetcher::new(replies), Duration::ZERO)
    }

    #[test]
    fn neither_url_nor_response_is_invalid() {
        let err = Source::from_parts(None, None).unwrap_err();
        assert!(matches!(err, WpsError::InvalidArgument(_)));

        let err = Source::from_parts(Some("  ".into()), Some(Vec::new())).unwrap_err();
        assert!(matches!(err, WpsError::InvalidArgument(_)));
    }

    #[test]
    fn response_wins_over_url() {
        let source = Source::from_parts(Some(LOCATION.into()), Some(b"<x/>".to_vec())).unwrap();
        assert_eq!(source, Source::RawText("<x/>".into()));

        let source = Source::from_parts(None, Some(vec![b'<', 0xff, b'>'])).unwrap();
        assert_eq!(source, Source::RawBytes(vec![b'<', 0xff, b'>']));

        let source = Source::from_parts(Some(LOCATION.into()), None).unwrap();
        assert_eq!(source, Source::Url(LOCATION.into()));
    }

    #[tokio::test]
    async fn empty_url_is_invalid_and_not_fetched() {
        let checker = checker(vec![]);
        let err = checker.check_status(Source::Url(String::new())).await.unwrap_err();
        assert!(matches!(err, WpsError::InvalidArgument(_)));
        assert_eq!(checker.fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn raw_text_yields_structured_response() {
        let checker = checker(vec![]);
        let xml = fixtures::running(LOCATION, 30);

        let first = checker.check_status(Source::RawText(xml.clone())).await.unwrap();
        let second = checker.check_status(Source::RawText(xml)).await.unwrap();

        assert_eq!(first.status(), JobStatus::Running);
        assert_eq!(first.response().percent_completed, Some(30));
        assert_eq!(first.status_location(), LOCATION);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn invalid_utf8_is_replaced_not_rejected() {
        let checker = checker(vec![]);
        let mut bytes = Vec::new();
        bytes.extend_from_slice(
            br#"<ExecuteResponse statusLocation="http://wps.local/s.xml"><Status><ProcessStarted percentCompleted="10">step "#,
        );
        bytes.extend_from_slice(&[0xff, 0xfe]);
        bytes.extend_from_slice(b" running</ProcessStarted></Status></ExecuteResponse>");

        let execution = checker.check_status(Source::RawBytes(bytes)).await.unwrap();
        assert_eq!(execution.status(), JobStatus::Running);
        let message = execution.response().status_message.clone().unwrap();
        assert!(message.contains('\u{fffd}'));
    }

    #[tokio::test]
    async fn url_source_keeps_polled_location() {
        let checker = checker(vec![Reply::doc(fixtures::succeeded(
            "http://elsewhere.local/s.xml",
        ))]);
        let execution = checker.check_status(Source::Url(LOCATION.into())).await.unwrap();
        assert_eq!(execution.status(), JobStatus::Succeeded);
        assert_eq!(execution.status_location(), LOCATION);
        assert_eq!(checker.fetcher.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn pending_job_waits_settle_delay() {
        let checker = StatusChecker::new(
            ScriptedFetcher::new([Reply::doc(fixtures::running(LOCATION, 20))]),
            Duration::from_secs(3),
        );

        let started = Instant::now();
        let execution = checker.check_status(Source::Url(LOCATION.into())).await.unwrap();
        assert_eq!(execution.status(), JobStatus::Running);
        assert_eq!(started.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn terminal_job_returns_without_settle_delay() {
        let checker = StatusChecker::new(
            ScriptedFetcher::new([Reply::doc(fixtures::succeeded(LOCATION))]),
            Duration::from_secs(3),
        );

        let started = Instant::now();
        let execution = checker.check_status(Source::Url(LOCATION.into())).await.unwrap();
        assert_eq!(execution.status(), JobStatus::Succeeded);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_fetch_skips_settle_delay() {
        let checker = StatusChecker::new(
            ScriptedFetcher::new([Reply::Http(503)]),
            Duration::from_secs(3),
        );

        let started = Instant::now();
        assert!(checker.check_status(Source::Url(LOCATION.into())).await.is_err());
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn fetch_failure_propagates() {
        let checker = checker(vec![Reply::Http(502)]);
        let err = checker.check_status(Source::Url(LOCATION.into())).await.unwrap_err();
        assert!(matches!(err, WpsError::HttpStatus { status: 502, .. }));
    }

    #[tokio::test]
    async fn unusable_document_is_status_check_failed() {
        let checker = checker(vec![Reply::Body(Vec::new())]);
        let err = checker.check_status(Source::Url(LOCATION.into())).await.unwrap_err();
        assert!(matches!(err, WpsError::StatusCheckFailed(_)));
        assert!(err.is_transient());
    }
}
