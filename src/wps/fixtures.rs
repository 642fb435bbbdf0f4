//! Status documents and a scripted fetcher shared by tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use super::client::Fetcher;
use super::error::WpsError;

fn response(status_location: &str, status: &str, outputs: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<wps:ExecuteResponse xmlns:wps="http://www.opengis.net/wps/1.0.0" xmlns:ows="http://www.opengis.net/ows/1.1" service="WPS" version="1.0.0" statusLocation="{status_location}">
  <wps:Process wps:processVersion="1.0">
    <ows:Identifier>custom_workflow</ows:Identifier>
  </wps:Process>
  <wps:Status creationTime="2026-10-19T09:00:00Z">
    {status}
  </wps:Status>{outputs}
</wps:ExecuteResponse>"#
    )
}

pub fn accepted(status_location: &str) -> String {
    response(
        status_location,
        "<wps:ProcessAccepted>Process accepted</wps:ProcessAccepted>",
        "",
    )
}

pub fn running(status_location: &str, percent: u8) -> String {
    response(
        status_location,
        &format!(
            r#"<wps:ProcessStarted percentCompleted="{percent}">Running step 1</wps:ProcessStarted>"#
        ),
        "",
    )
}

pub fn succeeded(status_location: &str) -> String {
    response(
        status_location,
        "<wps:ProcessSucceeded>Workflow completed</wps:ProcessSucceeded>",
        r#"
  <wps:ProcessOutputs>
    <wps:Output>
      <ows:Identifier>output</ows:Identifier>
      <wps:Reference href="http://wps.local/outputs/output.json" mimeType="application/json"/>
    </wps:Output>
    <wps:Output>
      <ows:Identifier>logfile</ows:Identifier>
      <wps:Reference href="http://wps.local/outputs/logfile.txt" mimeType="text/plain"/>
    </wps:Output>
  </wps:ProcessOutputs>"#,
    )
}

pub fn failed(status_location: &str, texts: &[&str]) -> String {
    let exceptions: String = texts
        .iter()
        .map(|text| {
            format!(
                r#"<ows:Exception exceptionCode="NoApplicableCode"><ows:ExceptionText>{text}</ows:ExceptionText></ows:Exception>"#
            )
        })
        .collect();
    response(
        status_location,
        &format!(
            "<wps:ProcessFailed><wps:ExceptionReport>{exceptions}</wps:ExceptionReport></wps:ProcessFailed>"
        ),
        "",
    )
}

/// One scripted reply of a [`ScriptedFetcher`].
pub enum Reply {
    Body(Vec<u8>),
    Http(u16),
}

impl Reply {
    pub fn doc(xml: String) -> Self {
        Reply::Body(xml.into_bytes())
    }
}

/// Fetcher that plays back a fixed list of replies and counts calls.
///
/// Fetching past the end of the script panics, so a test fails loudly if the
/// caller makes more attempts than expected.
pub struct ScriptedFetcher {
    replies: Mutex<VecDeque<Reply>>,
    calls: AtomicU32,
}

impl ScriptedFetcher {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, WpsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("fetch of {url} after script was exhausted"));
        match reply {
            Reply::Body(bytes) => Ok(bytes),
            Reply::Http(status) => Err(WpsError::HttpStatus {
                status,
                url: url.to_string(),
            }),
        }
    }
}
