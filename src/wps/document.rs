//! Decoding of WPS 1.0.0 status documents.
//!
//! Elements are matched by local name only, so `wps:Status`, `Status` and a
//! server-specific prefix all decode the same way.

use roxmltree::{Document, Node};

use super::error::WpsError;
use super::types::{ErrorDescriptor, JobStatus, OutputValue, ProcessOutput, StatusDocument};

/// Parse a status document into its structured form.
///
/// Any payload that is empty, not well-formed XML, or lacks a recognizable
/// status yields [`WpsError::StatusCheckFailed`].
pub fn parse_status_document(xml: &str) -> Result<StatusDocument, WpsError> {
    let payload = xml.trim_start_matches('\u{feff}').trim();
    if payload.is_empty() {
        return Err(WpsError::StatusCheckFailed("empty status document".into()));
    }

    let doc = Document::parse(payload)
        .map_err(|e| WpsError::StatusCheckFailed(format!("malformed status document: {e}")))?;
    let root = doc.root_element();

    match root.tag_name().name() {
        "ExecuteResponse" => parse_execute_response(root),
        "ExceptionReport" => Ok(StatusDocument {
            status: JobStatus::Failed,
            percent_completed: None,
            status_message: None,
            creation_time: None,
            process_identifier: None,
            status_location: None,
            errors: parse_exceptions(root),
            outputs: Vec::new(),
        }),
        other => Err(WpsError::StatusCheckFailed(format!(
            "unexpected root element <{other}>"
        ))),
    }
}

fn parse_execute_response(root: Node<'_, '_>) -> Result<StatusDocument, WpsError> {
    let status_node = child(root, "Status")
        .ok_or_else(|| WpsError::StatusCheckFailed("no Status element".into()))?;
    let state = status_node
        .children()
        .find(Node::is_element)
        .ok_or_else(|| WpsError::StatusCheckFailed("empty Status element".into()))?;

    let mut errors = Vec::new();
    let mut percent_completed = None;
    let status = match state.tag_name().name() {
        "ProcessAccepted" => JobStatus::Accepted,
        "ProcessStarted" | "ProcessPaused" => {
            percent_completed = state.attribute("percentCompleted").and_then(parse_percent);
            JobStatus::Running
        }
        "ProcessSucceeded" => JobStatus::Succeeded,
        "ProcessFailed" => {
            errors = parse_exceptions(state);
            JobStatus::Failed
        }
        other => {
            return Err(WpsError::StatusCheckFailed(format!(
                "unknown status <{other}>"
            )));
        }
    };

    // A failed status carries its text inside the exception report.
    let status_message = match status {
        JobStatus::Failed => None,
        _ => text_of(state),
    };

    Ok(StatusDocument {
        status,
        percent_completed,
        status_message,
        creation_time: status_node.attribute("creationTime").map(str::to_string),
        process_identifier: child(root, "Process")
            .and_then(|process| child(process, "Identifier"))
            .and_then(text_of),
        status_location: root.attribute("statusLocation").map(str::to_string),
        errors,
        outputs: child(root, "ProcessOutputs")
            .map(parse_outputs)
            .unwrap_or_default(),
    })
}

fn parse_exceptions(node: Node<'_, '_>) -> Vec<ErrorDescriptor> {
    node.descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "Exception")
        .map(|exception| {
            let text = exception
                .children()
                .filter(|n| n.is_element() && n.tag_name().name() == "ExceptionText")
                .filter_map(text_of)
                .collect::<Vec<_>>()
                .join("\n");
            ErrorDescriptor {
                code: exception.attribute("exceptionCode").map(str::to_string),
                locator: exception.attribute("locator").map(str::to_string),
                text,
            }
        })
        .collect()
}

fn parse_outputs(node: Node<'_, '_>) -> Vec<ProcessOutput> {
    node.children()
        .filter(|n| n.is_element() && n.tag_name().name() == "Output")
        .filter_map(|output| {
            let identifier = child(output, "Identifier").and_then(text_of)?;
            let value = if let Some(reference) = child(output, "Reference") {
                // WPS 1.0.0 uses a bare `href`; some servers send `xlink:href`.
                let href = reference
                    .attributes()
                    .find(|attr| attr.name() == "href")
                    .map(|attr| attr.value().to_string())?;
                OutputValue::Reference {
                    href,
                    mime_type: reference.attribute("mimeType").map(str::to_string),
                }
            } else {
                let data = child(output, "Data")?;
                let content = data.children().find(Node::is_element).unwrap_or(data);
                OutputValue::Data(text_of(content).unwrap_or_default())
            };
            Some(ProcessOutput { identifier, value })
        })
        .collect()
}

fn parse_percent(raw: &str) -> Option<u8> {
    let value: f64 = raw.trim().parse().ok()?;
    Some(value.clamp(0.0, 100.0) as u8)
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

fn text_of(node: Node<'_, '_>) -> Option<String> {
    let text: String = node
        .descendants()
        .filter(Node::is_text)
        .filter_map(|n| n.text())
        .collect();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
