//! Loading of workflow definitions.
//!
//! The WPS process receives the workflow as a single JSON string input. It is
//! serialized in the layout `json.dumps` produces (`", "` and `": "`
//! separators, non-ASCII escaped) so servers see the same text regardless of
//! which client submitted it. Numbers keep their source digits, so integers
//! beyond 64 bits reach the server unchanged.

use std::io;
use std::path::Path;

use serde::Serialize;
use serde_json::ser::Formatter;

use crate::error::RunError;

/// Name of the WPS input carrying the workflow.
pub const WORKFLOW_INPUT: &str = "workflow_string";

/// Outputs requested from the workflow process, all as references.
pub const REQUESTED_OUTPUTS: [&str; 2] = ["output", "logfile"];

/// Read a workflow file and return its canonical JSON text.
pub fn load_workflow(path: &Path) -> Result<String, RunError> {
    let contents = std::fs::read_to_string(path).map_err(|source| RunError::WorkflowIo {
        path: path.to_path_buf(),
        source,
    })?;
    let value: serde_json::Value =
        serde_json::from_str(&contents).map_err(|source| RunError::WorkflowJson {
            path: path.to_path_buf(),
            source,
        })?;
    to_workflow_string(&value).map_err(|source| RunError::WorkflowJson {
        path: path.to_path_buf(),
        source,
    })
}

/// Serialize a JSON value in the canonical workflow layout.
pub fn to_workflow_string(value: &serde_json::Value) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, SpacedFormatter);
    value.serialize(&mut ser)?;
    // The formatter only ever writes ASCII.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        for ch in fragment.chars() {
            if ch.is_ascii() {
                let mut byte = [0u8; 1];
                writer.write_all(ch.encode_utf8(&mut byte).as_bytes())?;
            } else {
                let mut units = [0u16; 2];
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{unit:04x}")?;
                }
            }
        }
        Ok(())
    }
}
