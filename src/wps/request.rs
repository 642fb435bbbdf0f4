//! Construction of WPS 1.0.0 `Execute` request documents.

/// A literal input passed to the process, as `(identifier, value)`.
pub type Input = (String, String);

/// A requested output, as `(identifier, as_reference)`.
pub type RequestedOutput = (String, bool);

/// Build an asynchronous `Execute` request.
///
/// The response document is stored server-side with status updates enabled,
/// which is what makes the returned `statusLocation` pollable.
pub fn build_execute_request(
    identifier: &str,
    inputs: &[Input],
    outputs: &[RequestedOutput],
) -> String {
    let mut lines = vec![
        r#"<?xml version="1.0" encoding="UTF-8"?>"#.to_string(),
        concat!(
            r#"<wps:Execute service="WPS" version="1.0.0" "#,
            r#"xmlns:wps="http://www.opengis.net/wps/1.0.0" "#,
            r#"xmlns:ows="http://www.opengis.net/ows/1.1" "#,
            r#"xmlns:xlink="http://www.w3.org/1999/xlink">"#
        )
        .to_string(),
        format!("  <ows:Identifier>{}</ows:Identifier>", escape_text(identifier)),
        "  <wps:DataInputs>".to_string(),
    ];
    for (name, value) in inputs {
        lines.push("    <wps:Input>".to_string());
        lines.push(format!("      <ows:Identifier>{}</ows:Identifier>", escape_text(name)));
        lines.push(format!(
            "      <wps:Data><wps:LiteralData>{}</wps:LiteralData></wps:Data>",
            escape_text(value)
        ));
        lines.push("    </wps:Input>".to_string());
    }
    lines.push("  </wps:DataInputs>".to_string());
    lines.push("  <wps:ResponseForm>".to_string());
    lines.push(r#"    <wps:ResponseDocument storeExecuteResponse="true" status="true">"#.to_string());
    for (name, as_reference) in outputs {
        lines.push(format!(r#"      <wps:Output asReference="{as_reference}">"#));
        lines.push(format!("        <ows:Identifier>{}</ows:Identifier>", escape_text(name)));
        lines.push("      </wps:Output>".to_string());
    }
    lines.push("    </wps:ResponseDocument>".to_string());
    lines.push("  </wps:ResponseForm>".to_string());
    lines.push("</wps:Execute>".to_string());
    lines.join("\n")
}

// Element content only; quotes stay literal so JSON payloads survive untouched.
fn escape_text(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
