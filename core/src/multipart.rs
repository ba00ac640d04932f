//! `multipart/form-data` encoding.
//!
//! The boundary is a fixed token, so a field or file containing it cannot
//! be sent intact. In field names and filenames `"`, CR and LF are
//! percent-escaped the way browsers write them.

use crate::body::EncodedBody;
use crate::types::FileUpload;

pub const BOUNDARY: &str = "----------ThIs_Is_tHe_bouNdaRY_$";

const CRLF: &[u8] = b"\r\n";

/// Guess a part's content type from the filename extension.
pub fn content_type_for(filename: &str) -> String {
    mime_guess::from_path(filename)
        .first_raw()
        .unwrap_or("application/octet-stream")
        .to_string()
}

/// Encode plain fields followed by file parts.
///
/// Field values are written as-is, never URL-encoded.
pub fn encode_multipart(fields: &[(String, String)], files: &[(String, FileUpload)]) -> EncodedBody {
    let mut body = Vec::new();

    for (name, value) in fields {
        push_line(&mut body, format!("--{BOUNDARY}").as_bytes());
        push_line(
            &mut body,
            format!("Content-Disposition: form-data; name=\"{}\"", quoted(name)).as_bytes(),
        );
        push_line(&mut body, b"");
        push_line(&mut body, value.as_bytes());
    }

    for (name, file) in files {
        push_line(&mut body, format!("--{BOUNDARY}").as_bytes());
        push_line(
            &mut body,
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"",
                quoted(name),
                quoted(&file.filename)
            )
            .as_bytes(),
        );
        push_line(
            &mut body,
            format!("Content-Type: {}", content_type_for(&file.filename)).as_bytes(),
        );
        push_line(&mut body, b"");
        push_line(&mut body, &file.content);
    }

    push_line(&mut body, format!("--{BOUNDARY}--").as_bytes());

    EncodedBody {
        content_type: format!("multipart/form-data; boundary={BOUNDARY}"),
        bytes: body,
    }
}

fn quoted(value: &str) -> String {
    value.replace('"', "%22").replace('\r', "%0D").replace('\n', "%0A")
}

fn push_line(body: &mut Vec<u8>, line: &[u8]) {
    body.extend_from_slice(line);
    body.extend_from_slice(CRLF);
}
