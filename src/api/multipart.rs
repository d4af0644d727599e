//! Buffered `multipart/form-data` encoding.
//!
//! The request signature covers the body bytes, boundary included, so the
//! form is serialized in full before the request is built.

use uuid::Uuid;

const CRLF: &[u8] = b"\r\n";

#[derive(Debug)]
pub(crate) struct Form {
    boundary: String,
    body: Vec<u8>,
}

impl Form {
    pub(crate) fn new() -> Self {
        Self::with_boundary(format!("------------------------{}", Uuid::new_v4().simple()))
    }

    pub(crate) fn with_boundary(boundary: String) -> Self {
        Self {
            boundary,
            body: Vec::new(),
        }
    }

    pub(crate) fn text(mut self, name: &str, value: &str) -> Self {
        self.open_part(name, None, None);
        self.body.extend_from_slice(value.as_bytes());
        self.body.extend_from_slice(CRLF);
        self
    }

    pub(crate) fn file(
        mut self,
        name: &str,
        filename: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Self {
        self.open_part(name, Some(filename), Some(content_type));
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(CRLF);
        self
    }

    /// Value for the request's `Content-Type` header.
    pub(crate) fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Closes the form and returns the encoded body.
    pub(crate) fn finish(mut self) -> Vec<u8> {
        self.body.extend_from_slice(b"--");
        self.body.extend_from_slice(self.boundary.as_bytes());
        self.body.extend_from_slice(b"--");
        self.body.extend_from_slice(CRLF);
        self.body
    }

    fn open_part(&mut self, name: &str, filename: Option<&str>, content_type: Option<&str>) {
        self.body.extend_from_slice(b"--");
        self.body.extend_from_slice(self.boundary.as_bytes());
        self.body.extend_from_slice(CRLF);

        let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", escape(name));
        if let Some(filename) = filename {
            disposition.push_str(&format!("; filename=\"{}\"", escape(filename)));
        }
        self.body.extend_from_slice(disposition.as_bytes());
        self.body.extend_from_slice(CRLF);

        if let Some(content_type) = content_type {
            self.body.extend_from_slice(b"Content-Type: ");
            self.body.extend_from_slice(content_type.as_bytes());
            self.body.extend_from_slice(CRLF);
        }
        self.body.extend_from_slice(CRLF);
    }
}

fn escape(value: &str) -> String {
    value
        .replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
