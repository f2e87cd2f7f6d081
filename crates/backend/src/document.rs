use std::io;
use std::path::Path;

use bytes::Bytes;
use mime::Mime;

/// File extensions the backend knows how to ingest.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "txt", "doc", "docx"];

const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// A file selected for upload.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Document {
    file_name: String,
    content_type: Mime,
    contents: Bytes,
}

impl Document {
    /// Creates a document from in-memory contents. The content type is
    /// guessed from the file name.
    pub fn new<S, B>(file_name: S, contents: B) -> Self
    where
        S: Into<String>,
        B: Into<Bytes>,
    {
        let file_name = file_name.into();
        let content_type = guess_content_type(&file_name);
        Self {
            file_name,
            content_type,
            contents: contents.into(),
        }
    }

    /// Reads a document from disk.
    pub fn read_from<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref();
        let Some(file_name) = path.file_name() else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a file: {}", path.display()),
            ));
        };
        let contents = std::fs::read(path)?;
        Ok(Self::new(file_name.to_string_lossy(), contents))
    }

    /// Overrides the guessed content type.
    #[inline]
    pub fn with_content_type(mut self, content_type: Mime) -> Self {
        self.content_type = content_type;
        self
    }

    /// Returns the file name (without directories).
    #[inline]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Returns the content type.
    #[inline]
    pub fn content_type(&self) -> &Mime {
        &self.content_type
    }

    /// Returns the raw contents.
    #[inline]
    pub fn contents(&self) -> &Bytes {
        &self.contents
    }

    /// Returns the size of the contents in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.contents.len()
    }

    /// Returns `true` if the document has no contents.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    /// Returns `true` if the extension is one of [`SUPPORTED_EXTENSIONS`].
    pub fn is_supported(&self) -> bool {
        extension(&self.file_name).is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
    }
}

fn extension(file_name: &str) -> Option<&str> {
    Path::new(file_name).extension().and_then(|ext| ext.to_str())
}

fn guess_content_type(file_name: &str) -> Mime {
    let Some(ext) = extension(file_name) else {
        return mime::APPLICATION_OCTET_STREAM;
    };
    let essence = match ext.to_ascii_lowercase().as_str() {
        "pdf" => return mime::APPLICATION_PDF,
        "txt" => return mime::TEXT_PLAIN,
        "doc" => "application/msword",
        "docx" => DOCX_CONTENT_TYPE,
        _ => return mime::APPLICATION_OCTET_STREAM,
    };
    essence.parse().unwrap_or(mime::APPLICATION_OCTET_STREAM)
}
