//! Error types for accessonix operations.

use thiserror::Error;

/// Errors that can occur while analyzing an EPUB or transforming an ONIX record.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The EPUB archive could not be opened or has no package document.
    #[error("Malformed EPUB package: {0}")]
    MalformedPackage(String),

    /// The ONIX input is not well-formed XML, even after lenient recovery.
    #[error("ONIX parse error: {0}")]
    Parse(String),

    /// The assembled ONIX 3.0 document broke a required-element or ordering rule.
    #[error("ONIX validation error: {0}")]
    Validation(String),

    /// A caller-supplied value (ISBN, override field, feature code) was rejected.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Whether the error was caused by the caller's input rather than by the engine.
    ///
    /// Web and CLI callers use this to choose between a client error (bad upload)
    /// and an internal failure.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Error::MalformedPackage(_) | Error::Parse(_) | Error::InvalidInput(_)
        )
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::MalformedPackage(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Parse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_error_classification() {
        assert!(Error::MalformedPackage("no opf".into()).is_input_error());
        assert!(Error::Parse("eof".into()).is_input_error());
        assert!(Error::InvalidInput("isbn".into()).is_input_error());
        assert!(!Error::Validation("order".into()).is_input_error());
        assert!(!Error::Io(std::io::Error::other("disk")).is_input_error());
    }

    #[test]
    fn test_zip_error_is_malformed_package() {
        let err: Error = zip::result::ZipError::InvalidArchive("bad".into()).into();
        assert!(matches!(err, Error::MalformedPackage(_)));
    }
}
