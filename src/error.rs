use actix_web::http::StatusCode;

/// Upload rejections surfaced to the user. The message text is what the form
/// and the JSON API display verbatim.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("No file selected")]
    MissingFile,
    #[error("Invalid file type")]
    UnsupportedType,
    #[error("File is too large")]
    TooLarge,
    #[error("Could not read the uploaded image")]
    UndecodableImage,
    #[error("Upload was interrupted")]
    Unreadable,
    #[error("Something went wrong, please try again")]
    Internal,
}

impl UploadError {
    /// Status for the HTML flow. Validation failures re-render the form as a
    /// normal page so the browser shows the annotated form inline.
    pub fn form_status(&self) -> StatusCode {
        match self {
            UploadError::TooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            UploadError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::OK,
        }
    }

    /// Status for the JSON API, where validation failures are client errors.
    pub fn api_status(&self) -> StatusCode {
        match self {
            UploadError::TooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            UploadError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
