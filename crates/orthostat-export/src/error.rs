use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("template rendering failed: {0}")]
    TemplateRender(String),

    #[error("template parse error: {0}")]
    TemplateParse(String),

    #[error("DOCX generation failed: {0}")]
    Docx(String),

    #[error("chart rendering failed: {0}")]
    Chart(String),

    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("chart capture failed: {0}")]
    CaptureFailed(String),

    #[error("invalid report options: {0}")]
    InvalidOptions(String),

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<tera::Error> for ExportError {
    fn from(e: tera::Error) -> Self {
        ExportError::TemplateRender(e.to_string())
    }
}
