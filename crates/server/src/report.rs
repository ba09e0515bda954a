//! Report rendering for loan analyses.
//!
//! The fixed-layout document is rendered from an HTML template and converted
//! to PDF via an external tool (wkhtmltopdf) when one is installed. Without
//! a converter the HTML bytes are served directly for browser rendering; a
//! converter that is present but fails is an error, not a fallback.

use axum::{
    body::Body,
    http::{header, StatusCode},
    response::Response,
};
use std::process::Stdio;
use tera::{Context, Tera};
use tokio::process::Command;
use tracing::{error, info, warn};

use loanlens_core::application::{display_scalar, title_case, ApplicationData};
use loanlens_core::AnalysisResult;

const REPORT_TEMPLATE: &str = "loan_report.html.tera";

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(String),
    #[error("conversion error: {0}")]
    Conversion(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Clone, Debug)]
pub struct ReportRenderer {
    tera: Tera,
    pub(crate) wkhtmltopdf_path: Option<String>,
}

impl ReportRenderer {
    /// Create a renderer loading templates from the given directory.
    pub fn new(template_dir: &str) -> Result<Self, RenderError> {
        let tera = Tera::new(&format!("{}/**/*", template_dir))
            .map_err(|error| RenderError::Template(error.to_string()))?;

        Ok(Self { tera, wkhtmltopdf_path: detect_wkhtmltopdf() })
    }

    /// Create a renderer with the embedded report template, used when the
    /// filesystem templates are unavailable and in tests.
    pub fn with_embedded_template() -> Self {
        let mut tera = Tera::default();
        tera.add_raw_template(
            REPORT_TEMPLATE,
            include_str!("../../../templates/reports/loan_report.html.tera"),
        )
        .expect("embedded report template should parse");

        Self { tera, wkhtmltopdf_path: detect_wkhtmltopdf() }
    }

    /// Render the report for one application + analysis pair.
    ///
    /// Candidate details follow payload insertion order; the loan type is
    /// expected to be merged into `data` already. Empty tip/alternative
    /// lists still render as bare section headers. A configured converter
    /// that fails propagates as an error.
    pub async fn render(
        &self,
        data: &ApplicationData,
        analysis: &AnalysisResult,
    ) -> Result<RenderedReport, RenderError> {
        let html = self.render_html(data, analysis)?;

        match self.wkhtmltopdf_path {
            Some(ref wkhtmltopdf) => {
                let pdf_bytes = convert_html_to_pdf(&html, wkhtmltopdf).await?;
                Ok(RenderedReport::Pdf(pdf_bytes))
            }
            None => Ok(RenderedReport::Html(html)),
        }
    }

    fn render_html(
        &self,
        data: &ApplicationData,
        analysis: &AnalysisResult,
    ) -> Result<String, RenderError> {
        let details = data
            .iter()
            .map(|(key, value)| {
                serde_json::json!({
                    "label": title_case(key),
                    "value": display_scalar(value),
                })
            })
            .collect::<Vec<_>>();

        let mut context = Context::new();
        context.insert("details", &details);
        context.insert("loan_type", data.text("loan_type").unwrap_or(""));
        context.insert("decision", &analysis.decision.to_string());
        context.insert("risk_score", &analysis.risk_score);
        context.insert("reasons", &analysis.reasons);
        context.insert("improvement_tips", &analysis.improvement_tips);
        context.insert("alternatives", &analysis.comparison_insights);

        self.tera
            .render(REPORT_TEMPLATE, &context)
            .map_err(|error| RenderError::Template(error.to_string()))
    }
}

fn detect_wkhtmltopdf() -> Option<String> {
    let path = which::which("wkhtmltopdf").ok().map(|p| p.to_string_lossy().to_string());
    match &path {
        Some(found) => info!(path = %found, "wkhtmltopdf found, reports will be PDF"),
        None => warn!("wkhtmltopdf not found in PATH, reports will fall back to HTML"),
    }
    path
}

async fn convert_html_to_pdf(html: &str, wkhtmltopdf_path: &str) -> Result<Vec<u8>, RenderError> {
    let temp_dir = std::env::temp_dir();
    let html_path = temp_dir.join(format!("loan_report_{}.html", uuid::Uuid::new_v4()));
    let pdf_path = temp_dir.join(format!("loan_report_{}.pdf", uuid::Uuid::new_v4()));

    tokio::fs::write(&html_path, html).await?;

    // Both temp files are removed whether conversion succeeds or not.
    let result = match run_wkhtmltopdf(wkhtmltopdf_path, &html_path, &pdf_path).await {
        Ok(()) => tokio::fs::read(&pdf_path).await.map_err(RenderError::from),
        Err(error) => Err(error),
    };
    let _ = tokio::fs::remove_file(&html_path).await;
    let _ = tokio::fs::remove_file(&pdf_path).await;

    let pdf_bytes = result?;
    info!(size = pdf_bytes.len(), "report PDF generated");

    Ok(pdf_bytes)
}

async fn run_wkhtmltopdf(
    wkhtmltopdf_path: &str,
    html_path: &std::path::Path,
    pdf_path: &std::path::Path,
) -> Result<(), RenderError> {
    let output = Command::new(wkhtmltopdf_path)
        .arg("--page-size")
        .arg("Letter")
        .arg("--margin-top")
        .arg("10mm")
        .arg("--margin-bottom")
        .arg("10mm")
        .arg("--margin-left")
        .arg("10mm")
        .arg("--margin-right")
        .arg("10mm")
        .arg("--encoding")
        .arg("utf-8")
        .arg(html_path)
        .arg(pdf_path)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        error!(stderr = %stderr, "wkhtmltopdf failed");
        return Err(RenderError::Conversion(stderr.to_string()));
    }

    Ok(())
}

/// Rendered document, consumed exactly once.
pub enum RenderedReport {
    Pdf(Vec<u8>),
    Html(String),
}

impl RenderedReport {
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Pdf(bytes) => bytes,
            Self::Html(html) => html.into_bytes(),
        }
    }

    /// Attachment-style download response.
    pub fn into_response(self, filename: &str) -> Response {
        match self {
            Self::Pdf(bytes) => Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, "application/pdf")
                .header(
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename={}", filename),
                )
                .body(Body::from(bytes))
                .unwrap(),
            Self::Html(html) => Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, "text/html; charset=utf-8")
                .body(Body::from(html))
                .unwrap(),
        }
    }
}
