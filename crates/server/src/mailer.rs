//! Outbound delivery of rendered reports over SMTP.
//!
//! One fixed message shape: plain-text body plus the report attached as
//! `loan_report.pdf`. Delivery is synchronous from the request's point of
//! view and never retried; a relay rejection surfaces to the caller.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secrecy::ExposeSecret;
use tracing::{info, warn};

use loanlens_core::config::SmtpConfig;
use loanlens_core::errors::ApplicationError;

const REPORT_FILENAME: &str = "loan_report.pdf";
const REPORT_SUBJECT: &str = "Loan Analysis Report";
const REPORT_BODY: &str = "Please find your loan analysis report attached as PDF.";

#[async_trait]
pub trait ReportMailer: Send + Sync {
    async fn send_report(&self, to: &str, report: Vec<u8>) -> Result<(), ApplicationError>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: Mailbox,
}

impl SmtpMailer {
    pub fn from_config(config: &SmtpConfig) -> Result<Self, ApplicationError> {
        let from_address = config.from_address.parse::<Mailbox>().map_err(|error| {
            ApplicationError::Configuration(format!(
                "smtp.from_address `{}` is not a valid mailbox: {error}",
                config.from_address
            ))
        })?;

        let credentials = Credentials::new(
            config.username.expose_secret().to_string(),
            config.password.expose_secret().to_string(),
        );

        // STARTTLS against the configured relay; credentials are presented
        // after the session is secured.
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|error| {
                ApplicationError::Configuration(format!(
                    "smtp relay `{}` is unusable: {error}",
                    config.host
                ))
            })?
            .port(config.port)
            .credentials(credentials)
            .build();

        Ok(Self { transport, from_address })
    }
}

#[async_trait]
impl ReportMailer for SmtpMailer {
    async fn send_report(&self, to: &str, report: Vec<u8>) -> Result<(), ApplicationError> {
        let recipient = to.parse::<Mailbox>().map_err(|error| {
            ApplicationError::Mail(format!("invalid recipient `{to}`: {error}"))
        })?;

        let attachment = Attachment::new(REPORT_FILENAME.to_string()).body(
            report,
            ContentType::parse("application/pdf").expect("static MIME type"),
        );

        let message = Message::builder()
            .from(self.from_address.clone())
            .to(recipient)
            .subject(REPORT_SUBJECT)
            .multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::plain(REPORT_BODY.to_string()))
                    .singlepart(attachment),
            )
            .map_err(|error| ApplicationError::Mail(error.to_string()))?;

        self.transport.send(message).await.map_err(|error| {
            warn!(error = %error, "report email delivery failed");
            ApplicationError::Mail(error.to_string())
        })?;

        info!(to = %to, "report email delivered");
        Ok(())
    }
}
