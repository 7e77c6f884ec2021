//! Report email construction and delivery.
//!
//! This crate provides:
//! - [`build_report_message`]: one-part HTML MIME message with a fixed subject
//! - [`MailTransport`]: the send capability the pipeline dispatches through
//! - [`SmtpMailer`]: SMTP relay implementation backed by `lettre`

mod message;
mod transport;

pub use message::{OutgoingMessage, REPORT_SUBJECT, build_report_message};
pub use transport::{MailTransport, SmtpMailer};
