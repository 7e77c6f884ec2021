//! MIME construction for the report email.

use lettre::message::{Mailbox, SinglePart};
use lettre::{Address, Message};

use gatewayreport_shared::{GatewayReportError, ReportConfig, Result};

/// Subject line of every report.
pub const REPORT_SUBJECT: &str = "Domain Query Report";

/// A fully formatted message plus the envelope it is delivered under.
#[derive(Debug, Clone)]
pub struct OutgoingMessage {
    envelope: lettre::address::Envelope,
    raw: Vec<u8>,
    html: String,
    message_id: Option<String>,
}

impl OutgoingMessage {
    /// Envelope sender.
    pub fn sender(&self) -> String {
        self.envelope
            .from()
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    /// Envelope recipient.
    pub fn recipient(&self) -> String {
        self.envelope
            .to()
            .first()
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    pub fn envelope(&self) -> &lettre::address::Envelope {
        &self.envelope
    }

    /// RFC 5322 bytes as they go over the wire.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// The HTML body before transfer encoding.
    pub fn html(&self) -> &str {
        &self.html
    }

    /// Value of the generated `Message-ID` header.
    pub fn message_id(&self) -> Option<&str> {
        self.message_id.as_deref()
    }
}

/// Build the report email: one `text/html` part, fixed subject.
pub fn build_report_message(config: &ReportConfig, html: String) -> Result<OutgoingMessage> {
    let from = Mailbox::new(
        Some(config.sender_name.clone()).filter(|name| !name.is_empty()),
        parse_address("sender", &config.sender_address)?,
    );
    let to = Mailbox::new(None, parse_address("recipient", &config.recipient_address)?);

    let message = Message::builder()
        .from(from)
        .to(to)
        .subject(REPORT_SUBJECT)
        .message_id(None)
        .singlepart(SinglePart::html(html.clone()))
        .map_err(|e| GatewayReportError::send(format!("failed to build message: {e}")))?;

    let message_id = message
        .headers()
        .get_raw("Message-ID")
        .map(|id| id.to_string());

    Ok(OutgoingMessage {
        envelope: message.envelope().clone(),
        raw: message.formatted(),
        html,
        message_id,
    })
}

fn parse_address(role: &str, value: &str) -> Result<Address> {
    value
        .parse::<Address>()
        .map_err(|e| GatewayReportError::config(format!("invalid {role} address '{value}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config() -> ReportConfig {
        ReportConfig {
            api_token: "t".into(),
            account_id: "a".into(),
            api_base_url: "https://api.example.com/client/v4".parse().unwrap(),
            request_timeout: Duration::from_secs(5),
            sender_address: "reports@example.com".into(),
            sender_name: "Gateway Report".into(),
            recipient_address: "alerts@example.com".into(),
        }
    }

    #[test]
    fn message_has_headers_and_html_part() {
        let msg = build_report_message(&config(), "<html><body>hi</body></html>".into())
            .expect("build");
        let raw = String::from_utf8(msg.raw().to_vec()).expect("utf8");

        assert!(raw.contains("Subject: Domain Query Report"));
        assert!(raw.lines().any(|line| line.starts_with("From:")
            && line.contains("Gateway Report")
            && line.contains("<reports@example.com>")));
        assert!(raw.lines().any(|line| line.starts_with("To:") && line.contains("alerts@example.com")));
        assert!(raw.contains("Content-Type: text/html; charset=utf-8"));
        assert!(raw.contains("<html><body>hi</body></html>"));
        assert_eq!(msg.html(), "<html><body>hi</body></html>");
        assert!(msg.message_id().is_some());
    }

    #[test]
    fn envelope_matches_config() {
        let msg = build_report_message(&config(), String::new()).expect("build");
        assert_eq!(msg.sender(), "reports@example.com");
        assert_eq!(msg.recipient(), "alerts@example.com");
        assert_eq!(msg.envelope().to().len(), 1);
    }

    #[test]
    fn invalid_address_is_a_config_error() {
        let mut cfg = config();
        cfg.recipient_address = "not an address".into();
        let err = build_report_message(&cfg, String::new()).unwrap_err();
        assert!(matches!(err, GatewayReportError::Config { .. }));
        assert!(err.to_string().contains("recipient"));
    }
}
