//! Mail dispatch: the send capability and its SMTP implementation.

use std::future::Future;
use std::time::Duration;

use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use tracing::{info, instrument};

use gatewayreport_shared::{GatewayReportError, Result, SmtpSettings, SmtpTls};

use crate::message::OutgoingMessage;

/// Default SMTP command timeout.
const SMTP_TIMEOUT_SECS: u64 = 60;

/// Something that can deliver a formatted message.
///
/// Implementations receive the envelope (sender, recipient) and raw MIME
/// bytes, and either deliver or fail with [`GatewayReportError::Send`].
pub trait MailTransport: Send + Sync {
    fn send(&self, message: &OutgoingMessage) -> impl Future<Output = Result<()>> + Send;
}

/// SMTP relay transport.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    host: String,
}

impl SmtpMailer {
    pub fn new(settings: &SmtpSettings) -> Result<Self> {
        let builder = match settings.tls {
            SmtpTls::Starttls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
                .map_err(|e| GatewayReportError::config(format!("smtp: {e}")))?,
            SmtpTls::Implicit => AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
                .map_err(|e| GatewayReportError::config(format!("smtp: {e}")))?,
            SmtpTls::Plain => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host),
        };

        let mut builder = builder
            .port(settings.port)
            .timeout(Some(Duration::from_secs(SMTP_TIMEOUT_SECS)));

        if let Some((user, password)) = &settings.credentials {
            builder = builder.credentials(Credentials::new(user.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            host: settings.host.clone(),
        })
    }
}

impl std::fmt::Debug for SmtpMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpMailer").field("host", &self.host).finish()
    }
}

impl MailTransport for SmtpMailer {
    #[instrument(skip_all, fields(host = %self.host))]
    async fn send(&self, message: &OutgoingMessage) -> Result<()> {
        let response = self
            .transport
            .send_raw(message.envelope(), message.raw())
            .await
            .map_err(|e| GatewayReportError::send(format!("smtp {}: {e}", self.host)))?;

        info!(
            code = %response.code(),
            recipient = %message.recipient(),
            "message accepted by relay"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(tls: SmtpTls) -> SmtpSettings {
        SmtpSettings {
            host: "smtp.example.com".into(),
            port: 2525,
            tls,
            credentials: Some(("mailer".into(), "pw".into())),
        }
    }

    #[tokio::test]
    async fn builds_for_every_tls_mode() {
        for tls in [SmtpTls::Starttls, SmtpTls::Implicit, SmtpTls::Plain] {
            let mailer = SmtpMailer::new(&settings(tls)).expect("build transport");
            assert!(format!("{mailer:?}").contains("smtp.example.com"));
        }
    }

    #[tokio::test]
    async fn unreachable_relay_is_a_send_error() {
        let mailer = SmtpMailer::new(&SmtpSettings {
            host: "127.0.0.1".into(),
            port: 1,
            tls: SmtpTls::Plain,
            credentials: None,
        })
        .unwrap();

        let config = gatewayreport_shared::ReportConfig {
            api_token: "t".into(),
            account_id: "a".into(),
            api_base_url: "https://api.example.com".parse().unwrap(),
            request_timeout: Duration::from_secs(5),
            sender_address: "reports@example.com".into(),
            sender_name: String::new(),
            recipient_address: "alerts@example.com".into(),
        };
        let message = crate::build_report_message(&config, "<p>x</p>".into()).unwrap();

        let err = mailer.send(&message).await.unwrap_err();
        assert!(matches!(err, GatewayReportError::Send(_)));
    }
}
