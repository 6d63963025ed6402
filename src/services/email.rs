use anyhow::Context;
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use uuid::Uuid;

use crate::config::Config;
use crate::models::menu::DaySlot;
use crate::models::week::{WeekKey, DAY_LABELS};

pub struct EmailService {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl EmailService {
    /// Returns None if SMTP is not fully configured.
    pub fn new(config: &Config) -> Option<Self> {
        let host = config.smtp_host.as_deref()?;
        let username = config.smtp_username.clone()?;
        let password = config.smtp_password.clone()?;
        let from_addr = config.smtp_from.as_deref()?;

        let port = config.smtp_port.unwrap_or(587);
        let creds = Credentials::new(username, password);

        let transport = if port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)
                .ok()?
                .credentials(creds)
                .build()
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                .ok()?
                .credentials(creds)
                .build()
        };

        let from: Mailbox = from_addr.parse().ok()?;

        Some(Self { transport, from })
    }

    // ─── Private helpers ─────────────────────────────────────────────────────

    fn new_message_id(&self) -> String {
        format!("<{}@{}>", Uuid::new_v4(), self.from.email.domain())
    }

    /// Wraps inner HTML content in a consistent branded email layout.
    fn wrap_html(school_name: &str, content: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html lang="hu">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width,initial-scale=1">
  <title>{school_name}</title>
</head>
<body style="margin:0;padding:0;background-color:#f1f5f9;font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,Helvetica,Arial,sans-serif">
  <table role="presentation" width="100%" cellpadding="0" cellspacing="0" style="background-color:#f1f5f9;padding:40px 16px">
    <tr>
      <td align="center">
        <table role="presentation" width="100%" cellpadding="0" cellspacing="0" style="max-width:520px">
          <tr>
            <td align="center" style="padding-bottom:28px">
              <p style="margin:0;font-size:20px;font-weight:700;color:#0f172a;text-align:center">{school_name}</p>
            </td>
          </tr>
          <tr>
            <td style="background:#ffffff;border-radius:12px;padding:40px;box-shadow:0 1px 3px rgba(0,0,0,0.08),0 8px 24px rgba(0,0,0,0.04)">
              {content}
            </td>
          </tr>
          <tr>
            <td align="center" style="padding-top:20px">
              <p style="margin:0;font-size:12px;color:#94a3b8">{school_name}</p>
            </td>
          </tr>
        </table>
      </td>
    </tr>
  </table>
</body>
</html>"#
        )
    }

    async fn send_email(
        &self,
        from: Mailbox,
        to: Mailbox,
        subject: &str,
        text: &str,
        html: &str,
    ) -> anyhow::Result<()> {
        let email = Message::builder()
            .message_id(Some(self.new_message_id()))
            .from(from)
            .to(to)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html.to_string()),
                    ),
            )
            .context("Failed to build email message")?;

        self.transport
            .send(email)
            .await
            .context("Failed to send email")?;

        Ok(())
    }

    // ─── Public methods ───────────────────────────────────────────────────────

    /// Announce that next week's menu is published and the order window is
    /// open.
    pub async fn send_lunch_open(
        &self,
        to_email: &str,
        to_name: &str,
        week_key: WeekKey,
        slots: &[DaySlot],
        school_name: &str,
        portal_url: &str,
    ) -> anyhow::Result<()> {
        let from = Mailbox::new(Some(school_name.to_string()), self.from.email.clone());
        let to: Mailbox = format!("{to_name} <{to_email}>")
            .parse()
            .or_else(|_| to_email.parse())
            .context("invalid recipient address")?;

        let subject = format!("Ebédrendelés — a {}. heti étlap elérhető", week_key.week);

        let text = format!(
            "Kedves {to_name}!\n\n\
            Megjelent a {}. heti étlap. Az ebédrendelés mostantól nyitva áll:\n\
            {portal_url}\n\n\
            {school_name}",
            week_key.week
        );

        let html = Self::wrap_html(school_name, &menu_content_html(week_key, slots, portal_url));
        self.send_email(from, to, &subject, &text, &html).await
    }
}

fn menu_content_html(week_key: WeekKey, slots: &[DaySlot], portal_url: &str) -> String {
    let mut rows = String::new();
    for (day, slot) in slots.iter().enumerate() {
        let label = DAY_LABELS.get(day).copied().unwrap_or("");
        let options = if slot.0.is_empty() {
            "—".to_string()
        } else {
            slot.0
                .iter()
                .map(|o| o.label.as_str())
                .collect::<Vec<_>>()
                .join(" · ")
        };
        rows.push_str(&format!(
            r#"<tr><td style="padding:6px 10px 6px 0;width:110px;color:#6b7280;font-weight:600">{label}</td><td style="padding:6px 0;color:#374151">{options}</td></tr>"#
        ));
    }

    format!(
        r#"<h1 style="margin:0 0 8px 0;font-size:22px;font-weight:700;color:#0f172a">{}. heti étlap</h1>
<p style="margin:0 0 20px 0;font-size:15px;color:#64748b;line-height:1.6">Az ebédrendelés megnyílt. A rendelést a hét zárásáig módosíthatod.</p>
<table role="presentation" width="100%" cellpadding="0" cellspacing="0" style="font-size:14px;border-collapse:collapse;margin-bottom:28px">
{rows}
</table>
<table role="presentation" cellpadding="0" cellspacing="0">
  <tr>
    <td style="border-radius:8px;background:#2563eb">
      <a href="{portal_url}" style="display:inline-block;padding:13px 28px;color:#ffffff;text-decoration:none;font-weight:600;font-size:15px;border-radius:8px">Rendelés leadása</a>
    </td>
  </tr>
</table>"#,
        week_key.week
    )
}
