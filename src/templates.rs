use crate::config::MailSettings;
use crate::mailer::OutgoingEmail;
use crate::models::ContactSubmission;

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

// "phone_number" -> "Phone number"
fn label(key: &str) -> String {
    let spaced = key.replace(['_', '-'], " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn notification_text(fields: &[(String, String)]) -> String {
    let mut text = String::from("New contact form submission\n\n");
    for (key, value) in fields {
        text.push_str(&format!("{}: {}\n", label(key), value));
    }
    text
}

pub fn notification_html(fields: &[(String, String)]) -> String {
    let rows: String = fields
        .iter()
        .map(|(key, value)| {
            format!(
                "<tr><td style=\"padding:6px 12px;font-weight:bold;vertical-align:top\">{}</td>\
                 <td style=\"padding:6px 12px\">{}</td></tr>",
                escape_html(&label(key)),
                escape_html(value).replace('\n', "<br>")
            )
        })
        .collect();

    format!(
        "<h2 style=\"font-family:sans-serif\">New contact form submission</h2>\
         <table style=\"font-family:sans-serif;border-collapse:collapse\">{rows}</table>"
    )
}

pub fn notification_email(settings: &MailSettings, submission: &ContactSubmission) -> OutgoingEmail {
    let fields = submission.display_fields();
    let name = submission.name().trim();
    let subject = match submission.subject().trim() {
        "" => format!("New contact form submission from {name}"),
        given => format!("[{}] {given}", settings.site_name),
    };
    let reply_to = Some(submission.email().trim())
        .filter(|e| !e.is_empty())
        .map(str::to_string);

    OutgoingEmail {
        from: settings.sender.clone(),
        to: settings.recipient.clone(),
        reply_to,
        subject,
        text: notification_text(&fields),
        html: Some(notification_html(&fields)),
    }
}

pub fn thank_you_html(name: &str, site_name: &str) -> String {
    let name = escape_html(name);
    let site_name = escape_html(site_name);
    format!(
        r#"<!DOCTYPE html>
<html>
  <body style="margin:0;padding:0;background:#f4f4f7;font-family:Helvetica,Arial,sans-serif;color:#333">
    <table width="100%" cellpadding="0" cellspacing="0" style="padding:32px 0">
      <tr>
        <td align="center">
          <table width="600" cellpadding="0" cellspacing="0" style="background:#ffffff;border-radius:8px;padding:32px">
            <tr><td><h1 style="margin:0 0 16px;font-size:22px">Thank you for reaching out, {name}!</h1></td></tr>
            <tr><td style="font-size:15px;line-height:1.6">
              <p>We have received your message and a member of our team will get back to you within one to two business days.</p>
              <p>In the meantime, feel free to reply to this email if you have anything to add.</p>
              <p>Best regards,<br>{site_name}</p>
            </td></tr>
          </table>
        </td>
      </tr>
    </table>
  </body>
</html>"#
    )
}

pub fn thank_you_text(name: &str, site_name: &str) -> String {
    format!(
        "Thank you for reaching out, {name}!\n\n\
         We have received your message and a member of our team will get back to you \
         within one to two business days.\n\n\
         Best regards,\n{site_name}\n"
    )
}

// None when the submitter left no address to write back to
pub fn thank_you_email(settings: &MailSettings, submission: &ContactSubmission) -> Option<OutgoingEmail> {
    let to = submission.email().trim();
    if to.is_empty() {
        return None;
    }
    let name = submission.name().trim();

    Some(OutgoingEmail {
        from: settings.sender.clone(),
        to: to.to_string(),
        reply_to: Some(settings.recipient.clone()),
        subject: format!("Thank you for contacting {}", settings.site_name),
        text: thank_you_text(name, &settings.site_name),
        html: Some(thank_you_html(name, &settings.site_name)),
    })
}
