use lettre::message::{Mailbox, MultiPart};

use newsroom_core::{NewsroomError, Result};

/// An outgoing email: subject, plain-text body, optional HTML alternative,
/// sender address and recipient list.
#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub subject: String,
    pub body: String,
    pub html_body: Option<String>,
    pub from: String,
    pub to: Vec<String>,
}

impl EmailMessage {
    pub fn new(
        subject: impl Into<String>,
        body: impl Into<String>,
        from: impl Into<String>,
        to: Vec<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
            html_body: None,
            from: from.into(),
            to,
        }
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html_body = Some(html.into());
        self
    }

    pub(crate) fn to_lettre(&self) -> Result<lettre::Message> {
        let from: Mailbox = self
            .from
            .parse()
            .map_err(|e| NewsroomError::Mail(format!("invalid sender '{}': {e}", self.from)))?;

        let mut builder = lettre::Message::builder()
            .from(from)
            .subject(self.subject.clone());
        for recipient in &self.to {
            let mailbox: Mailbox = recipient
                .parse()
                .map_err(|e| NewsroomError::Mail(format!("invalid recipient '{recipient}': {e}")))?;
            builder = builder.to(mailbox);
        }

        let message = match &self.html_body {
            Some(html) => builder.multipart(MultiPart::alternative_plain_html(
                self.body.clone(),
                html.clone(),
            )),
            None => builder.body(self.body.clone()),
        };
        message.map_err(|e| NewsroomError::Mail(format!("failed to build message: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_message_builds() {
        let message = EmailMessage::new(
            "Subject",
            "Body",
            "newsroom@example.com",
            vec!["reader@example.com".to_string()],
        );
        assert!(message.to_lettre().is_ok());
    }

    #[test]
    fn html_alternative_builds() {
        let message = EmailMessage::new(
            "Subject",
            "Body",
            "newsroom@example.com",
            vec!["reader@example.com".to_string()],
        )
        .with_html("<p>Body</p>");
        assert!(message.to_lettre().is_ok());
    }

    #[test]
    fn invalid_addresses_are_rejected() {
        let message = EmailMessage::new("s", "b", "not-an-address", vec![]);
        assert!(message.to_lettre().is_err());
    }
}
