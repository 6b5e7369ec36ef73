//! Maps provider responses into the shared error taxonomy.

use serde::de::DeserializeOwned;

use crate::{Error, Result, clog::ChannelLog, http::HttpResponse};

/// Classify by HTTP status alone.
///
/// 5xx is a connection failure (retryable), any other non-2xx is a rejected
/// request. Both are written to the channel log.
pub fn check_status(response: &HttpResponse, clog: &mut ChannelLog) -> Result<()> {
    let err = match response.status {
        200..=299 => return Ok(()),
        500..=599 => Error::connection(format!("provider returned status {}", response.status)),
        status => Error::RequestRejected { status },
    };
    clog.error(err.code(), err.to_string());
    Err(err)
}

/// Decoded acknowledgement body of a provider that reports acceptance
/// through a status field plus a message id.
pub trait ProviderAck {
    fn status(&self) -> &str;
    fn external_id(&self) -> Option<&str>;
    fn description(&self) -> Option<&str>;
}

/// Acceptance rules for one provider.
#[derive(Debug, Clone, Copy)]
pub struct AckPolicy {
    /// Human-readable provider name used in diagnostics.
    pub provider: &'static str,
    /// Status values meaning the provider took the message.
    pub accepted: &'static [&'static str],
    /// Log code used when the provider explains a refusal.
    pub error_code: &'static str,
}

/// Full classification: status, then body decoding, then acceptance.
///
/// Returns the provider's external id on acceptance.
pub fn classify_ack<A>(
    response: &HttpResponse,
    policy: &AckPolicy,
    clog: &mut ChannelLog,
) -> Result<String>
where
    A: ProviderAck + DeserializeOwned,
{
    check_status(response, clog)?;

    let ack: A = match serde_json::from_slice(&response.body) {
        Ok(ack) => ack,
        Err(e) => {
            clog.error(
                "response_unparseable",
                format!("Unable to parse response body from {}", policy.provider),
            );
            return Err(Error::unparseable(e));
        },
    };

    let external_id = ack.external_id().map(str::trim).filter(|id| !id.is_empty());
    if policy.accepted.iter().any(|s| *s == ack.status())
        && let Some(id) = external_id
    {
        return Ok(id.to_string());
    }

    let message = match ack.description().filter(|d| !d.is_empty()) {
        Some(description) => {
            let message = format!("{} API error: {description}", policy.provider);
            clog.error(policy.error_code, &message);
            message
        },
        None => {
            let message = format!("Message not accepted by {}", policy.provider);
            clog.error("message_not_accepted", &message);
            message
        },
    };
    Err(Error::not_accepted(message))
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            channel::Channel,
            clog::{ChannelLog, ChannelLogType},
        },
        rstest::rstest,
        serde::Deserialize,
    };

    #[derive(Deserialize)]
    struct Ack {
        #[serde(default)]
        status: String,
        #[serde(default, rename = "messageId")]
        message_id: Option<String>,
        #[serde(default)]
        description: Option<String>,
    }

    impl ProviderAck for Ack {
        fn status(&self) -> &str {
            &self.status
        }

        fn external_id(&self) -> Option<&str> {
            self.message_id.as_deref()
        }

        fn description(&self) -> Option<&str> {
            self.description.as_deref()
        }
    }

    const POLICY: AckPolicy = AckPolicy {
        provider: "Acme",
        accepted: &["ACCEPTED", "QUEUE"],
        error_code: "acme_error",
    };

    fn clog() -> ChannelLog {
        ChannelLog::new(ChannelLogType::MsgSend, &Channel::new("chan", "MG", "2020"))
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            body: body.as_bytes().to_vec(),
        }
    }

    #[rstest]
    #[case(r#"{"status":"ACCEPTED","messageId":"X"}"#, "X")]
    #[case(r#"{"status":"QUEUE","messageId":"q-1","description":"queued"}"#, "q-1")]
    fn accepted_statuses_yield_external_id(#[case] body: &str, #[case] expected: &str) {
        let mut clog = clog();
        let id = classify_ack::<Ack>(&response(200, body), &POLICY, &mut clog).unwrap();
        assert_eq!(id, expected);
        assert!(clog.errors().is_empty());
    }

    #[test]
    fn rejected_with_description_logs_it() {
        let mut clog = clog();
        let body = r#"{"status":"REJECTED","messageId":"","description":"Invalid recipient"}"#;
        let err = classify_ack::<Ack>(&response(200, body), &POLICY, &mut clog).unwrap_err();
        assert!(matches!(err, Error::NotAccepted { .. }));
        assert_eq!(clog.errors()[0].code, "acme_error");
        assert!(clog.errors()[0].message.contains("Invalid recipient"));
    }

    #[test]
    fn accepted_without_id_is_not_accepted() {
        let mut clog = clog();
        let err = classify_ack::<Ack>(
            &response(200, r#"{"status":"ACCEPTED","messageId":"  "}"#),
            &POLICY,
            &mut clog,
        )
        .unwrap_err();
        assert!(matches!(err, Error::NotAccepted { .. }));
        assert_eq!(clog.errors()[0].code, "message_not_accepted");
        assert_eq!(clog.errors()[0].message, "Message not accepted by Acme");
    }

    #[test]
    fn server_error_is_connection_failure() {
        let mut clog = clog();
        let err = classify_ack::<Ack>(&response(500, "Internal Server Error"), &POLICY, &mut clog)
            .unwrap_err();
        assert!(matches!(err, Error::ConnectionFailed { .. }));
        assert!(clog.has_error_code("connection_failed"));
    }

    #[rstest]
    #[case(400)]
    #[case(401)]
    #[case(404)]
    #[case(302)]
    fn other_statuses_are_rejected(#[case] status: u16) {
        let mut clog = clog();
        let err = classify_ack::<Ack>(&response(status, "{}"), &POLICY, &mut clog).unwrap_err();
        assert!(matches!(err, Error::RequestRejected { status: s } if s == status));
        assert!(!err.is_retryable());
    }

    #[test]
    fn non_json_success_is_unparseable() {
        let mut clog = clog();
        let err = classify_ack::<Ack>(&response(200, "invalid json response"), &POLICY, &mut clog)
            .unwrap_err();
        assert!(matches!(err, Error::ResponseUnparseable { .. }));
        assert_eq!(clog.errors()[0].code, "response_unparseable");
        assert_eq!(
            clog.errors()[0].message,
            "Unable to parse response body from Acme"
        );
    }
}
