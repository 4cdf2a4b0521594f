use crate::error::Result;
use crate::gmail_api::MailApi;
use crate::types::{BodyFormat, Message, MessageContent, MessagePart};
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::{DecodePaddingMode, Engine};

// Gmail is inconsistent about padding body data, so accept both forms
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

const MULTIPART_ALTERNATIVE: &str = "multipart/alternative";

/// Decodes URL-safe base64 body data into UTF-8 text.
pub fn decode_body(data: &str) -> Result<String> {
    let bytes = URL_SAFE_LENIENT.decode(data)?;
    Ok(String::from_utf8(bytes)?)
}

// First header named exactly "Subject", empty when missing
pub fn extract_subject(payload: &MessagePart) -> String {
    payload
        .headers
        .as_ref()
        .and_then(|headers| {
            headers
                .iter()
                .find(|h| h.name.as_deref() == Some("Subject"))
        })
        .and_then(|h| h.value.clone())
        .unwrap_or_default()
}

/// Picks the part whose body gets exported.
///
/// Only two layouts are understood: a flat `text/plain` message, and a
/// `multipart/alternative` whose direct children include one of the wanted
/// format (the last one when several match). Anything else, including
/// alternatives nested inside `multipart/mixed`, yields `None` and the
/// message is exported with an empty body.
pub fn select_body_part(payload: &MessagePart, format: BodyFormat) -> Option<&MessagePart> {
    match payload.mime_type.as_deref() {
        Some("text/plain") => Some(payload),
        Some(MULTIPART_ALTERNATIVE) => payload
            .parts
            .as_ref()?
            .iter()
            .rev()
            .find(|part| part.mime_type.as_deref() == Some(format.mime_type())),
        _ => None,
    }
}

/// Extracts subject and body from a fetched message. Malformed body data is
/// an error, a missing body is not.
pub fn decode_message(message: &Message, format: BodyFormat) -> Result<MessageContent> {
    let default_payload = MessagePart::default();
    let payload = message.payload.as_ref().unwrap_or(&default_payload);

    let body = match select_body_part(payload, format)
        .and_then(|part| part.body.as_ref())
        .and_then(|body| body.data.as_deref())
    {
        Some(data) => decode_body(data)?,
        None => String::new(),
    };

    Ok(MessageContent {
        subject: extract_subject(payload),
        mime_type: payload.mime_type.clone().unwrap_or_default(),
        body,
    })
}

pub async fn fetch_and_decode<A: MailApi + ?Sized>(
    api: &A,
    id: &str,
    format: BodyFormat,
) -> Result<MessageContent> {
    let message = api.get_message(id).await?;
    decode_message(&message, format)
}
