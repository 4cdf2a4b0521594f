use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct MessagesResponse {
    pub messages: Option<Vec<MessageRef>>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct MessageRef {
    pub id: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Message {
    pub id: Option<String>,
    pub payload: Option<MessagePart>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct MessagePart {
    #[serde(rename = "mimeType")]
    pub mime_type: Option<String>,
    pub headers: Option<Vec<Header>>,
    pub body: Option<MessagePartBody>,
    pub parts: Option<Vec<MessagePart>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Header {
    pub name: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MessagePartBody {
    pub data: Option<String>,
}

/// Which alternative of a multipart message gets exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum BodyFormat {
    #[default]
    Plain,
    Html,
}

impl BodyFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            BodyFormat::Plain => "text/plain",
            BodyFormat::Html => "text/html",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            BodyFormat::Plain => "txt",
            BodyFormat::Html => "html",
        }
    }
}

/// Subject and decoded body of a single fetched message.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageContent {
    pub subject: String,
    pub mime_type: String,
    pub body: String,
}
