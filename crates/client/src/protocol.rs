//! Wire types for the Glean chat endpoint.
//!
//! The request is a single-turn, non-streaming user message. The response
//! is collapsed into answer text, research URLs, and citation URLs.

use serde::{Deserialize, Serialize};

use askglean_shared::AnswerResponse;

/// Fragment text marker that switches a message into reading context.
/// Structured results from then on are research documents.
const READING_MARKER: &str = "**Reading:**";

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Request body sent to the chat endpoint.
#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest {
    messages: Vec<RequestMessage>,
    stream: bool,
    #[serde(rename = "applicationId", skip_serializing_if = "Option::is_none")]
    application_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct RequestMessage {
    author: &'static str,
    #[serde(rename = "messageType")]
    message_type: &'static str,
    fragments: Vec<RequestFragment>,
}

#[derive(Debug, Serialize)]
struct RequestFragment {
    text: String,
}

impl ChatRequest {
    /// A single-turn, non-streaming user question.
    pub(crate) fn for_question(question: &str, app_id: Option<&str>) -> Self {
        Self {
            messages: vec![RequestMessage {
                author: "USER",
                message_type: "CONTENT",
                fragments: vec![RequestFragment {
                    text: question.to_string(),
                }],
            }],
            stream: false,
            application_id: app_id.map(String::from),
        }
    }
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// Response body received from the chat endpoint. Every field is optional;
/// anything missing parses as empty.
#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    #[serde(default)]
    messages: Vec<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    fragments: Vec<ResponseFragment>,
    #[serde(default)]
    citations: Vec<Citation>,
}

#[derive(Debug, Deserialize)]
struct ResponseFragment {
    #[serde(default)]
    text: Option<String>,
    #[serde(rename = "structuredResults", default)]
    structured_results: Vec<StructuredResult>,
}

#[derive(Debug, Deserialize)]
struct StructuredResult {
    #[serde(default)]
    document: Option<DocumentRef>,
}

#[derive(Debug, Deserialize)]
struct Citation {
    #[serde(rename = "sourceDocument", default)]
    source_document: Option<DocumentRef>,
}

#[derive(Debug, Deserialize)]
struct DocumentRef {
    #[serde(default)]
    url: Option<String>,
}

impl ChatResponse {
    /// Collapse the response into answer text, research URLs, and citations.
    ///
    /// The answer is the last text fragment across all messages. Research
    /// URLs are structured results appearing once a fragment containing the
    /// reading marker has been seen within the same message. Citations are
    /// the source-document URLs attached to each message, in order.
    pub(crate) fn into_answer(self) -> AnswerResponse {
        let mut answer = None;
        let mut research = Vec::new();
        let mut citations = Vec::new();

        for message in self.messages {
            let mut reading_context = false;

            for fragment in message.fragments {
                if let Some(text) = fragment.text {
                    if text.contains(READING_MARKER) {
                        reading_context = true;
                    }
                    answer = Some(text);
                }
                if reading_context {
                    for result in fragment.structured_results {
                        if let Some(url) = result.document.and_then(|d| d.url) {
                            research.push(url);
                        }
                    }
                }
            }

            for citation in message.citations {
                if let Some(url) = citation.source_document.and_then(|d| d.url) {
                    citations.push(url);
                }
            }
        }

        AnswerResponse {
            answer,
            research,
            citations,
        }
    }
}
