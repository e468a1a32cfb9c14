//! Core domain types for askglean question batches.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Expected CSV header row, in column order.
pub const CSV_HEADERS: [&str; 6] = [
    "qid",
    "question",
    "answer",
    "research",
    "citations",
    "datetime",
];

/// Delimiter joining citation/research lists inside a single CSV field.
/// The `csv` writer quotes embedded newlines, so joined values survive a
/// write/read round trip.
pub const LIST_DELIMITER: &str = "\n";

/// Timestamp format written into the `datetime` column.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ---------------------------------------------------------------------------
// QuestionRecord
// ---------------------------------------------------------------------------

/// One row of the input/output CSV: a question and its (possibly empty)
/// generated answer artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    /// Opaque row identifier. Unique per file by convention, not enforced.
    pub qid: String,
    /// The question text sent to the API.
    pub question: String,
    /// Generated answer text. Empty until processed.
    #[serde(default)]
    pub answer: String,
    /// Newline-joined research URLs. Empty until processed.
    #[serde(default)]
    pub research: String,
    /// Newline-joined citation URLs. Empty until processed.
    #[serde(default)]
    pub citations: String,
    /// Local timestamp of when the answer fields were populated.
    #[serde(default)]
    pub datetime: String,
}

impl QuestionRecord {
    /// A fresh record with only `qid` and `question` set.
    pub fn new(qid: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            qid: qid.into(),
            question: question.into(),
            answer: String::new(),
            research: String::new(),
            citations: String::new(),
            datetime: String::new(),
        }
    }

    /// Whether the question field is blank. Blank rows are kept in the
    /// output but never sent to the API.
    pub fn question_is_empty(&self) -> bool {
        self.question.trim().is_empty()
    }

    /// Whether the row already carries an answer from a previous run.
    pub fn has_answer(&self) -> bool {
        !self.answer.is_empty()
    }

    /// Copy a successful API response into the record.
    ///
    /// `datetime` is stamped only when the response contained answer text;
    /// citations and research are copied independently.
    pub fn apply_answer(&mut self, response: &AnswerResponse, at: DateTime<Local>) {
        if let Some(answer) = &response.answer {
            self.answer = answer.clone();
            self.datetime = at.format(DATETIME_FORMAT).to_string();
        }
        if !response.citations.is_empty() {
            self.citations = response.citations.join(LIST_DELIMITER);
        }
        if !response.research.is_empty() {
            self.research = response.research.join(LIST_DELIMITER);
        }
    }

    /// The citation list split back out of the CSV field.
    pub fn citation_list(&self) -> Vec<&str> {
        if self.citations.is_empty() {
            Vec::new()
        } else {
            self.citations.split(LIST_DELIMITER).collect()
        }
    }
}

// ---------------------------------------------------------------------------
// AnswerResponse
// ---------------------------------------------------------------------------

/// Parsed result of one chat API call. Copied into a [`QuestionRecord`]
/// immediately, never persisted on its own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerResponse {
    /// Generated answer text, if the response contained one.
    pub answer: Option<String>,
    /// URLs of documents the service read while researching.
    pub research: Vec<String>,
    /// URLs the service cites as sources for the answer.
    pub citations: Vec<String>,
}
