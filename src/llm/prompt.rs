//! Prompt templates for summary and feedback generation
//!
//! The text-generation collaborator accepts a template selector alongside the
//! content to embed. Templates form a closed set; adding one is a data change
//! here, never an ad-hoc prompt at a call site.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Template selector for text-generation requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PromptTemplate {
    /// First feedback round for a portfolio (no prior feedback exists)
    FirstFeedback,
    /// Follow-up feedback that builds on a previous round
    ContinuationFeedback,
    /// Recruiter-perspective feedback
    HrFeedback,
    /// Condense a repository README
    ReadmeSummary,
    /// Condense the crawled repository evidence
    RepoSummary,
    /// Condense extracted document text
    DocumentSummary,
    /// Compress an oversized combined narrative
    CombinedSummary,
}

impl PromptTemplate {
    /// Returns the wire-level selector string for this template
    pub fn selector(&self) -> &'static str {
        match self {
            PromptTemplate::FirstFeedback => "first-feedback",
            PromptTemplate::ContinuationFeedback => "continuation-feedback",
            PromptTemplate::HrFeedback => "hr-style-feedback",
            PromptTemplate::ReadmeSummary => "readme-summary",
            PromptTemplate::RepoSummary => "repo-summary",
            PromptTemplate::DocumentSummary => "document-summary",
            PromptTemplate::CombinedSummary => "combined-summary",
        }
    }
}

impl fmt::Display for PromptTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.selector())
    }
}

/// Builds full prompt text from a template and the content to embed
pub struct PromptBuilder;

impl PromptBuilder {
    /// Renders the prompt for the given template
    pub fn build(template: PromptTemplate, content: &str) -> String {
        match template {
            PromptTemplate::FirstFeedback => format!(
                "The following is a summary of a portfolio project a developer \
                 submitted to demonstrate real engineering experience. Write \
                 feedback based on the summary, following these rules.\n\n\
                 [Purpose]\n\
                 - Give concrete, practical advice the author can act on\n\
                 - Assess technical completeness, design coherence, and clarity \
                 of documentation, and point out gaps\n\n\
                 [Items to cover]\n\
                 1. Understanding of the project's design and overview\n\
                 2. Whether the main features appear fully implemented\n\
                 3. Suitability of the chosen tech stack\n\
                 4. Quality of the documentation\n\
                 5. Areas to improve or extend\n\
                 6. Overall impression and suggestions\n\n\
                 [Style]\n\
                 - Number each item\n\
                 - Name both strengths and weaknesses\n\
                 - Prefer concrete statements over abstractions\n\
                 - No pleasantries, do not open with the word \"feedback\"\n\n\
                 Project summary:\n{content}\n"
            ),
            PromptTemplate::ContinuationFeedback => format!(
                "The project has evolved since the previous feedback round. The \
                 content below contains the project summary, a new progress \
                 note, and the previous feedback. Re-evaluate against the items \
                 below, following the style rules.\n\n\
                 [Items to cover]\n\
                 1. Whether the note content fits the project's direction\n\
                 2. How well the new note is reflected and what else needs work\n\
                 3. Whether the previous feedback was addressed\n\
                 4. Overall assessment of the project\n\n\
                 [Style]\n\
                 - Number each item (important)\n\
                 - Keep it under 300 words, no word-count notes\n\
                 - Include practical, specific advice\n\
                 - Call out missing or thin content explicitly\n\
                 - No pleasantries, do not open with the word \"feedback\"\n\n\
                 Content:\n{content}\n"
            ),
            PromptTemplate::HrFeedback => format!(
                "The following contains a candidate's portfolio description, \
                 notes, and portfolio summary. From a recruiter's perspective, \
                 write plain-prose feedback of roughly 500 words covering:\n\
                 1. Notable strengths and how well they are communicated\n\
                 2. Role fit and practical relevance\n\
                 3. Areas needing improvement (content, phrasing, structure)\n\
                 4. Impression of growth potential and learning attitude\n\
                 5. Documentation and communication gaps\n\
                 6. Overall evaluation and recommendation\n\n\
                 Content:\n{content}\n"
            ),
            PromptTemplate::ReadmeSummary => format!(
                "Summarize the following project README. Keep the project's \
                 purpose, main features, and how to run it. Drop badges, \
                 boilerplate, and installation minutiae.\n\nREADME:\n{content}\n"
            ),
            PromptTemplate::RepoSummary => format!(
                "The following is raw evidence crawled from a source \
                 repository: directory tree, language breakdown, extracted code \
                 signatures, README summary, recent commits, and CI/CD files. \
                 Write a concise technical summary of what the project is and \
                 how it is built.\n\nEvidence:\n{content}\n"
            ),
            PromptTemplate::DocumentSummary => format!(
                "Summarize the following document text extracted from a \
                 portfolio submission. Preserve concrete claims about scope, \
                 responsibilities, and results.\n\nDocuments:\n{content}\n"
            ),
            PromptTemplate::CombinedSummary => format!(
                "The text below combines a project description, a repository \
                 summary, and a document summary, and is too long for \
                 downstream use. Compress it into a single coherent narrative, \
                 keeping every concrete technical fact.\n\nText:\n{content}\n"
            ),
        }
    }
}
