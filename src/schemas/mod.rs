//! Wire schemas for the OpenAI-compatible completion service
//!
//! Requests are built from typed structs; responses are parsed leniently, since providers behind
//! OpenAI-compatible APIs disagree on which optional fields they send.

pub mod chat_completions;
