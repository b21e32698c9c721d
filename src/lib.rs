//! Query Sherpa - Conversational Query Refinement
//!
//! Turns a vague request into a precise one through a short dialogue with a
//! chat model. The model asks clarifying questions until it emits an
//! `@FINAL_QUERY:` marker; the text after it becomes the refined query and
//! the conversation ends.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
