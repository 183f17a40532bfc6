//! SEO Scribe - streaming article workflow over a local language model
//!
//! This crate drafts, humanizes and tidies articles against an Ollama
//! backend, and runs standalone SEO tasks: keyword lists, meta tags, page
//! analysis and chat.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
