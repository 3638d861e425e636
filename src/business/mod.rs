//! Business-intelligence agent and the external systems it connects to.
//!
//! A [`domain::BusinessSystemRegistry`] names every external system and how
//! to reach it: a URL for SSE, a command line for stdio. The
//! [`services::BusinessIntelligenceAgent`] connects each system through an
//! MCP connector and keeps its tool collection in step with what is live.

pub mod domain;
pub mod prompt;
pub mod services;
