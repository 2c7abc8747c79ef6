//! OKR Board - objectives, key results and their blockers
//!
//! The core of an OKR dashboard: an immutable-snapshot store driven by typed
//! actions, derived views (progress, RAG status, agenda, dependency board),
//! AI-suggested workflows through Google Gemini, and paginated logbook export.

pub mod cli;
pub mod config;
pub mod okr;
pub mod provider;
pub mod workflow;
