//! HTTP fetching of guidebook pages.
//!
//! This crate provides:
//! - [`Fetcher`] — a shared client with global and per-host request caps
//! - [`Fetcher::fetch_page`] — single-page fetch that propagates failures
//! - [`Fetcher::fetch_lesson`] — fetch + extract one lesson into a [`LessonOutcome`]
//!
//! [`LessonOutcome`]: guidebook_shared::LessonOutcome

pub mod engine;

pub use engine::Fetcher;
