//! Job board engine: the job catalog, the seeker and employer lifecycles that keep
//! postings, applications, and bookmarks consistent, platform moderation, and the
//! REST surface that exposes them.

pub mod access;
pub mod board;
pub mod config;
pub mod error;
pub mod telemetry;
