//! media-gen library crate.
//!
//! Shared plumbing for the three cloud media generation wrappers:
//! `tts-generate` (Google Cloud Text-to-Speech), `video-generate` (fal.ai)
//! and `avatar-generate` (HeyGen). Each binary reads a request from stdin
//! JSON or positional arguments, calls the vendor API, and prints a single
//! JSON result object on stdout.

pub mod config;
pub mod defaults;
pub mod download;
pub mod error;
pub mod fal;
pub mod heygen;
pub mod input;
pub mod media_type;
pub mod outcome;
pub mod poll;
pub mod tts;
