//! capburn - caption compiler and burn-in pipeline
//!
//! Turns timed text segments plus a visual style into SRT, WebVTT or ASS
//! markup, and drives ffmpeg to burn the styled captions into a video
//! inside an isolated per-job workspace.

pub mod cli;
pub mod config;
pub mod error;
pub mod media;
pub mod model;
pub mod render;
pub mod subtitle;
pub mod workflow;
