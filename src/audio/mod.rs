//! # Audio Module
//!
//! Countdown clips and their playback.
//!
//! ### [`catalog`] - Audio Catalog
//! - Maps a countdown duration to `{duration}to0.{ext}` in the audio directory
//! - Reports missing clips at startup
//!
//! ### [`controller`] - Playback Controller
//! - One player per guild, `Idle` or `Playing`
//! - Stops the previous clip before starting the next one
//! - Notifies a single subscriber when a clip finishes on its own

pub mod catalog;
pub mod controller;
