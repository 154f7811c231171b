//! # UI Module
//!
//! Discord components shown to users. [`buttons`] builds the countdown menu.

pub mod buttons;
