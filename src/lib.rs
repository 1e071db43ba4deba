//! telecast — 24/7 TV channel schedule compiler.
//!
//! Turns per-channel slot configuration plus a media catalog into a
//! gapless daily block schedule with ad breaks, then compiles it into a
//! concat playlist for the stream publisher. The CLI consumes this crate.

pub mod ad_break;
pub mod catalog;
pub mod config;
pub mod epg;
pub mod error;
pub mod generator;
pub mod inventory;
pub mod m3u;
pub mod pipeline;
pub mod playlist;
pub mod publisher;
pub mod schedule;
pub mod timeutil;
