//! blitpix - block-glyph art for 16-color terminals
//!
//! Command-line front end for `blit-engine`: PNG loading, YAML
//! configuration and output files. This library exposes modules for
//! integration testing.

pub mod error;
pub mod models;
pub mod rendering;
pub mod services;
