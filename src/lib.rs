//! A keystroke-driven command palette.
//!
//! A single query line resolves into an ordered list of candidates: installed applications, system commands, glyphs
//! from the emoji and special characters pickers, clipboard history, snippets, calculator results, web searches and
//! translations. Activating a candidate performs its effect through the capability gateway.
//!
//! The core is the [`engine::Palette`], which is pure: every input returns the [`engine::Request`]s the host must
//! perform, and their outcomes are fed back as [`engine::Completion`]s.

#![forbid(unsafe_code)]

pub mod app;
pub mod cli;
pub mod component;
pub mod config;
pub mod engine;
pub mod errors;
pub mod gateway;
pub mod logging;
pub mod model;
pub mod service;
pub mod storage;
pub mod tui;
