//! gamereviews - game reviews and release listings scraped from 3DJuegos.
//!
//! The [`scrapers`] layer fetches and parses the site; [`server`] exposes it
//! as a small JSON API and [`cli`] as one-shot commands.

pub mod cli;
pub mod config;
pub mod models;
pub mod scrapers;
pub mod server;
