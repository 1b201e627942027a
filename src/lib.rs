//! # pitchdesk
//!
//! A sales collateral generator. pitchdesk reads the office documents a
//! sales team already has (product sheets, competitor decks, customer
//! profiles, catalogs), extracts their text locally, and drives Claude to
//! draft analyses, pitch scripts, presentation outlines, product
//! recommendations, and outreach emails. Sensitive source files can be
//! encrypted at rest with a password-derived key.
//!
//! ## Workspace layout
//!
//! ```text
//! data/
//!   product/ competitor/ customer/ catalog/   source documents
//!   encrypted/                                .pdv containers
//! output/
//!   extracted/                                structured JSON sidecars
//!   analysis/ pitches/ presentations/
//!   recommendations/ emails/                  generated reports
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! pd init                          # create the workspace layout
//! pd files scan                    # inventory and classify documents
//! pd files organize --apply        # move files into category directories
//! pd analysis                      # compare newest product vs competitor
//! pd pitch --tone consultative     # draft a pitch script
//! pd vault encrypt data/customer   # encrypt a directory in place
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`extract`] | xlsx/docx/pptx/pdf text extraction |
//! | [`library`] | Document scanning and category management |
//! | [`prompts`] | Prompt templates for each generation task |
//! | [`assistant`] | Anthropic Messages API client |
//! | [`report`] | Report assembly and output writing |
//! | [`generate`] | End-to-end generation pipelines |
//! | [`vault`] | Password-based file encryption |

pub mod assistant;
pub mod config;
pub mod extract;
pub mod generate;
pub mod library;
pub mod prompts;
pub mod report;
pub mod vault;
