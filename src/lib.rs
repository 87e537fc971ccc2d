//! The library code for the `ravensite` static site generator. A build is
//! driven by file changes and flows through three stages:
//!
//! 1. The content store ([`crate::content`]) parses changed content files
//!    ([`crate::item`]) and works out which logical pages they affect, as a
//!    set of page ids.
//! 2. The page store ([`crate::page`]) rebuilds the routes of exactly those
//!    pages, paginating collections ([`crate::paginate`]), and diffs them
//!    against the routes each page had before.
//! 3. The writer ([`crate::write`]) renders updated routes through the
//!    markdown ([`crate::markdown`]) and template ([`crate::template`])
//!    pipelines and deletes removed ones.
//!
//! A full build is the same cycle run over every content file. A template
//! edit skips the first two stages: the tracker ([`crate::tracker`]) maps
//! the edited files to the route kinds they affect, and every current route
//! of those kinds is re-rendered.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod content;
pub mod feed;
pub mod item;
pub mod markdown;
pub mod page;
pub mod paginate;
pub mod route;
pub mod tag;
pub mod template;
pub mod tracker;
pub mod value;
pub mod write;
