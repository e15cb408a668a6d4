//! mdimg core: localize images referenced from markdown documents.

pub mod cache;
pub mod config;
pub mod driver;
pub mod fetch;
pub mod logging;
pub mod reference;
pub mod rewriter;
pub mod url_model;
