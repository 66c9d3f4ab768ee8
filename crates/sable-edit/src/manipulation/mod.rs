//! The edit protocol: plan a text patch, reparse, and migrate wrappers from
//! the old tree to the new one.

pub(crate) mod handlers;
pub(crate) mod insertion;
