#![forbid(unsafe_code)]

pub mod ancestry;
pub mod candidates;
pub mod draft;
pub mod layout;
pub mod lines;
pub mod member;
pub mod merge;
pub mod relation;
pub mod validate;
