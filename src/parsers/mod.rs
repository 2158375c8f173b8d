//! Parser modules for the languages the server understands

pub mod zenscript;
