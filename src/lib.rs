//! codegather: combine a project's files into one context file.

pub mod app;
