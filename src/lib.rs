//! Pipetask - configuration schemas derived from task connections
//!
//! A pipeline task declares the datasets it reads and writes in a connections
//! class. Declaring its config class with `task::ConfigDeclaration` generates
//! a nested `connections` config with one overridable name per connection,
//! which `pipeline` uses to order tasks by their data dependencies.

pub mod config;
pub mod connections;
pub mod declarations;
pub mod logging;
pub mod pipeline;
pub mod task;
