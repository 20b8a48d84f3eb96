//! Integration suite: drives the public API end to end.

mod fixtures;
mod scenarios;
mod store_flow;
mod persistence;
