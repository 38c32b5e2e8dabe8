//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (identifiers, timestamps, validation errors)
//! - `dispatch` - Request, routing and handler-result vocabulary
//! - `assistant` - Remote run statuses, thread messages and poll state
//! - `account` - Local user accounts

pub mod account;
pub mod assistant;
pub mod dispatch;
pub mod foundation;
