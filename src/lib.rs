//! Study companion for pharmacy students.
//!
//! Turns a drug name, drug class, patient case or PDF document into a
//! schema-constrained request against a generative text model and returns
//! validated drug cards, quizzes, OTC recommendations or study materials.

pub mod ai;
pub mod app;
pub mod error;
pub mod gateway;
pub mod models;
pub mod prompts;
pub mod quiz;
pub mod schema;
pub mod validation;

pub use error::{Error, Result};
pub use gateway::{Gateway, GenerationInput, GenerationKind};
