//! Storage layout strategies
//!
//! Decides where in the store a backup set lives.
//!
//! - `sanitize`: turns identity strings into safe path segments
//! - `strategy`: the closed set of layout policies
//! - `identity`: username/hostname lookup behind a trait
//! - `generator`: derives the base path for a strategy
//!
//! # Example
//!
//! ```rust,ignore
//! use keystash::layout::{PathGenerator, Strategy, SystemIdentity};
//!
//! let generator = PathGenerator::new(Strategy::Universal).with_namespace("personal");
//! let base_path = generator.generate_base_path(&SystemIdentity::new())?;
//! assert_eq!(base_path, "shared/personal");
//! ```

pub mod generator;
pub mod identity;
pub mod sanitize;
pub mod strategy;

pub use generator::{describe_strategy_name, PathGenerator};
pub use identity::{IdentityProvider, StaticIdentity, SystemIdentity};
pub use sanitize::sanitize_component;
pub use strategy::Strategy;
