//! Release and Module validation (components C3 and C4).
//!
//! [`release`] implements the per-release acceptance predicate (§4.3).
//! [`module`] orchestrates it over a repository's release set and resolves
//! the module-level accept/skip decision (§4.4).

pub mod module;
pub mod release;

pub use module::{validate_module, ModuleValidationConfig};
pub use release::{is_eligible_for_deep_inspection, rewrite_private_images, validate_release};
