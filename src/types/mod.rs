// ABOUTME: Validated domain types shared across modules.
// ABOUTME: Resource names are checked once at the edge and trusted afterwards.

mod resource_name;

pub use resource_name::{ResourceName, ResourceNameError};
