//! tfhost-flatmap: nested state reconstruction
//!
//! Terraform state formats before v4 store every resource attribute as a flat
//! string-to-string map. Nested values are encoded in the keys themselves:
//!
//! ```text
//! network.#                  = "1"         list length
//! network.0.fixed_ip_v4      = "10.0.0.5"  list element 0, map key fixed_ip_v4
//! metadata.%                 = "2"         map size
//! metadata.role              = "web"
//! ```
//!
//! [`expand`] rebuilds one nested value from such a map. It has no knowledge of
//! resources, templates or inventories and can be used on its own.

pub mod expand;
pub mod value;

pub use expand::{FlatMap, expand, expand_all, top_level_keys};
pub use value::Expanded;
