//! InternSight Processing Library
//!
//! Best-effort photo size reduction for the report upload. Photos above the
//! configured ceiling are pushed through a fixed quality/width ladder; if no
//! step fits, the original is uploaded unmodified.

pub mod photo;

pub use photo::{compress_to_ceiling, content_type_for_extension, prepare_photo, PreparedPhoto};
