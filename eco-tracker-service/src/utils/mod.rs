pub mod json;
pub mod object_id;

pub use json::JsonBody;
pub use object_id::parse_object_id;
