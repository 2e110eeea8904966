mod gate;

pub use gate::{bearer_token, require_bearer};
