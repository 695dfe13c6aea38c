mod record;

pub use record::{load_model, save_model};
