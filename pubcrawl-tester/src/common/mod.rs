pub mod scenario;
pub mod util;

pub use util::{parse_seed_token, split_csv};
