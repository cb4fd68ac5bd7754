pub mod credentials;
pub mod parser;
pub mod resolve;
pub mod schema;
pub mod types;

pub use types::*;
pub use parser::{parse_check_names, parse_config, parse_config_str};
pub use resolve::{resolve, ConfigOverrides, ResolvedConfig};
