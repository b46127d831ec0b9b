//! Value objects - immutable types that represent domain concepts

mod shortname;
mod snowflake;

pub use shortname::{validate_shortname, SHORTNAME_MAX_LEN, SHORTNAME_MIN_LEN};
pub use snowflake::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
