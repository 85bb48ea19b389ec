//! Parallels Config
//!
//! Process configuration for the parallels service. Every setting has a
//! default; values can come from a JSON file and are then overridden by
//! environment variables:
//!
//! | variable | setting | default |
//! |---|---|---|
//! | `HOST` | `server.host` | `0.0.0.0` |
//! | `PORT` | `server.port` | `8080` |
//! | `READ_TIMEOUT` | `server.read_timeout` | `30` |
//! | `SHUTDOWN_TIMEOUT` | `server.shutdown_timeout` | `30` |
//! | `LOG_LEVEL` | `logger.level` | `info` |
//! | `LOG_FORMAT` | `logger.format` | `text` |
//! | `DEFAULT_TIMEOUT` | `dispatch.default_timeout` | `60` |
//! | `DEADLINE_MARGIN` | `dispatch.deadline_margin` | `5` |
//! | `USER_AGENT` | `dispatch.user_agent` | `parallels/<version>` |

mod config;
mod error;
mod loader;

pub use config::{Config, DispatchConfig, LogFormat, LogLevel, LoggerConfig, ServerConfig};
pub use error::ConfigError;
