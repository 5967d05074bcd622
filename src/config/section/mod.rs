//! Configuration section definitions.
//!
//! Each module corresponds to a section in `compass.toml`:
//!
//! | Module       | TOML Section     | Purpose                               |
//! |--------------|------------------|---------------------------------------|
//! | `compass`    | `[compass]`      | Compiler options, cache, timeout      |
//! | `middleware` | `[middleware]`   | Intercepted extension, failure policy |
//! | `serve`      | `[serve]`        | Development server                    |

mod compass;
mod middleware;
mod serve;

pub use compass::{CompassOptions, DEFAULT_COMMAND, OptionsPatch};
pub use middleware::{FailurePolicy, MiddlewareConfig};
pub use serve::ServeConfig;
