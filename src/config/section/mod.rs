//! Configuration section definitions.
//!
//! Each module corresponds to a section in `tocprune.toml`:
//!
//! | Module   | TOML Section | Purpose                                   |
//! |----------|--------------|-------------------------------------------|
//! | `build`  | `[build]`    | Input/output directories, site URL        |
//! | `filter` | `[filter]`   | Marker class, TOC selector, hidden class  |

mod build;
mod filter;

pub use build::BuildConfig;
pub use filter::FilterConfig;
