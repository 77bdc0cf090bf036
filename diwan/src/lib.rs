//! # Diwan
//!
//! A definition-driven dependency injection container.
//!
//! Entries are described by definitions (values, references, objects,
//! factories, arrays, environment variables, decorators, string templates
//! and service locators) stacked in layers. Classes the container can build
//! are described with [`ClassInfo`](diwan_container::registry::ClassInfo)
//! and may be autowired from their parameter types. Definitions that do not
//! capture closures can be compiled ahead of time.
//!
//! ```rust
//! use diwan::prelude::*;
//!
//! let container = Container::builder()
//!     .register_class(ClassInfo::new("Clock"))
//!     .add_definitions([("greeting", string("hello from {app.name}")), ("app.name", value("diwan"))])
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(container.get("greeting").unwrap(), Value::from("hello from diwan"));
//! assert!(container.has("Clock"));
//! ```

pub use diwan_container::*;
pub use diwan_support::{logging, rendering};

pub mod prelude {
    pub use diwan_container::prelude::*;
    pub use diwan_support::logging::init_tracing;
}
