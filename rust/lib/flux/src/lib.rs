//! Flux — the client state engine behind the DPAV admin.
//!
//! All client state lives in a flat, `/`-separated path namespace. Front-ends
//! only render what they read from it.
//!
//! - `get(path)` — read the value at a path (Arc clone)
//! - `emit(path, payload)` — route a request to the matching handler(s)
//! - `subscribe(pattern)` — observe state changes
//!
//! Patterns use MQTT-style wildcards: `perros/+` matches `perros/list` and
//! `perros/form`, `perros/#` matches everything under `perros/`, and `#`
//! matches every path.
//!
//! ```ignore
//! let flux = Flux::new();
//! flux.on("razas/load", |_, _, store| async move {
//!     store.set("razas/list", Vec::<String>::new());
//! });
//! flux.subscribe("razas/#", |path, _| println!("{path} changed"));
//! flux.emit("razas/load", ()).await;
//! ```

pub mod app;
pub mod router;
pub mod store;
pub mod topic;
pub mod value;

pub use app::Flux;
pub use router::{BoxFuture, Payload, Router};
pub use store::{ChangeHandler, StateStore};
pub use value::{StateValue, SubscriptionId};
