//! DPAV admin panel logic.
//!
//! Everything the admin UI does, minus the rendering: form validation,
//! searchable lists, CRUD orchestration for dogs (`perros`) and breeds
//! (`razas`), login/registration, the stored session and transient notices.
//!
//! State lives in a [`dpav_flux::StateStore`]; the UI (or the CLI) sends
//! requests through [`Admin::flux`] and reads the paths in [`state`].
//!
//! ```ignore
//! let admin = Admin::new(AdminConfig::default(), Arc::new(MemoryVault::new()));
//! admin.flux.emit(LoginReq::PATH, LoginReq { email, password }).await;
//! admin.flux.emit("perros/load", LoadReq).await;
//! let dogs: ListState<DogRow> = admin.flux.get_as("perros/list").unwrap();
//! ```

pub mod auth;
pub mod entity;
pub mod filter;
pub mod form;
pub mod handlers;
pub mod notice;
pub mod orchestrator;
pub mod request;
pub mod schema;
pub mod session;
pub mod state;
pub mod validate;


pub use auth::AuthFlow;
pub use entity::{Entity, Fetched, Messages};
pub use filter::{DogRow, ListState, Searchable, Segment, highlight};
pub use form::{FormMode, FormState};
pub use handlers::{Admin, AdminConfig, DEFAULT_BASE_URL, register_entity, register_handlers};
pub use notice::{NOTICE_TTL, Notice, NoticeKind, Notifier};
pub use orchestrator::Orchestrator;
pub use session::{Guard, MemoryVault, Session, SessionError, SessionManager, SessionVault};
pub use state::{AuthState, Route};
pub use validate::validate;
