/*!
# solar-sync

Client-side data plane of the solar plant dashboard:
- `ResourceSync`: gated, cancellable interval polling of one backend resource
- `TableView`: pagination and non-destructive search over the latest rows
- `Mutations` / `MutationModal`: sparse-payload writes and their modal state
- `ApiClient`: the backend's REST surface behind a single base URL
*/

pub mod api;
pub mod clock;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod fetcher;
pub mod gate;
pub mod logging;
pub mod models;
pub mod mutation;
pub mod resources;
pub mod routes;
pub mod rows;
pub mod scheduler;
pub mod session;
pub mod state;
pub mod table;
pub mod validation;

pub use api::{ApiClient, ApiReply, Endpoint, PathParams};
pub use config::{DashboardConfig, ScreenFamily, StalePolicy};
pub use dashboard::Dashboard;
pub use error::{ConfigError, SyncError, SyncResult, ValidationError};
pub use fetcher::{FetchOutcome, Fetcher};
pub use gate::{AuthGate, GateDecision};
pub use mutation::{MutationModal, MutationOutcome, Mutations, PatchBuilder};
pub use routes::Route;
pub use rows::Row;
pub use scheduler::{ResourceSync, Snapshot, StopReason, SyncState};
pub use session::{Identity, Role, Session, SessionHandle};
pub use state::Counters;
pub use table::{PageJump, TableView};
