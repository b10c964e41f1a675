
pub use event_log::{ClientLog, ServerLog};
pub use session::{TestClient, TestSession};
