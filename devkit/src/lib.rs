/*!
# Solar DevKit

Test support for the dashboard client:
- `StubBackend`: an axum server on an ephemeral port that records every
  request and answers with canned JSON, optional latency and status
- `fixtures`: JSON builders shaped like the real backend's answers
- `TestHarness`: waits and assertions over the recorded traffic
*/

pub mod fixtures;
pub mod stub_backend;
pub mod test_utils;

pub use stub_backend::{RecordedRequest, StubBackend, StubReply};
pub use test_utils::TestHarness;
