/// Seat selection logic shared by the draw path.
pub mod allocator;
/// OpenAPI documentation generation.
pub mod documentation;
/// Draw orchestration: allocation, recording, and the countdown broadcast.
pub mod draw_service;
/// Health check service.
pub mod health_service;
/// Forced assignment management, per session and global.
pub mod predefined_service;
/// Session creation and lookup.
pub mod session_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
/// Storage connection supervision with reconnect backoff.
pub mod storage_supervisor;
