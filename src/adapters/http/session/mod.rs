//! HTTP adapter for the participant-facing session endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    AckResponse, ConsentRequest, CreateSessionRequest, CreateSessionResponse, ResumeBody,
    ResumeParams, ResumeResponse, SaveProgressRequest, SessionSummaryRequest, SnapshotResponse,
};
pub use handlers::SessionHandlers;
pub use routes::session_routes;
