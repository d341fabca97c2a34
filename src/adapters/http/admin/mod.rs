//! HTTP adapter for operator maintenance.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    DeleteAllDataRequest, DeleteAllDataResponse, RemoveParticipantRequest,
    RemoveParticipantResponse,
};
pub use handlers::AdminHandlers;
pub use routes::admin_routes;
