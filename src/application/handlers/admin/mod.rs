//! Operator maintenance commands.
//!
//! Both rewrite the log under its exclusive maintenance lock, so ordinary
//! appends wait for them to finish.

mod delete_all_data;
mod errors;
mod remove_participant;

pub use delete_all_data::{DeleteAllDataCommand, DeleteAllDataHandler};
pub use errors::AdminError;
pub use remove_participant::{
    RemoveParticipantCommand, RemoveParticipantHandler, RemoveParticipantResult,
};
