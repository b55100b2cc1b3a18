//! Business logic of the board: the posting pipeline and the moderation
//! command interpreter. Storage and identity arrive through the ports in
//! `domains`.

pub mod accounts;
pub mod clock;
pub mod command;
pub mod gate;
pub mod posts;
pub mod roles;

pub use command::{CommandOutcome, CommandService};
pub use posts::{PostService, PostSubmission};
