//! Ticket store layer: wire models, the [`TicketStore`] trait, the REST client,
//! and an in-process store used as an alternate backend and in tests.

mod client;
mod memory;
mod model;

pub use client::{TicketApiClient, TicketStore};
pub use memory::MemoryTicketStore;
pub use model::{
    Attachment, CreateMessageRequest, CreateTicketRequest, Ticket, TicketMessage, TicketStatus,
    TicketWithMessages,
};
