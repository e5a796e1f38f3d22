//! Chat service plumbing.
//!
//! [`traits::ChatGateway`] is the seam between the runtime and a concrete
//! chat service; [`discord::DiscordAdapter`] is the shipped implementation.

pub mod discord;
pub mod traits;

pub use discord::DiscordAdapter;
pub use traits::{ChatGateway, GatewayEvent, ReplySink};
