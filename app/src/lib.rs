//! Ticket printing front end: configuration, font files, ticket
//! composition and the device-driver stand-ins.

pub mod bootstrap;
pub mod config;
pub mod fonts;
pub mod sinks;
pub mod ticket;

pub use config::AppConfig;
pub use fonts::FontDirectory;
pub use ticket::{Ticket, TicketComposer, TicketRequest, print_ticket};
