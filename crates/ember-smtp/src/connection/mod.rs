//! Name resolution and transport setup.

pub mod dns;
mod stream;

pub use dns::{Resolver, SystemResolver, resolve_endpoint};
pub use stream::{Connector, NetConnector, SmtpStream, TransportMode};
