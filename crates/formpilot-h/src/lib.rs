pub mod cdp;
pub mod document;
pub mod inject;
pub mod session;

pub use document::CdpDocument;
pub use session::{HeadlessSession, LaunchOptions, SessionError};
