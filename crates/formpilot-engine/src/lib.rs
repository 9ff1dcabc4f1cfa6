pub mod config;
pub mod dispatch;
pub mod document;
pub mod engine;
pub mod fill;
pub mod memory;
pub mod notify;
pub mod observe;
pub mod options;
pub mod profile;
pub mod rehearsal;
pub mod typist;
pub mod wait;

pub use formpilot_common::error;
pub use formpilot_common::error_mapping;
pub use formpilot_common::protocol;
