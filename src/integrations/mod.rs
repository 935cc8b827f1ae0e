//! External service integrations.

pub mod hunter_client {
    pub use crate::hunter_client::*;
}

pub mod openai_client {
    pub use crate::openai_client::*;
}

pub mod providers {
    pub use crate::providers::*;
}
