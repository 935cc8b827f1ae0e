// Domain-layer modules and shared errors/models
pub mod classifier {
    pub use crate::classifier::*;
}

pub mod email_format {
    pub use crate::email_format::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod qualifier {
    pub use crate::qualifier::*;
}

pub mod reputation {
    pub use crate::reputation::*;
}

pub mod errors {
    pub use crate::errors::*;
}
