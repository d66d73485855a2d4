//! Service layer

pub mod avatar;
