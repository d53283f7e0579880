//! Command implementations

pub(crate) mod check;
pub(crate) mod common;
pub(crate) mod down;
pub(crate) mod init;
pub(crate) mod status;
pub(crate) mod truncate;
pub(crate) mod up;
