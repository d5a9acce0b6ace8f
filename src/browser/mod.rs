pub mod dom;
pub mod session;
