mod rest;

pub use rest::RobinhoodClient;
