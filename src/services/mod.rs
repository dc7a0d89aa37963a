pub mod reconcile_service;
pub mod send_service;
