pub mod lead_service;
pub mod mail_service;
