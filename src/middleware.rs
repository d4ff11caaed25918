pub mod client_ip;
pub mod i18n;
