pub mod email_service;
pub mod leadership_transfer;
pub mod membership;
pub mod notification_service;
