pub mod channel;
pub mod referral;
pub mod user;
