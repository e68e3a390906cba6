pub mod channel_repo;
pub mod referral_repo;
pub mod user_repo;

pub use channel_repo::ChannelRepository;
pub use referral_repo::ReferralRepository;
pub use user_repo::UserRepository;
