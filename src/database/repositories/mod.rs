//! Database repositories module
//! 
//! This module contains all repository implementations for data access

pub mod member;
pub mod account;
pub mod application;
pub mod finance;
pub mod kas;
pub mod event;
pub mod attendance;
pub mod poll;
pub mod payment;

// Re-export repositories
pub use member::MemberRepository;
pub use account::AccountRepository;
pub use application::ApplicationRepository;
pub use finance::TransactionRepository;
pub use kas::KasRepository;
pub use event::EventRepository;
pub use attendance::{AttendanceEventRepository, CheckinRepository};
pub use poll::PollRepository;
pub use payment::PaymentRepository;
