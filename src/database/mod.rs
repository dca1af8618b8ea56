//! Database module
//!
//! This module handles database connections, repositories and the change feed

pub mod connection;
pub mod repositories;
pub mod service;
pub mod realtime;

// Re-export commonly used database components
pub use connection::{DatabasePool, create_pool, run_migrations, health_check};
pub use repositories::{
    MemberRepository, AccountRepository, ApplicationRepository, TransactionRepository, KasRepository,
    EventRepository, AttendanceEventRepository, CheckinRepository, PollRepository, PaymentRepository,
};
pub use service::DatabaseService;
pub use realtime::{ChangeFeed, TableChange, Table, ChangeOp};
