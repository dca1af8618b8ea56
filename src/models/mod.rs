//! Data models module
//!
//! This module contains all data structures used throughout the dashboard

pub mod member;
pub mod account;
pub mod application;
pub mod finance;
pub mod kas;
pub mod event;
pub mod attendance;
pub mod poll;
pub mod payment;

// Re-export commonly used models
pub use member::{Member, MemberProfile, Rt, EducationStatus, EducationLevel, CreateMemberRequest, UpdateMemberRequest};
pub use account::{UserAccount, Session, Role, AccountStatus, CreateAccountRequest};
pub use application::{AccountApplication, ApplicationStatus, ApplicationForm, DuplicateCheck};
pub use finance::{FinanceTransaction, TransactionType, CreateTransactionRequest, UpdateTransactionRequest};
pub use kas::{KasPayment, KasStatus, KasEntry, MonthSummary};
pub use event::{Event, EventType, CreateEventRequest};
pub use attendance::{AttendanceEvent, AttendanceCheckin, CreateAttendanceEventRequest, UpdateAttendanceEventRequest, CreateCheckinRequest};
pub use poll::{Poll, PollKind, QuestionType, ResultVisibility, PollStatus, PollDraft, PollOption, OptionInput, PollVote, VoterDetail};
pub use payment::{PaymentItem, PaymentRecord, PaymentType, PaymentStatus, CreatePaymentItemRequest, UpdatePaymentItemRequest};
