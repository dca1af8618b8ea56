//! Cross-store flows through the in-memory layer

mod helpers;

use assert_matches::assert_matches;
use chrono::{NaiveDate, TimeZone, Utc};
use uuid::Uuid;
use helpers::*;
use prsdn_dashboard::config::Settings;
use prsdn_dashboard::i18n::I18n;
use prsdn_dashboard::middleware::{resolve, Access};
use prsdn_dashboard::models::attendance::AttendanceCheckin;
use prsdn_dashboard::models::finance::{FinanceTransaction, TransactionType};
use prsdn_dashboard::models::kas::{KasPayment, KasStatus};
use prsdn_dashboard::services::{validate_checkin, AttendanceSnapshot, CheckinSnapshot, KasSnapshot, LedgerSnapshot};
use prsdn_dashboard::utils::errors::{CheckinRejection, DashboardError};
use prsdn_dashboard::utils::helpers::MonthKey;

#[test]
fn test_checkin_accepted_once_per_member() {
    let event = attendance_event("K7MZ2Q", 1_700_000_030_000, true);
    let events = AttendanceSnapshot::new(vec![event.clone()]);
    let member = Uuid::new_v4();
    let now = 1_700_000_010_000;

    let mut checkins = CheckinSnapshot::default();
    let first = validate_checkin(events.get_event_by_id(event.id), checkins.has_checked_in(event.id, member), "K7MZ2Q", now);
    assert_eq!(first, Ok(()));

    checkins = CheckinSnapshot::new(vec![AttendanceCheckin {
        id: Uuid::new_v4(),
        event_id: event.id,
        member_id: member,
        checked_in_at: now,
        token_used: "K7MZ2Q".to_string(),
    }]);
    let second = validate_checkin(events.get_event_by_id(event.id), checkins.has_checked_in(event.id, member), "K7MZ2Q", now);
    assert_eq!(second, Err(CheckinRejection::AlreadyCheckedIn));

    let other = Uuid::new_v4();
    let late = validate_checkin(events.get_event_by_id(event.id), checkins.has_checked_in(event.id, other), "K7MZ2Q", 1_700_000_030_001);
    assert_eq!(late, Err(CheckinRejection::TokenExpired));
}

#[test]
fn test_rejections_render_in_indonesian() {
    let i18n = I18n::bundled(&Settings::default().i18n).unwrap();
    let event = attendance_event("ABCDEF", 0, false);

    let rejection: DashboardError = validate_checkin(Some(&event), false, "ABCDEF", 0).unwrap_err().into();
    assert_matches!(rejection, DashboardError::Checkin(CheckinRejection::NoActiveEvent));
    assert_eq!(i18n.error_message(&rejection, "id"), "Tidak ada event aktif saat ini");

    let duplicate = DashboardError::DuplicateRegistration;
    assert!(i18n.error_message(&duplicate, "id").starts_with("Data yang digunakan sudah pernah terdaftar"));
}

#[test]
fn test_kas_month_total_matches_ledger_entry() {
    let month: MonthKey = "2024-05".parse().unwrap();
    let payments: Vec<KasPayment> = [(KasStatus::Paid, 5000), (KasStatus::Paid, 5000), (KasStatus::Unpaid, 5000)]
        .into_iter()
        .map(|(status, amount)| KasPayment {
            id: Uuid::new_v4(),
            month_key: month,
            year: 2024,
            member_id: Uuid::new_v4(),
            amount,
            paid_at: None,
            status,
        })
        .collect();
    let summary = KasSnapshot::new(payments).month_summary(month);

    let ledger = LedgerSnapshot::new(vec![
        FinanceTransaction {
            id: Uuid::new_v4(),
            kind: TransactionType::Income,
            category: "kas".to_string(),
            title: format!("Kas {}", month),
            amount: summary.total_collected,
            date: NaiveDate::from_ymd_opt(2024, 5, 31).unwrap(),
            note: Some("Auto-generated from Kas payment".to_string()),
            created_at: Utc::now(),
        },
        FinanceTransaction {
            id: Uuid::new_v4(),
            kind: TransactionType::Expense,
            category: "acara".to_string(),
            title: "Konsumsi".to_string(),
            amount: 4000,
            date: NaiveDate::from_ymd_opt(2024, 5, 20).unwrap(),
            note: None,
            created_at: Utc::now(),
        },
    ]);

    assert_eq!(summary.total_collected, 10_000);
    assert_eq!(ledger.kas_transaction_for_month(month, "kas").map(|t| t.amount), Some(10_000));
    assert_eq!(ledger.balance(), 6_000);
}

#[test]
fn test_navigation_by_role() {
    let land = |path: &str, access| resolve(path, access).map(|r| r.path);
    assert_eq!(land("/admin/members/list", Access::ANONYMOUS), Some("/login"));
    assert_eq!(land("/admin/members/list", Access::USER), Some("/user/home"));
    assert_eq!(land("/admin/members/list", Access::ADMIN), Some("/admin/members/list"));
    assert_eq!(land("/login", Access::USER), Some("/user/home"));
    assert_eq!(land("/user/attendance-checkin", Access::USER), Some("/user/attendance-checkin"));
}

#[test]
fn test_checkin_stats_in_local_time() {
    let member = Uuid::new_v4();
    // 2024-02-29T20:00Z is already March in UTC+7
    let at = Utc.with_ymd_and_hms(2024, 2, 29, 20, 0, 0).unwrap().timestamp_millis();
    let checkins = CheckinSnapshot::new(vec![AttendanceCheckin {
        id: Uuid::new_v4(),
        event_id: Uuid::new_v4(),
        member_id: member,
        checked_in_at: at,
        token_used: "ABCDEF".to_string(),
    }]);

    let wib = chrono::FixedOffset::east_opt(7 * 3600).unwrap();
    let now = wib.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap();
    let stats = checkins.last_six_months_stats(now);
    assert_eq!(stats.last().map(|(m, n)| (m.to_string(), *n)), Some(("2024-03".to_string(), 1)));
    assert_eq!(stats.iter().map(|(_, n)| n).sum::<usize>(), 1);
}

#[test]
fn test_missing_translation_directory_uses_bundled_catalogues() {
    let mut config = Settings::default().i18n;
    config.translations_dir = "/nonexistent/prsdn/translations".to_string();
    let mut i18n = I18n::new(&config);

    tokio_test::block_on(i18n.load_translations()).unwrap();

    assert_eq!(i18n.t("errors.not_found", "id", None), I18n::bundled(&config).unwrap().t("errors.not_found", "id", None));
    assert_ne!(i18n.t("errors.not_found", "en", None), "errors.not_found");
}
