use chrono::{Duration, TimeZone, Utc};
use rpunch::core::presence::{PresenceLogic, derive, relative_time};
use rpunch::core::punch::PunchLogic;
use rpunch::db::initialize::init_db;
use rpunch::db::pool::DbPool;
use rpunch::models::presence::{PresenceTier, RawStatus};
use rpunch::models::wire::PunchRequest;

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
}

#[test]
fn test_active_ten_minutes_ago_reads_away() {
    let p = derive(RawStatus::Active, Some(now() - Duration::minutes(10)), now());
    assert_eq!(p.tier, PresenceTier::Away);
    assert_eq!(p.tooltip, "10 minutes ago");
}

#[test]
fn test_active_within_five_minutes() {
    let p = derive(RawStatus::Active, Some(now() - Duration::minutes(5)), now());
    assert_eq!(p.tier, PresenceTier::Active);
    assert_eq!(p.tooltip, "Active now");
}

#[test]
fn test_active_older_than_a_day_is_offline() {
    let p = derive(RawStatus::Active, Some(now() - Duration::hours(25)), now());
    assert_eq!(p.tier, PresenceTier::Offline);
    assert_eq!(p.tooltip, "Offline");

    let never = derive(RawStatus::Active, None, now());
    assert_eq!(never.tier, PresenceTier::Offline);
}

#[test]
fn test_manual_statuses() {
    let recent = Some(now() - Duration::seconds(20));

    let away = derive(RawStatus::Away, recent, now());
    assert_eq!(away.tier, PresenceTier::Away);
    assert_eq!(away.tooltip, "Just now");

    let off = derive(RawStatus::Offline, recent, now());
    assert_eq!(off.tier, PresenceTier::Offline);
    assert_eq!(off.tooltip, "Offline");
}

#[test]
fn test_relative_time_wording() {
    assert_eq!(relative_time(now() - Duration::seconds(59), now()), "Just now");
    assert_eq!(relative_time(now() - Duration::seconds(61), now()), "1 minute ago");
    assert_eq!(relative_time(now() - Duration::minutes(59), now()), "59 minutes ago");

    // past an hour the timestamp itself is shown
    let old = relative_time(now() - Duration::hours(3), now());
    assert!(!old.contains("ago"));
    assert_eq!(old.len(), "2025-03-10 09:00".len());
}

#[test]
fn test_persisted_status_drives_presence() {
    let pool = DbPool::in_memory().unwrap();
    init_db(&pool.conn).unwrap();

    let unknown = PresenceLogic::presence(&pool.conn, "ghost", now()).unwrap();
    assert_eq!(unknown.tier, PresenceTier::Offline);

    PresenceLogic::set_status(&pool.conn, "w1", RawStatus::Active, now()).unwrap();
    let fresh = PresenceLogic::presence(&pool.conn, "w1", now() + Duration::minutes(2)).unwrap();
    assert_eq!(fresh.tier, PresenceTier::Active);

    let later = PresenceLogic::presence(&pool.conn, "w1", now() + Duration::minutes(10)).unwrap();
    assert_eq!(later.tier, PresenceTier::Away);
    assert_eq!(later.tooltip, "10 minutes ago");

    PresenceLogic::set_status(&pool.conn, "w1", RawStatus::Offline, now()).unwrap();
    let off = PresenceLogic::presence(&pool.conn, "w1", now()).unwrap();
    assert_eq!(off.tier, PresenceTier::Offline);
}

#[test]
fn test_punch_counts_as_activity() {
    let mut pool = DbPool::in_memory().unwrap();
    init_db(&pool.conn).unwrap();

    let req = PunchRequest {
        worker_id: "w1".into(),
        device_info: "test".into(),
        location: None,
        date: "2025-03-10".into(),
        time: "11:58:00".into(),
        time_zone: "UTC".into(),
        is_time_in: true,
    };
    PunchLogic::time_in(&mut pool.conn, &req, now()).unwrap();

    let p = PresenceLogic::presence(&pool.conn, "w1", now() + Duration::minutes(1)).unwrap();
    assert_eq!(p.tier, PresenceTier::Active);
}

#[test]
fn test_raw_status_parsing() {
    assert_eq!(RawStatus::from_db_str("Away"), Some(RawStatus::Away));
    assert_eq!(RawStatus::from_db_str("busy"), None);
}
