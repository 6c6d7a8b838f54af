use chrono::{Datelike, NaiveDate, Weekday};
use margin_call_core::calendar::{is_business_day, BusinessCalendar};
use margin_call_core::config::{default_roster, GeneratorConfig};
use margin_call_core::generator::{generate, generate_to_file, inspect_file};
use margin_call_core::reader::read_table;
use margin_call_core::{ClientProfile, Currency, MarginCallError};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ===========================================================================
// Calendar
// ===========================================================================

#[test]
fn test_calendar_180_weekdays_ending_2025_05_29() {
    let cal = BusinessCalendar::ending(date(2025, 5, 29), 180).unwrap();
    assert_eq!(cal.len(), 180);
    assert_eq!(cal.last(), Some(date(2025, 5, 29)));
    assert!(cal.days().iter().all(|d| is_business_day(*d)));

    for pair in cal.days().windows(2) {
        let gap = pair[1].signed_duration_since(pair[0]).num_days();
        match pair[0].weekday() {
            Weekday::Fri => assert_eq!(gap, 3, "{} -> {}", pair[0], pair[1]),
            _ => assert_eq!(gap, 1, "{} -> {}", pair[0], pair[1]),
        }
    }
}

// ===========================================================================
// Default fixture
// ===========================================================================

#[test]
fn test_default_run_shape() {
    let config = GeneratorConfig::default();
    let table = generate(&config).unwrap();
    assert_eq!(table.len(), 180 * 6);
    assert!(table.has_unique_keys());

    let cal = BusinessCalendar::ending(config.end_date, config.business_days).unwrap();
    assert_eq!(table.records()[0].date, cal.first().unwrap());
    assert_eq!(table.records()[0].client, "ClientA");
    assert_eq!(table.records().last().unwrap().date, date(2025, 5, 29));
    assert_eq!(table.records().last().unwrap().client, "ClientF");

    let summary = table.summary();
    assert_eq!(summary.record_count, 1080);
    assert_eq!(summary.business_day_count, 180);
    assert_eq!(summary.client_count, 6);
}

#[test]
fn test_default_run_invariants() {
    let table = generate(&GeneratorConfig::default()).unwrap();
    for r in table.records() {
        assert!(r.collateral >= dec!(100_000), "{r:?}");
        assert!(r.threshold >= dec!(50_000), "{r:?}");
        assert!(r.margin_call_amount > Decimal::ZERO, "{r:?}");
        assert!(r.mtm >= dec!(1_000_000), "{r:?}");
        assert!(r.interest_rate >= dec!(0.1), "{r:?}");
        assert_eq!(r.interest_rate, r.interest_rate.round_dp(1));
        assert_eq!(r.volatility, r.volatility.trunc());
        assert_eq!(r.currency.to_string(), "USD");

        // The flag is decided on the residual before any fallback rewrite.
        let residual = r.mtm - r.collateral - r.threshold;
        assert_eq!(r.margin_call_made, residual >= r.mta, "{r:?}");
        if residual > Decimal::ZERO {
            assert_eq!(r.margin_call_amount, residual, "{r:?}");
        } else {
            assert!(r.margin_call_amount >= dec!(110_000), "{r:?}");
            assert!(r.margin_call_amount < dec!(150_000), "{r:?}");
        }
    }

    // Negative client buckets put whole clients on the MTM floor.
    assert!(table
        .records()
        .iter()
        .any(|r| r.client == "ClientE" && r.mtm == dec!(1_000_000)));
}

#[test]
fn test_rows_ordered_by_date_then_client() {
    let table = generate(&GeneratorConfig::default()).unwrap();
    for pair in table.records().windows(2) {
        let a = (pair[0].date, pair[0].client.as_str());
        let b = (pair[1].date, pair[1].client.as_str());
        assert!(a < b, "{a:?} !< {b:?}");
    }
}

// ===========================================================================
// Determinism
// ===========================================================================

#[test]
fn test_two_runs_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.csv");
    let second = dir.path().join("second.csv");
    let config = GeneratorConfig::default();

    generate_to_file(&config, &first).unwrap();
    generate_to_file(&config, &second).unwrap();

    let a = std::fs::read(&first).unwrap();
    let b = std::fs::read(&second).unwrap();
    assert!(a == b, "outputs differ");
    assert_eq!(String::from_utf8(a).unwrap().lines().count(), 1081);
}

#[test]
fn test_seed_basis_changes_output() {
    let base = generate(&GeneratorConfig::default()).unwrap();
    let shifted = generate(&GeneratorConfig {
        seed_basis: 1_000,
        ..Default::default()
    })
    .unwrap();
    assert_eq!(base.len(), shifted.len());
    assert!(base != shifted);
}

#[test]
fn test_roster_order_does_not_change_table() {
    let mut reversed = default_roster();
    reversed.reverse();
    let a = generate(&GeneratorConfig::default()).unwrap();
    let b = generate(&GeneratorConfig {
        roster: reversed,
        ..Default::default()
    })
    .unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_cells_independent_of_roster_membership() {
    let full = generate(&GeneratorConfig::default()).unwrap();
    let only_c = generate(&GeneratorConfig {
        roster: vec![ClientProfile::new("ClientC", dec!(150_000))],
        ..Default::default()
    })
    .unwrap();

    let from_full: Vec<_> = full
        .records()
        .iter()
        .filter(|r| r.client == "ClientC")
        .cloned()
        .collect();
    assert_eq!(from_full, only_c.into_records());
}

// ===========================================================================
// MTA drives the flag
// ===========================================================================

#[test]
fn test_large_mta_clients_call_less_often() {
    let summary = generate(&GeneratorConfig::default()).unwrap().summary();
    let ratio = |id: &str| {
        summary
            .per_client
            .iter()
            .find(|c| c.client == id)
            .map(|c| c.call_ratio)
            .unwrap()
    };

    let d = ratio("ClientD");
    let e = ratio("ClientE");
    let f = ratio("ClientF");

    // ClientD (80k MTA) calls on every above-MTA draw. ClientE sits on the
    // 1M MTM floor below its 1.2M MTA, and ClientF rarely reaches 2.5M.
    assert!(d > dec!(0.4), "ClientD {d}");
    assert_eq!(e, Decimal::ZERO, "ClientE {e}");
    assert!(f < dec!(0.2), "ClientF {f}");
    assert!(d - e > dec!(0.3), "D={d} E={e}");
    assert!(d - f > dec!(0.2), "D={d} F={f}");
}

#[test]
fn test_unreachable_mta_never_calls() {
    let config = GeneratorConfig {
        roster: vec![
            ClientProfile::new("Huge", dec!(50_000_000)),
            ClientProfile::new("Small", dec!(80_000)),
        ],
        ..Default::default()
    };
    let summary = generate(&config).unwrap().summary();

    let huge = &summary.per_client[0];
    let small = &summary.per_client[1];
    assert_eq!(huge.client, "Huge");
    assert_eq!(huge.calls_made, 0);

    // Small calls on every above-MTA draw, roughly 60% of days.
    assert!(small.call_ratio > dec!(0.4), "{}", small.call_ratio);
    assert!(small.call_ratio < dec!(0.8), "{}", small.call_ratio);
}

// ===========================================================================
// File round trip and reporting
// ===========================================================================

#[test]
fn test_written_file_reads_back_to_same_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("MarginCallData.csv");
    let config = GeneratorConfig {
        business_days: 30,
        ..Default::default()
    };

    let output = generate_to_file(&config, &path).unwrap();
    assert_eq!(output.result.summary.record_count, 180);
    assert!(output.warnings.is_empty());

    let expected = generate(&config).unwrap();
    assert_eq!(read_table(&path).unwrap(), expected);

    let inspected = inspect_file(&path).unwrap();
    assert_eq!(inspected.result, expected.summary());
}

#[test]
fn test_configured_currency_is_written() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("eur.csv");
    let config = GeneratorConfig {
        business_days: 5,
        currency: Currency::new("EUR"),
        ..Default::default()
    };
    generate_to_file(&config, &path).unwrap();

    let table = read_table(&path).unwrap();
    assert_eq!(table.len(), 30);
    assert!(table.iter().all(|r| r.currency.code() == "EUR"));
}

#[test]
fn test_long_window_warns_about_day_of_year_seeds() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("long.csv");
    let config = GeneratorConfig {
        business_days: 300,
        roster: vec![ClientProfile::new("ClientA", dec!(100_000))],
        ..Default::default()
    };
    let output = generate_to_file(&config, &path).unwrap();
    assert!(output.warnings.iter().any(|w| w.contains("day-of-year")));
}

#[test]
fn test_config_error_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("never.csv");
    let config = GeneratorConfig {
        roster: vec![
            ClientProfile::new("ClientA", dec!(100_000)),
            ClientProfile::new("ClientA", dec!(200_000)),
        ],
        ..Default::default()
    };
    let err = generate_to_file(&config, &path).unwrap_err();
    assert!(matches!(err, MarginCallError::DuplicateClient(_)));
    assert!(!path.exists());
}
