use leaderboard_rs::models::User;
use leaderboard_rs::stats::region_summary;

fn u(region: &str, elo: i64, disabled: bool) -> User {
    User {
        username: format!("{region}-{elo}"),
        disabled,
        region: region.into(),
        title: String::new(),
        iconurl: String::new(),
        elo,
    }
}

#[test]
fn region_stats_handle_disabled_and_median_even_odd() {
    // asia: [1000, 1200, 1400, 1600] -> median = 1300
    // europe: [900, disabled, 1500, 1200] -> disabled = 1, median = 1200
    let rows = vec![
        u("europe", 900, false),
        u("asia", 1400, false),
        u("asia", 1000, false),
        u("europe", 2000, true),
        u("asia", 1600, false),
        u("europe", 1500, false),
        u("asia", 1200, false),
        u("europe", 1200, false),
    ];
    let got = region_summary(&rows);
    assert_eq!(got.len(), 2);

    let a = &got[0];
    assert_eq!(a.region, "asia");
    assert_eq!(a.count, 4);
    assert_eq!(a.disabled, 0);
    assert_eq!(a.min, Some(1000));
    assert_eq!(a.max, Some(1600));
    assert!((a.mean.unwrap() - 1300.0).abs() < 1e-9);
    assert_eq!(a.median, Some(1300.0));

    let e = &got[1];
    assert_eq!(e.region, "europe");
    assert_eq!(e.count, 3);
    assert_eq!(e.disabled, 1);
    assert_eq!(e.max, Some(1500));
    assert_eq!(e.median, Some(1200.0));
}

#[test]
fn region_with_only_disabled_users_has_no_figures() {
    let got = region_summary(&[u("oceania", 1500, true)]);
    assert_eq!(got[0].count, 0);
    assert_eq!(got[0].disabled, 1);
    assert_eq!(got[0].min, None);
    assert_eq!(got[0].mean, None);
    assert_eq!(got[0].median, None);
}

#[test]
fn median_of_huge_elos_does_not_overflow() {
    let got = region_summary(&[u("europe", i64::MAX, false), u("europe", i64::MAX, false)]);
    assert_eq!(got[0].count, 2);
    assert_eq!(got[0].median, Some(i64::MAX as f64));

    let got = region_summary(&[u("asia", i64::MIN, false), u("asia", i64::MIN, false)]);
    assert_eq!(got[0].median, Some(i64::MIN as f64));
}
