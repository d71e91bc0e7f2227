use chrono::{TimeZone, Utc};
use leaderboard_rs::auth::Credential;
use leaderboard_rs::board::standings;
use leaderboard_rs::models::User;
use leaderboard_rs::storage::{self, TokenStore};
use leaderboard_rs::style::Tone;
use std::fs;
use tempfile::tempdir;

fn sample(n: usize) -> Vec<User> {
    (0..n)
        .map(|i| User {
            username: format!("player{i}"),
            disabled: false,
            region: "europe".into(),
            title: "".into(),
            iconurl: "".into(),
            elo: 1000 + 10 * i as i64,
        })
        .collect()
}

#[test]
fn token_store_round_trip() {
    let dir = tempdir().unwrap();
    let store = TokenStore::new(dir.path().join("nested").join("credential.json"));
    assert_eq!(store.load().unwrap(), None);

    let c = Credential {
        id_token: "a.b.c".into(),
        access_token: Some("acc".into()),
        expires_at: Utc.timestamp_opt(1_900_000_000, 0).unwrap(),
    };
    store.save(&c).unwrap();
    assert_eq!(store.load().unwrap(), Some(c));

    store.clear().unwrap();
    assert_eq!(store.load().unwrap(), None);
    // clearing twice is fine
    store.clear().unwrap();
}

#[test]
fn corrupt_token_file_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("credential.json");
    fs::write(&path, "not json").unwrap();
    assert!(TokenStore::new(&path).load().is_err());
}

#[test]
fn save_csv_and_json() {
    let rows = standings(&sample(3), 0, Tone::default());
    let dir = tempdir().unwrap();

    let csv_path = dir.path().join("standings.csv");
    storage::save_standings_csv(&rows, &csv_path).unwrap();
    let csv_txt = fs::read_to_string(&csv_path).unwrap();
    assert!(csv_txt.starts_with("rank,username,region,title,elo,disabled,hue,color"));
    assert_eq!(csv_txt.lines().count(), 1 + rows.len());
    // highest elo first, first index gets 180°
    assert!(csv_txt.lines().nth(1).unwrap().starts_with("1,player2,europe,,1020,false,180"));

    let json_path = dir.path().join("standings.json");
    storage::save_standings_json(&rows, &json_path).unwrap();
    let json_txt = fs::read_to_string(&json_path).unwrap();
    let v: serde_json::Value = serde_json::from_str(&json_txt).unwrap();
    assert_eq!(v.as_array().unwrap().len(), rows.len());
    assert_eq!(v[0]["style"]["hsl"]["h_deg"], 180.0);
}

//test if the CSV file is safe and won't include executable formulas:
//usernames and titles are user-controlled and end up in spreadsheets
#[test]
fn csv_cells_are_prefixed_to_avoid_formulas() {
    let mut users = sample(1);
    users[0].username = "=HYPERLINK(\"http://evil\")".into();
    users[0].title = "+SUM(A1:A9)".into();
    users[0].region = "@foo".into();
    let rows = standings(&users, 0, Tone::default());

    let dir = tempdir().unwrap();
    let tmp = dir.path().join("csv_injection.csv");
    storage::save_standings_csv(&rows, &tmp).unwrap();

    let mut rdr = csv::Reader::from_path(&tmp).unwrap();
    let headers = rdr.headers().unwrap().clone();
    let row = rdr.records().next().expect("one data row expected").unwrap();
    let cell = |name: &str| {
        let idx = headers
            .iter()
            .position(|h| h == name)
            .expect("header present");
        row.get(idx).unwrap().to_string()
    };

    let name = cell("username");
    assert!(name.starts_with('\''), "username not prefixed: {name}");
    assert!(name.contains("=HYPERLINK"), "username content changed: {name}");
    let title = cell("title");
    assert!(title.starts_with('\''), "title not prefixed: {title}");
    let region = cell("region");
    assert_eq!(region, "'@foo");
    // numeric columns stay numeric
    assert_eq!(cell("elo"), "1000");
}
