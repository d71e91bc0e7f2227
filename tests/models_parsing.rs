use leaderboard_rs::models::{
    AddGameParticipant, AddGameRequest, FetchGameResponse, FetchUserResponse, UpdateUserRequest,
    UpdateUserResponse, UserUpdates,
};

#[test]
fn parse_user_page() {
    let sample = r#"
    {
      "message": "successfully fetched data by page",
      "newpagekey": "eyJzdWJqZWN0Ijp7IlMiOiJhYmMifX0=",
      "users": [
        {"username":"alice","disabled":false,"region":"europe","title":"Champion","iconurl":"https://i/a.png","elo":1642},
        {"username":"bob","disabled":true,"region":"europe","title":"","iconurl":"","elo":"1490"}
      ]
    }"#;
    let page: FetchUserResponse = serde_json::from_str(sample).unwrap();
    assert_eq!(page.users.len(), 2);
    assert_eq!(page.users[0].elo, 1642);
    assert_eq!(page.users[1].elo, 1490);
    assert!(page.users[1].disabled);
    assert!(!page.newpagekey.is_empty());
}

#[test]
fn username_lookup_has_no_cursor() {
    let page: FetchUserResponse = serde_json::from_str(
        r#"{"message":"successfully fetched data by username","users":[{"username":"carol","elo":1000}]}"#,
    )
    .unwrap();
    assert_eq!(page.newpagekey, "");
    assert_eq!(page.users[0].region, "");
}

#[test]
fn elo_rejects_non_numeric_strings() {
    let r: Result<FetchUserResponse, _> =
        serde_json::from_str(r#"{"users":[{"username":"x","elo":"lots"}]}"#);
    assert!(r.is_err());
}

#[test]
fn games_accept_map_or_list_participants() {
    let as_map = r#"
    {
      "message": "successfully fetched data by gameid",
      "games": [{
        "gameid": "g-1",
        "date": "2024-05-01",
        "readonly": false,
        "expires_in": 1714600000,
        "participants": {
          "alice": {"username":"alice","underdog":false,"team":1,"placement":1,"points":30,"elo":1600,"elo_update":12,"confirmed":true},
          "bob":   {"username":"bob","underdog":true,"team":2,"placement":2,"points":10,"elo":1500,"elo_update":-12,"confirmed":false}
        }
      }]
    }"#;
    let as_list = r#"
    {
      "message": "successfully fetched data by date",
      "games": [{
        "gameid": "g-1",
        "date": "2024-05-01",
        "participants": [
          {"username":"alice","placement":1,"points":30,"elo":1600,"elo_update":12,"confirmed":true},
          {"username":"bob","placement":2,"points":10,"elo":1500,"elo_update":-12,"confirmed":false}
        ]
      }]
    }"#;
    let a: FetchGameResponse = serde_json::from_str(as_map).unwrap();
    let b: FetchGameResponse = serde_json::from_str(as_list).unwrap();
    for resp in [&a, &b] {
        let g = &resp.games[0];
        assert_eq!(g.participants.len(), 2);
        assert_eq!(g.participants["bob"].elo_update, -12);
        assert!(g.participants["alice"].confirmed);
    }
    assert!(a.games[0].participants["bob"].underdog);
    assert_eq!(b.games[0].participants["bob"].team, 0);
}

#[test]
fn requests_serialize_with_wire_names() {
    let req = UpdateUserRequest {
        user_updates: UserUpdates {
            title: "Rookie".into(),
            iconurl: String::new(),
            disabled: false,
        },
    };
    let v = serde_json::to_value(&req).unwrap();
    assert_eq!(v["user_updates"]["title"], "Rookie");

    let game = AddGameRequest {
        placement_points: 10,
        participants: vec![AddGameParticipant {
            username: "alice".into(),
            team: 1,
            placement: 1,
            points: 21,
        }],
    };
    let v = serde_json::to_value(&game).unwrap();
    assert_eq!(v["placement_points"], 10);
    assert_eq!(v["participants"][0]["username"], "alice");
}

#[test]
fn update_response_carries_email() {
    let r: UpdateUserResponse = serde_json::from_str(
        r#"{"message":"ok","updated_user":{"username":"alice","email":"a@example.com","elo":1000,"region":"europe","title":"","iconurl":"","disabled":false}}"#,
    )
    .unwrap();
    assert_eq!(r.updated_user.email, "a@example.com");
}
