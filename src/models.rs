use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A ranked player as returned by `/api/user/fetch`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub username: String,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub iconurl: String,
    /// Some deployments encode numbers as strings. Accept both.
    #[serde(default, deserialize_with = "de_i64_from_string_or_number")]
    pub elo: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FetchUserResponse {
    #[serde(default)]
    pub message: String,
    /// Opaque cursor for the next page; empty when there is none.
    #[serde(default)]
    pub newpagekey: String,
    #[serde(default)]
    pub users: Vec<User>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserUpdates {
    pub title: String,
    pub iconurl: String,
    pub disabled: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UpdateUserRequest {
    pub user_updates: UserUpdates,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdatedUser {
    pub username: String,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub iconurl: String,
    #[serde(default, deserialize_with = "de_i64_from_string_or_number")]
    pub elo: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdateUserResponse {
    #[serde(default)]
    pub message: String,
    pub updated_user: UpdatedUser,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameParticipant {
    pub username: String,
    #[serde(default)]
    pub underdog: bool,
    #[serde(default)]
    pub team: i64,
    #[serde(default)]
    pub placement: i64,
    #[serde(default)]
    pub points: i64,
    #[serde(default, deserialize_with = "de_i64_from_string_or_number")]
    pub elo: i64,
    #[serde(default)]
    pub elo_update: i64,
    #[serde(default)]
    pub confirmed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Game {
    pub gameid: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub readonly: bool,
    #[serde(default, deserialize_with = "de_i64_from_string_or_number")]
    pub expires_in: i64,
    /// Keyed by username. Older backends send a plain list; both shapes are accepted.
    #[serde(default, deserialize_with = "de_participants")]
    pub participants: BTreeMap<String, GameParticipant>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FetchGameResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub games: Vec<Game>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AddGameParticipant {
    pub username: String,
    pub team: i64,
    pub placement: i64,
    pub points: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AddGameRequest {
    pub placement_points: i64,
    pub participants: Vec<AddGameParticipant>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AddGameResponse {
    #[serde(default)]
    pub message: String,
    pub gameid: String,
}

/// Serde helper: accept participants as a map keyed by username or as a list.
fn de_participants<'de, D>(deserializer: D) -> Result<BTreeMap<String, GameParticipant>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Participants {
        Map(BTreeMap<String, GameParticipant>),
        List(Vec<GameParticipant>),
    }

    Ok(match Participants::deserialize(deserializer)? {
        Participants::Map(map) => map,
        Participants::List(list) => list
            .into_iter()
            .map(|p| (p.username.clone(), p))
            .collect(),
    })
}

/// Serde helper: parse `i64` from either a JSON number or a string.
fn de_i64_from_string_or_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    struct I64Visitor;

    impl<'de> Visitor<'de> for I64Visitor {
        type Value = i64;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "a string or integer")
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            i64::try_from(v).map_err(E::custom)
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v)
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v.fract() != 0.0 || !v.is_finite() {
                return Err(E::custom("expected a whole number"));
            }
            Ok(v as i64)
        }

        fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            s.trim().parse::<i64>().map_err(E::custom)
        }
    }

    deserializer.deserialize_any(I64Visitor)
}
