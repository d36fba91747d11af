//! Suggestion/Action/Snapshot — the engine's owned output types.
//!
//! Ids are the only stable integration surface with a UI: they are composed
//! from the suggestion kind plus business keys, parsed back by
//! [`crate::engine::SuggestionEngine::accept`]/`reject`, and `Display`/
//! `FromStr` round-trip by construction.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::clock::SimTime;
use crate::host::{RouteId, SignalId, TrainId};

#[derive(Debug, Clone, thiserror::Error)]
#[error("malformed suggestion id: {0}")]
pub struct ParseSuggestionIdError(pub String);

/// Opaque, stable suggestion identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SuggestionId {
    RouteActivate {
        train: TrainId,
        route: RouteId,
        predictive: bool,
    },
    RouteDeactivate {
        route: RouteId,
    },
    TrainProceedWithCaution {
        train: TrainId,
    },
    SignalOverride {
        signal: SignalId,
        aspect_name: String,
    },
}

impl SuggestionId {
    pub fn kind(&self) -> SuggestionKind {
        match self {
            SuggestionId::RouteActivate { .. } => SuggestionKind::RouteActivate,
            SuggestionId::RouteDeactivate { .. } => SuggestionKind::RouteDeactivate,
            SuggestionId::TrainProceedWithCaution { .. } => SuggestionKind::TrainProceedWithCaution,
            SuggestionId::SignalOverride { .. } => SuggestionKind::SignalOverride,
        }
    }
}

impl fmt::Display for SuggestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuggestionId::RouteActivate { train, route, predictive } => {
                write!(f, "ROUTE_ACTIVATE:{train}:{route}")?;
                if *predictive {
                    write!(f, ":predictive")?;
                }
                Ok(())
            }
            SuggestionId::RouteDeactivate { route } => write!(f, "ROUTE_DEACTIVATE:{route}"),
            SuggestionId::TrainProceedWithCaution { train } => {
                write!(f, "TRAIN_PROCEED_WITH_CAUTION:{train}")
            }
            SuggestionId::SignalOverride { signal, aspect_name } => {
                write!(f, "SIGNAL_OVERRIDE:{signal}:{aspect_name}")
            }
        }
    }
}

impl FromStr for SuggestionId {
    type Err = ParseSuggestionIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseSuggestionIdError(s.to_string());
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            ["ROUTE_ACTIVATE", train, route] => Ok(SuggestionId::RouteActivate {
                train: train.parse().map_err(|_| err())?,
                route: RouteId(route.to_string()),
                predictive: false,
            }),
            ["ROUTE_ACTIVATE", train, route, "predictive"] => Ok(SuggestionId::RouteActivate {
                train: train.parse().map_err(|_| err())?,
                route: RouteId(route.to_string()),
                predictive: true,
            }),
            ["ROUTE_DEACTIVATE", route] => Ok(SuggestionId::RouteDeactivate {
                route: RouteId(route.to_string()),
            }),
            ["TRAIN_PROCEED_WITH_CAUTION", train] => Ok(SuggestionId::TrainProceedWithCaution {
                train: train.parse().map_err(|_| err())?,
            }),
            ["SIGNAL_OVERRIDE", signal, aspect] => Ok(SuggestionId::SignalOverride {
                signal: SignalId(signal.to_string()),
                aspect_name: aspect.to_string(),
            }),
            _ => Err(err()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SuggestionKind {
    RouteActivate,
    RouteDeactivate,
    TrainProceedWithCaution,
    SignalOverride,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionObject {
    Route,
    Train,
    Signal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionVerb {
    Activate,
    Deactivate,
    Proceed,
    Status,
}

/// One concrete action the operator may accept; opaque to the engine beyond
/// its own dispatch in `SuggestionEngine::accept`.
#[derive(Debug, Clone, Serialize)]
pub struct Action {
    pub object: ActionObject,
    pub action: ActionVerb,
    pub params: serde_json::Map<String, serde_json::Value>,
}

impl Action {
    pub fn new(object: ActionObject, action: ActionVerb) -> Self {
        Self { object, action, params: serde_json::Map::new() }
    }

    pub fn with_param(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }
}

fn serialize_id<S: Serializer>(id: &SuggestionId, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&id.to_string())
}

#[derive(Debug, Clone, Serialize)]
pub struct Suggestion {
    #[serde(serialize_with = "serialize_id")]
    pub id: SuggestionId,
    pub kind: SuggestionKind,
    pub title: String,
    pub reason: String,
    pub score: f64,
    pub actions: Vec<Action>,
}

impl Suggestion {
    pub fn new(id: SuggestionId, title: impl Into<String>, reason: impl Into<String>, score: f64, actions: Vec<Action>) -> Self {
        let kind = id.kind();
        Self { id, kind, title: title.into(), reason: reason.into(), score, actions }
    }
}

fn serialize_sim_time<S: Serializer>(t: &SimTime, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&t.to_string())
}

/// `suggestionsUpdated` event payload.
#[derive(Debug, Clone, Serialize)]
pub struct SuggestionsSnapshot {
    pub items: Vec<Suggestion>,
    #[serde(rename = "generatedAt", serialize_with = "serialize_sim_time")]
    pub generated_at: SimTime,
}

impl SuggestionsSnapshot {
    pub fn empty(generated_at: SimTime) -> Self {
        Self { items: Vec::new(), generated_at }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(s: &str) {
        let id: SuggestionId = s.parse().expect("parses");
        assert_eq!(id.to_string(), s);
    }

    #[test]
    fn round_trips_all_id_shapes() {
        round_trip("ROUTE_ACTIVATE:7:R1");
        round_trip("ROUTE_ACTIVATE:7:R1:predictive");
        round_trip("ROUTE_DEACTIVATE:RP");
        round_trip("TRAIN_PROCEED_WITH_CAUTION:42");
        round_trip("SIGNAL_OVERRIDE:SIG1:CAUTION");
    }

    #[test]
    fn rejects_malformed_ids() {
        assert!("NOT_A_KIND:1:2".parse::<SuggestionId>().is_err());
        assert!("ROUTE_ACTIVATE:notanumber:R1".parse::<SuggestionId>().is_err());
    }

    #[test]
    fn snapshot_json_shape() {
        let snap = SuggestionsSnapshot {
            items: vec![Suggestion::new(
                SuggestionId::RouteActivate { train: 0, route: RouteId("R1".into()), predictive: false },
                "Activate R1",
                "Scheduled departure was 06:05:00, minimum stop satisfied. No conflicts detected.",
                3.0,
                vec![Action::new(ActionObject::Route, ActionVerb::Activate).with_param("routeId", "R1")],
            )],
            generated_at: SimTime(6 * 3600 + 5 * 60 + 10),
        };
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["generatedAt"], "06:05:10");
        assert_eq!(json["items"][0]["id"], "ROUTE_ACTIVATE:0:R1");
        assert_eq!(json["items"][0]["kind"], "ROUTE_ACTIVATE");
        assert_eq!(json["items"][0]["actions"][0]["object"], "route");
        assert_eq!(json["items"][0]["actions"][0]["action"], "activate");
    }
}
