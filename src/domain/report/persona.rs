use serde::{Deserialize, Serialize};

/// Perspective the probing questions are written from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text")]
#[sqlx(rename_all = "snake_case")]
pub enum QuestionPersona {
    #[default]
    BoardDirector,
    Cro,
    Coo,
    Cfo,
    Strategy,
}

impl QuestionPersona {
    pub const ALL: [QuestionPersona; 5] = [
        QuestionPersona::BoardDirector,
        QuestionPersona::Cro,
        QuestionPersona::Coo,
        QuestionPersona::Cfo,
        QuestionPersona::Strategy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionPersona::BoardDirector => "board_director",
            QuestionPersona::Cro => "cro",
            QuestionPersona::Coo => "coo",
            QuestionPersona::Cfo => "cfo",
            QuestionPersona::Strategy => "strategy",
        }
    }

    /// Unknown or missing personas fall back to the board director
    pub fn normalize(raw: Option<&str>) -> Self {
        let key = raw.map(|s| s.trim().to_lowercase()).unwrap_or_default();
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == key)
            .unwrap_or_default()
    }

    pub fn prompt(&self) -> &'static str {
        match self {
            QuestionPersona::BoardDirector => {
                "You are an independent board director. Be sharp and hold management accountable for decision quality and risk limits."
            }
            QuestionPersona::Cro => {
                "You are the chief risk officer. Probe risk triggers, mitigation plans and the bottom line."
            }
            QuestionPersona::Coo => {
                "You are the chief operating officer. Probe execution, resourcing and cross-team milestones."
            }
            QuestionPersona::Cfo => {
                "You are the chief financial officer. Probe budget discipline, cash flow and return on investment."
            }
            QuestionPersona::Strategy => {
                "You are a strategy advisor. Probe strategic fit, priorities and long-term competitiveness."
            }
        }
    }
}

impl std::fmt::Display for QuestionPersona {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
