use crate::board::BoardBuilder;
use crate::error::{RankboardError, Result};
use crate::notify::StateShape;
use crate::types::model::{Item, Question, Scale, LIKERT_LABELS};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct BoardConfig {
    #[serde(default)]
    pub board: BoardSettings,
    #[serde(default)]
    pub scale: ScaleConfig,
    #[serde(default)]
    pub items: Vec<ItemConfig>,
    #[serde(default)]
    pub questions: Vec<QuestionConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BoardSettings {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_state_file")]
    pub state_file: String,
    #[serde(default)]
    pub grouping: Grouping,
    #[serde(default)]
    pub notify: StateShape,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            state_file: default_state_file(),
            grouping: Grouping::default(),
            notify: StateShape::default(),
        }
    }
}

fn default_debounce_ms() -> u64 {
    150
}

fn default_state_file() -> String {
    ".rankboard/state.json".to_string()
}

/// Display sectioning of question rows. Has no effect on ranking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grouping {
    #[default]
    None,
    Domain,
    Subdomain,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScaleConfig {
    #[serde(default = "default_labels")]
    pub labels: Vec<String>,
    pub weights: Option<BTreeMap<String, u32>>,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            labels: default_labels(),
            weights: None,
        }
    }
}

fn default_labels() -> Vec<String> {
    LIKERT_LABELS.iter().map(ToString::to_string).collect()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemConfig {
    pub key: Option<String>,
    pub name: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuestionConfig {
    pub text: Option<String>,
    pub key: Option<String>,
    pub domain: Option<String>,
    pub subdomain: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl BoardConfig {
    pub fn items(&self) -> Vec<Item> {
        self.items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let n = index + 1;
                let built = Item::new(
                    non_blank(&item.key)
                        .map(ToString::to_string)
                        .unwrap_or_else(|| format!("brand_{n}")),
                    non_blank(&item.name)
                        .map(ToString::to_string)
                        .unwrap_or_else(|| format!("Brand {n}")),
                );
                match non_blank(&item.image) {
                    Some(image) => built.with_image(image),
                    None => built,
                }
            })
            .collect()
    }

    pub fn questions(&self) -> Vec<Question> {
        self.questions
            .iter()
            .enumerate()
            .map(|(index, question)| Question {
                text: non_blank(&question.text)
                    .map(ToString::to_string)
                    .unwrap_or_else(|| format!("Question {}", index + 1)),
                key: non_blank(&question.key).map(ToString::to_string),
                domain: non_blank(&question.domain).map(ToString::to_string),
                subdomain: non_blank(&question.subdomain).map(ToString::to_string),
            })
            .collect()
    }

    pub fn scale(&self) -> Result<Scale> {
        if let Some(weights) = &self.scale.weights {
            let labels: HashSet<&str> = self.scale.labels.iter().map(String::as_str).collect();
            let unknown = weights
                .keys()
                .filter(|label| !labels.contains(label.as_str()))
                .cloned()
                .collect::<Vec<_>>();
            if !unknown.is_empty() {
                return Err(RankboardError::ConfigParse(format!(
                    "scale.weights contains unknown label(s): {}",
                    unknown.join(", ")
                )));
            }
        }
        Scale::from_labels(&self.scale.labels, self.scale.weights.as_ref())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.board.debounce_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.items.is_empty() {
            return Err(RankboardError::Config(
                "no items configured; add at least one [[items]] entry".to_string(),
            ));
        }
        if self.questions.is_empty() {
            return Err(RankboardError::Config(
                "no questions configured; add at least one [[questions]] entry".to_string(),
            ));
        }
        self.scale()?;
        if self.board.state_file.trim().is_empty() {
            return Err(RankboardError::ConfigParse(
                "board.state_file must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Board builder preloaded with this configuration.
    pub fn builder(&self) -> Result<BoardBuilder> {
        self.validate()?;
        Ok(BoardBuilder::new(self.items(), self.questions())
            .scale(self.scale()?)
            .debounce(self.debounce())
            .state_shape(self.board.notify))
    }
}
