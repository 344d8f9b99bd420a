//! Game parameters: asset paths, default texts and default action lists.

use serde::Deserialize;

use crate::definitions::Action;
use crate::error::{ScenarioError, ScenarioResult};

/// Options recognised in the `parameters` object of a world description.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Parameters {
    /// Prefix prepended to every scene background file name.
    pub scene_background_images_path: String,

    /// Prefix prepended to every audio file name.
    pub audios_path: String,

    pub default_message_box_single_button_text: String,

    /// Shown in the code input when exactly one prerequisite puzzle is unsolved.
    pub puzzle_locked_by_other_puzzle_message: String,

    /// Shown in the code input when several prerequisite puzzles are unsolved.
    pub puzzle_locked_by_other_puzzle_messages: String,

    pub default_wrong_code_actions: Vec<Action>,

    /// Run when a correct code leads to a stage that is already loaded.
    pub default_rediscovered_stage_actions: Vec<Action>,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            scene_background_images_path: String::new(),
            audios_path: String::new(),
            default_message_box_single_button_text: "OK".to_string(),
            puzzle_locked_by_other_puzzle_message: "This puzzle is locked by another puzzle."
                .to_string(),
            puzzle_locked_by_other_puzzle_messages: "This puzzle is locked by other puzzles."
                .to_string(),
            default_wrong_code_actions: Vec::new(),
            default_rediscovered_stage_actions: Vec::new(),
        }
    }
}

/// Subset of [`Parameters`] read from a host-side TOML file.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParameterOverrides {
    scene_background_images_path: Option<String>,
    audios_path: Option<String>,
    default_message_box_single_button_text: Option<String>,
    puzzle_locked_by_other_puzzle_message: Option<String>,
    puzzle_locked_by_other_puzzle_messages: Option<String>,
    default_wrong_code_actions: Option<Vec<Action>>,
    default_rediscovered_stage_actions: Option<Vec<Action>>,
}

impl Parameters {
    /// Locked-puzzle message worded for the number of unsolved prerequisites.
    pub fn locked_message(&self, unsolved: usize) -> &str {
        if unsolved == 1 {
            &self.puzzle_locked_by_other_puzzle_message
        } else {
            &self.puzzle_locked_by_other_puzzle_messages
        }
    }

    pub fn background_url(&self, file: &str) -> String {
        format!("{}{}", self.scene_background_images_path, file)
    }

    pub fn audio_urls(&self, files: &[String]) -> Vec<String> {
        files
            .iter()
            .map(|file| format!("{}{}", self.audios_path, file))
            .collect()
    }

    /// Apply the keys present in a TOML document on top of these parameters.
    pub fn merge_toml_str(&mut self, raw: &str) -> ScenarioResult<()> {
        let overrides: ParameterOverrides =
            toml::from_str(raw).map_err(|err| ScenarioError::Parse(format!("toml: {err}")))?;

        if let Some(value) = overrides.scene_background_images_path {
            self.scene_background_images_path = value;
        }
        if let Some(value) = overrides.audios_path {
            self.audios_path = value;
        }
        if let Some(value) = overrides.default_message_box_single_button_text {
            self.default_message_box_single_button_text = value;
        }
        if let Some(value) = overrides.puzzle_locked_by_other_puzzle_message {
            self.puzzle_locked_by_other_puzzle_message = value;
        }
        if let Some(value) = overrides.puzzle_locked_by_other_puzzle_messages {
            self.puzzle_locked_by_other_puzzle_messages = value;
        }
        if let Some(value) = overrides.default_wrong_code_actions {
            self.default_wrong_code_actions = value;
        }
        if let Some(value) = overrides.default_rediscovered_stage_actions {
            self.default_rediscovered_stage_actions = value;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::ActionKind;

    #[test]
    fn test_defaults_fill_missing_keys() {
        let params: Parameters =
            serde_json::from_str(r#"{ "audiosPath": "assets/audio/" }"#).unwrap();
        assert_eq!(params.audios_path, "assets/audio/");
        assert_eq!(params.default_message_box_single_button_text, "OK");
        assert!(params.default_wrong_code_actions.is_empty());
    }

    #[test]
    fn test_locked_message_wording() {
        let params = Parameters::default();
        assert_eq!(params.locked_message(1), "This puzzle is locked by another puzzle.");
        assert_eq!(params.locked_message(3), "This puzzle is locked by other puzzles.");
    }

    #[test]
    fn test_asset_urls() {
        let params = Parameters {
            scene_background_images_path: "img/".to_string(),
            audios_path: "snd/".to_string(),
            ..Default::default()
        };
        assert_eq!(params.background_url("hall.jpg"), "img/hall.jpg");
        assert_eq!(
            params.audio_urls(&["a.ogg".to_string(), "a.mp3".to_string()]),
            vec!["snd/a.ogg".to_string(), "snd/a.mp3".to_string()]
        );
    }

    #[test]
    fn test_merge_toml_overrides_only_present_keys() {
        let mut params = Parameters {
            audios_path: "snd/".to_string(),
            ..Default::default()
        };
        params
            .merge_toml_str(
                r#"
                defaultMessageBoxSingleButtonText = "Continue"

                [[defaultWrongCodeActions]]
                type = "show_text"
                text = "Nope."
                "#,
            )
            .unwrap();

        assert_eq!(params.audios_path, "snd/");
        assert_eq!(params.default_message_box_single_button_text, "Continue");
        assert_eq!(params.default_wrong_code_actions.len(), 1);
        assert!(matches!(
            &params.default_wrong_code_actions[0].kind,
            ActionKind::ShowText { text } if text == "Nope."
        ));
    }

    #[test]
    fn test_merge_toml_rejects_garbage() {
        let mut params = Parameters::default();
        assert!(matches!(
            params.merge_toml_str("audiosPath = ["),
            Err(ScenarioError::Parse(_))
        ));
    }
}
