//! NVDA configuration written to `userConfig/nvda.ini` before launch.
//!
//! The defaults reproduce a quiet, deterministic NVDA suitable for automated
//! tests: no welcome dialog, no update checks, OneCore speech, and verbose
//! reporting of document structure.  Every section is `serde` (de)serializable
//! with `#[serde(default)]`, so a driver configuration file only needs to list
//! the values it changes:
//!
//! ```toml
//! [nvda.general]
//! language = "es"
//! play_start_and_exit_sounds = false
//!
//! [nvda.speech]
//! punctuation_level = "most"
//! ```

pub mod ini;

use serde::{Deserialize, Serialize};

use crate::commands::KeyboardLayout;

pub use ini::render_ini;

/// How much punctuation NVDA speaks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PunctuationLevel {
    None,
    #[default]
    Some,
    Most,
    All,
}

impl PunctuationLevel {
    /// The numeric `symbolLevel` NVDA stores for this level.
    pub fn symbol_level(&self) -> u32 {
        match self {
            PunctuationLevel::None => 0,
            PunctuationLevel::Some => 100,
            PunctuationLevel::Most => 200,
            PunctuationLevel::All => 300,
        }
    }
}

/// How NVDA reports progress bar updates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressBarOutputMode {
    #[default]
    Beep,
    Speak,
    Both,
}

impl ProgressBarOutputMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressBarOutputMode::Beep => "beep",
            ProgressBarOutputMode::Speak => "speak",
            ProgressBarOutputMode::Both => "both",
        }
    }
}

/// The complete settings graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NvdaSettings {
    pub general: GeneralSettings,
    pub speech: SpeechSettings,
    pub vision: VisionSettings,
    pub keyboard: KeyboardSettings,
    pub review_cursor: ReviewCursorSettings,
    pub input_composition: InputCompositionSettings,
    pub presentation: PresentationSettings,
    pub browse_mode: BrowseModeSettings,
    pub document_formatting: DocumentFormattingSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// NVDA interface language code (`"en"`, `"es"`, `"zh_TW"`, …).
    pub language: String,
    pub play_start_and_exit_sounds: bool,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            play_start_and_exit_sounds: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechSettings {
    pub auto_language_switching: bool,
    pub auto_dialect_switching: bool,
    pub include_unicode_descriptions: bool,
    pub punctuation_level: PunctuationLevel,
    pub say_cap_for_capitals: bool,
    pub use_spelling_functionality: bool,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            auto_language_switching: true,
            auto_dialect_switching: false,
            include_unicode_descriptions: true,
            punctuation_level: PunctuationLevel::Some,
            say_cap_for_capitals: false,
            use_spelling_functionality: true,
        }
    }
}

/// Visual highlighter toggles.  All off by default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionSettings {
    pub highlight_focus: bool,
    pub highlight_navigator: bool,
    pub highlight_browse_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyboardSettings {
    pub keyboard_layout: KeyboardLayout,
    pub use_caps_lock_as_nvda_modifier_key: bool,
    pub speak_typed_characters: bool,
    pub speak_typed_words: bool,
    pub speech_interrupt_for_enter: bool,
}

impl Default for KeyboardSettings {
    fn default() -> Self {
        Self {
            keyboard_layout: KeyboardLayout::Desktop,
            use_caps_lock_as_nvda_modifier_key: false,
            speak_typed_characters: true,
            speak_typed_words: false,
            speech_interrupt_for_enter: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewCursorSettings {
    pub follow_focus: bool,
    pub follow_caret: bool,
    pub follow_mouse: bool,
    pub simple_review_mode: bool,
}

impl Default for ReviewCursorSettings {
    fn default() -> Self {
        Self {
            follow_focus: true,
            follow_caret: true,
            follow_mouse: false,
            simple_review_mode: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputCompositionSettings {
    pub auto_report_all_candidates: bool,
    pub announce_selected_candidate: bool,
    pub always_include_short_character_description_in_candidate_name: bool,
    pub report_reading_string_changes: bool,
    pub report_composition_string_changes: bool,
}

impl Default for InputCompositionSettings {
    fn default() -> Self {
        Self {
            auto_report_all_candidates: true,
            announce_selected_candidate: true,
            always_include_short_character_description_in_candidate_name: true,
            report_reading_string_changes: true,
            report_composition_string_changes: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressBarSettings {
    pub output_mode: ProgressBarOutputMode,
    pub report_background_progress_bars: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationSettings {
    pub report_tooltips: bool,
    pub report_help_balloons: bool,
    pub report_keyboard_shortcuts: bool,
    pub report_object_position_information: bool,
    pub guess_object_position_information_when_unavailable: bool,
    pub report_object_descriptions: bool,
    pub report_dynamic_content_changes: bool,
    pub progress_bar_updates: ProgressBarSettings,
}

impl Default for PresentationSettings {
    fn default() -> Self {
        Self {
            report_tooltips: false,
            report_help_balloons: true,
            report_keyboard_shortcuts: true,
            report_object_position_information: true,
            guess_object_position_information_when_unavailable: false,
            report_object_descriptions: true,
            report_dynamic_content_changes: true,
            progress_bar_updates: ProgressBarSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowseModeSettings {
    pub max_line_length: u32,
    pub lines_per_page: u32,
    pub use_screen_layout: bool,
    pub auto_say_all_on_page_load: bool,
    pub auto_pass_through_on_focus_change: bool,
    pub auto_pass_through_on_caret_move: bool,
    pub trap_non_command_gestures: bool,
}

impl Default for BrowseModeSettings {
    fn default() -> Self {
        Self {
            max_line_length: 100,
            lines_per_page: 25,
            use_screen_layout: true,
            auto_say_all_on_page_load: true,
            auto_pass_through_on_focus_change: true,
            auto_pass_through_on_caret_move: false,
            trap_non_command_gestures: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentFormattingSettings {
    pub include_layout_tables: bool,
    pub detect_format_after_cursor: bool,
    pub report_font_name: bool,
    pub report_font_size: bool,
    pub report_font_attributes: bool,
    pub report_emphasis: bool,
    pub report_style: bool,
    pub report_color: bool,
    pub report_comments: bool,
    pub report_revisions: bool,
    pub report_spelling_errors: bool,
    pub report_alignment: bool,
    pub report_page: bool,
    pub report_line_number: bool,
    pub report_line_indentation: bool,
    pub report_paragraph_indentation: bool,
    pub report_line_spacing: bool,
    pub report_tables: bool,
    pub report_table_headers: bool,
    pub report_table_cell_coords: bool,
    pub report_border_style: bool,
    pub report_border_color: bool,
    pub report_links: bool,
    pub report_headings: bool,
    pub report_lists: bool,
    pub report_block_quotes: bool,
    pub report_landmarks: bool,
    pub report_frames: bool,
    pub report_clickable: bool,
}

impl Default for DocumentFormattingSettings {
    fn default() -> Self {
        // Structure is reported, visual styling is not.
        Self {
            include_layout_tables: false,
            detect_format_after_cursor: false,
            report_font_name: false,
            report_font_size: false,
            report_font_attributes: false,
            report_emphasis: false,
            report_style: false,
            report_color: false,
            report_comments: true,
            report_revisions: true,
            report_spelling_errors: true,
            report_alignment: false,
            report_page: true,
            report_line_number: false,
            report_line_indentation: false,
            report_paragraph_indentation: false,
            report_line_spacing: false,
            report_tables: true,
            report_table_headers: true,
            report_table_cell_coords: true,
            report_border_style: false,
            report_border_color: false,
            report_links: true,
            report_headings: true,
            report_lists: true,
            report_block_quotes: true,
            report_landmarks: true,
            report_frames: true,
            report_clickable: true,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
