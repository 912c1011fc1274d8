//! Renders [`NvdaSettings`] in NVDA's configobj ini dialect.
//!
//! NVDA reads `schemaVersion = 3` files with tab-indented keys, `[section]`
//! and `[[subsection]]` headers, and configobj booleans (`True`/`False`).
//! Values the driver always pins (no update checks, OneCore synth, debug
//! logging) are written as literals.

use std::fmt::Write;

use super::NvdaSettings;

fn flag(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

/// Builds one section; keeps the `writeln!` noise out of [`render_ini`].
struct IniWriter {
    out: String,
}

impl IniWriter {
    fn section(&mut self, name: &str) -> &mut Self {
        let _ = writeln!(self.out, "[{name}]");
        self
    }

    fn subsection(&mut self, name: &str) -> &mut Self {
        let _ = writeln!(self.out, "\t[[{name}]]");
        self
    }

    fn value(&mut self, key: &str, value: impl std::fmt::Display) -> &mut Self {
        let _ = writeln!(self.out, "\t{key} = {value}");
        self
    }

    fn sub_value(&mut self, key: &str, value: impl std::fmt::Display) -> &mut Self {
        let _ = writeln!(self.out, "\t\t{key} = {value}");
        self
    }

    fn flag(&mut self, key: &str, value: bool) -> &mut Self {
        self.value(key, flag(value))
    }

    fn sub_flag(&mut self, key: &str, value: bool) -> &mut Self {
        self.sub_value(key, flag(value))
    }
}

/// Returns the full `nvda.ini` text for `settings`.
pub fn render_ini(settings: &NvdaSettings) -> String {
    let mut w = IniWriter {
        out: String::with_capacity(4096),
    };
    let s = settings;

    w.out.push_str("schemaVersion = 3\n");
    w.section("development");
    w.section("upgrade");
    w.section("update")
        .flag("allowUsageStats", false)
        .flag("askedAllowUsageStats", true)
        .flag("autoCheck", false)
        .flag("startupNotification", false);

    w.section("general")
        .flag("showWelcomeDialogAtStartup", false)
        .value("language", &s.general.language)
        .flag("saveConfigurationOnExit", false)
        .flag("askToExit", false)
        .flag("playStartAndExitSounds", s.general.play_start_and_exit_sounds)
        .value("loggingLevel", "DEBUG");

    w.section("speech")
        .value("synth", "oneCore")
        .flag("autoLanguageSwitching", s.speech.auto_language_switching)
        .flag("autoDialectSwitching", s.speech.auto_dialect_switching)
        .flag("trustVoiceLanguage", false)
        .flag("includeCLDR", s.speech.include_unicode_descriptions)
        .value("symbolLevel", s.speech.punctuation_level.symbol_level())
        .subsection("silence")
        .sub_flag("sayCapForCapitals", s.speech.say_cap_for_capitals);

    w.section("braille")
        .subsection("noBraille")
        .sub_value("port", "\"\"");

    w.section("vision")
        .subsection("NVDAHighlighter")
        .sub_flag("highlightFocus", s.vision.highlight_focus)
        .sub_flag("highlightNavigator", s.vision.highlight_navigator)
        .sub_flag("highlightBrowseMode", s.vision.highlight_browse_mode)
        .subsection("screenCurtain");

    let k = &s.keyboard;
    w.section("keyboard")
        .value("keyboardLayout", k.keyboard_layout.as_str())
        .flag("useCapsLockAsNVDAModifierKey", k.use_caps_lock_as_nvda_modifier_key)
        .flag("speakTypedCharacters", k.speak_typed_characters)
        .flag("speakTypedWords", k.speak_typed_words)
        .flag("speechInterruptForEnter", k.speech_interrupt_for_enter);

    let r = &s.review_cursor;
    w.section("reviewCursor")
        .flag("followFocus", r.follow_focus)
        .flag("followCaret", r.follow_caret)
        .flag("followMouse", r.follow_mouse)
        .flag("simpleReviewMode", r.simple_review_mode);

    let ic = &s.input_composition;
    w.section("inputComposition")
        .flag("autoReportAllCandidates", ic.auto_report_all_candidates)
        .flag("announceSelectedCandidate", ic.announce_selected_candidate)
        .flag(
            "alwaysIncludeShortCharacterDescriptionInCandidateName",
            ic.always_include_short_character_description_in_candidate_name,
        )
        .flag("reportReadingStringChanges", ic.report_reading_string_changes)
        .flag("reportCompositionStringChanges", ic.report_composition_string_changes);

    let p = &s.presentation;
    w.section("presentation")
        .flag("reportTooltips", p.report_tooltips)
        .flag("reportHelpBalloons", p.report_help_balloons)
        .flag("reportKeyboardShortcuts", p.report_keyboard_shortcuts)
        .flag("reportObjectPositionInformation", p.report_object_position_information)
        .flag(
            "guessObjectPositionInformationWhenUnavailable",
            p.guess_object_position_information_when_unavailable,
        )
        .flag("reportObjectDescriptions", p.report_object_descriptions)
        .flag("reportDynamicContentChanges", p.report_dynamic_content_changes)
        .flag("reportAutoSuggestionsWithSound", false)
        .subsection("progressBarUpdates")
        .sub_value("progressBarOutputMode", p.progress_bar_updates.output_mode.as_str())
        .sub_flag(
            "reportBackgroundProgressBars",
            p.progress_bar_updates.report_background_progress_bars,
        );

    let b = &s.browse_mode;
    w.section("virtualBuffers")
        .value("maxLineLength", b.max_line_length)
        .value("linesPerPage", b.lines_per_page)
        .flag("useScreenLayout", b.use_screen_layout)
        .flag("autoSayAllOnPageLoad", b.auto_say_all_on_page_load)
        .flag("autoPassThroughOnFocusChange", b.auto_pass_through_on_focus_change)
        .flag("autoPassThroughOnCaretMove", b.auto_pass_through_on_caret_move)
        .flag("passThroughAudioIndication", false)
        .flag("trapNonCommandGestures", b.trap_non_command_gestures);

    let d = &s.document_formatting;
    w.section("documentFormatting")
        .flag("includeLayoutTables", d.include_layout_tables)
        .flag("detectFormatAfterCursor", d.detect_format_after_cursor)
        .flag("reportFontName", d.report_font_name)
        .flag("reportFontSize", d.report_font_size)
        .flag("reportFontAttributes", d.report_font_attributes)
        .flag("reportColor", d.report_color)
        .flag("reportComments", d.report_comments)
        .flag("reportRevisions", d.report_revisions)
        .flag("reportEmphasis", d.report_emphasis)
        .flag("reportAlignment", d.report_alignment)
        .flag("reportStyle", d.report_style)
        .flag("reportSpellingErrors", d.report_spelling_errors)
        .flag("reportPage", d.report_page)
        .flag("reportLineNumber", d.report_line_number)
        .flag("reportLineIndentation", d.report_line_indentation)
        .flag("reportParagraphIndentation", d.report_paragraph_indentation)
        .flag("reportLineSpacing", d.report_line_spacing)
        .flag("reportTables", d.report_tables)
        .flag("reportTableHeaders", d.report_table_headers)
        .flag("reportTableCellCoords", d.report_table_cell_coords)
        .flag("reportBorderStyle", d.report_border_style)
        .flag("reportBorderColor", d.report_border_color)
        .flag("reportLinks", d.report_links)
        .flag("reportHeadings", d.report_headings)
        .flag("reportLists", d.report_lists)
        .flag("reportBlockQuotes", d.report_block_quotes)
        .flag("reportLandmarks", d.report_landmarks)
        .flag("reportFrames", d.report_frames)
        .flag("reportClickable", d.report_clickable);

    w.out
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::KeyboardLayout;
    use crate::settings::{ProgressBarOutputMode, PunctuationLevel};

    #[test]
    fn test_ini_starts_with_schema_version() {
        let ini = render_ini(&NvdaSettings::default());
        assert!(ini.starts_with("schemaVersion = 3\n[development]\n"));
    }

    #[test]
    fn test_ini_writes_booleans_capitalized() {
        let ini = render_ini(&NvdaSettings::default());
        assert!(ini.contains("\tplayStartAndExitSounds = True\n"));
        assert!(ini.contains("\tshowWelcomeDialogAtStartup = False\n"));
    }

    #[test]
    fn test_ini_reflects_overrides() {
        // Arrange
        let mut settings = NvdaSettings::default();
        settings.general.language = "es".into();
        settings.speech.punctuation_level = PunctuationLevel::Most;
        settings.keyboard.keyboard_layout = KeyboardLayout::Laptop;
        settings.presentation.progress_bar_updates.output_mode = ProgressBarOutputMode::Both;

        // Act
        let ini = render_ini(&settings);

        // Assert
        assert!(ini.contains("\tlanguage = es\n"));
        assert!(ini.contains("\tsymbolLevel = 200\n"));
        assert!(ini.contains("\tkeyboardLayout = laptop\n"));
        assert!(ini.contains("\t\tprogressBarOutputMode = both\n"));
    }

    #[test]
    fn test_ini_subsections_are_indented_once() {
        let ini = render_ini(&NvdaSettings::default());
        assert!(ini.contains("[speech]\n"));
        assert!(ini.contains("\t[[silence]]\n\t\tsayCapForCapitals = False\n"));
        assert!(ini.contains("\t[[noBraille]]\n\t\tport = \"\"\n"));
    }

    #[test]
    fn test_every_line_is_ascii() {
        assert!(render_ini(&NvdaSettings::default()).is_ascii());
    }
}
