//! The built-in NVDA command catalogue.
//!
//! Bindings follow the NVDA user guide's key command tables.  Commands whose
//! laptop binding is not listed separately reuse their desktop binding.
//!
//! The catalogue is built once on first use and then shared, so lookups are
//! cheap enough for the CLI to call them on every invocation.

use std::fmt;
use std::sync::OnceLock;

use super::Command;
use crate::keymap::{Key, KeyCombination};

/// Section of the NVDA user guide a command belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandGroup {
    Basic,
    BrowseMode,
    EmbeddedObjects,
    SystemCaret,
    SystemFocus,
    ObjectNavigation,
    SystemInformation,
    ReviewModes,
    ReviewingText,
}

impl fmt::Display for CommandGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CommandGroup::Basic => "basic",
            CommandGroup::BrowseMode => "browse mode",
            CommandGroup::EmbeddedObjects => "embedded objects",
            CommandGroup::SystemCaret => "system caret",
            CommandGroup::SystemFocus => "system focus",
            CommandGroup::ObjectNavigation => "object navigation",
            CommandGroup::SystemInformation => "system information",
            CommandGroup::ReviewModes => "review modes",
            CommandGroup::ReviewingText => "reviewing text",
        };
        f.write_str(label)
    }
}

/// Every catalogued command with the group it belongs to.
pub fn all() -> &'static [(CommandGroup, Command)] {
    static CATALOGUE: OnceLock<Vec<(CommandGroup, Command)>> = OnceLock::new();
    CATALOGUE.get_or_init(build)
}

/// Finds a catalogued command by name.
///
/// Matching ignores ASCII case, `-` and `_`, so `"report-title"`,
/// `"report_title"` and `"ReportTitle"` all find the same command.
pub fn find(name: &str) -> Option<&'static Command> {
    let wanted = normalize(name);
    all()
        .iter()
        .map(|(_, cmd)| cmd)
        .find(|cmd| normalize(&cmd.name) == wanted)
}

/// The command NVDA treats as "quit": NVDA+Q.
pub fn quit_nvda() -> &'static Command {
    &all()[0].1
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '-' && *c != '_')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

// ── Builders ──────────────────────────────────────────────────────────────────

fn combo(keys: &[Key]) -> KeyCombination {
    KeyCombination::from(keys)
}

/// Same binding on both layouts.
fn same(name: &str, keys: &[Key]) -> Command {
    Command::new(name, vec![combo(keys)])
}

/// Distinct desktop and laptop bindings.
fn split(name: &str, desktop: &[Key], laptop: &[Key]) -> Command {
    Command::with_layouts(name, vec![combo(desktop)], vec![combo(laptop)])
}

/// A sequence of combinations per layout.
fn sequence(name: &str, desktop: &[&[Key]], laptop: &[&[Key]]) -> Command {
    Command::with_layouts(
        name,
        desktop.iter().map(|k| combo(k)).collect(),
        laptop.iter().map(|k| combo(k)).collect(),
    )
}

fn build() -> Vec<(CommandGroup, Command)> {
    use CommandGroup::*;

    let mut out = Vec::new();
    let mut add = |group: CommandGroup, commands: Vec<Command>| {
        out.extend(commands.into_iter().map(|c| (group, c)));
    };

    // QuitNvda must stay first: `quit_nvda` indexes it directly.
    add(Basic, vec![same("QuitNvda", &[Key::NVDA, Key::Q])]);
    add(BrowseMode, browse_mode());
    add(
        EmbeddedObjects,
        vec![same(
            "MoveToContainingBrowseModeDocument",
            &[Key::NVDA, Key::CONTROL, Key::SPACE],
        )],
    );
    add(SystemCaret, system_caret());
    add(SystemFocus, system_focus());
    add(ObjectNavigation, object_navigation());
    add(SystemInformation, system_information());
    add(
        ReviewModes,
        vec![
            split("SwitchToNextReviewMode", &[Key::NVDA, Key::NUMPAD7], &[Key::NVDA, Key::PAGE_UP]),
            split(
                "SwitchToPreviousReviewMode",
                &[Key::NVDA, Key::NUMPAD1],
                &[Key::NVDA, Key::PAGE_DOWN],
            ),
        ],
    );
    add(ReviewingText, reviewing_text());
    out
}

fn browse_mode() -> Vec<Command> {
    let mut cmds = vec![
        same("ToggleBrowseAndFocusMode", &[Key::NVDA, Key::SPACE]),
        same("ExitFocusMode", &[Key::ESCAPE]),
        same("RefreshBrowseModeDocument", &[Key::NVDA, Key::F5]),
        same("Find", &[Key::NVDA, Key::CONTROL, Key::F]),
        same("FindNext", &[Key::NVDA, Key::F3]),
        same("FindPrevious", &[Key::NVDA, Key::SHIFT, Key::F3]),
        same("OpenLongDescription", &[Key::NVDA, Key::D]),
    ];

    // Single-letter quick navigation: the letter moves forward, Shift+letter back.
    let quick_nav: &[(&str, Key)] = &[
        ("Heading", Key::H),
        ("Heading1", Key::D1),
        ("Heading2", Key::D2),
        ("Heading3", Key::D3),
        ("Heading4", Key::D4),
        ("Heading5", Key::D5),
        ("Heading6", Key::D6),
        ("List", Key::L),
        ("ListItem", Key::I),
        ("Table", Key::T),
        ("Link", Key::K),
        ("NonLinkedText", Key::N),
        ("FormField", Key::F),
        ("UnvisitedLink", Key::U),
        ("VisitedLink", Key::V),
        ("EditField", Key::E),
        ("Button", Key::B),
        ("Checkbox", Key::X),
        ("ComboBox", Key::C),
        ("RadioButton", Key::R),
        ("BlockQuote", Key::Q),
        ("Separator", Key::S),
        ("Frame", Key::M),
        ("Graphic", Key::G),
        ("Landmark", Key::D),
        ("EmbeddedObject", Key::O),
        ("Annotation", Key::A),
        ("SpellingError", Key::W),
    ];
    for (element, key) in quick_nav {
        cmds.push(same(&format!("Next{element}"), &[*key]));
        cmds.push(same(&format!("Previous{element}"), &[Key::SHIFT, *key]));
    }
    cmds
}

fn system_caret() -> Vec<Command> {
    vec![
        split("SayAll", &[Key::NVDA, Key::DOWN_ARROW], &[Key::NVDA, Key::A]),
        split("ReadCurrentLine", &[Key::NVDA, Key::UP_ARROW], &[Key::NVDA, Key::L]),
        split(
            "ReadCurrentTextSelection",
            &[Key::NVDA, Key::SHIFT, Key::UP_ARROW],
            &[Key::NVDA, Key::SHIFT, Key::S],
        ),
        same("MoveToNextColumn", &[Key::CONTROL, Key::LEFT_ALT, Key::RIGHT_ARROW]),
        same("MoveToPreviousColumn", &[Key::CONTROL, Key::LEFT_ALT, Key::LEFT_ARROW]),
        same("MoveToNextRow", &[Key::CONTROL, Key::LEFT_ALT, Key::DOWN_ARROW]),
        same("MoveToPreviousRow", &[Key::CONTROL, Key::LEFT_ALT, Key::UP_ARROW]),
    ]
}

fn system_focus() -> Vec<Command> {
    vec![
        same("ReportCurrentFocus", &[Key::NVDA, Key::TAB]),
        same("ReportTitle", &[Key::NVDA, Key::T]),
        same("ReadActiveWindow", &[Key::NVDA, Key::B]),
        split("ReportStatusBar", &[Key::NVDA, Key::END], &[Key::NVDA, Key::SHIFT, Key::END]),
    ]
}

fn object_navigation() -> Vec<Command> {
    vec![
        split("ReportCurrentObject", &[Key::NVDA, Key::NUMPAD5], &[Key::NVDA, Key::SHIFT, Key::O]),
        split(
            "MoveToContainingObject",
            &[Key::NVDA, Key::NUMPAD8],
            &[Key::NVDA, Key::SHIFT, Key::UP_ARROW],
        ),
        split(
            "MoveToPreviousObject",
            &[Key::NVDA, Key::NUMPAD4],
            &[Key::NVDA, Key::SHIFT, Key::LEFT_ARROW],
        ),
        split(
            "MoveToNextObject",
            &[Key::NVDA, Key::NUMPAD6],
            &[Key::NVDA, Key::SHIFT, Key::RIGHT_ARROW],
        ),
        split(
            "MoveToFirstContainedObject",
            &[Key::NVDA, Key::NUMPAD2],
            &[Key::NVDA, Key::SHIFT, Key::DOWN_ARROW],
        ),
        split(
            "MoveToFocusObject",
            &[Key::NVDA, Key::NUMPAD_MINUS],
            &[Key::NVDA, Key::BACKSPACE],
        ),
        same("ActivateCurrentNavigatorObject", &[Key::NVDA, Key::NUMPAD_ENTER]),
        split(
            "MoveSystemFocusToCurrentReviewPosition",
            &[Key::NVDA, Key::SHIFT, Key::NUMPAD_MINUS],
            &[Key::NVDA, Key::SHIFT, Key::BACKSPACE],
        ),
        sequence(
            "MoveCaretToCurrentReviewPosition",
            &[
                &[Key::NVDA, Key::SHIFT, Key::NUMPAD_MINUS],
                &[Key::NVDA, Key::SHIFT, Key::NUMPAD_MINUS],
            ],
            &[
                &[Key::NVDA, Key::SHIFT, Key::BACKSPACE],
                &[Key::NVDA, Key::SHIFT, Key::BACKSPACE],
            ],
        ),
        split(
            "ReportReviewCursorLocation",
            &[Key::NVDA, Key::NUMPAD_DELETE],
            &[Key::NVDA, Key::DELETE],
        ),
    ]
}

fn system_information() -> Vec<Command> {
    let twice: &[&[Key]] = &[&[Key::NVDA, Key::F12], &[Key::NVDA, Key::F12]];
    vec![
        same("ReportTime", &[Key::NVDA, Key::F12]),
        sequence("ReportDate", twice, twice),
        same("ReportClipboardText", &[Key::WINDOWS, Key::C]),
    ]
}

fn reviewing_text() -> Vec<Command> {
    vec![
        split(
            "MoveToTopLineInReview",
            &[Key::SHIFT, Key::NUMPAD7],
            &[Key::NVDA, Key::CONTROL, Key::HOME],
        ),
        split("MoveToPreviousLineInReview", &[Key::NUMPAD7], &[Key::NVDA, Key::UP_ARROW]),
        split(
            "ReportCurrentLineInReview",
            &[Key::NUMPAD8],
            &[Key::NVDA, Key::SHIFT, Key::OEM_PERIOD],
        ),
        split("MoveToNextLineInReview", &[Key::NUMPAD9], &[Key::NVDA, Key::DOWN_ARROW]),
        split(
            "MoveToBottomLineInReview",
            &[Key::SHIFT, Key::NUMPAD9],
            &[Key::NVDA, Key::CONTROL, Key::END],
        ),
        split(
            "MoveToPreviousWordInReview",
            &[Key::NUMPAD4],
            &[Key::NVDA, Key::CONTROL, Key::LEFT_ARROW],
        ),
        split(
            "ReportCurrentWordInReview",
            &[Key::NUMPAD5],
            &[Key::NVDA, Key::CONTROL, Key::OEM_PERIOD],
        ),
        split(
            "MoveToNextWordInReview",
            &[Key::NUMPAD6],
            &[Key::NVDA, Key::CONTROL, Key::RIGHT_ARROW],
        ),
        split("MoveToStartOfLineInReview", &[Key::SHIFT, Key::NUMPAD1], &[Key::NVDA, Key::HOME]),
        split(
            "MoveToPreviousCharacterInReview",
            &[Key::NUMPAD1],
            &[Key::NVDA, Key::LEFT_ARROW],
        ),
        split(
            "ReportCurrentCharacterInReview",
            &[Key::NUMPAD2],
            &[Key::NVDA, Key::OEM_PERIOD],
        ),
        split("MoveToNextCharacterInReview", &[Key::NUMPAD3], &[Key::NVDA, Key::RIGHT_ARROW]),
        split("MoveToEndOfLineInReview", &[Key::SHIFT, Key::NUMPAD3], &[Key::NVDA, Key::END]),
        split("SayAllInReview", &[Key::NUMPAD_PLUS], &[Key::NVDA, Key::SHIFT, Key::A]),
        same("SelectThenCopyFromReviewCursor", &[Key::NVDA, Key::F9]),
        same("SelectThenCopyToReviewCursor", &[Key::NVDA, Key::F10]),
        same("ReportTextFormatting", &[Key::NVDA, Key::F]),
    ]
}

// ── Tests ─────────────────────────────────────────────────────────────────────
