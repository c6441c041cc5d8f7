//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. The map lives
//! in Rust so the browser bridge and native hosts share one binding table.

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Insert ──
    AddText,
    AddRect,
    AddCircle,
    AddTriangle,

    // ── Edit ──
    Undo,
    Redo,
    Delete,
    Duplicate,
    Deselect,

    // ── Project ──
    /// Handled by the host: opens the save-project dialog.
    SaveProject,
}

impl ShortcutAction {
    /// camelCase name reported back to JavaScript.
    pub fn name(&self) -> &'static str {
        match self {
            ShortcutAction::AddText => "addText",
            ShortcutAction::AddRect => "addRect",
            ShortcutAction::AddCircle => "addCircle",
            ShortcutAction::AddTriangle => "addTriangle",
            ShortcutAction::Undo => "undo",
            ShortcutAction::Redo => "redo",
            ShortcutAction::Delete => "delete",
            ShortcutAction::Duplicate => "duplicate",
            ShortcutAction::Deselect => "deselect",
            ShortcutAction::SaveProject => "saveProject",
        }
    }
}

/// Resolves key events into shortcut actions.
///
/// Platform-aware: on macOS `meta` is ⌘, elsewhere `ctrl` plays that role,
/// so either one counts as the command modifier.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"z"`, `"Delete"`).
    /// Returns `None` if the key combo has no binding.
    pub fn resolve(
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
    ) -> Option<ShortcutAction> {
        let cmd = ctrl || meta;

        if alt {
            return None;
        }

        if cmd && shift {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Redo),
                _ => None,
            };
        }

        if cmd {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Undo),
                "y" | "Y" => Some(ShortcutAction::Redo),
                "d" | "D" => Some(ShortcutAction::Duplicate),
                "s" | "S" => Some(ShortcutAction::SaveProject),
                _ => None,
            };
        }

        if shift {
            return None;
        }

        match key {
            "t" | "T" => Some(ShortcutAction::AddText),
            "r" | "R" => Some(ShortcutAction::AddRect),
            "o" | "O" => Some(ShortcutAction::AddCircle),
            "g" | "G" => Some(ShortcutAction::AddTriangle),
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            "Escape" => Some(ShortcutAction::Deselect),
            _ => None,
        }
    }
}
