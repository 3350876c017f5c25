//! Wire types exchanged with the compositor
//!
//! Deserialized from Hyprland's JSON replies (`j/monitors`, `j/clients`, ...).
//! Unknown fields are ignored so newer Hyprland versions keep working.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use crate::sim::{ArenaId, BodyId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceRef {
    pub id: i64,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Monitor {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    /// Physical pixels, before transform and scale
    pub width: u32,
    pub height: u32,
    #[serde(default = "default_scale")]
    pub scale: f64,
    /// wl_output transform (0-7); odd values are rotated by 90/270 degrees
    #[serde(default)]
    pub transform: u8,
    /// Top-left in the global layout
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    pub active_workspace: WorkspaceRef,
    #[serde(default)]
    pub focused: bool,
}

fn default_scale() -> f64 {
    1.0
}

impl Monitor {
    pub fn is_rotated(&self) -> bool {
        matches!(self.transform, 1 | 3 | 5 | 7)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub address: String,
    /// Global top-left
    pub at: [i32; 2],
    pub size: [i32; 2],
    pub workspace: WorkspaceRef,
    #[serde(default)]
    pub floating: bool,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub class: String,
    /// 0 for the focused window
    #[serde(default, rename = "focusHistoryID")]
    pub focus_history_id: Option<i64>,
}

impl Client {
    pub fn body_id(&self) -> BodyId {
        BodyId::new(&self.address)
    }

    pub fn arena_id(&self) -> ArenaId {
        ArenaId(self.workspace.id)
    }

    pub fn position(&self) -> Vec2 {
        IVec2::from(self.at).as_vec2()
    }

    pub fn size_vec(&self) -> Vec2 {
        IVec2::from(self.size).as_vec2()
    }

    pub fn is_focused(&self) -> bool {
        self.focus_history_id == Some(0)
    }
}

/// Reply of `j/getoption <name>`
#[derive(Debug, Clone, Deserialize)]
pub struct OptionValue {
    #[serde(default)]
    pub int: Option<i64>,
    #[serde(default, rename = "str")]
    pub string: Option<String>,
}

impl OptionValue {
    pub fn as_bool(&self) -> bool {
        match (&self.int, &self.string) {
            (Some(i), _) => *i != 0,
            (None, Some(s)) => matches!(s.trim(), "1" | "true" | "yes" | "on"),
            (None, None) => true,
        }
    }
}

/// Reply of `j/cursorpos`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CursorPos {
    pub x: i32,
    pub y: i32,
}

/// Compositor directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    SetFloating(BodyId),
    SetTiled(BodyId),
    /// Exact size in pixels
    Resize { id: BodyId, size: IVec2 },
    /// Exact global position
    Move { id: BodyId, pos: IVec2 },
    Close(BodyId),
    Focus(BodyId),
    MoveCursor(IVec2),
}

impl Dispatch {
    pub fn resize(id: &BodyId, size: Vec2) -> Self {
        Self::Resize {
            id: id.clone(),
            size: size.round().as_ivec2(),
        }
    }

    pub fn move_to(id: &BodyId, pos: IVec2) -> Self {
        Self::Move { id: id.clone(), pos }
    }

    /// Textual form for the request socket (without the `dispatch` keyword)
    pub fn to_command(&self) -> String {
        match self {
            Self::SetFloating(id) => format!("setfloating address:{id}"),
            Self::SetTiled(id) => format!("settiled address:{id}"),
            Self::Resize { id, size } => format!("resizewindowpixel exact {} {},address:{id}", size.x, size.y),
            Self::Move { id, pos } => format!("movewindowpixel exact {} {},address:{id}", pos.x, pos.y),
            Self::Close(id) => format!("closewindow address:{id}"),
            Self::Focus(id) => format!("focuswindow address:{id}"),
            Self::MoveCursor(pos) => format!("movecursor {} {}", pos.x, pos.y),
        }
    }
}
