//! Pointer interaction with a diagram
//!
//! [`Interaction`] is a small state machine. A press picks a tool from the
//! button and modifiers, moves feed the active tool, and a release finishes
//! it and goes back to [`Interaction::Idle`]. Every state owns only the data
//! its tool needs. All points are in model coordinates; use
//! [`to_model`] to convert from view coordinates.

mod create_link;
mod drag;
mod multi_select;

pub use create_link::LinkCreateState;
pub use drag::{DragState, Guideline, GUIDELINE_THRESHOLD};
pub use multi_select::MultiSelectState;

use tracing::trace;

use crate::geometry::{Point, Rect};
use crate::hit_test::node_at;
use crate::model::{Diagram, NodeEditor};

/// Pointer travel below this on both axes counts as a click
pub const CLICK_TOLERANCE: i32 = 10;

/// Zoom change per wheel notch
pub const ZOOM_STEP: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Left,
    Right,
    Middle,
}

/// Keyboard modifiers held during a pointer event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        shift: false,
    };

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }
}

/// A pointer event in model coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    pub point: Point,
    pub button: PointerButton,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn new(point: Point, button: PointerButton) -> Self {
        Self {
            point,
            button,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Convert a point in view coordinates to model coordinates, given how far
/// the view is scrolled and the zoom factor
pub fn to_model(view: Point, scroll: Point, zoom: f32) -> Point {
    Point::new(
        ((view.x + scroll.x) as f32 / zoom) as i32,
        ((view.y + scroll.y) as f32 / zoom) as i32,
    )
}

/// What a press did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressOutcome {
    /// A tool took the press
    Handled,
    /// Nothing happened
    Ignored,
    /// A secondary press landed where no link can start; the host should
    /// offer its new-node menu (see [`FactoryRegistry`](crate::model::FactoryRegistry))
    ShowNodeMenu,
}

/// Transient drawing for the active tool, painted above the diagram
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overlay {
    pub rubber_band: Option<Rect>,
    pub pending_link: Option<(Point, Point)>,
    pub guidelines: Vec<Guideline>,
}

impl Overlay {
    pub fn is_empty(&self) -> bool {
        self.rubber_band.is_none() && self.pending_link.is_none() && self.guidelines.is_empty()
    }
}

/// The active pointer tool
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Interaction {
    #[default]
    Idle,
    Dragging(DragState),
    MultiSelecting(MultiSelectState),
    LinkCreating(LinkCreateState),
}

impl Interaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Interaction::Idle)
    }

    /// Start a tool for a press.
    ///
    /// - ctrl + primary: rubber-band selection
    /// - primary: select what is under the pointer, then drag the selection
    /// - secondary: draw a link from the node under the pointer
    /// - middle: flip the direction of the node under the pointer
    pub fn pointer_down(&mut self, diagram: &mut Diagram, event: PointerEvent) -> PressOutcome {
        self.cancel(diagram);
        let point = event.point;
        let outcome = match event.button {
            PointerButton::Left if event.modifiers.ctrl => {
                *self = Interaction::MultiSelecting(MultiSelectState::begin(point));
                PressOutcome::Handled
            }
            PointerButton::Left => {
                diagram.select_at(point);
                match DragState::begin(diagram, point) {
                    Some(drag) => {
                        *self = Interaction::Dragging(drag);
                        PressOutcome::Handled
                    }
                    None => PressOutcome::Ignored,
                }
            }
            PointerButton::Right => match LinkCreateState::begin(diagram, point) {
                Some(tool) => {
                    *self = Interaction::LinkCreating(tool);
                    PressOutcome::Handled
                }
                None => PressOutcome::ShowNodeMenu,
            },
            PointerButton::Middle => match node_at(diagram, point) {
                Some(id) if diagram.toggle_direction(id) => PressOutcome::Handled,
                _ => PressOutcome::Ignored,
            },
        };
        trace!(button = ?event.button, ?outcome, state = self.name(), "pointer down");
        outcome
    }

    /// Feed a pointer move to the active tool. Returns whether anything
    /// needs repainting.
    pub fn pointer_move(&mut self, diagram: &mut Diagram, event: PointerEvent) -> bool {
        match self {
            Interaction::Idle => false,
            Interaction::Dragging(drag) => {
                drag.drag_to(diagram, event.point, event.modifiers);
                true
            }
            Interaction::MultiSelecting(band) => {
                band.update(diagram, event.point);
                true
            }
            Interaction::LinkCreating(tool) => tool.update(event.point),
        }
    }

    /// Finish the active tool and return to idle. The diagram is shifted
    /// back into non-negative coordinates afterwards.
    pub fn pointer_up(&mut self, diagram: &mut Diagram, event: PointerEvent) -> bool {
        let state = std::mem::take(self);
        let name = state.name();
        let changed = match state {
            Interaction::Idle => false,
            Interaction::Dragging(drag) => drag.finish(diagram, event.point, event.modifiers),
            Interaction::MultiSelecting(band) => band.finish(diagram, event.point),
            Interaction::LinkCreating(tool) => tool.finish(diagram, event.point),
        };
        trace!(tool = name, changed, "pointer up");
        diagram.normalize_origin();
        changed
    }

    /// Abandon the active tool without applying it
    pub fn cancel(&mut self, diagram: &mut Diagram) {
        if let Interaction::Dragging(drag) = std::mem::take(self) {
            trace!("drag cancelled");
            drag.cancel(diagram);
        }
    }

    /// What the active tool wants drawn on top of the diagram
    pub fn overlay(&self) -> Overlay {
        match self {
            Interaction::Idle => Overlay::default(),
            Interaction::Dragging(drag) => Overlay {
                guidelines: drag.guidelines().to_vec(),
                ..Overlay::default()
            },
            Interaction::MultiSelecting(band) => Overlay {
                rubber_band: Some(band.rubber_band()),
                ..Overlay::default()
            },
            Interaction::LinkCreating(tool) => Overlay {
                pending_link: tool.pending_line(),
                ..Overlay::default()
            },
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Interaction::Idle => "idle",
            Interaction::Dragging(_) => "dragging",
            Interaction::MultiSelecting(_) => "multi-selecting",
            Interaction::LinkCreating(_) => "link-creating",
        }
    }
}

/// Open the editor for the node under `point`. Returns whether the node
/// changed.
pub fn double_click(diagram: &mut Diagram, point: Point, editor: &mut dyn NodeEditor) -> bool {
    match node_at(diagram, point) {
        Some(id) => diagram.open_editor(id, editor),
        None => false,
    }
}

/// Zoom in or out by one step around `view`, a point in unzoomed view
/// coordinates. Only acts while ctrl is held.
///
/// Nodes are shifted by the grid-snapped drift of the model point under the
/// pointer, so that point stays roughly in place.
pub fn wheel_zoom(diagram: &mut Diagram, view: Point, delta: i32, modifiers: Modifiers) -> bool {
    if !modifiers.ctrl {
        return false;
    }
    let before = to_model(view, Point::default(), diagram.zoom());
    let step = if delta < 0 { -ZOOM_STEP } else { ZOOM_STEP };
    diagram.set_zoom(diagram.zoom() + step);
    let after = to_model(view, Point::default(), diagram.zoom());

    let drift = Point::new(before.x - after.x, before.y - after.y).round_to(diagram.grid_size());
    diagram.translate_all(-drift.x, -drift.y);
    diagram.normalize_origin();
    diagram.request_redraw();
    trace!(zoom = diagram.zoom(), "wheel zoom");
    true
}
