//! End-to-end editing sessions: pointer events in, SVG out

use node_diagram::tools::{Overlay, PressOutcome};
use node_diagram::{
    render_svg, render_svg_with_overlay, Diagram, EditOutcome, EditRequest, FactoryRegistry,
    Interaction, Modifiers, NodeVariant, Point, PointerButton, PointerEvent, Selected, SvgConfig,
};

fn press(button: PointerButton, x: i32, y: i32) -> PointerEvent {
    PointerEvent::new(Point::new(x, y), button)
}

fn left(x: i32, y: i32) -> PointerEvent {
    press(PointerButton::Left, x, y)
}

fn right(x: i32, y: i32) -> PointerEvent {
    press(PointerButton::Right, x, y)
}

fn label(text: &'static str) -> impl FnMut(&EditRequest) -> EditOutcome {
    move |request: &EditRequest| EditOutcome::Accepted {
        text: text.to_string(),
        branches: request.branches.clone(),
    }
}

#[test]
fn test_build_link_and_group_with_the_pointer() {
    let registry = FactoryRegistry::with_defaults();
    let mut d = Diagram::new();
    let mut tool = Interaction::new();

    // a secondary press on empty space asks for the node menu
    assert_eq!(tool.pointer_down(&mut d, right(200, 200)), PressOutcome::ShowNodeMenu);
    let first = registry
        .create_at(&mut d, "Text node", Point::new(200, 200), &mut label("First"))
        .unwrap()
        .unwrap();
    let second = registry
        .create_at(&mut d, "Text node", Point::new(500, 200), &mut label("Second"))
        .unwrap()
        .unwrap();
    let group = registry
        .create_at(&mut d, "Container node", Point::new(800, 200), &mut label("Group"))
        .unwrap()
        .unwrap();

    // draw a link from the first node to the second
    let a = d.area(first).unwrap().center();
    let b = d.area(second).unwrap().center();
    assert_eq!(tool.pointer_down(&mut d, right(a.x, a.y)), PressOutcome::Handled);
    assert!(tool.pointer_move(&mut d, right(b.x - 50, b.y)));
    assert_eq!(
        tool.overlay().pending_link,
        Some((Point::new(a.x, a.y), Point::new(b.x - 50, b.y)))
    );
    assert!(tool.pointer_up(&mut d, right(b.x, b.y)));
    assert_eq!(d.target_of(first, 0), Some(second));
    assert!(tool.is_idle());

    // drag the second node onto the container's title strip
    let b = d.area(second).unwrap().center();
    let title = d.area(group).unwrap().location().offset(10, 5);
    tool.pointer_down(&mut d, left(b.x, b.y));
    assert!(d.is_selected(Selected::Node(second)));
    tool.pointer_move(&mut d, left(title.x, title.y));
    assert!(tool.pointer_up(&mut d, left(title.x, title.y)));
    assert_eq!(d.node(second).unwrap().container(), Some(group));

    let group_area = d.area(group).unwrap();
    let child_area = d.area(second).unwrap();
    assert!(group_area.left() < child_area.left());
    assert!(group_area.bottom() > child_area.bottom());

    // the link survives the move and is drawn with an arrowhead
    let svg = render_svg(&d, &SvgConfig::default());
    assert!(svg.contains(">First</text>"));
    assert!(svg.contains(">Group</text>"));
    assert!(svg.contains(r#"marker-end="url(#nd-arrow)""#));
}

#[test]
fn test_rubber_band_select_then_delete() {
    let mut d = Diagram::new();
    let a = d.add_node_at(NodeVariant::Text, Point::new(0, 0));
    let b = d.add_node_at(NodeVariant::Text, Point::new(160, 0));
    let far = d.add_node_at(NodeVariant::End, Point::new(600, 400));
    d.add_link(a, 0, b);
    d.add_link(b, 0, far);
    let mut tool = Interaction::new();

    let ctrl = Modifiers::NONE.with_ctrl();
    tool.pointer_down(&mut d, left(-20, -20).with_modifiers(ctrl));
    tool.pointer_move(&mut d, left(300, 100).with_modifiers(ctrl));

    let overlay = tool.overlay();
    assert!(overlay.rubber_band.is_some());
    let svg = render_svg_with_overlay(&d, &overlay, &SvgConfig::default());
    assert!(svg.contains("nd-rubber-band"));

    tool.pointer_up(&mut d, left(300, 100).with_modifiers(ctrl));
    let mut selected = d.selected_nodes();
    selected.sort();
    assert_eq!(selected, vec![a, b]);

    assert!(d.delete_selected());
    assert_eq!(d.len(), 1);
    assert!(d.node(far).unwrap().parents().is_empty());
    assert!(d.links().is_empty());
}

#[test]
fn test_dragging_a_container_moves_its_children() {
    let mut d = Diagram::new();
    let group = d.add_node(NodeVariant::Container);
    let child = d.add_node_at(NodeVariant::Text, Point::new(200, 200));
    d.add_to_container(group, child);
    // something at the origin so normalization keeps positions put
    d.add_node_at(NodeVariant::Start, Point::new(0, 0));

    let grab = d.area(group).unwrap().location().offset(4, 4);
    let child_before = d.area(child).unwrap();
    let mut tool = Interaction::new();
    tool.pointer_down(&mut d, left(grab.x, grab.y));
    tool.pointer_move(&mut d, left(grab.x + 80, grab.y + 40));
    tool.pointer_up(&mut d, left(grab.x + 80, grab.y + 40));

    assert_eq!(d.area(child).unwrap(), child_before.offset(80, 40));
    assert!(!d
        .node(group)
        .unwrap()
        .container_state()
        .unwrap()
        .is_fit_suspended());
}

#[test]
fn test_idle_overlay_is_empty() {
    let tool = Interaction::new();
    assert_eq!(tool.overlay(), Overlay::default());
    assert!(tool.overlay().is_empty());
}
