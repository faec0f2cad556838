//! The editor dialog contract

use tracing::debug;

use super::diagram::Diagram;
use super::node::{NodeId, NodeVariant};

/// What an editor is shown when a node is opened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRequest {
    pub variant: NodeVariant,
    pub text: String,
    /// Branch texts in order; empty for nodes without branches
    pub branches: Vec<String>,
}

/// The editor's answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Accepted {
        text: String,
        /// Ignored for nodes without branches
        branches: Vec<String>,
    },
    Cancelled,
}

/// An interactive editor for node text and branches
pub trait NodeEditor {
    fn edit(&mut self, request: &EditRequest) -> EditOutcome;
}

impl<F> NodeEditor for F
where
    F: FnMut(&EditRequest) -> EditOutcome,
{
    fn edit(&mut self, request: &EditRequest) -> EditOutcome {
        self(request)
    }
}

impl Diagram {
    /// Show `id` in `editor` and apply an accepted edit.
    ///
    /// Branch lists are reconciled by index: existing branches are renamed
    /// and keep their links, extra entries become new unlinked branches, and
    /// branches past the new length are dropped from the end along with
    /// their links. Returns whether the edit was accepted.
    pub fn open_editor(&mut self, id: NodeId, editor: &mut dyn NodeEditor) -> bool {
        let Some(node) = self.node(id) else {
            return false;
        };
        let request = EditRequest {
            variant: node.variant(),
            text: node.text().to_string(),
            branches: node.branches().iter().map(|b| b.text.clone()).collect(),
        };

        let (text, branches) = match editor.edit(&request) {
            EditOutcome::Accepted { text, branches } => (text, branches),
            EditOutcome::Cancelled => {
                debug!(node = %id, "edit cancelled");
                return false;
            }
        };

        self.set_text(id, text);
        if request.variant == NodeVariant::Condition {
            let existing = request.branches.len();
            for (index, branch) in branches.iter().enumerate() {
                if index < existing {
                    self.set_branch_text(id, index, branch.as_str());
                } else {
                    self.add_branch(id, branch.as_str());
                }
            }
            for index in (branches.len()..existing).rev() {
                self.remove_branch(id, index);
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accept(text: &str, branches: &[&str]) -> impl FnMut(&EditRequest) -> EditOutcome {
        let text = text.to_string();
        let branches: Vec<String> = branches.iter().map(|b| b.to_string()).collect();
        move |_: &EditRequest| EditOutcome::Accepted {
            text: text.clone(),
            branches: branches.clone(),
        }
    }

    #[test]
    fn test_cancel_leaves_node_untouched() {
        let mut d = Diagram::new();
        let n = d.add_node(NodeVariant::Text);
        d.set_text(n, "before");
        let mut cancel = |_: &EditRequest| EditOutcome::Cancelled;
        assert!(!d.open_editor(n, &mut cancel));
        assert_eq!(d.node(n).unwrap().text(), "before");
    }

    #[test]
    fn test_editor_sees_current_state() {
        let mut d = Diagram::new();
        let cond = d.add_node(NodeVariant::Condition);
        d.set_text(cond, "ok?");
        d.add_branch(cond, "yes");
        let mut seen = None;
        let mut editor = |req: &EditRequest| {
            seen = Some(req.clone());
            EditOutcome::Cancelled
        };
        d.open_editor(cond, &mut editor);
        assert_eq!(
            seen,
            Some(EditRequest {
                variant: NodeVariant::Condition,
                text: "ok?".into(),
                branches: vec!["yes".into()],
            })
        );
    }

    #[test]
    fn test_branch_reconciliation_keeps_and_releases_links() {
        let mut d = Diagram::new();
        let cond = d.add_node(NodeVariant::Condition);
        let a = d.add_node(NodeVariant::Text);
        let b = d.add_node(NodeVariant::Text);
        d.add_branch(cond, "yes");
        d.add_branch(cond, "no");
        d.add_link(cond, 0, a);
        d.add_link(cond, 1, b);

        assert!(d.open_editor(cond, &mut accept("check", &["Y"])));
        let node = d.node(cond).unwrap();
        assert_eq!(node.text(), "check");
        assert_eq!(node.branches().len(), 1);
        assert_eq!(node.branches()[0].text, "Y");
        assert_eq!(node.branches()[0].target(), Some(a));
        assert!(d.node(b).unwrap().parents().is_empty());

        assert!(d.open_editor(cond, &mut accept("check", &["Y", "N", "maybe"])));
        let node = d.node(cond).unwrap();
        assert_eq!(node.linked_nodes(), vec![Some(a), None, None]);
    }
}
