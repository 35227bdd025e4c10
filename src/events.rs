use std::collections::HashMap;

use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct BindingId(pub(crate) usize);

#[derive(Debug, Clone, Default)]
pub(crate) struct ListenerStore {
    map: HashMap<NodeId, HashMap<String, Vec<BindingId>>>,
}

impl ListenerStore {
    pub(crate) fn add(&mut self, node: NodeId, event_type: &str, binding: BindingId) {
        self.map
            .entry(node)
            .or_default()
            .entry(event_type.to_string())
            .or_default()
            .push(binding);
    }

    // Cloned snapshot; dispatch sees the listener list as of event time.
    pub(crate) fn get(&self, node: NodeId, event_type: &str) -> Vec<BindingId> {
        self.map
            .get(&node)
            .and_then(|events| events.get(event_type))
            .cloned()
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct EventState {
    pub(crate) event_type: String,
    pub(crate) target: NodeId,
    pub(crate) current_target: NodeId,
}

impl EventState {
    pub(crate) fn new(event_type: &str, target: NodeId) -> Self {
        EventState {
            event_type: event_type.to_string(),
            target,
            current_target: target,
        }
    }
}

// Target first, then ancestors up to the document root.
pub(crate) fn event_path(dom: &Dom, target: NodeId) -> Vec<NodeId> {
    let mut path = Vec::new();
    let mut cursor = Some(target);
    while let Some(node) = cursor {
        path.push(node);
        cursor = dom.parent(node);
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listener_snapshots_are_per_node_and_event() {
        let mut store = ListenerStore::default();
        store.add(NodeId(1), "change", BindingId(0));
        store.add(NodeId(1), "change", BindingId(2));
        store.add(NodeId(1), "input", BindingId(1));
        assert_eq!(
            store.get(NodeId(1), "change"),
            vec![BindingId(0), BindingId(2)]
        );
        assert_eq!(store.get(NodeId(1), "input"), vec![BindingId(1)]);
        assert!(store.get(NodeId(2), "change").is_empty());
    }

    #[test]
    fn event_path_walks_to_the_document_root() -> Result<()> {
        let dom = parse_html(r#"<div id="outer"><p id="inner">x</p></div>"#)?;
        let inner = dom
            .by_id("inner")
            .ok_or_else(|| Error::Runtime("inner".into()))?;
        let outer = dom
            .by_id("outer")
            .ok_or_else(|| Error::Runtime("outer".into()))?;
        assert_eq!(event_path(&dom, inner), vec![inner, outer, dom.root]);
        Ok(())
    }
}
