//! Content slots (header, sidebar).
//!
//! A slot holds whichever fragment the active feature module placed there,
//! plus its props. Writes replace the whole content in one notification.
//! Slots do not track ownership: any caller may overwrite or clear them.

use serde_json::{Map, Value};
use tokio::sync::watch;
use tracing::trace;

use crate::store::Store;

/// Props passed to the fragment rendered in a slot.
pub type Props = Map<String, Value>;

/// What a slot currently shows.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotContent<C> {
    pub component: Option<C>,
    pub props: Props,
    /// Title shown next to the fragment; empty when unset.
    pub title: String,
}

impl<C> Default for SlotContent<C> {
    fn default() -> Self {
        Self {
            component: None,
            props: Props::new(),
            title: String::new(),
        }
    }
}

impl<C> SlotContent<C> {
    pub fn is_empty(&self) -> bool {
        self.component.is_none()
    }
}

/// A named slot. `C` is the host's fragment reference type.
#[derive(Debug)]
pub struct SlotRegistry<C> {
    name: &'static str,
    content: Store<SlotContent<C>>,
}

impl<C: Clone> SlotRegistry<C> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            content: Store::new(SlotContent::default()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Shows `component` with `props`; clears any title.
    pub fn set(&self, component: C, props: Props) {
        self.set_titled(component, props, String::new());
    }

    /// Shows `component` with `props` and a title.
    pub fn set_titled(&self, component: C, props: Props, title: impl Into<String>) {
        trace!(slot = self.name, "slot set");
        self.content.set(SlotContent {
            component: Some(component),
            props,
            title: title.into(),
        });
    }

    pub fn clear(&self) {
        trace!(slot = self.name, "slot cleared");
        self.content.set(SlotContent::default());
    }

    pub fn content(&self) -> SlotContent<C> {
        self.content.get()
    }

    pub fn subscribe(&self) -> watch::Receiver<SlotContent<C>> {
        self.content.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn props(value: Value) -> Props {
        match value {
            Value::Object(map) => map,
            _ => Props::new(),
        }
    }

    #[test]
    fn test_new_slot_is_empty() {
        let slot: SlotRegistry<&str> = SlotRegistry::new("header");
        assert!(slot.content().is_empty());
        assert!(slot.content().props.is_empty());
    }

    #[test]
    fn test_set_replaces_component_and_props() {
        let slot = SlotRegistry::new("sidebar");
        slot.set("CampaignFilters", props(json!({"year": 2024})));
        slot.set("AgentTree", props(json!({"team": "t1"})));

        let content = slot.content();
        assert_eq!(content.component, Some("AgentTree"));
        assert_eq!(content.props.get("team"), Some(&json!("t1")));
        assert!(content.props.get("year").is_none());
    }

    #[test]
    fn test_set_titled_then_set_clears_title() {
        let slot = SlotRegistry::new("header");
        slot.set_titled("StatusHeader", Props::new(), "Stato sistema");
        assert_eq!(slot.content().title, "Stato sistema");

        slot.set("CallsHeader", Props::new());
        assert_eq!(slot.content().title, "");
    }

    #[test]
    fn test_clear_resets_everything() {
        let slot = SlotRegistry::new("header");
        slot.set_titled("X", props(json!({"a": 1})), "t");
        slot.clear();
        assert_eq!(slot.content(), SlotContent::default());
    }

    #[test]
    fn test_write_is_one_notification() {
        let slot = SlotRegistry::new("sidebar");
        let mut rx = slot.subscribe();
        slot.set("X", props(json!({"a": 1})));

        assert!(rx.has_changed().unwrap());
        let seen = rx.borrow_and_update().clone();
        assert_eq!(seen.component, Some("X"));
        assert_eq!(seen.props.len(), 1);
        assert!(!rx.has_changed().unwrap());
    }
}
