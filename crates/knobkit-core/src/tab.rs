//! Grouping containers: folders and the shared tab container.
//!
//! A group parameter either is a folder (a collapsible, value-less
//! container holding its own children) or contributes one page to the
//! effect's single [`TabContainer`]. The tab container is created by the
//! first tab-flagged group during store instantiation and owned by the
//! store; every tab-flagged group holds a `Weak` reference to it.
//!
//! # Example
//!
//! ```ignore
//! // Parameter group hierarchy:
//! // Tabs (shared container)
//! // ├── page "Controls"
//! // │   ├── size
//! // │   └── tint
//! // └── page "Output"
//! //     └── output
//! // Folder "Advanced"
//! //   └── seed
//! ```

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::types::ParameterId;

static NEXT_CONTAINER_ID: AtomicU32 = AtomicU32::new(1);

/// One page of the tab container, contributed by one tab-flagged group.
#[derive(Debug, Clone, PartialEq)]
pub struct TabPage {
    /// Id of the group parameter that owns this page.
    pub group: ParameterId,
    /// Page title (the group's label).
    pub label: String,
    /// Children in declaration order.
    pub children: Vec<ParameterId>,
}

/// The single tabbed view of an effect instance.
#[derive(Debug)]
pub struct TabContainer {
    id: u32,
    label: String,
    pages: RwLock<Vec<TabPage>>,
}

impl TabContainer {
    pub(crate) fn new(label: impl Into<String>) -> Self {
        Self {
            id: NEXT_CONTAINER_ID.fetch_add(1, Ordering::Relaxed),
            label: label.into(),
            pages: RwLock::new(Vec::new()),
        }
    }

    pub(crate) fn add_page(&self, group: ParameterId, label: impl Into<String>) {
        self.pages.write().push(TabPage {
            group,
            label: label.into(),
            children: Vec::new(),
        });
    }

    /// Append `child` to the page of `group`. Returns `false` if `group` has
    /// no page here.
    pub(crate) fn attach(&self, group: ParameterId, child: ParameterId) -> bool {
        let mut pages = self.pages.write();
        match pages.iter_mut().find(|p| p.group == group) {
            Some(page) => {
                page.children.push(child);
                true
            }
            None => false,
        }
    }

    /// Process-unique identity of this container.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Label of the group that created the container.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Pages in the order their groups were declared.
    pub fn pages(&self) -> Vec<TabPage> {
        self.pages.read().clone()
    }

    pub fn page_count(&self) -> usize {
        self.pages.read().len()
    }

    /// Children of one group's page, empty if the group has no page here.
    pub fn children_of(&self, group: ParameterId) -> Vec<ParameterId> {
        self.pages
            .read()
            .iter()
            .find(|p| p.group == group)
            .map(|p| p.children.clone())
            .unwrap_or_default()
    }
}

/// The container a group parameter renders its children into.
#[derive(Debug, Clone)]
pub enum Container {
    /// The group is its own folder.
    Folder(ParameterId),
    /// The group is a page of the effect's shared tab container.
    Tab(Arc<TabContainer>),
}

impl Container {
    /// True if both refer to the same container.
    pub fn same_as(&self, other: &Container) -> bool {
        match (self, other) {
            (Self::Folder(a), Self::Folder(b)) => a == b,
            (Self::Tab(a), Self::Tab(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_keep_declaration_order() {
        let tabs = TabContainer::new("Controls");
        tabs.add_page(1, "Controls");
        tabs.add_page(2, "Output");
        assert!(tabs.attach(1, 10));
        assert!(tabs.attach(2, 20));
        assert!(tabs.attach(1, 11));
        assert!(!tabs.attach(3, 30));

        let pages = tabs.pages();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].label, "Controls");
        assert_eq!(pages[0].children, vec![10, 11]);
        assert_eq!(tabs.children_of(2), vec![20]);
        assert!(tabs.children_of(3).is_empty());
    }

    #[test]
    fn test_container_identity() {
        let a = Arc::new(TabContainer::new("A"));
        let b = Arc::new(TabContainer::new("B"));
        assert_ne!(a.id(), b.id());
        assert!(Container::Tab(a.clone()).same_as(&Container::Tab(a.clone())));
        assert!(!Container::Tab(a).same_as(&Container::Tab(b)));
        assert!(Container::Folder(4).same_as(&Container::Folder(4)));
        assert!(!Container::Folder(4).same_as(&Container::Folder(5)));
    }
}
