// Navigation menus: the host's menu tree and its markdown outline.
// The outline is fed to the schema prompt so the model can infer services.

pub mod outline;
pub mod store;

/// Parent id of top-level items.
pub const ROOT_PARENT: i64 = 0;

#[derive(Debug, Clone, PartialEq)]
pub struct NavMenuItem {
    pub id: i64,
    pub parent_id: i64,
    pub title: String,
}

impl NavMenuItem {
    pub fn new(id: i64, parent_id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            parent_id,
            title: title.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NavMenu {
    pub name: String,
    /// Host ordering; siblings are rendered in this order.
    pub items: Vec<NavMenuItem>,
}
