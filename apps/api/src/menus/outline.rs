//! Menu Flattener: turns flat parent-pointer menu items into a markdown outline.
//!
//! Output is depth-first pre-order: an item's line, then its children, then its
//! next sibling. Siblings keep input order and duplicates are emitted as given.
//! Lines are not indented; nesting is conveyed by order only.

use std::collections::{HashMap, HashSet};

use tracing::warn;

use super::{NavMenu, NavMenuItem, ROOT_PARENT};

/// Renders every menu as `"<name>:\n"` followed by its flattened items.
/// No menus yields an empty string.
pub fn render_menus(menus: &[NavMenu]) -> String {
    let mut output = String::new();
    for menu in menus {
        output.push_str(&menu.name);
        output.push_str(":\n");
        output.push_str(&flatten_items(&menu.items));
    }
    output
}

/// Flattens one menu's items into `"- <title>\n"` lines, starting at the root.
///
/// Walks an adjacency map with an explicit stack. An id already being expanded
/// further up the current path is emitted but not expanded again, so a cyclic
/// parent chain terminates. Items that never connect to the root are skipped.
pub fn flatten_items(items: &[NavMenuItem]) -> String {
    let mut children: HashMap<i64, Vec<&NavMenuItem>> = HashMap::new();
    for item in items {
        children.entry(item.parent_id).or_default().push(item);
    }

    let children_of = |id: i64| children.get(&id).map(Vec::as_slice).unwrap_or(&[]).iter();

    let mut output = String::new();
    let mut on_path: HashSet<i64> = HashSet::from([ROOT_PARENT]);
    let mut stack = vec![(ROOT_PARENT, children_of(ROOT_PARENT))];

    while let Some((_, siblings)) = stack.last_mut() {
        match siblings.next() {
            Some(item) => {
                output.push_str("- ");
                output.push_str(&item.title);
                output.push('\n');

                if on_path.insert(item.id) {
                    stack.push((item.id, children_of(item.id)));
                } else {
                    warn!(
                        "Menu item {} ({:?}) is its own ancestor; not expanding it again",
                        item.id, item.title
                    );
                }
            }
            None => {
                if let Some((id, _)) = stack.pop() {
                    on_path.remove(&id);
                }
            }
        }
    }

    output
}
