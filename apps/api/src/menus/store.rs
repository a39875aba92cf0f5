use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tracing::debug;

use super::{NavMenu, NavMenuItem};
use crate::settings::StoreError;

/// Read access to the host's navigation menus.
#[async_trait]
pub trait MenuSource: Send + Sync {
    async fn menus(&self) -> Result<Vec<NavMenu>, StoreError>;
}

#[derive(Debug, FromRow)]
struct NavMenuRow {
    id: i64,
    name: String,
}

#[derive(Debug, FromRow)]
struct NavMenuItemRow {
    id: i64,
    menu_id: i64,
    parent_id: i64,
    title: String,
    position: i32,
}

/// Menus stored in PostgreSQL (`nav_menus`, `nav_menu_items`).
pub struct PgMenuSource {
    pool: PgPool,
}

impl PgMenuSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MenuSource for PgMenuSource {
    async fn menus(&self) -> Result<Vec<NavMenu>, StoreError> {
        let menus = sqlx::query_as::<_, NavMenuRow>("SELECT id, name FROM nav_menus ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        let items = sqlx::query_as::<_, NavMenuItemRow>(
            r#"
            SELECT id, menu_id, parent_id, title, position
            FROM nav_menu_items
            ORDER BY menu_id, position, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!("Loaded {} menus with {} items", menus.len(), items.len());

        Ok(group_menus(menus, items))
    }
}

/// Attaches items to their menus. Menus keep their row order; items within
/// a menu are ordered by `(position, id)`, which is the sibling order the
/// outline renders.
fn group_menus(menus: Vec<NavMenuRow>, mut items: Vec<NavMenuItemRow>) -> Vec<NavMenu> {
    items.sort_by_key(|row| (row.position, row.id));

    menus
        .into_iter()
        .map(|menu| NavMenu {
            items: items
                .iter()
                .filter(|row| row.menu_id == menu.id)
                .map(|row| NavMenuItem::new(row.id, row.parent_id, row.title.clone()))
                .collect(),
            name: menu.name,
        })
        .collect()
}

/// A fixed set of menus.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct StaticMenuSource {
    menus: Vec<NavMenu>,
}

#[cfg(test)]
impl StaticMenuSource {
    pub fn new(menus: Vec<NavMenu>) -> Self {
        Self { menus }
    }
}

#[cfg(test)]
#[async_trait]
impl MenuSource for StaticMenuSource {
    async fn menus(&self) -> Result<Vec<NavMenu>, StoreError> {
        Ok(self.menus.clone())
    }
}
