use serde::{Deserialize, Serialize};

/// 表示アイテムの種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Recommendation,
    Quote,
}

/// 表示・読み上げ対象のアイテム（生成後は不変）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub kind: ItemKind,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// 取得時刻 (RFC 3339)。静的なおすすめには無い。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<String>,
}

impl Item {
    pub fn recommendation(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: ItemKind::Recommendation,
            text: text.into(),
            author: None,
            fetched_at: None,
        }
    }

    /// 取得した名言から新しいIDを採番してアイテムを作る
    pub fn quote(text: impl Into<String>, author: Option<String>, now: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind: ItemKind::Quote,
            text: text.into(),
            author,
            fetched_at: Some(now),
        }
    }
}

/// 静的なおすすめ一覧（有効化のたびに作り直す）
pub fn static_recommendations() -> Vec<Item> {
    vec![
        Item::recommendation("1", "Read React Native Docs"),
        Item::recommendation("2", "Explore Firebase"),
        Item::recommendation("3", "Learn about AI Recommendations"),
    ]
}

/// 表示リスト（新しいものが先頭）
#[derive(Debug, Clone, Default)]
pub struct ItemList {
    items: Vec<Item>,
}

impl ItemList {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn prepend(&mut self, item: Item) {
        self.items.insert(0, item);
    }

    pub fn replace(&mut self, items: Vec<Item>) {
        self.items = items;
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn get(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn as_slice(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
