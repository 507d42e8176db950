use super::item::Item;

/// 詳細表示（選択中アイテムを最大1件保持）
#[derive(Debug, Default)]
pub struct DetailView {
    selected: Option<Item>,
}

impl DetailView {
    pub fn new() -> Self {
        Self { selected: None }
    }

    pub fn selected(&self) -> Option<&Item> {
        self.selected.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.selected.is_some()
    }

    /// 選択して詳細を開く（既存の選択は置き換え）
    pub fn select(&mut self, item: Item) -> &Item {
        self.selected.insert(item)
    }

    /// 詳細を閉じる。閉じていれば何もしない。
    pub fn dismiss(&mut self) -> Option<Item> {
        self.selected.take()
    }
}
