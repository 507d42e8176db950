use std::fmt::Write;

use qn_core::domain::item::Item;
use qn_core::domain::settings::ContentMode;
use qn_core::usecase::controller::ControllerSnapshot;

fn title(mode: ContentMode) -> &'static str {
    match mode {
        ContentMode::Quotes => "Quotes",
        ContentMode::Recommendations => "Recommendations",
    }
}

fn item_line(item: &Item) -> String {
    match &item.author {
        Some(author) => format!("\"{}\" - {}", item.text, author),
        None => item.text.clone(),
    }
}

/// 画面全体をテキストで描画する
pub fn render(snapshot: &ControllerSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== {} ===", title(snapshot.content_mode));
    let _ = writeln!(
        out,
        "[{}]  ({}{})",
        snapshot.toggle_label,
        snapshot.state.as_str(),
        if snapshot.narrating { ", speaking" } else { "" }
    );
    out.push('\n');

    match &snapshot.empty_message {
        Some(message) => {
            let _ = writeln!(out, "  {message}");
        }
        None => {
            for (i, item) in snapshot.items.iter().enumerate() {
                let _ = writeln!(out, "{:>3}. {}", i + 1, item_line(item));
            }
        }
    }

    if let Some(item) = &snapshot.selected {
        out.push('\n');
        out.push_str("--- Detail ---\n");
        let _ = writeln!(out, "{}", item.text);
        if let Some(author) = &item.author {
            let _ = writeln!(out, "  by {author}");
        }
        out.push_str("(d: dismiss)\n");
    }

    out
}

/// JSON 出力（--json）
pub fn render_json(snapshot: &ControllerSnapshot) -> String {
    serde_json::to_string(snapshot).unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}"))
}
