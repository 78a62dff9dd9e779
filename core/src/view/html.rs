use std::fmt::Write;

use crate::model::board::Board;
use crate::view::{escape_html, priority_icon, BoardSnapshot};

const STYLE: &str = "body{font-family:sans-serif;background:#f4f5f7;margin:0;padding:24px}\
.board{display:flex;gap:16px}\
.column{flex:1;background:#ebecf0;border-radius:8px;padding:12px}\
.column h2{font-size:16px;display:flex;justify-content:space-between}\
.task-card{background:#fff;border-radius:6px;padding:10px;margin-bottom:8px;\
border-left:4px solid #ccc}\
.task-card[data-priority=high]{border-left-color:#e5484d}\
.task-card[data-priority=medium]{border-left-color:#f5a524}\
.task-card[data-priority=low]{border-left-color:#30a46c}\
.task-title{margin:0 0 6px}\
.task-description{margin:0 0 6px;color:#555}\
.task-footer{display:flex;justify-content:space-between;font-size:12px;color:#777}\
footer{margin-top:16px;font-size:12px;color:#777}";

/// Renders a read-only HTML page of the board.
pub fn render_html(board: &Board, footer: &str) -> String {
    let snapshot = BoardSnapshot::build(board, escape_html);
    let mut out = String::new();

    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str("<title>Task Board</title>\n");
    let _ = writeln!(out, "<style>{}</style>", STYLE);
    out.push_str("</head>\n<body>\n<div class=\"board\">\n");

    for column in &snapshot.columns {
        let _ = writeln!(out, "<section class=\"column\" data-column=\"{}\">", column.column);
        let _ = writeln!(
            out,
            "<h2>{} <span class=\"task-count\" id=\"{}-count\">{}</span></h2>",
            column.title, column.column, column.count
        );
        let _ = writeln!(out, "<div class=\"tasks-container\" id=\"{}-tasks\">", column.column);
        for card in &column.cards {
            let _ = writeln!(
                out,
                "<div class=\"task-card\" data-task-id=\"{}\" data-priority=\"{}\">",
                card.id, card.priority
            );
            let _ = writeln!(out, "<h4 class=\"task-title\">{}</h4>", card.title);
            if let Some(description) = &card.description {
                let _ = writeln!(out, "<p class=\"task-description\">{}</p>", description);
            }
            let _ = writeln!(
                out,
                concat!(
                    "<div class=\"task-footer\">",
                    "<span class=\"task-priority {p}\">{} {p}</span>",
                    "<span class=\"task-id\">{}</span></div>"
                ),
                priority_icon(card.priority),
                card.label(),
                p = card.priority
            );
            out.push_str("</div>\n");
        }
        out.push_str("</div>\n</section>\n");
    }

    out.push_str("</div>\n");
    if !footer.is_empty() {
        let _ = writeln!(out, "<footer>{}</footer>", escape_html(footer));
    }
    out.push_str("</body>\n</html>\n");
    out
}
