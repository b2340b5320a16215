use crate::view::GroupedView;

/// Completion message shown in the dashboard status line and logged by the
/// run handler. The exact wording is load-bearing for the UI.
pub fn status_line(newly_analyzed: usize) -> String {
    format!("Complete! Newly analyzed: {} files.", newly_analyzed)
}

/// Render the grouped view as the results fragment: one header per group,
/// one pill per key on each file, `active` on the pill matching the group.
///
/// Pure string assembly over an ordered map, so equal input produces
/// byte-identical output.
pub fn render_groups(view: &GroupedView) -> String {
    let mut html = String::new();
    for (group_key, files) in view {
        html.push_str("<div class=\"genre-group\">");
        html.push_str("<div class=\"genre-header\">");
        html.push_str(&escape(group_key));
        html.push_str("</div><div class=\"file-list\">");
        for file in files {
            html.push_str("<div class=\"file-item\"><div class=\"file-name\">");
            html.push_str(&escape(&file.name));
            html.push_str("</div><div class=\"file-keys\">");
            for key in &file.all_keys {
                let class = if key == group_key { "key-pill active" } else { "key-pill" };
                html.push_str("<span class=\"");
                html.push_str(class);
                html.push_str("\">");
                html.push_str(&escape(key));
                html.push_str("</span>");
            }
            html.push_str("</div></div>");
        }
        html.push_str("</div></div>");
    }
    html
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
