use super::render_card;
use crate::parser::ItemRecord;

fn grid_row(left: &str, right: &str) -> String {
    format!(
        r#"<tr>
  <td width="50%" valign="top" style="padding: 8px;">{}</td>
  <td width="50%" valign="top" style="padding: 8px;">{}</td>
</tr>"#,
        left, right
    )
}

/// Lay cards out two per row, in item order. An odd last item gets an empty right cell.
pub fn assemble_grid(items: &[ItemRecord]) -> String {
    let rows: Vec<String> = items
        .chunks(2)
        .map(|pair| {
            let left = render_card(&pair[0]);
            let right = pair.get(1).map(render_card).unwrap_or_default();
            grid_row(&left, &right)
        })
        .collect();

    format!(
        r#"<table role="presentation" width="100%" cellspacing="0" cellpadding="0" style="margin: 6px 0;">
  <tbody>
{}
  </tbody>
</table>"#,
        rows.join("\n")
    )
}
